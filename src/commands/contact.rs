use crate::models::ContactMessage;
use crate::state::AppState;

pub async fn get_contact_messages(state: &AppState) -> Result<Vec<ContactMessage>, String> {
    let messages = state
        .api
        .contact_messages()
        .await
        .map_err(|e| e.to_string())?;

    *state.contact_messages() = messages.clone();
    Ok(messages)
}

/// Deletes a message and returns the remaining local list.
pub async fn delete_contact_message(state: &AppState, id: i64) -> Result<Vec<ContactMessage>, String> {
    state
        .api
        .delete_contact_message(id)
        .await
        .map_err(|e| e.to_string())?;

    let mut messages = state.contact_messages();
    messages.retain(|message| message.id != id);
    Ok(messages.clone())
}
