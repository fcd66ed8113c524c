use tracing::warn;

use crate::models::{Admin, LoginCredentials};
use crate::session::SessionState;
use crate::state::AppState;

pub async fn login(state: &AppState, credentials: &LoginCredentials) -> Result<Admin, String> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err("Please enter username and password".to_string());
    }

    state.api.login(credentials).await.map_err(|e| e.to_string())
}

/// Ends the session and drops every cached menu and admin view.
pub fn logout(state: &AppState) -> Result<(), String> {
    state.api.logout().map_err(|e| e.to_string())?;

    if let Err(e) = state.cache.clear() {
        warn!("Failed to clear menu cache on logout: {e}");
    }
    state.clear_admin_data();

    Ok(())
}

pub fn session_status(state: &AppState) -> SessionState {
    state.session.state()
}
