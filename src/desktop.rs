use std::sync::Arc;

use tauri::{Emitter, Manager, State};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::commands::menu::{MenuCard, MenuPage};
use crate::commands::promotions::PromotionSummary;
use crate::commands::{auth, contact, dashboard, menu, promotions};
use crate::config::Config;
use crate::db::Database;
use crate::filter::MenuFilter;
use crate::models::{Admin, ContactMessage, DashboardStats, LoginCredentials};
use crate::session::SessionState;
use crate::state::AppState;
use crate::validation::{MenuItemForm, PromotionForm};

pub const SESSION_EXPIRED_EVENT: &str = "session-expired";

// Auth

#[tauri::command]
async fn login(state: State<'_, AppState>, credentials: LoginCredentials) -> Result<Admin, String> {
    auth::login(&state, &credentials).await
}

#[tauri::command]
fn logout(state: State<'_, AppState>) -> Result<(), String> {
    auth::logout(&state)
}

#[tauri::command]
fn session_status(state: State<'_, AppState>) -> SessionState {
    auth::session_status(&state)
}

// Menu

#[tauri::command]
async fn load_public_menu(state: State<'_, AppState>, lang: String) -> Result<MenuPage, String> {
    menu::load_public_menu(&state, &lang).await
}

#[tauri::command]
async fn load_admin_menu(state: State<'_, AppState>, lang: String) -> Result<MenuPage, String> {
    menu::load_admin_menu(&state, &lang).await
}

#[tauri::command]
fn filter_public_menu(state: State<'_, AppState>, filter: MenuFilter) -> Vec<MenuCard> {
    menu::filter_public_menu(&state, &filter)
}

#[tauri::command]
fn filter_admin_menu(state: State<'_, AppState>, filter: MenuFilter) -> Vec<MenuCard> {
    menu::filter_admin_menu(&state, &filter)
}

#[tauri::command]
async fn get_menu_item(
    state: State<'_, AppState>,
    id: i64,
    lang: String,
) -> Result<MenuItemForm, String> {
    menu::get_menu_item(&state, id, &lang).await
}

#[tauri::command]
fn new_menu_item_form() -> MenuItemForm {
    MenuItemForm::default()
}

#[tauri::command]
async fn create_menu_item(state: State<'_, AppState>, form: MenuItemForm) -> Result<(), String> {
    menu::create_menu_item(&state, &form).await
}

#[tauri::command]
async fn update_menu_item(
    state: State<'_, AppState>,
    id: i64,
    form: MenuItemForm,
) -> Result<(), String> {
    menu::update_menu_item(&state, id, &form).await
}

#[tauri::command]
async fn delete_menu_item(
    state: State<'_, AppState>,
    id: i64,
    lang: String,
) -> Result<MenuPage, String> {
    menu::delete_menu_item(&state, id, &lang).await
}

#[tauri::command]
fn validate_image(size_bytes: u64, mime_type: String) -> Result<(), String> {
    menu::validate_image(size_bytes, &mime_type)
}

// Promotions

#[tauri::command]
async fn get_promotions(
    state: State<'_, AppState>,
    lang: String,
) -> Result<Vec<PromotionSummary>, String> {
    promotions::get_promotions(&state, &lang).await
}

#[tauri::command]
async fn get_active_promotions(
    state: State<'_, AppState>,
    lang: String,
) -> Result<Vec<PromotionSummary>, String> {
    promotions::get_active_promotions(&state, &lang).await
}

#[tauri::command]
fn new_promotion_form() -> PromotionForm {
    promotions::new_promotion_form()
}

#[tauri::command]
async fn get_promotion(
    state: State<'_, AppState>,
    menu_id: i64,
    lang: String,
) -> Result<PromotionForm, String> {
    promotions::get_promotion(&state, menu_id, &lang).await
}

#[tauri::command]
async fn create_promotion(state: State<'_, AppState>, form: PromotionForm) -> Result<(), String> {
    promotions::create_promotion(&state, &form).await
}

#[tauri::command]
async fn update_promotion(
    state: State<'_, AppState>,
    menu_id: i64,
    form: PromotionForm,
) -> Result<(), String> {
    promotions::update_promotion(&state, menu_id, &form).await
}

#[tauri::command]
async fn delete_promotion(
    state: State<'_, AppState>,
    menu_id: i64,
    lang: String,
) -> Result<Vec<PromotionSummary>, String> {
    promotions::delete_promotion(&state, menu_id, &lang).await
}

// Contact messages

#[tauri::command]
async fn get_contact_messages(state: State<'_, AppState>) -> Result<Vec<ContactMessage>, String> {
    contact::get_contact_messages(&state).await
}

#[tauri::command]
async fn delete_contact_message(
    state: State<'_, AppState>,
    id: i64,
) -> Result<Vec<ContactMessage>, String> {
    contact::delete_contact_message(&state, id).await
}

// Dashboard

#[tauri::command]
async fn get_dashboard_stats(
    state: State<'_, AppState>,
    lang: String,
) -> Result<DashboardStats, String> {
    dashboard::get_dashboard_stats(&state, &lang).await
}

#[tauri::command]
async fn get_featured_items(
    state: State<'_, AppState>,
    lang: String,
) -> Result<Vec<MenuCard>, String> {
    dashboard::get_featured_items(&state, &lang).await
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let result = tauri::Builder::default()
        .setup(|app| {
            let config = Config::load();
            let db = Database::for_app(app.handle(), &config.db_path)?;
            let state = AppState::new(config, Arc::new(db))?;

            let handle = app.handle().clone();
            state.session.on_expired(move || {
                if let Err(e) = handle.emit(SESSION_EXPIRED_EVENT, ()) {
                    tracing::warn!("Failed to emit {SESSION_EXPIRED_EVENT}: {e}");
                }
            });

            app.manage(state);
            info!("Restaurant console ready");

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Auth
            login,
            logout,
            session_status,
            // Menu
            load_public_menu,
            load_admin_menu,
            filter_public_menu,
            filter_admin_menu,
            get_menu_item,
            new_menu_item_form,
            create_menu_item,
            update_menu_item,
            delete_menu_item,
            validate_image,
            // Promotions
            get_promotions,
            get_active_promotions,
            new_promotion_form,
            get_promotion,
            create_promotion,
            update_promotion,
            delete_promotion,
            // Contact messages
            get_contact_messages,
            delete_contact_message,
            // Dashboard
            get_dashboard_stats,
            get_featured_items,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Error while running tauri application: {e}");
        std::process::exit(1);
    }
}
