use crate::commands::menu::{cards, MenuCard};
use crate::filter::featured_items;
use crate::language::Language;
use crate::models::DashboardStats;
use crate::state::AppState;

pub const FEATURED_LIMIT: usize = 3;

pub async fn get_dashboard_stats(state: &AppState, lang: &str) -> Result<DashboardStats, String> {
    let language = Language::from_code(lang);

    let menu = state.api.menu(language).await.map_err(|e| e.to_string())?;
    let promotions = state
        .api
        .promotions(language)
        .await
        .map_err(|e| e.to_string())?;

    Ok(DashboardStats::compute(&menu, &promotions))
}

/// Specials for the landing page. Fetched on their own so the menu page's
/// view is left alone.
pub async fn get_featured_items(state: &AppState, lang: &str) -> Result<Vec<MenuCard>, String> {
    let language = Language::from_code(lang);
    let menu = state
        .api
        .public_menu(language)
        .await
        .map_err(|e| e.to_string())?;

    let featured = featured_items(&menu, FEATURED_LIMIT);
    Ok(cards(&state.api, &featured, language))
}
