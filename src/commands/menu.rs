use serde::Serialize;

use crate::api::ApiClient;
use crate::filter::MenuFilter;
use crate::language::{resolve_description, resolve_name, Language};
use crate::models::{format_price, MenuItem};
use crate::state::AppState;
use crate::sync::{DataSource, MenuSnapshot};
use crate::validation::{self, MenuItemForm};

/// A menu item ready for display in one language.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MenuCard {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub price: String,
    pub discounted_price: Option<String>,
    pub discount: f64,
    pub is_available: bool,
    pub is_special: bool,
}

impl MenuCard {
    pub fn from_item(api: &ApiClient, item: &MenuItem, language: Language) -> Self {
        MenuCard {
            id: item.id,
            name: resolve_name(item, language).to_string(),
            description: resolve_description(item, language).to_string(),
            category: item.category_name.clone(),
            image_url: item
                .image
                .as_deref()
                .map(|image| api.image_url(image))
                .filter(|url| !url.is_empty()),
            price: format_price(item.price),
            discounted_price: item
                .has_discount()
                .then(|| format_price(item.effective_price())),
            discount: item.discount,
            is_available: item.is_available,
            is_special: item.is_special,
        }
    }
}

pub(crate) fn cards(api: &ApiClient, items: &[MenuItem], language: Language) -> Vec<MenuCard> {
    items
        .iter()
        .map(|item| MenuCard::from_item(api, item, language))
        .collect()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MenuPage {
    pub language: Language,
    pub source: DataSource,
    pub error: Option<String>,
    pub categories: Vec<String>,
    pub items: Vec<MenuCard>,
}

impl MenuPage {
    fn from_snapshot(api: &ApiClient, snapshot: MenuSnapshot) -> Self {
        MenuPage {
            language: snapshot.language,
            items: cards(api, &snapshot.items, snapshot.language),
            source: snapshot.source,
            error: snapshot.error,
            categories: snapshot.categories,
        }
    }
}

pub async fn load_public_menu(state: &AppState, lang: &str) -> Result<MenuPage, String> {
    let language = Language::from_code(lang);
    let snapshot = state
        .public_menu
        .load(&state.api, &state.cache, language)
        .await
        .map_err(|e| e.to_string())?;

    Ok(MenuPage::from_snapshot(&state.api, snapshot))
}

pub async fn load_admin_menu(state: &AppState, lang: &str) -> Result<MenuPage, String> {
    let language = Language::from_code(lang);
    let snapshot = state
        .admin_menu
        .load(&state.api, &state.cache, language)
        .await
        .map_err(|e| e.to_string())?;

    Ok(MenuPage::from_snapshot(&state.api, snapshot))
}

pub fn filter_public_menu(state: &AppState, filter: &MenuFilter) -> Vec<MenuCard> {
    let items = state.public_menu.filtered(filter);
    cards(&state.api, &items, filter.language)
}

pub fn filter_admin_menu(state: &AppState, filter: &MenuFilter) -> Vec<MenuCard> {
    let items = state.admin_menu.filtered(filter);
    cards(&state.api, &items, filter.language)
}

/// Loads one item into an edit form.
pub async fn get_menu_item(state: &AppState, id: i64, lang: &str) -> Result<MenuItemForm, String> {
    let item = state
        .api
        .menu_item(id, Language::from_code(lang))
        .await
        .map_err(|e| e.to_string())?;

    Ok(MenuItemForm::from_item(&item))
}

pub async fn create_menu_item(state: &AppState, form: &MenuItemForm) -> Result<(), String> {
    let payload = form.to_payload().map_err(|e| e.to_string())?;

    state
        .api
        .create_menu_item(&payload)
        .await
        .map_err(|e| e.to_string())
}

pub async fn update_menu_item(state: &AppState, id: i64, form: &MenuItemForm) -> Result<(), String> {
    let payload = form.to_payload().map_err(|e| e.to_string())?;

    state
        .api
        .update_menu_item(id, &payload)
        .await
        .map_err(|e| e.to_string())
}

/// Deletes an item and returns the refreshed admin list.
pub async fn delete_menu_item(state: &AppState, id: i64, lang: &str) -> Result<MenuPage, String> {
    state
        .api
        .delete_menu_item(id)
        .await
        .map_err(|e| e.to_string())?;

    load_admin_menu(state, lang).await
}

pub fn validate_image(size_bytes: u64, mime_type: &str) -> Result<(), String> {
    validation::validate_image(size_bytes, mime_type).map_err(|e| e.to_string())
}
