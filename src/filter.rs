use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::language::{resolve_description, resolve_name, Language};
use crate::models::MenuItem;

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    All,
    #[serde(alias = "true")]
    Available,
    #[serde(alias = "false")]
    Unavailable,
}

impl Availability {
    pub fn matches(self, is_available: bool) -> bool {
        match self {
            Availability::All => true,
            Availability::Available => is_available,
            Availability::Unavailable => !is_available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpecialFilter {
    #[default]
    All,
    #[serde(alias = "true")]
    Special,
    #[serde(alias = "false")]
    Regular,
}

impl SpecialFilter {
    pub fn matches(self, is_special: bool) -> bool {
        match self {
            SpecialFilter::All => true,
            SpecialFilter::Special => is_special,
            SpecialFilter::Regular => !is_special,
        }
    }
}

/// Which text fields a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Public menu: resolved name and description in the active language.
    #[default]
    NameAndDescription,
    /// Admin table: the name in every locale.
    AllNames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuFilter {
    pub query: String,
    pub availability: Availability,
    pub special: SpecialFilter,
    pub category: String,
    pub scope: SearchScope,
    pub language: Language,
}

impl Default for MenuFilter {
    fn default() -> Self {
        MenuFilter {
            query: String::new(),
            availability: Availability::All,
            special: SpecialFilter::All,
            category: ALL_CATEGORIES.to_string(),
            scope: SearchScope::default(),
            language: Language::default(),
        }
    }
}

impl MenuFilter {
    fn matches_query(&self, item: &MenuItem, needle: &str) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(needle);

        match self.scope {
            SearchScope::NameAndDescription => {
                contains(resolve_name(item, self.language))
                    || contains(resolve_description(item, self.language))
            }
            SearchScope::AllNames => {
                contains(&item.name_en) || contains(&item.name_am) || contains(&item.name_or)
            }
        }
    }

    fn matches_category(&self, item: &MenuItem) -> bool {
        let wanted = self.category.trim();
        if wanted.is_empty() || wanted.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return true;
        }

        item.category_name
            .as_deref()
            .map(|label| label.to_lowercase() == wanted.to_lowercase())
            .unwrap_or(false)
    }

    pub fn matches(&self, item: &MenuItem) -> bool {
        let needle = self.query.trim().to_lowercase();

        (needle.is_empty() || self.matches_query(item, &needle))
            && self.availability.matches(item.is_available)
            && self.special.matches(item.is_special)
            && self.matches_category(item)
    }
}

pub fn filter_items(items: &[MenuItem], filter: &MenuFilter) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Distinct category labels in order of first appearance, led by `"all"`.
pub fn category_options(items: &[MenuItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut options = vec![ALL_CATEGORIES.to_string()];

    for label in items.iter().filter_map(|item| item.category_name.as_deref()) {
        if !label.is_empty() && seen.insert(label) {
            options.push(label.to_string());
        }
    }

    options
}

/// Up to `limit` items that are both special and available.
pub fn featured_items(items: &[MenuItem], limit: usize) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| item.is_special && item.is_available)
        .take(limit)
        .cloned()
        .collect()
}
