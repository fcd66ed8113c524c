use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::MenuItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Am,
    Or,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Am, Language::Or];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Am => "am",
            Language::Or => "or",
        }
    }

    /// Unknown or empty codes resolve to the default locale.
    pub fn from_code(code: &str) -> Language {
        code.parse().unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "am" => Ok(Language::Am),
            "or" => Ok(Language::Or),
            other => Err(format!("Unsupported language: {other}")),
        }
    }
}

fn pick<'a>(requested: &'a str, default: &'a str, server: Option<&'a str>) -> &'a str {
    if !requested.trim().is_empty() {
        return requested;
    }
    if !default.trim().is_empty() {
        return default;
    }
    server.unwrap_or("")
}

pub fn resolve_name(item: &MenuItem, language: Language) -> &str {
    let requested = match language {
        Language::En => &item.name_en,
        Language::Am => &item.name_am,
        Language::Or => &item.name_or,
    };

    pick(requested, &item.name_en, item.localized_name.as_deref())
}

pub fn resolve_description(item: &MenuItem, language: Language) -> &str {
    let requested = match language {
        Language::En => &item.description_en,
        Language::Am => &item.description_am,
        Language::Or => &item.description_or,
    };

    pick(
        requested,
        &item.description_en,
        item.localized_description.as_deref(),
    )
}
