use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "wire::MenuItemWire")]
pub struct MenuItem {
    pub id: i64,
    pub name_en: String,
    pub name_am: String,
    pub name_or: String,
    pub description_en: String,
    pub description_am: String,
    pub description_or: String,
    /// Label already localized by the backend for the requested `lang`.
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    #[serde(rename = "description", skip_serializing_if = "Option::is_none")]
    pub localized_description: Option<String>,
    pub price: f64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub image: Option<String>,
    pub is_available: bool,
    pub is_special: bool,
    pub discount: f64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl MenuItem {
    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }

    /// Price after the item's own discount percentage.
    pub fn effective_price(&self) -> f64 {
        if self.has_discount() {
            self.price * (1.0 - self.discount / 100.0)
        } else {
            self.price
        }
    }
}

pub fn format_price(price: f64) -> String {
    if price.is_finite() {
        format!("{price:.2}")
    } else {
        "0.00".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "wire::PromotionWire")]
pub struct Promotion {
    pub menu_id: i64,
    pub menu_item_name: Option<String>,
    pub discount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Promotion {
    /// Active iff `now` lies within `[start, end]`, both taken at local midnight.
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        let start = self.start_date.and_time(chrono::NaiveTime::MIN);
        let end = self.end_date.and_time(chrono::NaiveTime::MIN);
        now >= start && now <= end
    }

    pub fn display_name(&self) -> String {
        match &self.menu_item_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Item #{}", self.menu_id),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Admin {
    /// Identity used for a session restored from a stored token.
    pub fn placeholder() -> Self {
        Admin {
            id: 0,
            username: "Admin".to_string(),
            email: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItemPayload {
    pub name_en: String,
    pub name_am: String,
    pub name_or: String,
    pub description_en: String,
    pub description_am: String,
    pub description_or: String,
    pub price: f64,
    pub category_id: i64,
    pub image: String,
    pub is_available: bool,
    pub is_special: bool,
    pub discount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreatePromotion {
    pub menu_id: i64,
    pub discount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UpdatePromotion {
    pub discount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: usize,
    pub active_promotions: usize,
    pub unavailable_items: usize,
    pub special_items: usize,
}

impl DashboardStats {
    pub fn compute(menu: &[MenuItem], promotions: &[Promotion]) -> Self {
        DashboardStats {
            total_items: menu.len(),
            active_promotions: promotions.len(),
            unavailable_items: menu.iter().filter(|item| !item.is_available).count(),
            special_items: menu.iter().filter(|item| item.is_special).count(),
        }
    }
}

/// Lenient decoding of backend payloads into the canonical types above.
pub(crate) mod wire {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagValue {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(0.0),
            Some(NumberOrText::Number(n)) => Ok(n),
            Some(NumberOrText::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid number: {s}"))),
        }
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<FlagValue>::deserialize(deserializer)? {
            None => false,
            Some(FlagValue::Bool(b)) => b,
            Some(FlagValue::Int(i)) => i != 0,
            Some(FlagValue::Text(s)) => matches!(s.trim(), "true" | "1"),
        })
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Accepts `YYYY-MM-DD` as well as a full timestamp, keeping the date part.
    pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let day = raw.split('T').next().unwrap_or_default().trim();
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|_| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    fn default_true() -> bool {
        true
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|s| !s.trim().is_empty())
    }

    #[derive(Deserialize)]
    pub struct MenuItemWire {
        id: i64,
        #[serde(default, deserialize_with = "text")]
        name_en: String,
        #[serde(default, deserialize_with = "text")]
        name_am: String,
        #[serde(default, deserialize_with = "text")]
        name_or: String,
        #[serde(default, deserialize_with = "text")]
        description_en: String,
        #[serde(default, deserialize_with = "text")]
        description_am: String,
        #[serde(default, deserialize_with = "text")]
        description_or: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, deserialize_with = "number")]
        price: f64,
        #[serde(default)]
        category_id: Option<i64>,
        #[serde(default)]
        category_name: Option<String>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        image: Option<String>,
        #[serde(default = "default_true", deserialize_with = "flag")]
        is_available: bool,
        #[serde(default, deserialize_with = "flag")]
        is_special: bool,
        #[serde(default, deserialize_with = "number")]
        discount: f64,
        #[serde(default)]
        created_at: Option<String>,
        #[serde(default)]
        updated_at: Option<String>,
    }

    impl From<MenuItemWire> for super::MenuItem {
        fn from(w: MenuItemWire) -> Self {
            super::MenuItem {
                id: w.id,
                name_en: w.name_en,
                name_am: w.name_am,
                name_or: w.name_or,
                description_en: w.description_en,
                description_am: w.description_am,
                description_or: w.description_or,
                localized_name: non_empty(w.name),
                localized_description: non_empty(w.description),
                price: w.price,
                category_id: w.category_id,
                category_name: non_empty(w.category).or_else(|| non_empty(w.category_name)),
                image: non_empty(w.image),
                is_available: w.is_available,
                is_special: w.is_special,
                discount: w.discount,
                created_at: w.created_at,
                updated_at: w.updated_at,
            }
        }
    }

    #[derive(Deserialize)]
    struct MenuItemRef {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default)]
        name_en: Option<String>,
    }

    #[derive(Deserialize)]
    pub struct PromotionWire {
        #[serde(default)]
        menu_id: Option<i64>,
        #[serde(default)]
        food_id: Option<i64>,
        #[serde(default)]
        menu_item_name: Option<String>,
        #[serde(default)]
        food_name: Option<String>,
        #[serde(default)]
        menu_item: Option<MenuItemRef>,
        #[serde(deserialize_with = "number")]
        discount: f64,
        #[serde(deserialize_with = "date")]
        start_date: NaiveDate,
        #[serde(deserialize_with = "date")]
        end_date: NaiveDate,
    }

    impl TryFrom<PromotionWire> for super::Promotion {
        type Error = String;

        fn try_from(w: PromotionWire) -> Result<Self, Self::Error> {
            let (nested_id, nested_name) = match w.menu_item {
                Some(item) => (item.id, item.name_en),
                None => (None, None),
            };

            let menu_id = w
                .menu_id
                .or(w.food_id)
                .or(nested_id)
                .ok_or_else(|| "promotion is missing its menu item id".to_string())?;

            Ok(super::Promotion {
                menu_id,
                menu_item_name: non_empty(w.menu_item_name)
                    .or_else(|| non_empty(nested_name))
                    .or_else(|| non_empty(w.food_name)),
                discount: w.discount,
                start_date: w.start_date,
                end_date: w.end_date,
            })
        }
    }
}
