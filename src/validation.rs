use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CreatePromotion, MenuItem, MenuItemPayload, Promotion, UpdatePromotion};

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequired,

    #[error("Please enter a valid price")]
    InvalidPrice,

    #[error("Discount must be between 0 and 100")]
    InvalidDiscount,

    #[error("Please choose a valid category")]
    InvalidCategory,

    #[error("Please select a menu item")]
    MissingMenuItem,

    #[error("Discount must be between 1 and 100")]
    InvalidPromotionDiscount,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("End date must be after start date")]
    EndNotAfterStart,

    #[error("Image size must be less than 5MB")]
    ImageTooLarge,

    #[error("Please select an image file")]
    NotAnImage,
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn or_default_locale(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Raw menu item form, as typed by the admin.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItemForm {
    pub name_en: String,
    pub name_am: String,
    pub name_or: String,
    pub description_en: String,
    pub description_am: String,
    pub description_or: String,
    pub price: String,
    pub category_id: String,
    pub image: String,
    pub is_available: bool,
    pub is_special: bool,
    pub discount: String,
}

impl Default for MenuItemForm {
    fn default() -> Self {
        MenuItemForm {
            name_en: String::new(),
            name_am: String::new(),
            name_or: String::new(),
            description_en: String::new(),
            description_am: String::new(),
            description_or: String::new(),
            price: String::new(),
            category_id: "1".to_string(),
            image: String::new(),
            is_available: true,
            is_special: false,
            discount: "0".to_string(),
        }
    }
}

impl MenuItemForm {
    /// Pre-fills the edit form from a stored item.
    pub fn from_item(item: &MenuItem) -> Self {
        MenuItemForm {
            name_en: item.name_en.clone(),
            name_am: item.name_am.clone(),
            name_or: item.name_or.clone(),
            description_en: item.description_en.clone(),
            description_am: item.description_am.clone(),
            description_or: item.description_or.clone(),
            price: item.price.to_string(),
            category_id: item.category_id.unwrap_or(1).to_string(),
            image: item.image.clone().unwrap_or_default(),
            is_available: item.is_available,
            is_special: item.is_special,
            discount: item.discount.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name_en.trim().is_empty() || self.price.trim().is_empty() {
            return Err(ValidationError::MissingRequired);
        }

        match parse_decimal(&self.price) {
            Some(price) if price > 0.0 => {}
            _ => return Err(ValidationError::InvalidPrice),
        }

        match parse_decimal(&self.discount) {
            Some(discount) if (0.0..=100.0).contains(&discount) => {}
            _ => return Err(ValidationError::InvalidDiscount),
        }

        Ok(())
    }

    /// Validates and builds the submission body. Empty Amharic/Oromo fields
    /// are filled from the English ones.
    pub fn to_payload(&self) -> Result<MenuItemPayload, ValidationError> {
        self.validate()?;

        let price = parse_decimal(&self.price).ok_or(ValidationError::InvalidPrice)?;
        let discount = parse_decimal(&self.discount).ok_or(ValidationError::InvalidDiscount)?;
        let category_id = self
            .category_id
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidCategory)?;

        Ok(MenuItemPayload {
            name_en: self.name_en.clone(),
            name_am: or_default_locale(&self.name_am, &self.name_en),
            name_or: or_default_locale(&self.name_or, &self.name_en),
            description_en: self.description_en.clone(),
            description_am: or_default_locale(&self.description_am, &self.description_en),
            description_or: or_default_locale(&self.description_or, &self.description_en),
            price,
            category_id,
            image: self.image.clone(),
            is_available: self.is_available,
            is_special: self.is_special,
            discount,
        })
    }
}

/// Raw promotion form. Dates are `YYYY-MM-DD` strings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PromotionForm {
    pub menu_id: String,
    pub discount: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for PromotionForm {
    fn default() -> Self {
        let today = Local::now().date_naive();
        PromotionForm::starting(today)
    }
}

impl PromotionForm {
    /// Blank form running one week from `today`.
    pub fn starting(today: NaiveDate) -> Self {
        PromotionForm {
            menu_id: String::new(),
            discount: "10".to_string(),
            start_date: today.format("%Y-%m-%d").to_string(),
            end_date: (today + Duration::days(7)).format("%Y-%m-%d").to_string(),
        }
    }

    pub fn from_promotion(promotion: &Promotion) -> Self {
        PromotionForm {
            menu_id: promotion.menu_id.to_string(),
            discount: promotion.discount.to_string(),
            start_date: promotion.start_date.format("%Y-%m-%d").to_string(),
            end_date: promotion.end_date.format("%Y-%m-%d").to_string(),
        }
    }

    fn parsed(&self) -> Result<(i64, f64, NaiveDate, NaiveDate), ValidationError> {
        let menu_id = match self.menu_id.trim() {
            "" => return Err(ValidationError::MissingMenuItem),
            raw => raw
                .parse::<i64>()
                .map_err(|_| ValidationError::MissingMenuItem)?,
        };

        let discount = match parse_decimal(&self.discount) {
            Some(d) if d > 0.0 && d <= 100.0 => d,
            _ => return Err(ValidationError::InvalidPromotionDiscount),
        };

        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;

        // Both dates are compared at local midnight, so the calendar
        // comparison is equivalent to comparing the instants.
        if end <= start {
            return Err(ValidationError::EndNotAfterStart);
        }

        Ok((menu_id, discount, start, end))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.parsed().map(|_| ())
    }

    pub fn to_create_payload(&self) -> Result<CreatePromotion, ValidationError> {
        let (menu_id, discount, start_date, end_date) = self.parsed()?;
        Ok(CreatePromotion {
            menu_id,
            discount,
            start_date,
            end_date,
        })
    }

    /// The menu id is fixed while editing; only the terms are sent.
    pub fn to_update_payload(&self) -> Result<UpdatePromotion, ValidationError> {
        let (_, discount, start_date, end_date) = self.parsed()?;
        Ok(UpdatePromotion {
            discount,
            start_date,
            end_date,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

pub fn validate_image(size_bytes: u64, mime_type: &str) -> Result<(), ValidationError> {
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    Ok(())
}
