use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::language::Language;
use crate::models::Promotion;
use crate::state::AppState;
use crate::validation::PromotionForm;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PromotionSummary {
    pub menu_id: i64,
    pub name: String,
    pub discount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

impl PromotionSummary {
    pub fn at(promotion: &Promotion, now: NaiveDateTime) -> Self {
        PromotionSummary {
            menu_id: promotion.menu_id,
            name: promotion.display_name(),
            discount: promotion.discount,
            start_date: promotion.start_date,
            end_date: promotion.end_date,
            is_active: promotion.is_active_at(now),
        }
    }
}

pub(crate) fn summaries(promotions: &[Promotion], now: NaiveDateTime) -> Vec<PromotionSummary> {
    promotions
        .iter()
        .map(|promotion| PromotionSummary::at(promotion, now))
        .collect()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Admin listing, every promotion with its current status.
pub async fn get_promotions(state: &AppState, lang: &str) -> Result<Vec<PromotionSummary>, String> {
    let promotions = state
        .api
        .promotions(Language::from_code(lang))
        .await
        .map_err(|e| e.to_string())?;

    Ok(summaries(&promotions, now()))
}

/// Public listing, only promotions running right now.
pub async fn get_active_promotions(
    state: &AppState,
    lang: &str,
) -> Result<Vec<PromotionSummary>, String> {
    let promotions = state
        .api
        .public_promotions(Language::from_code(lang))
        .await
        .map_err(|e| e.to_string())?;

    let now = now();
    Ok(summaries(&promotions, now)
        .into_iter()
        .filter(|summary| summary.is_active)
        .collect())
}

pub fn new_promotion_form() -> PromotionForm {
    PromotionForm::default()
}

/// Edit form for the promotion attached to `menu_id`.
pub async fn get_promotion(state: &AppState, menu_id: i64, lang: &str) -> Result<PromotionForm, String> {
    let promotions = state
        .api
        .promotions(Language::from_code(lang))
        .await
        .map_err(|e| e.to_string())?;

    promotions
        .iter()
        .find(|promotion| promotion.menu_id == menu_id)
        .map(PromotionForm::from_promotion)
        .ok_or_else(|| "Promotion not found".to_string())
}

pub async fn create_promotion(state: &AppState, form: &PromotionForm) -> Result<(), String> {
    let payload = form.to_create_payload().map_err(|e| e.to_string())?;

    state
        .api
        .create_promotion(&payload)
        .await
        .map_err(|e| e.to_string())
}

pub async fn update_promotion(
    state: &AppState,
    menu_id: i64,
    form: &PromotionForm,
) -> Result<(), String> {
    let payload = form.to_update_payload().map_err(|e| e.to_string())?;

    state
        .api
        .update_promotion(menu_id, &payload)
        .await
        .map_err(|e| e.to_string())
}

/// Deletes a promotion and returns the refreshed admin listing.
pub async fn delete_promotion(
    state: &AppState,
    menu_id: i64,
    lang: &str,
) -> Result<Vec<PromotionSummary>, String> {
    state
        .api
        .delete_promotion(menu_id)
        .await
        .map_err(|e| e.to_string())?;

    get_promotions(state, lang).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promotion(menu_id: i64, start: &str, end: &str) -> Promotion {
        Promotion {
            menu_id,
            menu_item_name: None,
            discount: 15.0,
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        }
    }

    #[test]
    fn test_summaries_flag_active_window() {
        let now = NaiveDateTime::parse_from_str("2025-03-04 09:30", "%Y-%m-%d %H:%M").unwrap();
        let promotions = vec![
            promotion(1, "2025-03-01", "2025-03-08"),
            promotion(2, "2025-02-01", "2025-02-10"),
        ];

        let result = summaries(&promotions, now);

        assert!(result[0].is_active);
        assert!(!result[1].is_active);
        assert_eq!(result[1].name, "Item #2");

        let value = serde_json::to_value(&result[0]).unwrap();
        assert_eq!(value["start_date"], "2025-03-01");
    }
}
