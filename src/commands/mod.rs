pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod menu;
pub mod promotions;
