pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod filter;
pub mod language;
pub mod models;
pub mod session;
pub mod state;
pub mod sync;
pub mod validation;

#[cfg(feature = "desktop")]
mod desktop;


#[cfg(feature = "desktop")]
pub use desktop::run;
