pub mod composer;
pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod services;
pub mod state;
