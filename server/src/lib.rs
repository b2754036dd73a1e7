pub mod banner;
pub mod config;
pub mod i18n;
pub mod query;
pub mod status;
pub mod web;
