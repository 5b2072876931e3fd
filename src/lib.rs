pub mod app;
pub mod config;
pub mod draft;
pub mod error;
pub mod favorites;
pub mod journal_entry;
pub mod journal_store;
pub mod kv_store;
pub mod logging;
pub mod paths;
pub mod query;
pub mod settings;
pub mod ui;
