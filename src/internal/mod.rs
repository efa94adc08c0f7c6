pub mod models;
pub mod prefs;
pub mod scheduler;
pub mod ui;
