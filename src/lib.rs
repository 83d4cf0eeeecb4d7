pub mod api;
pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod filter;
pub mod library;
pub mod logging;
pub mod models;
pub mod playback;
pub mod preferences;
pub mod settings;
pub mod storage;
pub mod ui;
