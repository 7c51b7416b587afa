pub mod app;
pub mod cli;
pub mod config;
pub mod document;
pub mod export;
pub mod harvest;
pub mod logging;
pub mod portal;
pub mod utils;
