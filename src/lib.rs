pub mod cli;
pub mod config;
pub mod error;
pub mod highlights;
pub mod logging;
pub mod models;
pub mod reader;
pub mod rendition;
pub mod settings;
pub mod state;
