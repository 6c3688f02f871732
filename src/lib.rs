pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod projector;
pub mod provider;
pub mod reload;
pub mod scanner;
pub mod store;
pub mod symbol;
pub mod tool;
pub mod version;
