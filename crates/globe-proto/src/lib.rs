pub mod config;
pub mod directory;
pub mod error;
pub mod platform;
pub mod protocol;
pub mod search;
pub mod state;
pub mod timezone;
