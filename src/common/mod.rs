pub mod clock;
pub mod cluster;
pub mod config;
pub mod error;
pub mod settings;
pub mod utils;
