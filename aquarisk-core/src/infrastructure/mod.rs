pub mod config;
pub mod csv;
pub mod error;
pub mod export;
pub mod fs;
