pub mod config;
pub mod simulate;
pub mod stage;
pub mod timeline;
