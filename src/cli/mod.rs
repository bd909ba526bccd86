pub mod command;
pub mod config;
pub mod info;
pub mod progress;
pub mod upmix;
