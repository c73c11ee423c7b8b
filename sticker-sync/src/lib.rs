pub mod cli;
pub mod load_config;
pub mod notion;
pub mod stickertrade;

pub use cli::{run, Cli};
