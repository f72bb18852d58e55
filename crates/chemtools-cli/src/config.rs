mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{ConfigOverrides, build_config};
