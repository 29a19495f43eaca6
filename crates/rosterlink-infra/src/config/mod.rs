//! Configuration loading

mod loader;

pub use loader::{default_config_dir, load, load_from_file, CONFIG_DIR_ENV};
