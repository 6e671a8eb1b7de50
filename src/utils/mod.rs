pub mod config;
pub mod logger;
pub mod pixclass_toml;

pub use config::*;
pub use logger::setup_logging;
pub use pixclass_toml::{PixclassToml, apply_file_to_opts, load_pixclass_toml};
