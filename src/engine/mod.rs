//! Engine module: CLI surface and the tools behind it

pub mod arg_parser;
pub mod cli;
pub mod tools;

pub use arg_parser::Cli;
pub use cli::{apply_cli_to_opts, handle_run, select_source, setup_opts};
pub use tools::{ExtensionFilter, check_image_file, is_supported_image, parse_size};
