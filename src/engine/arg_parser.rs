use clap::Parser;
use std::path::PathBuf;

use crate::engine::tools::parse_size;

fn size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).map_err(|e| e.to_string())
}

/// Command-line image classifier.
#[derive(Clone, Debug, Parser)]
#[command(name = "pixclass", version)]
#[command(about = "Classify images on a pool of worker threads; one result line per image.")]
#[command(
    long_about = "Classify images on a pool of worker threads; one result line per image.\n\n\
Image paths come from the arguments or, when none are given and input is piped, from \
standard input (one path per line). With --recursive, arguments are directories to walk.\n\n\
Models ending in .onnx run on the ONNX backend; any other model file is read as a JSON \
linear model.\n\n\
Examples:\n  pixclass -m yolo11n-cls.onnx -c classes.txt fox.png\n  \
find . | pixclass -m model.json -c classes.txt"
)]
pub struct Cli {
    /// Image files (or directories with --recursive).
    #[arg(value_name = "ITEMS")]
    pub items: Vec<String>,

    /// Model file: `.onnx`, or a JSON linear model. Required here or in the config file.
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Path to the class names file (one label per line). Required here or in the config file.
    #[arg(long, short = 'c')]
    pub classes: Option<PathBuf>,

    /// Number of top results per image. Default: 5.
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Number of worker threads. Default: available parallelism.
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Print processing time per image.
    #[arg(long, short = 'T', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub timing: Option<bool>,

    /// Apply softmax to the output scores.
    #[arg(long, short = 'S', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub softmax: Option<bool>,

    /// Maximum image file size (e.g. 100mb, 2g). Default: 100mb.
    #[arg(long, short = 'F', value_parser = size_arg)]
    pub max_filesize: Option<u64>,

    /// Disable the image extension check on streamed paths.
    #[arg(long, short = 'D')]
    pub no_extension_check: bool,

    /// Walk the given directories and classify every image found.
    #[arg(long, short = 'r', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub recursive: Option<bool>,

    /// Follow symbolic links while walking.
    #[arg(long, short = 'L', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Config file. Default: `.pixclass.toml` in the current directory, if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print about information and exit.
    #[arg(long)]
    pub about: bool,
}
