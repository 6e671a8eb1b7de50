//! CLI command handler: merge config, load the classifier, pick the item source, run the pipeline.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::{BufReader, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use crate::Opts;
use crate::classify::ImageClassifier;
use crate::engine::arg_parser::Cli;
use crate::engine::tools::ExtensionFilter;
use crate::pipeline::{ItemSource, StderrSink, line_source, run_pipeline, walk_source};
use crate::utils::{apply_file_to_opts, load_pixclass_toml, setup_logging};

/// Build [`Opts`]: defaults, then the config file, then explicit CLI values.
pub fn setup_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    let cwd = std::env::current_dir().context("read current directory")?;
    if let Some(file) = load_pixclass_toml(cli.config.as_deref(), &cwd)? {
        apply_file_to_opts(&file, &mut opts)?;
    }
    apply_cli_to_opts(cli, &mut opts);
    Ok(opts)
}

/// Overwrite opts with every value given on the command line.
pub fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if let Some(ref p) = cli.model {
        opts.model_path = Some(p.clone());
    }
    if let Some(ref p) = cli.classes {
        opts.classes_path = Some(p.clone());
    }
    if let Some(k) = cli.top_k {
        opts.top_k = k;
    }
    if let Some(n) = cli.threads {
        opts.threads = Some(n);
    }
    if let Some(size) = cli.max_filesize {
        opts.max_filesize = size;
    }
    if cli.no_extension_check {
        opts.extension_check = false;
    }
    opts.timing = cli.timing.unwrap_or(opts.timing);
    opts.softmax = cli.softmax.unwrap_or(opts.softmax);
    opts.recursive = cli.recursive.unwrap_or(opts.recursive);
    opts.follow_links = cli.follow_links.unwrap_or(opts.follow_links);
    opts.verbose = cli.verbose.unwrap_or(opts.verbose);
    opts.items = cli.items.clone();
}

/// Pick the producer mode: walk when recursive, direct when items were given,
/// stdin when it is piped, otherwise an empty run.
pub fn select_source(opts: &Opts, stdin_is_terminal: bool) -> ItemSource {
    let filter = ExtensionFilter::new(opts.extension_check);
    if opts.recursive {
        let roots: Vec<PathBuf> = if opts.items.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            opts.items.iter().map(PathBuf::from).collect()
        };
        debug!("walking {} root(s)", roots.len());
        return ItemSource::filtered(walk_source(roots, opts.follow_links), move |p| {
            filter.accepts(p)
        });
    }
    if !opts.items.is_empty() {
        return ItemSource::Direct(opts.items.clone());
    }
    if !stdin_is_terminal {
        debug!("reading paths from stdin");
        let reader = BufReader::new(std::io::stdin());
        return ItemSource::filtered(line_source(reader), move |p| filter.accepts(p));
    }
    warn!("No input: pass image paths as arguments or pipe them on stdin.");
    ItemSource::Direct(Vec::new())
}

fn print_about() {
    println!(
        "{}: {}\nVersion: {}\nLicense: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_LICENSE"),
    );
}

/// Run one classification pass over the selected items, printing results to stdout.
pub fn handle_run(cli: &Cli) -> Result<()> {
    if cli.about {
        print_about();
        return Ok(());
    }
    let opts = setup_opts(cli)?;
    setup_logging(opts.verbose);
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let model_path = opts
        .model_path
        .as_deref()
        .context("no model given; use --model or set `model` in the config file")?;
    let classes_path = opts
        .classes_path
        .as_deref()
        .context("no class names given; use --classes or set `classes` in the config file")?;

    // Fatal before any queue or thread exists.
    let classifier =
        ImageClassifier::load(model_path, classes_path, opts.softmax, opts.max_filesize)?;

    let source = select_source(&opts, std::io::stdin().is_terminal());
    let summary = run_pipeline(
        source,
        Arc::new(classifier),
        Arc::new(StderrSink),
        std::io::stdout(),
        opts.settings(),
    )?;

    if summary.failed > 0 {
        debug!(
            "{} of {} items could not be processed",
            summary.failed, summary.submitted
        );
    }
    Ok(())
}
