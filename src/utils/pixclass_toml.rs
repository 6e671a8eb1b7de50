//! Load `.pixclass.toml` (CLI only). Library callers build [`Opts`] or
//! [`PipelineSettings`](crate::PipelineSettings) themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::engine::tools::parse_size;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct PixclassToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    model: Option<String>,
    classes: Option<String>,
    top_k: Option<usize>,
    threads: Option<usize>,
    timing: Option<bool>,
    softmax: Option<bool>,
    max_filesize: Option<String>,
    extension_check: Option<bool>,
    recursive: Option<bool>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file. With `explicit`, the file must exist.
/// Without it, `.pixclass.toml` in `dir` is used when present; a missing file is `None`.
/// A file that exists but cannot be read or parsed is always an error.
pub fn load_pixclass_toml(explicit: Option<&Path>, dir: &Path) -> Result<Option<PixclassToml>> {
    if let Some(path) = explicit {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let parsed = toml::from_str(&s)
            .with_context(|| format!("parse config file {}", path.display()))?;
        return Ok(Some(parsed));
    }
    let path = dir.join(PackagePaths::get().config_filename());
    let s = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("read config file {}", path.display()));
        }
    };
    let parsed =
        toml::from_str(&s).with_context(|| format!("parse config file {}", path.display()))?;
    Ok(Some(parsed))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &PixclassToml, opts: &mut Opts) -> Result<()> {
    let sec = &file.settings;
    if let Some(ref p) = sec.model {
        opts.model_path = Some(PathBuf::from(p));
    }
    if let Some(ref p) = sec.classes {
        opts.classes_path = Some(PathBuf::from(p));
    }
    if let Some(n) = sec.threads {
        opts.threads = Some(n);
    }
    if let Some(ref size) = sec.max_filesize {
        opts.max_filesize =
            parse_size(size).with_context(|| format!("config setting max_filesize = {size:?}"))?;
    }
    apply_file_opt!(sec, opts, top_k => top_k);
    apply_file_opt!(sec, opts, timing => timing);
    apply_file_opt!(sec, opts, softmax => softmax);
    apply_file_opt!(sec, opts, extension_check => extension_check);
    apply_file_opt!(sec, opts, recursive => recursive);
    apply_file_opt!(sec, opts, follow_links => follow_links);
    apply_file_opt!(sec, opts, verbose => verbose);
    Ok(())
}

impl std::str::FromStr for PixclassToml {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
