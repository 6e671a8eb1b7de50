//! Application configuration constants.
//! Defaults and package-derived names in one place.

use std::sync::OnceLock;

// ---- Package / names (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    worker_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                worker_prefix: format!("{pkg}-worker"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn worker_thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.worker_prefix, index)
    }

    pub fn producer_thread_name(&self) -> String {
        format!("{}-producer", self.pkg_name)
    }

    pub fn collector_thread_name(&self) -> String {
        format!("{}-collector", self.pkg_name)
    }
}

// ---- Worker threads ----

/// Default worker count, injected once at orchestration start.
pub struct WorkerThreads;

impl WorkerThreads {
    /// Available parallelism as seen by rayon (respects `RAYON_NUM_THREADS`). Never zero.
    pub fn available() -> usize {
        rayon::current_num_threads().max(1)
    }
}

// ---- Classification ----

/// Predictions per result line when not configured.
pub const DEFAULT_TOP_K: usize = 5;

/// Largest image accepted by default (bytes). 100 MB.
pub const DEFAULT_MAX_FILESIZE: u64 = 100 * 1024 * 1024;
