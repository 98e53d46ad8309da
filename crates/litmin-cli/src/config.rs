//! Options file discovery
//!
//! Searches for `.config/litmin.yaml` walking up from the current directory.
//! No file means built-in defaults.

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, WrapErr, eyre};
use litmin::{CONFIG_DIR, CONFIG_FILE, ResolvedOptions};
use std::env;

/// Resolve options from an explicit path, a discovered file, or the defaults
pub fn load_options(explicit: Option<&str>) -> Result<ResolvedOptions> {
    let path = match explicit {
        Some(path) => Some(Utf8PathBuf::from(path)),
        None => find_config_file()?,
    };

    match path {
        Some(path) => {
            tracing::info!("Using options from {path}");
            litmin::load_options_file(path.as_std_path())
                .wrap_err_with(|| format!("Failed to load {path}"))
        }
        None => ResolvedOptions::default_options().wrap_err("Failed to resolve default options"),
    }
}

fn find_config_file() -> Result<Option<Utf8PathBuf>> {
    let cwd = env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        eyre!(
            "Current directory is not valid UTF-8: {}",
            e.as_path().display()
        )
    })?;
    Ok(find_config_file_from(&cwd))
}

/// Walk up from `start` looking for the options file
pub fn find_config_file_from(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
