//! File collection and concurrent processing

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, WrapErr};
use litmin::Transformer;
use tokio::task::JoinSet;

/// What happened to one file
#[derive(Debug)]
pub struct FileReport {
    pub path: Utf8PathBuf,
    pub before: usize,
    /// Size after the transform, if anything was rewritten
    pub after: Option<usize>,
}

/// Expand `paths` into eligible files.
///
/// Directories are walked honoring `.gitignore`; every file found is checked
/// against the transformer's include/exclude filter. Files named explicitly
/// are kept as given and filtered later by the transform itself.
pub fn collect_files(paths: &[String], transformer: &Transformer) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        let path = Utf8PathBuf::from(path);
        if !path.is_dir() {
            files.push(path);
            continue;
        }

        for entry in ignore::WalkBuilder::new(&path).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(file) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
                continue;
            };
            if transformer.options().filter.matches(file.as_str()) {
                files.push(file);
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

/// Transform one file, optionally writing the result and its source map
pub fn process_file(transformer: &Transformer, path: &Utf8Path, write: bool) -> Result<FileReport> {
    let source = fs_err::read_to_string(path)?;
    let before = source.len();

    let Some(output) = transformer.transform(&source, path.as_str()) else {
        return Ok(FileReport {
            path: path.to_owned(),
            before,
            after: None,
        });
    };

    if write {
        fs_err::write(path, &output.code)?;
        let map = output
            .map_json()
            .wrap_err_with(|| format!("Failed to serialize source map for {path}"))?;
        fs_err::write(format!("{path}.map"), map)?;
    }

    Ok(FileReport {
        path: path.to_owned(),
        before,
        after: Some(output.code.len()),
    })
}

/// Process every file on the blocking pool, one task per file
pub async fn process_files(
    transformer: Arc<Transformer>,
    files: Vec<Utf8PathBuf>,
    write: bool,
) -> Vec<Result<FileReport>> {
    let mut tasks = JoinSet::new();
    for path in files {
        let transformer = Arc::clone(&transformer);
        tasks.spawn_blocking(move || {
            process_file(&transformer, &path, write).wrap_err_with(|| format!("Failed to process {path}"))
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.map_err(eyre::Report::from).and_then(|result| result));
    }
    results
}
