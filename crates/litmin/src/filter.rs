//! Inclusion/exclusion filtering of file identifiers

use glob::Pattern;

use crate::{Error, Result};

/// Decides which files are eligible for the transform.
///
/// A file is eligible when it matches at least one include pattern (or the
/// include list is empty) and no exclude pattern.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Check a file identifier against the patterns.
    ///
    /// A trailing `?query` is ignored and backslashes count as separators.
    pub fn matches(&self, file_id: &str) -> bool {
        let path = normalize_id(file_id);
        let included =
            self.include.is_empty() || self.include.iter().any(|p| p.matches(&path));
        included && !self.exclude.iter().any(|p| p.matches(&path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Strip a bundler query suffix and normalize separators
pub(crate) fn normalize_id(file_id: &str) -> String {
    let path = file_id.split_once('?').map_or(file_id, |(path, _)| path);
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_include_and_exclude() {
        let filter = FileFilter::new(
            &patterns(&["**/*.ts", "**/*.js"]),
            &patterns(&["**/node_modules/**"]),
        )
        .unwrap();

        assert!(filter.matches("src/app.ts"));
        assert!(filter.matches("/home/u/project/src/app.js"));
        assert!(!filter.matches("src/styles.css"));
        assert!(!filter.matches("node_modules/lit/index.js"));
        assert!(!filter.matches("/home/u/project/node_modules/lit/index.js"));
    }

    #[test]
    fn test_empty_include_matches_everything() {
        let filter = FileFilter::new(&[], &patterns(&["**/*.css"])).unwrap();
        assert!(filter.matches("anything.txt"));
        assert!(!filter.matches("a/b.css"));
    }

    #[test]
    fn test_query_and_separators() {
        let filter = FileFilter::new(&patterns(&["**/*.ts"]), &patterns(&["vendor/**"])).unwrap();
        assert!(filter.matches("src/app.ts?inline"));
        assert!(!filter.matches(r"vendor\lib.ts"));
        assert_eq!(normalize_id(r"a\b.ts?x=1"), "a/b.ts");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileFilter::new(&patterns(&["src/**a"]), &[]).unwrap_err();
        assert!(matches!(err, Error::Pattern { ref pattern, .. } if pattern == "src/**a"));
    }
}
