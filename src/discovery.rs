use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::errors::HarnessError;

// =====================
// Core Types
// =====================

/// A single discovered test script.
///
/// The bare file name doubles as the test's identity: it is the sole
/// argument passed to the client and the label printed on the result line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCase {
    pub name: String,
    pub path: PathBuf,
}

/// Discovers test scripts by their naming convention.
///
/// A file qualifies iff its name reads `<major>.<minor>_<description>.<ext>`,
/// e.g. `1.2_login.nut`. Everything else in the directory is ignored and
/// never handed to the client.
#[derive(Debug)]
pub struct CaseDiscoverer {
    pattern: Regex,
}

impl CaseDiscoverer {
    // =====================
    // Public API
    // =====================

    /// Builds a discoverer for the given extension (without a leading dot).
    pub fn new(extension: &str) -> Result<Self, HarnessError> {
        // The extension is matched literally, so metacharacters in it do not
        // widen the pattern.
        let pattern = Regex::new(&format!(r"^\d+\.\d+_.+\.{}$", regex::escape(extension)))
            .map_err(|source| HarnessError::InvalidExtension {
                extension: extension.to_string(),
                source,
            })?;
        Ok(Self { pattern })
    }

    /// Scans a single directory level for test scripts.
    ///
    /// The returned list is sorted by name so a seeded shuffle reproduces
    /// the same execution order across runs.
    pub fn discover<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<ScriptCase>, HarnessError> {
        let dir = dir.as_ref();
        let mut cases = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| HarnessError::Discovery {
                path: dir.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.matches(&name) {
                continue;
            }

            cases.push(ScriptCase {
                name,
                path: entry.path().to_path_buf(),
            });
        }
        cases.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cases)
    }

    /// Returns true if the file name follows the test naming convention.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}
