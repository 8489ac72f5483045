//! Shared test infrastructure for the period search workspace.
//!
//! Provides two things:
//! - **Fixtures**: seeded synthetic light curves ([`light_curve`]) so unit
//!   tests, integration tests, benches and the CLI demo mode all work on
//!   identical, reproducible data.
//! - **Artifacts**: project root discovery and a `test_output/` directory
//!   for files tests want to leave behind for inspection.
//!
//! # Usage
//! ```rust
//! use test_helpers::light_curve::SyntheticLightCurve;
//!
//! let curve = SyntheticLightCurve::new(5.0, 100)
//!     .with_noise(0.02)
//!     .with_seed(7)
//!     .generate()
//!     .unwrap();
//! assert_eq!(curve.len(), 100);
//! ```

pub mod light_curve;

use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors from test infrastructure.
#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    /// No `Cargo.toml` with a `[workspace]` section above the working directory
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),

    /// Synthetic light-curve settings that cannot produce data
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}

/// Directory under the workspace root that collects test artifacts.
pub const OUTPUT_DIR_NAME: &str = "test_output";

/// Walk up from the working directory to the manifest that declares the
/// workspace. `cargo test` runs each member with its own directory as the
/// working directory, so member manifests are passed over.
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    let start = env::current_dir().map_err(|e| {
        TestHelperError::ProjectRootNotFound(format!("cannot read working directory: {e}"))
    })?;

    for dir in start.ancestors() {
        let manifest = dir.join("Cargo.toml");
        if !manifest.is_file() {
            continue;
        }
        let content = fs::read_to_string(&manifest).map_err(|e| {
            TestHelperError::ProjectRootNotFound(format!("cannot read {}: {e}", manifest.display()))
        })?;
        if content.lines().any(|line| line.trim() == "[workspace]") {
            return Ok(dir.to_path_buf());
        }
    }

    Err(TestHelperError::ProjectRootNotFound(format!(
        "no workspace manifest above {}",
        start.display()
    )))
}

static PROJECT_ROOT: Lazy<PathBuf> = Lazy::new(|| match find_project_root() {
    Ok(root) => root,
    Err(e) => panic!("test artifacts need a workspace root: {e}"),
});

/// `<workspace>/test_output`, created on first use.
///
/// Scan reports and periodogram dumps written by tests end up here.
pub fn get_output_dir() -> PathBuf {
    let dir = PROJECT_ROOT.join(OUTPUT_DIR_NAME);
    if let Err(e) = fs::create_dir_all(&dir) {
        panic!("cannot create {}: {e}", dir.display());
    }
    dir
}

/// Artifact path relative to [`get_output_dir`], e.g.
/// `output_path("uniform_sweep_report.json")`.
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    get_output_dir().join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_exists() {
        let root = find_project_root().expect("Failed to find project root");
        assert!(root.join("Cargo.toml").exists());
        assert!(root.join("period-search").exists());
        assert!(root.join("test_helpers").exists());
    }

    #[test]
    fn test_output_dir_created() {
        let output = get_output_dir();
        assert!(output.exists());
        assert!(output.is_dir());
    }

    #[test]
    fn test_output_path() {
        let path = output_path("scan_report.json");
        assert_eq!(path, get_output_dir().join("scan_report.json"));
        assert!(path.starts_with(find_project_root().unwrap().join(OUTPUT_DIR_NAME)));
    }
}
