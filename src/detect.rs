//! Build-dependency heuristic.
//!
//! This is a substring scan of the CMake project file, not a resolver.
//! Missing dependencies are expected; the build stage surfaces them.
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Build descriptor that enables marker scanning.
pub const CMAKE_DESCRIPTOR: &str = "CMakeLists.txt";
/// Workspace-relative file holding the detected set for the merge step.
pub const DETECTED_DEPS_REL: &str = "debian/detected-build-deps";

const DEFAULT_DEPS: &[&str] = &["build-essential"];
const CMAKE_BASELINE: &[&str] = &["build-essential", "cmake"];

/// Marker substrings and the development package each one implies.
const MARKERS: &[(&[&str], &str)] = &[
    (&["Qt6"], "qt6-base-dev"),
    (&["Qt5"], "qtbase5-dev"),
    (&["GTK4", "gtk4"], "libgtk-4-dev"),
    (&["GTK3", "gtk+-3.0"], "libgtk-3-dev"),
    (&["CURL"], "libcurl4-openssl-dev"),
    (&["SQLite3", "sqlite3"], "libsqlite3-dev"),
];

/// Guess build dependencies for the source tree at `source_dir`.
pub fn detect_build_deps(source_dir: &Path) -> Result<BTreeSet<String>> {
    let descriptor = source_dir.join(CMAKE_DESCRIPTOR);
    if !descriptor.is_file() {
        tracing::debug!(dir = %source_dir.display(), "no build descriptor, using defaults");
        return Ok(DEFAULT_DEPS.iter().map(|d| d.to_string()).collect());
    }
    let text = fs::read_to_string(&descriptor)
        .with_context(|| format!("read {}", descriptor.display()))?;
    let deps = deps_from_cmake(&text);
    tracing::debug!(?deps, "detected build dependencies");
    Ok(deps)
}

/// Map a CMake project file to the baseline plus any matched markers.
pub fn deps_from_cmake(text: &str) -> BTreeSet<String> {
    let mut deps: BTreeSet<String> = CMAKE_BASELINE.iter().map(|d| d.to_string()).collect();
    for (needles, package) in MARKERS {
        if needles.iter().any(|needle| text.contains(needle)) {
            deps.insert(package.to_string());
        }
    }
    deps
}

/// Space-joined rendering; `BTreeSet` iteration keeps it sorted.
pub fn render_deps(deps: &BTreeSet<String>) -> String {
    deps.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Persist the detected set inside `workspace_dir`.
pub fn write_detected_deps(workspace_dir: &Path, deps: &BTreeSet<String>) -> Result<PathBuf> {
    let path = workspace_dir.join(DETECTED_DEPS_REL);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&path, format!("{}\n", render_deps(deps)))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Read back a set written by [`write_detected_deps`].
pub fn read_detected_deps(workspace_dir: &Path) -> Result<BTreeSet<String>> {
    let path = workspace_dir.join(DETECTED_DEPS_REL);
    let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    Ok(text.split_whitespace().map(str::to_string).collect())
}
