//! Transient build workspace.
//!
//! The workspace lives at `<work root>/<name>-<version>` and is destroyed and
//! recreated on every run. Artifacts land one level up, next to it.
use crate::debian::{self, control, ScaffoldInputs};
use crate::detect;
use anyhow::{anyhow, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of one package's workspace and artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    work_root: PathBuf,
    dir_name: String,
    artifact_stem: String,
}

impl WorkspaceLayout {
    pub fn new(work_root: &Path, package: &crate::model::PackageSpec) -> Self {
        Self {
            work_root: work_root.to_path_buf(),
            dir_name: package.dir_name(),
            artifact_stem: package.artifact_stem(),
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// `<work root>/<name>-<version>`.
    pub fn dir(&self) -> PathBuf {
        self.work_root.join(&self.dir_name)
    }

    pub fn control_path(&self) -> PathBuf {
        self.dir().join("debian").join("control")
    }

    /// Source archive produced next to the workspace.
    pub fn tarball_path(&self) -> PathBuf {
        self.work_root.join(format!("{}.tar.gz", self.artifact_stem))
    }

    pub fn changes_path(&self) -> PathBuf {
        self.work_root
            .join(format!("{}_source.changes", self.artifact_stem))
    }

    pub fn dsc_path(&self) -> PathBuf {
        self.work_root.join(format!("{}.dsc", self.artifact_stem))
    }

    pub fn dput_config_path(&self) -> PathBuf {
        self.work_root.join(format!("{}.dput.cf", self.artifact_stem))
    }

    pub fn report_path(&self) -> PathBuf {
        self.work_root
            .join(format!("{}.ppa-upload.json", self.artifact_stem))
    }
}

/// A freshly built workspace.
#[derive(Debug, Clone)]
pub struct BuildWorkspace {
    pub layout: WorkspaceLayout,
    pub detected_deps: BTreeSet<String>,
    pub build_depends: Vec<String>,
}

/// Destroy any previous workspace, copy the source tree, generate `debian/`,
/// merge detected dependencies and produce the source archive.
pub fn build_workspace(
    layout: WorkspaceLayout,
    source_dir: &Path,
    inputs: &ScaffoldInputs<'_>,
) -> Result<BuildWorkspace> {
    let dir = layout.dir();
    let source = source_dir
        .canonicalize()
        .with_context(|| format!("resolve {}", source_dir.display()))?;
    if source.starts_with(resolve_lexically(&dir)) {
        return Err(anyhow!(
            "source {} is inside the workspace {}, which is rebuilt on every run; \
             move the sources or pick another --work-root",
            source.display(),
            dir.display()
        ));
    }
    recreate_dir(&dir)?;
    // The workspace itself lands inside the source tree when the work root is
    // the source directory.
    copy_tree(&source, &dir, &[layout.work_root().to_path_buf(), dir.clone()])
        .with_context(|| format!("copy {} into workspace", source_dir.display()))?;

    debian::scaffold(&dir, inputs)?;

    let detected = detect::detect_build_deps(source_dir)?;
    detect::write_detected_deps(&dir, &detected)?;
    let detected = detect::read_detected_deps(&dir)?;
    let build_depends = control::merge_build_depends(control::BASELINE_BUILD_DEPENDS, &detected);
    let control_path = layout.control_path();
    let control_text = fs::read_to_string(&control_path)
        .with_context(|| format!("read {}", control_path.display()))?;
    let control_text = control::substitute_build_depends(&control_text, &build_depends)
        .with_context(|| format!("merge Build-Depends into {}", control_path.display()))?;
    fs::write(&control_path, control_text)
        .with_context(|| format!("write {}", control_path.display()))?;

    create_source_archive(&dir, &layout.tarball_path())?;
    tracing::info!(
        workspace = %dir.display(),
        deps = %detect::render_deps(&detected),
        "workspace ready"
    );
    Ok(BuildWorkspace {
        layout,
        detected_deps: detected,
        build_depends,
    })
}

/// Canonical form of `path`, resolving the nearest existing ancestor when
/// the path itself does not exist yet.
fn resolve_lexically(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve_lexically(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// Remove `dir` if present and create it empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if fs::symlink_metadata(dir).is_ok() {
        tracing::debug!(dir = %dir.display(), "removing previous workspace");
        fs::remove_dir_all(dir).with_context(|| format!("remove {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(())
}

/// Recursively copy `src` into `dest`, keeping symlinks as symlinks.
/// Paths listed in `skip` are not descended into.
pub fn copy_tree(src: &Path, dest: &Path, skip: &[PathBuf]) -> Result<()> {
    let skip_canonical: Vec<PathBuf> = skip
        .iter()
        .filter_map(|path| path.canonicalize().ok())
        .collect();
    copy_tree_inner(src, dest, &skip_canonical)
}

fn copy_tree_inner(src: &Path, dest: &Path, skip: &[PathBuf]) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut entries: Vec<_> = fs::read_dir(src)
        .with_context(|| format!("read {}", src.display()))?
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("read {}", src.display()))?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspect {}", path.display()))?;
        if file_type.is_symlink() {
            let link = fs::read_link(&path).with_context(|| format!("read {}", path.display()))?;
            std::os::unix::fs::symlink(&link, &target)
                .with_context(|| format!("link {}", target.display()))?;
        } else if file_type.is_dir() {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            if skip.iter().any(|skipped| skipped == &canonical) {
                tracing::debug!(path = %path.display(), "skipping build output inside source tree");
                continue;
            }
            copy_tree_inner(&path, &target, skip)?;
        } else if file_type.is_file() {
            fs::copy(&path, &target)
                .with_context(|| format!("copy {} to {}", path.display(), target.display()))?;
        }
    }
    Ok(())
}

/// Write a gzip tarball of `dir`, entries rooted at the directory's name.
pub fn create_source_archive(dir: &Path, tarball: &Path) -> Result<()> {
    let prefix = dir
        .file_name()
        .ok_or_else(|| anyhow!("workspace {} has no directory name", dir.display()))?;
    let file =
        fs::File::create(tarball).with_context(|| format!("create {}", tarball.display()))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);
    builder
        .append_dir_all(prefix, dir)
        .with_context(|| format!("archive {}", dir.display()))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .with_context(|| format!("finish {}", tarball.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
