//! Artifact persistence under an output root.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use crudgen_synth::Artifact;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};

/// Resolves a `/`-separated artifact path below `root`.
///
/// # Errors
///
/// Returns [`StoreError::PathEscapesRoot`] for absolute paths, empty paths
/// and paths with `..` components.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use crudgen_store::resolve_artifact_path;
///
/// let path = resolve_artifact_path(Path::new("out"), "Common/Queries/UserQuery.cs").unwrap();
/// assert_eq!(path, Path::new("out/Common/Queries/UserQuery.cs"));
/// assert!(resolve_artifact_path(Path::new("out"), "../UserQuery.cs").is_err());
/// ```
pub fn resolve_artifact_path(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative_path = Path::new(relative);
    let mut resolved = root.to_path_buf();
    let mut depth = 0;

    for component in relative_path.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => return Err(StoreError::PathEscapesRoot(relative.to_string())),
        }
    }

    if depth == 0 {
        return Err(StoreError::PathEscapesRoot(relative.to_string()));
    }
    Ok(resolved)
}

/// Writes every artifact below `root`, creating directories as needed and
/// overwriting existing files.
///
/// The write is all-or-nothing. Paths are checked first, contents are
/// staged in a temporary directory under `root`, then moved into place one
/// by one. If any step fails, files already moved are removed, overwritten
/// files are restored, and directories the call created are deleted again.
/// `root` itself is always created, even for an empty artifact list.
///
/// # Errors
///
/// Returns [`StoreError::PathEscapesRoot`] or [`StoreError::IoError`].
pub fn persist(root: impl AsRef<Path>, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let targets = artifacts
        .iter()
        .map(|artifact| resolve_artifact_path(root, &artifact.path))
        .collect::<Result<Vec<_>>>()?;

    let mut commit = Commit::default();
    let result = commit
        .create_dir_all(root)
        .map_err(StoreError::from)
        .and_then(|()| stage_and_commit(root, artifacts, &targets, &mut commit));

    if let Err(err) = result {
        warn!("Rolling back artifacts under {}: {err}", root.display());
        commit.remove_created_dirs();
        return Err(err);
    }

    info!("Persisted {} artifacts under {}", targets.len(), root.display());
    Ok(targets)
}

/// Writes every artifact into a staging directory, then moves them into
/// place. On failure the moved files are rolled back before the staging
/// directory (which holds the backups) is dropped.
fn stage_and_commit(
    root: &Path,
    artifacts: &[Artifact],
    targets: &[PathBuf],
    commit: &mut Commit,
) -> Result<()> {
    let staging = tempfile::Builder::new()
        .prefix(".crudgen-staging-")
        .tempdir_in(root)?;

    let mut staged = Vec::with_capacity(artifacts.len());
    for (index, artifact) in artifacts.iter().enumerate() {
        let path = staging.path().join(format!("{index}.staged"));
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(artifact.content.as_bytes())?;
        writer.flush()?;
        staged.push(path);
    }

    for (index, (source, target)) in staged.iter().zip(targets).enumerate() {
        let backup = staging.path().join(format!("{index}.backup"));
        if let Err(err) = commit.move_into_place(source, target, &backup) {
            commit.restore_files();
            return Err(err.into());
        }
        debug!("Wrote {}", target.display());
    }
    Ok(())
}

/// What [`persist`] changed on disk, in order, so it can be undone.
#[derive(Debug, Default)]
struct Commit {
    /// Moved targets with the backup of the file they replaced.
    written: Vec<(PathBuf, Option<PathBuf>)>,
    /// Directories created by this call, outermost first.
    created_dirs: Vec<PathBuf>,
}

impl Commit {
    fn create_dir_all(&mut self, dir: &Path) -> io::Result<()> {
        let mut missing = Vec::new();
        let mut current = Some(dir);
        while let Some(path) = current {
            if path.as_os_str().is_empty() || path.exists() {
                break;
            }
            missing.push(path.to_path_buf());
            current = path.parent();
        }
        self.created_dirs.extend(missing.into_iter().rev());
        fs::create_dir_all(dir)
    }

    fn move_into_place(&mut self, source: &Path, target: &Path, backup: &Path) -> io::Result<()> {
        if let Some(parent) = target.parent() {
            self.create_dir_all(parent)?;
        }

        let backup = if target.is_file() {
            fs::rename(target, backup)?;
            Some(backup.to_path_buf())
        } else {
            None
        };

        if let Err(err) = fs::rename(source, target) {
            if let Some(backup) = &backup {
                if let Err(restore) = fs::rename(backup, target) {
                    warn!("Failed to restore {}: {restore}", target.display());
                }
            }
            return Err(err);
        }
        self.written.push((target.to_path_buf(), backup));
        Ok(())
    }

    fn restore_files(&mut self) {
        for (target, backup) in self.written.drain(..).rev() {
            let restored = match &backup {
                Some(backup) => fs::rename(backup, &target),
                None => fs::remove_file(&target),
            };
            if let Err(err) = restored {
                warn!("Failed to roll back {}: {err}", target.display());
            }
        }
    }

    /// Removes created directories, innermost first. Directories that are
    /// no longer empty are left alone.
    fn remove_created_dirs(&mut self) {
        for dir in self.created_dirs.drain(..).rev() {
            if fs::remove_dir(&dir).is_err() {
                debug!("Kept directory {}", dir.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str, content: &str) -> Artifact {
        Artifact {
            path: path.into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_persist_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let written = persist(
            dir.path(),
            &[
                artifact("Domain/Entities/User.cs", "class User {}"),
                artifact("Common/Queries/UserQuery.cs", "class UserQuery {}"),
            ],
        )
        .unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Domain/Entities/User.cs")).unwrap(),
            "class User {}"
        );
    }

    #[test]
    fn test_persist_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        persist(dir.path(), &[artifact("A.cs", "old")]).unwrap();
        persist(dir.path(), &[artifact("A.cs", "new")]).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("A.cs")).unwrap(), "new");
    }

    #[test]
    fn test_escaping_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = persist(
            dir.path(),
            &[artifact("Ok.cs", "fine"), artifact("Common/../../Evil.cs", "bad")],
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::PathEscapesRoot(_)));
        assert!(!dir.path().join("Ok.cs").exists());
    }

    #[test]
    fn test_rejects_absolute_and_empty_paths() {
        assert!(resolve_artifact_path(Path::new("out"), "/etc/passwd").is_err());
        assert!(resolve_artifact_path(Path::new("out"), "").is_err());
        assert!(resolve_artifact_path(Path::new("out"), "./A.cs").is_ok());
    }

    #[test]
    fn test_empty_run_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        assert!(persist(&root, &[]).unwrap().is_empty());
        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        std::fs::create_dir_all(root.join("Common/Repositories/UserRepository.cs")).unwrap();

        let err = persist(
            &root,
            &[
                artifact("Domain/Entities/User.cs", "class User {}"),
                artifact("Common/Queries/UserQuery.cs", "class UserQuery {}"),
                artifact("Common/Repositories/UserRepository.cs", "class UserRepository {}"),
            ],
        )
        .unwrap_err();

        assert!(matches!(err, StoreError::IoError(_)));
        assert!(!root.join("Domain").exists());
        assert!(!root.join("Common/Queries").exists());
        assert!(root.join("Common/Repositories/UserRepository.cs").is_dir());
        let leftovers: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("Common")]);
    }

    #[test]
    fn test_failed_write_restores_overwritten_files() {
        let dir = tempfile::tempdir().unwrap();
        persist(dir.path(), &[artifact("A.cs", "old")]).unwrap();
        std::fs::create_dir(dir.path().join("B.cs")).unwrap();

        persist(dir.path(), &[artifact("A.cs", "new"), artifact("B.cs", "b")]).unwrap_err();
        assert_eq!(std::fs::read_to_string(dir.path().join("A.cs")).unwrap(), "old");
    }

    #[test]
    fn test_failed_write_removes_created_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("fresh/out");
        // A file where a directory is needed makes the second artifact fail.
        persist(&root, &[artifact("A.cs", "a"), artifact("A.cs/B.cs", "b")]).unwrap_err();
        assert!(!dir.path().join("fresh").exists());
    }
}
