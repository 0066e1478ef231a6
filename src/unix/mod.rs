// Copyright 2025 Laurent Pireyn
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The Freedesktop.org Trash Specification v1.0 core, for Unix-like targets.

mod dir_sizes;
mod mount;
mod name;
mod root;
mod sidecar;

use std::fs;
use std::os::unix::fs::MetadataExt;

use camino::Utf8Path;
use chrono::Local;
use log::{debug, warn};

use crate::error::TrashError;
use name::Candidate;
use root::TrashRoot;
use sidecar::{SidecarOutcome, TrashInfo};

/// Move the entity at `path` into the appropriate trash directory.
///
/// Implements the orchestrator state machine of the specification: resolve the real path,
/// select (and prepare) a trash root on the same device, allocate a collision-free entry name,
/// create its `.trashinfo` sidecar exclusively, rename the entry in, and refresh the
/// `directorysizes` cache. A failure to refresh the cache is reported but does not undo the
/// move, since the entry is already safely in the trash by that point.
pub(crate) fn put(path: &Utf8Path) -> Result<(), TrashError> {
    let canonical_path = path
        .canonicalize_utf8()
        .map_err(|source| TrashError::RealPathFailed {
            path: path.to_owned(),
            source,
        })?;
    let basename = canonical_path
        .file_name()
        .ok_or_else(|| TrashError::NameExtractFailed {
            path: canonical_path.clone(),
        })?
        .to_owned();
    let source_device = fs::symlink_metadata(&canonical_path)
        .map_err(|source| TrashError::StatFailed {
            path: canonical_path.clone(),
            source,
        })?
        .dev();

    let trash_root = root::select_trash_root(&canonical_path, source_device)?;
    debug!("selected trash root {:?} for {canonical_path}", trash_root.kind);

    let info = TrashInfo {
        path: canonical_path.clone(),
        deletion_time: Local::now().naive_local(),
    };
    let stem = allocate_entry_name(&trash_root, &basename, &info)?;

    let source_entry = &canonical_path;
    let target_entry = trash_root.files_dir.join(&stem);
    if let Err(source) = fs::rename(source_entry, &target_entry) {
        let sidecar_path = trash_root.info_dir.join(format!("{stem}.trashinfo"));
        let _ = fs::remove_file(&sidecar_path);
        return Err(TrashError::RenameFailed {
            from: source_entry.clone(),
            to: target_entry,
            source,
        });
    }

    if let Err(source) = dir_sizes::refresh(
        &trash_root.base_dir,
        &trash_root.info_dir,
        &trash_root.files_dir,
    ) {
        warn!("failed to refresh directorysizes cache at {}: {source}", trash_root.base_dir);
        return Err(TrashError::SizeCacheFailed {
            path: trash_root.base_dir,
            source,
        });
    }

    Ok(())
}

/// Drive the sidecar-creation retry loop: try the standard-form name at increasing counters,
/// then fall back to the random form once the counter space is exhausted (or a candidate would
/// overflow `NAME_MAX`), and give up entirely if even that collides.
fn allocate_entry_name(
    trash_root: &TrashRoot,
    basename: &str,
    info: &TrashInfo,
) -> Result<String, TrashError> {
    let files_dir = &trash_root.files_dir;
    let deletion_time = info.deletion_time;

    for counter in 0..=u32::MAX {
        let candidate = match name::standard_candidate(files_dir, basename, deletion_time, counter)
        {
            Some(candidate) => candidate,
            None => break,
        };
        match try_create_sidecar(trash_root, &candidate, info)? {
            Some(stem) => return Ok(stem),
            None => continue,
        }
    }

    let candidate = name::random_candidate(files_dir);
    match try_create_sidecar(trash_root, &candidate, info)? {
        Some(stem) => Ok(stem),
        None => Err(TrashError::CollisionExhausted {
            path: info.path.clone(),
        }),
    }
}

fn try_create_sidecar(
    trash_root: &TrashRoot,
    candidate: &Candidate,
    info: &TrashInfo,
) -> Result<Option<String>, TrashError> {
    let sidecar_path = trash_root
        .info_dir
        .join(format!("{}.trashinfo", candidate.stem));
    match sidecar::create_exclusive(&sidecar_path, info) {
        Ok(SidecarOutcome::Created) => Ok(Some(candidate.stem.clone())),
        Ok(SidecarOutcome::Collision) => Ok(None),
        Err(source) => Err(TrashError::SidecarFailed {
            path: sidecar_path,
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_xdg_data_home<T>(data_home: &assert_fs::TempDir, body: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap();
        // SAFETY: serialized by ENV_LOCK above.
        unsafe { std::env::set_var("XDG_DATA_HOME", data_home.path()) };
        let result = body();
        unsafe { std::env::remove_var("XDG_DATA_HOME") };
        result
    }

    #[test]
    fn test_put_moves_file_into_home_trash() {
        let data_home = assert_fs::TempDir::new().unwrap();
        let source = assert_fs::NamedTempFile::new("doomed.txt").unwrap();
        source.write_str("abc").unwrap();
        let source_path = Utf8Path::from_path(source.path()).unwrap().to_owned();

        with_xdg_data_home(&data_home, || {
            put(&source_path).unwrap();
        });

        assert!(!source_path.exists());
        let files_dir = Utf8Path::from_path(data_home.path())
            .unwrap()
            .join("Trash")
            .join("files");
        assert_eq!(fs::read_dir(&files_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_put_missing_source_is_real_path_failed() {
        let data_home = assert_fs::TempDir::new().unwrap();
        let missing = Utf8Path::from_path(data_home.path())
            .unwrap()
            .join("missing.txt");
        with_xdg_data_home(&data_home, || {
            let result = put(&missing);
            assert!(matches!(result, Err(TrashError::RealPathFailed { .. })));
        });
    }
}
