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

//! Selection and preparation of the trash root backing a given source path.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use xdg::BaseDirectories;

use crate::error::TrashError;
use crate::path_ext::create_dir_all_with_mode;
use crate::unix::mount;

/// Which of the three Freedesktop trash shapes a [TrashRoot] was derived from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TrashRootKind {
    /// `$XDG_DATA_HOME/Trash` (or its `$HOME/.local/share/Trash` fallback).
    Home,
    /// `$mount/.Trash/$uid`, used only when `$mount/.Trash` passes the sticky-bit/symlink checks.
    TopDirAdmin,
    /// `$mount/.Trash-$uid`.
    TopDirUser,
}

/// A prepared trash root: `base`, plus its `info` and `files` subdirectories.
#[derive(Clone, Debug)]
pub(crate) struct TrashRoot {
    pub(crate) kind: TrashRootKind,
    pub(crate) base_dir: Utf8PathBuf,
    pub(crate) info_dir: Utf8PathBuf,
    pub(crate) files_dir: Utf8PathBuf,
}

impl TrashRoot {
    fn new(kind: TrashRootKind, base_dir: Utf8PathBuf) -> Self {
        let info_dir = base_dir.join("info");
        let files_dir = base_dir.join("files");
        Self {
            kind,
            base_dir,
            info_dir,
            files_dir,
        }
    }

    fn ensure_created(self) -> Result<Self, TrashError> {
        for dir in [&self.base_dir, &self.info_dir, &self.files_dir] {
            create_dir_all_with_mode(dir, 0o700).map_err(|source| match self.kind {
                TrashRootKind::Home => TrashError::MkdirHomeFailed {
                    path: dir.to_owned(),
                    source,
                },
                TrashRootKind::TopDirAdmin | TrashRootKind::TopDirUser => {
                    TrashError::TopDirTrashFailed {
                        mount_point: dir.to_owned(),
                        source,
                    }
                }
            })?;
        }
        Ok(self)
    }
}

/// Return the default base directory of the home trash: `$XDG_DATA_HOME/Trash`.
fn home_base_dir() -> Result<Utf8PathBuf, TrashError> {
    let data_home = BaseDirectories::default()
        .get_data_home()
        .ok_or(TrashError::NoHomeTrash)?;
    let data_home =
        Utf8PathBuf::from_path_buf(data_home).map_err(|_| TrashError::NoHomeTrash)?;
    Ok(data_home.join("Trash"))
}

/// Select and prepare the trash root that a move of `source_path` (living on device
/// `source_device`) must use.
///
/// Implements the locator algorithm of the Freedesktop specification: the home trash is used
/// whenever the source shares its device with the home trash base; otherwise a top-directory
/// trash is resolved from the source's mount point, preferring the admin-provided case 1
/// location when it passes its safety checks and falling back to the per-user case 2 location.
pub(crate) fn select_trash_root(
    source_path: &Utf8Path,
    source_device: u64,
) -> Result<TrashRoot, TrashError> {
    let home_base = home_base_dir()?;
    let home_device = home_device(&home_base)?;
    if source_device == home_device {
        debug!("using home trash at {home_base}");
        return TrashRoot::new(TrashRootKind::Home, home_base).ensure_created();
    }

    let mount_point = mount::mount_point_for_device(source_path, source_device)?;
    if let Some(root) = top_dir_admin_root(&mount_point)? {
        debug!("using admin top-directory trash at {}", root.base_dir);
        return root.ensure_created();
    }
    debug!(
        "admin top-directory trash unavailable under {mount_point}, falling back to user trash"
    );
    top_dir_user_root(&mount_point).ensure_created()
}

/// Determine the device backing the home trash base, creating its ancestor (with mode `0700`,
/// per the specification) if it does not exist yet so that `stat` has something to examine.
fn home_device(home_base: &Utf8Path) -> Result<u64, TrashError> {
    if let Some(parent) = home_base.parent() {
        create_dir_all_with_mode(parent, 0o700).map_err(|source| TrashError::MkdirHomeFailed {
            path: parent.to_owned(),
            source,
        })?;
    }
    let stat_target = if home_base.is_dir() {
        home_base
    } else {
        home_base.parent().unwrap_or(home_base)
    };
    fs::metadata(stat_target)
        .map(|metadata| metadata.dev())
        .map_err(|source| TrashError::StatFailed {
            path: stat_target.to_owned(),
            source,
        })
}

/// Attempt the case 1 (admin-provided) top-directory trash: `$mount/.Trash/$uid`.
///
/// Accepted only if `$mount/.Trash` exists, is a directory, is not a symbolic link, and has the
/// sticky bit set — the same three checks the specification requires and that
/// `get_trash_dirs_from_mounts` performs before trusting a shared `.Trash` directory.
fn top_dir_admin_root(mount_point: &Utf8Path) -> Result<Option<TrashRoot>, TrashError> {
    let admin_dir = mount_point.join(".Trash");
    let metadata = match fs::symlink_metadata(&admin_dir) {
        Ok(metadata) => metadata,
        Err(_) => return Ok(None),
    };
    if metadata.is_symlink() || !metadata.is_dir() {
        return Ok(None);
    }
    if metadata.permissions().mode() & libc::S_ISVTX as u32 == 0 {
        return Ok(None);
    }
    let base_dir = admin_dir.join(uid().to_string());
    Ok(Some(TrashRoot::new(TrashRootKind::TopDirAdmin, base_dir)))
}

/// The case 2 (per-user) top-directory trash: `$mount/.Trash-$uid`.
fn top_dir_user_root(mount_point: &Utf8Path) -> TrashRoot {
    let base_dir = mount_point.join(format!(".Trash-{}", uid()));
    TrashRoot::new(TrashRootKind::TopDirUser, base_dir)
}

fn uid() -> u32 {
    // SAFETY: getuid() has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}
