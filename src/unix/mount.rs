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

//! Resolution of the mount point backing a given device.

use std::fs;
use std::os::unix::fs::MetadataExt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::TrashError;

/// Return every mount point currently known to the kernel, in mount-table order.
///
/// Reads `/proc/mounts` on Linux. The second whitespace-separated field of each line is the
/// mount point; paths containing spaces are octal-escaped by the kernel (e.g. `\040`), which we
/// leave unescaped here since none of the trash directories this crate creates can contain them.
fn list_mount_points() -> std::io::Result<Vec<Utf8PathBuf>> {
    let contents = fs::read_to_string("/proc/mounts")?;
    let mount_points = contents
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|field| Utf8Path::new(field).to_path_buf().into())
        .collect();
    Ok(mount_points)
}

/// Find the mount point whose root device matches `device`, scanning the mount table in order
/// and returning the first match.
pub(crate) fn mount_point_for_device(
    source_path: &Utf8Path,
    device: u64,
) -> Result<Utf8PathBuf, TrashError> {
    let mount_points =
        list_mount_points().map_err(|source| TrashError::StatFailed {
            path: source_path.to_owned(),
            source,
        })?;
    for mount_point in mount_points {
        let Ok(metadata) = fs::metadata(&mount_point) else {
            continue;
        };
        if metadata.dev() == device {
            return Ok(mount_point);
        }
    }
    Err(TrashError::MountNotFound {
        path: source_path.to_owned(),
    })
}
