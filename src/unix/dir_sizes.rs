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

//! The `directorysizes` cache: its on-disk format, and recomputation on every trash move.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use rand::Rng;

use crate::path_ext::uri_escape;

/// One row of the `directorysizes` file: the cumulative byte size of a trashed directory, paired
/// with the modification time of its sidecar at the moment the row was written.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DirSize {
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) mtime: u64,
}

pub(crate) type DirSizes = HashMap<String, DirSize>;

/// Roughly 2200-01-01 at midnight: the implementation-detail correction described in the
/// `directorysizes` reader, kept because some implementations (e.g. Dolphin) store
/// milliseconds, not seconds, and would otherwise be misread as seconds for centuries.
const MILLISECOND_HEURISTIC_LIMIT: u64 = 7_258_122_000;

fn parse_line(line: &str) -> Option<DirSize> {
    let mut fields = line.split_whitespace();
    let size = fields.next()?.parse::<u64>().ok()?;
    let mut mtime = fields.next()?.parse::<u64>().ok()?;
    if mtime > MILLISECOND_HEURISTIC_LIMIT {
        mtime /= 1000;
    }
    let name = urlencoding::decode(fields.next()?).ok()?.into_owned();
    Some(DirSize { name, size, mtime })
}

/// Load the existing `directorysizes` cache, returning an empty map if it does not exist.
#[cfg(test)]
pub(crate) fn load(base_dir: &Utf8Path) -> DirSizes {
    let path = base_dir.join("directorysizes");
    let Ok(file) = File::open(&path) else {
        return DirSizes::new();
    };
    let mut dir_sizes = DirSizes::new();
    for line in BufReader::new(file).lines().map_while(Result::ok) {
        if let Some(dir_size) = parse_line(line.trim()) {
            dir_sizes.insert(dir_size.name.clone(), dir_size);
        }
    }
    dir_sizes
}

/// Recompute and atomically replace the `directorysizes` cache for `base_dir`.
///
/// For every immediate child directory of `files_dir` that still has a paired sidecar in
/// `info_dir`, sum the byte size of every regular file reachable from it and emit one row. A
/// child directory whose sidecar has gone missing is skipped silently — that row is simply not
/// emitted — but also logged at `warn` so the omission is not completely invisible.
pub(crate) fn refresh(
    base_dir: &Utf8Path,
    info_dir: &Utf8Path,
    files_dir: &Utf8Path,
) -> std::io::Result<()> {
    let mut rows = Vec::new();
    if files_dir.is_dir() {
        for entry in fs::read_dir(files_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let sidecar_path = info_dir.join(format!("{name}.trashinfo"));
            let Ok(sidecar_metadata) = fs::metadata(&sidecar_path) else {
                warn!("skipping directory size row for '{name}': sidecar is missing");
                continue;
            };
            let size = directory_byte_size(&entry.path())?;
            let mtime = file_mtime_seconds(&sidecar_metadata);
            rows.push(format!("{size} {mtime} {}\n", uri_escape(name)));
        }
    }

    let tmp_path = base_dir.join(random_suffix());
    {
        let mut tmp_file = File::create(&tmp_path)?;
        for row in &rows {
            tmp_file.write_all(row.as_bytes())?;
        }
    }
    let final_path = base_dir.join("directorysizes");
    match fs::rename(&tmp_path, &final_path) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

fn directory_byte_size(path: &std::path::Path) -> std::io::Result<u64> {
    let mut total = 0_u64;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += directory_byte_size(&entry.path())?;
        } else if file_type.is_file() {
            total += entry.metadata()?.len();
        }
        // Symbolic links and other file kinds contribute 0, as specified.
    }
    Ok(total)
}

fn file_mtime_seconds(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|mtime| mtime.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

/// The smallest filename length POSIX guarantees every filesystem supports, used to size the
/// `directorysizes` temp file so it fits even on the most constrained target.
const POSIX_NAME_MAX: usize = 14;

/// A bare, unprefixed random hex string of `_POSIX_NAME_MAX` characters, used as the temp
/// filename for the atomic `directorysizes` swap.
fn random_suffix() -> String {
    let mut bytes = [0_u8; POSIX_NAME_MAX.div_ceil(2)];
    rand::thread_rng().fill(bytes.as_mut_slice());
    let mut hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
    hex.truncate(POSIX_NAME_MAX);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let dir_size = parse_line("1024 1700000000 my%20dir").unwrap();
        assert_eq!(dir_size.name, "my dir");
        assert_eq!(dir_size.size, 1024);
        assert_eq!(dir_size.mtime, 1700000000);
    }

    #[test]
    fn test_parse_line_millisecond_correction() {
        let dir_size = parse_line("1024 1700000000000 my_dir").unwrap();
        assert_eq!(dir_size.mtime, 1700000000);
    }

    #[test]
    fn test_refresh_round_trip() {
        let temp = assert_fs::TempDir::new().unwrap();
        let base_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let info_dir = base_dir.join("info");
        let files_dir = base_dir.join("files");
        fs::create_dir_all(&info_dir).unwrap();
        fs::create_dir_all(files_dir.join("subdir")).unwrap();
        fs::write(files_dir.join("subdir").join("a.txt"), b"abc").unwrap();
        fs::write(info_dir.join("subdir.trashinfo"), b"[Trash Info]\n").unwrap();

        refresh(&base_dir, &info_dir, &files_dir).unwrap();

        let dir_sizes = load(&base_dir);
        let entry = dir_sizes.get("subdir").unwrap();
        assert_eq!(entry.size, 3);
    }

    #[test]
    fn test_refresh_skips_directory_without_sidecar() {
        let temp = assert_fs::TempDir::new().unwrap();
        let base_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let info_dir = base_dir.join("info");
        let files_dir = base_dir.join("files");
        fs::create_dir_all(&info_dir).unwrap();
        fs::create_dir_all(files_dir.join("orphan")).unwrap();

        refresh(&base_dir, &info_dir, &files_dir).unwrap();

        assert!(load(&base_dir).get("orphan").is_none());
    }
}
