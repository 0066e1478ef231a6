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

//! The `.trashinfo` sidecar: its format, and its exclusive creation.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use ini::Ini;

use crate::path_ext::uri_escape;

const TRASH_INFO: &str = "Trash Info";
const PATH: &str = "Path";
const DELETION_DATE: &str = "DeletionDate";

/// The parsed contents of a `.trashinfo` file.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TrashInfo {
    pub(crate) path: Utf8PathBuf,
    pub(crate) deletion_time: NaiveDateTime,
}

impl TrashInfo {
    /// Render this info as the literal `[Trash Info]` block written to a sidecar file.
    ///
    /// The block is built by hand, one `Ini` section with two entries, rather than read back
    /// through `rust-ini`'s writer, so the exact three-line shape required by the specification
    /// is guaranteed regardless of how `rust-ini` chooses to format a generic document.
    fn render(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some(TRASH_INFO))
            .set(PATH, uri_escape(self.path.as_str()))
            .set(
                DELETION_DATE,
                self.deletion_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            );
        let mut buffer = Vec::new();
        ini.write_to(&mut buffer)
            .expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(buffer).expect("rust-ini emits valid UTF-8")
    }

    #[cfg(test)]
    pub(crate) fn parse(contents: &str) -> Option<Self> {
        let ini = Ini::load_from_str(contents).ok()?;
        let section = ini.section(Some(TRASH_INFO))?;
        let path = section.get(PATH)?;
        let path = urlencoding::decode(path).ok()?;
        let deletion_time = section.get(DELETION_DATE)?.parse().ok()?;
        Some(Self {
            path: Utf8PathBuf::from(path.as_ref()),
            deletion_time,
        })
    }
}

/// The outcome of attempting to create a sidecar exclusively.
pub(crate) enum SidecarOutcome {
    Created,
    Collision,
}

/// Create `sidecar_path` with `O_EXCL` semantics and write `info`'s rendered contents into it.
///
/// Returns [SidecarOutcome::Collision] (without touching the filesystem further) when the path
/// already exists, so the caller can retry with a different candidate name; any other failure
/// is returned as an `io::Error` for the caller to wrap in a taxonomised [crate::TrashError].
pub(crate) fn create_exclusive(
    sidecar_path: &Utf8Path,
    info: &TrashInfo,
) -> std::io::Result<SidecarOutcome> {
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(sidecar_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Ok(SidecarOutcome::Collision);
        }
        Err(err) => return Err(err),
    };
    file.write_all(info.render().as_bytes())?;
    Ok(SidecarOutcome::Created)
}
