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

//! A library that moves files and directories to the operating system's trash.
//!
//! On Unix-like systems this implements the Freedesktop.org Trash Specification v1.0: it
//! resolves the correct trash directory for a given path (taking filesystem boundaries, the
//! admin- and user-provided top-directory trash conventions, and sticky-bit safety into
//! account), allocates a collision-free name, writes the `.trashinfo` sidecar, moves the entry,
//! and refreshes the `directorysizes` cache. On Windows and macOS, [trash] delegates to the
//! native, OS-provided reversible delete instead.

mod error;
mod path_ext;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(target_os = "macos")]
mod macos;

use camino::Utf8Path;

pub use error::TrashError;

/// Move the entity at `path` to the trash.
///
/// On success the entity no longer exists at `path`; it has been moved into a trash directory
/// together with metadata recording its original location and deletion time.
pub fn trash(path: impl AsRef<Utf8Path>) -> Result<(), TrashError> {
    let path = path.as_ref();

    #[cfg(target_os = "macos")]
    {
        return macos::trash(path);
    }

    #[cfg(windows)]
    {
        return windows::trash(path, true);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        return unix::put(path);
    }

    #[cfg(not(any(unix, windows)))]
    compile_error!("xdgtrash has no trash implementation for this target platform");
}

/// Move the entity at `path` to the Recycle Bin, choosing whether this call initializes COM.
///
/// Pass `init_com: true` (what [trash] does) unless the caller already manages COM
/// initialization on the current thread, e.g. a GUI application running its own message loop.
#[cfg(windows)]
pub fn trash_windows(path: impl AsRef<Utf8Path>, init_com: bool) -> Result<(), TrashError> {
    windows::trash(path.as_ref(), init_com)
}
