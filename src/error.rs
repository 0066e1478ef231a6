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

//! The error taxonomy returned by a trash operation.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Every way a move-to-trash operation can fail.
///
/// This is a closed enum rather than an opaque `Box<dyn Error>`: callers are expected to match
/// on `kind`-like variants and the set is not meant to grow casually, since every variant maps
/// 1:1 to a stable, documented failure mode of the trash operation.
#[derive(Error, Debug)]
pub enum TrashError {
    /// Canonicalizing the source path failed.
    #[error("cannot resolve real path of '{path}': {source}")]
    RealPathFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither `XDG_DATA_HOME` nor `HOME` yields a usable home trash directory.
    #[error("cannot determine home trash directory: neither XDG_DATA_HOME nor HOME is usable")]
    NoHomeTrash,

    /// An `lstat`-equivalent call failed unexpectedly.
    #[error("cannot stat '{path}': {source}")]
    StatFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the home trash directory hierarchy failed.
    #[error("cannot create home trash directory '{path}': {source}")]
    MkdirHomeFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the admin (case 1) nor the user (case 2) top-directory trash could be prepared.
    #[error("cannot prepare a top-directory trash under '{mount_point}': {source}")]
    TopDirTrashFailed {
        mount_point: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The canonical source path has no final path segment.
    #[error("path '{path}' has no file name")]
    NameExtractFailed { path: Utf8PathBuf },

    /// Reading the wall clock failed.
    #[error("cannot read the current time: {0}")]
    TimeFailed(String),

    /// The name allocator could not produce a candidate entry name.
    #[error("cannot generate a trash entry name for '{path}'")]
    FilenameGenFailed { path: Utf8PathBuf },

    /// Creating the `.trashinfo` sidecar failed for a reason other than already existing.
    #[error("cannot create trashinfo file '{path}': {source}")]
    SidecarFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The final move of the source entry into the trash `files` directory failed.
    ///
    /// When this is returned, the sidecar created for this operation has already been removed.
    #[error("cannot move '{from}' to '{to}': {source}")]
    RenameFailed {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every counter value and the random fallback both collided.
    #[error("cannot allocate a unique trash entry name for '{path}' after exhausting retries")]
    CollisionExhausted { path: Utf8PathBuf },

    /// The entry was moved to the trash, but refreshing the `directorysizes` cache failed.
    #[error("entry was trashed, but cannot refresh directory size cache at '{path}': {source}")]
    SizeCacheFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No mount-table entry has a device matching the source path's device.
    #[error("cannot find the mount point containing '{path}'")]
    MountNotFound { path: Utf8PathBuf },

    /// The platform adapter (Windows, macOS) reported a failure.
    #[error("platform trash operation failed for '{path}': {source}")]
    PlatformFailed {
        path: Utf8PathBuf,
        #[source]
        source: PlatformError,
    },
}

/// The underlying platform error (an `HRESULT`'s message on Windows, an `NSError`'s
/// `localizedDescription` on macOS) behind a [TrashError::PlatformFailed].
///
/// Neither a COM `HRESULT` nor an Objective-C `NSError` pointer is safely storable in a
/// `Send + Sync + 'static` error enum, so the adapters capture the description text at the call
/// site and hand it across as this plain wrapper; callers that want the original error still
/// reach it through `Error::source()`, just as a message rather than a live object.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub(crate) String);
