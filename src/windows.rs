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

//! A thin adapter over `IFileOperation`, the Shell API Windows itself uses to move files to the
//! Recycle Bin.
//!
//! This is not an implementation of the Freedesktop.org specification: Windows already has its
//! own reversible-delete mechanism, and `IFileOperation` with `FOF_ALLOWUNDO` is how every
//! well-behaved Windows application invokes it.

use std::os::windows::ffi::OsStrExt;

use camino::Utf8Path;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};
use windows::Win32::UI::Shell::{
    FileOperation, IFileOperation, SHCreateItemFromParsingName, FOF_ALLOWUNDO, FOF_NOCONFIRMATION,
    FOF_NO_UI,
};
use windows::core::PCWSTR;

use crate::error::{PlatformError, TrashError};

fn to_wide(path: &Utf8Path) -> Vec<u16> {
    std::ffi::OsStr::new(path.as_str())
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Move `path` to the Recycle Bin via `IFileOperation::DeleteItem`.
///
/// `init_com` selects whether this call initializes the COM subsystem for the current thread
/// (and uninitializes it again before returning); pass `false` when the caller already manages
/// COM initialization itself, e.g. a GUI application with its own message loop.
pub(crate) fn trash(path: &Utf8Path, init_com: bool) -> Result<(), TrashError> {
    // SAFETY: CoInitializeEx/CoCreateInstance/IFileOperation calls follow the documented COM
    // usage pattern; errors are propagated rather than unwrapped.
    unsafe {
        let com_initialized = init_com && CoInitializeEx(None, COINIT_APARTMENTTHREADED).is_ok();

        let result = (|| -> windows::core::Result<()> {
            let operation: IFileOperation = CoCreateInstance(&FileOperation, None, CLSCTX_ALL)?;
            operation.SetOperationFlags(FOF_ALLOWUNDO | FOF_NO_UI | FOF_NOCONFIRMATION)?;
            let wide_path = to_wide(path);
            let item = SHCreateItemFromParsingName(PCWSTR(wide_path.as_ptr()), None)?;
            operation.DeleteItem(&item, None)?;
            operation.PerformOperations()?;
            Ok(())
        })();

        if com_initialized {
            CoUninitialize();
        }

        result.map_err(|err| TrashError::PlatformFailed {
            path: path.to_owned(),
            source: PlatformError(err.message().to_string()),
        })
    }
}
