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

//! A thin adapter over `NSFileManager`'s `trashItemAtURL:resultingItemURL:error:`, the Cocoa
//! call every well-behaved macOS application uses to move a file to the Trash. This is not an
//! implementation of the Freedesktop.org specification: macOS already has its own reversible
//! delete, implemented as part of Foundation rather than anything this crate needs to recreate.

use camino::Utf8Path;
use objc::runtime::{Class, Object};
use objc::{class, msg_send, sel, sel_impl};

use crate::error::{PlatformError, TrashError};

/// Move `path` to the Trash via `NSFileManager`.
pub(crate) fn trash(path: &Utf8Path) -> Result<(), TrashError> {
    // SAFETY: every Objective-C message send below targets a class/selector documented by
    // Foundation; `nil` out-parameters are valid per the Cocoa calling convention.
    unsafe {
        let nsstring_class = class!(NSString);
        let path_cstring = std::ffi::CString::new(path.as_str()).map_err(|_| {
            TrashError::PlatformFailed {
                path: path.to_owned(),
                source: PlatformError("path contains an interior NUL byte".to_owned()),
            }
        })?;
        let ns_path: *mut Object =
            msg_send![nsstring_class, stringWithUTF8String: path_cstring.as_ptr()];
        let file_manager: *mut Object = msg_send![class!(NSFileManager), defaultManager];
        let ns_url_class: &Class = class!(NSURL);
        let ns_url: *mut Object = msg_send![ns_url_class, fileURLWithPath: ns_path];

        let mut error: *mut Object = std::ptr::null_mut();
        let success: bool = msg_send![
            file_manager,
            trashItemAtURL: ns_url
            resultingItemURL: std::ptr::null_mut::<*mut Object>()
            error: &mut error
        ];

        if success {
            Ok(())
        } else {
            let description = if error.is_null() {
                "unknown NSFileManager error".to_owned()
            } else {
                let ns_description: *mut Object = msg_send![error, localizedDescription];
                let utf8: *const std::os::raw::c_char = msg_send![ns_description, UTF8String];
                if utf8.is_null() {
                    "unknown NSFileManager error".to_owned()
                } else {
                    std::ffi::CStr::from_ptr(utf8).to_string_lossy().into_owned()
                }
            };
            Err(TrashError::PlatformFailed {
                path: path.to_owned(),
                source: PlatformError(description),
            })
        }
    }
}
