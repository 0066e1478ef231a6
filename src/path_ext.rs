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

//! Path helpers shared by the trash backends.

use std::fs::DirBuilder;
#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

use camino::Utf8Path;

/// Create `path` and every missing ancestor with the given Unix permission bits.
///
/// Unlike [std::fs::create_dir_all], an existing directory is not an error, and on Unix
/// each newly created directory (not just the final one) gets `mode`.
pub fn create_dir_all_with_mode(path: impl AsRef<Utf8Path>, mode: u32) -> std::io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        create_dir_all_with_mode(parent, mode)?;
    }
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    builder.mode(mode);
    match builder.create(path) {
        Ok(()) => Ok(()),
        // Another thread or process may have created the directory concurrently.
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Percent-escape `path` per RFC 2396, preserving `/` and every other unreserved byte.
///
/// The set of bytes left unescaped is exactly `[A-Za-z0-9._~!*'()-]` plus the path separator
/// `/`; `/` must stay unescaped or a `Path=` field for any multi-segment path would round-trip
/// to the wrong string. Escaped bytes are emitted as `%` followed by two *uppercase* hex digits,
/// matching what existing `.trashinfo` readers expect.
pub fn uri_escape(path: impl AsRef<str>) -> String {
    fn is_unreserved(byte: u8) -> bool {
        matches!(
            byte,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'!' | b'*' | b'\'' | b'(' | b')' | b'/'
        )
    }

    let path = path.as_ref();
    let mut escaped = String::with_capacity(path.len());
    for byte in path.bytes() {
        if is_unreserved(byte) {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_escape_preserves_slash() {
        assert_eq!(uri_escape("/abc/def/ghi.xyz"), "/abc/def/ghi.xyz");
    }

    #[test]
    fn test_uri_escape_space_and_percent() {
        assert_eq!(uri_escape("/h/a b%c.txt"), "/h/a%20b%25c.txt");
    }

    #[test]
    fn test_uri_escape_unreserved_passthrough() {
        assert_eq!(uri_escape("a-B_c.d~e!f*g'h(i)"), "a-B_c.d~e!f*g'h(i)");
    }
}
