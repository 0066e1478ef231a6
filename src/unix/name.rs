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

//! Generation of candidate trash entry names.

use std::ffi::CString;

use camino::Utf8Path;
use chrono::NaiveDateTime;
use rand::Rng;

const TRASHINFO_SUFFIX: &str = ".trashinfo";

/// A candidate stem for a trash entry, paired with the sidecar extension already accounted for
/// in its length.
pub(crate) struct Candidate {
    pub(crate) stem: String,
}

/// Produce the `counter`-th standard-form candidate for `basename` deleted at `deletion_time`,
/// or `None` if that candidate would not fit within the files directory's `NAME_MAX`.
///
/// The standard form is `basename + "%Y%m%d%H%M%S" + lowercase-hex(counter)`.
pub(crate) fn standard_candidate(
    files_dir: &Utf8Path,
    basename: &str,
    deletion_time: NaiveDateTime,
    counter: u32,
) -> Option<Candidate> {
    let timestamp = deletion_time.format("%Y%m%d%H%M%S");
    let stem = format!("{basename}{timestamp}{counter:x}");
    let candidate_len = stem.len() + TRASHINFO_SUFFIX.len();
    match name_max(files_dir) {
        Some(name_max) if candidate_len >= name_max => None,
        _ => Some(Candidate { stem }),
    }
}

/// Produce a random-form candidate: a hex string sized to exactly fill whatever room
/// `NAME_MAX - len(".trashinfo")` leaves, falling back to 32 hex characters (16 random bytes)
/// when the platform reports no limit.
///
/// Draws from a cryptographically strong source and emits an even number of *uppercase* hex
/// characters, two per random byte.
pub(crate) fn random_candidate(files_dir: &Utf8Path) -> Candidate {
    let hex_len = name_max(files_dir)
        .map(|name_max| name_max.saturating_sub(TRASHINFO_SUFFIX.len()))
        .filter(|&len| len > 0)
        .unwrap_or(32);
    let byte_len = hex_len / 2;
    let mut bytes = vec![0_u8; byte_len.max(1)];
    rand::thread_rng().fill(bytes.as_mut_slice());
    let stem = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
    Candidate { stem }
}

/// Query `_PC_NAME_MAX` for `dir`, returning `None` if the platform reports no limit.
fn name_max(dir: &Utf8Path) -> Option<usize> {
    let c_path = CString::new(dir.as_str()).ok()?;
    // SAFETY: c_path is a valid NUL-terminated C string for the lifetime of the call.
    let result = unsafe { libc::pathconf(c_path.as_ptr(), libc::_PC_NAME_MAX) };
    if result < 0 { None } else { Some(result as usize) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 17)
            .unwrap()
            .and_hms_opt(13, 14, 15)
            .unwrap()
    }

    #[test]
    fn test_standard_candidate_shape() {
        let candidate = standard_candidate(Utf8Path::new("/tmp"), "file.txt", test_time(), 0)
            .expect("should fit under NAME_MAX");
        assert_eq!(candidate.stem, "file.txt202502171314150");
    }

    #[test]
    fn test_standard_candidate_counter_is_hex() {
        let candidate = standard_candidate(Utf8Path::new("/tmp"), "file.txt", test_time(), 11)
            .expect("should fit under NAME_MAX");
        assert!(candidate.stem.ends_with('b'));
    }

    #[test]
    fn test_random_candidate_is_hex() {
        let candidate = random_candidate(Utf8Path::new("/tmp"));
        assert!(!candidate.stem.is_empty());
        assert!(candidate.stem.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
