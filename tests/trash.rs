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

//! End-to-end tests of the public `trash` entry point, driven through the library crate
//! directly rather than the `trash` binary so each test can control `XDG_DATA_HOME` without
//! process-spawn overhead.
//!
//! These tests mutate the process environment (`XDG_DATA_HOME`) and therefore run serially;
//! `cargo test` runs tests in a single binary on separate threads by default, so each test sets
//! and restores the variable around its own body rather than relying on isolation.

use std::ffi::OsStr;
use std::sync::Mutex;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use camino::Utf8Path;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn with_xdg_data_home<T>(data_home: impl AsRef<OsStr>, body: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK.lock().unwrap();
    // SAFETY: serialized by ENV_LOCK above.
    unsafe { std::env::set_var("XDG_DATA_HOME", data_home.as_ref()) };
    let result = body();
    unsafe { std::env::remove_var("XDG_DATA_HOME") };
    result
}

#[test]
fn trash_moves_file_into_home_trash_and_writes_sidecar() {
    let data_home = TempDir::new().unwrap();
    let file = assert_fs::NamedTempFile::new("notes.txt").unwrap();
    file.write_str("abc").unwrap();
    let file_path = Utf8Path::from_path(file.path()).unwrap().to_owned();

    with_xdg_data_home(data_home.path(), || {
        xdgtrash::trash(&file_path).unwrap();
    });

    assert!(!file_path.exists());

    let trash_base = Utf8Path::from_path(data_home.path()).unwrap().join("Trash");
    let files_dir = trash_base.join("files");
    let info_dir = trash_base.join("info");
    let trashed_names: Vec<_> = std::fs::read_dir(&files_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(trashed_names.len(), 1);
    let stem = &trashed_names[0];

    let sidecar_path = info_dir.join(format!("{stem}.trashinfo"));
    let sidecar_contents = std::fs::read_to_string(&sidecar_path).unwrap();
    assert!(sidecar_contents.starts_with("[Trash Info]\n"));
    assert!(sidecar_contents.contains(&format!("Path={file_path}")));
}

#[test]
fn trash_of_missing_path_is_an_error() {
    let data_home = TempDir::new().unwrap();
    let missing = Utf8Path::from_path(data_home.path())
        .unwrap()
        .join("missing.txt");

    with_xdg_data_home(data_home.path(), || {
        let result = xdgtrash::trash(&missing);
        assert!(result.is_err());
    });
}

#[test]
fn trash_escapes_special_characters_in_sidecar_path() {
    let data_home = TempDir::new().unwrap();
    let file = assert_fs::NamedTempFile::new("a b%c.txt").unwrap();
    file.write_str("abc").unwrap();
    let file_path = Utf8Path::from_path(file.path()).unwrap().to_owned();

    with_xdg_data_home(data_home.path(), || {
        xdgtrash::trash(&file_path).unwrap();
    });

    let info_dir = Utf8Path::from_path(data_home.path())
        .unwrap()
        .join("Trash")
        .join("info");
    let sidecar_contents = std::fs::read_dir(&info_dir)
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .next()
        .unwrap();
    assert!(sidecar_contents.contains("a%20b%25c.txt"));
}

#[test]
fn repeated_trashing_of_same_basename_does_not_collide() {
    let data_home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let first = dir.child("a.txt");
    first.write_str("one").unwrap();
    let second_dir = TempDir::new().unwrap();
    let second = second_dir.child("a.txt");
    second.write_str("two").unwrap();

    let first_path = Utf8Path::from_path(first.path()).unwrap().to_owned();
    let second_path = Utf8Path::from_path(second.path()).unwrap().to_owned();

    with_xdg_data_home(data_home.path(), || {
        xdgtrash::trash(&first_path).unwrap();
        xdgtrash::trash(&second_path).unwrap();
    });

    let files_dir = Utf8Path::from_path(data_home.path())
        .unwrap()
        .join("Trash")
        .join("files");
    assert_eq!(std::fs::read_dir(&files_dir).unwrap().count(), 2);
}

#[test]
fn trashing_a_directory_refreshes_directorysizes_cache() {
    let data_home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    dir.child("inner.txt").write_str("abcde").unwrap();
    let dir_path = Utf8Path::from_path(dir.path()).unwrap().to_owned();

    with_xdg_data_home(data_home.path(), || {
        xdgtrash::trash(&dir_path).unwrap();
    });

    let trash_base = Utf8Path::from_path(data_home.path()).unwrap().join("Trash");
    let cache_contents = std::fs::read_to_string(trash_base.join("directorysizes")).unwrap();
    assert!(cache_contents.trim_start().starts_with("5 "));
}
