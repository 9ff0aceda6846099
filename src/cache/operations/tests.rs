//! Tests for cache operations.

use super::*;
use camino::Utf8Path;
use rstest::{fixture, rstest};
use std::fs;
use tempfile::{TempDir, tempdir};

const ARTIFACT: &str = "tailwindcss-linux-x64";

struct CacheFixture {
    _temp: TempDir,
    cache: BinaryCache,
}

#[fixture]
fn populated() -> CacheFixture {
    let temp = tempdir().expect("tempdir");
    let dir = Utf8Path::from_path(temp.path())
        .expect("utf8 path")
        .join("binaries");
    fs::create_dir_all(&dir).expect("create binaries dir");
    CacheFixture {
        cache: BinaryCache::new(dir, ArtifactName::new(ARTIFACT)),
        _temp: temp,
    }
}

fn tag(raw: &str) -> ReleaseTag {
    ReleaseTag::parse(raw).expect("valid tag")
}

fn write_entry(cache: &BinaryCache, file_name: &str) -> Utf8PathBuf {
    let path = cache.dir().join(file_name);
    fs::write(&path, b"#!/bin/sh\n").expect("write cache entry");
    path
}

#[rstest]
fn exists_reports_hit_only_for_matching_entry(populated: CacheFixture) {
    write_entry(&populated.cache, "v4.0.0_tailwindcss-linux-x64");

    assert!(populated.cache.exists(&tag("v4.0.0")));
    assert!(!populated.cache.exists(&tag("v3.4.17")));
}

#[rstest]
fn exists_ignores_entries_for_other_artifacts(populated: CacheFixture) {
    write_entry(&populated.cache, "v4.0.0_tailwindcss-linux-x64-musl");

    assert!(!populated.cache.exists(&tag("v4.0.0")));
}

#[rstest]
fn find_latest_installed_returns_highest_version(populated: CacheFixture) {
    write_entry(&populated.cache, "v3.4.17_tailwindcss-linux-x64");
    let newest = write_entry(&populated.cache, "v4.0.0_tailwindcss-linux-x64");
    write_entry(&populated.cache, "v4.0.0-beta.9_tailwindcss-linux-x64");

    let (found, path) = populated
        .cache
        .find_latest_installed()
        .expect("installed version");
    assert_eq!(found, tag("v4.0.0"));
    assert_eq!(path, newest);
}

#[rstest]
fn find_latest_installed_compares_semantically(populated: CacheFixture) {
    write_entry(&populated.cache, "v3.10.0_tailwindcss-linux-x64");
    write_entry(&populated.cache, "v3.9.0_tailwindcss-linux-x64");

    let (found, _) = populated
        .cache
        .find_latest_installed()
        .expect("installed version");
    assert_eq!(found, tag("v3.10.0"));
}

#[rstest]
fn find_latest_installed_skips_unparsable_and_foreign_entries(populated: CacheFixture) {
    write_entry(&populated.cache, "vnext_tailwindcss-linux-x64");
    write_entry(&populated.cache, "v9.0.0_tailwindcss-macos-arm64");
    write_entry(&populated.cache, ".tmpAbC123");
    write_entry(&populated.cache, "v3.4.17_tailwindcss-linux-x64");

    let (found, _) = populated
        .cache
        .find_latest_installed()
        .expect("installed version");
    assert_eq!(found, tag("v3.4.17"));
}

#[rstest]
fn find_latest_installed_returns_none_for_empty_directory(populated: CacheFixture) {
    assert!(populated.cache.find_latest_installed().is_none());
}

#[test]
fn find_latest_installed_returns_none_for_missing_directory() {
    let temp = tempdir().expect("tempdir");
    let dir = Utf8Path::from_path(temp.path())
        .expect("utf8 path")
        .join("absent");
    let cache = BinaryCache::new(dir, ArtifactName::new(ARTIFACT));

    assert!(cache.find_latest_installed().is_none());
}

#[rstest]
fn remove_all_deletes_files_and_keeps_lock_directory(populated: CacheFixture) {
    write_entry(&populated.cache, "v3.4.17_tailwindcss-linux-x64");
    write_entry(&populated.cache, "v4.0.0_tailwindcss-macos-arm64");
    let locks = populated.cache.dir().join(".locks");
    fs::create_dir_all(&locks).expect("create locks dir");

    let removed = populated.cache.remove_all().expect("remove all");

    assert_eq!(removed, 2);
    assert!(populated.cache.find_latest_installed().is_none());
    assert!(locks.is_dir());
}

#[rstest]
fn remove_all_is_idempotent(populated: CacheFixture) {
    assert_eq!(populated.cache.remove_all().expect("first clean"), 0);
    assert_eq!(populated.cache.remove_all().expect("second clean"), 0);
}

#[test]
fn remove_all_tolerates_missing_directory() {
    let temp = tempdir().expect("tempdir");
    let dir = Utf8Path::from_path(temp.path())
        .expect("utf8 path")
        .join("never-created");
    let cache = BinaryCache::new(dir, ArtifactName::new(ARTIFACT));

    assert_eq!(cache.remove_all().expect("clean"), 0);
}

#[test]
fn ensure_dir_creates_missing_directory() {
    let temp = tempdir().expect("tempdir");
    let dir = Utf8Path::from_path(temp.path())
        .expect("utf8 path")
        .join("nested/binaries");
    let cache = BinaryCache::new(dir.clone(), ArtifactName::new(ARTIFACT));

    cache.ensure_dir().expect("ensure dir");
    assert!(dir.is_dir());
}
