//! Version allocation integration tests
//!
//! Drives the allocator against the directory-backed store under real
//! concurrency and checks the one guarantee that matters: per key, the
//! allocated set is consecutive with no duplicates and no gaps.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use persona_builder::versioning::{
    next_version, persona_versions, DirVersionStore, MemoryVersionStore, VersionAllocator,
};

// ─────────────────────────────────────────────────────────────────
// Sequential
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_fresh_key_first_call_returns_one() {
    let tmp = TempDir::new().unwrap();
    let allocator = VersionAllocator::new(DirVersionStore::new(tmp.path()));
    assert_eq!(allocator.allocate_next("rebecka").unwrap(), 1);
}

#[test]
fn test_sequential_calls_return_one_through_n() {
    let tmp = TempDir::new().unwrap();
    let allocator = VersionAllocator::new(DirVersionStore::new(tmp.path()));

    let versions: Vec<u32> = (0..5)
        .map(|_| allocator.allocate_next("rebecka").unwrap())
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_allocation_survives_process_restart() {
    let tmp = TempDir::new().unwrap();

    {
        let allocator = VersionAllocator::new(DirVersionStore::new(tmp.path()));
        allocator.allocate_next("rebecka").unwrap();
        allocator.allocate_next("rebecka").unwrap();
    }

    // A fresh allocator over the same tree continues the sequence
    let allocator = VersionAllocator::new(DirVersionStore::new(tmp.path()));
    assert_eq!(allocator.allocate_next("rebecka").unwrap(), 3);
}

// ─────────────────────────────────────────────────────────────────
// Concurrent
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_concurrent_same_key_no_duplicates_no_gaps() {
    let tmp = TempDir::new().unwrap();
    let allocator = Arc::new(VersionAllocator::new(DirVersionStore::new(tmp.path())));

    // Pre-existing max of 2
    allocator.allocate_next("rebecka").unwrap();
    allocator.allocate_next("rebecka").unwrap();

    let n: u32 = 12;
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || allocator.allocate_next("rebecka").unwrap())
        })
        .collect();

    let allocated: HashSet<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let expected: HashSet<u32> = (3..3 + n).collect();
    assert_eq!(allocated, expected);

    // The directory tree agrees
    assert_eq!(next_version(tmp.path(), "rebecka").unwrap(), 3 + n);
}

#[test]
fn test_concurrent_different_keys_all_start_at_one() {
    let tmp = TempDir::new().unwrap();
    let allocator = Arc::new(VersionAllocator::new(DirVersionStore::new(tmp.path())));

    let slugs = ["rebecka", "daniel", "sarah", "andrew"];
    let handles: Vec<_> = slugs
        .iter()
        .map(|slug| {
            let allocator = Arc::clone(&allocator);
            let slug = slug.to_string();
            thread::spawn(move || (slug.clone(), allocator.allocate_next(&slug).unwrap()))
        })
        .collect();

    for handle in handles {
        let (slug, version) = handle.join().unwrap();
        assert_eq!(version, 1, "first allocation for {} should be 1", slug);
    }
}

#[test]
fn test_concurrent_memory_store_matches_dir_store_semantics() {
    let allocator = Arc::new(VersionAllocator::new(MemoryVersionStore::new()));

    let n: u32 = 24;
    let handles: Vec<_> = (0..n)
        .map(|i| {
            let allocator = Arc::clone(&allocator);
            // Interleave two keys to check isolation under contention
            let key = if i % 2 == 0 { "even" } else { "odd" };
            thread::spawn(move || (key, allocator.allocate_next(key).unwrap()))
        })
        .collect();

    let mut even = HashSet::new();
    let mut odd = HashSet::new();
    for handle in handles {
        let (key, version) = handle.join().unwrap();
        let inserted = if key == "even" {
            even.insert(version)
        } else {
            odd.insert(version)
        };
        assert!(inserted, "duplicate version {} for key {}", version, key);
    }

    let expected: HashSet<u32> = (1..=n / 2).collect();
    assert_eq!(even, expected);
    assert_eq!(odd, expected);
}

// ─────────────────────────────────────────────────────────────────
// Catalog Agreement
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_catalog_reflects_allocations() {
    let tmp = TempDir::new().unwrap();
    let allocator = VersionAllocator::new(DirVersionStore::new(tmp.path()));

    allocator.allocate_next("rebecka").unwrap();
    allocator.allocate_next("rebecka").unwrap();
    allocator.allocate_next("rebecka").unwrap();

    let info = persona_versions(tmp.path(), "rebecka").unwrap();
    assert_eq!(info.total_versions, 3);
    assert_eq!(info.latest_version, 3);
    assert_eq!(info.next_version, 4);
    let versions: Vec<u32> = info.versions.iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
}
