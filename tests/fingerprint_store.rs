mod common;
use crate::common::init_tracing;

use std::path::{Path, PathBuf};

use proptest::prelude::*;
use relaywatch::watch::{fingerprint, FingerprintChange, FingerprintStore};

#[test]
fn first_read_is_baseline_only() {
    init_tracing();

    let mut store = FingerprintStore::new();
    let path = Path::new("/data/ledger.log");

    assert_eq!(store.record_and_compare(path, b"anything"), FingerprintChange::FirstSeen);
    assert_eq!(store.get(path), Some(&fingerprint(b"anything")));
    assert_eq!(store.len(), 1);
}

#[test]
fn identical_content_is_unchanged_and_not_mutated() {
    let mut store = FingerprintStore::new();
    let path = Path::new("/data/ledger.log");

    store.record_and_compare(path, b"v1");
    let before = *store.get(path).unwrap();

    assert_eq!(store.record_and_compare(path, b"v1"), FingerprintChange::Unchanged);
    assert_eq!(store.get(path), Some(&before));
}

#[test]
fn changed_content_replaces_the_stored_digest() {
    let mut store = FingerprintStore::new();
    let path = Path::new("/data/ledger.log");

    store.record_and_compare(path, b"v1");
    assert_eq!(store.record_and_compare(path, b"v2"), FingerprintChange::Changed);
    assert_eq!(store.get(path), Some(&fingerprint(b"v2")));

    // Reverting is another change, not a return to some earlier state.
    assert_eq!(store.record_and_compare(path, b"v1"), FingerprintChange::Changed);
    assert_eq!(store.len(), 1);
}

#[test]
fn comparison_is_byte_exact_for_binary_content() {
    let mut store = FingerprintStore::new();
    let path = Path::new("/data/blob.bin");

    // Both decode to the same lossy UTF-8 text, but the bytes differ.
    store.record_and_compare(path, &[0xff, 0x00, 0xfe]);
    assert_eq!(
        store.record_and_compare(path, &[0xfe, 0x00, 0xff]),
        FingerprintChange::Changed
    );
    assert_eq!(
        store.record_and_compare(path, &[0xfe, 0x00, 0xff]),
        FingerprintChange::Unchanged
    );
}

#[test]
fn paths_are_tracked_independently() {
    let mut store = FingerprintStore::new();
    let a = PathBuf::from("/data/a.txt");
    let b = PathBuf::from("/data/b.txt");

    store.record_and_compare(&a, b"same");
    assert_eq!(store.record_and_compare(&b, b"same"), FingerprintChange::FirstSeen);
    assert_eq!(store.record_and_compare(&a, b"other"), FingerprintChange::Changed);
    assert_eq!(store.record_and_compare(&b, b"same"), FingerprintChange::Unchanged);
    assert_eq!(store.len(), 2);
}

proptest! {
    /// Feeding a sequence of reads for one path reports exactly one
    /// `FirstSeen`, then `Changed` precisely when consecutive contents differ,
    /// and always leaves the digest of the latest read in the store.
    #[test]
    fn reports_follow_consecutive_content_differences(
        reads in proptest::collection::vec(proptest::collection::vec(0u8..4, 0..4), 1..20)
    ) {
        let mut store = FingerprintStore::new();
        let path = Path::new("/data/prop.txt");

        for (i, content) in reads.iter().enumerate() {
            let change = store.record_and_compare(path, content);
            let expected = if i == 0 {
                FingerprintChange::FirstSeen
            } else if reads[i - 1] == *content {
                FingerprintChange::Unchanged
            } else {
                FingerprintChange::Changed
            };
            prop_assert_eq!(change, expected);
            prop_assert_eq!(store.get(path), Some(&fingerprint(content)));
        }
        prop_assert_eq!(store.len(), 1);
    }
}
