//! Both backends implement the same [`Backend`] contract (§8 scenario 6);
//! this drives identical operation sequences through each and checks they
//! agree on every observable outcome.

#[path = "support/mod.rs"]
mod support;

use dntrie::backend::Backend;
use dntrie::mmap::MmapBackend;
use dntrie::options::{MmapOptions, QpOptions};
use dntrie::qp::QpBackend;
use serde_json::{json, Value};
use support::JsonCodec;

fn new_mmap() -> (tempfile::TempDir, MmapBackend<Value, JsonCodec>) {
    let dir = tempfile::tempdir().unwrap();
    let backend = MmapBackend::open(MmapOptions::new(dir.path().join("zones.dntrie")), JsonCodec).unwrap();
    (dir, backend)
}

fn new_qp() -> QpBackend<Value, JsonCodec> {
    QpBackend::new(QpOptions::default(), JsonCodec)
}

#[test]
fn test_both_backends_agree_on_crud_sequence() {
    let (_dir, mmap) = new_mmap();
    let qp = new_qp();

    for (i, name) in support::sample_domains().into_iter().enumerate() {
        assert_eq!(mmap.try_add(name, json!(i)), qp.try_add(name, json!(i)), "add({name})");
    }
    for name in support::sample_domains() {
        assert_eq!(mmap.try_get(name), qp.try_get(name), "get({name})");
        assert_eq!(mmap.contains(name), qp.contains(name), "contains({name})");
    }

    assert_eq!(mmap.try_remove("www.example.com"), qp.try_remove("www.example.com"));
    assert_eq!(mmap.contains("www.example.com"), qp.contains("www.example.com"));

    assert_eq!(
        mmap.try_update("a.com", json!(99), &json!(999)),
        qp.try_update("a.com", json!(99), &json!(999))
    );
}

#[test]
fn test_both_backends_reject_the_same_invalid_names() {
    let (_dir, mmap) = new_mmap();
    let qp = new_qp();
    for bad in ["-bad.com", "bad-.com", &"a".repeat(300)] {
        assert!(!mmap.try_add(bad, json!(1)), "mmap accepted {bad}");
        assert!(!qp.try_add(bad, json!(1)), "qp accepted {bad}");
    }
}

#[test]
fn test_both_backends_enumerate_the_same_set() {
    let (_dir, mmap) = new_mmap();
    let qp = new_qp();
    for name in support::sample_domains() {
        mmap.try_add(name, json!(name));
        qp.try_add(name, json!(name));
    }

    let mut mmap_entries: Vec<_> = mmap.enumerate().collect();
    let mut qp_entries: Vec<_> = qp.enumerate().collect();
    mmap_entries.sort_by(|a, b| a.0.cmp(&b.0));
    qp_entries.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(mmap_entries, qp_entries);
}

#[test]
fn test_both_backends_agree_on_is_empty_after_removing_every_entry() {
    let (_dir, mmap) = new_mmap();
    let qp = new_qp();
    mmap.try_add("www.example.com", json!(1));
    qp.try_add("www.example.com", json!(1));
    assert!(!mmap.is_empty());
    assert!(!qp.is_empty());

    mmap.try_remove("www.example.com");
    qp.try_remove("www.example.com");
    assert_eq!(mmap.is_empty(), qp.is_empty());
    assert!(mmap.is_empty());
    assert!(qp.is_empty());
}

#[test]
fn test_both_backends_clear_to_empty() {
    let (_dir, mmap) = new_mmap();
    let qp = new_qp();
    mmap.try_add("example.com", json!(1));
    qp.try_add("example.com", json!(1));
    mmap.clear();
    qp.clear();
    assert!(mmap.is_empty());
    assert!(qp.is_empty());
}
