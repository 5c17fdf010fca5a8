#[path = "support/mod.rs"]
mod support;

use dntrie::backend::Backend;
use dntrie::mmap::MmapBackend;
use dntrie::options::MmapOptions;
use serde_json::json;
use support::JsonCodec;

fn open() -> (tempfile::TempDir, MmapBackend<serde_json::Value, JsonCodec>) {
    let dir = tempfile::tempdir().unwrap();
    let backend = MmapBackend::open(MmapOptions::new(dir.path().join("zones.dntrie")), JsonCodec).unwrap();
    (dir, backend)
}

#[test]
fn test_add_and_get_json_value() {
    let (_dir, backend) = open();
    backend.add("example.com", json!({"ip": "93.184.216.34"})).unwrap();
    assert_eq!(backend.get("example.com").unwrap()["ip"], "93.184.216.34");
}

#[test]
fn test_subdomains_of_same_parent_are_all_reachable() {
    let (_dir, backend) = open();
    for name in support::sample_domains() {
        backend.try_add(name, json!(name));
    }
    for name in support::sample_domains() {
        assert_eq!(backend.get(name).unwrap(), json!(name), "missing {name}");
    }
}

#[test]
fn test_invalid_domain_never_raises_in_try_methods() {
    let (_dir, backend) = open();
    assert!(!backend.try_add("-bad.com", json!(1)));
    assert_eq!(backend.try_get("-bad.com"), None);
    assert!(!backend.contains("-bad.com"));
    assert_eq!(backend.try_remove("-bad.com"), None);
}

#[test]
fn test_snapshot_survives_republish_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.dntrie");
    {
        let backend = MmapBackend::open(MmapOptions::new(&path), JsonCodec).unwrap();
        for (i, name) in support::sample_domains().into_iter().enumerate() {
            backend.try_add(name, json!(i));
        }
        backend.try_remove("mail.example.com");
    }
    let reopened = MmapBackend::open(MmapOptions::new(&path), JsonCodec).unwrap();
    assert!(!reopened.contains("mail.example.com"));
    assert!(reopened.contains("example.com"));
}

#[test]
fn test_open_recovers_from_a_crash_left_only_a_tmp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.dntrie");
    {
        let backend = MmapBackend::open(MmapOptions::new(&path), JsonCodec).unwrap();
        backend.try_add("example.com", json!("v"));
    }
    // Simulate a crash between writing the new image and renaming it in:
    // the published file itself is gone, but its `.tmp` sidecar survives.
    let tmp_path = {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        std::path::PathBuf::from(name)
    };
    std::fs::rename(&path, &tmp_path).unwrap();
    assert!(!path.exists());

    let recovered = MmapBackend::open(MmapOptions::new(&path), JsonCodec).unwrap();
    assert_eq!(recovered.get("example.com").unwrap(), json!("v"));
    assert!(!tmp_path.exists());
}

#[test]
fn test_is_empty_after_removing_the_only_entry() {
    let (_dir, backend) = open();
    backend.try_add("example.com", json!(1));
    assert!(!backend.is_empty());
    backend.try_remove("example.com");
    assert!(backend.is_empty());
}

#[test]
fn test_enumerate_and_reverse_enumerate_are_mirror_images() {
    let (_dir, backend) = open();
    backend.try_add("b.com", json!(1));
    backend.try_add("a.com", json!(2));
    backend.try_add("a.org", json!(3));
    let forward: Vec<_> = backend.enumerate().collect();
    let mut backward: Vec<_> = backend.reverse_enumerate().collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 3);
}
