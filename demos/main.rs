//! Small end-to-end demo: loads a handful of names into both backends
//! through the shared `Backend` trait, using a JSON value codec, and prints
//! what each one reports.

use dntrie::backend::Backend;
use dntrie::codec::Codec;
use dntrie::mmap::MmapBackend;
use dntrie::options::{MmapOptions, QpOptions};
use dntrie::qp::QpBackend;
use serde_json::{json, Value};

#[derive(Clone, Copy)]
struct JsonCodec;

impl Codec<Value> for JsonCodec {
    type Error = serde_json::Error;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, Self::Error> {
        serde_json::from_slice(bytes)
    }
}

fn seed(backend: &impl Backend<Value>) {
    backend.try_add("example.com", json!({"ip": "93.184.216.34"}));
    backend.try_add("www.example.com", json!({"ip": "93.184.216.34", "cname": "example.com"}));
    backend.try_add("mail.example.com", json!({"ip": "93.184.216.35"}));
    backend.try_add("*.staging.example.com", json!({"ip": "10.0.0.1"}));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let mmap = MmapBackend::open(MmapOptions::new(tmp.path().join("zones.dntrie")), JsonCodec)?;
    seed(&mmap);

    let qp = QpBackend::new(QpOptions::default(), JsonCodec);
    seed(&qp);

    println!("mmap snapshot ({} entries):", mmap.enumerate().count());
    for (name, value) in mmap.enumerate() {
        println!("  {name} -> {value}");
    }

    println!("qp trie ({} entries):", qp.enumerate().count());
    for (name, value) in qp.enumerate() {
        println!("  {name} -> {value}");
    }

    mmap.try_remove("mail.example.com");
    qp.try_remove("mail.example.com");
    println!("after removing mail.example.com: mmap has it = {}, qp has it = {}", mmap.contains("mail.example.com"), qp.contains("mail.example.com"));

    Ok(())
}
