//! Shared fixtures for the integration tests: a JSON reference [`Codec`] and
//! a small set of representative domain names.

use dntrie::codec::Codec;
use serde_json::Value;

#[cfg(feature = "logging")]
#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
}

#[derive(Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec<Value> for JsonCodec {
    type Error = serde_json::Error;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, Self::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A mix of plain names, subdomains, a wildcard label, and escaped bytes,
/// exercising both encodings' TLD-first concatenation the same way.
pub fn sample_domains() -> Vec<&'static str> {
    vec![
        "example.com",
        "www.example.com",
        "mail.example.com",
        "EXAMPLE.ORG",
        "a.b.c.example.net",
        "*.example.com",
        "xn--exmple-cua.com",
        "example.co.uk",
    ]
}
