//! Domain-name validation and byte-key encoding (§4.A).
//!
//! Both cores share the same label splitting, escape handling, and
//! character-map validation; they differ only in how the validated labels
//! are concatenated into a byte key (§3.1).

pub mod charmap;
pub mod encoder;

pub use encoder::{decode_reverse_label, decode_wire_length, encode, normalize, EncodingMode};
