// Name Validator / Byte Key Encoder (§4.A, §3.1, §4.G.6).
//
// A domain string is split into labels (honoring RFC 1035 §5.1 escapes),
// each label is validated and mapped to a sequence of character codes
// (§key::charmap), then the labels are concatenated TLD-first in one of two
// physical layouts:
//
//   - `ReverseLabel` (MMAP default): labels separated by a literal
//     `SEPARATOR_CODE` byte. Used because the MMAP node tree is a 256-way
//     byte trie where the separator has to be an ordinary tree edge.
//   - `WireLength` (QP core, §4.G.6 "wire encoding"): each label is
//     length-prefixed instead, so the QP-trie's encoded key never needs a
//     reserved separator byte.
//
// Both layouts walk labels right-to-left (TLD first) so that names sharing
// a suffix share a prefix of their encoded key, which is what makes either
// trie compact for DNS-shaped data.
//
// This implementation does not support an escaped literal `.` inside a
// label (`\.` / `\046`): accepting it would make that byte indistinguishable
// from `SEPARATOR_CODE` in `ReverseLabel` mode and break the key-distinctness
// invariant (§8 #2) that both encodings must uphold identically for the
// backend-parity tests (§8 scenario 6) to hold. See DESIGN.md.

use super::charmap::{self, WILDCARD_CODE};
use crate::error::{InvalidDomainKind, KeyError};

/// RFC 1035 §2.3.4: a name is at most 255 bytes (presentation form, in
/// this implementation measured in UTF-8 bytes of the input string).
pub const MAX_DOMAIN_LEN: usize = 255;
/// RFC 1035 §2.3.4: a label is at most 63 bytes.
pub const MAX_LABEL_LEN: usize = 63;
/// RFC 1035 §2.3.4: a name has at most 127 labels.
pub const MAX_LABELS: usize = 127;

/// Byte key separator emitted between labels in [`EncodingMode::ReverseLabel`].
pub const SEPARATOR_CODE: u8 = charmap::SEPARATOR_CODE;

/// Which physical layout [`encode`] should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// `[labelN codes] 0 [labelN-1 codes] 0 ... [label0 codes]`, TLD first.
    ReverseLabel,
    /// `[len][labelN codes][len][labelN-1 codes]...`, TLD first.
    WireLength,
}

/// Validates `domain` and encodes it into a byte key using `mode`.
///
/// # Examples
///
/// ```
/// use dntrie::key::{encode, EncodingMode};
///
/// let key = encode("", EncodingMode::ReverseLabel).unwrap();
/// assert!(key.is_empty());
///
/// let a = encode("google.com", EncodingMode::ReverseLabel).unwrap();
/// let b = encode("GOOGLE.COM", EncodingMode::ReverseLabel).unwrap();
/// assert_eq!(a, b); // case-insensitive
/// ```
pub fn encode(domain: &str, mode: EncodingMode) -> Result<Vec<u8>, KeyError> {
    if domain.is_empty() {
        return Ok(Vec::new());
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Length });
    }

    let labels = split_labels_dispatch(domain)?;
    if labels.len() > MAX_LABELS {
        return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::TooManyLabels });
    }

    let mut out = Vec::with_capacity(domain.len() + labels.len());
    match mode {
        EncodingMode::ReverseLabel => {
            for (i, label) in labels.iter().rev().enumerate() {
                if i > 0 {
                    out.push(charmap::SEPARATOR_CODE);
                }
                out.extend(encode_label(label)?);
            }
        }
        EncodingMode::WireLength => {
            for label in labels.iter().rev() {
                let codes = encode_label(label)?;
                out.push(codes.len() as u8);
                out.extend(codes);
            }
        }
    }
    Ok(out)
}

/// Validates `domain` and returns its canonical (lowercased) presentation
/// form, or an error if it is not a valid domain name. `normalize` is
/// idempotent and `encode(normalize(d)?, m) == encode(d, m)` for any valid
/// `d` (§8 invariant 1).
pub fn normalize(domain: &str) -> Result<String, KeyError> {
    if domain.is_empty() {
        return Ok(String::new());
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Length });
    }
    let labels = split_labels_dispatch(domain)?;
    if labels.len() > MAX_LABELS {
        return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::TooManyLabels });
    }
    let mut parts = Vec::with_capacity(labels.len());
    for label in &labels {
        encode_label(label)?; // validate
        if label.len() == 1 && label[0] == b'*' {
            parts.push("*".to_string());
        } else {
            parts.push(label.iter().map(|&b| (b as char).to_ascii_lowercase()).collect::<String>());
        }
    }
    Ok(parts.join("."))
}

/// Reconstructs the presentation-form domain name encoded by
/// [`encode`]`(_, EncodingMode::ReverseLabel)`. Used by the MMAP core's
/// enumerators, which only ever decode keys this crate's own encoder
/// produced, so malformed input (a stray unmapped byte) is dropped rather
/// than reported as an error.
pub fn decode_reverse_label(bytes: &[u8]) -> String {
    let mut groups: Vec<String> = Vec::new();
    let mut current = String::new();
    for &b in bytes {
        match b {
            charmap::SEPARATOR_CODE => groups.push(std::mem::take(&mut current)),
            charmap::WILDCARD_CODE => current.push('*'),
            code => {
                if let Some(byte) = charmap::reverse_lookup(code) {
                    current.push(byte as char);
                }
            }
        }
    }
    groups.push(current);
    groups.reverse();
    groups.join(".")
}

/// Reconstructs the presentation-form domain name encoded by
/// [`encode`]`(_, EncodingMode::WireLength)`. Used by the QP core's
/// enumerators; see [`decode_reverse_label`] for the malformed-input policy.
pub fn decode_wire_length(bytes: &[u8]) -> String {
    let mut groups: Vec<String> = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let len = bytes[i] as usize;
        i += 1;
        let mut label = String::new();
        for &code in bytes.get(i..i + len).unwrap_or(&[]) {
            if code == WILDCARD_CODE {
                label.push('*');
            } else if let Some(byte) = charmap::reverse_lookup(code) {
                label.push(byte as char);
            }
        }
        i += len;
        groups.push(label);
    }
    groups.reverse();
    groups.join(".")
}

/// Picks the fast (no-escape) or slow (escape-decoding) label splitter
/// depending on whether `domain` contains a `\` anywhere (§4.G.6).
fn split_labels_dispatch(domain: &str) -> Result<Vec<Vec<u8>>, KeyError> {
    if contains_backslash_chunked(domain.as_bytes()) {
        split_labels(domain)
    } else {
        split_labels_fast(domain.as_bytes())
    }
}

/// Word-at-a-time scan for a `\` byte, 8 bytes per iteration via the
/// classic SWAR "any byte equals needle" trick, falling back to a
/// byte-at-a-time scan over the remainder.
fn contains_backslash_chunked(bytes: &[u8]) -> bool {
    const WORD: usize = 8;
    let mut chunks = bytes.chunks_exact(WORD);
    for chunk in &mut chunks {
        let word = u64::from_ne_bytes(chunk.try_into().expect("chunk is exactly WORD bytes"));
        if word_has_byte(word, b'\\') {
            return true;
        }
    }
    chunks.remainder().contains(&b'\\')
}

fn word_has_byte(word: u64, needle: u8) -> bool {
    let xor = word ^ (u64::from(needle) * 0x0101_0101_0101_0101);
    let lo = xor.wrapping_sub(0x0101_0101_0101_0101);
    let hi = !xor & 0x8080_8080_8080_8080;
    (lo & hi) != 0
}

/// Splits `domain` on `.` with no escape decoding; only valid to call once
/// the caller has confirmed `domain` contains no `\`.
fn split_labels_fast(bytes: &[u8]) -> Result<Vec<Vec<u8>>, KeyError> {
    let mut labels = Vec::new();
    let mut current = Vec::new();
    for &b in bytes {
        match b {
            b'.' => labels.push(std::mem::take(&mut current)),
            b if b.is_ascii() => current.push(b),
            _ => return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Character }),
        }
    }
    labels.push(current);
    Ok(labels)
}

/// Splits `domain` on unescaped `.` into raw (pre-charmap) label byte
/// sequences, decoding `\DDD` and `\X` escapes along the way.
fn split_labels(domain: &str) -> Result<Vec<Vec<u8>>, KeyError> {
    let mut labels = Vec::new();
    let mut current = Vec::new();
    let mut chars = domain.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => labels.push(std::mem::take(&mut current)),
            '\\' => current.push(decode_escape(&mut chars)?),
            other if other.is_ascii() => current.push(other as u8),
            _ => return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Character }),
        }
    }
    labels.push(current);
    Ok(labels)
}

fn decode_escape(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<u8, KeyError> {
    let looks_like_decimal = {
        let mut lookahead = chars.clone();
        (0..3).all(|_| lookahead.next().is_some_and(|c| c.is_ascii_digit()))
    };

    if looks_like_decimal {
        let mut value: u32 = 0;
        for _ in 0..3 {
            let d = chars.next().expect("validated by lookahead above");
            value = value * 10 + d.to_digit(10).expect("validated by lookahead above");
        }
        if value > 255 {
            return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Escape });
        }
        Ok(value as u8)
    } else {
        match chars.next() {
            Some(c) if c.is_ascii() => Ok(c as u8),
            _ => Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Escape }),
        }
    }
}

/// Validates one raw label and maps its bytes to character codes
/// (§key::charmap), or returns the single-byte wildcard token.
fn encode_label(label: &[u8]) -> Result<Vec<u8>, KeyError> {
    if label.len() == 1 && label[0] == b'*' {
        return Ok(vec![WILDCARD_CODE]);
    }
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::LabelLength });
    }
    if label[0] == b'-' || label[label.len() - 1] == b'-' {
        return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Hyphen });
    }

    let mut out = Vec::with_capacity(label.len());
    for &b in label {
        match charmap::lookup(b) {
            Some(code) => out.push(code),
            None => return Err(KeyError::InvalidDomainName { kind: InvalidDomainKind::Character }),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_backslash_chunked_matches_naive_scan() {
        assert!(!contains_backslash_chunked(b"www.example.com"));
        assert!(contains_backslash_chunked(br"www.exa\mple.com"));
        // exactly one 8-byte word, backslash in the last position
        assert!(contains_backslash_chunked(b"abcdefg\\"));
        // backslash only in the chunks_exact remainder
        assert!(contains_backslash_chunked(b"abcdefgh\\"));
        assert!(!contains_backslash_chunked(b""));
    }

    #[test]
    fn test_fast_and_slow_splitters_agree_on_backslash_free_input() {
        for d in ["www.example.com", "a.b.c", "", "xn--exmple-cua.com"] {
            let slow = split_labels(d).unwrap();
            let fast = split_labels_fast(d.as_bytes()).unwrap();
            assert_eq!(slow, fast);
        }
    }

    #[test]
    fn test_dispatch_picks_fast_path_without_changing_results() {
        let key_dispatch = encode("www.example.com", EncodingMode::WireLength).unwrap();
        let key_escaped = encode(r"www.exa\mple.com", EncodingMode::WireLength).unwrap();
        let key_plain = encode("www.example.com", EncodingMode::WireLength).unwrap();
        assert_eq!(key_dispatch, key_plain);
        assert_ne!(key_escaped, key_plain);
    }

    fn kind_of(r: Result<Vec<u8>, KeyError>) -> InvalidDomainKind {
        match r.unwrap_err() {
            KeyError::InvalidDomainName { kind } => kind,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_domain_is_root() {
        assert_eq!(encode("", EncodingMode::ReverseLabel).unwrap(), Vec::<u8>::new());
        assert_eq!(encode("", EncodingMode::WireLength).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_reverse_label_is_tld_first_with_separator() {
        let key = encode("www.google.com", EncodingMode::ReverseLabel).unwrap();
        let com = encode("com", EncodingMode::ReverseLabel).unwrap();
        assert!(key.starts_with(&com));
        assert_eq!(key[com.len()], SEPARATOR_CODE);
    }

    #[test]
    fn test_reverse_label_shared_suffix_is_shared_prefix() {
        let google = encode("google.com", EncodingMode::ReverseLabel).unwrap();
        let mail = encode("mail.google.com", EncodingMode::ReverseLabel).unwrap();
        assert!(mail.starts_with(&google));
    }

    #[test]
    fn test_wire_length_round_trip_shape() {
        let key = encode("a.bb", EncodingMode::WireLength).unwrap();
        // TLD "bb" first: [2, code('b'), code('b'), 1, code('a')]
        assert_eq!(key[0], 2);
        assert_eq!(key[3], 1);
    }

    #[test]
    fn test_case_insensitive() {
        let a = encode("Google.COM", EncodingMode::ReverseLabel).unwrap();
        let b = encode("google.com", EncodingMode::ReverseLabel).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_names_distinct_keys() {
        let a = encode("foo.com", EncodingMode::ReverseLabel).unwrap();
        let b = encode("bar.com", EncodingMode::ReverseLabel).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_255_byte_domain_accepted_256_rejected() {
        // 63-byte labels joined by dots, trimmed to exactly 255 bytes.
        let label = "a".repeat(63);
        let name255 = format!("{label}.{label}.{label}.{label}");
        assert_eq!(name255.len(), 255);
        assert!(encode(&name255, EncodingMode::ReverseLabel).is_ok());

        let name256 = format!("{name255}a");
        assert_eq!(kind_of(encode(&name256, EncodingMode::ReverseLabel)), InvalidDomainKind::Length);
    }

    #[test]
    fn test_63_byte_label_accepted_64_rejected() {
        let ok = format!("{}.com", "a".repeat(63));
        assert!(encode(&ok, EncodingMode::ReverseLabel).is_ok());

        let bad = format!("{}.com", "a".repeat(64));
        assert_eq!(kind_of(encode(&bad, EncodingMode::ReverseLabel)), InvalidDomainKind::LabelLength);
    }

    #[test]
    fn test_leading_trailing_consecutive_dots() {
        assert_eq!(kind_of(encode(".com", EncodingMode::ReverseLabel)), InvalidDomainKind::LabelLength);
        assert_eq!(kind_of(encode("com.", EncodingMode::ReverseLabel)), InvalidDomainKind::LabelLength);
        assert_eq!(kind_of(encode("a..com", EncodingMode::ReverseLabel)), InvalidDomainKind::LabelLength);
    }

    #[test]
    fn test_leading_and_trailing_hyphen() {
        assert_eq!(kind_of(encode("-abc.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Hyphen);
        assert_eq!(kind_of(encode("abc-.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Hyphen);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(kind_of(encode("a b.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Character);
    }

    #[test]
    fn test_lone_wildcard_label() {
        let key = encode("*.example.com", EncodingMode::ReverseLabel).unwrap();
        let expected_tail = [WILDCARD_CODE];
        assert_eq!(&key[key.len() - 1..], &expected_tail);
    }

    #[test]
    fn test_asterisk_inside_longer_label_rejected() {
        assert_eq!(kind_of(encode("a*b.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Character);
    }

    #[test]
    fn test_decimal_escape_in_range() {
        // \097 == 'a'
        let a = encode(r"\097.com", EncodingMode::ReverseLabel).unwrap();
        let b = encode("a.com", EncodingMode::ReverseLabel).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decimal_escape_out_of_range_rejected() {
        assert_eq!(kind_of(encode(r"\256.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Escape);
        assert_eq!(kind_of(encode(r"\999.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Escape);
    }

    #[test]
    fn test_literal_escape_byte() {
        // \- is a literal hyphen, still subject to the leading-hyphen rule.
        assert_eq!(kind_of(encode(r"\-abc.com", EncodingMode::ReverseLabel)), InvalidDomainKind::Hyphen);
    }

    #[test]
    fn test_too_many_labels_rejected() {
        let name = (0..128).map(|_| "a").collect::<Vec<_>>().join(".");
        assert_eq!(kind_of(encode(&name, EncodingMode::ReverseLabel)), InvalidDomainKind::TooManyLabels);
    }

    #[test]
    fn test_normalize_idempotent_and_consistent_with_encode() {
        let n1 = normalize("WWW.Google.COM").unwrap();
        assert_eq!(n1, "www.google.com");
        let n2 = normalize(&n1).unwrap();
        assert_eq!(n1, n2);
        assert_eq!(
            encode(&n1, EncodingMode::ReverseLabel).unwrap(),
            encode("WWW.Google.COM", EncodingMode::ReverseLabel).unwrap()
        );
    }

    #[test]
    fn test_decode_reverse_label_round_trip() {
        for d in ["www.google.com", "example.com", "*.example.com", "a-b.c_d.com"] {
            let key = encode(d, EncodingMode::ReverseLabel).unwrap();
            assert_eq!(decode_reverse_label(&key), d.to_ascii_lowercase());
        }
    }

    #[test]
    fn test_decode_wire_length_round_trip() {
        for d in ["www.google.com", "example.com", "*.example.com", "a-b.c_d.com"] {
            let key = encode(d, EncodingMode::WireLength).unwrap();
            assert_eq!(decode_wire_length(&key), d.to_ascii_lowercase());
        }
    }

    #[test]
    fn test_decode_root_is_empty_string() {
        assert_eq!(decode_reverse_label(&[]), "");
        assert_eq!(decode_wire_length(&[]), "");
    }

    #[test]
    fn test_modes_agree_on_validity() {
        // Parity: anything valid/invalid in one mode is valid/invalid in the other.
        let domains = ["", "com", "google.com", "*.example.com", "-bad.com", "toolonglabel-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa.com"];
        for d in domains {
            let a = encode(d, EncodingMode::ReverseLabel);
            let b = encode(d, EncodingMode::WireLength);
            assert_eq!(a.is_ok(), b.is_ok(), "mode parity mismatch for {d:?}");
        }
    }
}
