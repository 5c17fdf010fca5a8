// The 256->41-entry DNS label character map (§3.1).
//
// Code 0 is reserved for the MMAP reverse-label separator and code 1 for the
// whole-label wildcard token; neither is reachable through this table, which
// only covers the 39 characters legal *inside* label content.

/// The lone wildcard label ("*") encodes to this byte instead of going
/// through the per-character table.
pub const WILDCARD_CODE: u8 = 1;

/// MMAP reverse-label mode emits this byte between labels.
pub const SEPARATOR_CODE: u8 = 0;

/// One past the highest code any table entry or the wildcard code can take.
pub const ALPHABET_SIZE: u8 = 41;

const fn build_table() -> [Option<u8>; 256] {
    let mut table = [None; 256];
    table[b'-' as usize] = Some(2);
    table[b'/' as usize] = Some(3);

    let mut d = 0u8;
    while d < 10 {
        table[(b'0' + d) as usize] = Some(4 + d);
        d += 1;
    }

    table[b'_' as usize] = Some(14);

    let mut l = 0u8;
    while l < 26 {
        table[(b'a' + l) as usize] = Some(15 + l);
        table[(b'A' + l) as usize] = Some(15 + l);
        l += 1;
    }

    table
}

static TABLE: [Option<u8>; 256] = build_table();

/// Maps a single content byte to its label-character code, or `None` if the
/// byte has no entry (including `.` and `*`, which are handled structurally
/// rather than through this table).
pub fn lookup(byte: u8) -> Option<u8> {
    TABLE[byte as usize]
}

/// Inverse of [`lookup`], used to reconstruct presentation names from an
/// encoded key during enumeration. Letters decode to lowercase, matching the
/// case-folding `lookup` already applies going forward.
pub const fn reverse_lookup(code: u8) -> Option<u8> {
    match code {
        2 => Some(b'-'),
        3 => Some(b'/'),
        4..=13 => Some(b'0' + (code - 4)),
        14 => Some(b'_'),
        15..=40 => Some(b'a' + (code - 15)),
        _ => None,
    }
}
