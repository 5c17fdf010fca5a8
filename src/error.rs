// Typed error surface shared by both backends.

use std::fmt;

/// Why a domain name was rejected by the validator (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDomainKind {
    /// The whole name is longer than 255 bytes.
    Length,
    /// A label is empty (leading/trailing/consecutive dots) or longer than 63 bytes.
    LabelLength,
    /// A label starts or ends with `-`.
    Hyphen,
    /// A byte has no entry in the character map and is not the lone wildcard label.
    Character,
    /// A `\` escape did not resolve to `\DDD` (0..=255) or `\X`.
    Escape,
    /// More than 127 labels (RFC 1035 §2.3.4).
    TooManyLabels,
}

impl fmt::Display for InvalidDomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvalidDomainKind::Length => "length",
            InvalidDomainKind::LabelLength => "label length",
            InvalidDomainKind::Hyphen => "hyphen",
            InvalidDomainKind::Character => "invalid character",
            InvalidDomainKind::Escape => "invalid escape",
            InvalidDomainKind::TooManyLabels => "too many labels",
        };
        f.write_str(s)
    }
}

/// Input errors raised by the key encoder (§4.A, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The embedder passed no domain at all (`Option<&str>` entry point was `None`).
    ArgumentNull,
    /// The domain string failed validation; `kind` categorizes why.
    InvalidDomainName { kind: InvalidDomainKind },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::ArgumentNull => write!(f, "KeyError::ArgumentNull: domain is null"),
            KeyError::InvalidDomainName { kind } => {
                write!(f, "KeyError::InvalidDomainName: {kind}")
            }
        }
    }
}

impl std::error::Error for KeyError {}

/// Which header/offset invariant of §3.2/§6.2 failed on open or on a bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptFileKind {
    BadMagic,
    BadVersion,
    BadEndianness,
    OffsetOutOfRange,
    NegativeLength,
    LengthMismatch,
    NodeOutOfRange,
    ChildrenOutOfRange,
    ValueOutOfRange,
}

impl fmt::Display for CorruptFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CorruptFileKind::BadMagic => "bad magic",
            CorruptFileKind::BadVersion => "bad version",
            CorruptFileKind::BadEndianness => "bad endianness marker",
            CorruptFileKind::OffsetOutOfRange => "offset out of range",
            CorruptFileKind::NegativeLength => "negative length",
            CorruptFileKind::LengthMismatch => "length prefix mismatch",
            CorruptFileKind::NodeOutOfRange => "node offset out of range",
            CorruptFileKind::ChildrenOutOfRange => "children region out of range",
            CorruptFileKind::ValueOutOfRange => "value region out of range",
        };
        f.write_str(s)
    }
}

/// State/integrity/capacity/IO errors raised by either backend (§7).
#[derive(Debug)]
pub enum BackendError {
    Key(KeyError),
    KeyNotFound,
    AlreadyExists,
    Disposed,
    Corrupt(CorruptFileKind),
    NodeCapacityExceeded,
    Io(std::io::Error),
    /// A [`crate::codec::Codec`] failed to encode or decode a value. Not
    /// part of the core taxonomy in §7 (value codecs are an external
    /// collaborator) but a real failure mode backends must still surface.
    Codec(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Key(e) => write!(f, "{e}"),
            BackendError::KeyNotFound => write!(f, "BackendError::KeyNotFound"),
            BackendError::AlreadyExists => write!(f, "BackendError::AlreadyExists"),
            BackendError::Disposed => write!(f, "BackendError::Disposed: backend was disposed"),
            BackendError::Corrupt(kind) => write!(f, "BackendError::Corrupt: {kind}"),
            BackendError::NodeCapacityExceeded => {
                write!(f, "BackendError::NodeCapacityExceeded")
            }
            BackendError::Io(e) => write!(f, "BackendError::Io: {e}"),
            BackendError::Codec(msg) => write!(f, "BackendError::Codec: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Key(e) => Some(e),
            BackendError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyError> for BackendError {
    fn from(e: KeyError) -> Self {
        BackendError::Key(e)
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Io(e)
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
