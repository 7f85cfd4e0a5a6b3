//! Error types for bbeb operations.

use thiserror::Error;

/// Errors that can occur while building or writing an LRF book.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("value out of range for {tag}: {value}")]
    ValueOutOfRange { tag: String, value: i64 },

    #[error("bad enum value for {tag}: {value}")]
    BadEnumValue { tag: String, value: String },

    #[error("string too long: {0} bytes after UTF-16 encoding (maximum 65535)")]
    StringTooLong(usize),

    #[error("source encoding required to encode byte text")]
    EncodingRequired,

    #[error("{child} is not a valid child of {parent}")]
    GrammarViolation {
        parent: &'static str,
        child: &'static str,
    },

    #[error("node has already been appended to a parent")]
    AlreadyParented,

    #[error("style inheritance cycle through '{0}'")]
    StyleCycle(String),

    #[error("no root object set")]
    NoRoot,

    #[error("TOC object {0} was set but never appended")]
    TocNotFound(u32),

    #[error("font not found: {0}")]
    FontNotFound(String),

    #[error("image stream has neither a file path nor data")]
    MissingExtensionData,

    #[error("bad argument: {0}")]
    BadArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
