use thiserror::Error;

/// Fatal problems of a compiled catalog stream.
#[derive(Error, Debug)]
pub enum QmError {
    /// The stream does not start with the catalog magic number
    #[error("Not a compiled translation catalog (bad magic number)")]
    BadMagic,

    #[error("Block {tag:#04x} declares {declared} bytes but only {remaining} remain")]
    TruncatedBlock { tag: u8, declared: usize, remaining: usize },

    #[error("Message record ends prematurely at byte {offset}")]
    TruncatedRecord { offset: usize },

    #[error("Translation at byte {offset} has odd UTF-16 length {length}")]
    OddUtf16Length { offset: usize, length: usize },

    #[error("Unknown record tag {tag:#04x} at byte {offset}")]
    UnknownRecordTag { tag: u8, offset: usize },

    /// Reported once, after the rest of the stream parsed cleanly
    #[error("Catalog contains invalid UTF-8 text")]
    InvalidUtf8,

    #[error("Offset table points outside the message block ({offset})")]
    OffsetOutOfRange { offset: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
