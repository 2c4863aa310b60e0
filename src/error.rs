use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("input ended inside a value")]
    Truncated,

    #[error("delimiter not found before end of input")]
    UnterminatedField,

    #[error("malformed string length")]
    MalformedLength,

    #[error("negative string length")]
    NegativeLength,

    #[error("bad integer literal: {0}")]
    BadIntegerLiteral(String),

    #[error("dictionary key is not a byte string (found {0:#04x})")]
    NonStringDictionaryKey(u8),

    #[error("unexpected discriminator byte {0:#04x}")]
    UnexpectedDiscriminator(u8),

    #[error("nesting too deep")]
    NestingTooDeep,

    #[error("duplicate dictionary key: {0}")]
    DuplicateKey(String),

    #[error("dictionary keys out of order: {0}")]
    UnsortedKey(String),
}
