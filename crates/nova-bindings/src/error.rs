use thiserror::Error;

/// A binding key that is not well-formed.
///
/// Well-formed keys that name something which does not exist are not errors; they simply decode
/// to no binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unexpected end of key")]
    UnexpectedEnd,
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("expected `{expected}` at offset {offset}")]
    Expected { expected: char, offset: usize },
    #[error("empty name at offset {offset}")]
    EmptyName { offset: usize },
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },
    #[error("trailing input at offset {offset}")]
    Trailing { offset: usize },
    #[error("key nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to parse toml options: {0}")]
    Toml(#[from] toml::de::Error),
}
