use thiserror::Error;

/// Result type for dirty JSON extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors raised inside the lenient parser
///
/// These never cross the `json_parse_dirty` boundary; they select the next
/// recovery step or collapse to `None`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("Unexpected end of input at position {0}")]
    UnexpectedEnd(usize),

    #[error("Parse depth exceeded: max {0}")]
    DepthExceeded(usize),
}
