//! Dirty JSON extraction from free-form model output.
//!
//! Locates a JSON-like value inside prose or a markdown fence, then runs it
//! through an ordered cascade of repairs (see [`RecoveryStep`]) until one of
//! them parses. The last step is a lenient parser that also recovers
//! truncated objects and arrays.
pub mod cascade;
pub mod dirty_json;
pub mod errors;
pub mod repair;
pub mod span;
pub mod stream;

#[cfg(test)]
mod tests;

pub use cascade::{json_parse_dirty, DirtyInput, DirtyJsonParser, RecoveryStep};
pub use dirty_json::{DirtyJson, Parsed};
pub use errors::{ExtractError, ExtractResult};
pub use repair::{fix_json_string, normalize_quotes, strip_trailing_commas};
pub use span::{
    extract_json_array_string, extract_json_object_string, extract_json_string, strip_code_fence,
    strip_wrapping_code_fence,
};
pub use stream::DirtyJsonStream;
