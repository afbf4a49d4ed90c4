use serde_json::Value;
use tracing::trace;

use crate::config::{ConfigResult, ExtractorConfig};
use crate::json_extractor::cascade::DirtyJsonParser;

/// Incremental extraction over a growing model output
///
/// Each fed chunk is appended to an internal buffer and the whole buffer is
/// re-parsed, so partial objects fill in as the stream advances.
#[derive(Debug, Clone, Default)]
pub struct DirtyJsonStream {
    /// Everything fed so far
    buffer: String,
    parser: DirtyJsonParser,
    /// Latest value recovered from the buffer
    last: Option<Value>,
}

impl DirtyJsonStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> ConfigResult<Self> {
        Ok(Self {
            buffer: String::new(),
            parser: DirtyJsonParser::with_config(config)?,
            last: None,
        })
    }

    /// Append `chunk` and return the best value recovered so far.
    ///
    /// Keeps the previous value when the new buffer yields nothing.
    pub fn feed(&mut self, chunk: &str) -> Option<&Value> {
        if chunk.is_empty() {
            return self.last.as_ref();
        }
        self.buffer.push_str(chunk);

        if let Some(value) = self.parser.parse(&self.buffer) {
            trace!(buffered = self.buffer.len(), "Stream value updated");
            self.last = Some(value);
        }
        self.last.as_ref()
    }

    pub fn value(&self) -> Option<&Value> {
        self.last.as_ref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last = None;
    }
}
