use serde::{Deserialize, Serialize};
use std::fmt;

/// One streaming unit, used both as input to and output of the assembler.
///
/// As input, `response_delta` is raw model text that may embed reasoning
/// markers and `reasoning_delta` is text the upstream source already tagged
/// as reasoning. As output, both fields hold newly finalized text only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub response_delta: String,
    #[serde(default)]
    pub reasoning_delta: String,
}

impl ChatChunk {
    /// Create a chunk with the given response and reasoning deltas.
    pub fn new(response_delta: impl Into<String>, reasoning_delta: impl Into<String>) -> Self {
        Self {
            response_delta: response_delta.into(),
            reasoning_delta: reasoning_delta.into(),
        }
    }

    /// Create a chunk carrying only response text.
    pub fn response(text: impl Into<String>) -> Self {
        Self::new(text, String::new())
    }

    /// Create a chunk carrying only reasoning text.
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::new(String::new(), text)
    }

    /// Check if this chunk carries no text on either channel.
    pub fn is_empty(&self) -> bool {
        self.response_delta.is_empty() && self.reasoning_delta.is_empty()
    }

    /// Append text to the given channel.
    pub fn push(&mut self, channel: Channel, text: &str) {
        match channel {
            Channel::Response => self.response_delta.push_str(text),
            Channel::Reasoning => self.reasoning_delta.push_str(text),
        }
    }

    /// Text carried on the given channel.
    pub fn text(&self, channel: Channel) -> &str {
        match channel {
            Channel::Response => &self.response_delta,
            Channel::Reasoning => &self.reasoning_delta,
        }
    }
}

impl fmt::Display for ChatChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChatChunk {{ response: {} chars, reasoning: {} chars }}",
            self.response_delta.chars().count(),
            self.reasoning_delta.chars().count()
        )
    }
}

/// Output channel a piece of finalized text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Response,
    Reasoning,
}

/// Literal open/close markers delimiting a reasoning block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPair {
    pub open: String,
    pub close: String,
}

impl MarkerPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// The `<think>` / `</think>` convention.
    pub fn think() -> Self {
        Self::new("<think>", "</think>")
    }

    /// The `<reasoning>` / `</reasoning>` convention.
    pub fn reasoning() -> Self {
        Self::new("<reasoning>", "</reasoning>")
    }
}

impl Default for MarkerPair {
    fn default() -> Self {
        Self::think()
    }
}
