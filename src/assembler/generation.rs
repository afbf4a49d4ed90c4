use tracing::{debug, trace};

use crate::assembler::state::{self, MatchState, Mode};
use crate::assembler::types::{ChatChunk, MarkerPair};
use crate::config::{AssemblerConfig, ConfigResult, ConfigValidator};

/// Accumulated state of one streamed generation turn.
///
/// Feed deltas in arrival order with [`add_chunk`](Self::add_chunk); each call
/// returns only text that became final during that call. Call
/// [`finalize`](Self::finalize) when the stream ends so that a marker attempt
/// cut off mid-way is surfaced as plain text instead of being lost.
#[derive(Debug, Clone)]
pub struct ChatGenerationResult {
    config: AssemblerConfig,
    response: String,
    reasoning: String,
    state: MatchState,
    native_reasoning: bool,
}

impl Default for ChatGenerationResult {
    fn default() -> Self {
        Self::from_validated(AssemblerConfig::default())
    }
}

impl ChatGenerationResult {
    /// Create an assembler using the `<think>` / `</think>` markers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assembler with a custom configuration.
    pub fn with_config(config: AssemblerConfig) -> ConfigResult<Self> {
        ConfigValidator::validate_assembler(&config)?;
        Ok(Self::from_validated(config))
    }

    /// Create an assembler with a single custom marker pair.
    pub fn with_markers(open: impl Into<String>, close: impl Into<String>) -> ConfigResult<Self> {
        Self::with_config(AssemblerConfig::with_markers(open, close))
    }

    fn from_validated(config: AssemblerConfig) -> Self {
        Self {
            config,
            response: String::new(),
            reasoning: String::new(),
            state: MatchState::default(),
            native_reasoning: false,
        }
    }

    /// Consume one streaming unit and return the newly finalized text.
    ///
    /// `reasoning_delta` is passed through as reasoning unconditionally.
    /// `response_delta` is scanned character by character for markers; text
    /// that might still be part of a marker is held back until it resolves.
    pub fn add_chunk(&mut self, chunk: &ChatChunk) -> ChatChunk {
        let mut out = ChatChunk::default();

        if !chunk.reasoning_delta.is_empty() {
            if self.config.native_reasoning_bypass && !self.native_reasoning {
                debug!("Native reasoning detected, disabling marker matching");
                self.native_reasoning = true;
                self.flush_pending(&mut out);
                self.state = MatchState::default();
            }
            out.reasoning_delta.push_str(&chunk.reasoning_delta);
        }

        if self.native_reasoning {
            out.response_delta.push_str(&chunk.response_delta);
        } else {
            for ch in chunk.response_delta.chars() {
                self.step(ch, &mut out);
            }
        }

        self.commit(&out);
        out
    }

    fn step(&mut self, ch: char, out: &mut ChatChunk) {
        let (next, emission) = state::transition(&self.state, ch, &self.config.markers);
        trace!(from = ?self.state.mode, to = ?next.mode, ?ch, "Marker transition");

        match (self.state.mode.is_reasoning(), next.mode) {
            (false, Mode::InReasoning { pair }) => {
                debug!(marker = %self.config.markers[pair].open, "Reasoning block opened");
            }
            (true, Mode::OutsideTag) => debug!("Reasoning block closed"),
            _ => {}
        }

        self.state = next;
        if let Some(emission) = emission {
            out.push(emission.channel, &emission.text);
        }
    }

    fn flush_pending(&mut self, out: &mut ChatChunk) {
        let (next, emission) = state::flush(&self.state);
        if let Some(emission) = emission {
            debug!(
                channel = ?emission.channel,
                pending = %emission.text,
                "Flushing incomplete marker"
            );
            out.push(emission.channel, &emission.text);
        }
        self.state = next;
    }

    fn commit(&mut self, out: &ChatChunk) {
        self.response.push_str(&out.response_delta);
        self.reasoning.push_str(&out.reasoning_delta);
    }

    /// End the stream: flush any never-completed marker attempt verbatim to
    /// the channel it was matched on, and return that text.
    pub fn finalize(&mut self) -> ChatChunk {
        let mut out = ChatChunk::default();
        self.flush_pending(&mut out);
        self.commit(&out);
        out
    }

    /// Full text of both channels as `finalize` would leave it, without
    /// ending the stream.
    pub fn output(&self) -> ChatChunk {
        let mut out = ChatChunk::new(self.response.clone(), self.reasoning.clone());
        if let (_, Some(emission)) = state::flush(&self.state) {
            out.push(emission.channel, &emission.text);
        }
        out
    }

    /// Parse a complete text in one pass, discarding any earlier state.
    ///
    /// Returns the full response and reasoning text.
    pub fn parse_complete(&mut self, text: &str) -> ChatChunk {
        self.reset();
        self.add_chunk(&ChatChunk::response(text));
        self.finalize();
        self.output()
    }

    /// Return to the freshly constructed state, keeping the configuration.
    pub fn reset(&mut self) {
        self.response.clear();
        self.reasoning.clear();
        self.state = MatchState::default();
        self.native_reasoning = false;
    }

    /// Finalized response-channel text so far.
    pub fn response_text(&self) -> &str {
        &self.response
    }

    /// Finalized reasoning-channel text so far.
    pub fn reasoning_text(&self) -> &str {
        &self.reasoning
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Characters held back while a marker match is undecided.
    pub fn pending(&self) -> &str {
        &self.state.pending
    }

    pub fn is_in_reasoning(&self) -> bool {
        self.state.mode.is_reasoning()
    }

    pub fn markers(&self) -> &[MarkerPair] {
        &self.config.markers
    }
}

/// Split a complete text into response and reasoning using the default markers.
pub fn assemble(text: &str) -> ChatChunk {
    ChatGenerationResult::new().parse_complete(text)
}
