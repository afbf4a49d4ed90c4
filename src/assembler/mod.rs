//! Streaming assembly of reasoning and response text.
//!
//! Models that emit their reasoning inline wrap it in a marker pair such as
//! `<think>` / `</think>`. [`ChatGenerationResult`] consumes the raw stream one
//! delta at a time and routes each character to the reasoning or response
//! channel, holding back only the characters that may still turn out to be
//! part of a marker.
pub mod generation;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use generation::{assemble, ChatGenerationResult};
pub use state::{Emission, MatchState, Mode};
pub use types::{ChatChunk, Channel, MarkerPair};
