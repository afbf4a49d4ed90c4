// Marker-matching state machine for the streaming assembler.
//
// The transition function is pure: it takes the current state and one
// character and returns the next state plus at most one emission, so the
// table below can be tested without a ChatGenerationResult around it.

use crate::assembler::types::{Channel, MarkerPair};

/// Which channel the next confirmed characters belong to, and whether a
/// marker is currently being matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Response channel, nothing buffered.
    #[default]
    OutsideTag,
    /// Response channel, pending buffer is a prefix of an open marker.
    InOpenTag,
    /// Reasoning channel opened by marker pair `pair`, nothing buffered.
    InReasoning { pair: usize },
    /// Reasoning channel, pending buffer is a prefix of the close marker of `pair`.
    InCloseTag { pair: usize },
}

impl Mode {
    /// Channel that receives text flushed in this mode.
    pub fn channel(self) -> Channel {
        match self {
            Mode::OutsideTag | Mode::InOpenTag => Channel::Response,
            Mode::InReasoning { .. } | Mode::InCloseTag { .. } => Channel::Reasoning,
        }
    }

    /// Check if this mode is inside a reasoning block.
    pub fn is_reasoning(self) -> bool {
        self.channel() == Channel::Reasoning
    }

    /// Mode to fall back to once the pending buffer is flushed.
    fn settled(self) -> Self {
        match self {
            Mode::OutsideTag | Mode::InOpenTag => Mode::OutsideTag,
            Mode::InReasoning { pair } | Mode::InCloseTag { pair } => Mode::InReasoning { pair },
        }
    }

    /// Mode to use while a marker prefix is buffered.
    fn matching(self) -> Self {
        match self {
            Mode::OutsideTag | Mode::InOpenTag => Mode::InOpenTag,
            Mode::InReasoning { pair } | Mode::InCloseTag { pair } => Mode::InCloseTag { pair },
        }
    }
}

/// Mode plus the characters tentatively matched against a marker.
///
/// `pending` is non-empty exactly when `mode` is `InOpenTag` or `InCloseTag`,
/// and is then a strict prefix of the marker being matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchState {
    pub mode: Mode,
    pub pending: String,
}

impl MatchState {
    fn settled(mode: Mode) -> Self {
        Self {
            mode: mode.settled(),
            pending: String::new(),
        }
    }
}

/// Finalized text produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub channel: Channel,
    pub text: String,
}

impl Emission {
    fn non_empty(channel: Channel, text: &str) -> Option<Self> {
        (!text.is_empty()).then(|| Self {
            channel,
            text: text.to_string(),
        })
    }
}

enum MarkerMatch {
    Full(Mode),
    Partial,
    None,
}

fn match_marker(mode: Mode, text: &str, markers: &[MarkerPair]) -> MarkerMatch {
    match mode {
        Mode::OutsideTag | Mode::InOpenTag => {
            if let Some(pair) = markers.iter().position(|m| m.open == text) {
                MarkerMatch::Full(Mode::InReasoning { pair })
            } else if markers.iter().any(|m| m.open.starts_with(text)) {
                MarkerMatch::Partial
            } else {
                MarkerMatch::None
            }
        }
        Mode::InReasoning { pair } | Mode::InCloseTag { pair } => match markers.get(pair) {
            Some(m) if m.close == text => MarkerMatch::Full(Mode::OutsideTag),
            Some(m) if m.close.starts_with(text) => MarkerMatch::Partial,
            _ => MarkerMatch::None,
        },
    }
}

/// Advance the state machine by one character.
///
/// The candidate `pending + ch` is tested against the marker(s) active in the
/// current mode. When it breaks the prefix match, the shortest leading part is
/// flushed to the current channel and matching restarts on the remainder, down
/// to `ch` alone, so no character is dropped and no marker start is missed.
pub fn transition(
    state: &MatchState,
    ch: char,
    markers: &[MarkerPair],
) -> (MatchState, Option<Emission>) {
    let channel = state.mode.channel();
    let mut candidate = String::with_capacity(state.pending.len() + ch.len_utf8());
    candidate.push_str(&state.pending);
    candidate.push(ch);

    for (start, _) in candidate.char_indices() {
        let (flushed, suffix) = candidate.split_at(start);
        match match_marker(state.mode, suffix, markers) {
            MarkerMatch::Full(next) => {
                let next_state = MatchState {
                    mode: next,
                    pending: String::new(),
                };
                return (next_state, Emission::non_empty(channel, flushed));
            }
            MarkerMatch::Partial => {
                let next_state = MatchState {
                    mode: state.mode.matching(),
                    pending: suffix.to_string(),
                };
                return (next_state, Emission::non_empty(channel, flushed));
            }
            MarkerMatch::None => {}
        }
    }

    (
        MatchState::settled(state.mode),
        Emission::non_empty(channel, &candidate),
    )
}

/// Flush a never-completed marker attempt to the channel it was matched on.
pub fn flush(state: &MatchState) -> (MatchState, Option<Emission>) {
    (
        MatchState::settled(state.mode),
        Emission::non_empty(state.mode.channel(), &state.pending),
    )
}
