use serde_json::Value;
use tracing::debug;

use crate::config::{ConfigResult, ConfigValidator, ExtractorConfig};
use crate::json_extractor::dirty_json::DirtyJson;
use crate::json_extractor::repair::{fix_json_string, normalize_quotes, strip_trailing_commas};
use crate::json_extractor::span::{
    extract_json_array_string, extract_json_object_string, extract_json_string,
    strip_wrapping_code_fence,
};

/// One attempt in the recovery cascade
///
/// Steps are tried in [`RecoveryStep::CASCADE`] order; each either yields a
/// value or hands over to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStep {
    /// Candidate parsed as-is
    Strict,
    /// Trailing commas removed
    TrailingCommas,
    /// Single quotes normalized, then trailing commas removed
    SingleQuotes,
    /// Previous repairs plus control characters escaped
    ControlChars,
    /// Lenient parser, partial containers allowed per config
    Lenient,
}

impl RecoveryStep {
    pub const CASCADE: [RecoveryStep; 5] = [
        RecoveryStep::Strict,
        RecoveryStep::TrailingCommas,
        RecoveryStep::SingleQuotes,
        RecoveryStep::ControlChars,
        RecoveryStep::Lenient,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecoveryStep::Strict => "strict",
            RecoveryStep::TrailingCommas => "trailing_commas",
            RecoveryStep::SingleQuotes => "single_quotes",
            RecoveryStep::ControlChars => "control_chars",
            RecoveryStep::Lenient => "lenient",
        }
    }

    fn attempt(self, candidate: &str, lenient: &DirtyJson) -> Option<Value> {
        match self {
            RecoveryStep::Strict => strict(candidate),
            RecoveryStep::TrailingCommas => strict(&strip_trailing_commas(candidate)),
            RecoveryStep::SingleQuotes => {
                strict(&strip_trailing_commas(&normalize_quotes(candidate)))
            }
            RecoveryStep::ControlChars => strict(&fix_json_string(&strip_trailing_commas(
                &normalize_quotes(candidate),
            ))),
            RecoveryStep::Lenient => match lenient.parse(candidate) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Lenient parse failed: {}", e);
                    None
                }
            },
        }
    }
}

fn strict(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate).ok()
}

/// Extracts a best-effort structured value from model output
#[derive(Debug, Clone)]
pub struct DirtyJsonParser {
    config: ExtractorConfig,
    lenient: DirtyJson,
}

impl Default for DirtyJsonParser {
    fn default() -> Self {
        Self::from_validated(ExtractorConfig::default())
    }
}

impl DirtyJsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> ConfigResult<Self> {
        ConfigValidator::validate_extractor(&config)?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: ExtractorConfig) -> Self {
        let lenient = DirtyJson::new(config.max_depth, config.allow_partial);
        Self { config, lenient }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Parse `text`, returning `None` when no structured value can be found.
    pub fn parse(&self, text: &str) -> Option<Value> {
        if let Some((value, _)) = self.parse_with_step(text) {
            return Some(value);
        }

        let trimmed = text.trim();
        if self.config.raw_text_fallback && !trimmed.is_empty() {
            debug!("No structured value found, falling back to raw text");
            return Some(Value::String(trimmed.to_string()));
        }
        None
    }

    /// Parse `text` and report which recovery step produced the value.
    ///
    /// Never applies the raw text fallback.
    pub fn parse_with_step(&self, text: &str) -> Option<(Value, RecoveryStep)> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let fenced = if self.config.strip_code_fences {
            strip_wrapping_code_fence(trimmed)
        } else {
            None
        };

        for candidate in candidates(trimmed, fenced) {
            for step in RecoveryStep::CASCADE {
                if let Some(value) = step.attempt(candidate, &self.lenient) {
                    debug!(step = step.name(), "Recovered structured value");
                    return Some((value, step));
                }
            }
        }

        debug!("No structured value found");
        None
    }
}

/// Candidate spans in the order they are tried.
///
/// Containers come before scalars, and the fenced body, when present, before
/// the full text. Duplicate spans are tried once.
fn candidates<'a>(text: &'a str, fenced: Option<&'a str>) -> Vec<&'a str> {
    let mut spans: Vec<&'a str> = Vec::with_capacity(6);
    let mut push = |span: &'a str| {
        if !span.is_empty() && !spans.contains(&span) {
            spans.push(span);
        }
    };

    if let Some(body) = fenced {
        containers(body).into_iter().for_each(&mut push);
    }
    containers(text).into_iter().for_each(&mut push);
    if let Some(body) = fenced {
        scalar(body).into_iter().for_each(&mut push);
    }
    scalar(text).into_iter().for_each(&mut push);

    spans
}

/// Object and array spans of `body`.
///
/// Objects come first unless an array opens earlier and encloses the first
/// object.
fn containers(body: &str) -> Vec<&str> {
    let object = extract_json_object_string(body);
    let array = extract_json_array_string(body);

    let array_first = match (body.find('{'), body.find('[')) {
        (Some(o), Some(a)) => a < o && a + array.len() > o,
        (None, Some(_)) => true,
        _ => false,
    };

    if array_first {
        vec![array, object]
    } else {
        vec![object, array]
    }
}

/// First scalar of `body`, if it is not itself a container.
fn scalar(body: &str) -> Option<&str> {
    let span = extract_json_string(body);
    (!span.is_empty() && !span.starts_with(['{', '['])).then_some(span)
}

/// Input accepted by [`json_parse_dirty`]
///
/// Lets callers pass text, a possibly-missing text, or an arbitrary JSON
/// value; anything that is not text parses to `None`.
#[derive(Debug, Clone, Copy)]
pub enum DirtyInput<'a> {
    Text(&'a str),
    Missing,
    NotText,
}

impl<'a> From<&'a str> for DirtyInput<'a> {
    fn from(text: &'a str) -> Self {
        DirtyInput::Text(text)
    }
}

impl<'a> From<&'a String> for DirtyInput<'a> {
    fn from(text: &'a String) -> Self {
        DirtyInput::Text(text)
    }
}

impl<'a> From<Option<&'a str>> for DirtyInput<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(DirtyInput::Missing, DirtyInput::Text)
    }
}

impl<'a> From<&'a Value> for DirtyInput<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => DirtyInput::Text(s),
            Value::Null => DirtyInput::Missing,
            _ => DirtyInput::NotText,
        }
    }
}

/// Parse a structured value out of dirty model output with default settings.
///
/// Returns `None` for missing, non-text or empty input, and when nothing
/// JSON-like can be recovered.
pub fn json_parse_dirty<'a>(input: impl Into<DirtyInput<'a>>) -> Option<Value> {
    match input.into() {
        DirtyInput::Text(text) => DirtyJsonParser::default().parse(text),
        DirtyInput::Missing | DirtyInput::NotText => None,
    }
}
