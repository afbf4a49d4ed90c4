use super::*;
use crate::config::AssemblerConfig;

fn feed_chars(result: &mut ChatGenerationResult, text: &str) -> Vec<ChatChunk> {
    text.chars()
        .map(|ch| result.add_chunk(&ChatChunk::response(ch.to_string())))
        .collect()
}

#[test]
fn test_plain_response_char_by_char() {
    let mut result = ChatGenerationResult::new();
    let chunks = feed_chars(&mut result, "response goes here");

    assert!(chunks.iter().all(|c| c.reasoning_delta.is_empty()));
    assert!(chunks.iter().all(|c| c.response_delta.chars().count() == 1));
    assert_eq!(result.response_text(), "response goes here");
    assert_eq!(result.reasoning_text(), "");
}

#[test]
fn test_truncated_close_tag_char_by_char() {
    let mut result = ChatGenerationResult::new();
    feed_chars(&mut result, "<think>reasoning goes here</thi");

    assert_eq!(result.reasoning_text(), "reasoning goes here");
    assert_eq!(result.response_text(), "");
    assert_eq!(result.pending(), "</thi");
    assert_eq!(result.mode(), Mode::InCloseTag { pair: 0 });

    let flushed = result.finalize();
    assert_eq!(flushed, ChatChunk::reasoning("</thi"));
    assert_eq!(result.reasoning_text(), "reasoning goes here</thi");
    assert_eq!(result.pending(), "");
}

#[test]
fn test_marker_chars_emit_nothing() {
    let mut result = ChatGenerationResult::new();
    let chunks = feed_chars(&mut result, "<think>");

    assert!(chunks.iter().all(ChatChunk::is_empty));
    assert!(result.is_in_reasoning());
}

#[test]
fn test_reasoning_then_response() {
    let mut result = ChatGenerationResult::new();
    feed_chars(&mut result, "<think>plan the answer</think>The answer is 4.");
    result.finalize();

    assert_eq!(result.reasoning_text(), "plan the answer");
    assert_eq!(result.response_text(), "The answer is 4.");
    assert!(!result.is_in_reasoning());
}

#[test]
fn test_whole_string_matches_char_by_char() {
    let text = "pre <thinking? <think>a < b </thin</think> post </think>";

    let mut whole = ChatGenerationResult::new();
    whole.add_chunk(&ChatChunk::response(text));
    whole.finalize();

    let mut split = ChatGenerationResult::new();
    feed_chars(&mut split, text);
    split.finalize();

    assert_eq!(whole.response_text(), split.response_text());
    assert_eq!(whole.reasoning_text(), split.reasoning_text());
    assert_eq!(whole.response_text(), "pre <thinking?  post </think>");
    assert_eq!(whole.reasoning_text(), "a < b </thin");
}

#[test]
fn test_partial_open_tag_only() {
    let mut result = ChatGenerationResult::new();
    let chunk = result.add_chunk(&ChatChunk::response("<thi"));
    assert!(chunk.is_empty());
    assert_eq!(result.response_text(), "");

    let flushed = result.finalize();
    assert_eq!(flushed, ChatChunk::response("<thi"));
    assert_eq!(result.response_text(), "<thi");
    assert_eq!(result.reasoning_text(), "");
}

#[test]
fn test_partial_open_tag_then_text_is_not_lost() {
    let mut result = ChatGenerationResult::new();
    // '/' already breaks the open-marker prefix, so "</" is released at once
    let chunk = result.add_chunk(&ChatChunk::response("</"));
    assert_eq!(chunk.response_delta, "</");
    assert_eq!(result.pending(), "");

    let chunk = result.add_chunk(&ChatChunk::response("answer"));
    assert_eq!(chunk.response_delta, "answer");
    assert_eq!(result.response_text(), "</answer");
}

#[test]
fn test_reasoning_delta_bypasses_markers() {
    let mut result = ChatGenerationResult::new();
    let chunk = result.add_chunk(&ChatChunk::new("<th", "native </think> text"));

    assert_eq!(chunk.reasoning_delta, "native </think> text");
    assert_eq!(chunk.response_delta, "");
    assert_eq!(result.pending(), "<th");

    let chunk = result.add_chunk(&ChatChunk::new("ink>x", "more"));
    assert_eq!(chunk.reasoning_delta, "morex");
    assert_eq!(result.reasoning_text(), "native </think> textmorex");
}

#[test]
fn test_empty_chunks_are_noops() {
    let mut result = ChatGenerationResult::new();
    assert!(result.add_chunk(&ChatChunk::default()).is_empty());
    assert!(result.finalize().is_empty());
    assert_eq!(result.output(), ChatChunk::default());
}

#[test]
fn test_output_does_not_mutate() {
    let mut result = ChatGenerationResult::new();
    result.add_chunk(&ChatChunk::response("hello <thi"));

    let output = result.output();
    assert_eq!(output.response_delta, "hello <thi");
    assert_eq!(result.response_text(), "hello ");
    assert_eq!(result.pending(), "<thi");

    // The stream may continue and complete the marker after all
    result.add_chunk(&ChatChunk::response("nk>deep"));
    assert_eq!(result.reasoning_text(), "deep");
    assert_eq!(result.output(), ChatChunk::new("hello ", "deep"));
}

#[test]
fn test_never_reemits_text() {
    let mut result = ChatGenerationResult::new();
    let text = "a<think>b</think>c<th";
    let mut response = String::new();
    let mut reasoning = String::new();
    for ch in text.chars() {
        let chunk = result.add_chunk(&ChatChunk::response(ch.to_string()));
        response.push_str(&chunk.response_delta);
        reasoning.push_str(&chunk.reasoning_delta);
    }
    let last = result.finalize();
    response.push_str(&last.response_delta);
    reasoning.push_str(&last.reasoning_delta);

    assert_eq!(response, result.response_text());
    assert_eq!(reasoning, result.reasoning_text());
    assert_eq!(response, "ac<th");
    assert_eq!(reasoning, "b");
}

#[test]
fn test_custom_markers() {
    let mut result = ChatGenerationResult::with_markers("[[", "]]").unwrap();
    result.add_chunk(&ChatChunk::response("x [[y]] z [<think>"));
    result.finalize();

    assert_eq!(result.reasoning_text(), "y");
    assert_eq!(result.response_text(), "x  z [<think>");
}

#[test]
fn test_invalid_markers_rejected() {
    assert!(ChatGenerationResult::with_markers("", "</think>").is_err());
}

#[test]
fn test_multiple_marker_pairs() {
    let config = AssemblerConfig::builder()
        .with_marker_pair(MarkerPair::think())
        .with_marker_pair(MarkerPair::reasoning())
        .build()
        .unwrap();
    let mut result = ChatGenerationResult::with_config(config).unwrap();
    feed_chars(&mut result, "<reasoning>r1</reasoning>s1<think>r2</think>s2");
    result.finalize();

    assert_eq!(result.reasoning_text(), "r1r2");
    assert_eq!(result.response_text(), "s1s2");
}

#[test]
fn test_native_reasoning_bypass() {
    let config = AssemblerConfig::builder()
        .native_reasoning_bypass(true)
        .build()
        .unwrap();
    let mut result = ChatGenerationResult::with_config(config).unwrap();

    result.add_chunk(&ChatChunk::response("before <th"));
    let chunk = result.add_chunk(&ChatChunk::new("<think>literal", "native"));

    assert_eq!(chunk.response_delta, "<th<think>literal");
    assert_eq!(chunk.reasoning_delta, "native");
    assert_eq!(result.response_text(), "before <th<think>literal");
    assert_eq!(result.reasoning_text(), "native");
    assert_eq!(result.pending(), "");
}

#[test]
fn test_bypass_disabled_keeps_matching() {
    let mut result = ChatGenerationResult::new();
    result.add_chunk(&ChatChunk::new("", "native"));
    result.add_chunk(&ChatChunk::response("<think>tagged</think>done"));

    assert_eq!(result.reasoning_text(), "nativetagged");
    assert_eq!(result.response_text(), "done");
}

#[test]
fn test_parse_complete_and_reset() {
    let mut result = ChatGenerationResult::new();
    result.add_chunk(&ChatChunk::response("stale <think>"));

    let out = result.parse_complete("<think>why</think>because");
    assert_eq!(out, ChatChunk::new("because", "why"));
    assert_eq!(result.response_text(), "because");

    result.reset();
    assert_eq!(result.response_text(), "");
    assert_eq!(result.reasoning_text(), "");
    assert_eq!(result.mode(), Mode::OutsideTag);
}

#[test]
fn test_assemble_unterminated_reasoning() {
    let out = assemble("<think>still thinking");
    assert_eq!(out, ChatChunk::reasoning("still thinking"));
}
