use super::*;
use serde_json::json;

#[test]
fn test_parse_valid_json() {
    assert_eq!(
        json_parse_dirty(r#"{"key": "value", "number": 42}"#),
        Some(json!({"key": "value", "number": 42}))
    );
}

#[test]
fn test_parse_with_surrounding_text() {
    assert_eq!(
        json_parse_dirty(r#"Here is some JSON: {"key": "value"} and more text"#),
        Some(json!({"key": "value"}))
    );
}

#[test]
fn test_parse_nothing_recoverable() {
    assert_eq!(json_parse_dirty(""), None);
    assert_eq!(json_parse_dirty("   \n\t"), None);
    assert_eq!(json_parse_dirty(None::<&str>), None);
    assert_eq!(json_parse_dirty(&json!(12345)), None);
    assert_eq!(json_parse_dirty("Just plain text without JSON"), None);
}

#[test]
fn test_parse_trailing_commas_and_single_quotes() {
    assert_eq!(json_parse_dirty(r#"{"key": "value",}"#), Some(json!({"key": "value"})));
    assert_eq!(json_parse_dirty("{'key': 'value'}"), Some(json!({"key": "value"})));
    assert_eq!(
        json_parse_dirty(r#"{"thoughts": ["Step 1",], "tool_name": "response",}"#),
        Some(json!({"thoughts": ["Step 1"], "tool_name": "response"}))
    );
}

#[test]
fn test_parse_agent_response() {
    let response = r#"
        {"thoughts": ["Step 1", "Step 2"],
         "tool_name": "response",
         "tool_args": {"text": "Hello!"}}"#;
    let value = json_parse_dirty(response).unwrap();
    assert_eq!(value["thoughts"], json!(["Step 1", "Step 2"]));
    assert_eq!(value["tool_name"], "response");
    assert_eq!(value["tool_args"]["text"], "Hello!");
}

#[test]
fn test_parse_agent_response_with_markdown() {
    let response = r#"```json
        {"thoughts": ["Thinking..."],
         "tool_name": "code_execution_tool",
         "tool_args": {"runtime": "python", "code": "print(1)"}}
        ```"#;
    let value = json_parse_dirty(response).unwrap();
    assert_eq!(value["tool_name"], "code_execution_tool");
    assert_eq!(value["tool_args"]["code"], "print(1)");
}

#[test]
fn test_parse_fence_inside_prose() {
    let response = "Here you go:\n```\n{\"a\": [1, 2,]}\n```\nThanks";
    assert_eq!(json_parse_dirty(response), Some(json!({"a": [1, 2]})));
}

#[test]
fn test_parse_raw_newline_in_string() {
    let response = "{\"tool_name\": \"code\", \"tool_args\": {\"code\": \"print(1)\nprint(2)\"}}";
    let value = json_parse_dirty(response).unwrap();
    assert_eq!(value["tool_args"]["code"], "print(1)\nprint(2)");
}

#[test]
fn test_parse_python_style_literals() {
    assert_eq!(
        json_parse_dirty("{'tool_name': 'response', 'done': True, 'extra': None}"),
        Some(json!({"tool_name": "response", "done": true, "extra": null}))
    );
}

#[test]
fn test_parse_truncated_stream() {
    assert_eq!(
        json_parse_dirty(r#"{"thoughts": ["a", "b"], "tool_name": "resp"#),
        Some(json!({"thoughts": ["a", "b"]}))
    );
    assert_eq!(
        json_parse_dirty(r#"{"thoughts": ["a", "b"#),
        Some(json!({"thoughts": ["a"]}))
    );
}

#[test]
fn test_parse_top_level_array_and_scalar() {
    assert_eq!(json_parse_dirty("items: [1, 'two', 3]"), Some(json!([1, "two", 3])));
    assert_eq!(json_parse_dirty(r#"answer: "quoted""#), Some(json!("quoted")));
    assert_eq!(json_parse_dirty("The answer is 42."), Some(json!(42)));
}

#[test]
fn test_parse_with_step_reports_recovery() {
    let parser = DirtyJsonParser::new();
    let (value, step) = parser.parse_with_step("noise {\"a\": 'b',} noise").unwrap();
    assert_eq!(value, json!({"a": "b"}));
    assert_eq!(step, RecoveryStep::SingleQuotes);
}

#[test]
fn test_public_scanners_agree() {
    let text = r#"Some text before {"key": "value"} after"#;
    assert_eq!(extract_json_object_string(text), r#"{"key": "value"}"#);
    assert_eq!(extract_json_string(text), r#"{"key": "value"}"#);
    assert_eq!(extract_json_object_string(r#"{"key": "value""#), r#"{"key": "value""#);
    assert_eq!(extract_json_string("the value is -123.45 here"), "-123.45");
}

#[test]
fn test_fence_inside_string_value() {
    let response = r#"{"tool_name": "response", "tool_args": {"text": "Run:\n```python\nprint(1)\n```"}}"#;
    let value = json_parse_dirty(response).unwrap();
    assert_eq!(value["tool_name"], "response");
    assert_eq!(value["tool_args"]["text"], "Run:\n```python\nprint(1)\n```");
}

#[test]
fn test_fenced_code_before_json() {
    let response = "I ran:\n```bash\nls -la\n```\nNow: {\"tool_name\": \"response\"}";
    assert_eq!(json_parse_dirty(response), Some(json!({"tool_name": "response"})));

    let response = "Output:\n```\nexit 2\n```\n{\"tool_name\": \"response\", \"tool_args\": {}}";
    assert_eq!(
        json_parse_dirty(response),
        Some(json!({"tool_name": "response", "tool_args": {}}))
    );
}

#[test]
fn test_parse_missing_value() {
    assert_eq!(json_parse_dirty(r#"{"a": 1, "b": }"#), Some(json!({"a": 1})));
    assert_eq!(
        json_parse_dirty(r#"{"tool_name": "response", "tool_args": ,}"#),
        Some(json!({"tool_name": "response"}))
    );
}
