use serde_json::{Map, Number, Value};

use crate::json_extractor::errors::{ExtractError, ExtractResult};

/// Lenient parser for JSON-like model output
///
/// Accepts what strict JSON rejects but models commonly produce:
/// - comments (`//`, `#`, `/* */`)
/// - single-, double-, backtick- and triple-quoted strings, raw newlines in strings
/// - unquoted keys and unquoted bare-word values
/// - missing and trailing commas, a `]` closing an object or `}` closing an array
/// - `True`/`False`/`None`/`undefined`
///
/// When the input ends inside a container, the container is closed and kept
/// with its fully formed members; an unterminated string, a partial literal or
/// a key without a value is dropped.
#[derive(Debug, Clone)]
pub struct DirtyJson {
    /// Maximum depth for nested structures
    max_depth: usize,
    /// Whether containers cut off by end-of-input are returned
    allow_partial: bool,
}

/// Value produced by [`DirtyJson::parse_partial`]
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    /// False when end-of-input cut the value off
    pub complete: bool,
}

impl DirtyJson {
    pub fn new(max_depth: usize, allow_partial: bool) -> Self {
        Self {
            max_depth,
            allow_partial,
        }
    }

    /// Parse the first value in `input`, ignoring anything after it.
    pub fn parse(&self, input: &str) -> ExtractResult<Value> {
        self.parse_partial(input).map(|parsed| parsed.value)
    }

    /// Parse the first value in `input` and report whether it was complete.
    pub fn parse_partial(&self, input: &str) -> ExtractResult<Parsed> {
        let mut parser = Parser::new(input, self.max_depth, self.allow_partial);
        parser.skip_trivia();
        if parser.peek().is_none() {
            return Err(ExtractError::UnexpectedEnd(parser.position));
        }
        parser.parse_value(0)
    }
}

impl Default for DirtyJson {
    fn default() -> Self {
        Self::new(32, true)
    }
}

const LITERALS: [(&str, Literal); 8] = [
    ("true", Literal::Bool(true)),
    ("True", Literal::Bool(true)),
    ("false", Literal::Bool(false)),
    ("False", Literal::Bool(false)),
    ("null", Literal::Null),
    ("None", Literal::Null),
    ("NULL", Literal::Null),
    ("undefined", Literal::Null),
];

#[derive(Debug, Clone, Copy)]
enum Literal {
    Bool(bool),
    Null,
}

impl Literal {
    fn to_value(self) -> Value {
        match self {
            Literal::Bool(b) => Value::Bool(b),
            Literal::Null => Value::Null,
        }
    }
}

/// Internal parser state
struct Parser {
    input: Vec<char>,
    position: usize,
    max_depth: usize,
    allow_partial: bool,
}

impl Parser {
    fn new(input: &str, max_depth: usize, allow_partial: bool) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            max_depth,
            allow_partial,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn end_of_input(&self) -> ExtractError {
        ExtractError::UnexpectedEnd(self.position)
    }

    fn unexpected(&self, ch: char) -> ExtractError {
        ExtractError::UnexpectedChar {
            ch,
            position: self.position,
        }
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) | (Some('#'), _) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.position += 2;
                    while let Some(c) = self.peek() {
                        if c == '*' && self.peek_at(1) == Some('/') {
                            break;
                        }
                        self.advance();
                    }
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Close a container cut off by end-of-input
    fn truncated(&self, value: Value) -> ExtractResult<Parsed> {
        if self.allow_partial {
            Ok(Parsed {
                value,
                complete: false,
            })
        } else {
            Err(self.end_of_input())
        }
    }

    fn parse_value(&mut self, depth: usize) -> ExtractResult<Parsed> {
        if depth > self.max_depth {
            return Err(ExtractError::DepthExceeded(self.max_depth));
        }

        self.skip_trivia();

        let value = match self.peek() {
            None => return Err(self.end_of_input()),
            Some('{') => return self.parse_object(depth + 1),
            Some('[') => return self.parse_array(depth + 1),
            Some(q @ ('"' | '\'' | '`')) => Value::String(self.parse_string(q)?),
            Some(c) if c == '-' || c == '+' || c.is_ascii_digit() => self.parse_number()?,
            Some(_) => self.parse_word()?,
        };

        Ok(Parsed {
            value,
            complete: true,
        })
    }

    fn parse_object(&mut self, depth: usize) -> ExtractResult<Parsed> {
        if depth > self.max_depth {
            return Err(ExtractError::DepthExceeded(self.max_depth));
        }

        let mut object = Map::new();

        // Consume '{'
        self.advance();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return self.truncated(Value::Object(object)),
                Some('}') => {
                    self.advance();
                    return Ok(Parsed {
                        value: Value::Object(object),
                        complete: true,
                    });
                }
                // Mismatched closer belongs to an enclosing array
                Some(']') => {
                    return Ok(Parsed {
                        value: Value::Object(object),
                        complete: true,
                    });
                }
                Some(',') => {
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let key = match self.parse_key() {
                Ok(key) => key,
                Err(ExtractError::UnexpectedEnd(_)) => {
                    return self.truncated(Value::Object(object));
                }
                Err(e) => return Err(e),
            };

            self.skip_trivia();
            match self.peek() {
                Some(':') => self.advance(),
                None => return self.truncated(Value::Object(object)),
                Some(c) => return Err(self.unexpected(c)),
            }

            // A key with no value before the next member or closer is dropped
            self.skip_trivia();
            if matches!(self.peek(), Some(',' | '}' | ']')) {
                continue;
            }

            // Keep same depth - parse_object already incremented it
            let member = match self.parse_value(depth) {
                Ok(member) => member,
                Err(ExtractError::UnexpectedEnd(_)) => {
                    return self.truncated(Value::Object(object));
                }
                Err(e) => return Err(e),
            };

            object.insert(key, member.value);
            if !member.complete {
                return self.truncated(Value::Object(object));
            }

            self.skip_trivia();
            match self.peek() {
                Some(',') => self.advance(),
                None => return self.truncated(Value::Object(object)),
                // '}' and ']' are handled at the top of the loop; anything
                // else is a missing comma
                Some(_) => {}
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> ExtractResult<Parsed> {
        if depth > self.max_depth {
            return Err(ExtractError::DepthExceeded(self.max_depth));
        }

        let mut array = Vec::new();

        // Consume '['
        self.advance();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return self.truncated(Value::Array(array)),
                Some(']') => {
                    self.advance();
                    return Ok(Parsed {
                        value: Value::Array(array),
                        complete: true,
                    });
                }
                // Mismatched closer belongs to an enclosing object
                Some('}') => {
                    return Ok(Parsed {
                        value: Value::Array(array),
                        complete: true,
                    });
                }
                Some(',') => {
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let element = match self.parse_value(depth) {
                Ok(element) => element,
                Err(ExtractError::UnexpectedEnd(_)) => {
                    return self.truncated(Value::Array(array));
                }
                Err(e) => return Err(e),
            };

            array.push(element.value);
            if !element.complete {
                return self.truncated(Value::Array(array));
            }
        }
    }

    fn parse_key(&mut self) -> ExtractResult<String> {
        match self.peek() {
            Some(q @ ('"' | '\'' | '`')) => self.parse_string(q),
            Some(_) => {
                let start = self.position;
                while let Some(c) = self.peek() {
                    if c == ':' || c.is_whitespace() || "{}[],\"'`".contains(c) {
                        break;
                    }
                    self.advance();
                }
                if self.position == start {
                    // peek() is Some here, the loop stopped on a delimiter
                    return Err(self.unexpected(self.input[start]));
                }
                if self.peek().is_none() {
                    return Err(self.end_of_input());
                }
                Ok(self.input[start..self.position].iter().collect())
            }
            None => Err(self.end_of_input()),
        }
    }

    fn parse_string(&mut self, quote: char) -> ExtractResult<String> {
        // Consume opening quote
        self.advance();

        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut string = String::new();
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.end_of_input());
            };

            if ch == quote {
                if !triple {
                    self.advance();
                    return Ok(string);
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.position += 3;
                    return Ok(string);
                }
                string.push(ch);
                self.advance();
                continue;
            }

            if ch != '\\' {
                string.push(ch);
                self.advance();
                continue;
            }

            self.advance();
            let Some(escaped) = self.peek() else {
                return Err(self.end_of_input());
            };
            self.advance();
            match escaped {
                'b' => string.push('\u{0008}'),
                'f' => string.push('\u{000C}'),
                'n' => string.push('\n'),
                'r' => string.push('\r'),
                't' => string.push('\t'),
                'u' => {
                    let c = self.parse_unicode_escape()?;
                    string.push(c);
                }
                // Covers \" \\ \/ \' \` and lenient unknown escapes
                other => string.push(other),
            }
        }
    }

    fn parse_hex4(&mut self) -> ExtractResult<Option<u32>> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(ch) = self.peek() else {
                return Err(self.end_of_input());
            };
            let Some(digit) = ch.to_digit(16) else {
                return Ok(None);
            };
            code = code * 16 + digit;
            self.advance();
        }
        Ok(Some(code))
    }

    fn parse_unicode_escape(&mut self) -> ExtractResult<char> {
        let Some(high) = self.parse_hex4()? else {
            return Ok('\u{FFFD}');
        };

        if (0xD800..0xDC00).contains(&high)
            && self.peek() == Some('\\')
            && self.peek_at(1) == Some('u')
        {
            let resume = self.position;
            self.position += 2;
            if let Some(low) = self.parse_hex4()? {
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                }
            }
            self.position = resume;
        }

        Ok(char::from_u32(high).unwrap_or('\u{FFFD}'))
    }

    fn parse_number(&mut self) -> ExtractResult<Value> {
        let start = self.position;
        let mut number = String::new();

        match self.peek() {
            Some('-') => {
                number.push('-');
                self.advance();
            }
            Some('+') => self.advance(),
            _ => {}
        }

        let digits_start = number.len();
        self.take_digits(&mut number);
        if number.len() == digits_start {
            self.position = start;
            return self.parse_word();
        }

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            number.push('.');
            self.advance();
            self.take_digits(&mut number);
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            let sign = self.peek_at(1).filter(|c| *c == '+' || *c == '-');
            let digit_offset = if sign.is_some() { 2 } else { 1 };
            if self.peek_at(digit_offset).is_some_and(|c| c.is_ascii_digit()) {
                number.push(e);
                self.advance();
                if let Some(sign) = sign {
                    number.push(sign);
                    self.advance();
                }
                self.take_digits(&mut number);
            }
        }

        // "123abc" is a word, not a number
        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            self.position = start;
            return self.parse_word();
        }

        if let Ok(n) = number.parse::<i64>() {
            Ok(Value::Number(Number::from(n)))
        } else if let Ok(n) = number.parse::<u64>() {
            Ok(Value::Number(Number::from(n)))
        } else {
            let n = number
                .parse::<f64>()
                .map_err(|_| ExtractError::UnexpectedChar {
                    ch: number.chars().next().unwrap_or('?'),
                    position: start,
                })?;
            Ok(Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null))
        }
    }

    fn take_digits(&mut self, number: &mut String) {
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            number.push(ch);
            self.advance();
        }
    }

    /// Parse a literal or an unquoted bare word
    fn parse_word(&mut self) -> ExtractResult<Value> {
        let start = self.position;

        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_' || c == '$') {
                break;
            }
            self.advance();
        }
        let ident: String = self.input[start..self.position].iter().collect();

        if self.peek().is_none() {
            // A word cut off by end-of-input may be an unfinished literal
            return match LITERALS.iter().find(|(name, _)| *name == ident) {
                Some((_, literal)) => Ok(literal.to_value()),
                None => Err(self.end_of_input()),
            };
        }

        if let Some((_, literal)) = LITERALS.iter().find(|(name, _)| *name == ident) {
            let mut lookahead = self.position;
            while self.input.get(lookahead).is_some_and(|c| *c == ' ' || *c == '\t') {
                lookahead += 1;
            }
            let ends_value = match self.input.get(lookahead) {
                None => true,
                Some(c) => ",}]:\r\n/#".contains(*c),
            };
            if ends_value {
                return Ok(literal.to_value());
            }
        }

        // Bare word: runs to the next delimiter on the same line
        self.position = start;
        while let Some(c) = self.peek() {
            if ",}]\r\n".contains(c) {
                break;
            }
            self.advance();
        }
        if self.peek().is_none() {
            return Err(self.end_of_input());
        }

        let word: String = self.input[start..self.position].iter().collect();
        let word = word.trim_end();
        if word.is_empty() {
            let ch = self.input[start];
            return Err(ExtractError::UnexpectedChar { ch, position: start });
        }
        Ok(Value::String(word.to_string()))
    }
}
