//! Recursive descent JSON parser.
//!
//! Standard JSON grammar (RFC 8259) with two additions the domain needs:
//! numbers remember whether they were written integer-shaped, and duplicate
//! object keys keep their first value.
//!
//! `\u` escapes: a high surrogate followed by a `\u` low surrogate is
//! combined into one scalar value; any other surrogate becomes U+FFFD.

use super::limits::JsonLimits;
use super::value::{JsonNumber, JsonObject, JsonValue};
use crate::error::JsonError;

/// Parse `text` with default limits.
pub fn parse(text: &str) -> Result<JsonValue, JsonError> {
    parse_with_limits(text, JsonLimits::default())
}

/// Parse `text`, failing if arrays/objects nest deeper than `limits` allow.
pub fn parse_with_limits(text: &str, limits: JsonLimits) -> Result<JsonValue, JsonError> {
    Parser::new(text, limits).parse()
}

/// JSON parser over a single input document.
pub struct Parser<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    limits: JsonLimits,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, limits: JsonLimits) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos: 0,
            limits,
            depth: 0,
        }
    }

    /// Parse exactly one value surrounded by optional whitespace.
    pub fn parse(mut self) -> Result<JsonValue, JsonError> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(self.error("Expected JSON value."));
        }

        let value = self.parse_value()?;

        self.skip_whitespace();
        if !self.at_end() {
            return Err(self.error("Unexpected trailing characters."));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<JsonValue, JsonError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("Unexpected end of input.")),
            Some(b'n') => self.parse_literal(b"null", JsonValue::Null),
            Some(b't') => self.parse_literal(b"true", JsonValue::Bool(true)),
            Some(b'f') => self.parse_literal(b"false", JsonValue::Bool(false)),
            Some(b'"') => Ok(JsonValue::String(self.parse_string()?)),
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_object(),
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number(),
            Some(_) => Err(self.error("Invalid JSON value.")),
        }
    }

    fn parse_literal(&mut self, literal: &[u8], value: JsonValue) -> Result<JsonValue, JsonError> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(self.error("Invalid literal."))
        }
    }

    fn parse_array(&mut self) -> Result<JsonValue, JsonError> {
        self.enter()?;
        self.pos += 1; // '['

        let mut values = Vec::new();
        self.skip_whitespace();
        if self.consume(b']') {
            self.depth -= 1;
            return Ok(JsonValue::Array(values));
        }

        loop {
            values.push(self.parse_value()?);
            self.skip_whitespace();
            if self.consume(b']') {
                break;
            }
            if self.at_end() {
                return Err(self.error("Unterminated array."));
            }
            if !self.consume(b',') {
                return Err(self.error("Expected ',' in array."));
            }
        }

        self.depth -= 1;
        Ok(JsonValue::Array(values))
    }

    fn parse_object(&mut self) -> Result<JsonValue, JsonError> {
        self.enter()?;
        self.pos += 1; // '{'

        let mut object = JsonObject::new();
        self.skip_whitespace();
        if self.consume(b'}') {
            self.depth -= 1;
            return Ok(JsonValue::Object(object));
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'"') => {}
                None => return Err(self.error("Unterminated object.")),
                Some(_) => return Err(self.error("Expected object key string.")),
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            if !self.consume(b':') {
                return Err(self.error("Expected ':' after object key."));
            }

            let value = self.parse_value()?;
            // Later duplicates are dropped.
            object.insert(key, value);

            self.skip_whitespace();
            if self.consume(b'}') {
                break;
            }
            if self.at_end() {
                return Err(self.error("Unterminated object."));
            }
            if !self.consume(b',') {
                return Err(self.error("Expected ',' in object."));
            }
        }

        self.depth -= 1;
        Ok(JsonValue::Object(object))
    }

    fn parse_number(&mut self) -> Result<JsonValue, JsonError> {
        let start = self.pos;
        let mut integer_shaped = true;

        self.consume(b'-');

        // Integer part: a lone '0' or a non-zero digit run
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error("Invalid number.")),
        }

        if self.consume(b'.') {
            integer_shaped = false;
            if !self.peek_digit() {
                return Err(self.error("Invalid fractional number."));
            }
            self.skip_digits();
        }

        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            integer_shaped = false;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if !self.peek_digit() {
                return Err(self.error("Invalid exponent."));
            }
            self.skip_digits();
        }

        // Every byte consumed above is ASCII, so both ends are char boundaries.
        let lexeme = &self.text[start..self.pos];
        Ok(JsonValue::Number(JsonNumber::from_lexeme(
            lexeme,
            integer_shaped,
        )))
    }

    fn parse_string(&mut self) -> Result<String, JsonError> {
        self.pos += 1; // opening quote

        let mut out = Vec::new();
        loop {
            let Some(byte) = self.bump() else {
                return Err(self.error("Unterminated string."));
            };
            match byte {
                b'"' => break,
                b'\\' => self.parse_escape(&mut out)?,
                b if b < 0x20 => {
                    self.pos -= 1;
                    return Err(self.error("Control character in string."));
                }
                b => out.push(b),
            }
        }

        // Raw bytes come from a &str and escapes are encoded from chars, so
        // this only fails if the invariant above is broken.
        String::from_utf8(out).map_err(|_| self.error("Invalid UTF-8 in string."))
    }

    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<(), JsonError> {
        let Some(escape) = self.bump() else {
            return Err(self.error("Unterminated escape sequence."));
        };
        match escape {
            b'"' | b'\\' | b'/' => out.push(escape),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let ch = self.parse_unicode_escape()?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            _ => {
                self.pos -= 1;
                return Err(self.error("Invalid escape sequence."));
            }
        }
        Ok(())
    }

    /// Decodes the four hex digits after `\u`, pairing surrogates when a
    /// matching `\uDC00..\uDFFF` follows.
    fn parse_unicode_escape(&mut self) -> Result<char, JsonError> {
        let unit = self.read_hex4()?;

        if (0xD800..=0xDBFF).contains(&unit) {
            let rewind = self.pos;
            if self.consume(b'\\') && self.consume(b'u') {
                if let Ok(low) = self.read_hex4() {
                    if (0xDC00..=0xDFFF).contains(&low) {
                        let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        return Ok(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                }
            }
            // Not a pair: leave the following escape for the caller.
            self.pos = rewind;
        }

        Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn read_hex4(&mut self) -> Result<u32, JsonError> {
        let Some(digits) = self.input.get(self.pos..self.pos + 4) else {
            return Err(self.error("Invalid unicode escape."));
        };

        let mut value = 0u32;
        for &digit in digits {
            let nibble = match digit {
                b'0'..=b'9' => digit - b'0',
                b'a'..=b'f' => digit - b'a' + 10,
                b'A'..=b'F' => digit - b'A' + 10,
                _ => return Err(self.error("Invalid unicode escape.")),
            };
            value = (value << 4) | u32::from(nibble);
        }
        self.pos += 4;
        Ok(value)
    }

    // -------------------------------------------------------------------------
    // Cursor helpers
    // -------------------------------------------------------------------------

    fn enter(&mut self) -> Result<(), JsonError> {
        if self.depth >= self.limits.max_depth() {
            return Err(self.error("Nesting too deep."));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_digit() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_digit(&self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9'))
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn consume(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, message: &'static str) -> JsonError {
        JsonError::new(message, self.pos)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
