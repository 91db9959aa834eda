//! Incremental JSON tokenizer
//!
//! Bytes are pushed in arbitrary chunks with [`Tokenizer::feed`]; every
//! structural event is handed to a [`TokenSink`] as soon as its last byte
//! has arrived. Nothing is buffered beyond the string or number currently
//! being scanned, so chunk boundaries may fall anywhere, including inside
//! a multi-byte UTF-8 sequence or an escape.
//!
//! ```text
//! feed(b"{\"a\": [1, tr")  ->  StartObject, Key("a"), StartArray, Number("1")
//! feed(b"ue]}")            ->  Bool(true), EndArray, EndObject
//! finish()                 ->  Ok (document closed)
//! ```

use crate::error::{ParseError, Result};

/// A structural JSON event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    /// Object member name
    Key(String),
    String(String),
    /// Number in its JSON lexical form
    Number(String),
    Bool(bool),
    Null,
}

/// Receiver of tokens; an error aborts the feed that produced the token
pub trait TokenSink {
    fn token(&mut self, token: Token) -> Result<()>;
}

impl<F> TokenSink for F
where
    F: FnMut(Token) -> Result<()>,
{
    fn token(&mut self, token: Token) -> Result<()> {
        self(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Any value (document start, after ':' or after ',' in an array)
    Value,
    /// After '[': a value or ']'
    ArrayFirst,
    /// After '{': a key or '}'
    ObjectFirst,
    /// After ',' inside an object
    Key,
    Colon,
    AfterValue,
    /// Top-level value complete; only whitespace may follow
    Done,
    Str { key: bool },
    Escape { key: bool },
    Unicode { key: bool, digits: u8, code: u32 },
    Number,
    Literal { word: &'static [u8], matched: usize },
}

/// Push-fed JSON tokenizer for a single document
#[derive(Debug)]
pub struct Tokenizer {
    state: State,
    containers: Vec<Container>,
    /// Raw bytes of the string or number being scanned
    buf: Vec<u8>,
    /// High half of a `\uD8xx\uDCxx` pair waiting for its low half
    pending_high: Option<u32>,
    offset: u64,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            state: State::Value,
            containers: Vec::new(),
            buf: Vec::new(),
            pending_high: None,
            offset: 0,
        }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of currently open objects and arrays
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    /// True once the top-level value has been fully read
    pub fn is_complete(&self) -> bool {
        self.state == State::Done
    }

    /// Consume a chunk, emitting every token it completes
    pub fn feed<S: TokenSink + ?Sized>(&mut self, chunk: &[u8], sink: &mut S) -> Result<()> {
        for &b in chunk {
            self.step(b, sink)?;
            self.offset += 1;
        }
        Ok(())
    }

    /// Signal end of input
    ///
    /// Fails if the document is empty or any structure is still open.
    pub fn finish<S: TokenSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        match self.state {
            State::Done => Ok(()),
            State::Number => self.end_number(sink),
            State::Value if self.containers.is_empty() => {
                Err(self.error("unexpected end of input: empty document"))
            }
            State::Str { .. } | State::Escape { .. } | State::Unicode { .. } => {
                Err(self.error("unexpected end of input: unterminated string"))
            }
            _ => {
                let open = match self.containers.last() {
                    Some(Container::Object) => "object",
                    Some(Container::Array) => "array",
                    None => "value",
                };
                Err(self.error(format!("unexpected end of input: unclosed {}", open)))
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(self.offset, message)
    }

    fn unexpected(&self, b: u8) -> ParseError {
        if b.is_ascii_graphic() {
            self.error(format!("unexpected character '{}'", b as char))
        } else {
            self.error(format!("unexpected byte 0x{:02x}", b))
        }
    }

    fn step<S: TokenSink + ?Sized>(&mut self, b: u8, sink: &mut S) -> Result<()> {
        loop {
            match self.state {
                State::Str { key } => return self.string_byte(key, b, sink),
                State::Escape { key } => return self.escape_byte(key, b),
                State::Unicode { key, digits, code } => {
                    let digit = (b as char)
                        .to_digit(16)
                        .ok_or_else(|| self.error("invalid \\u escape"))?;
                    let code = code * 16 + digit;
                    if digits == 3 {
                        self.push_code_unit(code)?;
                        self.state = State::Str { key };
                    } else {
                        self.state = State::Unicode {
                            key,
                            digits: digits + 1,
                            code,
                        };
                    }
                    return Ok(());
                }
                State::Number => {
                    if matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                        self.buf.push(b);
                        return Ok(());
                    }
                    // The terminator belongs to the enclosing structure
                    self.end_number(sink)?;
                    continue;
                }
                State::Literal { word, matched } => {
                    if word[matched] != b {
                        return Err(self.unexpected(b));
                    }
                    if matched + 1 < word.len() {
                        self.state = State::Literal {
                            word,
                            matched: matched + 1,
                        };
                        return Ok(());
                    }
                    let token = match word {
                        b"true" => Token::Bool(true),
                        b"false" => Token::Bool(false),
                        _ => Token::Null,
                    };
                    sink.token(token)?;
                    self.state = self.after_value();
                    return Ok(());
                }
                _ if is_whitespace(b) => return Ok(()),
                State::Value => return self.begin_value(b, sink),
                State::ArrayFirst => {
                    if b == b']' {
                        return self.close(Container::Array, sink);
                    }
                    return self.begin_value(b, sink);
                }
                State::ObjectFirst => {
                    return match b {
                        b'"' => {
                            self.state = State::Str { key: true };
                            Ok(())
                        }
                        b'}' => self.close(Container::Object, sink),
                        _ => Err(self.unexpected(b)),
                    };
                }
                State::Key => {
                    if b != b'"' {
                        return Err(self.unexpected(b));
                    }
                    self.state = State::Str { key: true };
                    return Ok(());
                }
                State::Colon => {
                    if b != b':' {
                        return Err(self.unexpected(b));
                    }
                    self.state = State::Value;
                    return Ok(());
                }
                State::AfterValue => {
                    return match (b, self.containers.last()) {
                        (b',', Some(Container::Object)) => {
                            self.state = State::Key;
                            Ok(())
                        }
                        (b',', Some(Container::Array)) => {
                            self.state = State::Value;
                            Ok(())
                        }
                        (b'}', Some(Container::Object)) => self.close(Container::Object, sink),
                        (b']', Some(Container::Array)) => self.close(Container::Array, sink),
                        _ => Err(self.unexpected(b)),
                    };
                }
                State::Done => {
                    return Err(self.error("trailing characters after JSON document"));
                }
            }
        }
    }

    fn begin_value<S: TokenSink + ?Sized>(&mut self, b: u8, sink: &mut S) -> Result<()> {
        match b {
            b'{' => {
                self.containers.push(Container::Object);
                self.state = State::ObjectFirst;
                sink.token(Token::StartObject)
            }
            b'[' => {
                self.containers.push(Container::Array);
                self.state = State::ArrayFirst;
                sink.token(Token::StartArray)
            }
            b'"' => {
                self.state = State::Str { key: false };
                Ok(())
            }
            b'-' | b'0'..=b'9' => {
                self.buf.push(b);
                self.state = State::Number;
                Ok(())
            }
            b't' => self.begin_literal(b"true"),
            b'f' => self.begin_literal(b"false"),
            b'n' => self.begin_literal(b"null"),
            _ => Err(self.unexpected(b)),
        }
    }

    fn begin_literal(&mut self, word: &'static [u8]) -> Result<()> {
        self.state = State::Literal { word, matched: 1 };
        Ok(())
    }

    fn close<S: TokenSink + ?Sized>(&mut self, container: Container, sink: &mut S) -> Result<()> {
        self.containers.pop();
        self.state = self.after_value();
        match container {
            Container::Object => sink.token(Token::EndObject),
            Container::Array => sink.token(Token::EndArray),
        }
    }

    fn after_value(&self) -> State {
        if self.containers.is_empty() {
            State::Done
        } else {
            State::AfterValue
        }
    }

    fn string_byte<S: TokenSink + ?Sized>(&mut self, key: bool, b: u8, sink: &mut S) -> Result<()> {
        match b {
            b'"' => {
                if self.pending_high.is_some() {
                    return Err(self.error("unpaired surrogate in \\u escape"));
                }
                let bytes = std::mem::take(&mut self.buf);
                let text = String::from_utf8(bytes)
                    .map_err(|_| self.error("invalid UTF-8 in string"))?;
                if key {
                    self.state = State::Colon;
                    sink.token(Token::Key(text))
                } else {
                    self.state = self.after_value();
                    sink.token(Token::String(text))
                }
            }
            b'\\' => {
                self.state = State::Escape { key };
                Ok(())
            }
            0x00..=0x1f => Err(self.error("control character in string")),
            _ => {
                if self.pending_high.is_some() {
                    return Err(self.error("unpaired surrogate in \\u escape"));
                }
                self.buf.push(b);
                Ok(())
            }
        }
    }

    fn escape_byte(&mut self, key: bool, b: u8) -> Result<()> {
        if b == b'u' {
            self.state = State::Unicode {
                key,
                digits: 0,
                code: 0,
            };
            return Ok(());
        }
        if self.pending_high.is_some() {
            return Err(self.error("unpaired surrogate in \\u escape"));
        }
        let decoded = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            _ => return Err(self.error(format!("invalid escape '\\{}'", b as char))),
        };
        self.buf.push(decoded);
        self.state = State::Str { key };
        Ok(())
    }

    fn push_code_unit(&mut self, code: u32) -> Result<()> {
        let scalar = match (self.pending_high.take(), code) {
            (Some(high), 0xdc00..=0xdfff) => 0x10000 + ((high - 0xd800) << 10) + (code - 0xdc00),
            (Some(_), _) | (None, 0xdc00..=0xdfff) => {
                return Err(self.error("unpaired surrogate in \\u escape"));
            }
            (None, 0xd800..=0xdbff) => {
                self.pending_high = Some(code);
                return Ok(());
            }
            (None, code) => code,
        };
        let c = char::from_u32(scalar).ok_or_else(|| self.error("invalid \\u escape"))?;
        let mut utf8 = [0u8; 4];
        self.buf
            .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }

    fn end_number<S: TokenSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let bytes = std::mem::take(&mut self.buf);
        if !is_valid_number(&bytes) {
            return Err(self.error(format!(
                "invalid number '{}'",
                String::from_utf8_lossy(&bytes)
            )));
        }
        self.state = self.after_value();
        // Only ASCII digits and signs reach the buffer
        let text = String::from_utf8_lossy(&bytes).into_owned();
        sink.token(Token::Number(text))
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn is_valid_number(s: &[u8]) -> bool {
    let digits = |i: &mut usize| {
        let start = *i;
        while s.get(*i).is_some_and(u8::is_ascii_digit) {
            *i += 1;
        }
        *i > start
    };

    let mut i = 0;
    if s.first() == Some(&b'-') {
        i += 1;
    }
    match s.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            digits(&mut i);
        }
        _ => return false,
    }
    if s.get(i) == Some(&b'.') {
        i += 1;
        if !digits(&mut i) {
            return false;
        }
    }
    if matches!(s.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(s.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !digits(&mut i) {
            return false;
        }
    }
    i == s.len()
}
