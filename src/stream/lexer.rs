// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Validating JSON tokenizer.
//!
//! Scans a byte range of a [`JsonSource`] in bounded chunks and yields each
//! token with its absolute offset. Whitespace and the structural characters
//! `{ } [ ] , :` delimit tokens; anything else between them (strings,
//! numbers, literals) is one token. Every token is checked against a state
//! machine of expected tokens, so the sequence ends in an error unless the
//! range holds exactly one well-formed JSON value.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::JsonSource;
use crate::core::{CodecError, Result};

/// Bytes read from the source per chunk.
pub const CHUNK_SIZE: usize = 8192;

const DICT_START: u16 = 1;
const DICT_END: u16 = 2;
const LIST_START: u16 = 4;
const LIST_END: u16 = 8;
const KEY: u16 = 16;
const COLON: u16 = 32;
const COMMA: u16 = 64;
const SCALAR: u16 = 128;
const END: u16 = 256;
const VALUE: u16 = DICT_START | LIST_START | SCALAR;

static KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^"(?:[^"\\\x00-\x1F]|\\["\\/bfnrt]|\\u[0-9a-fA-F]{4})*"$"#)
        .expect("key pattern is valid")
});

static SCALAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:"(?:[^"\\\x00-\x1F]|\\["\\/bfnrt]|\\u[0-9a-fA-F]{4})*"|-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?|true|false|null)$"#,
    )
    .expect("scalar pattern is valid")
});

/// A token and its absolute offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Structure {
    Dict,
    List,
}

/// Expected-token state machine.
#[derive(Debug)]
struct Validator {
    expected: u16,
    structures: Vec<Structure>,
    keys: Vec<HashSet<String>>,
}

impl Validator {
    fn new() -> Self {
        Self {
            expected: VALUE,
            structures: Vec::new(),
            keys: Vec::new(),
        }
    }

    fn unexpected(token: &str, offset: u64) -> CodecError {
        CodecError::invalid_stream(offset, format!("Unexpected \"{token}\" reached."))
    }

    fn after_value(&mut self) {
        self.expected = match self.structures.last() {
            None => END,
            Some(Structure::List) => LIST_END | COMMA,
            Some(Structure::Dict) => DICT_END | COMMA,
        };
    }

    fn accept(&mut self, token: &str, offset: u64) -> Result<()> {
        match token {
            "{" => {
                if self.expected & DICT_START == 0 {
                    return Err(Self::unexpected(token, offset));
                }
                self.structures.push(Structure::Dict);
                self.keys.push(HashSet::new());
                self.expected = DICT_END | KEY;
            }
            "}" => {
                if self.expected & DICT_END == 0
                    || self.structures.last() != Some(&Structure::Dict)
                {
                    return Err(Self::unexpected(token, offset));
                }
                self.structures.pop();
                self.keys.pop();
                self.after_value();
            }
            "[" => {
                if self.expected & LIST_START == 0 {
                    return Err(Self::unexpected(token, offset));
                }
                self.structures.push(Structure::List);
                self.expected = LIST_END | VALUE;
            }
            "]" => {
                if self.expected & LIST_END == 0
                    || self.structures.last() != Some(&Structure::List)
                {
                    return Err(Self::unexpected(token, offset));
                }
                self.structures.pop();
                self.after_value();
            }
            "," => {
                if self.expected & COMMA == 0 {
                    return Err(Self::unexpected(token, offset));
                }
                self.expected = match self.structures.last() {
                    Some(Structure::Dict) => KEY,
                    _ => VALUE,
                };
            }
            ":" => {
                if self.expected & COLON == 0
                    || self.structures.last() != Some(&Structure::Dict)
                {
                    return Err(Self::unexpected(token, offset));
                }
                self.expected = VALUE;
            }
            _ => {
                if self.expected & KEY != 0 {
                    if !KEY_REGEX.is_match(token) {
                        return Err(CodecError::invalid_stream(
                            offset,
                            format!("Invalid key {token}."),
                        ));
                    }
                    let keys = self
                        .keys
                        .last_mut()
                        .ok_or_else(|| Self::unexpected(token, offset))?;
                    if !keys.insert(token.to_string()) {
                        return Err(CodecError::invalid_stream(
                            offset,
                            format!("Got {token} key twice."),
                        ));
                    }
                    self.expected = COLON;
                } else if self.expected & SCALAR != 0 {
                    if !SCALAR_REGEX.is_match(token) {
                        return Err(CodecError::invalid_stream(
                            offset,
                            format!("Invalid scalar \"{token}\"."),
                        ));
                    }
                    self.after_value();
                } else {
                    return Err(Self::unexpected(token, offset));
                }
            }
        }
        Ok(())
    }

    fn finish(&self, offset: u64) -> Result<()> {
        if self.expected & END == 0 {
            return Err(CodecError::invalid_stream(
                offset,
                "Unexpected end of stream.",
            ));
        }
        Ok(())
    }
}

/// Lazy, validating token iterator over a byte range.
///
/// Not restartable: once it yields an error or reaches the end, it yields
/// nothing more.
pub struct Lexer<'s> {
    source: &'s dyn JsonSource,
    /// Absolute offset of the next byte to read from the source
    position: u64,
    end: Option<u64>,
    chunk: Vec<u8>,
    chunk_start: u64,
    chunk_pos: usize,
    in_string: bool,
    escaping: bool,
    pending: Option<(Vec<u8>, u64)>,
    validator: Validator,
    done: bool,
}

impl<'s> Lexer<'s> {
    /// Tokenize `length` bytes from `offset`, or up to the end when `None`.
    pub fn new(source: &'s dyn JsonSource, offset: u64, length: Option<u64>) -> Self {
        Self {
            source,
            position: offset,
            end: length.map(|l| offset + l),
            chunk: Vec::new(),
            chunk_start: offset,
            chunk_pos: 0,
            in_string: false,
            escaping: false,
            pending: None,
            validator: Validator::new(),
            done: false,
        }
    }

    /// Absolute offset just past the last byte consumed.
    fn cursor(&self) -> u64 {
        self.chunk_start + self.chunk_pos as u64
    }

    fn next_byte(&mut self) -> Result<Option<(u8, u64)>> {
        if self.chunk_pos >= self.chunk.len() {
            let mut size = CHUNK_SIZE as u64;
            if let Some(end) = self.end {
                size = size.min(end.saturating_sub(self.position));
            }
            if size == 0 {
                return Ok(None);
            }
            self.chunk.resize(size as usize, 0);
            let read = self.source.read_at(self.position, &mut self.chunk)?;
            self.chunk.truncate(read);
            self.chunk_start = self.position;
            self.chunk_pos = 0;
            self.position += read as u64;
            if read == 0 {
                return Ok(None);
            }
        }

        let offset = self.cursor();
        let byte = self.chunk[self.chunk_pos];
        self.chunk_pos += 1;
        Ok(Some((byte, offset)))
    }

    fn next_raw(&mut self) -> Result<Option<(Vec<u8>, u64)>> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }

        let mut token = Vec::new();
        let mut start = 0;

        while let Some((byte, offset)) = self.next_byte()? {
            if self.in_string {
                token.push(byte);
                if self.escaping {
                    self.escaping = false;
                } else if byte == b'\\' {
                    self.escaping = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b' ' | b'\r' | b'\t' | b'\n' => {
                    if !token.is_empty() {
                        return Ok(Some((token, start)));
                    }
                }
                b'{' | b'}' | b'[' | b']' | b',' | b':' => {
                    if token.is_empty() {
                        return Ok(Some((vec![byte], offset)));
                    }
                    self.pending = Some((vec![byte], offset));
                    return Ok(Some((token, start)));
                }
                _ => {
                    if token.is_empty() {
                        start = offset;
                    }
                    if byte == b'"' {
                        self.in_string = true;
                    }
                    token.push(byte);
                }
            }
        }

        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some((token, start)))
        }
    }

    fn advance(&mut self) -> Result<Option<Token>> {
        let Some((bytes, offset)) = self.next_raw()? else {
            self.validator.finish(self.cursor())?;
            return Ok(None);
        };

        let text = String::from_utf8(bytes)
            .map_err(|_| CodecError::invalid_stream(offset, "Invalid UTF-8 sequence."))?;
        self.validator.accept(&text, offset)?;
        Ok(Some(Token { text, offset }))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Tokenize a byte range of `source`.
pub fn tokenize(source: &dyn JsonSource, offset: u64, length: Option<u64>) -> Lexer<'_> {
    Lexer::new(source, offset, length)
}
