// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Element range splitting.
//!
//! Given the byte range of a JSON array or object, yields the sub-range of
//! each element (or each member value, with its key) without decoding it.
//! Nested containers only move a depth counter, so their inner commas never
//! end an element.

use super::lexer::{Lexer, Token};
use super::JsonSource;
use crate::core::{CodecError, Result};

/// Absolute `(offset, length)` of a value.
pub type Range = (u64, u64);

fn not_valid(offset: u64) -> CodecError {
    CodecError::invalid_stream(offset, "JSON is not valid.")
}

/// Open a lexer over the range and consume the opening bracket.
///
/// Returns `None` when the range holds the literal `null`, otherwise the
/// lexer and the offset just past the bracket.
fn open<'s>(
    source: &'s dyn JsonSource,
    offset: u64,
    length: Option<u64>,
    bracket: &str,
) -> Result<Option<(Lexer<'s>, u64)>> {
    let mut lexer = Lexer::new(source, offset, length);
    let first = match lexer.next() {
        Some(token) => token?,
        None => return Err(not_valid(offset)),
    };

    if first.text == "null" {
        if let Some(rest) = lexer.next() {
            rest?;
            return Err(not_valid(first.offset));
        }
        return Ok(None);
    }

    if first.text != bracket {
        return Err(not_valid(first.offset));
    }

    Ok(Some((lexer, first.offset + 1)))
}

/// Split a JSON array into element ranges.
pub fn split_list(
    source: &dyn JsonSource,
    offset: u64,
    length: Option<u64>,
) -> Result<Option<ListSplit<'_>>> {
    Ok(open(source, offset, length, "[")?.map(|(lexer, end)| ListSplit {
        lexer,
        end,
        level: 0,
        start: None,
        closed: false,
    }))
}

/// Split a JSON object into `(key, value range)` pairs.
pub fn split_dict(
    source: &dyn JsonSource,
    offset: u64,
    length: Option<u64>,
) -> Result<Option<DictSplit<'_>>> {
    Ok(open(source, offset, length, "{")?.map(|(lexer, end)| DictSplit {
        lexer,
        end,
        level: 0,
        key: None,
        start: None,
        value_next: false,
        closed: false,
    }))
}

/// Lazy element ranges of a JSON array.
pub struct ListSplit<'s> {
    lexer: Lexer<'s>,
    /// End of the last token read
    end: u64,
    level: i32,
    start: Option<u64>,
    closed: bool,
}

impl ListSplit<'_> {
    fn advance(&mut self) -> Result<Option<Range>> {
        loop {
            let Some(token) = self.lexer.next() else {
                if !self.closed {
                    return Err(not_valid(self.end));
                }
                return Ok(None);
            };
            let Token { text, offset } = token?;
            self.end = offset + text.len() as u64;
            if self.closed {
                return Err(not_valid(offset));
            }

            match text.as_str() {
                "[" | "{" => {
                    self.start.get_or_insert(offset);
                    self.level += 1;
                }
                "]" | "}" => {
                    let start = *self.start.get_or_insert(offset);
                    self.level -= 1;
                    if self.level == -1 {
                        self.closed = true;
                        self.start = None;
                        if offset > start {
                            return Ok(Some((start, offset - start)));
                        }
                    }
                }
                "," if self.level == 0 => {
                    let start = self.start.take().ok_or_else(|| not_valid(offset))?;
                    return Ok(Some((start, offset - start)));
                }
                _ => {
                    self.start.get_or_insert(offset);
                }
            }
        }
    }
}

impl Iterator for ListSplit<'_> {
    type Item = Result<Range>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

/// Lazy member ranges of a JSON object.
pub struct DictSplit<'s> {
    lexer: Lexer<'s>,
    /// End of the last token read
    end: u64,
    level: i32,
    key: Option<String>,
    start: Option<u64>,
    value_next: bool,
    closed: bool,
}

impl DictSplit<'_> {
    fn take_entry(&mut self, end: u64) -> Result<(String, Range)> {
        match (self.key.take(), self.start.take()) {
            (Some(key), Some(start)) => Ok((key, (start, end - start))),
            _ => Err(not_valid(end)),
        }
    }

    fn advance(&mut self) -> Result<Option<(String, Range)>> {
        loop {
            let Some(token) = self.lexer.next() else {
                if !self.closed {
                    return Err(not_valid(self.end));
                }
                return Ok(None);
            };
            let Token { text, offset } = token?;
            self.end = offset + text.len() as u64;
            if self.closed {
                return Err(not_valid(offset));
            }

            match text.as_str() {
                "{" | "[" => {
                    if self.level == 0 && self.value_next {
                        self.start = Some(offset);
                        self.value_next = false;
                    }
                    self.level += 1;
                }
                "}" | "]" => {
                    self.level -= 1;
                    if self.level == -1 {
                        self.closed = true;
                        if self.key.is_some() {
                            return self.take_entry(offset).map(Some);
                        }
                    }
                }
                ":" if self.level == 0 => self.value_next = true,
                "," if self.level == 0 => return self.take_entry(offset).map(Some),
                _ if self.level == 0 => {
                    if self.value_next {
                        self.start = Some(offset);
                        self.value_next = false;
                    } else if self.key.is_none() {
                        self.key = Some(serde_json::from_str(&text)?);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Iterator for DictSplit<'_> {
    type Item = Result<(String, Range)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}
