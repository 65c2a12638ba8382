// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Random-access JSON sources and push writers.
//!
//! Streaming decode never loads the whole document: the [`lexer`] and
//! [`splitter`] read bounded chunks from a [`JsonSource`] by absolute offset,
//! and nested values are decoded later from their own byte range.

pub mod lexer;
pub mod splitter;

use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::core::{CodecError, Result};

pub use lexer::{Lexer, Token};
pub use splitter::{split_dict, split_list, DictSplit, ListSplit};

/// Byte source supporting reads at absolute offsets.
pub trait JsonSource {
    /// Total length in bytes.
    fn len(&self) -> Result<u64>;

    /// Read into `buf` starting at `offset`; returns 0 at end of input.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read `length` bytes from `offset`, or up to the end when `None`.
    fn read_range(&self, offset: u64, length: Option<u64>) -> Result<Vec<u8>> {
        let end = match length {
            Some(length) => offset + length,
            None => self.len()?,
        };
        let mut out = vec![0u8; end.saturating_sub(offset) as usize];
        let mut filled = 0;
        while filled < out.len() {
            let read = self.read_at(offset + filled as u64, &mut out[filled..])?;
            if read == 0 {
                return Err(CodecError::invalid_stream(
                    offset + filled as u64,
                    "Unexpected end of stream.",
                ));
            }
            filled += read;
        }
        Ok(out)
    }
}

/// Sink for push-mode encoding.
pub trait StreamWriter {
    fn write_fragment(&mut self, fragment: &str) -> Result<()>;
}

impl StreamWriter for String {
    fn write_fragment(&mut self, fragment: &str) -> Result<()> {
        self.push_str(fragment);
        Ok(())
    }
}

/// In-memory stream, usable both as a writer and as a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStream {
    data: Vec<u8>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for MemoryStream {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&str> for MemoryStream {
    fn from(data: &str) -> Self {
        Self {
            data: data.as_bytes().to_vec(),
        }
    }
}

impl JsonSource for MemoryStream {
    fn len(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = (offset as usize).min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }
}

impl StreamWriter for MemoryStream {
    fn write_fragment(&mut self, fragment: &str) -> Result<()> {
        self.data.extend_from_slice(fragment.as_bytes());
        Ok(())
    }
}

/// File-backed source; every read seeks to its absolute offset.
#[derive(Debug)]
pub struct FileSource {
    file: RefCell<File>,
}

impl FileSource {
    pub fn new(file: File) -> Self {
        Self {
            file: RefCell::new(file),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| CodecError::io(format!("opening {}", path.display()), e.to_string()))?;
        Ok(Self::new(file))
    }
}

impl JsonSource for FileSource {
    fn len(&self) -> Result<u64> {
        Ok(self.file.borrow().metadata()?.len())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(offset))?;
        Ok(file.read(buf)?)
    }
}
