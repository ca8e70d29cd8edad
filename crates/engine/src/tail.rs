// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forward-only reads of append-only log files.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Stderr bytes scanned when collecting a failure tail.
const TAIL_WINDOW: u64 = 64 * 1024;

/// Complete lines read from a log, and the offset just past the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChunk {
    pub lines: Vec<String>,
    pub offset: u64,
}

impl LogChunk {
    fn empty(offset: u64) -> Self {
        Self {
            lines: Vec::new(),
            offset,
        }
    }
}

/// Current length of `path`, 0 if it does not exist.
pub fn file_len(path: &Path) -> io::Result<u64> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// Read complete lines starting at `offset`.
///
/// A trailing line without its newline is left for the next call. A file
/// that is missing or shorter than `offset` yields nothing.
pub fn read_lines_from(path: &Path, offset: u64) -> io::Result<LogChunk> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LogChunk::empty(offset)),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() <= offset {
        return Ok(LogChunk::empty(offset));
    }

    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(offset))?;

    let mut chunk = LogChunk::empty(offset);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 || buf.last() != Some(&b'\n') {
            break;
        }
        chunk.offset += n as u64;
        let line = String::from_utf8_lossy(&buf[..n - 1]);
        chunk.lines.push(line.trim_end_matches('\r').to_string());
    }
    Ok(chunk)
}

/// Last `max` non-empty lines written at or after `from`.
pub fn tail_lines(path: &Path, from: u64, max: usize) -> io::Result<Vec<String>> {
    let len = file_len(path)?;
    if len <= from || max == 0 {
        return Ok(Vec::new());
    }
    let start = from.max(len.saturating_sub(TAIL_WINDOW));

    let mut reader = BufReader::new(File::open(path)?);
    reader.seek(SeekFrom::Start(start))?;

    let mut tail = VecDeque::with_capacity(max);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if tail.len() == max {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }
    Ok(tail.into())
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
