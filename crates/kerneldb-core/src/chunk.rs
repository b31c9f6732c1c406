//! Size-bounded chunking of normalized kernel text.

use crate::{MAX_CHUNK_CHARS, MAX_CHUNK_LINES};

/// A run of normalized lines small enough for one raw string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// The lines of this chunk, without line breaks.
    pub lines: Vec<&'a str>,
}

/// Split normalized text into chunks of at most [`MAX_CHUNK_LINES`] lines
/// and [`MAX_CHUNK_CHARS`] characters.
///
/// A line is never split across chunks, so a single line longer than the
/// character bound becomes a chunk of its own. The character count of the
/// first chunk starts at one, covering the line break the rendered payload
/// opens with. Empty input yields no chunks.
pub fn split_chunks(normalized: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    if normalized.is_empty() {
        return chunks;
    }

    let mut lines = Vec::new();
    let mut chars = 1usize;
    for line in normalized.split('\n') {
        let cost = line.chars().count() + 1;
        if !lines.is_empty() && (lines.len() >= MAX_CHUNK_LINES || chars + cost > MAX_CHUNK_CHARS) {
            chunks.push(Chunk { lines: std::mem::take(&mut lines) });
            chars = 0;
        }
        lines.push(line);
        chars += cost;
    }
    chunks.push(Chunk { lines });

    chunks
}
