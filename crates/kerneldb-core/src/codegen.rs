//! Rendering of converted kernels into the two generated C++ table files.
//!
//! Both encodings embed the same payload text: a byte table of gzipped
//! payloads rendered as `std::vector<uint8_t>` initializers, and a string
//! table of raw string literals split into compiler-sized chunks. Gunzipping
//! a byte entry yields exactly the concatenated literal text of the matching
//! string entry.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::chunk::Chunk;
use crate::error::KernelDbError;

/// Comment line opening every generated table file.
pub const GENERATED_BANNER: &str =
    "// This file is autogenerated by kerneldb-gen, all changes to this file will be undone\n\n";

/// Accumulated token width at which the hex byte listing wraps.
pub const HEX_WRAP_WIDTH: usize = 160;

/// The exact text both encodings embed: a leading line break followed by
/// every normalized line, each line-break terminated.
pub fn payload_text(normalized: &str) -> String {
    let mut payload = String::with_capacity(normalized.len() + 2);
    payload.push('\n');
    if !normalized.is_empty() {
        for line in normalized.split('\n') {
            payload.push_str(line);
            payload.push('\n');
        }
    }
    payload
}

/// Gzip the payload text of kernel `name` at the highest compression level.
pub fn gzip_payload(name: &str, payload: &str) -> Result<Vec<u8>, KernelDbError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(payload.as_bytes())
        .map_err(|source| KernelDbError::Compress { name: name.to_string(), source })?;
    encoder.finish().map_err(|source| KernelDbError::Compress { name: name.to_string(), source })
}

// ── Byte table ───────────────────────────────────────────────────────────────

/// Builds the byte table file: one `std::vector<uint8_t>` initializer per
/// kernel, all wrapped in a single outer brace pair.
#[derive(Debug)]
pub struct BinaryTableWriter {
    buf: String,
}

impl BinaryTableWriter {
    pub fn new() -> Self {
        let mut buf = String::from(GENERATED_BANNER);
        buf.push_str("{\n");
        Self { buf }
    }

    /// Append one kernel entry holding its gzipped payload bytes.
    pub fn add_entry(&mut self, name: &str, gzipped: &[u8]) {
        self.buf.push_str(&format!("{{\"{name}\",std::vector<uint8_t>{{\n"));
        let mut width = 0;
        for byte in gzipped {
            let token = format!("0x{byte:02x},");
            width += token.len();
            self.buf.push_str(&token);
            if width >= HEX_WRAP_WIDTH {
                self.buf.push('\n');
                width = 0;
            }
        }
        self.buf.push_str("}},\n");
    }

    /// Close the outer initializer and return the file contents.
    pub fn finish(mut self) -> String {
        self.buf.push_str("\n}");
        self.buf
    }
}

impl Default for BinaryTableWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ── String table ─────────────────────────────────────────────────────────────

/// Builds the string table file: one chunked raw string literal per kernel.
#[derive(Debug)]
pub struct StringTableWriter {
    buf: String,
}

impl StringTableWriter {
    pub fn new() -> Self {
        Self { buf: String::from(GENERATED_BANNER) }
    }

    /// Append one kernel entry from its chunked normalized lines.
    ///
    /// The first literal opens with the payload's leading line break; every
    /// following chunk continues through a `+` concatenation, so no single
    /// literal outgrows the limit the chunk bounds encode.
    pub fn add_entry(&mut self, name: &str, chunks: &[Chunk<'_>]) {
        self.buf.push_str(&format!("{{\"{name}\",\n(std::string) R\"__krnl(\n"));
        for (index, chunk) in chunks.iter().enumerate() {
            if index > 0 {
                self.buf.push_str(")__krnl\"\n + R\"__krnl(");
            }
            for line in &chunk.lines {
                self.buf.push_str(line);
                self.buf.push('\n');
            }
        }
        self.buf.push_str(")__krnl\"},\n\n");
    }

    /// Return the file contents.
    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for StringTableWriter {
    fn default() -> Self {
        Self::new()
    }
}
