//! Embedding OpenCL kernel sources into generated C++ tables.
//!
//! Converts `.cl` files into two C++ initializer fragments: a gzip-compressed
//! byte table and a raw-string-literal table. Includes are spliced in ahead
//! of time, comments and blank lines are stripped, and long sources are
//! chunked so every generated literal stays within compiler limits. Keyed by
//! kernel name, the two tables embed byte-identical payloads.
//!
//! # Example
//!
//! ```no_run
//! use kerneldb_core::{chunk::split_chunks, convert_file};
//! use std::path::Path;
//!
//! let kernel = convert_file(Path::new("kernels/relu.cl")).unwrap();
//! println!("{} compresses to {} bytes", kernel.name, kernel.gzipped.len());
//! println!("{} literal chunk(s)", split_chunks(&kernel.normalized).len());
//! ```

use std::path::Path;

pub mod chunk;
pub mod codegen;
pub mod error;
pub mod normalize;
pub mod resolve;

pub use error::KernelDbError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// File extension kernel sources are discovered by.
pub const KERNEL_EXTENSION: &str = "cl";
/// Upper bound on lines per raw string literal chunk.
pub const MAX_CHUNK_LINES: usize = 200;
/// Upper bound on characters per raw string literal chunk.
pub const MAX_CHUNK_CHARS: usize = 16350;

// ---------------------------------------------------------------------------
// Kernel naming
// ---------------------------------------------------------------------------

/// Derive the kernel name from a file name: everything up to the first
/// occurrence of `.cl`.
///
/// Characters between the marker and the real extension act as a tag for
/// alternative implementations, so `conv1.fp16.cl` keeps its tag
/// (`conv1.fp16`) while `relu.clamped.cl` truncates at the marker inside
/// `.clamped` and becomes `relu`.
pub fn kernel_name(file_name: &str) -> &str {
    match file_name.find(".cl") {
        Some(marker) => &file_name[..marker],
        None => file_name,
    }
}

// ---------------------------------------------------------------------------
// Whole-file conversion
// ---------------------------------------------------------------------------

/// A kernel source converted into both embeddable forms.
#[derive(Debug, Clone)]
pub struct ConvertedKernel {
    /// Kernel name both table entries are keyed by.
    pub name: String,
    /// Include-expanded, comment-stripped source, `\n`-joined without a
    /// trailing line break.
    pub normalized: String,
    /// Gzipped payload text for the byte table.
    pub gzipped: Vec<u8>,
}

/// Convert one kernel file: resolve includes, normalize, and gzip.
///
/// The string table derives its chunks from [`ConvertedKernel::normalized`],
/// so both encodings always embed the same payload.
pub fn convert_file(path: &Path) -> Result<ConvertedKernel, KernelDbError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| KernelDbError::InvalidFileName { path: path.to_path_buf() })?;
    let name = kernel_name(file_name).to_string();

    let flattened = resolve::flatten_file(path)?;
    let normalized = normalize::normalize(&flattened);
    let payload = codegen::payload_text(&normalized);
    let gzipped = codegen::gzip_payload(&name, &payload)?;

    Ok(ConvertedKernel { name, normalized, gzipped })
}
