//! Error types for kernel conversion.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while converting a kernel source file.
#[derive(Debug, thiserror::Error)]
pub enum KernelDbError {
    /// A kernel or include file could not be read.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    /// An `#include` directive without a quoted target path.
    #[error("malformed include at {}:{}: `{}`", .path.display(), .line, .directive)]
    MalformedInclude {
        path: PathBuf,
        line: usize,
        directive: String,
    },

    /// Gzip encoding of a kernel payload failed.
    #[error("failed to gzip kernel `{}`: {}", .name, .source)]
    Compress {
        name: String,
        source: io::Error,
    },

    /// The kernel file name is not valid UTF-8.
    #[error("kernel file name is not valid UTF-8: {}", .path.display())]
    InvalidFileName { path: PathBuf },
}
