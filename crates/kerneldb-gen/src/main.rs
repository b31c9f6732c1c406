//! OpenCL kernel source to embedded C++ table generator.
//!
//! Scans a directory for `.cl` kernel files and renders two generated C++
//! initializer fragments: a byte table of gzip-compressed kernel payloads and
//! a raw-string-literal table of the same payloads in readable form. The
//! generated files are meant to be compiled into the runtime's kernel
//! database so kernel source needs no filesystem access.
//!
//! # Usage
//!
//! ```bash
//! # Embed every *.cl file under src/kernels
//! kerneldb-gen --kernels src/kernels --out-path gen --out-file-name kernel_db
//!
//! # Fail the build when any kernel cannot be converted
//! kerneldb-gen --kernels src/kernels --out-path gen --out-file-name kernel_db --strict
//! ```
//!
//! The byte table lands in `gen/kernel_db`, the string table in
//! `gen/kernel_db1`. A kernel file that cannot be converted is skipped in
//! both tables and reported at the end of the run.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use kerneldb_core::chunk::split_chunks;
use kerneldb_core::codegen::{BinaryTableWriter, StringTableWriter};
use kerneldb_core::{KERNEL_EXTENSION, convert_file};

/// OpenCL kernel to C++ table converter
#[derive(Parser, Debug)]
#[command(name = "kerneldb-gen")]
#[command(about = "Convert OpenCL kernel sources into embedded C++ source tables")]
#[command(version)]
struct Args {
    /// Directory containing `.cl` kernel sources
    ///
    /// Scanned non-recursively; files are processed in name order
    #[arg(long)]
    kernels: PathBuf,

    /// Directory the generated tables are written to (created if missing)
    #[arg(long)]
    out_path: PathBuf,

    /// Base file name for the generated tables
    ///
    /// The byte table is written to `<NAME>` and the string table to `<NAME>1`
    #[arg(long)]
    out_file_name: String,

    /// Fail the run if any kernel file had to be skipped
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let kernels = find_kernel_files(&args.kernels)?;
    if kernels.is_empty() {
        tracing::warn!("no .cl files found in {}", args.kernels.display());
    }
    tracing::info!("Kernels: {} ({} files)", args.kernels.display(), kernels.len());
    tracing::info!("Output: {}", args.out_path.display());
    if args.strict {
        tracing::info!("Strict mode: enabled");
    }

    let result = generate_tables(&kernels);

    fs::create_dir_all(&args.out_path)
        .with_context(|| format!("failed to create output directory {}", args.out_path.display()))?;
    let binary_path = args.out_path.join(&args.out_file_name);
    let string_path = args.out_path.join(format!("{}1", args.out_file_name));
    fs::write(&binary_path, &result.binary_table)
        .with_context(|| format!("failed to write byte table {}", binary_path.display()))?;
    fs::write(&string_path, &result.string_table)
        .with_context(|| format!("failed to write string table {}", string_path.display()))?;

    tracing::info!("Generation complete!");
    tracing::info!("  Converted: {} kernel(s)", result.converted);
    if !result.skipped.is_empty() {
        tracing::warn!("  Skipped: {} file(s)", result.skipped.len());
        for (path, reason) in &result.skipped {
            tracing::warn!("    {}: {}", path.display(), reason);
        }
    }
    tracing::info!("  Byte table: {}", binary_path.display());
    tracing::info!("  String table: {}", string_path.display());

    if args.strict && !result.skipped.is_empty() {
        bail!("strict mode: {} kernel file(s) skipped", result.skipped.len());
    }

    Ok(())
}

/// Every `*.cl` file directly inside `dir`, sorted by name.
fn find_kernel_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read kernel directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == KERNEL_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Result of one generation run.
struct GenerationResult {
    binary_table: String,
    string_table: String,
    converted: usize,
    skipped: Vec<(PathBuf, String)>,
}

/// Convert every kernel file, feeding one entry per file to each table.
///
/// A file that fails to convert is skipped in both tables; the run carries
/// on with the remaining files. Kernel names are allowed to collide (the
/// consuming database keeps every entry), but a collision is worth a warning
/// since it usually means a stray file.
fn generate_tables(kernels: &[PathBuf]) -> GenerationResult {
    let mut binary = BinaryTableWriter::new();
    let mut strings = StringTableWriter::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut converted = 0;
    let mut skipped = Vec::new();

    for path in kernels {
        tracing::info!("processing {}", path.display());
        match convert_file(path) {
            Ok(kernel) => {
                if !seen_names.insert(kernel.name.clone()) {
                    tracing::warn!(
                        "duplicate kernel name `{}` from {}",
                        kernel.name,
                        path.display()
                    );
                }
                binary.add_entry(&kernel.name, &kernel.gzipped);
                strings.add_entry(&kernel.name, &split_chunks(&kernel.normalized));
                converted += 1;
            }
            Err(err) => {
                tracing::warn!("skipping {}: {}", path.display(), err);
                skipped.push((path.clone(), err.to_string()));
            }
        }
    }

    GenerationResult {
        binary_table: binary.finish(),
        string_table: strings.finish(),
        converted,
        skipped,
    }
}
