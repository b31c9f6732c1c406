//! Recursive `#include` resolution for kernel sources.
//!
//! Include directives are spliced in ahead of normalization, so the embedded
//! tables never depend on header files being present at runtime. Each file is
//! inlined at its first reference only; later directives for the same file
//! are dropped. The set of already-inlined files is scoped to one top-level
//! kernel, so two kernels sharing a header each get their own copy.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::KernelDbError;

/// Read `path` and splice every quoted `#include` target into the text.
///
/// Only directives starting in the first column are resolved; an indented
/// `#include` passes through as plain text. Targets are resolved relative to
/// the directory of the file containing the directive. Every emitted line is
/// stripped of trailing whitespace and line-break terminated, and each
/// inlined file is followed by one separating line break.
pub fn flatten_file(path: &Path) -> Result<String, KernelDbError> {
    let mut inlined = HashSet::new();
    let mut out = String::new();
    append_resolved(path, &mut inlined, &mut out)?;
    Ok(out)
}

fn append_resolved(
    path: &Path,
    inlined: &mut HashSet<PathBuf>,
    out: &mut String,
) -> Result<(), KernelDbError> {
    let content = fs::read_to_string(path)
        .map_err(|source| KernelDbError::Read { path: path.to_path_buf(), source })?;
    let dir = path.parent().unwrap_or(Path::new(""));

    for (index, line) in content.lines().enumerate() {
        if line.starts_with("#include") {
            let target = quoted_target(line).ok_or_else(|| KernelDbError::MalformedInclude {
                path: path.to_path_buf(),
                line: index + 1,
                directive: line.trim().to_string(),
            })?;
            let resolved = dir.join(target);
            let canonical = fs::canonicalize(&resolved)
                .map_err(|source| KernelDbError::Read { path: resolved.clone(), source })?;
            if inlined.insert(canonical) {
                tracing::debug!("inlining {}", resolved.display());
                append_resolved(&resolved, inlined, out)?;
                out.push('\n');
            }
        } else {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    Ok(())
}

/// The text between the first pair of double quotes, trimmed.
fn quoted_target(line: &str) -> Option<&str> {
    let open = line.find('"')?;
    let rest = &line[open + 1..];
    let close = rest.find('"')?;
    Some(rest[..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn flattens_file_without_includes() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "plain.cl", "int a;  \nint b;\n");
        assert_eq!(flatten_file(&path).unwrap(), "int a;\nint b;\n");
    }

    #[test]
    fn splices_include_at_the_directive() {
        let dir = TempDir::new().unwrap();
        write(&dir, "helpers.h", "int helper;\n");
        let path = write(&dir, "conv.cl", "#include \"helpers.h\"\nint body;\n");
        assert_eq!(flatten_file(&path).unwrap(), "int helper;\n\nint body;\n");
    }

    #[test]
    fn repeated_include_is_dropped() {
        let dir = TempDir::new().unwrap();
        write(&dir, "helpers.h", "int helper;\n");
        let path = write(
            &dir,
            "conv.cl",
            "#include \"helpers.h\"\nint body;\n#include \"helpers.h\"\nint tail;\n",
        );
        assert_eq!(flatten_file(&path).unwrap(), "int helper;\n\nint body;\nint tail;\n");
    }

    #[test]
    fn diamond_include_appears_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.h", "int base;\n");
        write(&dir, "left.h", "#include \"base.h\"\nint left;\n");
        write(&dir, "right.h", "#include \"base.h\"\nint right;\n");
        let path = write(&dir, "conv.cl", "#include \"left.h\"\n#include \"right.h\"\n");
        assert_eq!(flatten_file(&path).unwrap(), "int base;\n\nint left;\n\nint right;\n\n");
    }

    #[test]
    fn mutual_inclusion_terminates() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.h", "#include \"a.cl\"\nint b;\n");
        let path = write(&dir, "a.cl", "#include \"b.h\"\nint a;\n");
        // b.h pulls the kernel body in once; the kernel's own directive for
        // b.h is then already satisfied.
        assert_eq!(flatten_file(&path).unwrap(), "int a;\n\nint b;\n\nint a;\n");
    }

    #[test]
    fn target_resolves_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("inc")).unwrap();
        write(&dir, "inc/inner.h", "int inner;\n");
        write(&dir, "inc/outer.h", "#include \"inner.h\"\nint outer;\n");
        let path = write(&dir, "conv.cl", "#include \"inc/outer.h\"\nint body;\n");
        assert_eq!(flatten_file(&path).unwrap(), "int inner;\n\nint outer;\n\nint body;\n");
    }

    #[test]
    fn quoted_target_is_trimmed() {
        let dir = TempDir::new().unwrap();
        write(&dir, "helpers.h", "int helper;\n");
        let path = write(&dir, "conv.cl", "#include \" helpers.h \"\n");
        assert_eq!(flatten_file(&path).unwrap(), "int helper;\n\n");
    }

    #[test]
    fn missing_include_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "conv.cl", "#include \"ghost.h\"\n");
        let err = flatten_file(&path).unwrap_err();
        assert!(matches!(err, KernelDbError::Read { .. }));
    }

    #[test]
    fn angle_bracket_include_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "conv.cl", "int a;\n#include <cstdio>\n");
        let err = flatten_file(&path).unwrap_err();
        match err {
            KernelDbError::MalformedInclude { line, directive, .. } => {
                assert_eq!(line, 2);
                assert_eq!(directive, "#include <cstdio>");
            }
            other => panic!("expected MalformedInclude, got {other}"),
        }
    }

    #[test]
    fn indented_directive_is_plain_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "conv.cl", "  #include \"ghost.h\"\nint x;\n");
        assert_eq!(flatten_file(&path).unwrap(), "  #include \"ghost.h\"\nint x;\n");
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "conv.cl", "int a;\r\nint b;  \t\r\n");
        assert_eq!(flatten_file(&path).unwrap(), "int a;\nint b;\n");
    }
}
