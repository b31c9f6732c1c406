//! Comment removal and whitespace normalization for flattened kernel text.
//!
//! Comment stripping is a small hand-rolled scanner rather than a regex: it
//! tracks string and character literals, so a `//` or `/*` inside a literal
//! is never mistaken for a comment start. A block comment collapses to
//! nothing when it touches a line edge, to a single line break when it spans
//! lines, and to a single space otherwise, which keeps token separation and
//! line counts meaningful for the chunking stage.

use std::iter::Peekable;
use std::str::Chars;

/// Normalize flattened kernel text.
///
/// Strips comments, trims trailing whitespace per line, drops lines left
/// empty, and collapses runs of spaces. The result carries no trailing line
/// break; lines are joined with `\n`.
pub fn normalize(source: &str) -> String {
    let stripped = strip_comments(source);
    let lines: Vec<&str> =
        stripped.split('\n').map(str::trim_end).filter(|line| !line.is_empty()).collect();
    collapse_spaces(&lines.join("\n"))
}

/// Remove `//` and `/* ... */` comments from `source`.
///
/// The horizontal whitespace hugging a comment is consumed with it. An
/// unterminated block comment swallows the rest of the input.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    // True until the current input line sees its first non-whitespace code.
    let mut line_blank = true;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                trim_line_end(&mut out);
                while chars.next_if(|&next| next != '\n').is_some() {}
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let at_line_start = line_blank;
                trim_line_end(&mut out);
                let Some(multiline) = consume_block_comment(&mut chars) else {
                    break;
                };
                while chars.next_if(|&next| is_hspace(next)).is_some() {}
                let at_line_end = matches!(chars.peek(), None | Some(&'\n'));
                if at_line_start || at_line_end {
                    // erased together with its whitespace
                } else if multiline {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
                line_blank = false;
            }
            '"' | '\'' => {
                line_blank = false;
                out.push(c);
                if copy_literal(&mut chars, &mut out, c) {
                    line_blank = true;
                }
            }
            '\n' => {
                line_blank = true;
                out.push(c);
            }
            _ => {
                if !is_hspace(c) {
                    line_blank = false;
                }
                out.push(c);
            }
        }
    }

    out
}

/// Collapse every run of two or more spaces into one. Tabs are left alone.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out
}

/// Horizontal whitespace: any whitespace except the line break itself.
fn is_hspace(c: char) -> bool {
    c.is_whitespace() && c != '\n'
}

/// Pop horizontal whitespace from the end of the current output line.
fn trim_line_end(out: &mut String) {
    while out.ends_with(is_hspace) {
        out.pop();
    }
}

/// Consume a block comment body up to and including `*/`.
///
/// Returns whether the body spanned multiple lines, or `None` when the
/// comment never terminates.
fn consume_block_comment(chars: &mut Peekable<Chars<'_>>) -> Option<bool> {
    let mut multiline = false;
    while let Some(c) = chars.next() {
        if c == '\n' {
            multiline = true;
        } else if c == '*' && chars.next_if(|&next| next == '/').is_some() {
            return Some(multiline);
        }
    }
    None
}

/// Copy a string or character literal through to `out`, honoring backslash
/// escapes. Returns true when the literal was cut short by a line break.
fn copy_literal(chars: &mut Peekable<Chars<'_>>, out: &mut String, delim: char) -> bool {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else if c == delim {
            return false;
        } else if c == '\n' {
            return true;
        }
    }
    false
}
