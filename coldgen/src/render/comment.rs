//! Block comment rendering shared by every target.
//!
//! Long lines are cut into fixed-width chunks. When a cut falls inside a
//! word, the chunk gets a trailing hyphen.

use crate::domain::Description;

/// Render a description as `/** ... */` lines.
///
/// A single short paragraph collapses to one line (`/** text */`). Lines
/// are not indented; callers prefix them as needed.
pub fn comment_block(desc: &Description, width: usize) -> Vec<String> {
    let width = width.max(1);
    match desc {
        Description::Line(text) => paragraph_block(text, width),
        Description::Lines(lines) => lines_block(lines, width),
    }
}

/// Render an optional description, empty when absent.
pub fn optional_comment_block(desc: Option<&Description>, width: usize) -> Vec<String> {
    desc.map(|d| comment_block(d, width)).unwrap_or_default()
}

fn paragraph_block(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= width {
        return vec![format!("/** {text} */")];
    }

    let mut out = vec!["/**".to_string()];
    for piece in text.lines() {
        out.extend(wrap(piece, width));
    }
    out.push(" */".to_string());
    out
}

fn lines_block(lines: &[String], width: usize) -> Vec<String> {
    let mut body = Vec::new();
    for line in lines {
        if line.chars().count() <= width {
            body.push(format!(" * {line}"));
        } else {
            body.extend(wrap(line, width));
        }
    }

    if body.is_empty() {
        return vec!["/** */".to_string()];
    }

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push("/**".to_string());
    out.extend(body);
    out.push(" */".to_string());
    out
}

/// Cut a line into ` * chunk` rows of at most `width` characters.
fn wrap(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let chunks: Vec<String> = chars.chunks(width).map(|c| c.iter().collect()).collect();

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let splits_word = chunks.get(i + 1).is_some_and(|next| {
                !chunk.ends_with(' ') && next.starts_with(|c: char| c.is_ascii_alphabetic())
            });
            if splits_word {
                format!(" * {}-", chunk.trim())
            } else {
                format!(" * {}", chunk.trim())
            }
        })
        .collect()
}
