//! Rendering helpers shared by the emitters.
//!
//! - [`comment`]: `/** ... */` blocks with width-based wrapping
//! - [`xml`]: the build descriptor renderer
//! - [`SourceBuilder`]: line-oriented source assembly with indentation
//! - naming and JSON helpers

pub mod comment;
pub mod xml;

use convert_case::{Case, Casing};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::EmitError;

pub use comment::{comment_block, optional_comment_block};
pub use xml::{render_descriptor, substitute_placeholder};

/// `OrderLine` -> `order-line`, used for TypeScript file names.
pub fn kebab_name(name: &str) -> String {
    name.to_case(Case::Kebab)
}

/// Uppercase the first character.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `<A, B>` or the empty string.
pub fn generic_list<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    if args.is_empty() {
        String::new()
    } else {
        format!("<{}>", args.join(", "))
    }
}

/// Pretty-print JSON with the configured indentation.
pub fn pretty_json(file: &str, value: &Value, indent: usize) -> Result<String, EmitError> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer).map_err(|source| EmitError::Json {
        file: file.to_string(),
        source,
    })?;

    let mut out = String::from_utf8_lossy(&buf).into_owned();
    out.push('\n');
    Ok(out)
}

/// Line-oriented source assembly.
///
/// Lines are pushed at an indentation level; empty lines never carry
/// trailing whitespace. [`finish`](Self::finish) joins with `\n` and ends
/// with a newline.
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    indent: String,
    lines: Vec<String>,
}

impl SourceBuilder {
    pub fn new(indent: usize) -> Self {
        Self {
            indent: " ".repeat(indent),
            lines: Vec::new(),
        }
    }

    /// Push a line at the top level.
    pub fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.at(0, line)
    }

    /// Push a line at the given indentation level.
    pub fn at(&mut self, level: usize, line: impl AsRef<str>) -> &mut Self {
        let line = line.as_ref();
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{line}", self.indent.repeat(level)));
        }
        self
    }

    /// Push several lines at one level.
    pub fn lines<I, S>(&mut self, level: usize, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.at(level, line);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
