//! Build descriptor rendering.
//!
//! The descriptor (`pom.xml`) is kept as a nested JSON template and turned
//! into markup with these rules:
//!
//! - `"@attrs": {"k": "v"}` adds attributes to the enclosing element;
//! - strings, numbers and booleans become text nodes;
//! - arrays become repeated sibling elements with the same name;
//! - `null` becomes an empty element;
//! - `"${name}"` is replaced with the variable `name` when it is defined.

use std::collections::BTreeMap;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};

use crate::error::EmitError;

/// Render a descriptor template with exactly one root key.
pub fn render_descriptor(
    template: &Value,
    variables: &BTreeMap<String, String>,
    indent: usize,
) -> Result<String, EmitError> {
    let Value::Object(root) = template else {
        return Err(EmitError::descriptor("template must be a JSON object"));
    };
    let mut roots = root.iter();
    let (name, value) = match (roots.next(), roots.next()) {
        (Some(first), None) => first,
        _ => {
            return Err(EmitError::descriptor(format!(
                "template must have exactly one root element, found {}",
                root.len()
            )))
        }
    };
    if value.is_array() {
        return Err(EmitError::descriptor("the root element cannot be an array"));
    }

    let mut renderer = DescriptorWriter {
        writer: Writer::new_with_indent(Vec::new(), b' ', indent),
        variables,
    };
    renderer.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    renderer.element(name, value)?;

    let mut out = String::from_utf8(renderer.writer.into_inner())
        .map_err(|e| EmitError::descriptor(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Replace a whole-string `${name}` placeholder.
pub fn substitute_placeholder<'a>(text: &'a str, variables: &'a BTreeMap<String, String>) -> &'a str {
    text.strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .and_then(|name| variables.get(name))
        .map_or(text, String::as_str)
}

struct DescriptorWriter<'v> {
    writer: Writer<Vec<u8>>,
    variables: &'v BTreeMap<String, String>,
}

impl DescriptorWriter<'_> {
    fn emit(&mut self, event: Event<'_>) -> Result<(), EmitError> {
        self.writer
            .write_event(event)
            .map_err(|e| EmitError::descriptor(e.to_string()))
    }

    fn element(&mut self, name: &str, value: &Value) -> Result<(), EmitError> {
        match value {
            Value::Null => self.emit(Event::Empty(BytesStart::new(name))),
            Value::Array(items) => {
                for item in items {
                    if item.is_array() {
                        return Err(EmitError::descriptor(format!(
                            "nested arrays are not supported under '{name}'"
                        )));
                    }
                    self.element(name, item)?;
                }
                Ok(())
            }
            Value::Object(map) => self.object(name, map),
            scalar => {
                let text = self.text_of(scalar);
                self.emit(Event::Start(BytesStart::new(name)))?;
                self.emit(Event::Text(BytesText::new(&text)))?;
                self.emit(Event::End(BytesEnd::new(name)))
            }
        }
    }

    fn object(&mut self, name: &str, map: &Map<String, Value>) -> Result<(), EmitError> {
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut children = Vec::new();

        for (key, value) in map {
            match (key.strip_prefix('@'), value) {
                (Some(_), Value::Object(attrs)) => {
                    for (k, v) in attrs {
                        attributes.push((k.clone(), self.text_of(v)));
                    }
                }
                (Some(attr), scalar) if !attr.is_empty() && !scalar.is_array() => {
                    attributes.push((attr.to_string(), self.text_of(scalar)))
                }
                (Some(_), _) => {
                    return Err(EmitError::descriptor(format!(
                        "invalid attribute key '{key}' under '{name}'"
                    )))
                }
                (None, _) => children.push((key, value)),
            }
        }

        let start = BytesStart::new(name)
            .with_attributes(attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if children.is_empty() {
            return self.emit(Event::Empty(start));
        }

        self.emit(Event::Start(start))?;
        for (key, value) in children {
            self.element(key, value)?;
        }
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text_of(&self, value: &Value) -> String {
        match value {
            Value::String(s) => substitute_placeholder(s, self.variables).to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
