//! Normalized domain document types.
//!
//! The domain document accepts several shapes for the same field (a bare
//! name, a list, or an object keyed by name). Each of those is read through a
//! private `Raw*` serde type and then normalized into one closed Rust type, so
//! the emitters never inspect JSON shapes themselves.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::DomainError;

/// Container marker for unordered collections.
pub const SET_MARKER: &str = "Set";

/// Container marker for ordered collections.
pub const LIST_MARKER: &str = "List";

// =============================================================================
// Public model
// =============================================================================

/// Declared kind of a class (`properties.classType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassKind {
    /// `CLASS`, the default.
    #[default]
    Class,
    /// `ABSTRACT_CLASS`.
    Abstract,
    /// `ENUM`.
    Enum,
}

/// A description: one paragraph, or one entry per line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Description {
    /// A single paragraph, wrapped at the comment width.
    Line(String),
    /// Explicit lines, each wrapped independently.
    Lines(Vec<String>),
}

/// A literal default value for an attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Bool(b) => write!(f, "{b}"),
            DefaultValue::Number(n) => write!(f, "{n}"),
            DefaultValue::Text(s) => f.write_str(s),
        }
    }
}

/// Arguments attached to an annotation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnnotationArgs {
    /// No arguments given; defaults may apply.
    #[default]
    None,
    /// Raw argument text, rendered inside parentheses verbatim.
    Raw(String),
    /// Named arguments in declaration order.
    Named(Vec<(String, Value)>),
}

/// One annotation (decorator) on a class or attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub args: AnnotationArgs,
}

/// A generic parameter or type argument, with an optional upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<String>,
}

/// An ordered list of generic parameters or type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InjectionSpec {
    pub params: Vec<TypeParam>,
}

/// Parent declaration of a class, normalized at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendsSpec {
    /// `"extends": "Parent"`
    Name(String),
    /// `"extends": [...]`; only the first element is honoured.
    FirstOf(Vec<ExtendsSpec>),
    /// `"extends": {"Parent": {"injection": ...}}`
    Bound { name: String, injection: InjectionSpec },
}

/// The effective parent of a class and the type arguments bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef<'a> {
    pub name: &'a str,
    pub args: &'a [TypeParam],
}

/// Built-in collection markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Set,
    List,
}

/// A regular attribute of a non-enum class.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    pub name: String,
    pub ty: String,
    pub injection: InjectionSpec,
    pub annotations: Vec<Annotation>,
    pub desc: Option<Description>,
    pub default: Option<DefaultValue>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_const: bool,
}

/// One constant of an enum class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: String,
    pub desc: Option<Description>,
}

/// A class, abstract class or enum declared in the domain document.
///
/// Enum classes only ever carry `constants`; every other kind only carries
/// `attributes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub attributes: Vec<AttributeDef>,
    pub constants: Vec<EnumConstant>,
    pub extends: Option<ExtendsSpec>,
    pub implements: Vec<String>,
    pub injection: InjectionSpec,
    pub annotations: Vec<Annotation>,
    pub desc: Option<Description>,
    pub dependencies: Vec<String>,
}

// =============================================================================
// Model helpers
// =============================================================================

impl ClassKind {
    fn parse(raw: Option<&str>, path: &str) -> Result<Self, DomainError> {
        match raw {
            None | Some("CLASS") => Ok(Self::Class),
            Some("ABSTRACT_CLASS") => Ok(Self::Abstract),
            Some("ENUM") => Ok(Self::Enum),
            Some(other) => Err(DomainError::invalid_node(
                path,
                format!("unknown classType '{other}'"),
            )),
        }
    }
}

impl Description {
    /// Description lines before wrapping.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Description::Line(line) => vec![line.as_str()],
            Description::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

impl Annotation {
    /// Annotation without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: AnnotationArgs::None,
        }
    }
}

impl AnnotationArgs {
    /// Read annotation arguments from a JSON value.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, DomainError> {
        match value {
            Value::Null => Ok(Self::None),
            Value::String(s) if s.is_empty() => Ok(Self::None),
            Value::String(s) => Ok(Self::Raw(s.clone())),
            Value::Object(map) if map.is_empty() => Ok(Self::None),
            Value::Object(map) => Ok(Self::Named(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            other => Err(DomainError::invalid_node(
                path,
                format!("annotation arguments must be a string or an object, got {other}"),
            )),
        }
    }
}

impl TypeParam {
    /// Parameter without a bound.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    /// Parameter with an upper bound.
    pub fn bounded(name: impl Into<String>, bound: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound.into()),
        }
    }
}

impl InjectionSpec {
    /// Build from plain names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: names.into_iter().map(TypeParam::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    /// Position of a parameter name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn first(&self) -> Option<&TypeParam> {
        self.params.first()
    }
}

impl ExtendsSpec {
    /// The honoured parent: the first element of a list, recursively.
    pub fn parent(&self) -> Option<ParentRef<'_>> {
        match self {
            ExtendsSpec::Name(name) => Some(ParentRef { name, args: &[] }),
            ExtendsSpec::FirstOf(items) => items.first().and_then(ExtendsSpec::parent),
            ExtendsSpec::Bound { name, injection } => Some(ParentRef {
                name,
                args: &injection.params,
            }),
        }
    }
}

impl Container {
    /// Detect a container marker by type name.
    pub fn from_type(ty: &str) -> Option<Self> {
        match ty {
            SET_MARKER => Some(Self::Set),
            LIST_MARKER => Some(Self::List),
            _ => None,
        }
    }

    /// The marker name as written in the document.
    pub fn marker(self) -> &'static str {
        match self {
            Container::Set => SET_MARKER,
            Container::List => LIST_MARKER,
        }
    }

    /// Concrete implementation type used by lazy initializers.
    pub fn implementation(self) -> &'static str {
        match self {
            Container::Set => "HashSet",
            Container::List => "ArrayList",
        }
    }
}

impl AttributeDef {
    /// Scalar attribute of the given type, with every flag off.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            injection: InjectionSpec::default(),
            annotations: Vec::new(),
            desc: None,
            default: None,
            is_public: false,
            is_static: false,
            is_const: false,
        }
    }

    /// Container kind when the type is `Set` or `List`.
    pub fn container(&self) -> Option<Container> {
        Container::from_type(&self.ty)
    }

    /// Element type of a container attribute.
    pub fn element_type(&self) -> Option<&str> {
        self.container()
            .and_then(|_| self.injection.first())
            .map(|p| p.name.as_str())
    }
}

impl ClassDef {
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::Abstract
    }

    /// The honoured parent, if the class extends anything.
    pub fn parent(&self) -> Option<ParentRef<'_>> {
        self.extends.as_ref().and_then(ExtendsSpec::parent)
    }

    /// True when `name` is one of this class's own generic parameters.
    pub fn declares_param(&self, name: &str) -> bool {
        self.injection.position(name).is_some()
    }

    /// Look up an own attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Parse a class node (`"type": "obj"`).
    pub fn from_value(name: &str, value: &Value, path: &str) -> Result<Self, DomainError> {
        let raw = RawClassDef::deserialize(value)
            .map_err(|e| DomainError::invalid_node(path, e.to_string()))?;
        let props = raw.properties.unwrap_or_default();

        let kind = ClassKind::parse(props.class_type.as_deref(), path)?;

        let (attributes, constants) = if kind == ClassKind::Enum {
            (Vec::new(), parse_constants(&raw.attributes, path)?)
        } else {
            (parse_attributes(name, &raw.attributes, path)?, Vec::new())
        };

        let extends = props
            .extends
            .map(|e| normalize_extends(e, &format!("{path}.properties.extends")))
            .transpose()?;

        let injection = props
            .injection
            .map(|i| normalize_injection(i, &format!("{path}.properties.injection")))
            .transpose()?
            .unwrap_or_default();

        let annotations = props
            .annotate
            .map(|a| normalize_annotations(a, &format!("{path}.properties.annotate")))
            .transpose()?
            .unwrap_or_default();

        let implements = match props.implements {
            None => Vec::new(),
            Some(OneOrMany::One(name)) => vec![name],
            Some(OneOrMany::Many(names)) => names,
        };

        Ok(Self {
            name: name.to_string(),
            kind,
            attributes,
            constants,
            extends,
            implements: implements.into_iter().filter(|s| !s.is_empty()).collect(),
            injection,
            annotations,
            desc: props.desc,
            dependencies: props.dependencies.unwrap_or_default(),
        })
    }
}

// =============================================================================
// Raw document shapes
// =============================================================================

#[derive(Deserialize)]
struct RawClassDef {
    #[serde(default)]
    attributes: Value,
    #[serde(default)]
    properties: Option<RawProperties>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawProperties {
    #[serde(default)]
    class_type: Option<String>,
    #[serde(default)]
    extends: Option<RawExtends>,
    #[serde(default)]
    implements: Option<OneOrMany>,
    #[serde(default)]
    injection: Option<RawInjection>,
    #[serde(default)]
    annotate: Option<RawAnnotate>,
    #[serde(default)]
    desc: Option<Description>,
    #[serde(default)]
    dependencies: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttribute {
    #[serde(rename = "type", default)]
    ty: Option<String>,
    #[serde(default)]
    injection: Option<RawInjection>,
    #[serde(default)]
    annotate: Option<RawAnnotate>,
    #[serde(default)]
    desc: Option<Description>,
    #[serde(default)]
    default: Option<DefaultValue>,
    #[serde(default)]
    is_public: Option<bool>,
    #[serde(default)]
    is_static: Option<bool>,
    #[serde(default)]
    is_const: Option<bool>,
}

#[derive(Deserialize, Default)]
struct RawConstant {
    #[serde(default)]
    desc: Option<Description>,
}

#[derive(Deserialize, Default)]
struct RawBound {
    #[serde(default)]
    extends: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawExtendsConfig {
    #[serde(default)]
    injection: Option<RawInjection>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExtends {
    Name(String),
    List(Vec<RawExtends>),
    Map(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInjection {
    Name(String),
    List(Vec<RawInjectionItem>),
    Map(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInjectionItem {
    Name(String),
    Map(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnnotate {
    Name(String),
    List(Vec<RawAnnotate>),
    Map(Map<String, Value>),
}

// =============================================================================
// Normalization
// =============================================================================

fn normalize_extends(raw: RawExtends, path: &str) -> Result<ExtendsSpec, DomainError> {
    match raw {
        RawExtends::Name(name) => Ok(ExtendsSpec::Name(name)),
        RawExtends::List(items) => items
            .into_iter()
            .map(|item| normalize_extends(item, path))
            .collect::<Result<Vec<_>, _>>()
            .map(ExtendsSpec::FirstOf),
        RawExtends::Map(map) => {
            let (name, config) = map.into_iter().next().ok_or_else(|| {
                DomainError::invalid_node(path, "extends object must name a parent class")
            })?;
            let config = if config.is_null() {
                RawExtendsConfig::default()
            } else {
                RawExtendsConfig::deserialize(&config)
                    .map_err(|e| DomainError::invalid_node(path, e.to_string()))?
            };
            let injection = config
                .injection
                .map(|i| normalize_injection(i, &format!("{path}.{name}.injection")))
                .transpose()?
                .unwrap_or_default();
            Ok(ExtendsSpec::Bound { name, injection })
        }
    }
}

fn normalize_injection(raw: RawInjection, path: &str) -> Result<InjectionSpec, DomainError> {
    let params = match raw {
        RawInjection::Name(name) => vec![TypeParam::new(name)],
        RawInjection::List(items) => {
            let mut params = Vec::new();
            for item in items {
                match item {
                    RawInjectionItem::Name(name) => params.push(TypeParam::new(name)),
                    RawInjectionItem::Map(map) => params.extend(params_from_map(map, path)?),
                }
            }
            params
        }
        RawInjection::Map(map) => params_from_map(map, path)?,
    };

    Ok(InjectionSpec {
        params: params.into_iter().filter(|p| !p.name.is_empty()).collect(),
    })
}

fn params_from_map(map: Map<String, Value>, path: &str) -> Result<Vec<TypeParam>, DomainError> {
    map.into_iter()
        .map(|(name, value)| {
            let bound = match value {
                Value::Null => None,
                value => RawBound::deserialize(&value)
                    .map_err(|e| DomainError::invalid_node(format!("{path}.{name}"), e.to_string()))?
                    .extends
                    .filter(|b| !b.is_empty()),
            };
            Ok(TypeParam { name, bound })
        })
        .collect()
}

fn normalize_annotations(raw: RawAnnotate, path: &str) -> Result<Vec<Annotation>, DomainError> {
    let mut out = Vec::new();
    collect_annotations(raw, path, &mut out)?;
    Ok(out)
}

fn collect_annotations(
    raw: RawAnnotate,
    path: &str,
    out: &mut Vec<Annotation>,
) -> Result<(), DomainError> {
    match raw {
        RawAnnotate::Name(name) if name.is_empty() => {}
        RawAnnotate::Name(name) => out.push(Annotation::new(name)),
        RawAnnotate::List(items) => {
            for item in items {
                collect_annotations(item, path, out)?;
            }
        }
        RawAnnotate::Map(map) => {
            for (name, value) in map {
                let args = AnnotationArgs::from_value(&value, &format!("{path}.{name}"))?;
                out.push(Annotation { name, args });
            }
        }
    }
    Ok(())
}

fn parse_attributes(
    class: &str,
    value: &Value,
    path: &str,
) -> Result<Vec<AttributeDef>, DomainError> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        _ => {
            return Err(DomainError::invalid_node(
                format!("{path}.attributes"),
                "attributes of a non-enum class must be an object",
            ))
        }
    };

    let mut attributes = Vec::with_capacity(map.len());
    for (name, value) in map {
        let attr_path = format!("{path}.attributes.{name}");
        let raw = RawAttribute::deserialize(value)
            .map_err(|e| DomainError::invalid_node(&attr_path, e.to_string()))?;

        let ty = raw
            .ty
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::invalid_node(&attr_path, "attribute has no 'type'"))?;

        let injection = raw
            .injection
            .map(|i| normalize_injection(i, &format!("{attr_path}.injection")))
            .transpose()?
            .unwrap_or_default();

        if Container::from_type(&ty).is_some() && injection.is_empty() {
            return Err(DomainError::MissingElementType {
                class: class.to_string(),
                attribute: name.clone(),
            });
        }

        let annotations = raw
            .annotate
            .map(|a| normalize_annotations(a, &format!("{attr_path}.annotate")))
            .transpose()?
            .unwrap_or_default();

        attributes.push(AttributeDef {
            name: name.clone(),
            ty,
            injection,
            annotations,
            desc: raw.desc,
            default: raw.default,
            is_public: raw.is_public.unwrap_or(false),
            is_static: raw.is_static.unwrap_or(false),
            is_const: raw.is_const.unwrap_or(false),
        });
    }
    Ok(attributes)
}

fn parse_constants(value: &Value, path: &str) -> Result<Vec<EnumConstant>, DomainError> {
    let path = format!("{path}.attributes");
    let mut constants = Vec::new();
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(name) => constants.push(EnumConstant {
                        name: name.clone(),
                        desc: None,
                    }),
                    Value::Object(map) => constants.extend(constants_from_map(map, &path)?),
                    other => {
                        return Err(DomainError::invalid_node(
                            &path,
                            format!("enum constant must be a name or an object, got {other}"),
                        ))
                    }
                }
            }
        }
        Value::Object(map) => constants.extend(constants_from_map(map, &path)?),
        other => {
            return Err(DomainError::invalid_node(
                &path,
                format!("enum constants must be a list or an object, got {other}"),
            ))
        }
    }
    Ok(constants)
}

fn constants_from_map(
    map: &Map<String, Value>,
    path: &str,
) -> Result<Vec<EnumConstant>, DomainError> {
    map.iter()
        .map(|(name, value)| {
            let raw = match value {
                Value::Null => RawConstant::default(),
                value => RawConstant::deserialize(value)
                    .map_err(|e| DomainError::invalid_node(format!("{path}.{name}"), e.to_string()))?,
            };
            Ok(EnumConstant {
                name: name.clone(),
                desc: raw.desc,
            })
        })
        .collect()
}
