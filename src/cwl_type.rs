use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    File,
    Directory,
    Any,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "string" => Some(Self::String),
            "File" => Some(Self::File),
            "Directory" => Some(Self::Directory),
            "Any" | "any" => Some(Self::Any),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::File => "File",
            Self::Directory => "Directory",
            Self::Any => "Any",
        }
    }
}

/// A CWL parameter type.
///
/// Types nest: `File[]?` is a union of `null` and an array of `File`.
/// Names that are not CWL primitives (records, enums, schema references)
/// are kept verbatim in [`CwlType::Named`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CwlType {
    Primitive(Primitive),
    Named(String),
    Array(Box<CwlType>),
    Union(Vec<CwlType>),
}

impl Default for CwlType {
    fn default() -> Self {
        CwlType::Primitive(Primitive::Any)
    }
}

impl CwlType {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn file() -> Self {
        CwlType::Primitive(Primitive::File)
    }

    pub fn primitive(p: Primitive) -> Self {
        CwlType::Primitive(p)
    }

    /// Parses the shorthand string form, including the `?` and `[]` suffixes.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(inner) = raw.strip_suffix('?') {
            return CwlType::Union(vec![
                CwlType::Primitive(Primitive::Null),
                CwlType::parse(inner),
            ]);
        }
        if let Some(inner) = raw.strip_suffix("[]") {
            return CwlType::Array(Box::new(CwlType::parse(inner)));
        }
        match Primitive::from_name(raw) {
            Some(p) => CwlType::Primitive(p),
            None if raw.is_empty() => CwlType::any(),
            None => CwlType::Named(raw.to_string()),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => CwlType::parse(s),
            Value::Array(items) => {
                let mut members: Vec<CwlType> = items.iter().map(CwlType::from_value).collect();
                if members.len() == 1 {
                    members.remove(0)
                } else if members.is_empty() {
                    CwlType::any()
                } else {
                    CwlType::Union(members)
                }
            }
            Value::Object(map) => match map.get("type") {
                Some(Value::String(kind)) if kind == "array" => {
                    let items = map.get("items").map(CwlType::from_value).unwrap_or_default();
                    CwlType::Array(Box::new(items))
                }
                Some(Value::String(kind)) if kind == "enum" || kind == "record" => {
                    let name = map
                        .get("name")
                        .and_then(Value::as_str)
                        .map(|n| n.trim_start_matches('#'))
                        .unwrap_or(kind.as_str());
                    CwlType::Named(name.to_string())
                }
                Some(inner) => CwlType::from_value(inner),
                None => CwlType::any(),
            },
            Value::Null => CwlType::Primitive(Primitive::Null),
            _ => CwlType::any(),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, CwlType::Primitive(Primitive::Any))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CwlType::Primitive(Primitive::Null))
    }

    /// Name of the underlying scalar type with arrays and optionality removed.
    /// A union resolves to its first non-null member.
    pub fn base_name(&self) -> &str {
        match self {
            CwlType::Primitive(p) => p.name(),
            CwlType::Named(name) => name,
            CwlType::Array(inner) => inner.base_name(),
            CwlType::Union(members) => members
                .iter()
                .find(|m| !m.is_null())
                .map(CwlType::base_name)
                .unwrap_or("Any"),
        }
    }

    pub fn is_file(&self) -> bool {
        self.base_name() == "File"
    }

    fn optional_inner(&self) -> Option<&CwlType> {
        match self {
            CwlType::Union(members) if members.len() == 2 => {
                match (members[0].is_null(), members[1].is_null()) {
                    (true, false) => Some(&members[1]),
                    (false, true) => Some(&members[0]),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for CwlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(inner) = self.optional_inner() {
            return write!(f, "{inner}?");
        }
        match self {
            CwlType::Primitive(p) => f.write_str(p.name()),
            CwlType::Named(name) => f.write_str(name),
            CwlType::Array(inner) => match inner.as_ref() {
                CwlType::Union(_) => write!(f, "({inner})[]"),
                _ => write!(f, "{inner}[]"),
            },
            CwlType::Union(members) => {
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for CwlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_shorthand_suffixes() {
        let ty = CwlType::parse("File[]?");
        assert_eq!(ty.to_string(), "File[]?");
        assert_eq!(ty.base_name(), "File");
        assert!(ty.is_file());
    }

    #[test]
    fn parses_array_schema_object() {
        let ty = CwlType::from_value(&json!({"type": "array", "items": "string"}));
        assert_eq!(ty, CwlType::Array(Box::new(CwlType::Primitive(Primitive::String))));
        assert_eq!(ty.to_string(), "string[]");
    }

    #[test]
    fn union_base_skips_null() {
        let ty = CwlType::from_value(&json!(["null", "int", "string"]));
        assert_eq!(ty.base_name(), "int");
        assert_eq!(ty.to_string(), "null|int|string");
        let opt = CwlType::from_value(&json!(["null", "boolean"]));
        assert_eq!(opt.to_string(), "boolean?");
    }

    #[test]
    fn unknown_names_are_kept() {
        let ty = CwlType::from_value(&json!({"type": "enum", "name": "#Mode", "symbols": ["a"]}));
        assert_eq!(ty.to_string(), "Mode");
        assert_eq!(CwlType::parse("any"), CwlType::any());
        assert_eq!(CwlType::parse("MyRecord").base_name(), "MyRecord");
    }
}
