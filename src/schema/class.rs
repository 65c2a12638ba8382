// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Class and enum declarations.
//!
//! This is the host type model the metadata pipeline reads from: declared
//! property order and types, per-property annotations (encoded name,
//! formatters, max depth) and backed enum cases. Declarations are registered
//! programmatically or loaded from a TOML schema file:
//!
//! ```toml
//! [[class]]
//! name = "Dummy"
//!
//! [[class.property]]
//! name = "id"
//! type = "int"
//! encoded_name = "@id"
//!
//! [[enum]]
//! name = "Suit"
//! backing = "string"
//! cases = { Hearts = "H", Spades = "S" }
//! ```

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{BackingValue, CodecError, EnumCase, Result, TypeRegistry};
use crate::schema::descriptor::{ScalarKind, TypeDescriptor};

/// Max-depth annotation of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDepth {
    /// Nesting level of the owning class past which the property is replaced
    pub limit: usize,
    /// Formatter producing the replacement; the property is dropped without one
    #[serde(default)]
    pub fallback: Option<String>,
}

/// Declared property of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    /// Runtime-level type
    #[serde(rename = "type")]
    pub declared: TypeDescriptor,
    /// Documentation-level type, preferred over `declared` when present
    #[serde(default)]
    pub documented: Option<TypeDescriptor>,
    #[serde(default)]
    pub encoded_name: Option<String>,
    #[serde(default)]
    pub encode_formatter: Option<String>,
    #[serde(default)]
    pub decode_formatter: Option<String>,
    #[serde(default)]
    pub max_depth: Option<MaxDepth>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, declared: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            declared,
            documented: None,
            encoded_name: None,
            encode_formatter: None,
            decode_formatter: None,
            max_depth: None,
        }
    }

    pub fn documented(mut self, ty: TypeDescriptor) -> Self {
        self.documented = Some(ty);
        self
    }

    pub fn encoded_name(mut self, name: impl Into<String>) -> Self {
        self.encoded_name = Some(name.into());
        self
    }

    pub fn encode_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.encode_formatter = Some(formatter.into());
        self
    }

    pub fn decode_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.decode_formatter = Some(formatter.into());
        self
    }

    pub fn max_depth(mut self, limit: usize, fallback: Option<&str>) -> Self {
        self.max_depth = Some(MaxDepth {
            limit,
            fallback: fallback.map(str::to_string),
        });
        self
    }

    /// Effective type: the documented one when present.
    pub fn resolved_type(&self) -> &TypeDescriptor {
        self.documented.as_ref().unwrap_or(&self.declared)
    }
}

/// Declared class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    /// Template variable names, for generic classes
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default, rename = "property")]
    pub properties: Vec<PropertyDefinition>,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.templates.push(name.into());
        self
    }

    pub fn property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Look up a property by local name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Local names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Rewrite bare references to template names into template variables.
    fn bind_templates(mut self) -> Self {
        if self.templates.is_empty() {
            return self;
        }
        for property in &mut self.properties {
            property.declared = property.declared.bind_templates(&self.templates);
            property.documented = property
                .documented
                .as_ref()
                .map(|ty| ty.bind_templates(&self.templates));
        }
        self
    }
}

/// Declared backed enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub backing: ScalarKind,
    /// Case name to backing value, in declaration order
    #[serde(default)]
    pub cases: IndexMap<String, BackingValue>,
}

impl EnumDefinition {
    pub fn new(name: impl Into<String>, backing: ScalarKind) -> Self {
        Self {
            name: name.into(),
            backing,
            cases: IndexMap::new(),
        }
    }

    pub fn case(mut self, name: impl Into<String>, value: BackingValue) -> Self {
        self.cases.insert(name.into(), value);
        self
    }

    /// Case by name.
    pub fn get_case(&self, name: &str) -> Option<EnumCase> {
        self.cases.get(name).map(|value| EnumCase {
            enum_type: self.name.clone(),
            name: name.to_string(),
            value: value.clone(),
        })
    }

    /// Case by backing value.
    pub fn from_value(&self, value: &BackingValue) -> Result<EnumCase> {
        self.cases
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, v)| EnumCase {
                enum_type: self.name.clone(),
                name: name.clone(),
                value: v.clone(),
            })
            .ok_or_else(|| {
                CodecError::unexpected_value(format!(
                    "\"{value}\" is not a valid backing value for enum \"{}\".",
                    self.name
                ))
            })
    }
}

#[derive(Debug, Default, Deserialize)]
struct SchemaFile {
    #[serde(default, rename = "class")]
    classes: Vec<ClassDefinition>,
    #[serde(default, rename = "enum")]
    enums: Vec<EnumDefinition>,
}

/// Registry of class and enum declarations.
#[derive(Default)]
pub struct ClassRegistry {
    classes: TypeRegistry<Arc<ClassDefinition>>,
    enums: TypeRegistry<Arc<EnumDefinition>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML schema document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: SchemaFile =
            toml::from_str(source).map_err(|e| CodecError::parse("schema", e.to_string()))?;

        let registry = Self::new();
        for class in file.classes {
            registry.register_class(class)?;
        }
        for definition in file.enums {
            registry.register_enum(definition)?;
        }
        Ok(registry)
    }

    /// Load a TOML schema file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CodecError::io(format!("reading {}", path.display()), e.to_string()))?;
        Self::from_toml_str(&source)
    }

    pub fn register_class(&self, class: ClassDefinition) -> Result<()> {
        let class = class.bind_templates();
        self.classes.register(class.name.clone(), Arc::new(class))
    }

    pub fn register_enum(&self, definition: EnumDefinition) -> Result<()> {
        self.enums
            .register(definition.name.clone(), Arc::new(definition))
    }

    /// Class declaration; unknown classes are a configuration error.
    pub fn class(&self, name: &str) -> Result<Arc<ClassDefinition>> {
        self.classes
            .get(name)?
            .ok_or_else(|| CodecError::unknown_class(name))
    }

    /// Enum declaration; unknown enums are a configuration error.
    pub fn enum_definition(&self, name: &str) -> Result<Arc<EnumDefinition>> {
        self.enums
            .get(name)?
            .ok_or_else(|| CodecError::configuration(name, "enum is not registered"))
    }

    pub fn class_names(&self) -> Result<Vec<String>> {
        self.classes.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
[[class]]
name = "Dummy"

[[class.property]]
name = "id"
type = "int"
encoded_name = "@id"

[[class.property]]
name = "tags"
type = "list<mixed>"
documented = "list<string>"

[[class]]
name = "Box"
templates = ["T"]

[[class.property]]
name = "content"
type = "T|null"

[[enum]]
name = "Suit"
backing = "string"
cases = { Hearts = "H", Spades = "S" }
"#;

    #[test]
    fn test_load_schema() {
        let registry = ClassRegistry::from_toml_str(SCHEMA).unwrap();
        assert_eq!(registry.class_names().unwrap(), vec!["Box", "Dummy"]);

        let dummy = registry.class("Dummy").unwrap();
        let id = dummy.get_property("id").unwrap();
        assert_eq!(id.encoded_name.as_deref(), Some("@id"));
        assert_eq!(
            dummy.get_property("tags").unwrap().resolved_type(),
            &TypeDescriptor::list(TypeDescriptor::string())
        );
    }

    #[test]
    fn test_templates_are_bound() {
        let registry = ClassRegistry::from_toml_str(SCHEMA).unwrap();
        let boxed = registry.class("Box").unwrap();
        assert_eq!(
            boxed.get_property("content").unwrap().declared,
            TypeDescriptor::nullable(TypeDescriptor::template("T"))
        );
    }

    #[test]
    fn test_enum_cases() {
        let registry = ClassRegistry::from_toml_str(SCHEMA).unwrap();
        let suit = registry.enum_definition("Suit").unwrap();
        let hearts = suit
            .from_value(&BackingValue::String("H".to_string()))
            .unwrap();
        assert_eq!(hearts.name, "Hearts");
        assert!(suit
            .from_value(&BackingValue::String("X".to_string()))
            .is_err());
        assert_eq!(suit.get_case("Spades").unwrap().value, BackingValue::String("S".to_string()));
    }

    #[test]
    fn test_unknown_class() {
        let registry = ClassRegistry::new();
        assert!(matches!(
            registry.class("Missing"),
            Err(CodecError::Configuration { .. })
        ));
    }
}
