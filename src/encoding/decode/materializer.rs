// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Object materializers.
//!
//! Both materializers build class instances from decoded property values
//! and check each value against the property's declared type. The eager
//! one checks on construction; the lazy one wraps every thunk so the check
//! runs when the property is first read.

use std::sync::Arc;

use crate::core::{CodecError, Object, Result, Thunk, Value};
use crate::schema::{ClassDefinition, ClassRegistry, TypeDescriptor};

fn declared_type(definition: &ClassDefinition, property: &str) -> Result<TypeDescriptor> {
    definition
        .get_property(property)
        .map(|p| p.resolved_type().clone())
        .ok_or_else(|| {
            CodecError::configuration(
                definition.name.as_str(),
                format!("class has no property \"{property}\""),
            )
        })
}

/// Position of a property in its class declaration.
fn declaration_index(definition: &ClassDefinition, property: &str) -> usize {
    definition
        .properties
        .iter()
        .position(|p| p.name == property)
        .unwrap_or(usize::MAX)
}

fn check(class: &str, property: &str, expected: &TypeDescriptor, value: Value) -> Result<Value> {
    if expected.accepts(&value) {
        Ok(value)
    } else {
        Err(CodecError::value_mismatch(
            class,
            property,
            expected.to_string(),
            value.kind_name(),
        ))
    }
}

/// Builds fully populated instances.
#[derive(Clone)]
pub struct EagerMaterializer {
    classes: Arc<ClassRegistry>,
}

impl EagerMaterializer {
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self { classes }
    }

    pub fn instantiate(&self, class: &str, values: Vec<(String, Value)>) -> Result<Object> {
        let definition = self.classes.class(class)?;
        let mut values = values;
        values.sort_by_key(|(name, _)| declaration_index(&definition, name));
        let properties = values
            .into_iter()
            .map(|(name, value)| {
                let expected = declared_type(&definition, &name)?;
                let value = check(class, &name, &expected, value)?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Object::new(class, properties))
    }
}

/// Builds instances whose properties are computed on first read.
#[derive(Clone)]
pub struct LazyMaterializer {
    classes: Arc<ClassRegistry>,
}

impl LazyMaterializer {
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self { classes }
    }

    pub fn instantiate(&self, class: &str, thunks: Vec<(String, Thunk)>) -> Result<Object> {
        let definition = self.classes.class(class)?;
        // Slots follow the declaration, not the document key order.
        let mut thunks = thunks;
        thunks.sort_by_key(|(name, _)| declaration_index(&definition, name));
        let thunks = thunks
            .into_iter()
            .map(|(name, thunk)| {
                let expected = declared_type(&definition, &name)?;
                let owner = class.to_string();
                let property = name.clone();
                let checked: Thunk =
                    Box::new(move || check(&owner, &property, &expected, thunk()?));
                Ok((name, checked))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Object::deferred(class, thunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyDefinition;
    use std::cell::Cell;
    use std::rc::Rc;

    fn classes() -> Arc<ClassRegistry> {
        let classes = ClassRegistry::new();
        classes
            .register_class(
                ClassDefinition::new("Dummy")
                    .property(PropertyDefinition::new("id", TypeDescriptor::int()))
                    .property(PropertyDefinition::new(
                        "name",
                        TypeDescriptor::nullable(TypeDescriptor::string()),
                    )),
            )
            .unwrap();
        Arc::new(classes)
    }

    #[test]
    fn test_eager_checks_types() {
        let materializer = EagerMaterializer::new(classes());
        let object = materializer
            .instantiate("Dummy", vec![("id".into(), Value::Int(1)), ("name".into(), Value::Null)])
            .unwrap();
        assert_eq!(object.get("id").unwrap(), Some(&Value::Int(1)));

        let err = materializer
            .instantiate("Dummy", vec![("id".into(), Value::from("1"))])
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::ValueMismatch { ref class, ref property, .. } if class == "Dummy" && property == "id"
        ));
    }

    #[test]
    fn test_lazy_thunk_invoked_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let thunk: Thunk = Box::new(move || {
            counter.set(counter.get() + 1);
            Ok(Value::Int(7))
        });

        let object = LazyMaterializer::new(classes())
            .instantiate("Dummy", vec![("id".into(), thunk)])
            .unwrap();
        assert_eq!(calls.get(), 0);
        assert!(!object.is_initialized("id"));

        assert_eq!(object.get("id").unwrap(), Some(&Value::Int(7)));
        assert_eq!(object.get("id").unwrap(), Some(&Value::Int(7)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_lazy_checks_on_read() {
        let thunk: Thunk = Box::new(|| Ok(Value::Bool(true)));
        let object = LazyMaterializer::new(classes())
            .instantiate("Dummy", vec![("name".into(), thunk)])
            .unwrap();
        assert!(matches!(
            object.get("name"),
            Err(CodecError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_lazy_equals_eager_once_forced() {
        let thunk: Thunk = Box::new(|| Ok(Value::Int(3)));
        let lazy = LazyMaterializer::new(classes())
            .instantiate("Dummy", vec![("id".into(), thunk)])
            .unwrap();
        let eager = EagerMaterializer::new(classes())
            .instantiate("Dummy", vec![("id".into(), Value::Int(3))])
            .unwrap();
        lazy.force().unwrap();
        assert_eq!(lazy, eager);
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        let name: Thunk = Box::new(|| Ok(Value::from("x")));
        let id: Thunk = Box::new(|| Ok(Value::Int(1)));
        let lazy = LazyMaterializer::new(classes())
            .instantiate("Dummy", vec![("name".into(), name), ("id".into(), id)])
            .unwrap();
        assert_eq!(lazy.property_names().collect::<Vec<_>>(), ["id", "name"]);

        let eager = EagerMaterializer::new(classes())
            .instantiate(
                "Dummy",
                vec![("name".into(), Value::from("x")), ("id".into(), Value::Int(1))],
            )
            .unwrap();
        assert_eq!(eager.property_names().collect::<Vec<_>>(), ["id", "name"]);
    }

    #[test]
    fn test_unknown_class() {
        assert!(EagerMaterializer::new(classes())
            .instantiate("Missing", Vec::new())
            .is_err());
    }
}
