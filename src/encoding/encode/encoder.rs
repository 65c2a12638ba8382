// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON encoder facade.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use super::{optimize, Encoded, EncodePlan, EncodePlanBuilder};
use crate::core::{CodecConfig, Mode, Result, Value};
use crate::datamodel::EncodeDataModelBuilder;
use crate::encoding::cache::{PlanCache, PlanKind};
use crate::mapping::{
    default_encode_loader, FormatterRegistry, PropertyMetadataLoader, ServiceLocator, ServiceMap,
};
use crate::schema::{ClassRegistry, TypeDescriptor};
use crate::stream::StreamWriter;

/// Encodes host values to JSON through cached, type-specialized plans.
///
/// Plans are generated on first use for each (type, mode) pair, written to
/// the plan cache and kept in memory afterwards.
pub struct JsonEncoder {
    classes: Arc<ClassRegistry>,
    formatters: Arc<FormatterRegistry>,
    loader: Box<dyn PropertyMetadataLoader>,
    services: Rc<dyn ServiceLocator>,
    cache: PlanCache,
    config: CodecConfig,
    /// Loaded plans by cache path
    plans: RefCell<HashMap<PathBuf, Arc<EncodePlan>>>,
}

impl JsonEncoder {
    pub fn new(
        classes: Arc<ClassRegistry>,
        formatters: Arc<FormatterRegistry>,
        loader: Box<dyn PropertyMetadataLoader>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            classes,
            formatters,
            loader,
            services: Rc::new(ServiceMap::new()),
            cache: PlanCache::new(cache_dir),
            config: CodecConfig::default(),
            plans: RefCell::new(HashMap::new()),
        }
    }

    /// Encoder with the builtin formatters and the default loader chain.
    pub fn create(classes: Arc<ClassRegistry>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let formatters = Arc::new(FormatterRegistry::with_builtins()?);
        let loader = default_encode_loader(classes.clone(), formatters.clone());
        Ok(Self::new(classes, formatters, loader, cache_dir))
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_services(mut self, services: Rc<dyn ServiceLocator>) -> Self {
        self.services = services;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache.root()
    }

    /// Generate the plan for `(ty, mode)` unless it is cached already, and
    /// return its path.
    pub fn generate(&self, ty: &TypeDescriptor, mode: Mode) -> Result<PathBuf> {
        let signature = ty.to_string();
        self.cache.get_or_generate(
            PlanKind::Encoder,
            &signature,
            mode,
            self.config.force_generation,
            || {
                let node = EncodeDataModelBuilder::new(
                    self.loader.as_ref(),
                    &self.classes,
                    &self.formatters,
                    self.services.as_ref(),
                )
                .build(ty, &self.config)?;
                let plan = EncodePlanBuilder::new(mode).build(&node, &signature)?;
                Ok(optimize(plan))
            },
        )
    }

    /// Loaded plan for `(ty, mode)`.
    pub fn plan(&self, ty: &TypeDescriptor, mode: Mode) -> Result<Arc<EncodePlan>> {
        let path = self.generate(ty, mode)?;

        if !self.config.force_generation {
            if let Some(plan) = self.plans.borrow().get(&path) {
                return Ok(plan.clone());
            }
        }

        let plan: Arc<EncodePlan> = Arc::new(self.cache.load(&path)?);
        tracing::debug!(
            signature = %plan.type_signature,
            mode = mode.as_str(),
            ops = plan.op_count(),
            "loaded encode plan"
        );
        self.plans.borrow_mut().insert(path, plan.clone());
        Ok(plan)
    }

    /// Encode into lazily produced string fragments.
    pub fn encode<'a>(&'a self, data: &'a Value, ty: &TypeDescriptor) -> Result<Encoded<'a>> {
        let plan = self.plan(ty, Mode::String)?;
        Ok(Encoded::new(
            plan,
            data,
            self.config.to_value()?,
            self.services.as_ref(),
            &self.formatters,
        ))
    }

    /// Encode into a string.
    pub fn encode_to_string(&self, data: &Value, ty: &TypeDescriptor) -> Result<String> {
        self.encode(data, ty)?.into_string()
    }

    /// Push the encoding into a stream writer.
    pub fn encode_to_stream(
        &self,
        data: &Value,
        ty: &TypeDescriptor,
        sink: &mut dyn StreamWriter,
    ) -> Result<()> {
        let plan = self.plan(ty, Mode::Stream)?;
        Encoded::new(
            plan,
            data,
            self.config.to_value()?,
            self.services.as_ref(),
            &self.formatters,
        )
        .write_to(sink)
    }

    /// Write the encoding to a raw output handle.
    pub fn encode_to_writer(
        &self,
        data: &Value,
        ty: &TypeDescriptor,
        handle: &mut dyn Write,
    ) -> Result<()> {
        let plan = self.plan(ty, Mode::Resource)?;
        Encoded::new(
            plan,
            data,
            self.config.to_value()?,
            self.services.as_ref(),
            &self.formatters,
        )
        .write_raw(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Object;
    use crate::schema::{ClassDefinition, PropertyDefinition};
    use crate::stream::MemoryStream;

    fn encoder(name: &str) -> (JsonEncoder, PathBuf) {
        let classes = ClassRegistry::new();
        classes
            .register_class(
                ClassDefinition::new("Dummy")
                    .property(PropertyDefinition::new("id", TypeDescriptor::int()).encoded_name("@id"))
                    .property(PropertyDefinition::new("name", TypeDescriptor::string())),
            )
            .unwrap();
        let dir = std::env::temp_dir().join(format!("jsoncodec_encoder_{name}_{}", std::process::id()));
        (JsonEncoder::create(Arc::new(classes), &dir).unwrap(), dir)
    }

    fn dummy() -> Value {
        Value::Object(Object::new(
            "Dummy",
            [("id", Value::Int(1)), ("name", Value::from("foo"))],
        ))
    }

    #[test]
    fn test_encode_all_modes() {
        let (encoder, dir) = encoder("modes");
        let ty = TypeDescriptor::object("Dummy");
        let expected = r#"{"@id":1,"name":"foo"}"#;

        assert_eq!(encoder.encode_to_string(&dummy(), &ty).unwrap(), expected);

        let mut stream = MemoryStream::new();
        encoder.encode_to_stream(&dummy(), &ty, &mut stream).unwrap();
        assert_eq!(stream.as_bytes(), expected.as_bytes());

        let mut handle = Vec::new();
        encoder.encode_to_writer(&dummy(), &ty, &mut handle).unwrap();
        assert_eq!(handle, expected.as_bytes());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_plan_is_memoized() {
        let (encoder, dir) = encoder("memo");
        let ty = TypeDescriptor::list(TypeDescriptor::object("Dummy"));
        let first = encoder.plan(&ty, Mode::String).unwrap();
        let second = encoder.plan(&ty, Mode::String).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.type_signature, "list<Dummy>");

        let _ = std::fs::remove_dir_all(dir);
    }
}
