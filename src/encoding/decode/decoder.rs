// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON decoder facade.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use super::executor::{DecodeRuntime, EagerDecoder, StreamDecoder};
use super::{DecodePlan, DecodePlanBuilder};
use crate::core::{CodecConfig, CodecError, Mode, Result, Value};
use crate::datamodel::DecodeDataModelBuilder;
use crate::encoding::cache::{PlanCache, PlanKind};
use crate::mapping::{
    default_decode_loader, FormatterRegistry, PropertyMetadataLoader, ServiceLocator, ServiceMap,
};
use crate::schema::{ClassRegistry, TypeDescriptor};
use crate::stream::{FileSource, JsonSource, MemoryStream};

/// Decodes JSON into host values through cached, type-specialized plans.
///
/// `decode_str` parses eagerly. The streaming entry points return objects
/// whose properties are decoded from the source on first read, so the
/// source must stay readable for as long as those objects are used.
pub struct JsonDecoder {
    classes: Arc<ClassRegistry>,
    formatters: Arc<FormatterRegistry>,
    loader: Box<dyn PropertyMetadataLoader>,
    services: Rc<dyn ServiceLocator>,
    cache: PlanCache,
    config: CodecConfig,
    /// Loaded plans by cache path
    plans: RefCell<HashMap<PathBuf, Arc<DecodePlan>>>,
}

impl JsonDecoder {
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

    /// Decoder with the builtin formatters and the default loader chain.
    pub fn create(classes: Arc<ClassRegistry>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let formatters = Arc::new(FormatterRegistry::with_builtins()?);
        let loader = default_decode_loader(classes.clone(), formatters.clone());
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
            PlanKind::Decoder,
            &signature,
            mode,
            self.config.force_generation,
            || {
                let node = DecodeDataModelBuilder::new(
                    self.loader.as_ref(),
                    &self.formatters,
                    self.services.as_ref(),
                )
                .build(ty, &self.config)?;
                DecodePlanBuilder::new(mode).build(&node, &signature)
            },
        )
    }

    /// Loaded plan for `(ty, mode)`.
    pub fn plan(&self, ty: &TypeDescriptor, mode: Mode) -> Result<Arc<DecodePlan>> {
        let path = self.generate(ty, mode)?;

        if !self.config.force_generation {
            if let Some(plan) = self.plans.borrow().get(&path) {
                return Ok(plan.clone());
            }
        }

        let plan: Arc<DecodePlan> = Arc::new(self.cache.load(&path)?);
        tracing::debug!(
            signature = %plan.type_signature,
            mode = mode.as_str(),
            providers = plan.providers.len(),
            "loaded decode plan"
        );
        self.plans.borrow_mut().insert(path, plan.clone());
        Ok(plan)
    }

    /// Decode a whole JSON document held in memory.
    pub fn decode_str(&self, json: &str, ty: &TypeDescriptor) -> Result<Value> {
        let plan = self.plan(ty, Mode::String)?;
        let document: serde_json::Value =
            serde_json::from_str(json).map_err(|e| invalid_document(json, &e))?;
        let runtime = self.runtime()?;
        EagerDecoder::new(&plan, &runtime).decode(document)
    }

    /// Decode lazily from a random-access source.
    pub fn decode_stream(&self, source: Rc<dyn JsonSource>, ty: &TypeDescriptor) -> Result<Value> {
        self.decode_source(source, ty, Mode::Stream)
    }

    /// Decode lazily from a file, reading it by offset.
    pub fn decode_file(&self, path: impl AsRef<Path>, ty: &TypeDescriptor) -> Result<Value> {
        let source: Rc<dyn JsonSource> = Rc::new(FileSource::open(path)?);
        self.decode_source(source, ty, Mode::Resource)
    }

    /// Decode a document delivered in chunks.
    pub fn decode_chunks<I>(&self, chunks: I, ty: &TypeDescriptor) -> Result<Value>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let buffer: Vec<u8> = chunks.into_iter().flatten().collect();
        self.decode_stream(Rc::new(MemoryStream::from(buffer)), ty)
    }

    fn decode_source(
        &self,
        source: Rc<dyn JsonSource>,
        ty: &TypeDescriptor,
        mode: Mode,
    ) -> Result<Value> {
        let plan = self.plan(ty, mode)?;
        StreamDecoder::new(plan, source, self.runtime()?).decode()
    }

    fn runtime(&self) -> Result<Rc<DecodeRuntime>> {
        Ok(Rc::new(DecodeRuntime {
            config: self.config.to_value()?,
            services: self.services.clone(),
            formatters: self.formatters.clone(),
            classes: self.classes.clone(),
        }))
    }
}

/// Malformed input maps to the same error kind as in stream mode.
fn invalid_document(json: &str, error: &serde_json::Error) -> CodecError {
    let line_start: usize = json
        .split_inclusive('\n')
        .take(error.line().saturating_sub(1))
        .map(str::len)
        .sum();
    let offset = (line_start + error.column().saturating_sub(1)).min(json.len());
    CodecError::invalid_stream(offset as u64, format!("JSON is not valid: {error}"))
}
