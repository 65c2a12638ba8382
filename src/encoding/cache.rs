// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! On-disk plan cache.
//!
//! Plans live under `<dir>/json_codec/{encoder,decoder}/`, one file per
//! (type signature, mode), named after a SHA-256 of the signature with the
//! mode as extension. A generated plan is written to a uniquely named
//! temporary file in the same directory and renamed into place, so readers
//! never see a partial plan; two writers racing on one slot only duplicate
//! work.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::{CodecError, Mode, Result};

/// Directory the cache creates under its root.
pub const CACHE_NAMESPACE: &str = "json_codec";

/// Which side a plan belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKind {
    Encoder,
    Decoder,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Encoder => "encoder",
            PlanKind::Decoder => "decoder",
        }
    }
}

/// Directory of generated plans.
#[derive(Debug, Clone)]
pub struct PlanCache {
    root: PathBuf,
}

impl PlanCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding plans of one kind.
    pub fn directory(&self, kind: PlanKind) -> PathBuf {
        self.root.join(CACHE_NAMESPACE).join(kind.as_str())
    }

    /// Slot of the plan for `(signature, mode)`.
    pub fn path(&self, kind: PlanKind, signature: &str, mode: Mode) -> PathBuf {
        let digest = hex::encode(Sha256::digest(signature.as_bytes()));
        self.directory(kind)
            .join(format!("{}.json.{}", &digest[..32], mode.as_str()))
    }

    /// Return the slot of the plan, generating it first when missing or
    /// when `force` is set.
    pub fn get_or_generate<T, F>(
        &self,
        kind: PlanKind,
        signature: &str,
        mode: Mode,
        force: bool,
        generate: F,
    ) -> Result<PathBuf>
    where
        T: Serialize,
        F: FnOnce() -> Result<T>,
    {
        let path = self.path(kind, signature, mode);

        if path.exists() {
            if !force {
                tracing::debug!(
                    kind = kind.as_str(),
                    signature,
                    mode = mode.as_str(),
                    path = %path.display(),
                    "using cached plan"
                );
                return Ok(path);
            }
            tracing::warn!(
                kind = kind.as_str(),
                signature,
                mode = mode.as_str(),
                path = %path.display(),
                "forcing plan regeneration"
            );
        }

        let plan = generate()?;
        let content = serde_json::to_vec_pretty(&plan)?;
        self.write_atomic(&path, &content)?;

        tracing::debug!(
            kind = kind.as_str(),
            signature,
            mode = mode.as_str(),
            path = %path.display(),
            bytes = content.len(),
            "generated plan"
        );
        Ok(path)
    }

    /// Read a plan back.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read(path)
            .map_err(|e| CodecError::io(format!("reading plan {}", path.display()), e.to_string()))?;
        serde_json::from_slice(&content).map_err(|e| {
            CodecError::parse(format!("plan {}", path.display()), e.to_string())
        })
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        let directory = path
            .parent()
            .ok_or_else(|| CodecError::io("plan cache", "plan path has no parent directory"))?;
        fs::create_dir_all(directory).map_err(|e| {
            CodecError::io(format!("creating {}", directory.display()), e.to_string())
        })?;

        let temporary = directory.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&temporary, content).map_err(|e| {
            CodecError::io(format!("writing {}", temporary.display()), e.to_string())
        })?;

        fs::rename(&temporary, path).map_err(|e| {
            let _ = fs::remove_file(&temporary);
            CodecError::io(format!("renaming into {}", path.display()), e.to_string())
        })
    }
}
