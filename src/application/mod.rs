// Application use cases: load, check, convert, assemble and store revisions.

pub mod assembler;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::domain::revision::RevisionCallGraph;
use crate::infrastructure::loader;
use crate::ports::{OutputExporter, RevisionStore, RevisionSummary};
use assembler::RevisionAssembler;

/// Decode one revision file, logging any decode warnings.
pub fn load_revision(path: &Path) -> Result<RevisionCallGraph> {
    let decoded = loader::read_revision(path)?;
    for warning in &decoded.warnings {
        tracing::warn!(path = %path.display(), "{}", warning);
    }
    Ok(decoded.into_value())
}

/// Decode several files on the rayon pool. Results keep the input order.
pub fn load_many(paths: &[PathBuf]) -> Vec<(PathBuf, Result<RevisionCallGraph>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), load_revision(path)))
        .collect()
}

/// Decode a file and check its edges against the declared scopes.
pub fn validate_file(path: &Path) -> Result<RevisionSummary> {
    let rcg = load_revision(path)?;
    rcg.validate()
        .with_context(|| format!("Inconsistent call graph: {}", path.display()))?;
    Ok(RevisionSummary::from(&rcg))
}

pub struct ConvertUsecase<'a> {
    pub exporter: &'a dyn OutputExporter,
}

impl<'a> ConvertUsecase<'a> {
    pub fn run(&self, input: &Path, output: &str) -> Result<RevisionSummary> {
        let rcg = load_revision(input)?;
        self.exporter
            .export(&rcg, output)
            .with_context(|| format!("Failed to export to {}", output))?;
        tracing::info!(input = %input.display(), output, "converted revision");
        Ok(RevisionSummary::from(&rcg))
    }
}

pub struct AssembleUsecase<'a> {
    pub exporter: &'a dyn OutputExporter,
}

impl<'a> AssembleUsecase<'a> {
    pub fn run(&self, facts: &Path, output: &str) -> Result<RevisionSummary> {
        let facts_doc = loader::read_facts(facts)?;
        let rcg = RevisionAssembler::assemble(facts_doc)
            .with_context(|| format!("Cannot assemble {}", facts.display()))?;
        self.exporter.export(&rcg, output)?;
        tracing::info!(facts = %facts.display(), output, uri = %rcg.uri(), "assembled revision");
        Ok(RevisionSummary::from(&rcg))
    }
}

pub struct StoreUsecase<'a> {
    pub store: &'a dyn RevisionStore,
}

impl<'a> StoreUsecase<'a> {
    /// Decode and store every file in parallel. Stops at the first failure.
    pub fn put_files(&self, paths: &[PathBuf]) -> Result<Vec<String>> {
        let keys = paths
            .par_iter()
            .map(|path| {
                let rcg = load_revision(path)?;
                self.store
                    .put(&rcg)
                    .with_context(|| format!("Cannot store {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(count = keys.len(), "stored revisions");
        Ok(keys)
    }

    /// Export a stored revision. Returns false if the URI is unknown.
    pub fn export(&self, uri: &str, exporter: &dyn OutputExporter, output: &str) -> Result<bool> {
        match self.store.get(uri)? {
            Some(rcg) => {
                exporter.export(&rcg, output)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn list(&self) -> Result<Vec<RevisionSummary>> {
        self.store.list()
    }

    pub fn remove(&self, uri: &str) -> Result<bool> {
        self.store.remove(uri)
    }
}
