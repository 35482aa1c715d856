//! Schema resolution.
//!
//! The translator never fetches schemas itself. Callers either hand over a
//! parsed [`SchemaDocument`] or a [`SchemaResolver`] that can produce one for
//! a semantic identifier. Resolved documents are returned as
//! `Arc<SchemaDocument>` so they can be cached and shared read-only between
//! concurrent translations.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::ResolutionError;
use crate::identifier::SemanticIdentifier;
use crate::schema::SchemaDocument;

/// Root of the Eclipse Tractus-X semantic models repository (raw content).
pub const DEFAULT_REPOSITORY: &str =
    "https://raw.githubusercontent.com/eclipse-tractusx/sldt-semantic-models/main";

/// Produces the schema document for a semantic identifier.
pub trait SchemaResolver: Send + Sync {
    /// Resolves `identifier`, optionally against a specific repository root.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] when no schema can be produced.
    fn resolve(
        &self,
        identifier: &SemanticIdentifier,
        repository: Option<&str>,
    ) -> Result<Arc<SchemaDocument>, ResolutionError>;
}

/// Location of the generated JSON Schema of an aspect inside a models repository.
///
/// Follows the repository layout `<namespace>/<version>/gen/<Aspect>-schema.json`.
#[must_use]
pub fn schema_location(identifier: &SemanticIdentifier, repository: Option<&str>) -> String {
    let root = repository.unwrap_or(DEFAULT_REPOSITORY).trim_end_matches('/');
    format!(
        "{root}/{}/{}/gen/{}",
        identifier.namespace(),
        identifier.version(),
        schema_file_name(identifier)
    )
}

fn schema_file_name(identifier: &SemanticIdentifier) -> String {
    format!("{}-schema.json", identifier.aspect_name())
}

/// In-memory resolver over pre-loaded documents. Ignores the repository argument.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    schemas: HashMap<SemanticIdentifier, Arc<SchemaDocument>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `document` for `identifier`, replacing any previous entry.
    pub fn insert(&mut self, identifier: SemanticIdentifier, document: SchemaDocument) {
        self.schemas.insert(identifier, Arc::new(document));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, identifier: SemanticIdentifier, document: SchemaDocument) -> Self {
        self.insert(identifier, document);
        self
    }
}

impl SchemaResolver for StaticResolver {
    fn resolve(
        &self,
        identifier: &SemanticIdentifier,
        _repository: Option<&str>,
    ) -> Result<Arc<SchemaDocument>, ResolutionError> {
        self.schemas
            .get(identifier)
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound {
                identifier: identifier.to_string(),
                location: "static resolver".to_owned(),
            })
    }
}

/// Reads schemas from a local checkout of a semantic models repository.
///
/// A `repository` argument passed to [`resolve`](SchemaResolver::resolve)
/// overrides the configured root for that call.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    /// Creates a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Configured repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the schema file for `identifier` under `root`.
    #[must_use]
    pub fn schema_path(root: &Path, identifier: &SemanticIdentifier) -> PathBuf {
        root.join(identifier.namespace())
            .join(identifier.version())
            .join("gen")
            .join(schema_file_name(identifier))
    }
}

impl SchemaResolver for FileSystemResolver {
    fn resolve(
        &self,
        identifier: &SemanticIdentifier,
        repository: Option<&str>,
    ) -> Result<Arc<SchemaDocument>, ResolutionError> {
        let root = repository.map_or_else(|| self.root.clone(), PathBuf::from);
        let path = Self::schema_path(&root, identifier);
        debug!(path = %path.display(), %identifier, "reading aspect schema");

        let text = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ResolutionError::NotFound {
                identifier: identifier.to_string(),
                location: path.display().to_string(),
            },
            _ => ResolutionError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let document = SchemaDocument::from_json(&text, &path.display().to_string())?;
        Ok(Arc::new(document))
    }
}

type CacheKey = (SemanticIdentifier, Option<String>);

/// Memoises another resolver. Successful resolutions are kept for the
/// lifetime of the cache; failures are not cached.
#[derive(Debug)]
pub struct CachingResolver<R> {
    inner: R,
    cache: RwLock<HashMap<CacheKey, Arc<SchemaDocument>>>,
}

impl<R: SchemaResolver> CachingResolver<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached document.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<R: SchemaResolver> SchemaResolver for CachingResolver<R> {
    fn resolve(
        &self,
        identifier: &SemanticIdentifier,
        repository: Option<&str>,
    ) -> Result<Arc<SchemaDocument>, ResolutionError> {
        let key = (identifier.clone(), repository.map(str::to_owned));
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let document = self.inner.resolve(identifier, repository)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| Arc::clone(&document));
        Ok(document)
    }
}
