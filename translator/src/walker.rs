//! Schema graph walker: schema arena → ordered term descriptors.
//!
//! The walker visits the aspect's top-level properties in declaration order
//! and derives one [`TermDescriptor`] per property. Object-typed properties
//! are expanded recursively into `nested` descriptors until one of two guards
//! fires:
//!
//! - **cycle**: the object is already being expanded on the current
//!   recursion path (visited targets are pushed on entry and popped on exit,
//!   so the same type in sibling branches is not a cycle);
//! - **depth**: `max_depth` levels of nesting have been reached.
//!
//! Either guard turns the property into a link-only leaf. These are the only
//! silent truncations; every other problem is an error, or a recorded
//! demotion under [`ErrorPolicy::BestEffort`]. That includes two properties
//! of one object whose names sanitise to the same term.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::datatype::{Datatype, ScalarType};
use crate::error::TranslationError;
use crate::schema::{NodeId, SchemaDocument, SchemaKind};

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default prefix bound to the aspect's base IRI.
pub const DEFAULT_PREFIX: &str = "cx";

/// Path label used in errors about the root node.
const ROOT_PATH: &str = "<root>";

/// What to do with branch-local failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Propagate the first error; no partial context is produced.
    #[default]
    Strict,
    /// Replace the failing property with a link-only term and record why.
    BestEffort,
}

/// Why a term was cut short without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// The object type is already open on the current path.
    Cycle,
    /// The nesting limit was reached.
    Depth,
}

/// How a descriptor came to have its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Fully derived: a typed scalar, an untyped array, or an expanded object.
    Expanded,
    /// Object left as a link by the cycle/depth guard.
    Truncated {
        /// Which guard fired.
        reason: Truncation,
    },
    /// Best-effort replacement of a branch that failed to translate.
    Demoted {
        /// The error that was suppressed.
        reason: String,
    },
}

/// One term derived from one schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDescriptor {
    /// Term name, sanitised from the property name.
    pub name: String,
    /// Compact IRI `<prefix>:<name>`.
    pub iri: String,
    /// Linked-data datatype of scalar (or scalar-array) properties.
    pub datatype: Option<Datatype>,
    /// Whether the property is array-valued. Does not affect the context shape.
    pub array: bool,
    /// Child terms of an expanded object property.
    pub nested: Option<Vec<TermDescriptor>>,
    /// `description` of an expanded object, from the property or its type.
    pub description: Option<String>,
    /// `x-samm-aspect-model-urn` of an expanded object.
    pub samm_urn: Option<String>,
    /// How the descriptor was produced.
    pub expansion: Expansion,
}

impl TermDescriptor {
    /// Returns the populated child list, treating `Some(vec![])` as absent.
    #[must_use]
    pub fn children(&self) -> Option<&[TermDescriptor]> {
        self.nested.as_deref().filter(|children| !children.is_empty())
    }

    /// Number of nesting levels below this term (0 for a leaf).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nested
            .as_deref()
            .map_or(0, |children| {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            })
    }

    fn link(name: String, iri: String, array: bool, expansion: Expansion) -> Self {
        Self {
            name,
            iri,
            datatype: None,
            array,
            nested: None,
            description: None,
            samm_urn: None,
            expansion,
        }
    }
}

/// Per-call recursion state.
///
/// Created fresh for every translation and never shared; the visited stack
/// only ever holds the object types open on the current path.
#[derive(Debug)]
pub struct TranslationState {
    visited: Vec<NodeId>,
    depth: usize,
    max_depth: usize,
    prefix: String,
    policy: ErrorPolicy,
}

impl TranslationState {
    /// Creates the state for one walk.
    #[must_use]
    pub fn new(prefix: impl Into<String>, max_depth: usize, policy: ErrorPolicy) -> Self {
        Self {
            visited: Vec::new(),
            depth: 0,
            max_depth,
            prefix: prefix.into(),
            policy,
        }
    }

    /// Prefix used for term IRIs.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Current nesting depth (0 while walking the aspect's own properties).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn enter(&mut self, target: NodeId) {
        self.visited.push(target);
        self.depth += 1;
    }

    fn leave(&mut self) {
        self.visited.pop();
        self.depth -= 1;
    }

    fn guard(&self, target: NodeId) -> Option<Truncation> {
        if self.visited.contains(&target) {
            Some(Truncation::Cycle)
        } else if self.depth >= self.max_depth {
            Some(Truncation::Depth)
        } else {
            None
        }
    }
}

impl Default for TranslationState {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_MAX_DEPTH, ErrorPolicy::default())
    }
}

/// Turns a property name into a JSON-LD term name.
///
/// `@` is reserved for keywords and spaces are not allowed in compact IRIs,
/// so `"@my property"` becomes `"my-property"`.
#[must_use]
pub fn term_name(property: &str) -> String {
    property.replace('@', "").replace(' ', "-")
}

/// Walks one schema document. Holds only a borrow of the arena.
#[derive(Debug, Clone, Copy)]
pub struct SchemaGraphWalker<'d> {
    doc: &'d SchemaDocument,
}

impl<'d> SchemaGraphWalker<'d> {
    /// Creates a walker over `doc`.
    #[must_use]
    pub fn new(doc: &'d SchemaDocument) -> Self {
        Self { doc }
    }

    /// Produces the descriptors for the aspect's top-level properties.
    ///
    /// # Errors
    ///
    /// Failures of the root node (not an object, no `properties`, broken
    /// root `$ref`) always propagate. Property failures propagate under
    /// [`ErrorPolicy::Strict`] and are demoted under
    /// [`ErrorPolicy::BestEffort`].
    pub fn walk(
        &self,
        state: &mut TranslationState,
    ) -> Result<Vec<TermDescriptor>, TranslationError> {
        let root = self.dereference(self.doc.root(), ROOT_PATH)?;
        if !matches!(self.doc.node(root).kind, SchemaKind::Object { .. }) {
            return Err(TranslationError::MalformedSchema {
                path: ROOT_PATH.to_owned(),
                reason: "aspect root must be an object schema".to_owned(),
            });
        }
        let members = self.object_members(root, ROOT_PATH)?;
        debug!(
            properties = members.len(),
            max_depth = state.max_depth,
            "walking aspect schema"
        );
        let terms = self.walk_members(&members, None, state)?;
        debug!(terms = terms.len(), "aspect schema walked");
        Ok(terms)
    }

    fn walk_members(
        &self,
        members: &[(&'d str, NodeId)],
        parent: Option<&str>,
        state: &mut TranslationState,
    ) -> Result<Vec<TermDescriptor>, TranslationError> {
        let mut terms = Vec::with_capacity(members.len());
        // Sanitised term name -> the property that claimed it first.
        let mut claimed: HashMap<String, &'d str> = HashMap::new();
        for &(property, id) in members {
            let path = match parent {
                Some(parent) => format!("{parent}.{property}"),
                None => property.to_owned(),
            };
            let name = term_name(property);
            let result = match claimed.get(&name) {
                Some(first) => Err(TranslationError::MalformedSchema {
                    path: path.clone(),
                    reason: format!("term `{name}` collides with property `{first}`"),
                }),
                None => self.walk_property(property, id, &path, state),
            };
            claimed.entry(name.clone()).or_insert(property);
            match result {
                Ok(term) => terms.push(term),
                Err(err) if state.policy == ErrorPolicy::BestEffort && err.is_branch_local() => {
                    warn!(%path, error = %err, "demoting property to a link-only term");
                    let iri = format!("{}:{name}", state.prefix);
                    terms.push(TermDescriptor::link(
                        name,
                        iri,
                        self.is_array(id),
                        Expansion::Demoted {
                            reason: err.to_string(),
                        },
                    ));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(terms)
    }

    fn walk_property(
        &self,
        property: &str,
        id: NodeId,
        path: &str,
        state: &mut TranslationState,
    ) -> Result<TermDescriptor, TranslationError> {
        let name = term_name(property);
        if name.is_empty() {
            return Err(TranslationError::MalformedSchema {
                path: path.to_owned(),
                reason: format!("property name `{property}` is empty once sanitised"),
            });
        }
        let iri = format!("{}:{name}", state.prefix);

        // Arrays are transparent: the item schema decides the term's shape.
        let mut array = false;
        let mut current = self.dereference(id, path)?;
        while let SchemaKind::Array { items } = &self.doc.node(current).kind {
            array = true;
            match items {
                Some(items) => current = self.dereference(*items, path)?,
                None => return Ok(TermDescriptor::link(name, iri, array, Expansion::Expanded)),
            }
        }

        match &self.doc.node(current).kind {
            SchemaKind::Scalar { type_ } => {
                let datatype = type_
                    .datatype()
                    .ok_or_else(|| TranslationError::UnsupportedDatatype {
                        path: path.to_owned(),
                        datatype: match type_ {
                            ScalarType::Unsupported(raw) => raw.clone(),
                            other => format!("{other:?}"),
                        },
                    })?;
                Ok(TermDescriptor {
                    name,
                    iri,
                    datatype: Some(datatype),
                    array,
                    nested: None,
                    description: None,
                    samm_urn: None,
                    expansion: Expansion::Expanded,
                })
            }
            SchemaKind::Object { .. } => {
                if let Some(reason) = state.guard(current) {
                    trace!(%path, ?reason, depth = state.depth, "truncating object term");
                    return Ok(TermDescriptor::link(
                        name,
                        iri,
                        array,
                        Expansion::Truncated { reason },
                    ));
                }
                let members = self.object_members(current, path)?;
                state.enter(current);
                let nested = self.walk_members(&members, Some(path), state);
                state.leave();
                let (declared, target) = (self.doc.node(id), self.doc.node(current));
                Ok(TermDescriptor {
                    name,
                    iri,
                    datatype: None,
                    array,
                    nested: Some(nested?),
                    description: declared
                        .description
                        .clone()
                        .or_else(|| target.description.clone()),
                    samm_urn: declared.samm_urn.clone().or_else(|| target.samm_urn.clone()),
                    expansion: Expansion::Expanded,
                })
            }
            SchemaKind::Array { .. } | SchemaKind::Reference { .. } => {
                Err(TranslationError::MalformedSchema {
                    path: path.to_owned(),
                    reason: "node did not resolve to a value schema".to_owned(),
                })
            }
        }
    }

    /// Whether `id` resolves to an array schema; false if it does not resolve.
    fn is_array(&self, id: NodeId) -> bool {
        let Ok(node) = self.dereference(id, ROOT_PATH) else {
            return false;
        };
        matches!(self.doc.node(node).kind, SchemaKind::Array { .. })
    }

    /// Follows `$ref` chains to a non-reference node.
    fn dereference(&self, id: NodeId, path: &str) -> Result<NodeId, TranslationError> {
        let mut chain = vec![id];
        let mut current = id;
        while let SchemaKind::Reference { target } = &self.doc.node(current).kind {
            let next = self
                .doc
                .lookup(target)
                .ok_or_else(|| TranslationError::UnresolvedReference {
                    path: path.to_owned(),
                    reference: target.clone(),
                })?;
            if chain.contains(&next) {
                return Err(TranslationError::MalformedSchema {
                    path: path.to_owned(),
                    reason: format!("reference `{target}` loops without reaching a schema"),
                });
            }
            chain.push(next);
            current = next;
        }
        Ok(current)
    }

    /// Collects an object's properties: `allOf` members first, then its own.
    fn object_members(
        &self,
        id: NodeId,
        path: &str,
    ) -> Result<Vec<(&'d str, NodeId)>, TranslationError> {
        let mut members = Vec::new();
        let mut open = Vec::new();
        self.collect_members(id, path, &mut open, &mut members)?;
        Ok(members)
    }

    fn collect_members(
        &self,
        id: NodeId,
        path: &str,
        open: &mut Vec<NodeId>,
        members: &mut Vec<(&'d str, NodeId)>,
    ) -> Result<(), TranslationError> {
        let doc = self.doc;
        let SchemaKind::Object { properties, all_of } = &doc.node(id).kind else {
            return Err(TranslationError::MalformedSchema {
                path: path.to_owned(),
                reason: "allOf member is not an object schema".to_owned(),
            });
        };
        if properties.is_none() && all_of.is_empty() {
            return Err(TranslationError::MalformedSchema {
                path: path.to_owned(),
                reason: "object schema declares no properties".to_owned(),
            });
        }
        if open.contains(&id) {
            return Err(TranslationError::MalformedSchema {
                path: path.to_owned(),
                reason: "allOf composition includes itself".to_owned(),
            });
        }
        open.push(id);
        for member in all_of {
            let member = self.dereference(*member, path)?;
            self.collect_members(member, path, open, members)?;
        }
        open.pop();

        for (property, child) in properties.iter().flatten() {
            if members.iter().any(|(existing, _)| *existing == property.as_str()) {
                debug!(%path, %property, "duplicate allOf property; keeping the first");
                continue;
            }
            members.push((property.as_str(), *child));
        }
        Ok(())
    }
}
