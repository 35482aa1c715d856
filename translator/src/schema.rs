//! Arena representation of a resolved JSON Schema.
//!
//! SAMM aspect schemas are generated JSON Schema documents whose shared
//! types live in `components.schemas` (or `$defs` / `definitions`) and are
//! wired together with `$ref`. Those references may point back at an
//! ancestor, so the schema is a graph rather than a tree. The document keeps
//! every node in a flat arena and models references as names into a
//! definitions table; nothing is dereferenced at parse time, which means
//! parsing always terminates and cycles only matter to the walker.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::datatype::ScalarType;
use crate::error::{ResolutionError, SchemaError};

/// Reference that points at the document root.
pub const ROOT_REF: &str = "#";

/// Locations of definition tables, as `(pointer prefix, JSON path)`.
const DEFINITION_TABLES: &[(&str, &[&str])] = &[
    ("#/components/schemas/", &["components", "schemas"]),
    ("#/$defs/", &["$defs"]),
    ("#/definitions/", &["definitions"]),
];

/// SAMM extension keyword carrying the aspect model URN of a node.
const SAMM_URN_KEY: &str = "x-samm-aspect-model-urn";

/// Index of a node inside one [`SchemaDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Structural kind of a schema node, decided once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    /// An object with named properties and/or `allOf` members.
    Object {
        /// Declared properties in document order; `None` when the node has no
        /// `properties` keyword.
        properties: Option<Vec<(String, NodeId)>>,
        /// `allOf` member schemas in document order.
        all_of: Vec<NodeId>,
    },
    /// An array; `items` is `None` when the schema does not say what it holds.
    Array {
        /// Item schema.
        items: Option<NodeId>,
    },
    /// A leaf value.
    Scalar {
        /// Declared scalar type.
        type_: ScalarType,
    },
    /// A `$ref` into the definitions table.
    Reference {
        /// The reference as written, e.g. `#/components/schemas/Unit`.
        target: String,
    },
}

/// One JSON Schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    /// Structural kind.
    pub kind: SchemaKind,
    /// `description` keyword, if any.
    pub description: Option<String>,
    /// `x-samm-aspect-model-urn` keyword, if any.
    pub samm_urn: Option<String>,
}

/// A parsed schema: node arena, root node and definitions table.
///
/// Immutable once built, so one document can be shared between concurrent
/// translations.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    nodes: Vec<SchemaNode>,
    root: NodeId,
    definitions: HashMap<String, NodeId>,
}

impl SchemaDocument {
    /// Builds the arena from a parsed JSON value.
    ///
    /// Individual nodes never fail to parse: shapes the translator does not
    /// understand become [`ScalarType::Unsupported`] scalars and are reported
    /// when (and only if) the walker reaches them.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotAnObject`] if `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let root_map = value.as_object().ok_or(SchemaError::NotAnObject {
            found: json_kind(value),
        })?;

        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            definitions: HashMap::new(),
        };
        doc.root = doc.insert(value);
        doc.definitions.insert(ROOT_REF.to_owned(), doc.root);

        for (pointer, path) in DEFINITION_TABLES {
            let Some(table) = lookup_path(root_map, path) else {
                continue;
            };
            for (name, definition) in table {
                let id = doc.insert(definition);
                doc.definitions.insert(format!("{pointer}{name}"), id);
            }
        }
        Ok(doc)
    }

    /// Parses JSON text into a document.
    ///
    /// `location` only labels errors (a file path or URL).
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Json`] for invalid JSON and
    /// [`ResolutionError::Schema`] when the root is not an object.
    pub fn from_json(text: &str, location: &str) -> Result<Self, ResolutionError> {
        let value: Value = serde_json::from_str(text).map_err(|source| ResolutionError::Json {
            location: location.to_owned(),
            source,
        })?;
        Ok(Self::from_value(&value)?)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node for `id`, or `None` for an id from another document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// Node lookup for ids this document handed out itself.
    pub(crate) fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Looks up a `$ref` target in the definitions table.
    #[must_use]
    pub fn lookup(&self, reference: &str) -> Option<NodeId> {
        self.definitions.get(reference).copied()
    }

    /// Root `description`, used as the aspect's `@definition`.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.node(self.root).description.as_deref()
    }

    /// Root `x-samm-aspect-model-urn`, if the generator emitted one.
    #[must_use]
    pub fn samm_urn(&self) -> Option<&str> {
        self.node(self.root).samm_urn.as_deref()
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty. Never true for a parsed document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of named definitions, excluding the implicit root entry.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len() - 1
    }

    fn insert(&mut self, value: &Value) -> NodeId {
        let node = self.parse_node(value);
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn parse_node(&mut self, value: &Value) -> SchemaNode {
        let Some(map) = value.as_object() else {
            return SchemaNode {
                kind: SchemaKind::Scalar {
                    type_: ScalarType::Unsupported(format!("{} schema", json_kind(value))),
                },
                description: None,
                samm_urn: None,
            };
        };

        let description = string_field(map, "description");
        let samm_urn = string_field(map, SAMM_URN_KEY);
        let kind = self.classify(map);
        SchemaNode {
            kind,
            description,
            samm_urn,
        }
    }

    fn classify(&mut self, map: &Map<String, Value>) -> SchemaKind {
        if let Some(reference) = map.get("$ref") {
            let target = match reference {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return SchemaKind::Reference { target };
        }

        let declared = declared_type(map);
        let is_object = declared.as_deref() == Some("object")
            || (declared.is_none()
                && (map.contains_key("properties") || map.contains_key("allOf")));
        if is_object {
            let properties = map.get("properties").and_then(Value::as_object).map(|props| {
                props
                    .iter()
                    .map(|(name, schema)| (name.clone(), self.insert(schema)))
                    .collect()
            });
            let all_of = map
                .get("allOf")
                .and_then(Value::as_array)
                .map(|members| members.iter().map(|m| self.insert(m)).collect())
                .unwrap_or_default();
            return SchemaKind::Object { properties, all_of };
        }

        let is_array = declared.as_deref() == Some("array")
            || (declared.is_none() && map.contains_key("items"));
        if is_array {
            let items = match map.get("items") {
                Some(Value::Array(tuple)) => tuple.first().map(|first| self.insert(first)),
                Some(schema) => Some(self.insert(schema)),
                None => None,
            };
            return SchemaKind::Array { items };
        }

        let string_enum = map
            .get("enum")
            .and_then(Value::as_array)
            .is_some_and(|members| {
                !members.is_empty() && members.iter().all(Value::is_string)
            });
        let type_ = match declared.as_deref() {
            Some("string") if string_enum => ScalarType::StringEnum,
            Some(type_) => {
                ScalarType::from_keyword(type_, map.get("format").and_then(Value::as_str))
            }
            None if string_enum => ScalarType::StringEnum,
            None => ScalarType::Unsupported("untyped".to_owned()),
        };
        SchemaKind::Scalar { type_ }
    }
}

/// Reads `type`, accepting the `["string", "null"]` union form.
fn declared_type(map: &Map<String, Value>) -> Option<String> {
    match map.get("type")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(str::to_owned),
        other => Some(other.to_string()),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn lookup_path<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Map<String, Value>> {
    let mut current = map;
    for key in path {
        current = current.get(*key)?.as_object()?;
    }
    Some(current)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
