//! Schema scalar types and their linked-data datatypes.

/// Well-known IRIs used in generated contexts.
pub mod iris {
    /// XSD namespace, bound to the `xsd` prefix whenever a term carries `@type`.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// Prefix bound to [`XSD`].
    pub const XSD_PREFIX: &str = "xsd";
}

/// The type of a scalar schema node, as declared in the JSON Schema.
///
/// Decided once when the document is parsed; see
/// [`SchemaDocument`](crate::schema::SchemaDocument).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    /// `"type": "string"` without a recognised format.
    String,
    /// `"type": "number"`.
    Number,
    /// `"type": "integer"`.
    Integer,
    /// `"type": "boolean"`.
    Boolean,
    /// `"type": "string", "format": "date-time"`.
    DateTime,
    /// `"type": "string", "format": "date"`.
    Date,
    /// An `enum` whose members are all strings.
    StringEnum,
    /// Anything the translator has no datatype for; holds the raw type.
    Unsupported(String),
}

impl ScalarType {
    /// Classifies a JSON Schema `type` keyword plus optional `format`.
    #[must_use]
    pub fn from_keyword(type_: &str, format: Option<&str>) -> Self {
        match (type_, format) {
            ("string", Some("date-time")) => ScalarType::DateTime,
            ("string", Some("date")) => ScalarType::Date,
            ("string", _) => ScalarType::String,
            ("number", _) => ScalarType::Number,
            ("integer", _) => ScalarType::Integer,
            ("boolean", _) => ScalarType::Boolean,
            (other, _) => ScalarType::Unsupported(other.to_owned()),
        }
    }

    /// Maps the schema type to its linked-data datatype.
    ///
    /// Returns `None` for [`ScalarType::Unsupported`]; the walker turns that
    /// into an `UnsupportedDatatype` error instead of guessing.
    #[must_use]
    pub fn datatype(&self) -> Option<Datatype> {
        match self {
            ScalarType::String | ScalarType::StringEnum => Some(Datatype::String),
            ScalarType::Number => Some(Datatype::Float),
            ScalarType::Integer => Some(Datatype::Int),
            ScalarType::Boolean => Some(Datatype::Boolean),
            ScalarType::DateTime => Some(Datatype::DateTime),
            ScalarType::Date => Some(Datatype::Date),
            ScalarType::Unsupported(_) => None,
        }
    }
}

/// XSD datatype assigned to a scalar term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// `xsd:string`.
    String,
    /// `xsd:float`.
    Float,
    /// `xsd:int`.
    Int,
    /// `xsd:boolean`.
    Boolean,
    /// `xsd:dateTime`.
    DateTime,
    /// `xsd:date`.
    Date,
}

impl Datatype {
    /// Compact IRI in the `xsd` prefix.
    #[must_use]
    pub fn compact_iri(self) -> &'static str {
        match self {
            Datatype::String => "xsd:string",
            Datatype::Float => "xsd:float",
            Datatype::Int => "xsd:int",
            Datatype::Boolean => "xsd:boolean",
            Datatype::DateTime => "xsd:dateTime",
            Datatype::Date => "xsd:date",
        }
    }

    /// Whether plain JSON values already carry this datatype.
    ///
    /// Strings, numbers and booleans are typed by JSON itself, so their terms
    /// stay bare IRIs. Dates travel as JSON strings and need `@type` coercion.
    #[must_use]
    pub fn is_json_native(self) -> bool {
        !matches!(self, Datatype::DateTime | Datatype::Date)
    }
}
