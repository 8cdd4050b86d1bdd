//! Typed view of management-instrumentation class definitions.
//!
//! Providers produce `CimClass` values. The filter consumes anything that
//! implements `ClassMetadata`, which keeps provider bindings decoupled from
//! the writable-property analysis.

pub mod namespace;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

pub use namespace::Namespace;

/// Data types a writable-property search can select on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    SInt8,
    SInt16,
    SInt32,
    SInt64,
    DateTime,
    Boolean,
}

impl DataType {
    pub const ALL: [DataType; 11] = [
        Self::String,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::SInt8,
        Self::SInt16,
        Self::SInt32,
        Self::SInt64,
        Self::DateTime,
        Self::Boolean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::SInt8 => "SInt8",
            Self::SInt16 => "SInt16",
            Self::SInt32 => "SInt32",
            Self::SInt64 => "SInt64",
            Self::DateTime => "DateTime",
            Self::Boolean => "Boolean",
        }
    }

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a property as the provider reports it.
///
/// CIM types outside the filterable set (`Real64`, `Reference`, arrays)
/// are kept by name so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Data(DataType),
    Other(String),
}

impl PropertyType {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Data(t) => Some(*t),
            Self::Other(_) => None,
        }
    }
}

impl From<DataType> for PropertyType {
    fn from(t: DataType) -> Self {
        Self::Data(t)
    }
}

impl From<String> for PropertyType {
    fn from(s: String) -> Self {
        // Exact names only: "StringArray" must not collapse into String.
        match DataType::ALL.iter().find(|t| t.as_str() == s) {
            Some(t) => Self::Data(*t),
            None => Self::Other(s),
        }
    }
}

impl From<PropertyType> for String {
    fn from(t: PropertyType) -> Self {
        t.to_string()
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data(t) => write!(f, "{t}"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// One property of a class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    name: String,
    #[serde(rename = "type")]
    property_type: PropertyType,
    #[serde(default)]
    qualifiers: Vec<String>,
}

impl PropertyMetadata {
    pub fn new(
        name: impl Into<String>,
        property_type: impl Into<PropertyType>,
        qualifiers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            property_type: property_type.into(),
            qualifiers: qualifiers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }

    pub fn qualifiers(&self) -> &[String] {
        &self.qualifiers
    }

    /// Whether the provider marks this property settable through its write path.
    pub fn is_writable(&self) -> bool {
        self.qualifiers.iter().any(|q| q.eq_ignore_ascii_case("write"))
    }
}

/// Read access to a single class definition.
pub trait ClassMetadata {
    fn name(&self) -> &str;

    /// Properties in provider order. Bindings that inspect lazily may fail here.
    fn properties(&self) -> std::result::Result<&[PropertyMetadata], ProviderError>;
}

/// A class definition as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimClass {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
}

impl CimClass {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyMetadata>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }
}

impl ClassMetadata for CimClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> std::result::Result<&[PropertyMetadata], ProviderError> {
        Ok(&self.properties)
    }
}

impl<C: ClassMetadata + ?Sized> ClassMetadata for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn properties(&self) -> std::result::Result<&[PropertyMetadata], ProviderError> {
        (**self).properties()
    }
}
