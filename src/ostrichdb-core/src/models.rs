use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown record type: {0}")]
    UnknownType(String),

    #[error("malformed record line: {0}")]
    MalformedRecord(String),
}

/// RecordType is the fixed vocabulary of record type tags
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    /// `[]<TYPE>`, e.g. `[]STRING`
    Array(Box<RecordType>),
}

impl RecordType {
    pub fn array_of(inner: RecordType) -> Self {
        RecordType::Array(Box::new(inner))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, RecordType::Array(_))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::String => f.write_str("STRING"),
            RecordType::Integer => f.write_str("INTEGER"),
            RecordType::Float => f.write_str("FLOAT"),
            RecordType::Boolean => f.write_str("BOOLEAN"),
            RecordType::Datetime => f.write_str("DATETIME"),
            RecordType::Array(inner) => write!(f, "[]{inner}"),
        }
    }
}

impl FromStr for RecordType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_uppercase();
        if let Some(inner) = tag.strip_prefix("[]") {
            return inner.parse().map(RecordType::array_of);
        }
        match tag.as_str() {
            "STRING" => Ok(RecordType::String),
            "INTEGER" => Ok(RecordType::Integer),
            "FLOAT" => Ok(RecordType::Float),
            "BOOLEAN" => Ok(RecordType::Boolean),
            "DATETIME" => Ok(RecordType::Datetime),
            _ => Err(ModelError::UnknownType(s.to_string())),
        }
    }
}

/// Record represents a named, typed value inside a cluster.
///
/// The server's textual form is `<name> :<TYPE>: <value>`; `Display` and
/// `FromStr` convert to and from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into().to_uppercase(),
            value: value.into(),
        }
    }

    /// Interpret the type tag against the known vocabulary
    pub fn typed(&self) -> Result<RecordType, ModelError> {
        self.record_type.parse()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :{}: {}", self.name, self.record_type, self.value)
    }
}

impl FromStr for Record {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        let malformed = || ModelError::MalformedRecord(line.to_string());

        let (name, rest) = line.split_once(" :").ok_or_else(malformed)?;
        let (record_type, value) = rest.split_once(':').ok_or_else(malformed)?;
        if name.is_empty() || record_type.is_empty() {
            return Err(malformed());
        }

        Ok(Record {
            name: name.to_string(),
            record_type: record_type.to_string(),
            value: value.strip_prefix(' ').unwrap_or(value).to_string(),
        })
    }
}

/// RecordId addresses a record either by name or by numeric id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    Name(String),
    Id(u64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Name(name) => f.write_str(name),
            RecordId::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for RecordId {
    fn from(name: &str) -> Self {
        RecordId::Name(name.to_string())
    }
}

impl From<String> for RecordId {
    fn from(name: String) -> Self {
        RecordId::Name(name)
    }
}

impl From<&String> for RecordId {
    fn from(name: &String) -> Self {
        RecordId::Name(name.clone())
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Id(id)
    }
}

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        RecordId::Id(u64::from(id))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Value,
    Type,
    Id,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// SearchOptions narrows a record listing.
///
/// Fields serialize as query parameters under their wire names; absent
/// fields are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn value_contains(mut self, text: impl Into<String>) -> Self {
        self.value_contains = Some(text.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort_by = Some(field);
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn min_value(mut self, min: impl Into<String>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn max_value(mut self, max: impl Into<String>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    /// Form-encoded query string (without the leading `?`), empty when no
    /// field is set
    pub fn to_query_string(&self) -> String {
        // Flat struct of strings, integers and unit enums always encodes
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}
