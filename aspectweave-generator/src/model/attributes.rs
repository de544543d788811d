use super::TypeIdx;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of a call or attribute usage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Compile-time constant used as an attribute argument
///
/// Floats keep their source text so values stay hashable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Char(char),
    Float(String),
    /// Path to an enum variant, e.g. `aspectweave::extensions::LogLevel::Debug`
    Enum(String),
    /// Type path, rendered as its `TypeId`
    Type(String),
    Array(Vec<ConstValue>),
    Null,
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedArgument {
    pub name: String,
    pub value: ConstValue,
}

/// One attribute attached to a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeUsage {
    pub attribute: TypeIdx,
    /// Positional constructor arguments
    #[serde(default)]
    pub arguments: Vec<ConstValue>,
    #[serde(default)]
    pub named: Vec<NamedArgument>,
    pub location: Location,
}

impl AttributeUsage {
    pub fn named(&self, name: &str) -> Option<&ConstValue> {
        self.named
            .iter()
            .find(|argument| argument.name == name)
            .map(|argument| &argument.value)
    }
}
