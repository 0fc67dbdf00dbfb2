use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Generic decoded form of a model answer.
///
/// Every lookup goes through [`Tree::field`] and the typed views below, which
/// report absence or a type mismatch as a value instead of panicking.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Tree>),
    Mapping(BTreeMap<String, Tree>),
}

/// Top-level kind of a [`Tree`], used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeKind::Null => "null",
            TreeKind::Bool => "boolean",
            TreeKind::Number => "number",
            TreeKind::String => "string",
            TreeKind::Sequence => "sequence",
            TreeKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// Outcome of looking a key up in a mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// Key is not there (or the tree is not a mapping)
    Missing,
    /// Key is there with an explicit `null`
    Null,
    Present(&'a Tree),
}

impl<'a> Field<'a> {
    /// The present value, treating `null` the same as a missing key.
    pub fn value(self) -> Option<&'a Tree> {
        match self {
            Field::Present(tree) => Some(tree),
            Field::Missing | Field::Null => None,
        }
    }
}

impl Tree {
    pub fn kind(&self) -> TreeKind {
        match self {
            Tree::Null => TreeKind::Null,
            Tree::Bool(_) => TreeKind::Bool,
            Tree::Number(_) => TreeKind::Number,
            Tree::String(_) => TreeKind::String,
            Tree::Sequence(_) => TreeKind::Sequence,
            Tree::Mapping(_) => TreeKind::Mapping,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Tree::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Tree]> {
        match self {
            Tree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Tree>> {
        match self {
            Tree::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks `key` up. Non-mapping trees report every key as missing.
    pub fn field(&self, key: &str) -> Field<'_> {
        match self.as_mapping().and_then(|map| map.get(key)) {
            None => Field::Missing,
            Some(Tree::Null) => Field::Null,
            Some(tree) => Field::Present(tree),
        }
    }

    /// Looks up several spellings of the same field and returns the first
    /// non-null hit. A `null` under any alias wins over a missing key.
    pub fn first_field(&self, keys: &[&str]) -> Field<'_> {
        let mut outcome = Field::Missing;
        for key in keys {
            match self.field(key) {
                Field::Present(tree) => return Field::Present(tree),
                Field::Null => outcome = Field::Null,
                Field::Missing => {}
            }
        }
        outcome
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Tree::Null,
            Value::Bool(b) => Tree::Bool(b),
            Value::Number(n) => Tree::Number(n),
            Value::String(s) => Tree::String(s),
            Value::Array(items) => Tree::Sequence(items.into_iter().map(Tree::from).collect()),
            Value::Object(map) => {
                Tree::Mapping(map.into_iter().map(|(k, v)| (k, Tree::from(v))).collect())
            }
        }
    }
}
