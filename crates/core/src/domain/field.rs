// Field Descriptors
//
// Nodes of the schema tree published in the signature document. Each node
// serializes as a single-entry map from wire name to shape:
//
//   {name: "string"}            primitive
//   {owner: [ ... ]}            nested record
//   {tags: ["string"]}          array of primitive
//   {items: [[ ... ]]}          array of record
//   {children: []}              recursive reference
//   {meta: {string: "string"}}  string-keyed map

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// Primitive tags used in the signature document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveTag {
    Bool,
    Number,
    String,
    Time,
}

impl PrimitiveTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveTag::Bool => "bool",
            PrimitiveTag::Number => "number",
            PrimitiveTag::String => "string",
            PrimitiveTag::Time => "time",
        }
    }
}

impl fmt::Display for PrimitiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(PrimitiveTag),
    Record(Vec<FieldDescriptor>),
    PrimitiveArray(PrimitiveTag),
    RecordArray(Vec<FieldDescriptor>),
    /// Reference back to a record already being described
    Cycle,
    StringMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldKind::Primitive(tag) => tag.serialize(serializer),
            FieldKind::Record(fields) => fields.serialize(serializer),
            FieldKind::PrimitiveArray(tag) => serializer.collect_seq(std::iter::once(tag)),
            FieldKind::RecordArray(fields) => serializer.collect_seq(std::iter::once(fields)),
            FieldKind::Cycle => serializer.collect_seq(std::iter::empty::<&FieldDescriptor>()),
            FieldKind::StringMap => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("string", "string")?;
                map.end()
            }
        }
    }
}

impl Serialize for FieldDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.kind)?;
        map.end()
    }
}
