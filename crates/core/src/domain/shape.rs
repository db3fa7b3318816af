// Type Shapes
//
// Static description of argument and result types. Nested types are held as
// `TypeRef`s whose shapes are computed on demand, so a record that refers to
// itself still has a finite description.

use super::time::JsonTime;
use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Types that can appear in a method's argument or result.
///
/// Records describe themselves with [`TypeShape::record`]:
///
/// ```
/// use svcbind_core::domain::{Describe, TypeShape};
///
/// struct LoginKind {
///     name: String,
///     label: String,
/// }
///
/// impl Describe for LoginKind {
///     fn shape() -> TypeShape {
///         TypeShape::record::<Self>()
///             .field::<String>("name")
///             .field::<String>("label")
///             .build()
///     }
/// }
/// ```
pub trait Describe: 'static {
    fn shape() -> TypeShape;
}

/// Lazy handle to a described type
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    shape: fn() -> TypeShape,
}

impl TypeRef {
    pub fn of<T: Describe>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            shape: T::shape,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }

    /// Follow pointer indirections down to the first non-pointer type
    pub fn resolve(&self) -> (TypeRef, TypeShape) {
        let mut current = *self;
        loop {
            match current.shape() {
                TypeShape::Pointer(inner) => current = inner,
                shape => return (current, shape),
            }
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural kind of a type
#[derive(Debug, Clone)]
pub enum TypeShape {
    Bool,
    Number,
    String,
    /// The wrapped wire time, [`JsonTime`]
    Time,
    /// General calendar time; not allowed in signatures
    CalendarTime,
    Record(RecordShape),
    /// Transparent indirection (`Option`, `Box`, `Arc`, `Rc`)
    Pointer(TypeRef),
    Sequence(TypeRef),
    Map {
        key: TypeRef,
        value: TypeRef,
    },
    /// Anything else; omitted from signatures
    Opaque,
}

impl TypeShape {
    /// Start describing the record type `T`
    pub fn record<T: 'static>() -> RecordBuilder {
        RecordBuilder {
            shape: RecordShape {
                name: std::any::type_name::<T>(),
                fields: Vec::new(),
            },
        }
    }

    pub fn as_record(&self) -> Option<&RecordShape> {
        match self {
            TypeShape::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// Ordered field list of a record type
#[derive(Debug, Clone)]
pub struct RecordShape {
    name: &'static str,
    fields: Vec<FieldShape>,
}

impl RecordShape {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }
}

/// One declared field of a record
#[derive(Debug, Clone)]
pub struct FieldShape {
    name: &'static str,
    ty: TypeRef,
    embedded: bool,
    rules: Option<&'static str>,
}

impl FieldShape {
    /// Wire name; empty for embedded fields
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// Embedded fields are spliced into the parent (`#[serde(flatten)]`)
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Raw validation tag, e.g. `"required,oneof=web app"`
    pub fn rules(&self) -> Option<&'static str> {
        self.rules
    }
}

/// Builder returned by [`TypeShape::record`]
#[derive(Debug)]
pub struct RecordBuilder {
    shape: RecordShape,
}

impl RecordBuilder {
    pub fn field<T: Describe>(mut self, name: &'static str) -> Self {
        self.shape.fields.push(FieldShape {
            name,
            ty: TypeRef::of::<T>(),
            embedded: false,
            rules: None,
        });
        self
    }

    /// Field with a validation tag checked before the method runs
    pub fn field_with<T: Describe>(mut self, name: &'static str, rules: &'static str) -> Self {
        self.shape.fields.push(FieldShape {
            name,
            ty: TypeRef::of::<T>(),
            embedded: false,
            rules: Some(rules),
        });
        self
    }

    /// Embedded record whose fields appear directly in this one
    pub fn embed<T: Describe>(mut self) -> Self {
        self.shape.fields.push(FieldShape {
            name: "",
            ty: TypeRef::of::<T>(),
            embedded: true,
            rules: None,
        });
        self
    }

    pub fn build(self) -> TypeShape {
        TypeShape::Record(self.shape)
    }
}

macro_rules! describe_as {
    ($shape:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> TypeShape {
                    TypeShape::$shape
                }
            }
        )+
    };
}

describe_as!(Bool => bool);
describe_as!(Number => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
describe_as!(String => String, char, &'static str);
describe_as!(CalendarTime => std::time::SystemTime, chrono::NaiveDateTime, chrono::NaiveDate);
describe_as!(Opaque => (), serde_json::Value);

impl Describe for JsonTime {
    fn shape() -> TypeShape {
        TypeShape::Time
    }
}

impl<Tz: chrono::TimeZone + 'static> Describe for chrono::DateTime<Tz> {
    fn shape() -> TypeShape {
        TypeShape::CalendarTime
    }
}

macro_rules! describe_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: Describe> Describe for $ptr<T> {
                fn shape() -> TypeShape {
                    TypeShape::Pointer(TypeRef::of::<T>())
                }
            }
        )+
    };
}

describe_pointer!(Option, Box, Arc, Rc);

macro_rules! describe_sequence {
    ($($seq:ident),+) => {
        $(
            impl<T: Describe> Describe for $seq<T> {
                fn shape() -> TypeShape {
                    TypeShape::Sequence(TypeRef::of::<T>())
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S: 'static> Describe for HashSet<T, S> {
    fn shape() -> TypeShape {
        TypeShape::Sequence(TypeRef::of::<T>())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::Sequence(TypeRef::of::<T>())
    }
}

impl<K: Describe, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    fn shape() -> TypeShape {
        TypeShape::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        }
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        }
    }
}
