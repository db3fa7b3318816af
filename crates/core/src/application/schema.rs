// Schema Extraction
//
// Walks a record's shape and produces the ordered FieldDescriptor tree used in
// the signature document.

use crate::domain::error::Result;
use crate::domain::{
    FieldDescriptor, FieldKind, FieldShape, PrimitiveTag, RecordShape, SchemaError, TypeRef,
    TypeShape,
};
use std::any::TypeId;

/// Describe the fields of a record type.
///
/// Pointers are looked through. A record that is reached again while it is
/// still being described is emitted as an empty array marker, so recursive
/// types (directly or through other records) always terminate.
///
/// # Errors
///
/// - `NotARecord` if `ty` does not resolve to a record
/// - `CalendarTime` if any field uses a general calendar type
/// - `NonStringMapKey` if a map field has a non-string key
pub fn extract(ty: TypeRef) -> Result<Vec<FieldDescriptor>> {
    let (ty, shape) = ty.resolve();
    match &shape {
        TypeShape::Record(record) => Extractor::default().record(ty, record),
        _ => Err(SchemaError::NotARecord(ty.name().to_string())),
    }
}

#[derive(Default)]
struct Extractor {
    // Records currently being described, outermost first
    open: Vec<TypeId>,
}

impl Extractor {
    fn is_open(&self, ty: &TypeRef) -> bool {
        self.open.contains(&ty.id())
    }

    fn record(&mut self, ty: TypeRef, record: &RecordShape) -> Result<Vec<FieldDescriptor>> {
        self.open.push(ty.id());
        let fields = self.fields(record);
        self.open.pop();
        fields
    }

    fn fields(&mut self, record: &RecordShape) -> Result<Vec<FieldDescriptor>> {
        let mut out = Vec::with_capacity(record.fields().len());
        for field in record.fields() {
            if field.is_embedded() {
                let (ty, shape) = field.ty().resolve();
                if let TypeShape::Record(inner) = &shape {
                    if !self.is_open(&ty) {
                        out.extend(self.record(ty, inner)?);
                    }
                }
                continue;
            }

            if let Some(kind) = self.field_kind(record, field)? {
                out.push(FieldDescriptor::new(field.name(), kind));
            }
        }
        Ok(out)
    }

    fn field_kind(&mut self, owner: &RecordShape, field: &FieldShape) -> Result<Option<FieldKind>> {
        let (ty, shape) = field.ty().resolve();
        if let Some(tag) = primitive_tag(&shape) {
            return Ok(Some(FieldKind::Primitive(tag)));
        }

        let kind = match shape {
            TypeShape::CalendarTime => return Err(calendar_time(owner, field)),
            TypeShape::Record(inner) => {
                if self.is_open(&ty) {
                    FieldKind::Cycle
                } else {
                    FieldKind::Record(self.record(ty, &inner)?)
                }
            }
            TypeShape::Sequence(elem) => return self.sequence_kind(owner, field, elem),
            TypeShape::Map { key, .. } => match key.resolve().1 {
                TypeShape::String => FieldKind::StringMap,
                _ => {
                    return Err(SchemaError::NonStringMapKey {
                        record: owner.name().to_string(),
                        field: field.name().to_string(),
                    })
                }
            },
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }

    fn sequence_kind(
        &mut self,
        owner: &RecordShape,
        field: &FieldShape,
        elem: TypeRef,
    ) -> Result<Option<FieldKind>> {
        let (ty, shape) = elem.resolve();
        if let Some(tag) = primitive_tag(&shape) {
            return Ok(Some(FieldKind::PrimitiveArray(tag)));
        }

        let kind = match shape {
            TypeShape::CalendarTime => return Err(calendar_time(owner, field)),
            TypeShape::Record(inner) => {
                if self.is_open(&ty) {
                    FieldKind::Cycle
                } else {
                    FieldKind::RecordArray(self.record(ty, &inner)?)
                }
            }
            // nested sequences, maps and opaque elements are not described
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }
}

fn primitive_tag(shape: &TypeShape) -> Option<PrimitiveTag> {
    match shape {
        TypeShape::Bool => Some(PrimitiveTag::Bool),
        TypeShape::Number => Some(PrimitiveTag::Number),
        TypeShape::String => Some(PrimitiveTag::String),
        TypeShape::Time => Some(PrimitiveTag::Time),
        _ => None,
    }
}

fn calendar_time(owner: &RecordShape, field: &FieldShape) -> SchemaError {
    SchemaError::CalendarTime {
        record: owner.name().to_string(),
        field: field.name().to_string(),
    }
}
