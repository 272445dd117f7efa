//! # Layout Module
//!
//! Every record shared between pipeline stages declares its field table here: name, byte
//! offset and byte width of each data field, in declaration order. Padding fields are not
//! listed; they are the gaps between consecutive entries.
//!
//! The table is the versioned schema of a record. Two independently built stages agree on a
//! record only if their declarations match entry for entry, and [`check_compatible`] is the
//! integration-time pairing of a producer declaration with a consumer declaration. Nothing in
//! this module runs on the draw path.
//!
//! ```rust
//! use shading_contracts::layout::{self, DeclaredLayout};
//! use shading_contracts::{FragmentInterpolant, FragmentInterpolantExtended};
//!
//! let vertex_stage = DeclaredLayout::of::<FragmentInterpolant>();
//! let fragment_stage = DeclaredLayout::of::<FragmentInterpolantExtended>();
//! assert!(layout::check_compatible(&vertex_stage, &fragment_stage).is_err());
//! ```

use crate::error::{ContractError, Result};

/// Alignment every record size is rounded to. Matches the 16-byte alignment of `float4x4`
/// and `float3` on the GPU side.
pub const RECORD_ALIGNMENT: usize = 16;

/// One data field of a record: name, byte offset from the record start and byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutField {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

impl LayoutField {
    /// Describes a field `size` bytes wide starting `offset` bytes into the record.
    pub const fn new(name: &'static str, offset: usize, size: usize) -> Self {
        Self { name, offset, size }
    }

    /// First byte past the field, or `None` if that is not addressable.
    pub const fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.size)
    }
}

/// Builds a [`LayoutField`] from a record type, one of its fields and the field's type.
macro_rules! layout_field {
    ($record:ty, $field:ident, $ty:ty) => {
        $crate::layout::LayoutField::new(
            stringify!($field),
            ::std::mem::offset_of!($record, $field),
            ::std::mem::size_of::<$ty>(),
        )
    };
}
pub(crate) use layout_field;

/// A record with a fixed, declared memory layout that crosses a stage boundary.
///
/// Implementors are `#[repr(C)]` plain-old-data structs, so a value can be handed to the
/// graphics API as raw bytes with [`StageLayout::as_bytes`].
pub trait StageLayout: bytemuck::Pod {
    /// Name under which the record is declared on both sides of the boundary.
    const NAME: &'static str;

    /// Data fields in declaration order.
    const FIELDS: &'static [LayoutField];

    /// Total width including trailing padding.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Raw bytes of the record, exactly as a consuming stage reads them.
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Looks up a field by name.
    fn field(name: &str) -> Option<&'static LayoutField> {
        Self::FIELDS.iter().find(|field| field.name == name)
    }
}

/// A layout declaration as seen by one side of a stage boundary.
///
/// Producers usually obtain theirs from the Rust type with [`DeclaredLayout::of`]; consumers
/// compiled elsewhere (a shader, another crate) can describe theirs by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredLayout<'a> {
    pub name: &'a str,
    pub size: usize,
    pub fields: &'a [LayoutField],
}

impl<'a> DeclaredLayout<'a> {
    /// Describes a layout by hand. Run it through [`validate`] before pairing it.
    pub const fn new(name: &'a str, size: usize, fields: &'a [LayoutField]) -> Self {
        Self { name, size, fields }
    }

    /// Declaration of a Rust-side record.
    pub fn of<L: StageLayout>() -> DeclaredLayout<'static> {
        DeclaredLayout {
            name: L::NAME,
            size: L::SIZE,
            fields: L::FIELDS,
        }
    }
}

/// Checks that a declaration is well formed: fields in ascending order, no overlap, all
/// inside the record, and a size that is a multiple of [`RECORD_ALIGNMENT`].
pub fn validate(layout: &DeclaredLayout<'_>) -> Result<()> {
    if layout.size % RECORD_ALIGNMENT != 0 {
        return Err(ContractError::UnalignedSize {
            layout: layout.name.to_owned(),
            size: layout.size,
        });
    }

    let mut cursor = 0;
    for field in layout.fields {
        match field.end() {
            Some(end) if field.offset >= cursor && end <= layout.size => cursor = end,
            _ => {
                return Err(ContractError::MalformedField {
                    layout: layout.name.to_owned(),
                    field: *field,
                })
            }
        }
    }

    Ok(())
}

/// Pairs a producer declaration with a consumer declaration.
///
/// Succeeds only if both have the same name, size and field table. Any reordering, width
/// change, or added or removed field is reported with the first point of disagreement.
pub fn check_compatible(producer: &DeclaredLayout<'_>, consumer: &DeclaredLayout<'_>) -> Result<()> {
    log::debug!(
        "pairing layout `{}` ({} bytes, {} fields) with `{}` ({} bytes, {} fields)",
        producer.name,
        producer.size,
        producer.fields.len(),
        consumer.name,
        consumer.size,
        consumer.fields.len(),
    );

    if producer.name != consumer.name {
        return Err(ContractError::NameMismatch {
            producer: producer.name.to_owned(),
            consumer: consumer.name.to_owned(),
        });
    }

    if producer.size != consumer.size {
        return Err(ContractError::SizeMismatch {
            layout: producer.name.to_owned(),
            producer: producer.size,
            consumer: consumer.size,
        });
    }

    if let Some((index, (ours, theirs))) = producer
        .fields
        .iter()
        .zip(consumer.fields)
        .enumerate()
        .find(|(_, (ours, theirs))| ours != theirs)
    {
        return Err(ContractError::FieldMismatch {
            layout: producer.name.to_owned(),
            index,
            producer: *ours,
            consumer: *theirs,
        });
    }

    if producer.fields.len() != consumer.fields.len() {
        return Err(ContractError::FieldCountMismatch {
            layout: producer.name.to_owned(),
            producer: producer.fields.len(),
            consumer: consumer.fields.len(),
        });
    }

    Ok(())
}

/// Reinterprets one field out of a record's raw bytes.
///
/// Returns `None` if `T` is not exactly as wide as the field or the field lies outside
/// `bytes`.
pub fn read_field<T: bytemuck::Pod>(bytes: &[u8], field: &LayoutField) -> Option<T> {
    if std::mem::size_of::<T>() != field.size {
        return None;
    }
    bytes
        .get(field.offset..field.end()?)
        .map(bytemuck::pod_read_unaligned::<T>)
}
