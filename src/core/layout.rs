//! # Record Layout Metadata
//!
//! Declarative description of a record's fields, consumed by both codecs.
//!
//! A type becomes encodable by implementing [`Record`]: it names itself with a
//! [`TypeTag`], lists its fields with [`FieldDescriptor`] builders, and exposes
//! field access by name.
//!
//! ## Example
//! ```rust
//! use layout_codec::core::layout::{unknown_field, FieldDescriptor, Record};
//! use layout_codec::core::primitives::{U16, U32};
//! use layout_codec::core::tag::TypeTag;
//! use layout_codec::core::value::{Value, ValueRef};
//! use layout_codec::error::Result;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Ping {
//!     sequence: u32,
//!     port: u16,
//! }
//!
//! impl Record for Ping {
//!     const TYPE: TypeTag = TypeTag::new("ping");
//!
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::scalar("sequence", U32).at(0),
//!             FieldDescriptor::scalar("port", U16).at(4).big_endian(),
//!         ]
//!     }
//!
//!     fn get(&self, field: &str) -> Option<ValueRef<'_>> {
//!         match field {
//!             "sequence" => Some(self.sequence.into()),
//!             "port" => Some(self.port.into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Value) -> Result<()> {
//!         match field {
//!             "sequence" => self.sequence = value.into_scalar()?,
//!             "port" => self.port = value.into_scalar()?,
//!             other => return Err(unknown_field::<Self>(other)),
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::core::tag::TypeTag;
use crate::core::value::{Value, ValueRef};
use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// Character encoding of string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringEncoding {
    /// One byte per character, non-ASCII characters become `?`.
    #[default]
    Ascii,
    /// Two bytes per character, UTF-16 little-endian.
    Unicode,
}

impl StringEncoding {
    /// Bytes per encoded character.
    pub fn unit_width(self) -> usize {
        match self {
            StringEncoding::Ascii => 1,
            StringEncoding::Unicode => 2,
        }
    }
}

impl FromStr for StringEncoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(StringEncoding::Ascii),
            "unicode" | "utf16" | "utf-16" => Ok(StringEncoding::Unicode),
            other => Err(CodecError::ConfigError(format!(
                "Unknown string encoding: '{other}' (expected 'ascii' or 'unicode')"
            ))),
        }
    }
}

/// Byte order of a fixed-layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Declared size of a string, byte-array or array field.
///
/// For strings the unit is characters, for byte arrays bytes, and for typed
/// arrays elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Fixed(usize),
    /// Consume the rest of the buffer or stream.
    Remaining,
}

/// Element type of an array field.
#[derive(Debug, Clone, Copy)]
pub enum ElementType {
    Scalar(TypeTag),
    Enum(TypeTag),
    Record(RecordType),
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    /// A type resolved through the handler registry.
    Scalar(TypeTag),
    /// An enum carried as the given underlying integer type.
    Enum(TypeTag),
    Str,
    Bytes,
    Array(ElementType),
    Record(RecordType),
}

/// Layout metadata for one field of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    /// Absolute offset from the record start, fixed layout only.
    pub offset: Option<usize>,
    pub size: Option<Size>,
    /// `None` falls back to the codec's configured default.
    pub encoding: Option<StringEncoding>,
    /// Fixed layout only.
    pub endianness: Endianness,
    /// Read-only fields are written but never populated on decode.
    pub writable: bool,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            offset: None,
            size: None,
            encoding: None,
            endianness: Endianness::Little,
            writable: true,
        }
    }

    pub fn scalar(name: &'static str, tag: TypeTag) -> Self {
        Self::new(name, FieldType::Scalar(tag))
    }

    /// Enum field stored as `underlying`.
    pub fn enumeration(name: &'static str, underlying: TypeTag) -> Self {
        Self::new(name, FieldType::Enum(underlying))
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::Str)
    }

    pub fn bytes(name: &'static str) -> Self {
        Self::new(name, FieldType::Bytes)
    }

    pub fn array(name: &'static str, element: ElementType) -> Self {
        Self::new(name, FieldType::Array(element))
    }

    pub fn record<T: Record>(name: &'static str) -> Self {
        Self::new(name, FieldType::Record(RecordType::of::<T>()))
    }

    pub fn records<T: Record>(name: &'static str) -> Self {
        Self::new(name, FieldType::Array(ElementType::Record(RecordType::of::<T>())))
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(Size::Fixed(size));
        self
    }

    pub fn remaining(mut self) -> Self {
        self.size = Some(Size::Remaining);
        self
    }

    pub fn encoding(mut self, encoding: StringEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn unicode(self) -> Self {
        self.encoding(StringEncoding::Unicode)
    }

    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn big_endian(self) -> Self {
        self.endianness(Endianness::Big)
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// The declared size, or `MissingSize` when the field has none.
    pub fn required_size(&self) -> Result<Size> {
        self.size
            .ok_or(CodecError::MissingSize { field: self.name })
    }
}

/// A type with declarative binary layout.
pub trait Record: Default + fmt::Debug + Send + Sync + 'static {
    /// Identity used for handler resolution and diagnostics.
    const TYPE: TypeTag;

    /// Encoded width when used as an array element.
    const SIZE: Option<usize> = None;

    /// Fields in declaration order.
    fn fields() -> Vec<FieldDescriptor>;

    /// Current value of a field, `None` when absent.
    fn get(&self, field: &str) -> Option<ValueRef<'_>>;

    /// Stores a decoded value.
    fn set(&mut self, field: &str, value: Value) -> Result<()>;

    fn record_type() -> RecordType {
        RecordType::of::<Self>()
    }
}

/// Object-safe view of a [`Record`], used for nested dispatch.
pub trait DynRecord: fmt::Debug + Send + Sync + 'static {
    fn record_kind(&self) -> RecordType;
    fn get_field(&self, field: &str) -> Option<ValueRef<'_>>;
    fn set_field(&mut self, field: &str, value: Value) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Record> DynRecord for T {
    fn record_kind(&self) -> RecordType {
        RecordType::of::<T>()
    }

    fn get_field(&self, field: &str) -> Option<ValueRef<'_>> {
        self.get(field)
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        self.set(field, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Type-erased handle to a record's metadata and constructor.
#[derive(Clone, Copy)]
pub struct RecordType {
    tag: TypeTag,
    size: Option<usize>,
    fields: fn() -> Vec<FieldDescriptor>,
    create: fn() -> Box<dyn DynRecord>,
}

impl RecordType {
    pub fn of<T: Record>() -> Self {
        Self {
            tag: T::TYPE,
            size: T::SIZE,
            fields: T::fields,
            create: create_default::<T>,
        }
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn fields(&self) -> Vec<FieldDescriptor> {
        (self.fields)()
    }

    /// A fresh default instance.
    pub fn instantiate(&self) -> Box<dyn DynRecord> {
        (self.create)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("tag", &self.tag)
            .field("size", &self.size)
            .finish()
    }
}

fn create_default<T: Record>() -> Box<dyn DynRecord> {
    Box::new(T::default())
}

/// Error for `Record::set` implementations receiving an undeclared field.
pub fn unknown_field<T: Record>(field: &str) -> CodecError {
    CodecError::UnknownField {
        record: T::TYPE.name(),
        field: field.to_string(),
    }
}
