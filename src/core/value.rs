//! Field values exchanged between records and codecs.
//!
//! Records hand out borrowed [`ValueRef`]s for encoding and receive owned
//! [`Value`]s on decode. Primitive data travels as a [`Scalar`].

use crate::core::layout::{DynRecord, Record};
use crate::error::{constants, CodecError, Result};
use std::net::Ipv4Addr;

/// Kind of a primitive scalar, one per primitive codec entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Ipv4,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::U16 => "u16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Ipv4 => "ipv4",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            ScalarKind::Bool | ScalarKind::F32 | ScalarKind::F64 | ScalarKind::Ipv4
        )
    }
}

/// A single primitive value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Ipv4(Ipv4Addr),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
            Scalar::Ipv4(_) => ScalarKind::Ipv4,
        }
    }

    /// Integer value widened to `i128`, `None` for non-integers.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Scalar::I8(v) => Some(v.into()),
            Scalar::U8(v) => Some(v.into()),
            Scalar::I16(v) => Some(v.into()),
            Scalar::U16(v) => Some(v.into()),
            Scalar::I32(v) => Some(v.into()),
            Scalar::U32(v) => Some(v.into()),
            Scalar::I64(v) => Some(v.into()),
            Scalar::U64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Converts an integer scalar to another integer kind.
    ///
    /// Used for enum fields, whose values travel as their underlying integer.
    /// Fails with `TypeMismatch` for non-integers or out-of-range values.
    pub fn cast(self, kind: ScalarKind) -> Result<Scalar> {
        if self.kind() == kind {
            return Ok(self);
        }
        let mismatch = CodecError::TypeMismatch {
            expected: kind.name(),
            found: self.kind().name(),
        };
        let Some(wide) = self.as_i128() else {
            return Err(mismatch);
        };
        let cast = match kind {
            ScalarKind::I8 => i8::try_from(wide).map(Scalar::I8).ok(),
            ScalarKind::U8 => u8::try_from(wide).map(Scalar::U8).ok(),
            ScalarKind::I16 => i16::try_from(wide).map(Scalar::I16).ok(),
            ScalarKind::U16 => u16::try_from(wide).map(Scalar::U16).ok(),
            ScalarKind::I32 => i32::try_from(wide).map(Scalar::I32).ok(),
            ScalarKind::U32 => u32::try_from(wide).map(Scalar::U32).ok(),
            ScalarKind::I64 => i64::try_from(wide).map(Scalar::I64).ok(),
            ScalarKind::U64 => u64::try_from(wide).map(Scalar::U64).ok(),
            _ => None,
        };
        cast.ok_or(mismatch)
    }
}

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }

            impl TryFrom<Scalar> for $ty {
                type Error = CodecError;

                fn try_from(scalar: Scalar) -> Result<Self> {
                    match scalar {
                        Scalar::$variant(value) => Ok(value),
                        other => Err(CodecError::TypeMismatch {
                            expected: ScalarKind::$variant.name(),
                            found: other.kind().name(),
                        }),
                    }
                }
            }

            impl From<$ty> for ValueRef<'_> {
                fn from(value: $ty) -> Self {
                    ValueRef::Scalar(Scalar::$variant(value))
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(value))
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Ipv4Addr => Ipv4,
}

/// A borrowed field value handed to a codec for encoding.
#[derive(Debug)]
pub enum ValueRef<'a> {
    Scalar(Scalar),
    Str(&'a str),
    Bytes(&'a [u8]),
    Array(Vec<ValueRef<'a>>),
    Record(&'a dyn DynRecord),
}

impl<'a> ValueRef<'a> {
    /// Array of scalars, e.g. `ValueRef::scalars(&self.samples)`.
    pub fn scalars<T>(items: &[T]) -> Self
    where
        T: Copy + Into<Scalar>,
    {
        ValueRef::Array(
            items
                .iter()
                .map(|item| ValueRef::Scalar((*item).into()))
                .collect(),
        )
    }

    /// Array of nested records.
    pub fn records<T: Record>(items: &'a [T]) -> Self {
        ValueRef::Array(
            items
                .iter()
                .map(|item| ValueRef::Record(item as &dyn DynRecord))
                .collect(),
        )
    }

    pub fn record<T: Record>(record: &'a T) -> Self {
        ValueRef::Record(record)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueRef::Scalar(scalar) => scalar.kind().name(),
            ValueRef::Str(_) => "string",
            ValueRef::Bytes(_) => "bytes",
            ValueRef::Array(_) => "array",
            ValueRef::Record(_) => "record",
        }
    }

    pub(crate) fn as_scalar(&self) -> Result<Scalar> {
        match self {
            ValueRef::Scalar(scalar) => Ok(*scalar),
            other => Err(CodecError::TypeMismatch {
                expected: "scalar",
                found: other.kind_name(),
            }),
        }
    }

    pub(crate) fn as_str(&self) -> Result<&'a str> {
        match self {
            ValueRef::Str(text) => Ok(*text),
            other => Err(CodecError::TypeMismatch {
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }

    pub(crate) fn as_bytes(&self) -> Result<&'a [u8]> {
        match self {
            ValueRef::Bytes(bytes) => Ok(*bytes),
            other => Err(CodecError::TypeMismatch {
                expected: "bytes",
                found: other.kind_name(),
            }),
        }
    }

    pub(crate) fn as_record(&self) -> Result<&'a dyn DynRecord> {
        match self {
            ValueRef::Record(record) => Ok(*record),
            other => Err(CodecError::TypeMismatch {
                expected: "record",
                found: other.kind_name(),
            }),
        }
    }

    pub(crate) fn into_items(self) -> Result<Vec<ValueRef<'a>>> {
        match self {
            ValueRef::Array(items) => Ok(items),
            // byte slices double as u8 arrays
            ValueRef::Bytes(bytes) => Ok(bytes.iter().map(|b| ValueRef::from(*b)).collect()),
            other => Err(CodecError::TypeMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }
}

impl<'a> From<&'a str> for ValueRef<'a> {
    fn from(value: &'a str) -> Self {
        ValueRef::Str(value)
    }
}

impl<'a> From<&'a String> for ValueRef<'a> {
    fn from(value: &'a String) -> Self {
        ValueRef::Str(value.as_str())
    }
}

impl<'a> From<&'a [u8]> for ValueRef<'a> {
    fn from(value: &'a [u8]) -> Self {
        ValueRef::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for ValueRef<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        ValueRef::Bytes(value.as_slice())
    }
}

/// An owned field value produced by a codec on decode.
#[derive(Debug)]
pub enum Value {
    Scalar(Scalar),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Record(Box<dyn DynRecord>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scalar(scalar) => scalar.kind().name(),
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    pub fn into_scalar<T>(self) -> Result<T>
    where
        T: TryFrom<Scalar, Error = CodecError>,
    {
        match self {
            Value::Scalar(scalar) => T::try_from(scalar),
            other => Err(CodecError::TypeMismatch {
                expected: "scalar",
                found: other.kind_name(),
            }),
        }
    }

    pub fn into_string(self) -> Result<String> {
        match self {
            Value::Str(text) => Ok(text),
            other => Err(CodecError::TypeMismatch {
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(CodecError::TypeMismatch {
                expected: "bytes",
                found: other.kind_name(),
            }),
        }
    }

    /// Array of scalars into a typed vector.
    pub fn into_vec<T>(self) -> Result<Vec<T>>
    where
        T: TryFrom<Scalar, Error = CodecError>,
    {
        match self {
            Value::Array(items) => items.into_iter().map(Value::into_scalar).collect(),
            other => Err(CodecError::TypeMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }

    pub fn into_record<T: Record>(self) -> Result<T> {
        match self {
            Value::Record(record) => downcast_record(record),
            other => Err(CodecError::TypeMismatch {
                expected: constants::ERR_NOT_A_RECORD,
                found: other.kind_name(),
            }),
        }
    }

    pub fn into_records<T: Record>(self) -> Result<Vec<T>> {
        match self {
            Value::Array(items) => items.into_iter().map(Value::into_record).collect(),
            other => Err(CodecError::TypeMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }
}

/// Recovers the concrete record from a type-erased box.
pub(crate) fn downcast_record<T: Record>(record: Box<dyn DynRecord>) -> Result<T> {
    let found = record.record_kind().tag().name();
    record
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            tracing::warn!(
                expected = T::TYPE.name(),
                found,
                "{}",
                constants::ERR_RECORD_DOWNCAST
            );
            CodecError::TypeMismatch {
                expected: T::TYPE.name(),
                found,
            }
        })
}
