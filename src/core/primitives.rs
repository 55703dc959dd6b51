//! # Primitive Codec Table
//!
//! Fixed-width little-endian encoders for every builtin scalar kind, and the
//! process-wide registry seeded with them.
//!
//! | Tag    | Width | Notes                     |
//! |--------|-------|---------------------------|
//! | `bool` | 1     | nonzero decodes as `true` |
//! | `i8`   | 1     |                           |
//! | `u8`   | 1     |                           |
//! | `i16`  | 2     |                           |
//! | `u16`  | 2     |                           |
//! | `i32`  | 4     |                           |
//! | `u32`  | 4     |                           |
//! | `i64`  | 8     |                           |
//! | `u64`  | 8     |                           |
//! | `f32`  | 4     | IEEE 754 single           |
//! | `f64`  | 8     | IEEE 754 double           |
//! | `ipv4` | 4     | octets in network order   |
//!
//! Big-endian fields reuse the same entries: the little-endian bytes are
//! reversed, in place on encode and through a scratch copy on decode.

use crate::core::layout::{ElementType, Endianness, FieldDescriptor};
use crate::core::registry::TypeHandlerRegistry;
use crate::core::tag::TypeTag;
use crate::core::value::{Scalar, ScalarKind};
use crate::error::{CodecError, Result};
use std::fmt;
use std::net::Ipv4Addr;

pub const BOOL: TypeTag = TypeTag::new("bool");
pub const I8: TypeTag = TypeTag::new("i8");
pub const U8: TypeTag = TypeTag::new("u8");
pub const I16: TypeTag = TypeTag::new("i16");
pub const U16: TypeTag = TypeTag::new("u16");
pub const I32: TypeTag = TypeTag::new("i32");
pub const U32: TypeTag = TypeTag::new("u32");
pub const I64: TypeTag = TypeTag::new("i64");
pub const U64: TypeTag = TypeTag::new("u64");
pub const F32: TypeTag = TypeTag::new("f32");
pub const F64: TypeTag = TypeTag::new("f64");
pub const IPV4: TypeTag = TypeTag::new("ipv4");

/// Widest builtin primitive, sizes the stack scratch buffer for big-endian reads.
const MAX_WIDTH: usize = 8;

/// Width and codec functions for one scalar kind.
///
/// `decode` and `encode` operate on exactly `width` little-endian bytes; callers
/// are responsible for bounds.
#[derive(Clone, Copy)]
pub struct PrimitiveCodec {
    pub kind: ScalarKind,
    pub width: usize,
    pub decode: fn(&[u8]) -> Scalar,
    pub encode: fn(Scalar, &mut [u8]) -> Result<()>,
}

impl fmt::Debug for PrimitiveCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveCodec")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .finish()
    }
}

impl PrimitiveCodec {
    /// Decodes `width` bytes in the given byte order.
    pub fn read(&self, bytes: &[u8], endianness: Endianness) -> Scalar {
        match endianness {
            Endianness::Little => (self.decode)(&bytes[..self.width]),
            Endianness::Big if self.width <= MAX_WIDTH => {
                let mut scratch = [0u8; MAX_WIDTH];
                let raw = &mut scratch[..self.width];
                raw.copy_from_slice(&bytes[..self.width]);
                raw.reverse();
                (self.decode)(raw)
            }
            // custom handlers wider than any builtin
            Endianness::Big => {
                let mut raw = bytes[..self.width].to_vec();
                raw.reverse();
                (self.decode)(&raw)
            }
        }
    }

    /// Encodes `value` into the first `width` bytes of `out`.
    pub fn write(&self, value: Scalar, out: &mut [u8], endianness: Endianness) -> Result<()> {
        match endianness {
            Endianness::Little => (self.encode)(value, &mut out[..self.width]),
            Endianness::Big => {
                let raw = &mut out[..self.width];
                (self.encode)(value, raw)?;
                raw.reverse();
                Ok(())
            }
        }
    }

    /// Convenience for stream codecs writing into a fresh buffer.
    pub fn to_bytes(&self, value: Scalar) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.width];
        (self.encode)(value, &mut out)?;
        Ok(out)
    }
}

macro_rules! numeric_codec {
    ($decode:ident, $encode:ident, $ty:ty, $variant:ident) => {
        fn $decode(bytes: &[u8]) -> Scalar {
            let mut raw = [0u8; std::mem::size_of::<$ty>()];
            raw.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
            Scalar::$variant(<$ty>::from_le_bytes(raw))
        }

        fn $encode(value: Scalar, out: &mut [u8]) -> Result<()> {
            let value = <$ty>::try_from(value)?;
            out[..std::mem::size_of::<$ty>()].copy_from_slice(&value.to_le_bytes());
            Ok(())
        }
    };
}

numeric_codec!(decode_i8, encode_i8, i8, I8);
numeric_codec!(decode_u8, encode_u8, u8, U8);
numeric_codec!(decode_i16, encode_i16, i16, I16);
numeric_codec!(decode_u16, encode_u16, u16, U16);
numeric_codec!(decode_i32, encode_i32, i32, I32);
numeric_codec!(decode_u32, encode_u32, u32, U32);
numeric_codec!(decode_i64, encode_i64, i64, I64);
numeric_codec!(decode_u64, encode_u64, u64, U64);
numeric_codec!(decode_f32, encode_f32, f32, F32);
numeric_codec!(decode_f64, encode_f64, f64, F64);

fn decode_bool(bytes: &[u8]) -> Scalar {
    Scalar::Bool(bytes[0] != 0)
}

fn encode_bool(value: Scalar, out: &mut [u8]) -> Result<()> {
    out[0] = u8::from(bool::try_from(value)?);
    Ok(())
}

fn decode_ipv4(bytes: &[u8]) -> Scalar {
    Scalar::Ipv4(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
}

fn encode_ipv4(value: Scalar, out: &mut [u8]) -> Result<()> {
    out[..4].copy_from_slice(&Ipv4Addr::try_from(value)?.octets());
    Ok(())
}

fn entry(
    kind: ScalarKind,
    width: usize,
    decode: fn(&[u8]) -> Scalar,
    encode: fn(Scalar, &mut [u8]) -> Result<()>,
) -> PrimitiveCodec {
    PrimitiveCodec {
        kind,
        width,
        decode,
        encode,
    }
}

/// The builtin table, one entry per scalar kind.
pub fn primitive_handlers() -> Vec<(TypeTag, PrimitiveCodec)> {
    vec![
        (BOOL, entry(ScalarKind::Bool, 1, decode_bool, encode_bool)),
        (I8, entry(ScalarKind::I8, 1, decode_i8, encode_i8)),
        (U8, entry(ScalarKind::U8, 1, decode_u8, encode_u8)),
        (I16, entry(ScalarKind::I16, 2, decode_i16, encode_i16)),
        (U16, entry(ScalarKind::U16, 2, decode_u16, encode_u16)),
        (I32, entry(ScalarKind::I32, 4, decode_i32, encode_i32)),
        (U32, entry(ScalarKind::U32, 4, decode_u32, encode_u32)),
        (I64, entry(ScalarKind::I64, 8, decode_i64, encode_i64)),
        (U64, entry(ScalarKind::U64, 8, decode_u64, encode_u64)),
        (F32, entry(ScalarKind::F32, 4, decode_f32, encode_f32)),
        (F64, entry(ScalarKind::F64, 8, decode_f64, encode_f64)),
        (IPV4, entry(ScalarKind::Ipv4, 4, decode_ipv4, encode_ipv4)),
    ]
}

/// A fresh registry seeded with the builtin table.
///
/// Use this instead of the global registry when registrations must not leak
/// across callers.
pub fn new_primitive_registry() -> TypeHandlerRegistry<PrimitiveCodec> {
    TypeHandlerRegistry::with_handlers(primitive_handlers())
}

static REGISTRY: once_cell::sync::Lazy<TypeHandlerRegistry<PrimitiveCodec>> =
    once_cell::sync::Lazy::new(new_primitive_registry);

/// Handle to the process-wide registry used by default codecs.
pub fn global_registry() -> TypeHandlerRegistry<PrimitiveCodec> {
    REGISTRY.clone()
}

/// Encoded width of one array element.
pub(crate) fn element_width(
    registry: &TypeHandlerRegistry<PrimitiveCodec>,
    field: &FieldDescriptor,
    element: ElementType,
) -> Result<usize> {
    match element {
        ElementType::Scalar(tag) | ElementType::Enum(tag) => match registry.get(tag)?.width {
            0 => Err(CodecError::MissingSize { field: field.name }),
            width => Ok(width),
        },
        ElementType::Record(record) => record
            .size()
            .filter(|&width| width > 0)
            .ok_or(CodecError::MissingSize { field: field.name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(tag: TypeTag) -> PrimitiveCodec {
        new_primitive_registry().get(tag).unwrap()
    }

    #[test]
    fn test_widths() {
        for (tag, width) in [(BOOL, 1), (I16, 2), (U32, 4), (F64, 8), (IPV4, 4)] {
            assert_eq!(codec(tag).width, width, "{tag}");
        }
    }

    #[test]
    fn test_tag_names_match_kinds() {
        for (tag, entry) in primitive_handlers() {
            assert_eq!(tag.name(), entry.kind.name());
        }
    }

    #[test]
    fn test_u16_byte_order() {
        let u16_codec = codec(U16);
        let mut out = [0u8; 2];

        u16_codec
            .write(Scalar::U16(0x0102), &mut out, Endianness::Little)
            .unwrap();
        assert_eq!(out, [0x02, 0x01]);

        u16_codec
            .write(Scalar::U16(0x0102), &mut out, Endianness::Big)
            .unwrap();
        assert_eq!(out, [0x01, 0x02]);
        assert_eq!(
            u16_codec.read(&out, Endianness::Big),
            Scalar::U16(0x0102)
        );
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        assert_eq!(codec(BOOL).read(&[0x7f], Endianness::Little), Scalar::Bool(true));
        assert_eq!(codec(BOOL).read(&[0], Endianness::Little), Scalar::Bool(false));
    }

    #[test]
    fn test_ipv4_network_order() {
        let addr = Ipv4Addr::new(192, 168, 1, 20);
        let bytes = codec(IPV4).to_bytes(Scalar::Ipv4(addr)).unwrap();
        assert_eq!(bytes, [192, 168, 1, 20]);
    }

    #[test]
    fn test_encode_wrong_kind_fails() {
        let mut out = [0u8; 4];
        let err = codec(U32)
            .write(Scalar::I32(1), &mut out, Endianness::Little)
            .unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { expected: "u32", found: "i32" }));
    }

    #[test]
    fn test_derived_tag_inherits_width() {
        const PORT: TypeTag = TypeTag::derived("primitives-test-port", &U16);
        let registry = new_primitive_registry();
        assert_eq!(registry.get(PORT).unwrap().kind, ScalarKind::U16);
    }
}
