//! # Fixed-Layout Codec
//!
//! Packs records into byte buffers at absolute per-field offsets.
//!
//! Each field carrying an offset occupies `base + offset` onward; fields without
//! one are not part of the wire layout. Nested records are placed at their
//! parent's declared offset and lay out their own fields relative to it.
//!
//! Writes are in place: bytes not covered by a present field are left as the
//! caller supplied them.
//!
//! ## Field Rules
//! - **Scalars**: primitive table width, little-endian unless declared big-endian
//! - **Enums**: cast to the underlying integer, then as a scalar
//! - **Strings**: `size` characters, space-padded; decode stops at NUL and trims trailing spaces
//! - **Byte arrays**: `size` bytes, zero-padded
//! - **Arrays**: contiguous elements; without a fixed count, the count is the
//!   remaining buffer length divided by the element width

use crate::config::CodecSettings;
use crate::core::layout::{
    DynRecord, ElementType, FieldDescriptor, FieldType, Record, RecordType, Size,
};
use crate::core::primitives::{element_width, global_registry, PrimitiveCodec};
use crate::core::registry::TypeHandlerRegistry;
use crate::core::tag::TypeTag;
use crate::core::text::{decode_string, encode_string, encoded_len};
use crate::core::value::{downcast_record, Scalar, Value, ValueRef};
use crate::error::{CodecError, Result};
use crate::utils::metrics::{global_metrics, Timer};
use tracing::{instrument, trace, warn};

/// Absolute-offset record codec.
#[derive(Debug, Clone)]
pub struct FixedLayoutCodec {
    registry: TypeHandlerRegistry<PrimitiveCodec>,
    settings: CodecSettings,
}

impl Default for FixedLayoutCodec {
    fn default() -> Self {
        Self::new(CodecSettings::default())
    }
}

impl FixedLayoutCodec {
    /// Codec backed by the global primitive registry.
    pub fn new(settings: CodecSettings) -> Self {
        Self::with_registry(global_registry(), settings)
    }

    pub fn with_registry(
        registry: TypeHandlerRegistry<PrimitiveCodec>,
        settings: CodecSettings,
    ) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &TypeHandlerRegistry<PrimitiveCodec> {
        &self.registry
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    /// Writes every present, offset-carrying field of `record` into `buffer`.
    #[instrument(level = "trace", skip_all, fields(record = %record.record_kind().tag()))]
    pub fn encode(&self, record: &dyn DynRecord, buffer: &mut [u8], base: usize) -> Result<()> {
        let _timer = Timer::start("fixed_encode");
        match self.encode_record(record, buffer, base, 0) {
            Ok(end) => {
                global_metrics().record_encoded(end.saturating_sub(base) as u64);
                Ok(())
            }
            Err(e) => {
                global_metrics().encode_error();
                warn!(error = %e, "Fixed-layout encode failed");
                Err(e)
            }
        }
    }

    /// Decodes a `T` whose layout starts at `base`.
    pub fn decode<T: Record>(&self, buffer: &[u8], base: usize) -> Result<T> {
        downcast_record(self.decode_dyn(T::record_type(), buffer, base)?)
    }

    /// Decodes a record known only by its [`RecordType`].
    #[instrument(level = "trace", skip_all, fields(record = %record_type.tag()))]
    pub fn decode_dyn(
        &self,
        record_type: RecordType,
        buffer: &[u8],
        base: usize,
    ) -> Result<Box<dyn DynRecord>> {
        let _timer = Timer::start("fixed_decode");
        match self.decode_record(record_type, buffer, base, 0) {
            Ok((record, end)) => {
                global_metrics().record_decoded(end.saturating_sub(base) as u64);
                Ok(record)
            }
            Err(e) => {
                global_metrics().decode_error();
                warn!(error = %e, "Fixed-layout decode failed");
                Err(e)
            }
        }
    }

    /// Smallest buffer that holds every offset-carrying field.
    ///
    /// Fails with `UnboundedLayout` when a field consumes the rest of the buffer
    /// or is an array without a fixed count.
    pub fn layout_len(&self, record_type: RecordType) -> Result<usize> {
        self.measure(record_type, 0)
    }

    /// Encodes into a fresh zeroed buffer of [`layout_len`](Self::layout_len) bytes.
    pub fn to_vec(&self, record: &dyn DynRecord) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.layout_len(record.record_kind())?];
        self.encode(record, &mut buffer, 0)?;
        Ok(buffer)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.settings.max_nesting_depth {
            return Err(CodecError::NestingTooDeep {
                depth: self.settings.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn encode_record(
        &self,
        record: &dyn DynRecord,
        buffer: &mut [u8],
        base: usize,
        depth: usize,
    ) -> Result<usize> {
        self.check_depth(depth)?;
        let record_type = record.record_kind();
        let mut end = base;

        for field in record_type.fields() {
            let Some(offset) = field.offset else {
                continue;
            };
            let Some(value) = record.get_field(field.name) else {
                trace!(field = field.name, "Skipping absent field");
                continue;
            };
            let at = base.saturating_add(offset);
            end = end.max(self.encode_field(&field, value, buffer, at, depth)?);
        }

        Ok(end)
    }

    fn encode_field(
        &self,
        field: &FieldDescriptor,
        value: ValueRef<'_>,
        buffer: &mut [u8],
        at: usize,
        depth: usize,
    ) -> Result<usize> {
        match field.ty {
            FieldType::Scalar(tag) => self.encode_scalar(field, tag, value.as_scalar()?, false, buffer, at),
            FieldType::Enum(tag) => self.encode_scalar(field, tag, value.as_scalar()?, true, buffer, at),
            FieldType::Str => {
                let size = field.required_size()?;
                let encoding = field
                    .encoding
                    .unwrap_or(self.settings.default_string_encoding);
                let count = match size {
                    Size::Fixed(n) => {
                        // bounds first so an oversized declaration never allocates
                        let len = encoded_len(n, encoding).ok_or(CodecError::BufferOverflow {
                            field: field.name,
                            offset: at,
                            needed: usize::MAX,
                            available: buffer.len().saturating_sub(at),
                        })?;
                        region_mut(field, buffer, at, len)?;
                        Some(n)
                    }
                    Size::Remaining => None,
                };
                let bytes = encode_string(value.as_str()?, count, encoding);
                put(field, buffer, at, &bytes)
            }
            FieldType::Bytes => {
                let data = value.as_bytes()?;
                match field.required_size()? {
                    Size::Fixed(n) => {
                        let out = region_mut(field, buffer, at, n)?;
                        let len = n.min(data.len());
                        out[..len].copy_from_slice(&data[..len]);
                        out[len..].fill(0);
                        Ok(at + n)
                    }
                    Size::Remaining => put(field, buffer, at, data),
                }
            }
            FieldType::Array(element) => {
                let width = element_width(&self.registry, field, element)?;
                let mut items = value.into_items()?;
                if let Some(Size::Fixed(count)) = field.size {
                    items.truncate(count);
                }

                let mut position = at;
                for (index, item) in items.into_iter().enumerate() {
                    self.encode_element(field, element, item, buffer, position, depth)
                        .map_err(|e| e.in_array(field.name, index))?;
                    position += width;
                }
                Ok(position)
            }
            FieldType::Record(_) => self.encode_record(value.as_record()?, buffer, at, depth + 1),
        }
    }

    fn encode_element(
        &self,
        field: &FieldDescriptor,
        element: ElementType,
        item: ValueRef<'_>,
        buffer: &mut [u8],
        at: usize,
        depth: usize,
    ) -> Result<usize> {
        match element {
            ElementType::Scalar(tag) => self.encode_scalar(field, tag, item.as_scalar()?, false, buffer, at),
            ElementType::Enum(tag) => self.encode_scalar(field, tag, item.as_scalar()?, true, buffer, at),
            ElementType::Record(_) => self.encode_record(item.as_record()?, buffer, at, depth + 1),
        }
    }

    fn encode_scalar(
        &self,
        field: &FieldDescriptor,
        tag: TypeTag,
        value: Scalar,
        cast: bool,
        buffer: &mut [u8],
        at: usize,
    ) -> Result<usize> {
        let codec = self.registry.get(tag)?;
        let value = if cast { value.cast(codec.kind)? } else { value };
        let out = region_mut(field, buffer, at, codec.width)?;
        codec.write(value, out, field.endianness)?;
        Ok(at + codec.width)
    }

    fn decode_record(
        &self,
        record_type: RecordType,
        buffer: &[u8],
        base: usize,
        depth: usize,
    ) -> Result<(Box<dyn DynRecord>, usize)> {
        self.check_depth(depth)?;
        let mut record = record_type.instantiate();
        let mut end = base;

        for field in record_type.fields() {
            let Some(offset) = field.offset else {
                continue;
            };
            if !field.writable {
                continue;
            }
            let at = base.saturating_add(offset);
            let (value, field_end) = self.decode_field(&field, buffer, at, depth)?;
            record.set_field(field.name, value)?;
            end = end.max(field_end);
        }

        Ok((record, end))
    }

    fn decode_field(
        &self,
        field: &FieldDescriptor,
        buffer: &[u8],
        at: usize,
        depth: usize,
    ) -> Result<(Value, usize)> {
        match field.ty {
            FieldType::Scalar(tag) | FieldType::Enum(tag) => {
                let (scalar, end) = self.decode_scalar(field, tag, buffer, at)?;
                Ok((Value::Scalar(scalar), end))
            }
            FieldType::Str => {
                let encoding = field
                    .encoding
                    .unwrap_or(self.settings.default_string_encoding);
                let len = match field.required_size()? {
                    Size::Fixed(n) => encoded_len(n, encoding).unwrap_or(usize::MAX),
                    Size::Remaining => buffer.len().saturating_sub(at),
                };
                let bytes = region(field, buffer, at, len)?;
                Ok((Value::Str(decode_string(bytes, encoding)), at + len))
            }
            FieldType::Bytes => {
                let len = match field.required_size()? {
                    Size::Fixed(n) => n,
                    Size::Remaining => buffer.len().saturating_sub(at),
                };
                let bytes = region(field, buffer, at, len)?;
                Ok((Value::Bytes(bytes.to_vec()), at + len))
            }
            FieldType::Array(element) => {
                let width = element_width(&self.registry, field, element)?;
                let count = match field.size {
                    Some(Size::Fixed(count)) => count,
                    _ => buffer.len().saturating_sub(at) / width,
                };

                let fits = buffer.len().saturating_sub(at) / width;
                let mut items = Vec::with_capacity(count.min(fits));
                let mut position = at;
                for index in 0..count {
                    let item = self
                        .decode_element(field, element, buffer, position, depth)
                        .map_err(|e| e.in_array(field.name, index))?;
                    items.push(item);
                    position += width;
                }
                Ok((Value::Array(items), position))
            }
            FieldType::Record(record_type) => {
                let (record, end) = self.decode_record(record_type, buffer, at, depth + 1)?;
                Ok((Value::Record(record), end))
            }
        }
    }

    fn decode_element(
        &self,
        field: &FieldDescriptor,
        element: ElementType,
        buffer: &[u8],
        at: usize,
        depth: usize,
    ) -> Result<Value> {
        match element {
            ElementType::Scalar(tag) | ElementType::Enum(tag) => {
                Ok(Value::Scalar(self.decode_scalar(field, tag, buffer, at)?.0))
            }
            ElementType::Record(record_type) => {
                let (record, _) = self.decode_record(record_type, buffer, at, depth + 1)?;
                Ok(Value::Record(record))
            }
        }
    }

    fn decode_scalar(
        &self,
        field: &FieldDescriptor,
        tag: TypeTag,
        buffer: &[u8],
        at: usize,
    ) -> Result<(Scalar, usize)> {
        let codec = self.registry.get(tag)?;
        let bytes = region(field, buffer, at, codec.width)?;
        Ok((codec.read(bytes, field.endianness), at + codec.width))
    }

    fn measure(&self, record_type: RecordType, depth: usize) -> Result<usize> {
        self.check_depth(depth)?;
        let mut len = 0;

        for field in record_type.fields() {
            let Some(offset) = field.offset else {
                continue;
            };
            let unbounded = || CodecError::UnboundedLayout { field: field.name };
            let width = match field.ty {
                FieldType::Scalar(tag) | FieldType::Enum(tag) => self.registry.get(tag)?.width,
                FieldType::Str => match field.required_size()? {
                    Size::Fixed(n) => {
                        let encoding = field
                            .encoding
                            .unwrap_or(self.settings.default_string_encoding);
                        encoded_len(n, encoding).ok_or_else(unbounded)?
                    }
                    Size::Remaining => return Err(unbounded()),
                },
                FieldType::Bytes => match field.required_size()? {
                    Size::Fixed(n) => n,
                    Size::Remaining => return Err(unbounded()),
                },
                FieldType::Array(element) => match field.size {
                    Some(Size::Fixed(count)) => count
                        .checked_mul(element_width(&self.registry, &field, element)?)
                        .ok_or_else(unbounded)?,
                    _ => return Err(unbounded()),
                },
                FieldType::Record(nested) => self.measure(nested, depth + 1)?,
            };
            len = len.max(offset.checked_add(width).ok_or_else(unbounded)?);
        }

        Ok(len)
    }
}

fn region<'b>(field: &FieldDescriptor, buffer: &'b [u8], at: usize, len: usize) -> Result<&'b [u8]> {
    let available = buffer.len().saturating_sub(at);
    at.checked_add(len)
        .and_then(|end| buffer.get(at..end))
        .ok_or(CodecError::MalformedBuffer {
            field: field.name,
            offset: at,
            needed: len,
            available,
        })
}

fn region_mut<'b>(
    field: &FieldDescriptor,
    buffer: &'b mut [u8],
    at: usize,
    len: usize,
) -> Result<&'b mut [u8]> {
    let available = buffer.len().saturating_sub(at);
    at.checked_add(len)
        .and_then(|end| buffer.get_mut(at..end))
        .ok_or(CodecError::BufferOverflow {
            field: field.name,
            offset: at,
            needed: len,
            available,
        })
}

fn put(field: &FieldDescriptor, buffer: &mut [u8], at: usize, bytes: &[u8]) -> Result<usize> {
    region_mut(field, buffer, at, bytes.len())?.copy_from_slice(bytes);
    Ok(at + bytes.len())
}
