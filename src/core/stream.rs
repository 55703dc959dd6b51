//! # Sequential Stream Codec
//!
//! Writes record fields back to back in declaration order, with no offsets,
//! headers or length prefixes.
//!
//! ## Wire Rules
//! - Scalars and enums: primitive table width, always little-endian
//! - Strings: fixed width when sized, otherwise written whole and read to the end of the stream
//! - Byte arrays: `size` bytes zero-padded, or the rest of the stream for `remaining()`
//! - Arrays: contiguous elements; without a fixed count the decoder takes
//!   `remaining stream length / element width` elements
//! - Nested records: their fields inline, recursively
//!
//! ## Absent Fields
//! A field whose value is absent is skipped on encode. Nothing on the wire
//! marks the omission, so the decoder reads every declared field and a stream
//! with skipped fields decodes misaligned. Writer and reader must agree out of
//! band on which fields are present.
//!
//! Read-only fields are written like any other but skipped on decode, so the
//! reader leaves their bytes unconsumed. Declare them last, or every field after
//! one decodes from the wrong position.
//!
//! ```rust,no_run
//! use layout_codec::core::stream::SequentialCodec;
//! # use layout_codec::core::layout::Record;
//! # fn roundtrip<T: Record>(value: &T) -> layout_codec::error::Result<T> {
//! let codec = SequentialCodec::default();
//! let bytes = codec.to_bytes(value)?;
//! codec.from_bytes::<T>(&bytes, 0)
//! # }
//! ```

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
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use tracing::{instrument, trace, warn};

/// Placeholder field name for top-level arrays.
const ROOT_ARRAY: &str = "<array>";

/// Declaration-order stream codec.
#[derive(Debug, Clone)]
pub struct SequentialCodec {
    registry: TypeHandlerRegistry<PrimitiveCodec>,
    settings: CodecSettings,
}

impl Default for SequentialCodec {
    fn default() -> Self {
        Self::new(CodecSettings::default())
    }
}

impl SequentialCodec {
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

    /// Writes every present field of `record` to `writer`.
    #[instrument(level = "trace", skip_all, fields(record = %record.record_kind().tag()))]
    pub fn encode<W: Write>(&self, record: &dyn DynRecord, writer: &mut W) -> Result<()> {
        let _timer = Timer::start("stream_encode");
        let mut sink = Sink::new(writer);
        let result = self.write_record(record, &mut sink, 0);
        self.finish_encode(result, sink.written)
    }

    /// Decodes a `T` starting at the reader's current position.
    pub fn decode<T: Record, R: Read + Seek>(&self, reader: &mut R) -> Result<T> {
        downcast_record(self.decode_dyn(T::record_type(), reader)?)
    }

    /// Seeks to `position`, then decodes a `T`.
    pub fn decode_at<T: Record, R: Read + Seek>(&self, reader: &mut R, position: u64) -> Result<T> {
        reader.seek(SeekFrom::Start(position))?;
        self.decode(reader)
    }

    #[instrument(level = "trace", skip_all, fields(record = %record_type.tag()))]
    pub fn decode_dyn<R: Read + Seek>(
        &self,
        record_type: RecordType,
        reader: &mut R,
    ) -> Result<Box<dyn DynRecord>> {
        let _timer = Timer::start("stream_decode");
        let mut source = Source::new(reader, self.settings.max_unbounded_read)?;
        let result = self.read_record(record_type, &mut source, 0);
        self.finish_decode(result, &mut source)
    }

    /// Writes a bare array, elements back to back.
    pub fn encode_array<W: Write>(
        &self,
        element: ElementType,
        items: ValueRef<'_>,
        writer: &mut W,
    ) -> Result<()> {
        let field = FieldDescriptor::array(ROOT_ARRAY, element);
        let mut sink = Sink::new(writer);
        let result = self.write_field(&field, items, &mut sink, 0);
        self.finish_encode(result, sink.written)
    }

    /// Reads a bare array filling the rest of the stream.
    pub fn decode_array<R: Read + Seek>(&self, element: ElementType, reader: &mut R) -> Result<Value> {
        let field = FieldDescriptor::array(ROOT_ARRAY, element);
        let mut source = Source::new(reader, self.settings.max_unbounded_read)?;
        let result = self.read_field(&field, &mut source, 0);
        self.finish_decode(result, &mut source)
    }

    /// Encodes into a new buffer.
    pub fn to_bytes(&self, record: &dyn DynRecord) -> Result<Bytes> {
        let mut writer = BytesMut::new().writer();
        self.encode(record, &mut writer)?;
        Ok(writer.into_inner().freeze())
    }

    /// Decodes a `T` starting `offset` bytes into `data`.
    pub fn from_bytes<T: Record>(&self, data: &[u8], offset: u64) -> Result<T> {
        self.decode_at(&mut Cursor::new(data), offset)
    }

    fn finish_encode(&self, result: Result<()>, written: u64) -> Result<()> {
        match result {
            Ok(()) => {
                global_metrics().record_encoded(written);
                Ok(())
            }
            Err(e) => {
                global_metrics().encode_error();
                warn!(error = %e, "Stream encode failed");
                Err(e)
            }
        }
    }

    fn finish_decode<T, R: Read + Seek>(&self, result: Result<T>, source: &mut Source<'_, R>) -> Result<T> {
        match result {
            Ok(value) => {
                global_metrics().record_decoded(source.consumed()?);
                Ok(value)
            }
            Err(e) => {
                global_metrics().decode_error();
                warn!(error = %e, "Stream decode failed");
                Err(e)
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.settings.max_nesting_depth {
            return Err(CodecError::NestingTooDeep {
                depth: self.settings.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn write_record<W: Write>(
        &self,
        record: &dyn DynRecord,
        sink: &mut Sink<'_, W>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(depth)?;

        for field in record.record_kind().fields() {
            let Some(value) = record.get_field(field.name) else {
                trace!(field = field.name, "Skipping absent field");
                continue;
            };
            self.write_field(&field, value, sink, depth)?;
        }
        Ok(())
    }

    fn write_field<W: Write>(
        &self,
        field: &FieldDescriptor,
        value: ValueRef<'_>,
        sink: &mut Sink<'_, W>,
        depth: usize,
    ) -> Result<()> {
        match field.ty {
            FieldType::Scalar(tag) => self.write_scalar(tag, value.as_scalar()?, false, sink),
            FieldType::Enum(tag) => self.write_scalar(tag, value.as_scalar()?, true, sink),
            FieldType::Str => {
                let encoding = field
                    .encoding
                    .unwrap_or(self.settings.default_string_encoding);
                let count = match field.size {
                    Some(Size::Fixed(n)) => Some(n),
                    _ => None,
                };
                sink.put(&encode_string(value.as_str()?, count, encoding))
            }
            FieldType::Bytes => {
                let data = value.as_bytes()?;
                match field.required_size()? {
                    Size::Fixed(n) => {
                        let len = n.min(data.len());
                        sink.put(&data[..len])?;
                        sink.put(&vec![0u8; n - len])
                    }
                    Size::Remaining => sink.put(data),
                }
            }
            FieldType::Array(element) => {
                let mut items = value.into_items()?;
                if let Some(Size::Fixed(count)) = field.size {
                    items.truncate(count);
                }
                for (index, item) in items.into_iter().enumerate() {
                    self.write_element(element, item, sink, depth)
                        .map_err(|e| e.in_array(field.name, index))?;
                }
                Ok(())
            }
            FieldType::Record(_) => self.write_record(value.as_record()?, sink, depth + 1),
        }
    }

    fn write_element<W: Write>(
        &self,
        element: ElementType,
        item: ValueRef<'_>,
        sink: &mut Sink<'_, W>,
        depth: usize,
    ) -> Result<()> {
        match element {
            ElementType::Scalar(tag) => self.write_scalar(tag, item.as_scalar()?, false, sink),
            ElementType::Enum(tag) => self.write_scalar(tag, item.as_scalar()?, true, sink),
            ElementType::Record(_) => self.write_record(item.as_record()?, sink, depth + 1),
        }
    }

    fn write_scalar<W: Write>(
        &self,
        tag: TypeTag,
        value: Scalar,
        cast: bool,
        sink: &mut Sink<'_, W>,
    ) -> Result<()> {
        let codec = self.registry.get(tag)?;
        let value = if cast { value.cast(codec.kind)? } else { value };
        sink.put(&codec.to_bytes(value)?)
    }

    fn read_record<R: Read + Seek>(
        &self,
        record_type: RecordType,
        source: &mut Source<'_, R>,
        depth: usize,
    ) -> Result<Box<dyn DynRecord>> {
        self.check_depth(depth)?;
        let mut record = record_type.instantiate();

        for field in record_type.fields() {
            if !field.writable {
                continue;
            }
            let value = self.read_field(&field, source, depth)?;
            record.set_field(field.name, value)?;
        }
        Ok(record)
    }

    fn read_field<R: Read + Seek>(
        &self,
        field: &FieldDescriptor,
        source: &mut Source<'_, R>,
        depth: usize,
    ) -> Result<Value> {
        match field.ty {
            FieldType::Scalar(tag) | FieldType::Enum(tag) => {
                Ok(Value::Scalar(self.read_scalar(field, tag, source)?))
            }
            FieldType::Str => {
                let encoding = field
                    .encoding
                    .unwrap_or(self.settings.default_string_encoding);
                let bytes = match field.size {
                    Some(Size::Fixed(n)) => {
                        source.take(field, encoded_len(n, encoding).unwrap_or(usize::MAX))?
                    }
                    _ => source.take_rest(field)?,
                };
                Ok(Value::Str(decode_string(&bytes, encoding)))
            }
            FieldType::Bytes => {
                let bytes = match field.required_size()? {
                    Size::Fixed(n) => source.take(field, n)?,
                    Size::Remaining => source.take_rest(field)?,
                };
                Ok(Value::Bytes(bytes))
            }
            FieldType::Array(element) => {
                let width = element_width(&self.registry, field, element)?;
                let count = match field.size {
                    Some(Size::Fixed(count)) => count,
                    _ => source.unbounded(field)? / width,
                };

                let mut items = Vec::with_capacity(count.min(source.remaining()? / width));
                for index in 0..count {
                    let item = self
                        .read_element(field, element, source, depth)
                        .map_err(|e| e.in_array(field.name, index))?;
                    items.push(item);
                }
                Ok(Value::Array(items))
            }
            FieldType::Record(record_type) => {
                Ok(Value::Record(self.read_record(record_type, source, depth + 1)?))
            }
        }
    }

    fn read_element<R: Read + Seek>(
        &self,
        field: &FieldDescriptor,
        element: ElementType,
        source: &mut Source<'_, R>,
        depth: usize,
    ) -> Result<Value> {
        match element {
            ElementType::Scalar(tag) | ElementType::Enum(tag) => {
                Ok(Value::Scalar(self.read_scalar(field, tag, source)?))
            }
            ElementType::Record(record_type) => {
                Ok(Value::Record(self.read_record(record_type, source, depth + 1)?))
            }
        }
    }

    fn read_scalar<R: Read + Seek>(
        &self,
        field: &FieldDescriptor,
        tag: TypeTag,
        source: &mut Source<'_, R>,
    ) -> Result<Scalar> {
        let codec = self.registry.get(tag)?;
        let bytes = source.take(field, codec.width)?;
        Ok((codec.decode)(&bytes))
    }
}

/// Writer wrapper counting bytes written.
struct Sink<'w, W> {
    writer: &'w mut W,
    written: u64,
}

impl<'w, W: Write> Sink<'w, W> {
    fn new(writer: &'w mut W) -> Self {
        Self { writer, written: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

/// Reader wrapper bounded by the stream length at construction.
struct Source<'r, R> {
    reader: &'r mut R,
    start: u64,
    end: u64,
    limit: usize,
}

impl<'r, R: Read + Seek> Source<'r, R> {
    fn new(reader: &'r mut R, limit: usize) -> Result<Self> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;
        Ok(Self {
            reader,
            start,
            end,
            limit,
        })
    }

    fn position(&mut self) -> Result<u64> {
        Ok(self.reader.stream_position()?)
    }

    fn remaining(&mut self) -> Result<usize> {
        let position = self.position()?;
        Ok(usize::try_from(self.end.saturating_sub(position)).unwrap_or(usize::MAX))
    }

    fn consumed(&mut self) -> Result<u64> {
        Ok(self.position()?.saturating_sub(self.start))
    }

    /// Remaining length, checked against the unbounded read limit.
    fn unbounded(&mut self, field: &FieldDescriptor) -> Result<usize> {
        let len = self.remaining()?;
        if len > self.limit {
            return Err(CodecError::ReadLimitExceeded {
                field: field.name,
                len,
                limit: self.limit,
            });
        }
        Ok(len)
    }

    fn take(&mut self, field: &FieldDescriptor, len: usize) -> Result<Vec<u8>> {
        let position = self.position()?;
        let available = self.remaining()?;
        let malformed = || CodecError::MalformedBuffer {
            field: field.name,
            offset: usize::try_from(position).unwrap_or(usize::MAX),
            needed: len,
            available,
        };
        if len > available {
            return Err(malformed());
        }

        let mut bytes = vec![0u8; len];
        self.reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => malformed(),
            _ => CodecError::Io(e),
        })?;
        Ok(bytes)
    }

    fn take_rest(&mut self, field: &FieldDescriptor) -> Result<Vec<u8>> {
        let len = self.unbounded(field)?;
        self.take(field, len)
    }
}
