#![no_main]

use layout_codec::config::CodecSettings;
use layout_codec::core::layout::{unknown_field, ElementType, FieldDescriptor, Record};
use layout_codec::core::primitives::{new_primitive_registry, F64, U16, U64};
use layout_codec::core::stream::SequentialCodec;
use layout_codec::core::tag::TypeTag;
use layout_codec::core::value::{Value, ValueRef};
use layout_codec::error::Result;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

#[derive(Debug, Default)]
struct Point {
    x: f64,
    y: f64,
}

impl Record for Point {
    const TYPE: TypeTag = TypeTag::new("fuzz-point");
    const SIZE: Option<usize> = Some(16);

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("x", F64),
            FieldDescriptor::scalar("y", F64),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "x" => Some(self.x.into()),
            "y" => Some(self.y.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "x" => self.x = value.into_scalar()?,
            "y" => self.y = value.into_scalar()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Track {
    id: u64,
    kind: u16,
    name: String,
    digest: Vec<u8>,
    points: Vec<Point>,
}

impl Record for Track {
    const TYPE: TypeTag = TypeTag::new("fuzz-track");

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("id", U64),
            FieldDescriptor::scalar("kind", U16),
            FieldDescriptor::string("name").size(16),
            FieldDescriptor::bytes("digest").size(8),
            FieldDescriptor::records::<Point>("points"),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "id" => Some(self.id.into()),
            "kind" => Some(self.kind.into()),
            "name" => Some((&self.name).into()),
            "digest" => Some((&self.digest).into()),
            "points" => Some(ValueRef::records(&self.points)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            "kind" => self.kind = value.into_scalar()?,
            "name" => self.name = value.into_string()?,
            "digest" => self.digest = value.into_bytes()?,
            "points" => self.points = value.into_records()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    // Small read cap so oversized inferred reads are rejected quickly
    let settings = CodecSettings {
        max_unbounded_read: 4096,
        ..CodecSettings::default()
    };
    let codec = SequentialCodec::with_registry(new_primitive_registry(), settings);

    let _ = codec.from_bytes::<Track>(data, 0);
    let _ = codec.decode_array(ElementType::Scalar(U16), &mut Cursor::new(data));
});
