#![no_main]

use layout_codec::core::fixed::FixedLayoutCodec;
use layout_codec::core::layout::{unknown_field, ElementType, FieldDescriptor, Record};
use layout_codec::core::primitives::{I16, IPV4, U32, U8};
use layout_codec::core::tag::TypeTag;
use layout_codec::core::value::{Value, ValueRef};
use layout_codec::error::Result;
use libfuzzer_sys::fuzz_target;
use std::net::Ipv4Addr;

#[derive(Debug, Default)]
struct Datagram {
    flags: u8,
    source: Option<Ipv4Addr>,
    stamp: u32,
    label: String,
    readings: Vec<i16>,
}

impl Record for Datagram {
    const TYPE: TypeTag = TypeTag::new("fuzz-datagram");

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("flags", U8).at(0),
            FieldDescriptor::scalar("source", IPV4).at(1),
            FieldDescriptor::scalar("stamp", U32).at(5).big_endian(),
            FieldDescriptor::string("label").at(9).size(12).unicode(),
            FieldDescriptor::array("readings", ElementType::Scalar(I16)).at(33),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "flags" => Some(self.flags.into()),
            "source" => self.source.map(Into::into),
            "stamp" => Some(self.stamp.into()),
            "label" => Some((&self.label).into()),
            "readings" => Some(ValueRef::scalars(&self.readings)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "flags" => self.flags = value.into_scalar()?,
            "source" => self.source = Some(value.into_scalar()?),
            "stamp" => self.stamp = value.into_scalar()?,
            "label" => self.label = value.into_string()?,
            "readings" => self.readings = value.into_vec()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    // Decoding must reject short or odd-sized regions without panicking
    let codec = FixedLayoutCodec::default();
    let base = data.first().map_or(0, |b| usize::from(*b % 8));
    if let Ok(datagram) = codec.decode::<Datagram>(data, base) {
        let mut out = vec![0u8; data.len()];
        let _ = codec.encode(&datagram, &mut out, base);
    }
});
