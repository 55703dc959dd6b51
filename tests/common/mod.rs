//! Record types shared by the integration tests.

#![allow(dead_code)]

use layout_codec::core::layout::{unknown_field, ElementType, FieldDescriptor, Record};
use layout_codec::core::primitives::{BOOL, F32, I32, IPV4, U16, U32, U8};
use layout_codec::core::tag::TypeTag;
use layout_codec::core::value::{Value, ValueRef};
use layout_codec::error::{CodecError, Result};
use std::net::Ipv4Addr;

/// Port numbers travel as `u16` through the derived tag.
pub const PORT: TypeTag = TypeTag::derived("port", &U16);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    Active,
    Fault,
}

impl Mode {
    pub fn to_raw(self) -> u8 {
        match self {
            Mode::Idle => 0,
            Mode::Active => 1,
            Mode::Fault => 2,
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value.into_scalar::<u8>()? {
            0 => Ok(Mode::Idle),
            1 => Ok(Mode::Active),
            2 => Ok(Mode::Fault),
            other => Err(CodecError::InvalidEnumValue {
                type_name: "mode",
                value: other.into(),
            }),
        }
    }
}

/// 12-byte vector usable as an array element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Record for Vector3 {
    const TYPE: TypeTag = TypeTag::new("vector3");
    const SIZE: Option<usize> = Some(12);

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("x", F32).at(0),
            FieldDescriptor::scalar("y", F32).at(4),
            FieldDescriptor::scalar("z", F32).at(8),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "x" => Some(self.x.into()),
            "y" => Some(self.y.into()),
            "z" => Some(self.z.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "x" => self.x = value.into_scalar()?,
            "y" => self.y = value.into_scalar()?,
            "z" => self.z = value.into_scalar()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

/// Wire packet header, 28 bytes.
///
/// ```text
/// 0 version | 1 mode | 2..4 length (BE) | 4..8 source | 8..10 port (BE)
/// 10..18 name | 18..24 mac | 24..28 sequence (optional)
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketHeader {
    pub version: u8,
    pub mode: Mode,
    pub length: u16,
    pub source: Option<Ipv4Addr>,
    pub port: u16,
    pub name: String,
    pub mac: Vec<u8>,
    pub sequence: Option<u32>,
}

impl Record for PacketHeader {
    const TYPE: TypeTag = TypeTag::new("packet-header");
    const SIZE: Option<usize> = Some(28);

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("version", U8).at(0),
            FieldDescriptor::enumeration("mode", U8).at(1),
            FieldDescriptor::scalar("length", U16).at(2).big_endian(),
            FieldDescriptor::scalar("source", IPV4).at(4),
            FieldDescriptor::scalar("port", PORT).at(8).big_endian(),
            FieldDescriptor::string("name").at(10).size(8),
            FieldDescriptor::bytes("mac").at(18).size(6),
            FieldDescriptor::scalar("sequence", U32).at(24),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "version" => Some(self.version.into()),
            "mode" => Some(self.mode.to_raw().into()),
            "length" => Some(self.length.into()),
            "source" => self.source.map(ValueRef::from),
            "port" => Some(self.port.into()),
            "name" => Some((&self.name).into()),
            "mac" => Some((&self.mac).into()),
            "sequence" => self.sequence.map(ValueRef::from),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "version" => self.version = value.into_scalar()?,
            "mode" => self.mode = Mode::from_value(value)?,
            "length" => self.length = value.into_scalar()?,
            "source" => self.source = Some(value.into_scalar()?),
            "port" => self.port = value.into_scalar()?,
            "name" => self.name = value.into_string()?,
            "mac" => self.mac = value.into_bytes()?,
            "sequence" => self.sequence = Some(value.into_scalar()?),
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

impl PacketHeader {
    pub fn sample() -> Self {
        Self {
            version: 2,
            mode: Mode::Active,
            length: 0x0102,
            source: Some(Ipv4Addr::new(10, 0, 0, 7)),
            port: 443,
            name: "probe".into(),
            mac: vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x01],
            sequence: Some(99),
        }
    }
}

/// Fixed layout with a nested header and an inferred trailing array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Telemetry {
    pub header: PacketHeader,
    pub origin: Vector3,
    pub samples: Vec<i32>,
}

impl Record for Telemetry {
    const TYPE: TypeTag = TypeTag::new("telemetry");

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::record::<PacketHeader>("header").at(0),
            FieldDescriptor::record::<Vector3>("origin").at(28),
            FieldDescriptor::array("samples", ElementType::Scalar(I32)).at(40),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "header" => Some(ValueRef::record(&self.header)),
            "origin" => Some(ValueRef::record(&self.origin)),
            "samples" => Some(ValueRef::scalars(&self.samples)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "header" => self.header = value.into_record()?,
            "origin" => self.origin = value.into_record()?,
            "samples" => self.samples = value.into_vec()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

/// Stream record exercising every field kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub id: u32,
    pub active: bool,
    pub handle: String,
    pub initials: String,
    pub mode: Mode,
    pub home: Vector3,
    pub token: Vec<u8>,
    pub waypoints: Vec<Vector3>,
}

impl Record for Profile {
    const TYPE: TypeTag = TypeTag::new("profile");

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("id", U32),
            FieldDescriptor::scalar("active", BOOL),
            FieldDescriptor::string("handle").size(10),
            FieldDescriptor::string("initials").size(3).unicode(),
            FieldDescriptor::enumeration("mode", U8),
            FieldDescriptor::record::<Vector3>("home"),
            FieldDescriptor::bytes("token").size(4),
            FieldDescriptor::records::<Vector3>("waypoints"),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "id" => Some(self.id.into()),
            "active" => Some(self.active.into()),
            "handle" => Some((&self.handle).into()),
            "initials" => Some((&self.initials).into()),
            "mode" => Some(self.mode.to_raw().into()),
            "home" => Some(ValueRef::record(&self.home)),
            "token" => Some((&self.token).into()),
            "waypoints" => Some(ValueRef::records(&self.waypoints)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            "active" => self.active = value.into_scalar()?,
            "handle" => self.handle = value.into_string()?,
            "initials" => self.initials = value.into_string()?,
            "mode" => self.mode = Mode::from_value(value)?,
            "home" => self.home = value.into_record()?,
            "token" => self.token = value.into_bytes()?,
            "waypoints" => self.waypoints = value.into_records()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

impl Profile {
    pub fn sample() -> Self {
        Self {
            id: 4242,
            active: true,
            handle: "walker".into(),
            initials: "JW".into(),
            mode: Mode::Fault,
            home: Vector3 {
                x: 1.5,
                y: -2.0,
                z: 0.25,
            },
            token: vec![9, 8, 7, 6],
            waypoints: vec![
                Vector3 {
                    x: 1.0,
                    y: 2.0,
                    z: 3.0,
                },
                Vector3 {
                    x: -1.0,
                    y: -2.0,
                    z: -3.0,
                },
            ],
        }
    }
}

/// Stream record with a field that may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub id: u16,
    pub priority: Option<u16>,
    pub flags: u16,
}

impl Record for Note {
    const TYPE: TypeTag = TypeTag::new("note");

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("id", U16),
            FieldDescriptor::scalar("priority", U16),
            FieldDescriptor::scalar("flags", U16),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "id" => Some(self.id.into()),
            "priority" => self.priority.map(ValueRef::from),
            "flags" => Some(self.flags.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            "priority" => self.priority = Some(value.into_scalar()?),
            "flags" => self.flags = value.into_scalar()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

/// Record with a derived, read-only checksum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sealed {
    pub id: u32,
}

impl Sealed {
    pub fn checksum(&self) -> u32 {
        self.id ^ 0xffff_ffff
    }
}

impl Record for Sealed {
    const TYPE: TypeTag = TypeTag::new("sealed");

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("id", U32).at(0),
            FieldDescriptor::scalar("checksum", U32).at(4).read_only(),
        ]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        match field {
            "id" => Some(self.id.into()),
            "checksum" => Some(self.checksum().into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}

/// String field with no size declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unsized {
    pub label: String,
}

impl Record for Unsized {
    const TYPE: TypeTag = TypeTag::new("unsized");

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::string("label").at(0)]
    }

    fn get(&self, field: &str) -> Option<ValueRef<'_>> {
        (field == "label").then(|| (&self.label).into())
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "label" => self.label = value.into_string()?,
            other => return Err(unknown_field::<Self>(other)),
        }
        Ok(())
    }
}
