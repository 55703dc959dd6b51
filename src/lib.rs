//! # Layout Codec
//!
//! Declarative binary codecs for typed records.
//!
//! Records describe their fields once through the [`Record`](crate::core::layout::Record)
//! trait. Two codecs consume that description:
//!
//! - [`FixedLayoutCodec`](crate::core::fixed::FixedLayoutCodec) packs fields at absolute
//!   byte offsets with explicit sizes and optional big-endian fields, for wire packets.
//! - [`SequentialCodec`](crate::core::stream::SequentialCodec) writes fields back to back in
//!   declaration order, for object graphs on a stream.
//!
//! Both resolve per-field handlers through a
//! [`TypeHandlerRegistry`](crate::core::registry::TypeHandlerRegistry) seeded with the
//! primitive codec table. Unregistered types resolve to their nearest registered
//! ancestor, and the resolution is memoized.
//!
//! ## Example
//! ```rust
//! use layout_codec::core::fixed::FixedLayoutCodec;
//! use layout_codec::core::layout::{unknown_field, FieldDescriptor, Record};
//! use layout_codec::core::primitives::{IPV4, U16};
//! use layout_codec::core::tag::TypeTag;
//! use layout_codec::core::value::{Value, ValueRef};
//! use layout_codec::error::Result;
//! use std::net::Ipv4Addr;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Endpoint {
//!     address: Option<Ipv4Addr>,
//!     port: u16,
//!     name: String,
//! }
//!
//! impl Record for Endpoint {
//!     const TYPE: TypeTag = TypeTag::new("endpoint");
//!
//!     fn fields() -> Vec<FieldDescriptor> {
//!         vec![
//!             FieldDescriptor::scalar("address", IPV4).at(0),
//!             FieldDescriptor::scalar("port", U16).at(4).big_endian(),
//!             FieldDescriptor::string("name").at(6).size(8),
//!         ]
//!     }
//!
//!     fn get(&self, field: &str) -> Option<ValueRef<'_>> {
//!         match field {
//!             "address" => self.address.map(ValueRef::from),
//!             "port" => Some(self.port.into()),
//!             "name" => Some((&self.name).into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Value) -> Result<()> {
//!         match field {
//!             "address" => self.address = Some(value.into_scalar()?),
//!             "port" => self.port = value.into_scalar()?,
//!             "name" => self.name = value.into_string()?,
//!             other => return Err(unknown_field::<Self>(other)),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let codec = FixedLayoutCodec::default();
//! let endpoint = Endpoint {
//!     address: Some(Ipv4Addr::LOCALHOST),
//!     port: 8080,
//!     name: "local".into(),
//! };
//!
//! let bytes = codec.to_vec(&endpoint)?;
//! assert_eq!(&bytes[..6], &[127, 0, 0, 1, 0x1f, 0x90]);
//! assert_eq!(codec.decode::<Endpoint>(&bytes, 0)?, endpoint);
//! # Ok::<(), layout_codec::error::CodecError>(())
//! ```
//!
//! ## Modules
//! - [`core`](crate::core): type tags, registry, primitive table, layout metadata and both codecs
//! - [`config`]: TOML/environment configuration
//! - [`error`]: the [`CodecError`](error::CodecError) type
//! - [`utils`]: logging setup and metrics

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::{CodecConfig, CodecSettings};
pub use crate::core::fixed::FixedLayoutCodec;
pub use crate::core::layout::{FieldDescriptor, Record};
pub use crate::core::stream::SequentialCodec;
pub use crate::core::tag::TypeTag;
pub use crate::error::{CodecError, Result};
