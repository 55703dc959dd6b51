//! # Core Codec Components
//!
//! Type resolution, primitive encoders and the two record codecs.
//!
//! ## Components
//! - **Tag**: static type identities with a declared base relation
//! - **Registry**: handler lookup with ancestor walk and memoization
//! - **Primitives**: width/encode/decode table for scalar kinds
//! - **Layout**: field descriptors and the `Record` metadata trait
//! - **Fixed**: absolute-offset packet codec
//! - **Stream**: sequential declaration-order codec
//! - **Codec**: Tokio framing for fixed-size records
//!
//! ## Fixed Layout
//! ```text
//! base + offset(field 0) -> [field 0 bytes]
//! base + offset(field 1) -> [field 1 bytes]
//! ...
//! ```
//!
//! ## Stream Layout
//! ```text
//! [field 0][field 1][nested field 0][nested field 1]...[trailing array]
//! ```

pub mod codec;
pub mod fixed;
pub mod layout;
pub mod primitives;
pub mod registry;
pub mod stream;
pub mod tag;
mod text;
pub mod value;
