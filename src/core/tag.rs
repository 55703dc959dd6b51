//! Static type identities.
//!
//! A [`TypeTag`] names a type and optionally declares the type it derives
//! from. Every tag implicitly descends from [`TypeTag::OBJECT`], so walking
//! the ancestors of any tag always ends at the root.
//!
//! ```rust
//! use layout_codec::core::primitives::U16;
//! use layout_codec::core::tag::TypeTag;
//!
//! const PORT: TypeTag = TypeTag::derived("port", &U16);
//!
//! let chain: Vec<&str> = PORT.ancestors().map(|t| t.name()).collect();
//! assert_eq!(chain, ["port", "u16", "object"]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a type known to the codecs.
///
/// Tags compare and hash by name, so names must be unique per process.
#[derive(Clone, Copy)]
pub struct TypeTag {
    name: &'static str,
    base: Option<&'static TypeTag>,
}

impl TypeTag {
    /// Root of every type hierarchy.
    pub const OBJECT: TypeTag = TypeTag {
        name: "object",
        base: None,
    };

    /// A tag whose only ancestor is [`TypeTag::OBJECT`].
    pub const fn new(name: &'static str) -> Self {
        Self { name, base: None }
    }

    /// A tag deriving from `base`.
    pub const fn derived(name: &'static str, base: &'static TypeTag) -> Self {
        Self {
            name,
            base: Some(base),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_root(&self) -> bool {
        self.base.is_none() && self.name == Self::OBJECT.name
    }

    /// The immediate base type, `None` only for the root.
    pub fn base(&self) -> Option<TypeTag> {
        match self.base {
            Some(base) => Some(*base),
            None if self.is_root() => None,
            None => Some(Self::OBJECT),
        }
    }

    /// Iterates this tag followed by each ancestor up to the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: Some(*self) }
    }

    /// Whether `other` appears in this tag's ancestor chain (itself included).
    pub fn is_a(&self, other: TypeTag) -> bool {
        self.ancestors().any(|tag| tag == other)
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a tag and its ancestors, most derived first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<TypeTag>,
}

impl Iterator for Ancestors {
    type Item = TypeTag;

    fn next(&mut self) -> Option<TypeTag> {
        let current = self.next?;
        self.next = current.base();
        Some(current)
    }
}
