//! Structural elements module

mod dof;
mod element;
mod node;
mod section;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use dof::DegreeOfFreedom;
pub use element::{Element, ElementKind, UniDimensional, DEFAULT_ELASTICITY_MODULUS};
pub use node::{Direction, Node};
pub use section::Section;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the object in its owning structure (creation order)
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0 + 1)
            }
        }
    };
}

arena_id!(
    /// Identity of a degree of freedom, allocated in creation order by its structure
    DofId,
    "D"
);
arena_id!(
    /// Identity of a node
    NodeId,
    "N"
);
arena_id!(
    /// Identity of an element
    ElementId,
    "E"
);
