//! Stable, well-separated colors for string identifiers.
//!
//! ```
//! use colorid::AllocationSet;
//!
//! let mut set = AllocationSet::new();
//! let alice = set.color_for("alice");
//! set.color_for("bob");
//! assert_eq!(set.color_for("alice"), alice);
//! assert!(alice.to_hex().starts_with('#'));
//! ```
pub mod color;
pub mod palette;
pub mod set;

pub use color::{Color, ParseColorError};
pub use palette::{Band, Curve, DimRamp, Palette, PaletteError};
pub use set::{AllocationSet, Entry, Gap};
