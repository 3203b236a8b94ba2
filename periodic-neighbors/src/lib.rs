#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate, clippy::comparison_chain)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unreadable_literal, clippy::option_if_let_else, clippy::range_plus_one)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]
#![allow(clippy::default_trait_access)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

//! Construction of neighbor lists for atomic structures with periodic
//! boundary conditions.
//!
//! Start by creating a [`Geometry`](geometry::Geometry) from a
//! [`UnitCell`](geometry::UnitCell), atomic positions and cutoffs, and then
//! compute the [`NeighborList`](neighbors::NeighborList) of this geometry.
//! When the atoms move a little, a
//! [`NeighborListCache`](neighbors::NeighborListCache) avoids re-computing
//! the neighbor list from scratch.

pub mod types;
pub use types::*;

mod errors;
pub use self::errors::Error;

pub mod elements;

pub mod geometry;
pub use geometry::{Geometry, UnitCell, Cutoffs, PairCutoffMode, SpeciesCutoffs};

pub mod neighbors;
pub use neighbors::{NeighborList, NeighborListCache, NeighborListOptions, PairRecord, CellShift};

pub mod analysis;
