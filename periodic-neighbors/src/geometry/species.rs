use indexmap::IndexMap;

use crate::{Error, elements};
use super::Cutoffs;

/// Mapping from atomic types to cutoff radius, used to create per-atom
/// [`Cutoffs`] from the list of atomic types in a structure.
///
/// Atomic types are integers, usually (but not necessarily) the atomic
/// number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesCutoffs {
    radii: IndexMap<i32, f64>,
}

impl SpeciesCutoffs {
    /// Create an empty mapping
    pub fn new() -> SpeciesCutoffs {
        SpeciesCutoffs::default()
    }

    /// Create a mapping using the covalent radius of all known elements,
    /// scaled by `multiplier`, with atomic types being atomic numbers.
    pub fn natural(multiplier: f64) -> Result<SpeciesCutoffs, Error> {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "the covalent radii multiplier must be positive, got {}", multiplier
            )));
        }

        let mut species = SpeciesCutoffs::new();
        for atomic_number in 1..=(elements::KNOWN_ELEMENTS as i32) {
            let radius = elements::covalent_radius(atomic_number).expect("missing covalent radius");
            species.radii.insert(atomic_number, multiplier * radius);
        }
        return Ok(species);
    }

    /// Set the cutoff radius for the given atomic type, overriding any
    /// previous value.
    pub fn set(&mut self, atomic_type: i32, radius: f64) -> Result<(), Error> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "cutoffs must be positive and finite, got {} for atomic type {}",
                radius, atomic_type
            )));
        }
        self.radii.insert(atomic_type, radius);
        Ok(())
    }

    /// Set the cutoff radius for the element with the given `symbol`, using
    /// the atomic number as atomic type.
    pub fn set_element(&mut self, symbol: &str, radius: f64) -> Result<(), Error> {
        let atomic_number = elements::atomic_number(symbol).ok_or_else(|| Error::InvalidParameter(
            format!("unknown element '{}'", symbol)
        ))?;
        self.set(atomic_number, radius)
    }

    /// Get the cutoff radius for the given atomic type, if any
    pub fn get(&self, atomic_type: i32) -> Option<f64> {
        self.radii.get(&atomic_type).copied()
    }

    /// Get the number of atomic types in this mapping
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    /// Is this mapping empty?
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// Get the per-atom cutoffs for a structure containing atoms with the
    /// given `types`.
    pub fn per_atom(&self, types: &[i32]) -> Result<Cutoffs, Error> {
        let cutoffs = types.iter()
            .map(|&atomic_type| self.get(atomic_type).ok_or_else(|| Error::InvalidGeometry(
                format!("missing cutoff for atomic type {}", atomic_type)
            )))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(Cutoffs::PerAtom(cutoffs));
    }
}
