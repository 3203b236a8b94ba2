use std::sync::Arc;

use crate::{Error, Vector3D};

mod cell;
pub use self::cell::UnitCell;

mod species;
pub use self::species::SpeciesCutoffs;

/// Interaction cutoff radii for the atoms in a [`Geometry`]
#[derive(Debug, Clone, PartialEq)]
pub enum Cutoffs {
    /// The same cutoff for all atoms
    Uniform(f64),
    /// One cutoff for each atom, in the same order as the positions
    PerAtom(Vec<f64>),
}

impl From<f64> for Cutoffs {
    fn from(cutoff: f64) -> Cutoffs {
        Cutoffs::Uniform(cutoff)
    }
}

impl From<Vec<f64>> for Cutoffs {
    fn from(cutoffs: Vec<f64>) -> Cutoffs {
        Cutoffs::PerAtom(cutoffs)
    }
}

impl Cutoffs {
    fn validate(&self, n_atoms: usize) -> Result<(), Error> {
        let check = |cutoff: f64| {
            if cutoff > 0.0 && cutoff.is_finite() {
                Ok(())
            } else {
                Err(Error::InvalidGeometry(format!(
                    "cutoffs must be positive and finite, got {}", cutoff
                )))
            }
        };

        match self {
            Cutoffs::Uniform(cutoff) => check(*cutoff),
            Cutoffs::PerAtom(cutoffs) => {
                if cutoffs.len() != n_atoms {
                    return Err(Error::InvalidGeometry(format!(
                        "expected {} cutoffs (one per atom), got {}", n_atoms, cutoffs.len()
                    )));
                }
                cutoffs.iter().try_for_each(|&c| check(c))
            }
        }
    }
}

/// How to combine the cutoffs of two atoms into the cutoff for a pair.
///
/// Codes disagree on the convention, so both are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PairCutoffMode {
    /// Use the largest of the two cutoffs, `max(c_i, c_j)`
    #[default]
    Max,
    /// Use the sum of the two cutoffs, `c_i + c_j`. This is the convention
    /// when cutoffs are atomic radii.
    Sum,
}

impl PairCutoffMode {
    /// Combine the two cutoffs `first` and `second`
    #[inline]
    pub fn combine(self, first: f64, second: f64) -> f64 {
        match self {
            PairCutoffMode::Max => f64::max(first, second),
            PairCutoffMode::Sum => first + second,
        }
    }
}

/// A `Geometry` contains everything needed to compute a neighbor list: the
/// unit cell with its periodic boundary conditions, the atomic positions and
/// the cutoff radius of each atom.
///
/// The index of an atom in the positions is the identity of this atom. A
/// `Geometry` is immutable, changing atomic positions creates a new value with
/// [`Geometry::with_positions`].
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    cell: UnitCell,
    positions: Vec<Vector3D>,
    cutoffs: Arc<Cutoffs>,
}

impl Geometry {
    /// Create a new `Geometry` after validating the input data.
    ///
    /// This fails with `Error::InvalidGeometry` if a cutoff is not strictly
    /// positive, if the number of per-atom cutoffs does not match the number
    /// of positions, or if some positions are not finite. Singular periodic
    /// cells are already rejected by [`UnitCell::new`].
    pub fn new(cell: UnitCell, positions: Vec<Vector3D>, cutoffs: impl Into<Cutoffs>) -> Result<Geometry, Error> {
        let cutoffs = cutoffs.into();
        cutoffs.validate(positions.len())?;
        check_positions(&positions)?;

        return Ok(Geometry {
            cell: cell,
            positions: positions,
            cutoffs: Arc::new(cutoffs),
        });
    }

    /// Create a new `Geometry` with the same unit cell and cutoffs as this
    /// one, but different atomic positions. The number of atoms must stay the
    /// same.
    pub fn with_positions(&self, positions: Vec<Vector3D>) -> Result<Geometry, Error> {
        if positions.len() != self.size() {
            return Err(Error::InvalidGeometry(format!(
                "expected {} positions, got {}", self.size(), positions.len()
            )));
        }
        check_positions(&positions)?;

        return Ok(Geometry {
            cell: self.cell,
            positions: positions,
            cutoffs: Arc::clone(&self.cutoffs),
        });
    }

    /// Get the number of atoms in this geometry
    pub fn size(&self) -> usize {
        self.positions.len()
    }

    /// Get the unit cell of this geometry
    pub fn cell(&self) -> &UnitCell {
        &self.cell
    }

    /// Get the periodic boundary conditions along the three cell vectors
    pub fn periodic(&self) -> [bool; 3] {
        self.cell.periodic()
    }

    /// Get the positions of all atoms
    pub fn positions(&self) -> &[Vector3D] {
        &self.positions
    }

    /// Get the position of the atom at index `atom`
    pub fn position(&self, atom: usize) -> Vector3D {
        self.positions[atom]
    }

    /// Get the cutoffs of this geometry
    pub fn cutoffs(&self) -> &Cutoffs {
        &self.cutoffs
    }

    /// Get the cutoff radius of the atom at index `atom`
    #[inline]
    pub fn cutoff(&self, atom: usize) -> f64 {
        match &*self.cutoffs {
            Cutoffs::Uniform(cutoff) => *cutoff,
            Cutoffs::PerAtom(cutoffs) => cutoffs[atom],
        }
    }

    /// Get the effective cutoff for the pair between atoms `first` and
    /// `second`, using the given `mode`.
    #[inline]
    pub fn pair_cutoff(&self, first: usize, second: usize, mode: PairCutoffMode) -> f64 {
        mode.combine(self.cutoff(first), self.cutoff(second))
    }

    /// Get the largest pair cutoff over all possible pairs, including pairs
    /// between an atom and its own periodic images.
    pub fn max_pair_cutoff(&self, mode: PairCutoffMode) -> f64 {
        let max = match &*self.cutoffs {
            Cutoffs::Uniform(cutoff) => *cutoff,
            Cutoffs::PerAtom(cutoffs) => cutoffs.iter().copied().fold(0.0, f64::max),
        };
        return mode.combine(max, max);
    }
}

fn check_positions(positions: &[Vector3D]) -> Result<(), Error> {
    if let Some(atom) = positions.iter().position(|p| !p.is_finite()) {
        return Err(Error::InvalidGeometry(format!(
            "the position of atom {} is not finite", atom
        )));
    }
    Ok(())
}
