//! Periodic neighbor list construction.
//!
//! The neighbor search goes through the following steps:
//!
//! - [`CellBinning`] sorts atoms into bins at least as large as the search
//!   radius;
//! - [`ImageBounds`] determines how many periodic images of the cell must be
//!   considered along each periodic direction;
//! - for each atom, the neighboring bins (including their periodic images) are
//!   searched for pairs within the cutoff;
//! - the resulting pairs are stored in a [`NeighborList`].
//!
//! [`NeighborListCache`] keeps a neighbor list alive across small changes in
//! atomic positions, using a skin distance.
use crate::{Matrix3, Vector3D};

mod options;
pub use self::options::{NeighborListOptions, ImageConvention};
pub use self::options::{DEFAULT_MAX_IMAGE_REPEATS, MAX_IMAGE_REPEATS_LIMIT};

mod binning;
pub use self::binning::{CellBinning, BinnedAtom};

mod images;
pub use self::images::ImageBounds;

mod pairs;

mod list;
pub use self::list::{NeighborList, PairRecord};

mod cache;
pub use self::cache::{NeighborListCache, UpdateStatus};

/// A cell shift represents the displacement along cell vectors between the
/// actual position of an atom and a periodic image of this atom.
///
/// The shift `[n1, n2, n3]` corresponds to a displacement of `n1 * a + n2 * b
/// + n3 * c`, where `a, b, c` are the cell vectors. Shifts along non-periodic
/// directions are always zero.
///
/// Shifts are ordered lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellShift([i32; 3]);

impl CellShift {
    /// Create a new cell shift with the given components
    pub const fn new(n1: i32, n2: i32, n3: i32) -> CellShift {
        CellShift([n1, n2, n3])
    }

    /// The zero shift, corresponding to the primary image
    pub const fn zero() -> CellShift {
        CellShift([0, 0, 0])
    }

    /// Is this the zero shift?
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0]
    }

    /// Compute the shift vector in cartesian coordinates, using the given cell
    /// matrix (stored in row major order).
    #[inline]
    pub fn cartesian(&self, cell: &Matrix3) -> Vector3D {
        let x = cell[0][0] * self[0] as f64 + cell[1][0] * self[1] as f64 + cell[2][0] * self[2] as f64;
        let y = cell[0][1] * self[0] as f64 + cell[1][1] * self[1] as f64 + cell[2][1] * self[2] as f64;
        let z = cell[0][2] * self[0] as f64 + cell[1][2] * self[1] as f64 + cell[2][2] * self[2] as f64;
        Vector3D::new(x, y, z)
    }
}

impl From<[i32; 3]> for CellShift {
    fn from(shift: [i32; 3]) -> CellShift {
        CellShift(shift)
    }
}

impl From<CellShift> for [i32; 3] {
    fn from(shift: CellShift) -> [i32; 3] {
        shift.0
    }
}

impl std::ops::Add<CellShift> for CellShift {
    type Output = CellShift;

    fn add(mut self, rhs: CellShift) -> Self::Output {
        self.0[0] += rhs[0];
        self.0[1] += rhs[1];
        self.0[2] += rhs[2];
        return self;
    }
}

impl std::ops::Sub<CellShift> for CellShift {
    type Output = CellShift;

    fn sub(mut self, rhs: CellShift) -> Self::Output {
        self.0[0] -= rhs[0];
        self.0[1] -= rhs[1];
        self.0[2] -= rhs[2];
        return self;
    }
}

impl std::ops::Neg for CellShift {
    type Output = CellShift;

    fn neg(self) -> Self::Output {
        CellShift([-self[0], -self[1], -self[2]])
    }
}

impl std::ops::Index<usize> for CellShift {
    type Output = i32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Vector between atoms `first` and `second`, where the `second` atom is
/// displaced by `shift`. Every distance in this module goes through this
/// function, so that all code paths produce bitwise identical results.
#[inline]
pub(crate) fn pair_vector(positions: &[Vector3D], cell: &Matrix3, first: usize, second: usize, shift: CellShift) -> Vector3D {
    let mut vector = positions[second] - positions[first];
    vector += shift.cartesian(cell);
    return vector;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_shift() {
        let a = CellShift::new(1, -2, 0);
        let b = CellShift::from([0, 1, 3]);

        assert_eq!(a + b, CellShift::new(1, -1, 3));
        assert_eq!(a - b, CellShift::new(1, -3, -3));
        assert_eq!(-a, CellShift::new(-1, 2, 0));
        assert!(CellShift::zero().is_zero());
        assert!(!a.is_zero());

        // lexicographic ordering
        assert!(CellShift::new(-1, 5, 5) < CellShift::new(0, -5, -5));
        assert!(CellShift::new(0, 0, -1) < CellShift::zero());

        let cell = Matrix3::new([
            [2.0, 0.0, 0.0],
            [1.0, 3.0, 0.0],
            [0.0, 0.0, 4.0],
        ]);
        assert_eq!(a.cartesian(&cell), Vector3D::new(0.0, -6.0, 0.0));
        assert_eq!(b.cartesian(&cell), Vector3D::new(1.0, 3.0, 12.0));
    }
}
