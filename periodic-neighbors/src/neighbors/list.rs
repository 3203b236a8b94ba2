use crate::{Error, Vector3D};
use crate::geometry::{Geometry, UnitCell, PairCutoffMode};

use super::{CellShift, NeighborListOptions};
use super::pair_vector;
use super::pairs::enumerate_pairs;

/// A single pair in a [`NeighborList`]. The vector between the atoms can be
/// constructed as `position[second] - position[first] + shift.cartesian(cell)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRecord {
    /// index of the first atom in the pair
    pub first: usize,
    /// index of the second atom in the pair
    pub second: usize,
    /// number of cell vectors to add to the position of the second atom
    pub shift: CellShift,
    /// distance between the two atoms
    pub distance: f64,
}

impl PairRecord {
    /// Get the vector from the first to the second atom of this pair, using
    /// the given `positions` and `cell`
    pub fn vector(&self, positions: &[Vector3D], cell: &UnitCell) -> Vector3D {
        pair_vector(positions, &cell.matrix(), self.first, self.second, self.shift)
    }

    /// Get the same pair, seen from the second atom
    pub fn reversed(&self) -> PairRecord {
        PairRecord {
            first: self.second,
            second: self.first,
            shift: -self.shift,
            distance: self.distance,
        }
    }

    /// Is this a pair between an atom and itself, without periodic shift?
    /// These pairs are only present when requesting self interactions.
    pub fn is_self_pair(&self) -> bool {
        self.first == self.second && self.shift.is_zero()
    }
}

/// A neighbor list contains all pairs of atoms with a distance below their
/// pair cutoff, grouped by the first atom of the pair.
///
/// In a half neighbor list, each pair appears once, as `(i, j, shift)` where
/// `(i, shift)` is lexicographically smaller than `(j, -shift)`. In particular,
/// pairs between different atoms are always attributed to the atom with the
/// lowest index. In a full neighbor list, each pair appears twice, once
/// attached to each atom.
///
/// For each atom, pairs are sorted by index of the second atom and then by
/// cell shift. A `NeighborList` is never modified after construction, a new
/// list has to be created when the atoms move.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    pairs_by_atom: Vec<Vec<PairRecord>>,
    full_list: bool,
    self_interaction: bool,
    pair_cutoff_mode: PairCutoffMode,
    pair_count: usize,
}

impl NeighborList {
    /// Compute the neighbor list of the given `geometry`.
    ///
    /// The skin in `options` is ignored, since it only makes sense when
    /// re-using a neighbor list across multiple geometries (see
    /// [`NeighborListCache`](super::NeighborListCache)).
    #[time_graph::instrument(name = "NeighborList::new")]
    pub fn new(geometry: &Geometry, options: &NeighborListOptions) -> Result<NeighborList, Error> {
        options.validate()?;
        let pairs_by_atom = enumerate_pairs(geometry, options, 0.0)?;
        return Ok(NeighborList::from_pairs(pairs_by_atom, options));
    }

    pub(crate) fn from_pairs(pairs_by_atom: Vec<Vec<PairRecord>>, options: &NeighborListOptions) -> NeighborList {
        let pair_count = pairs_by_atom.iter().map(Vec::len).sum();
        return NeighborList {
            pairs_by_atom: pairs_by_atom,
            full_list: options.full_list,
            self_interaction: options.self_interaction,
            pair_cutoff_mode: options.pair_cutoff_mode,
            pair_count: pair_count,
        };
    }

    /// Get the number of atoms in this neighbor list
    pub fn size(&self) -> usize {
        self.pairs_by_atom.len()
    }

    /// Get the pairs where `atom` is the first atom.
    ///
    /// # Panics
    ///
    /// If `atom` is out of bounds
    pub fn neighbors(&self, atom: usize) -> &[PairRecord] {
        &self.pairs_by_atom[atom]
    }

    /// Get the pairs where `atom` is the first atom, or `None` if `atom` is out
    /// of bounds
    pub fn get(&self, atom: usize) -> Option<&[PairRecord]> {
        self.pairs_by_atom.get(atom).map(Vec::as_slice)
    }

    /// Get the total number of pair records in this list. For full lists,
    /// this counts each pair twice.
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    /// Iterate over all pair records, ordered by first atom
    pub fn iter(&self) -> impl Iterator<Item=&PairRecord> + '_ {
        self.pairs_by_atom.iter().flatten()
    }

    /// Is this a full neighbor list?
    pub fn is_full(&self) -> bool {
        self.full_list
    }

    /// Does this list contain pairs between each atom and itself?
    pub fn has_self_interaction(&self) -> bool {
        self.self_interaction
    }

    /// Get the mode used to combine atomic cutoffs when creating this list
    pub fn pair_cutoff_mode(&self) -> PairCutoffMode {
        self.pair_cutoff_mode
    }

    /// Get the full neighbor list corresponding to this list. The result is
    /// the same as building a full list directly from the geometry.
    pub fn to_full(&self) -> NeighborList {
        if self.full_list {
            return self.clone();
        }

        let mut pairs_by_atom = vec![Vec::new(); self.size()];
        for pair in self.iter() {
            pairs_by_atom[pair.first].push(*pair);
            if !pair.is_self_pair() {
                pairs_by_atom[pair.second].push(pair.reversed());
            }
        }

        for pairs in &mut pairs_by_atom {
            pairs.sort_unstable_by_key(|pair| (pair.second, pair.shift));
        }

        let pair_count = pairs_by_atom.iter().map(Vec::len).sum();
        return NeighborList {
            pairs_by_atom: pairs_by_atom,
            full_list: true,
            self_interaction: self.self_interaction,
            pair_cutoff_mode: self.pair_cutoff_mode,
            pair_count: pair_count,
        };
    }
}

impl<'a> IntoIterator for &'a NeighborList {
    type Item = &'a PairRecord;
    type IntoIter = std::iter::Flatten<std::slice::Iter<'a, Vec<PairRecord>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs_by_atom.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_relative_eq, assert_ulps_eq};

    use crate::Matrix3;
    use crate::neighbors::ImageConvention;
    use super::*;

    #[test]
    fn non_periodic() {
        let positions = vec![
            Vector3D::new(0.134, 1.282, 1.701),
            Vector3D::new(-0.273, 1.026, -1.471),
            Vector3D::new(1.922, -0.124, 1.900),
            Vector3D::new(1.400, -0.464, 0.480),
            Vector3D::new(0.149, 1.865, 0.635),
        ];
        let geometry = Geometry::new(UnitCell::infinite(), positions, 3.42).unwrap();
        let neighbors = NeighborList::new(&geometry, &NeighborListOptions::default()).unwrap();

        let reference = [
            (0, 1, 3.2082345612501593),
            (0, 2, 2.283282943482914),
            (0, 3, 2.4783286706972505),
            (0, 4, 1.215100818862369),
            (1, 3, 2.9707625283755013),
            (1, 4, 2.3059143522689647),
            (2, 3, 1.550639867925496),
            (2, 4, 2.9495550511899244),
            (3, 4, 2.6482573515427084),
        ];

        assert_eq!(neighbors.size(), 5);
        assert_eq!(neighbors.pair_count(), reference.len());
        for (pair, reference) in neighbors.iter().zip(&reference) {
            assert_eq!(pair.first, reference.0);
            assert_eq!(pair.second, reference.1);
            assert!(pair.shift.is_zero());
            assert_ulps_eq!(pair.distance, reference.2);
        }
    }

    #[test]
    fn fcc_cell() {
        let cell = UnitCell::new(Matrix3::new([
            [0.0, 1.5, 1.5],
            [1.5, 0.0, 1.5],
            [1.5, 1.5, 0.0],
        ]), [true; 3]).unwrap();
        let positions = vec![Vector3D::new(0.0, 0.0, 0.0)];
        let geometry = Geometry::new(cell, positions.clone(), 3.0).unwrap();

        let options = NeighborListOptions {
            images: ImageConvention::multiple(),
            ..Default::default()
        };
        let neighbors = NeighborList::new(&geometry, &options).unwrap();

        let expected = [
            (Vector3D::new(0.0, -1.0, -1.0), [-1, 0, 0]),
            (Vector3D::new(1.0, 0.0, -1.0), [-1, 0, 1]),
            (Vector3D::new(1.0, -1.0, 0.0), [-1, 1, 0]),
            (Vector3D::new(-1.0, 0.0, -1.0), [0, -1, 0]),
            (Vector3D::new(0.0, 1.0, -1.0), [0, -1, 1]),
            (Vector3D::new(-1.0, -1.0, 0.0), [0, 0, -1]),
        ];

        // 12 nearest neighbors at 2.12, and 6 second neighbors at 3.0 = cutoff
        let nearest = neighbors.iter()
            .filter(|pair| pair.distance < 2.5)
            .collect::<Vec<_>>();

        assert_eq!(nearest.len(), 6);
        for (pair, (vector, shift)) in nearest.iter().zip(&expected) {
            assert_eq!(pair.first, 0);
            assert_eq!(pair.second, 0);
            assert_ulps_eq!(pair.distance, 2.1213203435596424);
            assert_ulps_eq!(pair.vector(&positions, geometry.cell()) / 1.5, *vector);
            assert_eq!(<[i32; 3]>::from(pair.shift), *shift);
        }
    }

    #[test]
    fn large_cell_small_cutoff() {
        let positions = vec![
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(0.0, 2.0, 0.0),
            Vector3D::new(0.0, 0.0, 2.0),
            // atoms outside the cell natural boundaries
            Vector3D::new(-6.0, 0.0, 0.0),
            Vector3D::new(-6.0, -2.0, 0.0),
            Vector3D::new(-6.0, 0.0, -2.0),
        ];
        let geometry = Geometry::new(UnitCell::cubic(54.0), positions, 2.1).unwrap();
        let neighbors = NeighborList::new(&geometry, &NeighborListOptions::default()).unwrap();

        let expected = [
            (0, 1),
            (0, 2),
            (3, 4),
            (3, 5),
        ];

        assert_eq!(neighbors.pair_count(), expected.len());
        for (pair, expected) in neighbors.iter().zip(&expected) {
            assert_eq!(pair.first, expected.0);
            assert_eq!(pair.second, expected.1);
            assert!(pair.shift.is_zero());
            assert_ulps_eq!(pair.distance, 2.0);
        }
    }

    #[test]
    fn small_cell_large_cutoff() {
        let positions = vec![Vector3D::new(0.0, 0.0, 0.0)];
        let geometry = Geometry::new(UnitCell::cubic(0.5), positions.clone(), 0.6).unwrap();

        let error = NeighborList::new(&geometry, &NeighborListOptions::default()).unwrap_err();
        assert!(matches!(error, Error::UnboundedImageCount(_)));

        let options = NeighborListOptions {
            images: ImageConvention::multiple(),
            ..Default::default()
        };
        let neighbors = NeighborList::new(&geometry, &options).unwrap();

        let expected = [
            (Vector3D::new(-0.5, 0.0, 0.0), [-1, 0, 0]),
            (Vector3D::new(0.0, -0.5, 0.0), [0, -1, 0]),
            (Vector3D::new(0.0, 0.0, -0.5), [0, 0, -1]),
        ];

        assert_eq!(neighbors.pair_count(), 3);
        for (pair, (vector, shift)) in neighbors.iter().zip(&expected) {
            assert_eq!(pair.first, 0);
            assert_eq!(pair.second, 0);
            assert_ulps_eq!(pair.distance, 0.5);
            assert_ulps_eq!(pair.vector(&positions, geometry.cell()), *vector);
            assert_eq!(<[i32; 3]>::from(pair.shift), *shift);
        }
    }

    #[test]
    fn non_cubic_cell() {
        let cell = UnitCell::new(Matrix3::new([
            [4.26, -2.45951215, 0.0],
            [2.13, 1.22975607, 0.0],
            [0.0, 0.0, 50.0],
        ]), [true; 3]).unwrap();
        let positions = vec![
            Vector3D::new(1.42, 0.0, 0.0),
            Vector3D::new(2.84, 0.0, 0.0),
            Vector3D::new(3.55, -1.22975607, 0.0),
            Vector3D::new(4.97, -1.22975607, 0.0),
        ];
        let geometry = Geometry::new(cell, positions, 6.4).unwrap();
        let options = NeighborListOptions {
            images: ImageConvention::multiple(),
            ..Default::default()
        };
        let neighbors = NeighborList::new(&geometry, &options).unwrap();

        assert_eq!(neighbors.pair_count(), 90);

        // pairs which are missed when using the length of the cell vectors
        // instead of the distance between faces
        let expected = [
            (0, 3, [-2, 0, 0]),
            (0, 3, [-2, 1, 0]),
            (0, 3, [-2, 2, 0]),
        ];

        for (first, second, shift) in expected {
            let found = neighbors.neighbors(first).iter().any(|pair| {
                pair.second == second && pair.shift == CellShift::from(shift)
            });
            assert!(found, "could not find pair {:?}", (first, second, shift));
        }
    }

    #[test]
    fn full_list() {
        let positions = vec![
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(9.5, 0.0, 0.0),
            Vector3D::new(0.0, 1.5, 0.0),
        ];
        let geometry = Geometry::new(UnitCell::cubic(10.0), positions.clone(), 2.0).unwrap();

        let half = NeighborList::new(&geometry, &NeighborListOptions::default()).unwrap();
        assert!(!half.is_full());
        assert_eq!(half.pair_count(), 3);

        let options = NeighborListOptions { full_list: true, ..Default::default() };
        let full = NeighborList::new(&geometry, &options).unwrap();
        assert!(full.is_full());
        assert_eq!(full.pair_count(), 6);
        assert_eq!(half.to_full(), full);

        for pair in &full {
            let reversed = full.neighbors(pair.second).iter()
                .find(|other| other.second == pair.first && other.shift == -pair.shift)
                .expect("missing reversed pair");
            assert_eq!(reversed.distance, pair.distance);

            let vector = pair.vector(&positions, geometry.cell());
            assert_relative_eq!(vector, -reversed.vector(&positions, geometry.cell()));
            assert_relative_eq!(vector.norm(), pair.distance);
        }
    }

    #[test]
    fn self_interaction() {
        let positions = vec![
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(1.0, 0.0, 0.0),
        ];
        let geometry = Geometry::new(UnitCell::infinite(), positions, 1.5).unwrap();
        let options = NeighborListOptions {
            self_interaction: true,
            ..Default::default()
        };
        let neighbors = NeighborList::new(&geometry, &options).unwrap();
        assert!(neighbors.has_self_interaction());

        assert_eq!(neighbors.neighbors(0).len(), 2);
        assert!(neighbors.neighbors(0)[0].is_self_pair());
        assert_eq!(neighbors.neighbors(0)[1].second, 1);
        assert_eq!(neighbors.neighbors(1).len(), 1);
        assert!(neighbors.neighbors(1)[0].is_self_pair());

        let full = neighbors.to_full();
        assert_eq!(full.pair_count(), 4);
        assert_eq!(full.neighbors(1)[0].second, 0);
        assert!(full.neighbors(1)[1].is_self_pair());

        assert!(neighbors.get(2).is_none());
    }

    #[test]
    fn pair_cutoff_mode() {
        let positions = vec![
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(1.5, 0.0, 0.0),
            Vector3D::new(3.2, 0.0, 0.0),
        ];
        let geometry = Geometry::new(UnitCell::infinite(), positions, vec![1.0, 0.8, 2.0]).unwrap();

        let neighbors = NeighborList::new(&geometry, &NeighborListOptions::default()).unwrap();
        assert_eq!(neighbors.pair_cutoff_mode(), PairCutoffMode::Max);
        // only 1-2 is within max(0.8, 2.0)
        assert_eq!(neighbors.pair_count(), 1);
        assert_eq!(neighbors.neighbors(1)[0].second, 2);

        let options = NeighborListOptions {
            pair_cutoff_mode: PairCutoffMode::Sum,
            ..Default::default()
        };
        let neighbors = NeighborList::new(&geometry, &options).unwrap();
        // 0-1 (1.5 < 1.8), 1-2 (1.7 < 2.8), 0-2 (3.2 > 3.0)
        assert_eq!(neighbors.pair_count(), 2);
        assert_eq!(neighbors.neighbors(0)[0].second, 1);
        assert_eq!(neighbors.neighbors(1)[0].second, 2);
    }
}
