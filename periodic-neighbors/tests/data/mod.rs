#![allow(dead_code)]

use rand::prelude::*;

use periodic_neighbors::{Geometry, UnitCell, Matrix3, Vector3D, CellShift};
use periodic_neighbors::{NeighborList, NeighborListOptions, PairCutoffMode};

/// A pair found by the brute force search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePair {
    pub first: usize,
    pub second: usize,
    pub shift: CellShift,
    pub distance: f64,
}

/// Find all pairs in `geometry` by checking every pair of atoms against every
/// periodic image which could be within the cutoff. This returns a full list
/// (both `i-j` and `j-i`), without self interactions.
pub fn brute_force_pairs(geometry: &Geometry, mode: PairCutoffMode) -> Vec<ReferencePair> {
    let cell = geometry.cell();
    let matrix = cell.matrix();
    let periodic = cell.periodic();
    let distances = cell.distances_between_faces();
    let max_cutoff = geometry.max_pair_cutoff(mode);

    let mut range = [0; 3];
    for axis in 0..3 {
        if periodic[axis] {
            range[axis] = f64::ceil(max_cutoff / distances[axis]) as i32 + 1;
        }
    }

    let positions = geometry.positions();
    let mut pairs = Vec::new();
    for first in 0..geometry.size() {
        for second in 0..geometry.size() {
            let fractional = cell.fractional(positions[second] - positions[first]);

            // start the search from the closest image
            let mut closest = [0; 3];
            for axis in 0..3 {
                if periodic[axis] {
                    closest[axis] = -f64::round(fractional[axis]) as i32;
                }
            }

            let cutoff = geometry.pair_cutoff(first, second, mode);
            for a in -range[0]..=range[0] {
                for b in -range[1]..=range[1] {
                    for c in -range[2]..=range[2] {
                        let shift = CellShift::new(closest[0] + a, closest[1] + b, closest[2] + c);
                        if first == second && shift.is_zero() {
                            continue;
                        }

                        let vector = positions[second] - positions[first] + shift.cartesian(&matrix);
                        let distance2 = vector.norm2();
                        if distance2 <= cutoff * cutoff {
                            pairs.push(ReferencePair {
                                first: first,
                                second: second,
                                shift: shift,
                                distance: distance2.sqrt(),
                            });
                        }
                    }
                }
            }
        }
    }

    pairs.sort_by_key(|pair| (pair.first, pair.second, pair.shift));
    return pairs;
}

/// Only keep the representative of each pair in a half neighbor list
pub fn half_pairs(pairs: &[ReferencePair]) -> Vec<ReferencePair> {
    pairs.iter()
        .filter(|pair| (pair.first, pair.shift) < (pair.second, -pair.shift))
        .copied()
        .collect()
}

/// Convert the pairs of a neighbor list (without self interactions) to the
/// same format as the brute force search
pub fn list_pairs(neighbors: &NeighborList) -> Vec<ReferencePair> {
    neighbors.iter()
        .filter(|pair| !pair.is_self_pair())
        .map(|pair| ReferencePair {
            first: pair.first,
            second: pair.second,
            shift: pair.shift,
            distance: pair.distance,
        })
        .collect()
}

/// Check that a neighbor list contains exactly the pairs found by brute force
pub fn check_against_brute_force(geometry: &Geometry, options: &NeighborListOptions) {
    let neighbors = NeighborList::new(geometry, options).expect("failed to build neighbor list");
    assert_eq!(neighbors.size(), geometry.size());

    let mut reference = brute_force_pairs(geometry, options.pair_cutoff_mode);
    if !options.full_list {
        reference = half_pairs(&reference);
    }

    let actual = list_pairs(&neighbors);
    assert_eq!(actual.len(), reference.len(), "wrong number of pairs with {:?}", options);
    for (actual, expected) in actual.iter().zip(&reference) {
        assert_eq!(
            (actual.first, actual.second, actual.shift),
            (expected.first, expected.second, expected.shift),
        );
        approx::assert_ulps_eq!(actual.distance, expected.distance);

        let cutoff = geometry.pair_cutoff(actual.first, actual.second, options.pair_cutoff_mode);
        assert!(actual.distance <= cutoff);
    }
}

/// Create a random generator with a fixed seed
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Create `n_atoms` random positions in the given cell. Along periodic
/// directions, some of the atoms are outside of the cell.
pub fn random_positions(rng: &mut StdRng, cell: &UnitCell, n_atoms: usize) -> Vec<Vector3D> {
    let periodic = cell.periodic();
    (0..n_atoms).map(|_| {
        let mut fractional = Vector3D::zero();
        for axis in 0..3 {
            fractional[axis] = if periodic[axis] {
                rng.gen_range(-0.3..1.3)
            } else {
                rng.gen_range(0.0..1.0)
            };
        }
        cell.cartesian(fractional)
    }).collect()
}

/// Create random per-atom cutoffs in `[min, max)`
pub fn random_cutoffs(rng: &mut StdRng, n_atoms: usize, min: f64, max: f64) -> Vec<f64> {
    (0..n_atoms).map(|_| rng.gen_range(min..max)).collect()
}

/// Create a random triclinic cell, with all distances between faces larger
/// than `min_distance`
pub fn random_triclinic_cell(rng: &mut StdRng, min_distance: f64, periodic: [bool; 3]) -> UnitCell {
    loop {
        let mut matrix = Matrix3::zero();
        for i in 0..3 {
            for j in 0..3 {
                matrix[i][j] = rng.gen_range(-0.4..0.4) * min_distance;
            }
            matrix[i][i] = rng.gen_range(1.2..2.0) * min_distance;
        }

        let cell = UnitCell::new(matrix, periodic).expect("invalid random cell");
        let distances = cell.distances_between_faces();
        if (0..3).all(|axis| distances[axis] >= min_distance) {
            return cell;
        }
    }
}

/// Displace all positions by a random vector of norm at most `max`
pub fn displace(rng: &mut StdRng, positions: &mut [Vector3D], max: f64) {
    for position in positions {
        let direction = Vector3D::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let norm = direction.norm();
        if norm > 1e-6 {
            *position += direction * (rng.gen_range(0.0..max) / norm);
        }
    }
}
