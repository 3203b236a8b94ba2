use log::{debug, warn};
use rayon::prelude::*;

use crate::{Error, Matrix3};
use crate::geometry::{Geometry, PairCutoffMode};

use super::{CellBinning, ImageBounds, NeighborListOptions, PairRecord, CellShift};
use super::pair_vector;

/// Squared distance below which atoms are considered suspiciously close
const CLOSE_ATOMS_DISTANCE2: f64 = 1e-6;

/// Get the distance between atoms `first` and `second` (displaced by
/// `shift`) if it is below the pair cutoff increased by `padding`.
#[inline]
pub(crate) fn distance_within_cutoff(
    geometry: &Geometry,
    cell: &Matrix3,
    mode: PairCutoffMode,
    padding: f64,
    first: usize,
    second: usize,
    shift: CellShift,
) -> Option<f64> {
    let cutoff = geometry.pair_cutoff(first, second, mode) + padding;
    let vector = pair_vector(geometry.positions(), cell, first, second, shift);
    let distance2 = vector.norm2();
    if distance2 <= cutoff * cutoff {
        Some(distance2.sqrt())
    } else {
        None
    }
}

/// Find all pairs in `geometry` with a distance below the pair cutoff plus
/// `padding`, following the half/full list, self interaction and periodic
/// images conventions in `options`.
///
/// The pairs are grouped by their first atom, and sorted by second atom and
/// shift inside each group.
#[time_graph::instrument(name = "enumerate_pairs")]
pub(crate) fn enumerate_pairs(
    geometry: &Geometry,
    options: &NeighborListOptions,
    padding: f64,
) -> Result<Vec<Vec<PairRecord>>, Error> {
    let n_atoms = geometry.size();
    if n_atoms == 0 {
        return Ok(Vec::new());
    }

    let mode = options.pair_cutoff_mode;
    let search_radius = geometry.max_pair_cutoff(mode) + padding;

    let binning = CellBinning::new(geometry, search_radius)?;
    let images = ImageBounds::new(geometry.cell(), search_radius, options.images)?;
    debug!(
        "searching pairs up to {} with {:?} periodic repeats ({} images)",
        search_radius, images.repeats(), images.count()
    );

    let cell = geometry.cell().matrix();
    let n_search = binning.n_search();

    let pairs_by_atom = (0..n_atoms).into_par_iter().map(|first| {
        let (center, first_wrap) = binning.location(first);

        let mut pairs = Vec::new();
        if options.self_interaction {
            pairs.push(PairRecord {
                first: first,
                second: first,
                shift: CellShift::zero(),
                distance: 0.0,
            });
        }

        for delta_a in -n_search[0]..=n_search[0] {
            for delta_b in -n_search[1]..=n_search[1] {
                for delta_c in -n_search[2]..=n_search[2] {
                    let Some((image, bin)) = binning.neighbor_bin(center, [delta_a, delta_b, delta_c]) else {
                        continue;
                    };

                    if !images.contains(image) {
                        continue;
                    }

                    for atom in binning.bin(bin) {
                        let second = atom.index;
                        let shift = image + first_wrap - atom.wrap;

                        if first == second && shift.is_zero() {
                            continue;
                        }

                        // for half lists, only keep the representative of
                        // the pair with the smallest (atom, shift)
                        if !options.full_list && (first, shift) > (second, -shift) {
                            continue;
                        }

                        let Some(distance) = distance_within_cutoff(geometry, &cell, mode, padding, first, second, shift) else {
                            continue;
                        };

                        if distance * distance < CLOSE_ATOMS_DISTANCE2 && first <= second {
                            warn!(
                                "atoms {} and {} are very close to one another ({} A)",
                                first, second, distance
                            );
                        }

                        pairs.push(PairRecord {
                            first: first,
                            second: second,
                            shift: shift,
                            distance: distance,
                        });
                    }
                }
            }
        }

        // (second, shift) is unique for a given first atom
        pairs.sort_unstable_by_key(|pair| (pair.second, pair.shift));
        return pairs;
    }).collect::<Vec<_>>();

    return Ok(pairs_by_atom);
}
