use log::debug;
use ndarray::Array3;
use rayon::prelude::*;

use crate::{Error, Vector3D};
use crate::geometry::Geometry;

use super::CellShift;

/// Maximal number of bins, we need to use this to prevent having too many
/// bins with a large system and a small cutoff
const MAX_NUMBER_OF_BINS: f64 = 1e5;

/// Periodic directions thinner than this fraction of the search radius can
/// not be partitioned into bins
const MIN_RELATIVE_EXTENT: f64 = 1e-6;

/// Largest bin index (before wrapping) along a periodic direction. Wrapping
/// shifts of two atoms are subtracted from one another when building pairs,
/// and this keeps the result far away from `i32` overflow.
const MAX_BIN_INDEX: f64 = (i32::MAX / 4) as f64;

/// Data associated with an atom inside the [`CellBinning`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinnedAtom {
    /// index of the atom in the geometry
    pub index: usize,
    /// shift from the periodic image of this atom inside the primary cell to
    /// the actual atom position, i.e. `position = wrapped + wrap * cell`.
    pub wrap: CellShift,
}

/// Definition of the grid along a single cell vector
#[derive(Debug, Clone, Copy)]
struct AxisGrid {
    /// is this direction periodic
    periodic: bool,
    /// fractional coordinate of the start of the grid
    origin: f64,
    /// width of a single bin, in fractional coordinates
    width: f64,
    /// number of bins along this direction
    count: usize,
}

/// The cell binning sorts atoms inside a regular grid of bins, with bins at
/// least as large as the search radius.
///
/// The grid is defined in fractional coordinates of the cell. Along periodic
/// directions, atoms are wrapped inside the primary cell for lookup purposes
/// (the actual positions are never modified) and an integer number of bins
/// covers the cell. Along non-periodic directions, the grid covers the
/// bounding box of the atoms, padded by the search radius on both sides.
#[derive(Debug, Clone)]
pub struct CellBinning {
    /// the bins themselves, containing atoms in increasing index order
    bins: Array3<Vec<BinnedAtom>>,
    /// bin coordinate and wrapping shift of each atom
    locations: Vec<([usize; 3], CellShift)>,
    /// grid definition along each cell vector
    axes: [AxisGrid; 3],
    /// How many bins do we need to look at when searching neighbors to include
    /// all neighbors below the search radius
    n_search: [i32; 3],
}

impl CellBinning {
    /// Sort the atoms in `geometry` in bins suitable to search for neighbors
    /// up to `search_radius`.
    ///
    /// This fails with `Error::DegenerateCell` if one of the periodic
    /// directions is too thin compared to the search radius, and with
    /// `Error::InvalidGeometry` if an atom is too many periodic repeats away
    /// from the cell.
    #[time_graph::instrument(name = "CellBinning::new")]
    pub fn new(geometry: &Geometry, search_radius: f64) -> Result<CellBinning, Error> {
        assert!(search_radius > 0.0 && search_radius.is_finite());

        let cell = geometry.cell();
        let periodic = cell.periodic();
        let distances_between_faces = cell.distances_between_faces();

        let fractional = geometry.positions().par_iter()
            .map(|&position| cell.fractional(position))
            .collect::<Vec<_>>();

        let mut axes = [AxisGrid { periodic: false, origin: 0.0, width: 1.0, count: 1 }; 3];
        let mut n_bins = [1.0; 3];
        for axis in 0..3 {
            let distance = distances_between_faces[axis];
            // search radius in fractional coordinates
            let radius = search_radius / distance;

            if periodic[axis] {
                if !(distance / search_radius >= MIN_RELATIVE_EXTENT) {
                    return Err(Error::DegenerateCell(format!(
                        "the distance between periodic faces along cell vector {} ({}) \
                        is too small compared to the search radius ({})",
                        axis, distance, search_radius
                    )));
                }

                axes[axis].periodic = true;
                axes[axis].origin = 0.0;
                n_bins[axis] = f64::max(f64::trunc(distance / search_radius), 1.0);
            } else {
                let (min, max) = fractional.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(min, max), f| (f64::min(min, f[axis]), f64::max(max, f[axis]))
                );
                let (min, max) = if min.is_finite() { (min, max) } else { (0.0, 0.0) };

                let length = max - min + 2.0 * radius;
                axes[axis].origin = min - radius;
                axes[axis].width = length;
                n_bins[axis] = f64::max(f64::trunc(length * distance / search_radius), 1.0);
            }

            if !n_bins[axis].is_finite() {
                return Err(Error::DegenerateCell(format!(
                    "can not create bins along cell vector {} with a search radius of {}",
                    axis, search_radius
                )));
            }
        }

        limit_bin_count(&mut n_bins);

        let mut n_search = [0; 3];
        for axis in 0..3 {
            let count = n_bins[axis] as usize;
            let length = if axes[axis].periodic { 1.0 } else { axes[axis].width };
            axes[axis].count = count;
            axes[axis].width = length / count as f64;

            // number of bins to search in each direction to make sure all
            // possible pairs below the cutoff are accounted for
            let radius = search_radius / distances_between_faces[axis];
            n_search[axis] = i32::max(f64::ceil(radius / axes[axis].width) as i32, 1);

            // don't look for neighboring bins if we have only one bin and no
            // periodic boundary condition
            if count == 1 && !axes[axis].periodic {
                n_search[axis] = 0;
            }
        }

        let shape = [axes[0].count, axes[1].count, axes[2].count];
        debug!(
            "binning {} atoms in {}x{}x{} bins, searching {:?} bins around each atom",
            geometry.size(), shape[0], shape[1], shape[2], n_search,
        );

        let locations = fractional.par_iter()
            .enumerate()
            .map(|(atom, &fractional)| locate(&axes, atom, fractional))
            .collect::<Result<Vec<_>, Error>>()?;

        let mut bins = Array3::from_elem(shape, Vec::new());
        for (index, &(bin, wrap)) in locations.iter().enumerate() {
            bins[bin].push(BinnedAtom { index, wrap });
        }

        return Ok(CellBinning {
            bins: bins,
            locations: locations,
            axes: axes,
            n_search: n_search,
        });
    }

    /// Get the number of bins along each cell vector
    pub fn shape(&self) -> [usize; 3] {
        [self.axes[0].count, self.axes[1].count, self.axes[2].count]
    }

    /// Get the number of neighboring bins to search along each cell vector
    pub fn n_search(&self) -> [i32; 3] {
        self.n_search
    }

    /// Get the atoms inside the bin at the given coordinate
    pub fn bin(&self, coordinate: [usize; 3]) -> &[BinnedAtom] {
        &self.bins[coordinate]
    }

    /// Get the bin coordinate of the given atom, and the shift from the
    /// wrapped position used for binning to the actual atom position
    pub fn location(&self, atom: usize) -> ([usize; 3], CellShift) {
        self.locations[atom]
    }

    /// Get the bin displaced by `delta` from the bin at `center`. Along
    /// periodic directions, this wraps around the grid and returns the
    /// corresponding image shift; along non-periodic directions this returns
    /// `None` when going outside of the grid.
    #[inline]
    pub fn neighbor_bin(&self, center: [usize; 3], delta: [i32; 3]) -> Option<(CellShift, [usize; 3])> {
        let mut shift = [0; 3];
        let mut bin = [0; 3];
        for axis in 0..3 {
            let count = self.axes[axis].count;
            let index = center[axis] as i32 + delta[axis];
            if self.axes[axis].periodic {
                let (quotient, remainder) = divmod(index, count);
                shift[axis] = quotient;
                bin[axis] = remainder;
            } else if index < 0 || index >= count as i32 {
                return None;
            } else {
                bin[axis] = index as usize;
            }
        }

        return Some((CellShift::from(shift), bin));
    }
}

/// Reduce the number of bins to stay below `MAX_NUMBER_OF_BINS`, while
/// keeping roughly the ratio of bins in each direction
fn limit_bin_count(n_bins: &mut [f64; 3]) {
    loop {
        let total = n_bins[0] * n_bins[1] * n_bins[2];
        if total <= MAX_NUMBER_OF_BINS {
            return;
        }

        let free_axes = n_bins.iter().filter(|&&n| n > 1.0).count();
        let factor = f64::powf(MAX_NUMBER_OF_BINS / total, 1.0 / free_axes as f64);
        for n in n_bins.iter_mut() {
            if *n > 1.0 {
                *n = f64::max(f64::trunc(*n * factor), 1.0);
            }
        }
    }
}

/// Find the bin containing an atom with the given `fractional` coordinates,
/// and the corresponding wrapping shift
fn locate(axes: &[AxisGrid; 3], atom: usize, fractional: Vector3D) -> Result<([usize; 3], CellShift), Error> {
    let mut bin = [0; 3];
    let mut wrap = [0; 3];
    for (axis, grid) in axes.iter().enumerate() {
        let index = f64::floor((fractional[axis] - grid.origin) / grid.width);
        if grid.periodic {
            if !(f64::abs(index) <= MAX_BIN_INDEX) {
                return Err(Error::InvalidGeometry(format!(
                    "atom {} is too far from the unit cell along periodic cell \
                    vector {} (fractional coordinate is {})",
                    atom, axis, fractional[axis]
                )));
            }

            // deal with pbc by wrapping the atom inside if it was outside of
            // the cell
            let (quotient, remainder) = divmod(index as i32, grid.count);
            wrap[axis] = quotient;
            bin[axis] = remainder;
        } else {
            bin[axis] = f64::clamp(index, 0.0, (grid.count - 1) as f64) as usize;
        }
    }
    return Ok((bin, CellShift::from(wrap)));
}

/// Function to compute both quotient and remainder of the division of a by b.
/// This function follows Python convention, making sure the remainder have the
/// same sign as `b`.
fn divmod(a: i32, b: usize) -> (i32, usize) {
    debug_assert!(b < (i32::MAX as usize));
    let b = b as i32;
    let mut quotient = a / b;
    let mut remainder = a % b;
    if remainder < 0 {
        remainder += b;
        quotient -= 1;
    }
    return (quotient, remainder as usize);
}
