use crate::Error;
use crate::geometry::UnitCell;

use super::{CellShift, ImageConvention};
use super::options::MAX_IMAGE_REPEATS_LIMIT;

/// Number of periodic images of the unit cell that must be considered along
/// each cell vector to find all pairs within a given search radius.
///
/// The number of images is computed from the distance between opposite faces
/// of the cell, and not from the length of the cell vectors, since the later
/// under-estimates the required number of images in skewed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    repeats: [i32; 3],
}

impl ImageBounds {
    /// Compute the periodic images required for the given `cell` and
    /// `search_radius`, following the `convention` for large cutoffs.
    ///
    /// This fails with `Error::UnboundedImageCount` if the search radius is
    /// too large for the cell with the given convention.
    pub fn new(cell: &UnitCell, search_radius: f64, convention: ImageConvention) -> Result<ImageBounds, Error> {
        assert!(search_radius > 0.0 && search_radius.is_finite());

        let periodic = cell.periodic();
        let distances_between_faces = cell.distances_between_faces();

        let mut repeats = [0; 3];
        for axis in 0..3 {
            if !periodic[axis] {
                continue;
            }

            let distance = distances_between_faces[axis];
            let ratio = search_radius / distance;

            match convention {
                ImageConvention::Unique => {
                    if 2.0 * search_radius >= distance {
                        return Err(Error::UnboundedImageCount(format!(
                            "the search radius ({}) must be smaller than half the distance \
                            between periodic faces along cell vector {} ({}) to only find \
                            unique periodic images, use multiple images or a larger cell",
                            search_radius, axis, distance,
                        )));
                    }
                }
                ImageConvention::Multiple { max_repeats } => {
                    let max_repeats = u32::min(max_repeats, MAX_IMAGE_REPEATS_LIMIT);
                    if !ratio.is_finite() || ratio > max_repeats as f64 {
                        return Err(Error::UnboundedImageCount(format!(
                            "the search radius ({}) would require more than {} periodic \
                            repeats along cell vector {} (distance between faces is {})",
                            search_radius, max_repeats, axis, distance,
                        )));
                    }
                }
            }

            repeats[axis] = f64::ceil(ratio) as i32;
        }

        return Ok(ImageBounds { repeats });
    }

    /// Get the number of periodic repeats along each cell vector. Non-periodic
    /// directions always use 0.
    pub fn repeats(&self) -> [i32; 3] {
        self.repeats
    }

    /// Check if the image with the given `shift` is within the bounds
    #[inline]
    pub fn contains(&self, shift: CellShift) -> bool {
        (0..3).all(|axis| shift[axis].abs() <= self.repeats[axis])
    }

    /// Get the total number of periodic images, including the primary one
    pub fn count(&self) -> usize {
        self.repeats.iter().map(|&k| 2 * k as usize + 1).product()
    }
}
