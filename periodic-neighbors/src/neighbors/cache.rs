use std::sync::Arc;

use log::info;
use rayon::prelude::*;

use crate::{Error, Vector3D};
use crate::geometry::Geometry;

use super::{NeighborList, NeighborListOptions, PairRecord};
use super::pairs::{enumerate_pairs, distance_within_cutoff};

/// What happened during a call to [`NeighborListCache::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The candidate pairs were re-computed from scratch
    Built,
    /// The candidate pairs from a previous build were still valid, and only
    /// the distances were updated
    Reused,
}

/// State of the cache after a full build
#[derive(Debug, Clone)]
struct CachedState {
    /// geometry used for the last full build
    geometry: Geometry,
    /// pairs within cutoff + skin in the geometry of the last full build
    candidates: Vec<Vec<PairRecord>>,
    /// neighbor list for the most recent geometry
    current: Arc<NeighborList>,
}

/// Caller-held cache re-using a neighbor list across small changes in the
/// atomic positions, such as successive steps of a simulation.
///
/// When building the list, the cache includes all pairs within the pair
/// cutoff plus the `skin` from the options. As long as no atom moved by more
/// than half of the skin since this build, all pairs within the cutoff are
/// guaranteed to be part of these candidates. Updating the cache then only
/// requires re-computing the candidate distances, and the resulting list is
/// identical to the one a full rebuild would produce.
///
/// Previously returned lists are never modified by an update.
#[derive(Debug, Clone)]
pub struct NeighborListCache {
    options: NeighborListOptions,
    state: Option<CachedState>,
}

impl NeighborListCache {
    /// Create a new empty cache with the given `options`
    pub fn new(options: NeighborListOptions) -> Result<NeighborListCache, Error> {
        options.validate()?;
        return Ok(NeighborListCache {
            options: options,
            state: None,
        });
    }

    /// Get the options used by this cache
    pub fn options(&self) -> &NeighborListOptions {
        &self.options
    }

    /// Get the current neighbor list, or `None` if the cache was never
    /// updated or was invalidated.
    pub fn neighbors(&self) -> Option<Arc<NeighborList>> {
        self.state.as_ref().map(|state| Arc::clone(&state.current))
    }

    /// Forget everything about previous builds, the next update will build
    /// the neighbor list from scratch.
    pub fn invalidate(&mut self) {
        self.state = None;
    }

    /// Check if updating the cache with the given `geometry` would require a
    /// full rebuild of the neighbor list
    pub fn needs_rebuild(&self, geometry: &Geometry) -> bool {
        self.rebuild_reason(geometry).is_some()
    }

    /// Update the neighbor list for a new `geometry`, re-using the previous
    /// build if possible.
    #[time_graph::instrument(name = "NeighborListCache::update")]
    pub fn update(&mut self, geometry: &Geometry) -> Result<UpdateStatus, Error> {
        if let Some(reason) = self.rebuild_reason(geometry) {
            info!("rebuilding neighbor list: {}", reason);

            // make sure we don't keep a stale list around if the build fails
            self.state = None;

            let candidates = enumerate_pairs(geometry, &self.options, self.options.skin)?;
            let current = filter_candidates(&candidates, geometry, &self.options);
            self.state = Some(CachedState {
                geometry: geometry.clone(),
                candidates: candidates,
                current: Arc::new(current),
            });

            return Ok(UpdateStatus::Built);
        }

        let state = self.state.as_mut().expect("missing state without rebuild");
        let current = filter_candidates(&state.candidates, geometry, &self.options);
        state.current = Arc::new(current);

        return Ok(UpdateStatus::Reused);
    }

    /// Update the neighbor list for new atomic `positions`, keeping the cell
    /// and cutoffs from the last full build.
    pub fn update_positions(&mut self, positions: &[Vector3D]) -> Result<UpdateStatus, Error> {
        let geometry = match &self.state {
            Some(state) => state.geometry.with_positions(positions.to_vec())?,
            None => {
                return Err(Error::InvalidParameter(
                    "can not update positions before the neighbor list was built, \
                    call `update` with a complete geometry first".into()
                ));
            }
        };

        return self.update(&geometry);
    }

    fn rebuild_reason(&self, geometry: &Geometry) -> Option<String> {
        let Some(state) = &self.state else {
            return Some("no previous neighbor list".into());
        };

        let previous = &state.geometry;
        if previous.size() != geometry.size() {
            return Some(format!(
                "the number of atoms changed from {} to {}", previous.size(), geometry.size()
            ));
        }

        if previous.cell() != geometry.cell() {
            return Some("the unit cell changed".into());
        }

        if previous.cutoffs() != geometry.cutoffs() {
            return Some("the cutoffs changed".into());
        }

        let max_displacement2 = previous.positions().par_iter()
            .zip_eq(geometry.positions().par_iter())
            .map(|(&old, &new)| (new - old).norm2())
            .reduce(|| 0.0, f64::max);

        let half_skin = 0.5 * self.options.skin;
        if max_displacement2 > half_skin * half_skin {
            return Some(format!(
                "atoms moved by up to {} since the last build (skin is {})",
                max_displacement2.sqrt(), self.options.skin
            ));
        }

        return None;
    }
}

/// Only keep the candidate pairs within the actual pair cutoff for the atomic
/// positions in `geometry`, updating their distance.
fn filter_candidates(candidates: &[Vec<PairRecord>], geometry: &Geometry, options: &NeighborListOptions) -> NeighborList {
    let cell = geometry.cell().matrix();
    let mode = options.pair_cutoff_mode;

    let pairs_by_atom = candidates.par_iter().map(|candidates| {
        candidates.iter().filter_map(|pair| {
            if pair.is_self_pair() {
                return Some(*pair);
            }

            let distance = distance_within_cutoff(geometry, &cell, mode, 0.0, pair.first, pair.second, pair.shift)?;
            Some(PairRecord {
                distance: distance,
                ..*pair
            })
        }).collect::<Vec<_>>()
    }).collect();

    return NeighborList::from_pairs(pairs_by_atom, options);
}
