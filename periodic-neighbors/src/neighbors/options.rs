use crate::Error;
use crate::geometry::PairCutoffMode;

/// Default maximal number of periodic repeats along a single cell vector when
/// using [`ImageConvention::Multiple`]
pub const DEFAULT_MAX_IMAGE_REPEATS: u32 = 16;

/// Upper limit for the maximal number of periodic repeats along a single cell
/// vector. Searching more repeats than this would visit `(2 * 100 + 1)^3`
/// periodic images for every atom.
pub const MAX_IMAGE_REPEATS_LIMIT: u32 = 100;

fn default_max_repeats() -> u32 {
    DEFAULT_MAX_IMAGE_REPEATS
}

/// How to deal with cutoffs which are large compared to the periodic cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
#[serde(tag = "type")]
pub enum ImageConvention {
    /// Each pair of atoms can only be neighbors through a single periodic
    /// image. The search radius must be smaller than half the distance between
    /// opposite faces of the cell along all periodic directions, otherwise the
    /// neighbor list construction fails.
    #[default]
    Unique,
    /// Allow the same pair of atoms to be neighbors through multiple periodic
    /// images, and atoms to be neighbors with their own periodic images. This
    /// is the convention used by codes summing interactions over all images
    /// within the cutoff.
    Multiple {
        /// Maximal number of periodic repeats of the cell to consider along
        /// any periodic direction. Cutoffs requiring more repeats are rejected.
        #[serde(default = "default_max_repeats")]
        max_repeats: u32,
    },
}

impl ImageConvention {
    /// Get the multiple images convention with the default maximal number of
    /// repeats
    pub fn multiple() -> ImageConvention {
        ImageConvention::Multiple { max_repeats: DEFAULT_MAX_IMAGE_REPEATS }
    }
}

/// Options controlling the construction of a neighbor list
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NeighborListOptions {
    /// How to combine the cutoffs of two atoms into a pair cutoff: `"max"`
    /// uses the largest cutoff, `"sum"` the sum of both cutoffs
    #[serde(default)]
    pub pair_cutoff_mode: PairCutoffMode,
    /// Additional distance added to the cutoff when building the list inside
    /// a [`NeighborListCache`](super::NeighborListCache). The list can be
    /// re-used without a full rebuild as long as no atom moved by more than
    /// half the skin.
    #[serde(default)]
    pub skin: f64,
    /// Should individual atoms be considered their own neighbor? Setting this
    /// to `true` adds pairs between each atom and itself, with a zero shift
    /// and a distance of 0.
    #[serde(default)]
    pub self_interaction: bool,
    /// Should we compute a full neighbor list (each pair appears twice, once
    /// as `i-j` and once as `j-i`), or a half neighbor list (each pair only
    /// appears once)
    #[serde(default)]
    pub full_list: bool,
    /// Convention for periodic images when the cutoff is large compared to
    /// the cell
    #[serde(default)]
    pub images: ImageConvention,
}

impl NeighborListOptions {
    /// Parse options from a JSON string, and validate them
    pub fn from_json(json: &str) -> Result<NeighborListOptions, Error> {
        let options: NeighborListOptions = serde_json::from_str(json)?;
        options.validate()?;
        return Ok(options);
    }

    /// Serialize these options to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize to JSON")
    }

    /// Check that these options are valid
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.skin >= 0.0 && self.skin.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "skin must be positive or zero, got {}", self.skin
            )));
        }

        if let ImageConvention::Multiple { max_repeats } = self.images {
            if max_repeats == 0 {
                return Err(Error::InvalidParameter(
                    "max_repeats must be at least 1 for multiple images".into()
                ));
            }

            if max_repeats > MAX_IMAGE_REPEATS_LIMIT {
                return Err(Error::InvalidParameter(format!(
                    "max_repeats can not be larger than {}, got {}",
                    MAX_IMAGE_REPEATS_LIMIT, max_repeats
                )));
            }
        }

        return Ok(());
    }
}
