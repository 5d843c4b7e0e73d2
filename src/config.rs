//! Immutable lattice configuration.

use serde::{Deserialize, Serialize};

use crate::error::PottsError;
use crate::potts::neighborhood::Neighborhood;

/// Seed used when a configuration does not pin one.
pub const DEFAULT_RNG_SEED: u64 = 0x5EED_C0FF_EE42_0F0F;

/// Hamiltonian terms that can contribute to an energy change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Adhesion,
    Volume,
    Surface,
}

impl Term {
    pub const ALL: [Term; 3] = [Term::Adhesion, Term::Volume, Term::Surface];
}

/// Static configuration for a Potts lattice.
///
/// Dimensions include the fixed one-voxel border, so a `width` of 5 leaves
/// three updatable columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PottsConfig {
    /// Lattice extent along x.
    pub width: i16,
    /// Lattice extent along y.
    pub height: i16,
    /// Lattice extent along z. A depth of 1 selects the planar neighborhood.
    pub depth: i16,
    /// Effective cell temperature of the Metropolis rule.
    pub temperature: f64,
    /// Proposals per tick as a multiple of the interior voxel count.
    pub mcs: f64,
    /// Terms summed into every energy change, in order.
    pub terms: Vec<Term>,
    /// Allocate the tag layer used by cells with sub-cellular regions.
    pub tagged: bool,
    /// Seed for the random source owned by [`crate::State`].
    pub rng_seed: Option<u64>,
}

impl Default for PottsConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            depth: 1,
            temperature: 10.0,
            mcs: 1.0,
            terms: Term::ALL.to_vec(),
            tagged: false,
            rng_seed: None,
        }
    }
}

impl PottsConfig {
    /// Planar configuration with the default parameters.
    pub fn planar(width: i16, height: i16) -> Self {
        Self {
            width,
            height,
            depth: 1,
            ..Self::default()
        }
    }

    /// Volumetric configuration with the default parameters.
    pub fn volumetric(width: i16, height: i16, depth: i16) -> Self {
        Self {
            width,
            height,
            depth,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PottsError> {
        if self.width < 3 || self.height < 3 {
            return Err(PottsError::InvalidConfig(
                "width and height must be at least 3 to leave an interior",
            ));
        }
        if self.depth != 1 && self.depth < 3 {
            return Err(PottsError::InvalidConfig(
                "depth must be 1 (planar) or at least 3",
            ));
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(PottsError::InvalidConfig(
                "temperature must be finite and positive",
            ));
        }
        if !self.mcs.is_finite() || self.mcs < 0.0 {
            return Err(PottsError::InvalidConfig(
                "mcs must be finite and non-negative",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn neighborhood(&self) -> Neighborhood {
        Neighborhood::for_depth(self.depth)
    }

    /// Number of voxels proposals are drawn from.
    pub fn interior_voxels(&self) -> usize {
        let layers = if self.depth == 1 {
            1
        } else {
            (self.depth - 2).max(0) as usize
        };
        (self.width - 2).max(0) as usize * (self.height - 2).max(0) as usize * layers
    }

    /// `mcs` sweeps over the interior, truncated toward zero.
    pub fn steps_per_tick(&self) -> usize {
        (self.mcs * self.interior_voxels() as f64) as usize
    }

    pub fn seed(&self) -> u64 {
        self.rng_seed.unwrap_or(DEFAULT_RNG_SEED)
    }
}
