//! Core lattice logic for the cellular Potts model.
//!
//! This module contains the voxel grid, the cell contract, the energy model,
//! the topology checks, and the Monte Carlo stepper built on them.
//! The FFI layer in `ffi/` calls into these types.

pub mod cell;
pub mod connectivity;
pub mod energy;
pub mod grid;
pub mod neighborhood;
pub mod region;
pub mod stepping;

pub use cell::{
    is_named_region, Cell, CellTable, Constraint, Lambdas, PottsCell, RegionState, TAG_DEFAULT,
    TAG_NUCLEUS, TAG_UNDEFINED,
};
pub use connectivity::Pattern;
pub use energy::EnergyModel;
pub use grid::{Census, VoxelGrid, MEDIA};
pub use neighborhood::{Direction, Neighborhood, Offset};
pub use region::{extract_ids, extract_tags, import_ids, Bounds};
pub use stepping::{MonteCarloStepper, Outcome, TickSummary};
