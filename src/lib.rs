//! Potts Lattice - Cellular Potts Model Library
//!
//! Evolves a 2D or 3D lattice of cells by Metropolis Monte Carlo flips under
//! an adhesion, volume and surface Hamiltonian, with optional sub-cellular
//! regions. Exposes a Rust API and a C ABI for embedding in a host simulator.

pub mod config;
pub mod error;
pub mod ffi;
pub mod potts;
pub mod state;


pub use config::{PottsConfig, Term};
pub use error::PottsError;
pub use potts::{Cell, MonteCarloStepper, PottsCell, VoxelGrid};
pub use state::State;
