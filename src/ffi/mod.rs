//! C FFI layer.
//!
//! This module exports C ABI functions for embedding the lattice in a host
//! application. All functions are marked with `#[no_mangle]` and use
//! `extern "C"`.
//!
//! The actual logic is in the `potts` module. These functions are thin wrappers
//! that handle null checks, pointer safety, and mapping errors to status codes.

pub mod cell;
pub mod grid;
pub mod lifecycle;
pub mod region;

pub use cell::{
    cpm_add_cell, cpm_add_region, cpm_cell_surface, cpm_cell_volume, cpm_region_volume,
    cpm_remove_cell, cpm_set_adhesion, cpm_set_region_adhesion,
};
pub use grid::{cpm_assign_tag, cpm_assign_voxel, cpm_get_tag, cpm_get_voxel, cpm_tick};
pub use lifecycle::{cpm_create, cpm_destroy, cpm_get_size, cpm_get_tick};
pub use region::{cpm_extract_ids, cpm_extract_tags, cpm_import_ids};
