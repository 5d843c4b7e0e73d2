//! Region extraction and import FFI functions.

use tracing::warn;

use crate::potts::{self, Bounds};
use crate::state::State;

/// Extracts owner IDs of a rectangular region into a flat output buffer.
///
/// # Layout
/// The buffer is filled in z,y,x order (z changes slowest, x changes fastest).
/// This matches the layout expected by `cpm_import_ids`. Bounds are clamped
/// to the lattice.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_buf` must point to at least `out_len` writable `i32` values
///
/// # Returns
/// Number of values written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn cpm_extract_ids(
    ptr: *const State,
    out_buf: *mut i32,
    out_len: usize,
    min_x: i16,
    min_y: i16,
    min_z: i16,
    max_x: i16,
    max_y: i16,
    max_z: i16,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let state = &*ptr;
    let out = std::slice::from_raw_parts_mut(out_buf, out_len);
    let bounds = Bounds::new(min_x, min_y, min_z, max_x, max_y, max_z);
    match potts::extract_ids(state.stepper.grid(), out, bounds) {
        Ok(count) => count as u64,
        Err(err) => {
            warn!(%err, "cpm_extract_ids failed");
            0
        }
    }
}

/// Extracts region tags of a rectangular region into a flat output buffer.
///
/// # Layout
/// Same z,y,x order as `cpm_extract_ids`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `out_buf` must point to at least `out_len` writable `i32` values
///
/// # Returns
/// Number of values written, or 0 on error (including untagged lattices).
#[no_mangle]
pub unsafe extern "C" fn cpm_extract_tags(
    ptr: *const State,
    out_buf: *mut i32,
    out_len: usize,
    min_x: i16,
    min_y: i16,
    min_z: i16,
    max_x: i16,
    max_y: i16,
    max_z: i16,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let state = &*ptr;
    let out = std::slice::from_raw_parts_mut(out_buf, out_len);
    let bounds = Bounds::new(min_x, min_y, min_z, max_x, max_y, max_z);
    match potts::extract_tags(state.stepper.grid(), out, bounds) {
        Ok(count) => count as u64,
        Err(err) => {
            warn!(%err, "cpm_extract_tags failed");
            0
        }
    }
}

/// Imports owner IDs of a rectangular region from a flat buffer.
///
/// # Layout
/// The buffer is expected to be in z,y,x order (matching `cpm_extract_ids`).
/// Every nonzero ID must belong to a registered cell; negative values are
/// read as media. All cells are re-measured afterwards.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - `in_buf` must point to at least `in_len` readable `i32` values
///
/// # Returns
/// Number of values read, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn cpm_import_ids(
    ptr: *mut State,
    in_buf: *const i32,
    in_len: usize,
    min_x: i16,
    min_y: i16,
    min_z: i16,
    max_x: i16,
    max_y: i16,
    max_z: i16,
) -> u64 {
    if ptr.is_null() || in_buf.is_null() {
        return 0;
    }

    let state = &mut *ptr;
    let input = std::slice::from_raw_parts(in_buf, in_len);
    let bounds = Bounds::new(min_x, min_y, min_z, max_x, max_y, max_z);
    match state.stepper.import_ids(input, bounds) {
        Ok(count) => count as u64,
        Err(err) => {
            warn!(%err, "cpm_import_ids failed");
            0
        }
    }
}
