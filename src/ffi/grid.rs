//! Voxel and tag access, and stepping.

use tracing::warn;

use crate::state::State;

/// Assigns a voxel to cell `id`, or to media when `id` is 0.
///
/// Cell counters are updated as for an accepted flip; the topology and
/// energy checks are skipped.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the voxel or cell is invalid
#[no_mangle]
pub unsafe extern "C" fn cpm_assign_voxel(ptr: *mut State, x: i16, y: i16, z: i16, id: i32) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    match state.stepper.assign(x, y, z, id) {
        Ok(()) => 0,
        Err(err) => {
            warn!(%err, "cpm_assign_voxel failed");
            2
        }
    }
}

/// Gets the owner of a voxel.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The owner ID; 0 if out of bounds, null pointer, or media.
#[no_mangle]
pub unsafe extern "C" fn cpm_get_voxel(ptr: *const State, x: i16, y: i16, z: i16) -> i32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).stepper.grid().owner(x, y, z)
}

/// Moves a voxel into region `tag` of the cell that owns it.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the lattice is untagged or the
/// voxel, owner or tag is invalid
#[no_mangle]
pub unsafe extern "C" fn cpm_assign_tag(ptr: *mut State, x: i16, y: i16, z: i16, tag: i32) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    match state.stepper.assign_tag(x, y, z, tag) {
        Ok(()) => 0,
        Err(err) => {
            warn!(%err, "cpm_assign_tag failed");
            2
        }
    }
}

/// Gets the region tag of a voxel.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The tag; 0 if out of bounds, untagged, null pointer, or media.
#[no_mangle]
pub unsafe extern "C" fn cpm_get_tag(ptr: *const State, x: i16, y: i16, z: i16) -> i32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).stepper.grid().tag(x, y, z)
}

/// Runs one tick of Monte Carlo proposals.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// Number of accepted flips, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn cpm_tick(ptr: *mut State) -> u64 {
    if ptr.is_null() {
        return 0;
    }

    let state = &mut *ptr;
    state.tick().accepted as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::cell::{cpm_add_cell, cpm_add_region};
    use crate::ffi::lifecycle;
    use crate::potts::{TAG_DEFAULT, TAG_NUCLEUS};
    use std::ptr;

    #[test]
    fn test_assign_and_get_voxel() {
        unsafe {
            let state = lifecycle::cpm_create(8, 8, 1, 10.0, 0, 3);
            assert_eq!(cpm_add_cell(state, 1, 1, 4.0, 8.0, 1.0, 1.0), 0);

            assert_eq!(cpm_assign_voxel(state, 2, 2, 0, 1), 0);
            assert_eq!(cpm_get_voxel(state, 2, 2, 0), 1);

            assert_eq!(cpm_assign_voxel(state, 2, 2, 0, 0), 0);
            assert_eq!(cpm_get_voxel(state, 2, 2, 0), 0);

            // Unknown cell and out-of-bounds voxel
            assert_eq!(cpm_assign_voxel(state, 2, 2, 0, 5), 2);
            assert_eq!(cpm_assign_voxel(state, 8, 2, 0, 1), 2);
            assert_eq!(cpm_get_voxel(state, -1, 0, 0), 0);

            lifecycle::cpm_destroy(state);
        }
    }

    #[test]
    fn test_assign_tag() {
        unsafe {
            let state = lifecycle::cpm_create(8, 8, 1, 10.0, 1, 3);
            cpm_add_cell(state, 1, 1, 4.0, 8.0, 1.0, 1.0);
            cpm_add_region(state, 1, TAG_NUCLEUS, 1.0, 4.0, 1.0, 0.0);
            cpm_assign_voxel(state, 2, 2, 0, 1);
            assert_eq!(cpm_get_tag(state, 2, 2, 0), TAG_DEFAULT);

            assert_eq!(cpm_assign_tag(state, 2, 2, 0, TAG_NUCLEUS), 0);
            assert_eq!(cpm_get_tag(state, 2, 2, 0), TAG_NUCLEUS);

            // Media cannot carry a region
            assert_eq!(cpm_assign_tag(state, 4, 4, 0, TAG_NUCLEUS), 2);
            assert_eq!(cpm_assign_tag(state, 2, 2, 0, 3), 2);

            lifecycle::cpm_destroy(state);
        }
    }

    #[test]
    fn test_tick_advances_counter() {
        unsafe {
            let state = lifecycle::cpm_create(8, 8, 1, 10.0, 0, 3);
            cpm_tick(state);
            cpm_tick(state);
            assert_eq!(lifecycle::cpm_get_tick(state), 2);
            lifecycle::cpm_destroy(state);
        }
    }

    #[test]
    fn test_null_pointer_handling() {
        unsafe {
            assert_eq!(cpm_assign_voxel(ptr::null_mut(), 0, 0, 0, 1), 1);
            assert_eq!(cpm_assign_tag(ptr::null_mut(), 0, 0, 0, -2), 1);
            assert_eq!(cpm_get_voxel(ptr::null(), 0, 0, 0), 0);
            assert_eq!(cpm_get_tag(ptr::null(), 0, 0, 0), 0);
            assert_eq!(cpm_tick(ptr::null_mut()), 0);
        }
    }
}
