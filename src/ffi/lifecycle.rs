//! State creation, destruction, and size and tick queries.

use tracing::warn;

use crate::config::PottsConfig;
use crate::state::State;

/// Creates a new lattice and returns an opaque pointer.
///
/// A `depth` of 1 selects the planar neighborhood. A nonzero `tagged`
/// allocates the region tag layer.
///
/// # Returns
/// A pointer to a new State, or null if the configuration is invalid.
///
/// # Safety
/// The returned pointer must eventually be freed with `cpm_destroy()`.
#[no_mangle]
pub extern "C" fn cpm_create(
    width: i16,
    height: i16,
    depth: i16,
    temperature: f64,
    tagged: u8,
    seed: u64,
) -> *mut State {
    let config = PottsConfig {
        width,
        height,
        depth,
        temperature,
        tagged: tagged != 0,
        rng_seed: Some(seed),
        ..PottsConfig::default()
    };
    match State::new(config) {
        Ok(state) => Box::into_raw(Box::new(state)),
        Err(err) => {
            warn!(%err, "cpm_create rejected configuration");
            std::ptr::null_mut()
        }
    }
}

/// Destroys a lattice and frees its memory.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `cpm_create()`, or null
/// - `ptr` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn cpm_destroy(ptr: *mut State) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Gets the number of completed ticks.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The tick counter, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn cpm_get_tick(ptr: *const State) -> u64 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).tick
}

/// Writes the lattice extent into the three output pointers.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
/// - the output pointers must be valid for writes, or null
///
/// # Returns
/// 0 on success, 1 on failure (null pointer)
#[no_mangle]
pub unsafe extern "C" fn cpm_get_size(
    ptr: *const State,
    width: *mut i16,
    height: *mut i16,
    depth: *mut i16,
) -> i32 {
    if ptr.is_null() || width.is_null() || height.is_null() || depth.is_null() {
        return 1;
    }
    let grid = (*ptr).stepper.grid();
    *width = grid.width;
    *height = grid.height;
    *depth = grid.depth;
    0
}
