//! Cell registration, parameters, and counter queries.

use tracing::warn;

use crate::potts::{Cell, Lambdas, PottsCell};
use crate::state::State;

/// Registers a cell with its volume and surface constraints.
///
/// Voxels the cell already owns are measured on registration.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the ID is reserved or taken
#[no_mangle]
pub unsafe extern "C" fn cpm_add_cell(
    ptr: *mut State,
    id: i32,
    population: u32,
    target_volume: f64,
    target_surface: f64,
    lambda_volume: f64,
    lambda_surface: f64,
) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    let cell = PottsCell::new(id, population as usize)
        .with_targets(target_volume, target_surface)
        .with_lambdas(lambda_volume, lambda_surface);
    match state.stepper.add_cell(cell) {
        Ok(()) => 0,
        Err(err) => {
            warn!(%err, "cpm_add_cell failed");
            2
        }
    }
}

/// Deregisters a cell and returns its voxels to media.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the cell is unknown
#[no_mangle]
pub unsafe extern "C" fn cpm_remove_cell(ptr: *mut State, id: i32) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    match state.stepper.remove_cell(id) {
        Ok(_) => 0,
        Err(err) => {
            warn!(%err, "cpm_remove_cell failed");
            2
        }
    }
}

/// Sets the adhesion of cell `id` to `population` (0 is media).
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the cell is unknown
#[no_mangle]
pub unsafe extern "C" fn cpm_set_adhesion(ptr: *mut State, id: i32, population: u32, value: f64) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    let result = state.stepper.update_cell(id, |cell| {
        cell.set_adhesion(population as usize, value);
        Ok(())
    });
    match result {
        Ok(()) => 0,
        Err(err) => {
            warn!(%err, "cpm_set_adhesion failed");
            2
        }
    }
}

/// Declares region `tag` on cell `id`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the cell is unknown or the tag is
/// not negative
#[no_mangle]
pub unsafe extern "C" fn cpm_add_region(
    ptr: *mut State,
    id: i32,
    tag: i32,
    target_volume: f64,
    target_surface: f64,
    lambda_volume: f64,
    lambda_surface: f64,
) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    let lambdas = Lambdas {
        volume: lambda_volume,
        surface: lambda_surface,
    };
    let result = state.stepper.update_cell(id, |cell| {
        cell.add_region(tag, target_volume, target_surface, lambdas)
    });
    match result {
        Ok(()) => 0,
        Err(err) => {
            warn!(%err, "cpm_add_region failed");
            2
        }
    }
}

/// Sets the adhesion between regions `a` and `b` of cell `id`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// 0 on success, 1 on null pointer, 2 if the cell or region `a` is unknown
#[no_mangle]
pub unsafe extern "C" fn cpm_set_region_adhesion(
    ptr: *mut State,
    id: i32,
    a: i32,
    b: i32,
    value: f64,
) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let state = &mut *ptr;
    match state
        .stepper
        .update_cell(id, |cell| cell.set_region_adhesion(a, b, value))
    {
        Ok(()) => 0,
        Err(err) => {
            warn!(%err, "cpm_set_region_adhesion failed");
            2
        }
    }
}

/// Gets the cached volume of a cell.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The volume, or 0 if the cell is unknown or ptr is null.
#[no_mangle]
pub unsafe extern "C" fn cpm_cell_volume(ptr: *const State, id: i32) -> i32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).stepper.cell(id).map_or(0, Cell::volume)
}

/// Gets the cached surface of a cell.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The surface, or 0 if the cell is unknown or ptr is null.
#[no_mangle]
pub unsafe extern "C" fn cpm_cell_surface(ptr: *const State, id: i32) -> i32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).stepper.cell(id).map_or(0, Cell::surface)
}

/// Gets the cached volume of region `tag` of a cell.
///
/// # Safety
/// - `ptr` must be a valid pointer to a State, or null
///
/// # Returns
/// The region volume, or 0 if the cell or region is unknown or ptr is null.
#[no_mangle]
pub unsafe extern "C" fn cpm_region_volume(ptr: *const State, id: i32, tag: i32) -> i32 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr)
        .stepper
        .cell(id)
        .and_then(|cell| cell.region_volume(tag))
        .unwrap_or(0)
}
