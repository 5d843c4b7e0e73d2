//! Cell capabilities consumed by the energy model and the stepper.
//!
//! The stepper never touches cell internals: it reads through [`Cell`] and
//! reports accepted flips through the `add_*`/`remove_*` hooks. Lookups for
//! anything a cell does not define return `NaN`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::grid::Census;
use crate::error::PottsError;

/// Tag of media and untagged voxels.
pub const TAG_UNDEFINED: i32 = 0;
/// Region every voxel of a regioned cell starts in.
pub const TAG_DEFAULT: i32 = -1;
pub const TAG_NUCLEUS: i32 = -2;

/// Named regions sit below the default tag and keep their own connectivity.
#[inline]
pub fn is_named_region(tag: i32) -> bool {
    tag < TAG_DEFAULT
}

/// Constraint terms that carry a lambda weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constraint {
    Volume,
    Surface,
}

pub trait Cell {
    fn id(&self) -> i32;
    /// Population code; `0` is reserved for media.
    fn population(&self) -> usize;
    fn volume(&self) -> i32;
    fn surface(&self) -> i32;
    fn target_volume(&self) -> f64;
    fn target_surface(&self) -> f64;
    fn lambda(&self, constraint: Constraint) -> f64;
    /// Adhesion of this cell's population to `population` (`0` is media).
    fn adhesion(&self, population: usize) -> f64;

    /// Apply an accepted flip that moved a voxel into this cell.
    fn add_voxel(&mut self, surface_change: i32);
    /// Apply an accepted flip that moved a voxel out of this cell.
    fn remove_voxel(&mut self, surface_change: i32);
    /// Overwrite cached counters with a from-scratch measurement.
    fn sync(&mut self, census: &Census);

    fn has_regions(&self) -> bool {
        false
    }

    fn region_volume(&self, _tag: i32) -> Option<i32> {
        None
    }

    fn region_surface(&self, _tag: i32) -> Option<i32> {
        None
    }

    fn region_target_volume(&self, _tag: i32) -> f64 {
        f64::NAN
    }

    fn region_target_surface(&self, _tag: i32) -> f64 {
        f64::NAN
    }

    fn region_lambda(&self, _constraint: Constraint, _tag: i32) -> f64 {
        f64::NAN
    }

    fn region_adhesion(&self, _a: i32, _b: i32) -> f64 {
        f64::NAN
    }

    fn add_region_voxel(&mut self, _tag: i32, _surface_change: i32) {}

    fn remove_region_voxel(&mut self, _tag: i32, _surface_change: i32) {}
}

/// Lambda weights of the quadratic constraint terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lambdas {
    pub volume: f64,
    pub surface: f64,
}

impl Lambdas {
    pub fn get(&self, constraint: Constraint) -> f64 {
        match constraint {
            Constraint::Volume => self.volume,
            Constraint::Surface => self.surface,
        }
    }
}

impl Default for Lambdas {
    fn default() -> Self {
        Self {
            volume: 0.0,
            surface: 0.0,
        }
    }
}

/// Counters and constraints of one sub-cellular region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionState {
    pub volume: i32,
    pub surface: i32,
    pub target_volume: f64,
    pub target_surface: f64,
    pub lambdas: Lambdas,
    /// Adhesion to other regions of the same cell, keyed by tag.
    pub adhesion: BTreeMap<i32, f64>,
}

impl RegionState {
    fn new(target_volume: f64, target_surface: f64, lambdas: Lambdas) -> Self {
        Self {
            volume: 0,
            surface: 0,
            target_volume,
            target_surface,
            lambdas,
            adhesion: BTreeMap::new(),
        }
    }
}

/// Data-driven cell used by the C ABI and the tests.
///
/// Planar and volumetric cells share this type; dimensionality only changes
/// the surface deltas the stepper reports.
#[derive(Debug, Clone, PartialEq)]
pub struct PottsCell {
    id: i32,
    population: usize,
    volume: i32,
    surface: i32,
    target_volume: f64,
    target_surface: f64,
    lambdas: Lambdas,
    /// Adhesion row indexed by population, entry 0 is media.
    adhesion: Vec<f64>,
    regions: BTreeMap<i32, RegionState>,
}

impl PottsCell {
    pub fn new(id: i32, population: usize) -> Self {
        Self {
            id,
            population,
            volume: 0,
            surface: 0,
            target_volume: 0.0,
            target_surface: 0.0,
            lambdas: Lambdas::default(),
            adhesion: Vec::new(),
            regions: BTreeMap::new(),
        }
    }

    pub fn with_targets(mut self, volume: f64, surface: f64) -> Self {
        self.target_volume = volume;
        self.target_surface = surface;
        self
    }

    pub fn with_lambdas(mut self, volume: f64, surface: f64) -> Self {
        self.lambdas = Lambdas { volume, surface };
        self
    }

    pub fn with_adhesion(mut self, row: Vec<f64>) -> Self {
        self.adhesion = row;
        self
    }

    /// Set one adhesion entry, padding unknown populations with `NaN`.
    pub fn set_adhesion(&mut self, population: usize, value: f64) {
        if self.adhesion.len() <= population {
            self.adhesion.resize(population + 1, f64::NAN);
        }
        self.adhesion[population] = value;
    }

    /// Declare a region. The default region is declared alongside the first one.
    pub fn add_region(
        &mut self,
        tag: i32,
        target_volume: f64,
        target_surface: f64,
        lambdas: Lambdas,
    ) -> Result<(), PottsError> {
        if tag >= 0 {
            return Err(PottsError::InvalidTag(tag));
        }
        self.regions
            .entry(TAG_DEFAULT)
            .or_insert_with(|| RegionState::new(0.0, 0.0, Lambdas::default()));
        self.regions.insert(
            tag,
            RegionState::new(target_volume, target_surface, lambdas),
        );
        Ok(())
    }

    pub fn set_region_adhesion(&mut self, a: i32, b: i32, value: f64) -> Result<(), PottsError> {
        let region = self.regions.get_mut(&a).ok_or(PottsError::InvalidTag(a))?;
        region.adhesion.insert(b, value);
        Ok(())
    }

    pub fn region(&self, tag: i32) -> Option<&RegionState> {
        self.regions.get(&tag)
    }
}

impl Cell for PottsCell {
    fn id(&self) -> i32 {
        self.id
    }

    fn population(&self) -> usize {
        self.population
    }

    fn volume(&self) -> i32 {
        self.volume
    }

    fn surface(&self) -> i32 {
        self.surface
    }

    fn target_volume(&self) -> f64 {
        self.target_volume
    }

    fn target_surface(&self) -> f64 {
        self.target_surface
    }

    fn lambda(&self, constraint: Constraint) -> f64 {
        self.lambdas.get(constraint)
    }

    fn adhesion(&self, population: usize) -> f64 {
        self.adhesion.get(population).copied().unwrap_or(f64::NAN)
    }

    fn add_voxel(&mut self, surface_change: i32) {
        self.volume += 1;
        self.surface += surface_change;
    }

    fn remove_voxel(&mut self, surface_change: i32) {
        self.volume -= 1;
        self.surface += surface_change;
    }

    fn sync(&mut self, census: &Census) {
        self.volume = census.volume;
        self.surface = census.surface;
        for (tag, region) in self.regions.iter_mut() {
            let (volume, surface) = census.regions.get(tag).copied().unwrap_or((0, 0));
            region.volume = volume;
            region.surface = surface;
        }
    }

    fn has_regions(&self) -> bool {
        !self.regions.is_empty()
    }

    fn region_volume(&self, tag: i32) -> Option<i32> {
        self.regions.get(&tag).map(|r| r.volume)
    }

    fn region_surface(&self, tag: i32) -> Option<i32> {
        self.regions.get(&tag).map(|r| r.surface)
    }

    fn region_target_volume(&self, tag: i32) -> f64 {
        self.regions.get(&tag).map_or(f64::NAN, |r| r.target_volume)
    }

    fn region_target_surface(&self, tag: i32) -> f64 {
        self.regions.get(&tag).map_or(f64::NAN, |r| r.target_surface)
    }

    fn region_lambda(&self, constraint: Constraint, tag: i32) -> f64 {
        self.regions
            .get(&tag)
            .map_or(f64::NAN, |r| r.lambdas.get(constraint))
    }

    fn region_adhesion(&self, a: i32, b: i32) -> f64 {
        self.regions
            .get(&a)
            .and_then(|r| r.adhesion.get(&b).copied())
            .unwrap_or(f64::NAN)
    }

    fn add_region_voxel(&mut self, tag: i32, surface_change: i32) {
        if let Some(region) = self.regions.get_mut(&tag) {
            region.volume += 1;
            region.surface += surface_change;
        }
    }

    fn remove_region_voxel(&mut self, tag: i32, surface_change: i32) {
        if let Some(region) = self.regions.get_mut(&tag) {
            region.volume -= 1;
            region.surface += surface_change;
        }
    }
}

/// Registry of live cells keyed by ID.
#[derive(Debug, Clone)]
pub struct CellTable<C> {
    cells: BTreeMap<i32, C>,
}

impl<C> Default for CellTable<C> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<C: Cell> CellTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: C) -> Result<(), PottsError> {
        let id = cell.id();
        if id <= 0 {
            return Err(PottsError::ReservedId(id));
        }
        if self.cells.contains_key(&id) {
            return Err(PottsError::DuplicateCell(id));
        }
        self.cells.insert(id, cell);
        Ok(())
    }

    pub fn remove(&mut self, id: i32) -> Option<C> {
        self.cells.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: i32) -> Option<&C> {
        self.cells.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: i32) -> Option<&mut C> {
        self.cells.get_mut(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.cells.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut C> {
        self.cells.values_mut()
    }
}
