//! Monte Carlo stepping with Metropolis acceptance.
//!
//! One proposal picks a random interior voxel and a candidate owner (or, inside
//! a cell with regions, a candidate region) from its face neighbors. Flips
//! that would break the topology of either side are rejected before any
//! energy is computed. The rest are accepted with probability
//! `min(1, exp(-dH / T))`.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info, trace};

use super::cell::{is_named_region, Cell, CellTable, TAG_DEFAULT, TAG_UNDEFINED};
use super::connectivity::{
    connectivity, neighborhood, tag_neighborhood, unique_owners, unique_tags,
};
use super::energy::EnergyModel;
use super::grid::{Census, VoxelGrid, MEDIA};
use super::neighborhood::Neighborhood;
use super::region::{self, Bounds};
use crate::config::PottsConfig;
use crate::error::PottsError;

/// Result of a single proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// Failed the Metropolis test.
    Rejected,
    /// Would have split or hole-punched a cell or region.
    Disconnected,
    /// The voxel had no candidate owner or region.
    Idle,
}

/// Proposal counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub proposals: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub disconnected: usize,
    pub idle: usize,
}

impl TickSummary {
    fn record(&mut self, outcome: Outcome) {
        self.proposals += 1;
        match outcome {
            Outcome::Accepted => self.accepted += 1,
            Outcome::Rejected => self.rejected += 1,
            Outcome::Disconnected => self.disconnected += 1,
            Outcome::Idle => self.idle += 1,
        }
    }
}

/// Owns the lattice and its cells and evolves them one proposal at a time.
#[derive(Debug, Clone)]
pub struct MonteCarloStepper<C> {
    config: PottsConfig,
    grid: VoxelGrid,
    cells: CellTable<C>,
}

fn pick<R: Rng>(set: &BTreeSet<i32>, rng: &mut R) -> Option<i32> {
    if set.is_empty() {
        return None;
    }
    set.iter().nth(rng.random_range(0..set.len())).copied()
}

impl<C: Cell> MonteCarloStepper<C> {
    pub fn new(config: PottsConfig) -> Result<Self, PottsError> {
        config.validate()?;
        let grid = VoxelGrid::from_config(&config);
        info!(
            width = config.width,
            height = config.height,
            depth = config.depth,
            tagged = config.tagged,
            steps_per_tick = config.steps_per_tick(),
            "created potts lattice"
        );
        Ok(Self {
            config,
            grid,
            cells: CellTable::new(),
        })
    }

    pub fn config(&self) -> &PottsConfig {
        &self.config
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn cells(&self) -> &CellTable<C> {
        &self.cells
    }

    pub fn cell(&self, id: i32) -> Option<&C> {
        self.cells.get(id)
    }

    pub fn energy(&self) -> EnergyModel<'_, C> {
        EnergyModel::new(&self.grid, &self.cells)
    }

    /// From-scratch measurement of a cell's shape on the current grid.
    pub fn measure(&self, id: i32) -> Census {
        self.grid.census(id)
    }

    /// Register a cell, measuring its counters from the voxels it already owns.
    pub fn add_cell(&mut self, mut cell: C) -> Result<(), PottsError> {
        let id = cell.id();
        if id <= MEDIA {
            return Err(PottsError::ReservedId(id));
        }
        if self.cells.contains(id) {
            return Err(PottsError::DuplicateCell(id));
        }
        let census = self.grid.census(id);
        cell.sync(&census);
        debug!(
            id,
            population = cell.population(),
            volume = census.volume,
            surface = census.surface,
            "registered cell"
        );
        self.cells.insert(cell)
    }

    /// Edit a registered cell, then re-measure it so newly declared regions
    /// start from the voxels they already hold.
    pub fn update_cell<F>(&mut self, id: i32, edit: F) -> Result<(), PottsError>
    where
        F: FnOnce(&mut C) -> Result<(), PottsError>,
    {
        let census = self.grid.census(id);
        let cell = self.cells.get_mut(id).ok_or(PottsError::UnknownCell(id))?;
        edit(cell)?;
        cell.sync(&census);
        Ok(())
    }

    /// Deregister a cell and return its voxels to media.
    pub fn remove_cell(&mut self, id: i32) -> Result<C, PottsError> {
        let cell = self.cells.remove(id).ok_or(PottsError::UnknownCell(id))?;
        for z in 0..self.grid.depth {
            for y in 0..self.grid.height {
                for x in 0..self.grid.width {
                    if self.grid.owner(x, y, z) == id {
                        self.grid.set_owner(x, y, z, MEDIA);
                        self.grid.set_tag(x, y, z, TAG_UNDEFINED);
                    }
                }
            }
        }
        debug!(id, "removed cell");
        Ok(cell)
    }

    /// Force a voxel to a new owner, keeping cell counters consistent.
    ///
    /// Bypasses the connectivity and energy checks; meant for placing cells.
    pub fn assign(&mut self, x: i16, y: i16, z: i16, id: i32) -> Result<(), PottsError> {
        if !self.grid.in_bounds(x, y, z) {
            return Err(PottsError::OutOfBounds { x, y, z });
        }
        if id < MEDIA {
            return Err(PottsError::ReservedId(id));
        }
        if id != MEDIA && !self.cells.contains(id) {
            return Err(PottsError::UnknownCell(id));
        }
        let source = self.grid.owner(x, y, z);
        if source != id {
            self.commit(source, id, x, y, z);
        }
        Ok(())
    }

    /// Force a voxel into region `tag` of the cell that owns it.
    pub fn assign_tag(&mut self, x: i16, y: i16, z: i16, tag: i32) -> Result<(), PottsError> {
        if !self.grid.is_tagged() {
            return Err(PottsError::Untagged);
        }
        if !self.grid.in_bounds(x, y, z) {
            return Err(PottsError::OutOfBounds { x, y, z });
        }
        if tag >= 0 {
            return Err(PottsError::InvalidTag(tag));
        }
        let id = self.grid.owner(x, y, z);
        let cell = self.cells.get(id).ok_or(PottsError::UnknownCell(id))?;
        if tag != TAG_DEFAULT && cell.region_volume(tag).is_none() {
            return Err(PottsError::InvalidTag(tag));
        }
        let source = self.grid.tag(x, y, z);
        if source != tag {
            self.commit_tag(id, source, tag, x, y, z);
        }
        Ok(())
    }

    /// Copy owner IDs into a rectangular region, then re-measure every cell.
    ///
    /// Every nonzero ID in `input` must belong to a registered cell. Imported
    /// voxels start in the default region.
    pub fn import_ids(&mut self, input: &[i32], bounds: Bounds) -> Result<usize, PottsError> {
        if let Some(&unknown) = input
            .iter()
            .find(|&&id| id > MEDIA && !self.cells.contains(id))
        {
            return Err(PottsError::UnknownCell(unknown));
        }
        let count = region::import_ids(&mut self.grid, input, bounds)?;
        for cell in self.cells.iter_mut() {
            cell.sync(&self.grid.census(cell.id()));
        }
        debug!(count, "imported owner region");
        Ok(count)
    }

    fn random_voxel<R: Rng>(&self, rng: &mut R) -> (i16, i16, i16) {
        let x = rng.random_range(1..self.grid.width - 1);
        let y = rng.random_range(1..self.grid.height - 1);
        let z = match self.grid.neighborhood() {
            Neighborhood::Planar => 0,
            Neighborhood::Volumetric => rng.random_range(1..self.grid.depth - 1),
        };
        (x, y, z)
    }

    /// Run one proposal at a random interior voxel.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Outcome {
        let (x, y, z) = self.random_voxel(rng);
        self.propose(x, y, z, rng)
    }

    /// Run one proposal at a given voxel. Out-of-bounds voxels are idle.
    pub fn propose<R: Rng>(&mut self, x: i16, y: i16, z: i16, rng: &mut R) -> Outcome {
        if !self.grid.in_bounds(x, y, z) {
            return Outcome::Idle;
        }
        let id = self.grid.owner(x, y, z);
        let owners = unique_owners(&self.grid, x, y, z);
        let regioned = self.grid.is_tagged()
            && id != MEDIA
            && self.cells.get(id).is_some_and(Cell::has_regions);
        let tags = if regioned {
            unique_tags(&self.grid, x, y, z)
        } else {
            BTreeSet::new()
        };

        let flip_owner = match (owners.is_empty(), tags.is_empty()) {
            (true, true) => return Outcome::Idle,
            (false, true) => true,
            (true, false) => false,
            (false, false) => rng.random_bool(0.5),
        };

        if flip_owner {
            match pick(&owners, rng) {
                Some(target) => self.flip(id, target, x, y, z, rng),
                None => Outcome::Idle,
            }
        } else {
            let source = self.grid.tag(x, y, z);
            match pick(&tags, rng) {
                Some(target) => self.flip_tag(id, source, target, x, y, z, rng),
                None => Outcome::Idle,
            }
        }
    }

    /// Proposals equal to `steps_per_tick`.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> TickSummary {
        let mut summary = TickSummary::default();
        for _ in 0..self.config.steps_per_tick() {
            summary.record(self.step(rng));
        }
        debug!(
            proposals = summary.proposals,
            accepted = summary.accepted,
            rejected = summary.rejected,
            disconnected = summary.disconnected,
            idle = summary.idle,
            "tick complete"
        );
        summary
    }

    /// Attempt to move `(x, y, z)` from `source` to `target`.
    ///
    /// Idle unless the voxel is in bounds and owned by `source`. The random
    /// source is only drawn from when both sides stay connected.
    pub fn flip<R: Rng>(
        &mut self,
        source: i32,
        target: i32,
        x: i16,
        y: i16,
        z: i16,
        rng: &mut R,
    ) -> Outcome {
        if !self.grid.in_bounds(x, y, z) || self.grid.owner(x, y, z) != source {
            return Outcome::Idle;
        }
        let zero = source == MEDIA;
        let tag = self.grid.tag(x, y, z);

        for id in [source, target] {
            if id <= MEDIA {
                continue;
            }
            if !connectivity(&neighborhood(&self.grid, id, x, y, z), zero) {
                return Outcome::Disconnected;
            }
            if is_named_region(tag)
                && !connectivity(&tag_neighborhood(&self.grid, id, tag, x, y, z), false)
            {
                return Outcome::Disconnected;
            }
        }

        let dh = self
            .energy()
            .delta(&self.config.terms, source, target, x, y, z);
        if self.accept(dh, rng) {
            self.commit(source, target, x, y, z);
            Outcome::Accepted
        } else {
            Outcome::Rejected
        }
    }

    /// Attempt to move `(x, y, z)` between two regions of cell `id`.
    ///
    /// Idle unless the voxel is in bounds, owned by `id`, and tagged `source_tag`.
    pub fn flip_tag<R: Rng>(
        &mut self,
        id: i32,
        source_tag: i32,
        target_tag: i32,
        x: i16,
        y: i16,
        z: i16,
        rng: &mut R,
    ) -> Outcome {
        if !self.grid.in_bounds(x, y, z)
            || self.grid.owner(x, y, z) != id
            || self.grid.tag(x, y, z) != source_tag
        {
            return Outcome::Idle;
        }
        let zero = source_tag == TAG_DEFAULT;

        for tag in [source_tag, target_tag] {
            if is_named_region(tag)
                && !connectivity(&tag_neighborhood(&self.grid, id, tag, x, y, z), zero)
            {
                return Outcome::Disconnected;
            }
        }

        let dh = self
            .energy()
            .tag_delta(&self.config.terms, id, source_tag, target_tag, x, y, z);
        if self.accept(dh, rng) {
            self.commit_tag(id, source_tag, target_tag, x, y, z);
            Outcome::Accepted
        } else {
            Outcome::Rejected
        }
    }

    /// Metropolis rule. A `NaN` energy change is never accepted.
    fn accept<R: Rng>(&self, dh: f64, rng: &mut R) -> bool {
        let p = if dh < 0.0 {
            1.0
        } else {
            (-dh / self.config.temperature).exp()
        };
        rng.random::<f64>() < p
    }

    fn commit(&mut self, source: i32, target: i32, x: i16, y: i16, z: i16) {
        let [source_change, target_change] =
            self.energy().calculate_change(source, target, x, y, z);

        let tagged = self.grid.is_tagged();
        let old_tag = self.grid.tag(x, y, z);
        let new_tag = if target == MEDIA {
            TAG_UNDEFINED
        } else {
            TAG_DEFAULT
        };
        let faces = self.grid.face_count(x, y, z);
        let source_region_change = 2 * self.grid.tag_face_contacts(source, old_tag, x, y, z) - faces;
        let target_region_change = faces - 2 * self.grid.tag_face_contacts(target, new_tag, x, y, z);

        self.grid.set_owner(x, y, z, target);
        if tagged {
            self.grid.set_tag(x, y, z, new_tag);
        }

        if let Some(cell) = self.cells.get_mut(source) {
            cell.remove_voxel(source_change);
            if tagged {
                cell.remove_region_voxel(old_tag, source_region_change);
            }
        }
        if let Some(cell) = self.cells.get_mut(target) {
            cell.add_voxel(target_change);
            if tagged {
                cell.add_region_voxel(new_tag, target_region_change);
            }
        }
        trace!(x, y, z, source, target, "flipped voxel");
    }

    fn commit_tag(&mut self, id: i32, source_tag: i32, target_tag: i32, x: i16, y: i16, z: i16) {
        let [source_change, target_change] = self
            .energy()
            .calculate_tag_change(id, source_tag, target_tag, x, y, z);

        self.grid.set_tag(x, y, z, target_tag);

        if let Some(cell) = self.cells.get_mut(id) {
            cell.remove_region_voxel(source_tag, source_change);
            cell.add_region_voxel(target_tag, target_change);
        }
        trace!(x, y, z, id, source_tag, target_tag, "flipped region");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Term;
    use crate::potts::cell::{Lambdas, PottsCell, TAG_NUCLEUS};
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    /// Yields the same word forever.
    struct Constant(u64);

    impl RngCore for Constant {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0 as u8);
        }
    }

    /// Draws 0.0 from `random::<f64>()`, so every finite energy change passes.
    fn always() -> Constant {
        Constant(0)
    }

    /// Draws values just below 1.0, so only non-positive changes pass.
    fn never() -> Constant {
        Constant(u64::MAX)
    }

    fn cell(id: i32, population: usize) -> PottsCell {
        PottsCell::new(id, population)
            .with_targets(4.0, 8.0)
            .with_lambdas(1.0, 1.0)
            .with_adhesion(vec![1.0, 2.0, 3.0])
    }

    /// Two 2x2 cells side by side in an 8x6 planar lattice.
    fn lattice(tagged: bool) -> MonteCarloStepper<PottsCell> {
        let mut config = PottsConfig::planar(8, 6);
        config.tagged = tagged;
        let mut stepper = MonteCarloStepper::new(config).unwrap();
        stepper.add_cell(cell(1, 1)).unwrap();
        stepper.add_cell(cell(2, 2)).unwrap();
        for y in 2..4 {
            for x in 1..3 {
                stepper.assign(x, y, 0, 1).unwrap();
            }
            for x in 3..5 {
                stepper.assign(x, y, 0, 2).unwrap();
            }
        }
        stepper
    }

    fn assert_consistent(stepper: &MonteCarloStepper<PottsCell>) {
        for cell in stepper.cells().iter() {
            let census = stepper.measure(cell.id());
            assert_eq!(cell.volume(), census.volume, "volume of cell {}", cell.id());
            assert_eq!(cell.surface(), census.surface, "surface of cell {}", cell.id());
            if !cell.has_regions() {
                continue;
            }
            for (tag, (volume, surface)) in &census.regions {
                assert_eq!(cell.region_volume(*tag), Some(*volume));
                assert_eq!(cell.region_surface(*tag), Some(*surface));
            }
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PottsConfig::planar(2, 2);
        assert!(MonteCarloStepper::<PottsCell>::new(config).is_err());
    }

    #[test]
    fn test_assign_keeps_counters() {
        let stepper = lattice(false);
        assert_eq!(stepper.cell(1).map(Cell::volume), Some(4));
        assert_eq!(stepper.cell(1).map(Cell::surface), Some(8));
        assert_consistent(&stepper);
    }

    #[test]
    fn test_assign_errors() {
        let mut stepper = lattice(false);
        assert_eq!(stepper.assign(9, 0, 0, 1), Err(PottsError::OutOfBounds { x: 9, y: 0, z: 0 }));
        assert_eq!(stepper.assign(1, 1, 0, 7), Err(PottsError::UnknownCell(7)));
        assert_eq!(stepper.assign(1, 1, 0, -1), Err(PottsError::ReservedId(-1)));
        assert_eq!(stepper.assign_tag(1, 2, 0, TAG_NUCLEUS), Err(PottsError::Untagged));
    }

    #[test]
    fn test_remove_cell() {
        let mut stepper = lattice(false);
        let removed = stepper.remove_cell(2).unwrap();
        assert_eq!(removed.id(), 2);
        assert_eq!(stepper.grid().count(2), 0);
        assert_eq!(stepper.remove_cell(2).err(), Some(PottsError::UnknownCell(2)));
        assert_eq!(stepper.add_cell(cell(1, 1)), Err(PottsError::DuplicateCell(1)));
        assert_consistent(&stepper);
    }

    #[test]
    fn test_flip_accepts_with_low_draw() {
        let mut stepper = lattice(false);
        let outcome = stepper.flip(MEDIA, 1, 1, 1, 0, &mut always());
        assert_eq!(outcome, Outcome::Accepted);
        assert_eq!(stepper.grid().owner(1, 1, 0), 1);
        assert_eq!(stepper.cell(1).map(Cell::volume), Some(5));
        assert_consistent(&stepper);
    }

    #[test]
    fn test_flip_rejects_unfavorable_move() {
        let mut stepper = lattice(false);
        let dh = stepper
            .energy()
            .delta(&Term::ALL, MEDIA, 1, 1, 1, 0);
        assert!(dh > 0.0);
        assert_eq!(stepper.flip(MEDIA, 1, 1, 1, 0, &mut never()), Outcome::Rejected);
        assert_eq!(stepper.grid().owner(1, 1, 0), MEDIA);
        assert_consistent(&stepper);
    }

    #[test]
    fn test_flip_rejects_disconnecting_move() {
        let mut config = PottsConfig::planar(7, 5);
        config.terms = Vec::new();
        let mut stepper = MonteCarloStepper::new(config).unwrap();
        stepper.add_cell(cell(1, 1)).unwrap();
        // A horizontal bar; removing its middle splits it.
        for x in 1..4 {
            stepper.assign(x, 2, 0, 1).unwrap();
        }
        let before = stepper.grid().clone();
        assert_eq!(stepper.flip(1, MEDIA, 2, 2, 0, &mut always()), Outcome::Disconnected);
        assert_eq!(stepper.grid(), &before);
        // Removing an end keeps it whole, and a zero energy change always passes.
        assert_eq!(stepper.flip(1, MEDIA, 3, 2, 0, &mut never()), Outcome::Accepted);
        assert_consistent(&stepper);
    }

    #[test]
    fn test_nan_energy_is_never_accepted() {
        let mut config = PottsConfig::planar(8, 6);
        config.terms = vec![Term::Adhesion];
        let mut stepper = MonteCarloStepper::new(config).unwrap();
        // Cell 3 has no adhesion entries at all.
        stepper.add_cell(PottsCell::new(3, 1)).unwrap();
        stepper.assign(2, 2, 0, 3).unwrap();
        assert!(stepper.energy().delta_adhesion(MEDIA, 3, 3, 2, 0).is_nan());
        assert_eq!(stepper.flip(MEDIA, 3, 3, 2, 0, &mut always()), Outcome::Rejected);
        assert_eq!(stepper.grid().owner(3, 2, 0), MEDIA);
        assert_eq!(stepper.cell(3).map(Cell::volume), Some(1));
    }

    #[test]
    fn test_tagged_flip_resets_tags() {
        let mut stepper = lattice(true);
        assert_eq!(stepper.grid().tag(1, 2, 0), TAG_DEFAULT);

        assert_eq!(stepper.flip(MEDIA, 1, 1, 1, 0, &mut always()), Outcome::Accepted);
        assert_eq!(stepper.grid().tag(1, 1, 0), TAG_DEFAULT);

        assert_eq!(stepper.flip(1, MEDIA, 1, 1, 0, &mut always()), Outcome::Accepted);
        assert_eq!(stepper.grid().tag(1, 1, 0), TAG_UNDEFINED);
        assert_consistent(&stepper);
    }

    #[test]
    fn test_region_flip() {
        let mut config = PottsConfig::planar(8, 6);
        config.tagged = true;
        let mut stepper = MonteCarloStepper::new(config).unwrap();

        let mut regioned = cell(1, 1);
        regioned
            .add_region(TAG_NUCLEUS, 2.0, 6.0, Lambdas { volume: 1.0, surface: 0.0 })
            .unwrap();
        regioned.set_region_adhesion(TAG_NUCLEUS, TAG_DEFAULT, 1.0).unwrap();
        regioned.set_region_adhesion(TAG_DEFAULT, TAG_NUCLEUS, 1.0).unwrap();
        stepper.add_cell(regioned).unwrap();
        for y in 2..4 {
            for x in 1..4 {
                stepper.assign(x, y, 0, 1).unwrap();
            }
        }
        stepper.assign_tag(1, 2, 0, TAG_NUCLEUS).unwrap();
        assert_consistent(&stepper);

        // Growing the nucleus from one voxel to its target of two.
        let outcome = stepper.flip_tag(1, TAG_DEFAULT, TAG_NUCLEUS, 2, 2, 0, &mut always());
        assert_eq!(outcome, Outcome::Accepted);
        assert_eq!(stepper.grid().tag(2, 2, 0), TAG_NUCLEUS);
        assert_eq!(stepper.cell(1).and_then(|c| c.region_volume(TAG_NUCLEUS)), Some(2));
        assert_consistent(&stepper);

        // A nucleus voxel at the far corner would not touch the nucleus.
        assert_eq!(
            stepper.flip_tag(1, TAG_DEFAULT, TAG_NUCLEUS, 3, 3, 0, &mut always()),
            Outcome::Disconnected
        );
    }

    #[test]
    fn test_assign_tag_requires_declared_region() {
        let mut stepper = lattice(true);
        assert_eq!(
            stepper.assign_tag(1, 2, 0, TAG_NUCLEUS),
            Err(PottsError::InvalidTag(TAG_NUCLEUS))
        );
        assert_eq!(stepper.assign_tag(1, 2, 0, TAG_DEFAULT), Ok(()));
        assert_eq!(stepper.assign_tag(0, 0, 0, TAG_DEFAULT), Err(PottsError::UnknownCell(MEDIA)));

        stepper
            .update_cell(1, |c| c.add_region(TAG_NUCLEUS, 1.0, 4.0, Lambdas::default()))
            .unwrap();
        assert_eq!(stepper.assign_tag(1, 2, 0, -5), Err(PottsError::InvalidTag(-5)));
        assert_eq!(stepper.assign_tag(1, 2, 0, TAG_NUCLEUS), Ok(()));
        assert_eq!(stepper.cell(1).and_then(|c| c.region_volume(TAG_NUCLEUS)), Some(1));
        assert_consistent(&stepper);
    }

    #[test]
    fn test_flip_off_lattice_or_wrong_owner_is_idle() {
        let mut stepper = MonteCarloStepper::new(PottsConfig::planar(6, 6)).unwrap();
        stepper.add_cell(cell(1, 1)).unwrap();
        stepper.assign(0, 0, 0, 1).unwrap();
        let before = stepper.grid().clone();

        assert_eq!(stepper.flip(MEDIA, 1, -1, 0, 0, &mut always()), Outcome::Idle);
        assert_eq!(stepper.flip(MEDIA, 1, 0, 6, 0, &mut always()), Outcome::Idle);
        // (0, 0, 0) belongs to cell 1, not media.
        assert_eq!(stepper.flip(MEDIA, 1, 0, 0, 0, &mut always()), Outcome::Idle);
        assert_eq!(stepper.propose(-1, 0, 0, &mut always()), Outcome::Idle);

        assert_eq!(stepper.grid(), &before);
        assert_eq!(stepper.cell(1).map(Cell::volume), Some(1));
        assert_consistent(&stepper);
    }

    #[test]
    fn test_flip_tag_wrong_owner_or_tag_is_idle() {
        let mut stepper = lattice(true);
        stepper
            .update_cell(1, |c| c.add_region(TAG_NUCLEUS, 2.0, 6.0, Lambdas::default()))
            .unwrap();
        let before = stepper.grid().clone();

        // (1, 2, 0) is a default voxel of cell 1.
        assert_eq!(
            stepper.flip_tag(2, TAG_DEFAULT, TAG_NUCLEUS, 1, 2, 0, &mut always()),
            Outcome::Idle
        );
        assert_eq!(
            stepper.flip_tag(1, TAG_NUCLEUS, TAG_DEFAULT, 1, 2, 0, &mut always()),
            Outcome::Idle
        );
        assert_eq!(
            stepper.flip_tag(1, TAG_DEFAULT, TAG_NUCLEUS, 1, -2, 0, &mut always()),
            Outcome::Idle
        );

        assert_eq!(stepper.grid(), &before);
        assert_eq!(stepper.cell(1).and_then(|c| c.region_volume(TAG_DEFAULT)), Some(4));
        assert_consistent(&stepper);
    }

    #[test]
    fn test_idle_inside_uniform_region() {
        let mut stepper = lattice(false);
        // Media far from any cell has only media neighbors.
        assert_eq!(stepper.propose(6, 4, 0, &mut always()), Outcome::Idle);
    }

    #[test]
    fn test_tick_counts_and_consistency() {
        let mut stepper = lattice(true);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..20 {
            let summary = stepper.tick(&mut rng);
            assert_eq!(summary.proposals, stepper.config().steps_per_tick());
            assert_eq!(
                summary.accepted + summary.rejected + summary.disconnected + summary.idle,
                summary.proposals
            );
        }
        assert_consistent(&stepper);
    }

    #[test]
    fn test_same_seed_same_lattice() {
        let mut a = lattice(false);
        let mut b = lattice(false);
        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(a.tick(&mut rng_a), b.tick(&mut rng_b));
        }
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_import_ids() {
        let mut stepper = lattice(true);
        let bounds = Bounds::new(1, 1, 0, 3, 3, 1);
        assert_eq!(
            stepper.import_ids(&[1, 1, 9, 1], bounds),
            Err(PottsError::UnknownCell(9))
        );
        assert_eq!(stepper.import_ids(&[1, 1, 2, 2], bounds), Ok(4));
        assert_eq!(stepper.grid().owner(1, 2, 0), 2);
        assert_eq!(stepper.grid().tag(1, 2, 0), TAG_DEFAULT);
        assert_consistent(&stepper);
    }
}
