//! Hamiltonian terms: adhesion, volume and surface, plus their tag-scoped forms.
//!
//! Every lookup that cannot be resolved (absent cell, population, region,
//! lambda or target) yields `NaN`, and sums propagate it untouched. A `NaN`
//! energy change never passes the Metropolis test.

use super::cell::{Cell, CellTable, Constraint, TAG_DEFAULT};
use super::grid::{VoxelGrid, MEDIA};
use crate::config::Term;

/// Read-only view of a lattice and its cells.
pub struct EnergyModel<'a, C> {
    grid: &'a VoxelGrid,
    cells: &'a CellTable<C>,
}

#[inline]
fn quadratic(lambda: f64, actual: f64, target: f64, change: i32) -> f64 {
    let diff = actual - target + f64::from(change);
    lambda * diff * diff
}

impl<'a, C: Cell> EnergyModel<'a, C> {
    pub fn new(grid: &'a VoxelGrid, cells: &'a CellTable<C>) -> Self {
        Self { grid, cells }
    }

    /// Adhesion energy of voxel `(x, y, z)` if it were owned by `id`.
    ///
    /// Two cells contribute the average of both directions of the adhesion
    /// matrix; a cell against media contributes its raw media entry.
    pub fn adhesion(&self, id: i32, x: i16, y: i16, z: i16) -> f64 {
        let mut h = 0.0;
        for offset in self.grid.neighborhood().moore() {
            let Some((nx, ny, nz)) = self.grid.neighbor(x, y, z, offset) else {
                continue;
            };
            let neighbor = self.grid.owner(nx, ny, nz);
            if neighbor == id {
                continue;
            }
            h += self.pair_adhesion(id, neighbor);
        }
        h
    }

    fn pair_adhesion(&self, a: i32, b: i32) -> f64 {
        match (a, b) {
            (MEDIA, _) => self
                .cells
                .get(b)
                .map_or(f64::NAN, |cb| cb.adhesion(MEDIA as usize)),
            (_, MEDIA) => self
                .cells
                .get(a)
                .map_or(f64::NAN, |ca| ca.adhesion(MEDIA as usize)),
            _ => match (self.cells.get(a), self.cells.get(b)) {
                (Some(ca), Some(cb)) => {
                    (ca.adhesion(cb.population()) + cb.adhesion(ca.population())) / 2.0
                }
                _ => f64::NAN,
            },
        }
    }

    /// Adhesion between regions of cell `id` if voxel `(x, y, z)` carried `tag`.
    ///
    /// Only neighbors of the same cell in a named region other than `tag`
    /// contribute.
    pub fn tag_adhesion(&self, id: i32, tag: i32, x: i16, y: i16, z: i16) -> f64 {
        let Some(cell) = self.cells.get(id) else {
            return f64::NAN;
        };
        let mut h = 0.0;
        for offset in self.grid.neighborhood().moore() {
            let Some((nx, ny, nz)) = self.grid.neighbor(x, y, z, offset) else {
                continue;
            };
            if self.grid.owner(nx, ny, nz) != id {
                continue;
            }
            let neighbor = self.grid.tag(nx, ny, nz);
            if neighbor == tag || neighbor == 0 || neighbor == TAG_DEFAULT {
                continue;
            }
            h += (cell.region_adhesion(tag, neighbor) + cell.region_adhesion(neighbor, tag)) / 2.0;
        }
        h
    }

    pub fn delta_adhesion(&self, source: i32, target: i32, x: i16, y: i16, z: i16) -> f64 {
        self.adhesion(target, x, y, z) - self.adhesion(source, x, y, z)
    }

    pub fn delta_tag_adhesion(
        &self,
        id: i32,
        source_tag: i32,
        target_tag: i32,
        x: i16,
        y: i16,
        z: i16,
    ) -> f64 {
        self.tag_adhesion(id, target_tag, x, y, z) - self.tag_adhesion(id, source_tag, x, y, z)
    }

    /// Volume penalty of `id` with its volume shifted by `change`. Media is free.
    pub fn volume(&self, id: i32, change: i32) -> f64 {
        if id == MEDIA {
            return 0.0;
        }
        self.cells.get(id).map_or(f64::NAN, |c| {
            quadratic(
                c.lambda(Constraint::Volume),
                f64::from(c.volume()),
                c.target_volume(),
                change,
            )
        })
    }

    /// Volume penalty of region `tag` of `id`. The default region is free.
    pub fn tag_volume(&self, id: i32, tag: i32, change: i32) -> f64 {
        if id == MEDIA || tag == TAG_DEFAULT {
            return 0.0;
        }
        self.cells.get(id).map_or(f64::NAN, |c| {
            quadratic(
                c.region_lambda(Constraint::Volume, tag),
                c.region_volume(tag).map_or(f64::NAN, f64::from),
                c.region_target_volume(tag),
                change,
            )
        })
    }

    pub fn delta_volume(&self, source: i32, target: i32) -> f64 {
        let source_delta = self.volume(source, -1) - self.volume(source, 0);
        let target_delta = self.volume(target, 1) - self.volume(target, 0);
        source_delta + target_delta
    }

    pub fn delta_tag_volume(&self, id: i32, source_tag: i32, target_tag: i32) -> f64 {
        let source_delta = self.tag_volume(id, source_tag, -1) - self.tag_volume(id, source_tag, 0);
        let target_delta = self.tag_volume(id, target_tag, 1) - self.tag_volume(id, target_tag, 0);
        source_delta + target_delta
    }

    /// Surface change `[source, target]` of moving `(x, y, z)` from `source`
    /// to `target`.
    ///
    /// The voxel exposes every face not shared with its owner, so leaving
    /// `source` changes its surface by `2k - f` and joining `target` by
    /// `f - 2k`, where `f` counts the faces and `k` the faces owned by the
    /// respective cell.
    pub fn calculate_change(&self, source: i32, target: i32, x: i16, y: i16, z: i16) -> [i32; 2] {
        let faces = self.grid.face_count(x, y, z);
        let source_contacts = self.grid.face_contacts(source, x, y, z);
        let target_contacts = self.grid.face_contacts(target, x, y, z);
        [2 * source_contacts - faces, faces - 2 * target_contacts]
    }

    /// Surface change `[source, target]` of moving `(x, y, z)` between two
    /// regions of cell `id`.
    pub fn calculate_tag_change(
        &self,
        id: i32,
        source_tag: i32,
        target_tag: i32,
        x: i16,
        y: i16,
        z: i16,
    ) -> [i32; 2] {
        let faces = self.grid.face_count(x, y, z);
        let source_contacts = self.grid.tag_face_contacts(id, source_tag, x, y, z);
        let target_contacts = self.grid.tag_face_contacts(id, target_tag, x, y, z);
        [2 * source_contacts - faces, faces - 2 * target_contacts]
    }

    /// Surface penalty of `id` with its surface shifted by `change`. Media is free.
    pub fn surface(&self, id: i32, change: i32) -> f64 {
        if id == MEDIA {
            return 0.0;
        }
        self.cells.get(id).map_or(f64::NAN, |c| {
            quadratic(
                c.lambda(Constraint::Surface),
                f64::from(c.surface()),
                c.target_surface(),
                change,
            )
        })
    }

    pub fn tag_surface(&self, id: i32, tag: i32, change: i32) -> f64 {
        if id == MEDIA || tag == TAG_DEFAULT {
            return 0.0;
        }
        self.cells.get(id).map_or(f64::NAN, |c| {
            quadratic(
                c.region_lambda(Constraint::Surface, tag),
                c.region_surface(tag).map_or(f64::NAN, f64::from),
                c.region_target_surface(tag),
                change,
            )
        })
    }

    pub fn delta_surface(&self, source: i32, target: i32, x: i16, y: i16, z: i16) -> f64 {
        let [source_change, target_change] = self.calculate_change(source, target, x, y, z);
        let source_delta = self.surface(source, source_change) - self.surface(source, 0);
        let target_delta = self.surface(target, target_change) - self.surface(target, 0);
        source_delta + target_delta
    }

    pub fn delta_tag_surface(
        &self,
        id: i32,
        source_tag: i32,
        target_tag: i32,
        x: i16,
        y: i16,
        z: i16,
    ) -> f64 {
        let [source_change, target_change] =
            self.calculate_tag_change(id, source_tag, target_tag, x, y, z);
        let source_delta =
            self.tag_surface(id, source_tag, source_change) - self.tag_surface(id, source_tag, 0);
        let target_delta =
            self.tag_surface(id, target_tag, target_change) - self.tag_surface(id, target_tag, 0);
        source_delta + target_delta
    }

    /// Total energy change of an owner flip over the given terms.
    pub fn delta(&self, terms: &[Term], source: i32, target: i32, x: i16, y: i16, z: i16) -> f64 {
        terms
            .iter()
            .map(|term| match term {
                Term::Adhesion => self.delta_adhesion(source, target, x, y, z),
                Term::Volume => self.delta_volume(source, target),
                Term::Surface => self.delta_surface(source, target, x, y, z),
            })
            .sum()
    }

    /// Total energy change of a region flip within cell `id`.
    pub fn tag_delta(
        &self,
        terms: &[Term],
        id: i32,
        source_tag: i32,
        target_tag: i32,
        x: i16,
        y: i16,
        z: i16,
    ) -> f64 {
        terms
            .iter()
            .map(|term| match term {
                Term::Adhesion => self.delta_tag_adhesion(id, source_tag, target_tag, x, y, z),
                Term::Volume => self.delta_tag_volume(id, source_tag, target_tag),
                Term::Surface => self.delta_tag_surface(id, source_tag, target_tag, x, y, z),
            })
            .sum()
    }
}
