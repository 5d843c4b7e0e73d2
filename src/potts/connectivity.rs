//! Local topology checks for voxel flips.
//!
//! A flip is allowed only if the cells on both sides stay in one piece. The
//! check looks at the occupancy pattern around the flipped voxel: the face
//! neighbors are the links, and two links count as joined when the edge voxel
//! between them (the bridge) has the same owner. The owner stays connected if
//! its links form exactly one group.

use std::collections::BTreeSet;

use super::grid::VoxelGrid;
use super::neighborhood::{Direction, Neighborhood, Offset};

/// Same-owner occupancy of the 3x3 (planar) or 3x3x3 (volumetric) block
/// around a voxel. The center is never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    cells: [[[bool; 3]; 3]; 3],
    neighborhood: Neighborhood,
}

impl Pattern {
    pub fn empty(neighborhood: Neighborhood) -> Self {
        Self {
            cells: [[[false; 3]; 3]; 3],
            neighborhood,
        }
    }

    /// Build a pattern from the `(dx, dy, dz)` offsets that are occupied.
    pub fn from_offsets(neighborhood: Neighborhood, offsets: &[(i16, i16, i16)]) -> Self {
        let mut pattern = Self::empty(neighborhood);
        for &(dx, dy, dz) in offsets {
            pattern.set(Offset::new(dx, dy, dz), true);
        }
        pattern
    }

    #[inline]
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    #[inline]
    fn slot(offset: Offset) -> Option<(usize, usize, usize)> {
        let inside = |d: i16| (-1..=1).contains(&d);
        if offset.is_zero() || !inside(offset.dx) || !inside(offset.dy) || !inside(offset.dz) {
            return None;
        }
        Some((
            (offset.dz + 1) as usize,
            (offset.dy + 1) as usize,
            (offset.dx + 1) as usize,
        ))
    }

    /// Occupancy at `offset`. Off-plane offsets of a planar pattern are empty.
    #[inline]
    pub fn get(&self, offset: Offset) -> bool {
        if self.neighborhood == Neighborhood::Planar && offset.dz != 0 {
            return false;
        }
        Self::slot(offset).is_some_and(|(k, j, i)| self.cells[k][j][i])
    }

    /// Offsets outside the block, the center, and off-plane offsets of a
    /// planar pattern are ignored.
    pub fn set(&mut self, offset: Offset, value: bool) {
        if self.neighborhood == Neighborhood::Planar && offset.dz != 0 {
            return;
        }
        if let Some((k, j, i)) = Self::slot(offset) {
            self.cells[k][j][i] = value;
        }
    }

    /// Occupied Moore neighbors.
    pub fn count(&self) -> usize {
        self.neighborhood.moore().filter(|&o| self.get(o)).count()
    }

    /// Occupied face neighbors.
    pub fn links(&self) -> usize {
        self.neighborhood
            .faces()
            .iter()
            .filter(|face| self.get(face.offset()))
            .count()
    }
}

fn find(parent: &mut [usize; 6], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

#[inline]
fn slot_of(direction: Direction) -> usize {
    direction as usize
}

/// Whether the occupied neighbors in `pattern` stay one connected group.
///
/// No links is never connected and a single link always is. When every face
/// is occupied the voxel is interior, and the answer is
/// `treat_media_as_linking`. Otherwise the links must form a single
/// component through occupied bridges. Vertex voxels never link anything.
pub fn connectivity(pattern: &Pattern, treat_media_as_linking: bool) -> bool {
    let faces = pattern.neighborhood().faces();
    let links = pattern.links();

    match links {
        0 => return false,
        1 => return true,
        n if n == faces.len() => return treat_media_as_linking,
        _ => {}
    }

    let mut parent = [0, 1, 2, 3, 4, 5];
    for &(a, b) in pattern.neighborhood().bridges() {
        let (oa, ob) = (a.offset(), b.offset());
        if pattern.get(oa) && pattern.get(ob) && pattern.get(oa.plus(ob)) {
            let ra = find(&mut parent, slot_of(a));
            let rb = find(&mut parent, slot_of(b));
            parent[ra] = rb;
        }
    }

    let mut roots = faces
        .iter()
        .filter(|face| pattern.get(face.offset()))
        .map(|&face| find(&mut parent, slot_of(face)));
    match roots.next() {
        Some(first) => roots.all(|root| root == first),
        None => false,
    }
}

/// Pattern of neighbors owned by `id` around `(x, y, z)`.
pub fn neighborhood(grid: &VoxelGrid, id: i32, x: i16, y: i16, z: i16) -> Pattern {
    let mut pattern = Pattern::empty(grid.neighborhood());
    for offset in grid.neighborhood().moore() {
        if let Some((nx, ny, nz)) = grid.neighbor(x, y, z, offset) {
            pattern.set(offset, grid.owner(nx, ny, nz) == id);
        }
    }
    pattern
}

/// Pattern of neighbors owned by `id` that also carry `tag`.
pub fn tag_neighborhood(grid: &VoxelGrid, id: i32, tag: i32, x: i16, y: i16, z: i16) -> Pattern {
    let mut pattern = Pattern::empty(grid.neighborhood());
    for offset in grid.neighborhood().moore() {
        if let Some((nx, ny, nz)) = grid.neighbor(x, y, z, offset) {
            pattern.set(
                offset,
                grid.owner(nx, ny, nz) == id && grid.tag(nx, ny, nz) == tag,
            );
        }
    }
    pattern
}

/// Owners of the face neighbors that differ from the voxel's owner.
///
/// Media is included so cells can retract.
pub fn unique_owners(grid: &VoxelGrid, x: i16, y: i16, z: i16) -> BTreeSet<i32> {
    let id = grid.owner(x, y, z);
    grid.neighborhood()
        .faces()
        .iter()
        .filter_map(|face| grid.neighbor(x, y, z, face.offset()))
        .map(|(nx, ny, nz)| grid.owner(nx, ny, nz))
        .filter(|&neighbor| neighbor != id)
        .collect()
}

/// Tags of face neighbors in the same cell that differ from the voxel's tag.
pub fn unique_tags(grid: &VoxelGrid, x: i16, y: i16, z: i16) -> BTreeSet<i32> {
    let id = grid.owner(x, y, z);
    let tag = grid.tag(x, y, z);
    grid.neighborhood()
        .faces()
        .iter()
        .filter_map(|face| grid.neighbor(x, y, z, face.offset()))
        .filter(|&(nx, ny, nz)| grid.owner(nx, ny, nz) == id)
        .map(|(nx, ny, nz)| grid.tag(nx, ny, nz))
        .filter(|&neighbor| neighbor != tag)
        .collect()
}
