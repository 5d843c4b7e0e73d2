//! Owner and tag layers of the lattice, with indexing and census helpers.

use std::collections::BTreeMap;

use super::neighborhood::{Neighborhood, Offset};
use crate::config::PottsConfig;

/// Owner ID of unoccupied space.
pub const MEDIA: i32 = 0;

/// Per-voxel owner IDs plus an optional parallel tag layer.
///
/// Both layers are stored in z,y,x order (z changes slowest, x fastest).
/// Out-of-bounds reads return `0`, which is never a cell ID or region tag.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    pub width: i16,
    pub height: i16,
    pub depth: i16,
    ids: Vec<i32>,
    tags: Option<Vec<i32>>,
    neighborhood: Neighborhood,
}

/// From-scratch measurement of one cell's shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    pub volume: i32,
    pub surface: i32,
    /// Volume and surface per region tag. Empty on untagged lattices.
    pub regions: BTreeMap<i32, (i32, i32)>,
}

impl VoxelGrid {
    /// Allocate an all-media grid. A depth of 1 gives a planar lattice.
    pub fn new(width: i16, height: i16, depth: i16, tagged: bool) -> Self {
        let size = (width.max(0) as usize) * (height.max(0) as usize) * (depth.max(0) as usize);
        Self {
            width,
            height,
            depth,
            ids: vec![MEDIA; size],
            tags: tagged.then(|| vec![0; size]),
            neighborhood: Neighborhood::for_depth(depth),
        }
    }

    pub fn from_config(config: &PottsConfig) -> Self {
        Self::new(config.width, config.height, config.depth, config.tagged)
    }

    #[inline]
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    #[inline]
    pub fn is_tagged(&self) -> bool {
        self.tags.is_some()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Calculate the linear index for a 3D coordinate.
    #[inline]
    pub fn index_of(&self, x: i16, y: i16, z: i16) -> usize {
        z as usize * self.height as usize * self.width as usize
            + y as usize * self.width as usize
            + x as usize
    }

    /// Check if coordinates are within grid bounds.
    #[inline]
    pub fn in_bounds(&self, x: i16, y: i16, z: i16) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height && z >= 0 && z < self.depth
    }

    /// Coordinate of the neighbor at `offset`, or `None` past the lattice edge.
    #[inline]
    pub fn neighbor(&self, x: i16, y: i16, z: i16, offset: Offset) -> Option<(i16, i16, i16)> {
        let (nx, ny, nz) = (x + offset.dx, y + offset.dy, z + offset.dz);
        self.in_bounds(nx, ny, nz).then_some((nx, ny, nz))
    }

    #[inline]
    pub fn owner(&self, x: i16, y: i16, z: i16) -> i32 {
        if !self.in_bounds(x, y, z) {
            return MEDIA;
        }
        self.ids[self.index_of(x, y, z)]
    }

    /// Tag at a voxel; always `0` on untagged lattices.
    #[inline]
    pub fn tag(&self, x: i16, y: i16, z: i16) -> i32 {
        match &self.tags {
            Some(tags) if self.in_bounds(x, y, z) => tags[self.index_of(x, y, z)],
            _ => 0,
        }
    }

    /// Out-of-bounds coordinates are silently ignored.
    pub fn set_owner(&mut self, x: i16, y: i16, z: i16, id: i32) {
        if !self.in_bounds(x, y, z) {
            return;
        }
        let idx = self.index_of(x, y, z);
        self.ids[idx] = id;
    }

    /// Ignored on untagged lattices and out of bounds.
    pub fn set_tag(&mut self, x: i16, y: i16, z: i16, tag: i32) {
        if !self.in_bounds(x, y, z) {
            return;
        }
        let idx = self.index_of(x, y, z);
        if let Some(tags) = self.tags.as_mut() {
            tags[idx] = tag;
        }
    }

    pub fn owners(&self) -> &[i32] {
        &self.ids
    }

    pub fn tags(&self) -> Option<&[i32]> {
        self.tags.as_deref()
    }

    /// Number of voxels owned by `id`.
    pub fn count(&self, id: i32) -> usize {
        self.ids.iter().filter(|&&owner| owner == id).count()
    }

    /// Number of in-bounds faces around a voxel.
    pub fn face_count(&self, x: i16, y: i16, z: i16) -> i32 {
        self.neighborhood
            .faces()
            .iter()
            .filter(|face| self.neighbor(x, y, z, face.offset()).is_some())
            .count() as i32
    }

    /// Faces of `(x, y, z)` whose neighbor is owned by `id`.
    pub fn face_contacts(&self, id: i32, x: i16, y: i16, z: i16) -> i32 {
        self.neighborhood
            .faces()
            .iter()
            .filter_map(|face| self.neighbor(x, y, z, face.offset()))
            .filter(|&(nx, ny, nz)| self.owner(nx, ny, nz) == id)
            .count() as i32
    }

    /// Faces of `(x, y, z)` whose neighbor is owned by `id` and carries `tag`.
    pub fn tag_face_contacts(&self, id: i32, tag: i32, x: i16, y: i16, z: i16) -> i32 {
        self.neighborhood
            .faces()
            .iter()
            .filter_map(|face| self.neighbor(x, y, z, face.offset()))
            .filter(|&(nx, ny, nz)| self.owner(nx, ny, nz) == id && self.tag(nx, ny, nz) == tag)
            .count() as i32
    }

    /// Measure volume and surface of `id` by scanning the whole grid.
    ///
    /// Only used at setup; accepted flips update cells incrementally.
    pub fn census(&self, id: i32) -> Census {
        let mut census = Census::default();
        for z in 0..self.depth {
            for y in 0..self.height {
                for x in 0..self.width {
                    if self.owner(x, y, z) != id {
                        continue;
                    }
                    let faces = self.face_count(x, y, z);
                    census.volume += 1;
                    census.surface += faces - self.face_contacts(id, x, y, z);

                    if self.is_tagged() {
                        let tag = self.tag(x, y, z);
                        let region = census.regions.entry(tag).or_insert((0, 0));
                        region.0 += 1;
                        region.1 += faces - self.tag_face_contacts(id, tag, x, y, z);
                    }
                }
            }
        }
        census
    }
}
