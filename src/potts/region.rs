//! Region extraction and import of the owner and tag layers.

use super::cell::{TAG_DEFAULT, TAG_UNDEFINED};
use super::grid::{VoxelGrid, MEDIA};
use crate::error::PottsError;

/// Half-open box `[min, max)` of lattice coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i16,
    pub min_y: i16,
    pub min_z: i16,
    pub max_x: i16,
    pub max_y: i16,
    pub max_z: i16,
}

impl Bounds {
    pub fn new(min_x: i16, min_y: i16, min_z: i16, max_x: i16, max_y: i16, max_z: i16) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// The whole lattice.
    pub fn of(grid: &VoxelGrid) -> Self {
        Self::new(0, 0, 0, grid.width, grid.height, grid.depth)
    }

    /// Clamp to the lattice, or `None` if nothing is left.
    pub fn clamp(self, grid: &VoxelGrid) -> Option<Self> {
        let clamped = Self {
            min_x: self.min_x.clamp(0, grid.width),
            min_y: self.min_y.clamp(0, grid.height),
            min_z: self.min_z.clamp(0, grid.depth),
            max_x: self.max_x.clamp(0, grid.width),
            max_y: self.max_y.clamp(0, grid.height),
            max_z: self.max_z.clamp(0, grid.depth),
        };
        if clamped.min_x >= clamped.max_x
            || clamped.min_y >= clamped.max_y
            || clamped.min_z >= clamped.max_z
        {
            return None;
        }
        Some(clamped)
    }

    /// Number of voxels in the box, zero if it is empty or inverted.
    pub fn volume(&self) -> usize {
        let span = |min: i16, max: i16| (max - min).max(0) as usize;
        span(self.min_x, self.max_x) * span(self.min_y, self.max_y) * span(self.min_z, self.max_z)
    }

    /// Coordinates in z,y,x order (z changes slowest, x changes fastest).
    fn voxels(self) -> impl Iterator<Item = (i16, i16, i16)> {
        (self.min_z..self.max_z).flat_map(move |z| {
            (self.min_y..self.max_y)
                .flat_map(move |y| (self.min_x..self.max_x).map(move |x| (x, y, z)))
        })
    }
}

fn extract_with(
    grid: &VoxelGrid,
    out: &mut [i32],
    bounds: Bounds,
    read: impl Fn(&VoxelGrid, i16, i16, i16) -> i32,
) -> Result<usize, PottsError> {
    let bounds = bounds.clamp(grid).ok_or(PottsError::EmptyRegion)?;
    let expected = bounds.volume();
    if out.len() < expected {
        return Err(PottsError::BufferTooSmall {
            expected,
            actual: out.len(),
        });
    }
    for (slot, (x, y, z)) in out.iter_mut().zip(bounds.voxels()) {
        *slot = read(grid, x, y, z);
    }
    Ok(expected)
}

/// Copy owner IDs of a rectangular region into a flat buffer.
///
/// # Layout
/// The buffer is filled in z,y,x order (z changes slowest, x changes fastest),
/// the same order [`import_ids`] reads. Bounds are clamped to the lattice.
///
/// # Returns
/// Number of values written.
pub fn extract_ids(grid: &VoxelGrid, out: &mut [i32], bounds: Bounds) -> Result<usize, PottsError> {
    extract_with(grid, out, bounds, VoxelGrid::owner)
}

/// Copy region tags of a rectangular region into a flat buffer.
pub fn extract_tags(grid: &VoxelGrid, out: &mut [i32], bounds: Bounds) -> Result<usize, PottsError> {
    if !grid.is_tagged() {
        return Err(PottsError::Untagged);
    }
    extract_with(grid, out, bounds, VoxelGrid::tag)
}

/// Copy owner IDs from a flat buffer into a rectangular region.
///
/// Negative values are read as media. On tagged lattices every imported voxel
/// is reset to the default region, or to the undefined tag for media.
/// Cell counters are not touched; callers re-measure affected cells.
///
/// # Returns
/// Number of values read.
pub fn import_ids(grid: &mut VoxelGrid, input: &[i32], bounds: Bounds) -> Result<usize, PottsError> {
    let bounds = bounds.clamp(grid).ok_or(PottsError::EmptyRegion)?;
    let expected = bounds.volume();
    if input.len() < expected {
        return Err(PottsError::BufferTooSmall {
            expected,
            actual: input.len(),
        });
    }
    for (&value, (x, y, z)) in input.iter().zip(bounds.voxels()) {
        let id = value.max(MEDIA);
        grid.set_owner(x, y, z, id);
        grid.set_tag(x, y, z, if id == MEDIA { TAG_UNDEFINED } else { TAG_DEFAULT });
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ids_basic() {
        let mut grid = VoxelGrid::new(8, 8, 8, false);
        grid.set_owner(2, 2, 2, 1);
        grid.set_owner(3, 2, 2, 1);
        grid.set_owner(2, 3, 2, 4);

        // Extract a 4x4x4 region
        let mut buffer = vec![0; 64];
        let written = extract_ids(&grid, &mut buffer, Bounds::new(2, 2, 2, 6, 6, 6));

        assert_eq!(written, Ok(64));
        assert_eq!(buffer[0], 1); // (2,2,2)
        assert_eq!(buffer[1], 1); // (3,2,2)
        assert_eq!(buffer[4], 4); // (2,3,2)
    }

    #[test]
    fn test_extract_ids_out_of_bounds() {
        let grid = VoxelGrid::new(4, 4, 4, false);
        let mut buffer = vec![7; 512];
        let written = extract_ids(&grid, &mut buffer, Bounds::new(-2, -2, -2, 10, 10, 10));

        // Should be clamped to 4x4x4
        assert_eq!(written, Ok(64));
        assert!(buffer[..64].iter().all(|&id| id == MEDIA));
        assert_eq!(buffer[64], 7);
    }

    #[test]
    fn test_extract_errors() {
        let grid = VoxelGrid::new(4, 4, 1, false);
        let mut buffer = vec![0; 4];
        assert_eq!(
            extract_ids(&grid, &mut buffer, Bounds::new(2, 2, 0, 2, 4, 1)),
            Err(PottsError::EmptyRegion)
        );
        assert_eq!(
            extract_ids(&grid, &mut buffer, Bounds::of(&grid)),
            Err(PottsError::BufferTooSmall {
                expected: 16,
                actual: 4
            })
        );
        assert_eq!(
            extract_tags(&grid, &mut buffer, Bounds::of(&grid)),
            Err(PottsError::Untagged)
        );
    }

    #[test]
    fn test_import_ids_resets_tags() {
        let mut grid = VoxelGrid::new(4, 4, 1, true);
        grid.set_owner(0, 0, 0, 2);
        grid.set_tag(0, 0, 0, -3);

        let buffer = [
            0, 1, 5, -4, // Row 0
            1, 1, 0, 0, // Row 1
        ];
        let read = import_ids(&mut grid, &buffer, Bounds::new(0, 0, 0, 4, 2, 1));

        assert_eq!(read, Ok(8));
        assert_eq!(grid.owner(0, 0, 0), MEDIA);
        assert_eq!(grid.tag(0, 0, 0), TAG_UNDEFINED);
        assert_eq!(grid.owner(2, 0, 0), 5);
        assert_eq!(grid.tag(2, 0, 0), TAG_DEFAULT);
        assert_eq!(grid.owner(3, 0, 0), MEDIA);
        assert_eq!(grid.owner(1, 1, 0), 1);
    }

    #[test]
    fn test_extract_import_symmetry() {
        let mut source = VoxelGrid::new(8, 8, 8, true);
        source.set_owner(2, 2, 2, 3);
        source.set_tag(2, 2, 2, TAG_DEFAULT);
        source.set_owner(3, 3, 3, 9);
        source.set_tag(3, 3, 3, TAG_DEFAULT);
        let bounds = Bounds::new(0, 0, 0, 4, 4, 4);

        let mut buffer = vec![0; 64];
        extract_ids(&source, &mut buffer, bounds).unwrap();

        let mut copy = VoxelGrid::new(8, 8, 8, true);
        import_ids(&mut copy, &buffer, bounds).unwrap();
        assert_eq!(copy, source);

        let mut tags = vec![0; 64];
        assert_eq!(extract_tags(&copy, &mut tags, bounds), Ok(64));
        assert_eq!(tags.iter().filter(|&&t| t == TAG_DEFAULT).count(), 2);
    }
}
