//! Neighbor offsets for planar and volumetric lattices.
//!
//! Directions are named instead of packed into bit masks. Planar lattices use
//! the four in-plane faces, volumetric lattices add `Up` and `Down`.

/// Relative position of a neighbor voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dx: i16,
    pub dy: i16,
    pub dz: i16,
}

impl Offset {
    pub const fn new(dx: i16, dy: i16, dz: i16) -> Self {
        Self { dx, dy, dz }
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dz == 0
    }

    #[inline]
    pub const fn plus(self, other: Offset) -> Offset {
        Offset::new(self.dx + other.dx, self.dy + other.dy, self.dz + other.dz)
    }
}

/// Face directions of a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// -y
    North,
    /// +x
    East,
    /// +y
    South,
    /// -x
    West,
    /// +z
    Up,
    /// -z
    Down,
}

impl Direction {
    pub const fn offset(self) -> Offset {
        match self {
            Direction::North => Offset::new(0, -1, 0),
            Direction::East => Offset::new(1, 0, 0),
            Direction::South => Offset::new(0, 1, 0),
            Direction::West => Offset::new(-1, 0, 0),
            Direction::Up => Offset::new(0, 0, 1),
            Direction::Down => Offset::new(0, 0, -1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

pub const PLANAR_FACES: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub const VOLUMETRIC_FACES: [Direction; 6] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::Up,
    Direction::Down,
];

/// Pairs of orthogonal faces joined through the edge voxel between them.
///
/// The edge voxel sits at the sum of the two face offsets.
pub const PLANAR_BRIDGES: [(Direction, Direction); 4] = [
    (Direction::North, Direction::East),
    (Direction::East, Direction::South),
    (Direction::South, Direction::West),
    (Direction::West, Direction::North),
];

pub const VOLUMETRIC_BRIDGES: [(Direction, Direction); 12] = [
    (Direction::North, Direction::East),
    (Direction::East, Direction::South),
    (Direction::South, Direction::West),
    (Direction::West, Direction::North),
    (Direction::North, Direction::Up),
    (Direction::East, Direction::Up),
    (Direction::South, Direction::Up),
    (Direction::West, Direction::Up),
    (Direction::North, Direction::Down),
    (Direction::East, Direction::Down),
    (Direction::South, Direction::Down),
    (Direction::West, Direction::Down),
];

/// Dimensionality of a lattice and the neighbor sets that go with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Neighborhood {
    /// Single z-layer: 4 faces, 8 Moore neighbors.
    Planar,
    /// Full 3D: 6 faces, 26 Moore neighbors.
    Volumetric,
}

impl Neighborhood {
    pub fn for_depth(depth: i16) -> Self {
        if depth == 1 {
            Neighborhood::Planar
        } else {
            Neighborhood::Volumetric
        }
    }

    pub fn faces(self) -> &'static [Direction] {
        match self {
            Neighborhood::Planar => &PLANAR_FACES,
            Neighborhood::Volumetric => &VOLUMETRIC_FACES,
        }
    }

    pub fn bridges(self) -> &'static [(Direction, Direction)] {
        match self {
            Neighborhood::Planar => &PLANAR_BRIDGES,
            Neighborhood::Volumetric => &VOLUMETRIC_BRIDGES,
        }
    }

    /// Moore neighbors (8 or 26), center excluded, in z,y,x order.
    pub fn moore(self) -> impl Iterator<Item = Offset> {
        let span: i16 = match self {
            Neighborhood::Planar => 0,
            Neighborhood::Volumetric => 1,
        };
        (-span..=span)
            .flat_map(|dz| {
                (-1..=1i16).flat_map(move |dy| (-1..=1i16).map(move |dx| Offset::new(dx, dy, dz)))
            })
            // Skip the center cell
            .filter(|offset| !offset.is_zero())
    }
}
