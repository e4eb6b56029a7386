//! Plain value types shared by the world, the knowledge base and the agents.
//!
//! Nothing in here carries behaviour beyond arithmetic on coordinates and the
//! cyclic order of facings; every type is `Copy`, hashable and ordered so it can
//! live in sets and be used as a map key.

use core::fmt::{self, Display};
use core::ops::{Add, AddAssign};
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;

/// A cell coordinate. `x` grows east, `y` grows north.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the point lies on a `size` x `size` grid.
    #[must_use]
    pub const fn in_bounds(self, size: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < size && (self.y as usize) < size
    }

    /// Manhattan distance, the admissible lower bound for grid movement.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// In-bounds 4-neighbourhood, paired with the facing that reaches each neighbour.
    pub fn neighbours(self, size: usize) -> impl Iterator<Item = (Self, Direction)> {
        Direction::ALL
            .into_iter()
            .map(move |d| (self + d.vector(), d))
            .filter(move |(p, _)| p.in_bounds(size))
    }

    /// Row-major index of an in-bounds point.
    #[must_use]
    pub const fn index(self, size: usize) -> usize {
        self.y as usize * size + self.x as usize
    }

    /// Inverse of [`Point::index`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn from_index(index: usize, size: usize) -> Self {
        Self::new((index % size) as i32, (index / size) as i32)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The four facings, in clockwise order starting at north.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// +y
    North,
    /// +x
    #[default]
    East,
    /// -y
    South,
    /// -x
    West,
}

impl Direction {
    /// Clockwise order. Turning right walks forward through this array.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit vector for one step in this facing.
    #[must_use]
    pub const fn vector(self) -> Point {
        match self {
            Self::North => Point::new(0, 1),
            Self::East => Point::new(1, 0),
            Self::South => Point::new(0, -1),
            Self::West => Point::new(-1, 0),
        }
    }

    #[must_use]
    pub const fn turn_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    #[must_use]
    pub const fn turn_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    const fn ordinal(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Facing that looks from `from` straight at `to`, if they share a row or column.
    #[must_use]
    pub const fn towards(from: Point, to: Point) -> Option<Self> {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        match (dx.signum(), dy.signum()) {
            (0, 1) => Some(Self::North),
            (0, -1) => Some(Self::South),
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }

    /// Shortest turn sequence that rotates `self` into `target`.
    ///
    /// A reversal is planned as two right turns.
    #[must_use]
    pub fn turns_to(self, target: Self) -> SmallVec<[Action; 2]> {
        match (target.ordinal() + 4 - self.ordinal()) % 4 {
            1 => smallvec::smallvec![Action::TurnRight],
            2 => smallvec::smallvec![Action::TurnRight, Action::TurnRight],
            3 => smallvec::smallvec![Action::TurnLeft],
            _ => SmallVec::new(),
        }
    }

    /// Arrow glyph used by text renderings.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::North => '^',
            Self::East => '>',
            Self::South => 'v',
            Self::West => '<',
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "NORTH",
            Self::East => "EAST",
            Self::South => "SOUTH",
            Self::West => "WEST",
        };
        f.write_str(name)
    }
}

/// Something the agent can sense in its current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Percept {
    Stench,
    Breeze,
    Glitter,
    Scream,
}

impl Percept {
    /// Every percept, in bit order.
    pub const ALL: [Self; 4] = [Self::Stench, Self::Breeze, Self::Glitter, Self::Scream];

    const fn bit(self) -> u8 {
        match self {
            Self::Stench => 1,
            Self::Breeze => 1 << 1,
            Self::Glitter => 1 << 2,
            Self::Scream => 1 << 3,
        }
    }
}

/// A small set of percepts, one bit per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Percepts(u8);

impl Percepts {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, percept: Percept) {
        self.0 |= percept.bit();
    }

    pub fn remove(&mut self, percept: Percept) {
        self.0 &= !percept.bit();
    }

    #[must_use]
    pub const fn contains(self, percept: Percept) -> bool {
        self.0 & percept.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the cell signals an adjacent hazard.
    #[must_use]
    pub const fn has_danger(self) -> bool {
        self.contains(Percept::Stench) || self.contains(Percept::Breeze)
    }

    pub fn iter(self) -> impl Iterator<Item = Percept> {
        Percept::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Percept> for Percepts {
    fn from_iter<T: IntoIterator<Item = Percept>>(iter: T) -> Self {
        let mut set = Self::empty();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

impl Serialize for Percepts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Everything the agent can do in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    MoveForward,
    TurnLeft,
    TurnRight,
    Shoot,
    Grab,
    ClimbOut,
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MoveForward => "MOVE_FORWARD",
            Self::TurnLeft => "TURN_LEFT",
            Self::TurnRight => "TURN_RIGHT",
            Self::Shoot => "SHOOT",
            Self::Grab => "GRAB",
            Self::ClimbOut => "CLIMB_OUT",
        };
        f.write_str(name)
    }
}

/// A content marker stored in a world cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Marker {
    Pit,
    Wumpus,
    Gold,
    Stench,
    Breeze,
}

impl Marker {
    pub const ALL: [Self; 5] = [
        Self::Pit,
        Self::Wumpus,
        Self::Gold,
        Self::Stench,
        Self::Breeze,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Pit => 1,
            Self::Wumpus => 1 << 1,
            Self::Gold => 1 << 2,
            Self::Stench => 1 << 3,
            Self::Breeze => 1 << 4,
        }
    }

    /// One-letter code used by text renderings.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Pit => 'P',
            Self::Wumpus => 'W',
            Self::Gold => 'G',
            Self::Stench => 'S',
            Self::Breeze => 'B',
        }
    }
}

/// Contents of one world cell as a bitmask over [`Marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellContents(u8);

impl CellContents {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, marker: Marker) {
        self.0 |= marker.bit();
    }

    pub fn remove(&mut self, marker: Marker) {
        self.0 &= !marker.bit();
    }

    #[must_use]
    pub const fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Marker> {
        Marker::ALL.into_iter().filter(move |m| self.contains(*m))
    }

    /// Percepts an agent standing here would receive.
    #[must_use]
    pub fn percepts(self) -> Percepts {
        let mut percepts = Percepts::empty();
        if self.contains(Marker::Gold) {
            percepts.insert(Percept::Glitter);
        }
        if self.contains(Marker::Stench) {
            percepts.insert(Percept::Stench);
        }
        if self.contains(Marker::Breeze) {
            percepts.insert(Percept::Breeze);
        }
        percepts
    }
}

impl FromIterator<Marker> for CellContents {
    fn from_iter<T: IntoIterator<Item = Marker>>(iter: T) -> Self {
        let mut cell = Self::empty();
        for m in iter {
            cell.insert(m);
        }
        cell
    }
}

impl Display for CellContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in self.iter() {
            write!(f, "{}", m.code())?;
        }
        Ok(())
    }
}

impl Serialize for CellContents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_are_cyclic() {
        for d in Direction::ALL {
            assert_eq!(d.turn_left().turn_right(), d);
            assert_eq!(d.turn_right().turn_right().turn_right().turn_right(), d);
        }
    }

    #[test]
    fn test_turns_to() {
        assert!(Direction::East.turns_to(Direction::East).is_empty());
        assert_eq!(
            Direction::East.turns_to(Direction::South).as_slice(),
            &[Action::TurnRight]
        );
        assert_eq!(
            Direction::East.turns_to(Direction::North).as_slice(),
            &[Action::TurnLeft]
        );
        assert_eq!(
            Direction::East.turns_to(Direction::West).as_slice(),
            &[Action::TurnRight, Action::TurnRight]
        );
    }

    #[test]
    fn test_towards() {
        let origin = Point::new(1, 1);
        assert_eq!(
            Direction::towards(origin, Point::new(1, 3)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::towards(origin, Point::new(0, 1)),
            Some(Direction::West)
        );
        assert_eq!(Direction::towards(origin, Point::new(2, 2)), None);
        assert_eq!(Direction::towards(origin, origin), None);
    }

    #[test]
    fn test_neighbours_respect_bounds() {
        let corner: Vec<_> = Point::new(0, 0).neighbours(4).map(|(p, _)| p).collect();
        assert_eq!(corner, vec![Point::new(0, 1), Point::new(1, 0)]);
        assert_eq!(Point::new(1, 1).neighbours(4).count(), 4);
    }

    #[test]
    fn test_index_roundtrip() {
        let p = Point::new(3, 2);
        assert_eq!(Point::from_index(p.index(5), 5), p);
    }

    #[test]
    fn test_cell_percepts() {
        let cell: CellContents = [Marker::Gold, Marker::Breeze, Marker::Pit]
            .into_iter()
            .collect();
        let percepts = cell.percepts();
        assert!(percepts.contains(Percept::Glitter));
        assert!(percepts.contains(Percept::Breeze));
        assert!(!percepts.contains(Percept::Stench));
        assert!(percepts.has_danger());
    }
}
