use std::fmt;

/// A point in a planar, distance-preserving projection.
/// `x`/`y` are projected units (typically meters), never raw lat/lng.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    pub fn dist(&self, rhs: &Self) -> f64 {
        self.coord().dist(&rhs.coord())
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.id, self.coord())
    }
}

/// Bare planar coordinate, used for route geometry and centroids.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dist_sq(&self, rhs: &Self) -> f64 {
        let dx = self.x - rhs.x;
        let dy = self.y - rhs.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn dist(&self, rhs: &Self) -> f64 {
        self.dist_sq(rhs).sqrt()
    }

    pub(crate) fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b1 = ryu::Buffer::new();
        let mut b2 = ryu::Buffer::new();
        write!(f, "{},{}", b1.format(self.x), b2.format(self.y))
    }
}
