//! Integer rectangles on the chunk grid
//!
//! Used by the proximity index to express the difference between the old and
//! new viewing regions as a small set of disjoint rectangles, so a viewer
//! move only touches the chunks that actually entered or left the region.

/// Half-open axis-aligned rectangle of grid coordinates
///
/// Covers `x in [min_x, min_x + width)` and `z in [min_z, min_z + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect2i {
    pub min_x: i32,
    pub min_z: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect2i {
    pub fn new(min_x: i32, min_z: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0);
        Self { min_x, min_z, width, height }
    }

    /// Exclusive upper x bound
    pub fn max_x(&self) -> i32 {
        self.min_x + self.width
    }

    /// Exclusive upper z bound
    pub fn max_z(&self) -> i32 {
        self.min_z + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x < self.max_x() && z >= self.min_z && z < self.max_z()
    }

    /// Iterate all coordinates covered by the rectangle, x-major
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let rect = *self;
        (rect.min_x..rect.max_x())
            .flat_map(move |x| (rect.min_z..rect.max_z()).map(move |z| (x, z)))
    }

    /// Overlapping region of two rectangles, if any
    pub fn intersect(&self, other: &Rect2i) -> Option<Rect2i> {
        let min_x = self.min_x.max(other.min_x);
        let min_z = self.min_z.max(other.min_z);
        let max_x = self.max_x().min(other.max_x());
        let max_z = self.max_z().min(other.max_z());
        if min_x < max_x && min_z < max_z {
            Some(Rect2i::new(min_x, min_z, max_x - min_x, max_z - min_z))
        } else {
            None
        }
    }

    /// The parts of `self` not covered by `other`, as up to four disjoint
    /// rectangles
    pub fn subtract(&self, other: &Rect2i) -> Vec<Rect2i> {
        let Some(overlap) = self.intersect(other) else {
            return if self.is_empty() { vec![] } else { vec![*self] };
        };

        let mut parts = Vec::with_capacity(4);

        // Strip left of the overlap, full height
        if overlap.min_x > self.min_x {
            parts.push(Rect2i::new(
                self.min_x,
                self.min_z,
                overlap.min_x - self.min_x,
                self.height,
            ));
        }
        // Strip right of the overlap, full height
        if overlap.max_x() < self.max_x() {
            parts.push(Rect2i::new(
                overlap.max_x(),
                self.min_z,
                self.max_x() - overlap.max_x(),
                self.height,
            ));
        }
        // Strips below and above the overlap, clamped to the overlap's x span
        if overlap.min_z > self.min_z {
            parts.push(Rect2i::new(
                overlap.min_x,
                self.min_z,
                overlap.width,
                overlap.min_z - self.min_z,
            ));
        }
        if overlap.max_z() < self.max_z() {
            parts.push(Rect2i::new(
                overlap.min_x,
                overlap.max_z(),
                overlap.width,
                self.max_z() - overlap.max_z(),
            ));
        }

        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_contains_half_open() {
        let r = Rect2i::new(-2, -2, 4, 4);
        assert!(r.contains(-2, -2));
        assert!(r.contains(1, 1));
        assert!(!r.contains(2, 0));
        assert!(!r.contains(0, 2));
    }

    #[test]
    fn test_coords_count() {
        let r = Rect2i::new(-2, -2, 4, 4);
        assert_eq!(r.coords().count(), 16);
    }

    #[test]
    fn test_subtract_disjoint() {
        let a = Rect2i::new(0, 0, 4, 4);
        let b = Rect2i::new(10, 10, 4, 4);
        assert_eq!(a.subtract(&b), vec![a]);
    }

    #[test]
    fn test_subtract_covered() {
        let a = Rect2i::new(1, 1, 2, 2);
        let b = Rect2i::new(0, 0, 4, 4);
        assert!(a.subtract(&b).is_empty());
    }

    #[test]
    fn test_subtract_one_chunk_shift() {
        // Equal-sized regions, viewer moved one chunk in +x: exactly one
        // single-column strip remains on each side.
        let old = Rect2i::new(-2, -2, 4, 4);
        let new = Rect2i::new(-1, -2, 4, 4);

        let removed = old.subtract(&new);
        assert_eq!(removed, vec![Rect2i::new(-2, -2, 1, 4)]);

        let added = new.subtract(&old);
        assert_eq!(added, vec![Rect2i::new(2, -2, 1, 4)]);
    }

    #[test]
    fn test_subtract_diagonal_shift_is_disjoint_and_complete() {
        let a = Rect2i::new(0, 0, 4, 4);
        let b = Rect2i::new(1, 1, 4, 4);
        let parts = a.subtract(&b);

        // Every coordinate of `a` outside `b` appears exactly once
        let mut seen = HashSet::new();
        for part in &parts {
            for coord in part.coords() {
                assert!(seen.insert(coord), "duplicate coord {coord:?}");
                assert!(a.contains(coord.0, coord.1));
                assert!(!b.contains(coord.0, coord.1));
            }
        }
        let expected: i64 = a.area() - a.intersect(&b).map_or(0, |o| o.area());
        assert_eq!(seen.len() as i64, expected);
    }
}
