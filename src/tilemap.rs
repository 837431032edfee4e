/// A dense 2D grid stored row-major. Coordinates are `(x, y)` = `(col, row)`.
///
/// The world is a flat rectangle: nothing wraps at the edges.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Tilemap<T> {
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Bounds-checked lookup.
    pub fn try_get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Moore neighbourhood (up to 8 cells), clipped at every edge.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                    result.push((nx as usize, ny as usize));
                }
            }
        }

        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Build a new map of the same shape by transforming every cell.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Raw row-major storage, used for per-row parallel fills.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl Tilemap<f32> {
    /// Smallest and largest value, or `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Transform every value in place.
    pub fn apply<F: Fn(f32) -> f32>(&mut self, f: F) {
        for v in self.data.iter_mut() {
            *v = f(*v);
        }
    }

    pub fn clamp_in_place(&mut self, lo: f32, hi: f32) {
        self.apply(|v| v.clamp(lo, hi));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_clipped_at_corners() {
        let map = Tilemap::new_with(5, 4, 0u8);

        assert_eq!(map.neighbors_8(0, 0).len(), 3);
        assert_eq!(map.neighbors_8(4, 3).len(), 3);
        assert_eq!(map.neighbors_8(2, 0).len(), 5);
        assert_eq!(map.neighbors_8(2, 2).len(), 8);

        // No wrapping across the left edge
        assert!(!map.neighbors_8(0, 1).iter().any(|&(x, _)| x == 4));
    }

    #[test]
    fn test_row_major_layout() {
        let mut map = Tilemap::new_with(3, 2, 0i32);
        map.set(2, 1, 7);
        assert_eq!(map.as_mut_slice()[5], 7);
        assert_eq!(map.iter().nth(5), Some((2, 1, &7)));
        assert_eq!(map.try_get(3, 0), None);
        assert_eq!(map.try_get(2, 1), Some(&7));
    }

    /// Only compiles while the accessors carry no `Clone` bound.
    fn cell_count<T>(map: &Tilemap<T>) -> usize {
        map.iter().filter(|&(x, y, _)| map.try_get(x, y).is_some()).count()
    }

    #[test]
    fn test_accessors_need_no_clone_bound() {
        let map = Tilemap::new_with(4, 3, 'a');
        assert_eq!(cell_count(&map), 12);
        assert_eq!(cell_count(&map.map(|_| ())), 12);
    }

    #[test]
    fn test_min_max_and_clamp() {
        let mut map = Tilemap::new_with(2, 2, 0.5f32);
        map.set(0, 0, -1.0);
        map.set(1, 1, 2.0);
        assert_eq!(map.min_max(), Some((-1.0, 2.0)));

        map.clamp_in_place(0.0, 1.0);
        assert_eq!(map.min_max(), Some((0.0, 1.0)));
    }
}
