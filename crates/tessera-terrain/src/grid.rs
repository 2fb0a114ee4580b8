//! Square cell grids used by the biome map passes.
//!
//! Every pass reads one [`Grid`] and writes a fresh one, so a cell's new value
//! never depends on neighbours already updated in the same pass.

/// Which neighbours [`Grid::count_neighbours`] inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbours only (up to 4).
    Four,
    /// Orthogonal and diagonal neighbours (up to 8).
    Eight,
}

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

impl Connectivity {
    /// Neighbour offsets for this connectivity.
    pub fn offsets(self) -> impl Iterator<Item = (i32, i32)> {
        let diagonal: &[(i32, i32)] = match self {
            Connectivity::Four => &[],
            Connectivity::Eight => &DIAGONAL,
        };
        ORTHOGONAL.iter().chain(diagonal.iter()).copied()
    }

    /// Maximum neighbour count for an interior cell.
    pub fn max_neighbours(self) -> u32 {
        match self {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

/// A square, row-major grid of `Copy` cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    size: u32,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Create a `size`×`size` grid filled with `value`.
    pub fn filled(size: u32, value: T) -> Self {
        Self {
            size,
            cells: vec![value; (size as usize) * (size as usize)],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut cells = Vec::with_capacity((size as usize) * (size as usize));
        for y in 0..size {
            for x in 0..size {
                cells.push(f(x, y));
            }
        }
        Self { size, cells }
    }

    /// Cells per side.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major cell slice.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Cell at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return None;
        }
        Some(self.cells[y as usize * self.size as usize + x as usize])
    }

    /// Cell at in-bounds `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= size` or `y >= size`.
    pub fn at(&self, x: u32, y: u32) -> T {
        self.cells[(y * self.size + x) as usize]
    }

    /// Overwrite the cell at in-bounds `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let idx = (y * self.size + x) as usize;
        self.cells[idx] = value;
    }

    /// Count neighbours of `(x, y)` satisfying `pred`.
    ///
    /// Out-of-bounds neighbours are skipped, so edge cells see fewer candidates.
    pub fn count_neighbours(
        &self,
        x: u32,
        y: u32,
        connectivity: Connectivity,
        mut pred: impl FnMut(T) -> bool,
    ) -> u32 {
        connectivity
            .offsets()
            .filter_map(|(dx, dy)| self.get(x as i32 + dx, y as i32 + dy))
            .filter(|&cell| pred(cell))
            .count() as u32
    }

    /// Map every cell through `f`, keeping the layout.
    pub fn map<U: Copy>(&self, mut f: impl FnMut(u32, u32, T) -> U) -> Grid<U> {
        Grid::from_fn(self.size, |x, y| f(x, y, self.at(x, y)))
    }
}
