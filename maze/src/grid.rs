use crate::error::MazeError;
use crate::find::{MapStorage, MapTrait, NodeReference};
use std::collections::HashSet;
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

pub const WALL_MARKER: char = '#';
pub const OPEN_MARKER: char = ' ';
/// Only appears in solved output, reads back as an open cell
pub const PATH_MARKER: char = '.';

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Wall,
    Open,
}

impl Cell {
    pub fn marker(self) -> char {
        match self {
            Cell::Wall => WALL_MARKER,
            Cell::Open => OPEN_MARKER,
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            WALL_MARKER => Some(Cell::Wall),
            OPEN_MARKER | PATH_MARKER => Some(Cell::Open),
            _ => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// Column `x` grows to the right, row `y` grows downward
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Point) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl NodeReference for Point {}

/// A rectangular grid of wall and open cells, stored row by row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid where every cell is a wall
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    fn index(&self, point: Point) -> Result<usize, MazeError> {
        if self.contains(point) {
            Ok(point.y * self.width + point.x)
        } else {
            Err(MazeError::OutOfBounds {
                point,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, point: Point) -> Result<Cell, MazeError> {
        self.index(point).map(|i| self.cells[i])
    }

    pub fn set(&mut self, point: Point, cell: Cell) -> Result<(), MazeError> {
        let i = self.index(point)?;
        self.cells[i] = cell;
        Ok(())
    }

    pub fn is_open(&self, point: Point) -> bool {
        matches!(self.get(point), Ok(Cell::Open))
    }

    /// The conventional way in: column 1 of the top row
    pub fn entrance(&self) -> Point {
        Point::new(1, 0)
    }

    /// The conventional way out: second to last column of the bottom row
    pub fn exit(&self) -> Point {
        Point::new(self.width.saturating_sub(2), self.height.saturating_sub(1))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn open_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Open)
            .map(|(i, _)| Point::new(i % self.width, i / self.width))
    }

    /// Returns the open cells next to the given point, in the order up, left, down, right.
    /// The point itself does not need to be open.
    pub fn open_neighbors(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        let inside = self.contains(point);
        let candidates = [
            point.y.checked_sub(1).map(|y| Point::new(point.x, y)),
            point.x.checked_sub(1).map(|x| Point::new(x, point.y)),
            Some(Point::new(point.x, point.y + 1)),
            Some(Point::new(point.x + 1, point.y)),
        ];

        candidates
            .into_iter()
            .flatten()
            .filter(move |p| inside && self.is_open(*p))
    }

    /// Shows the grid with the given path drawn over its open cells
    pub fn overlay(&self, path: &[Point]) -> Overlay<'_> {
        Overlay {
            grid: self,
            path: path.iter().copied().collect(),
        }
    }

    fn from_rows<'a>(rows: impl Iterator<Item = &'a str>) -> Result<Self, MazeError> {
        let mut width = None;
        let mut height = 0;
        let mut cells = Vec::new();

        for (i, row) in rows.enumerate() {
            let line = i + 1;
            let row_start = cells.len();
            for marker in row.chars() {
                let cell = Cell::from_marker(marker).ok_or_else(|| MazeError::Parse {
                    line,
                    reason: format!("unexpected character {:?}", marker),
                })?;
                cells.push(cell);
            }

            let row_width = cells.len() - row_start;
            match width {
                None if row_width == 0 => {
                    return Err(MazeError::Parse {
                        line,
                        reason: "row is empty".to_string(),
                    })
                }
                None => width = Some(row_width),
                Some(w) if w != row_width => {
                    return Err(MazeError::Parse {
                        line,
                        reason: format!("row has {} cells, expected {}", row_width, w),
                    })
                }
                Some(_) => {}
            }
            height += 1;
        }

        let width = width.ok_or_else(|| MazeError::Parse {
            line: 1,
            reason: "maze is empty".to_string(),
        })?;

        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for Grid {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_rows(s.lines())
    }
}

impl TryFrom<Vec<String>> for Grid {
    type Error = MazeError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_rows(rows.iter().map(String::as_str))
    }
}

impl From<Grid> for Vec<String> {
    fn from(grid: Grid) -> Self {
        grid.rows()
            .map(|row| row.iter().map(|cell| cell.marker()).collect())
            .collect()
    }
}

/// A grid with a path drawn on top of it, see [`Grid::overlay`]
#[derive(Debug)]
pub struct Overlay<'a> {
    grid: &'a Grid,
    path: HashSet<Point>,
}

impl Overlay<'_> {
    /// The marker shown at the given point. Walls are never replaced by the path marker.
    pub fn marker_at(&self, point: Point) -> Option<char> {
        let cell = self.grid.get(point).ok()?;
        if cell == Cell::Open && self.path.contains(&point) {
            Some(PATH_MARKER)
        } else {
            Some(cell.marker())
        }
    }

    pub fn to_rows(&self) -> Vec<String> {
        (0..self.grid.height)
            .map(|y| {
                (0..self.grid.width)
                    .filter_map(|x| self.marker_at(Point::new(x, y)))
                    .collect()
            })
            .collect()
    }
}

impl Display for Overlay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.to_rows() {
            writeln!(f, "{}", row)?;
        }

        Ok(())
    }
}

/// A MapStorage that keeps one value per grid cell in a single row-major vec
#[derive(Debug)]
pub struct CellStorage<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.x < self.width && node.y < self.height
    }

    fn get(&self, node: Self::Reference) -> T {
        self.cells[node.y * self.width + node.x]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.cells[node.y * self.width + node.x]
    }
}

impl MapTrait for Grid {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        self.contains(node)
    }

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        self.open_neighbors(node)
    }

    fn estimate(&self, from: Self::Reference, to: Self::Reference) -> usize {
        from.manhattan(to)
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage {
            width: self.width,
            height: self.height,
            cells: vec![Default::default(); self.width * self.height],
        }
    }
}
