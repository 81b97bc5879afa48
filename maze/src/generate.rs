//! Maze generation by randomized depth-first carving ("recursive backtracking").
//!
//! Cells with two even coordinates form the lattice of rooms. Every other position starts out as
//! a wall, and the walls between two rooms get knocked out as the carving walks the lattice.
//! The result is a perfect maze: exactly one route between any two rooms.

use log::{debug, trace};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::error::MazeError;
use crate::grid::{Cell, Grid, Point};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Moves `steps` cells from `from`, `None` if that leaves the grid
    fn step(self, from: Point, steps: usize, grid: &Grid) -> Option<Point> {
        let to = match self {
            Direction::Up => Point::new(from.x, from.y.checked_sub(steps)?),
            Direction::Down => Point::new(from.x, from.y + steps),
            Direction::Left => Point::new(from.x.checked_sub(steps)?, from.y),
            Direction::Right => Point::new(from.x + steps, from.y),
        };
        grid.contains(to).then_some(to)
    }
}

/// A room on the carving stack together with the directions it has left to try
struct Frame {
    cell: Point,
    directions: [Direction; 4],
    next: usize,
}

pub struct MazeGenerator<R: Rng = StdRng> {
    rng: R,
}

impl MazeGenerator<StdRng> {
    /// Uses a fixed seed when one is given so the same maze can be generated again
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> MazeGenerator<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates a `width` x `height` maze with its entrance at `(1, 0)` and its exit at
    /// `(width - 2, height - 1)`, both always open.
    pub fn generate(&mut self, width: usize, height: usize) -> Result<Grid, MazeError> {
        if width <= 1 || height <= 1 {
            return Err(MazeError::InvalidDimensions { width, height });
        }

        let mut grid = Grid::new(width, height);
        let start = Point::new(
            self.rng.gen_range(0..=(width - 1) / 2) * 2,
            self.rng.gen_range(0..=(height - 1) / 2) * 2,
        );
        debug!("generating {}x{} maze from {}", width, height, start);

        let rooms = self.carve(&mut grid, start)?;
        open_boundary(&mut grid)?;

        debug!(
            "carved {} rooms, {} open cells in total",
            rooms,
            grid.open_cells().count()
        );
        Ok(grid)
    }

    /// Carves passages from `start` until every reachable room has been visited and returns the
    /// number of rooms opened. Uses an explicit stack instead of recursion so large grids do not
    /// run out of call stack.
    fn carve(&mut self, grid: &mut Grid, start: Point) -> Result<usize, MazeError> {
        grid.set(start, Cell::Open)?;
        let mut rooms = 1;
        let mut stack = vec![self.frame(start)];

        while let Some(frame) = stack.last_mut() {
            let Some(&direction) = frame.directions.get(frame.next) else {
                // dead end, backtrack
                stack.pop();
                continue;
            };
            frame.next += 1;
            let cell = frame.cell;

            let Some(target) = direction.step(cell, 2, grid) else {
                continue;
            };
            if grid.get(target)? == Cell::Wall {
                let between = Point::new((cell.x + target.x) / 2, (cell.y + target.y) / 2);
                grid.set(between, Cell::Open)?;
                grid.set(target, Cell::Open)?;
                rooms += 1;
                stack.push(self.frame(target));
            }
        }

        Ok(rooms)
    }

    fn frame(&mut self, cell: Point) -> Frame {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);
        Frame {
            cell,
            directions,
            next: 0,
        }
    }
}

/// Forces the entrance and exit open. When the exit sits in a row below the lattice with no open
/// cell next to it, the wall above it is removed as well to join it to the two rooms beside that wall.
fn open_boundary(grid: &mut Grid) -> Result<(), MazeError> {
    let entrance = grid.entrance();
    let exit = grid.exit();
    trace!("opening entrance {} and exit {}", entrance, exit);
    grid.set(entrance, Cell::Open)?;
    grid.set(exit, Cell::Open)?;

    if grid.open_neighbors(exit).next().is_none() {
        let link = Point::new(exit.x, exit.y - 1);
        trace!("joining exit {} through {}", exit, link);
        grid.set(link, Cell::Open)?;
    }

    Ok(())
}

/// Generates a maze using a freshly seeded random source
pub fn generate(width: usize, height: usize) -> Result<Grid, MazeError> {
    MazeGenerator::new(None).generate(width, height)
}
