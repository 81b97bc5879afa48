use std::ops::Deref;

use log::debug;
use serde::Serialize;

use crate::error::MazeError;
use crate::find::{MapTrait, PathFinder, PathFinderState};
use crate::grid::{Grid, Point};

/// The cells walked from the entrance to the goal. The entrance itself is not part of the path,
/// the goal is its last cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    entrance: Point,
    goal: Point,
    cells: Vec<Point>,
}

impl Path {
    pub fn entrance(&self) -> Point {
        self.entrance
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn into_cells(self) -> Vec<Point> {
        self.cells
    }
}

impl Deref for Path {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.cells
    }
}

/// Finds a shortest route through the open cells of `grid` from `entrance` to `goal`.
///
/// Walls at the entrance or goal are not rejected, they simply have no way in or out. The result
/// is deterministic: solving the same grid twice yields the same path.
pub fn solve(grid: &Grid, entrance: Point, goal: Point) -> Result<Path, MazeError> {
    for point in [entrance, goal] {
        if !grid.is_valid(point) {
            return Err(MazeError::OutOfBounds {
                point,
                width: grid.width(),
                height: grid.height(),
            });
        }
    }

    let (state, _) = PathFinder::new(entrance, goal, grid.create_storage()).finish(grid);

    match state {
        PathFinderState::PathFound(result) => {
            debug!(
                "solved {} -> {} in {} steps",
                entrance, goal, result.total_cost
            );
            Ok(Path {
                entrance,
                goal,
                cells: result.path.into_iter().skip(1).collect(),
            })
        }
        _ => Err(MazeError::Unreachable { entrance, goal }),
    }
}

#[cfg(test)]
mod test {
    use std::collections::{HashMap, VecDeque};

    use super::*;
    use crate::generate::MazeGenerator;
    use crate::grid::{Cell, PATH_MARKER, WALL_MARKER};

    fn create_basic_grid() -> Grid {
        [
            "#######", //
            "# ### #",
            "# ### #",
            "# #   #",
            "# # ###",
            "#      ",
            "#######",
        ]
        .join("\n")
        .parse()
        .unwrap()
    }

    /// Breadth-first distance between two cells, the baseline the solver must match
    fn bfs_distance(grid: &Grid, from: Point, to: Point) -> Option<usize> {
        let mut distance = HashMap::from([(from, 0)]);
        let mut queue = VecDeque::from([from]);
        while let Some(point) = queue.pop_front() {
            if point == to {
                return distance.get(&point).copied();
            }
            let d = distance[&point];
            for next in grid.open_neighbors(point) {
                distance.entry(next).or_insert_with(|| {
                    queue.push_back(next);
                    d + 1
                });
            }
        }
        None
    }

    fn assert_valid_path(grid: &Grid, path: &Path) {
        let mut previous = path.entrance();
        for &point in path.iter() {
            assert_eq!(previous.manhattan(point), 1, "{} -> {}", previous, point);
            assert_eq!(grid.get(point), Ok(Cell::Open));
            previous = point;
        }
        assert_eq!(previous, path.goal());
    }

    #[test]
    fn test_basic_route() {
        let grid = create_basic_grid();

        let path = solve(&grid, Point::new(1, 1), Point::new(5, 1)).unwrap();

        assert_eq!(path.len(), 12);
        assert_eq!(path.first(), Some(&Point::new(1, 2)));
        assert_eq!(path.last(), Some(&Point::new(5, 1)));
        assert!(!path.contains(&Point::new(1, 1)));
        assert_valid_path(&grid, &path);
    }

    #[test]
    fn test_basic_no_route() {
        let grid = create_basic_grid();

        // no route to a wall surrounded by walls
        assert_eq!(
            solve(&grid, Point::new(1, 1), Point::new(5, 0)),
            Err(MazeError::Unreachable {
                entrance: Point::new(1, 1),
                goal: Point::new(5, 0)
            })
        );
    }

    #[test]
    fn test_sealed_off_goal() {
        let mut grid = create_basic_grid();
        grid.set(Point::new(5, 2), Cell::Wall).unwrap();

        let err = solve(&grid, Point::new(1, 1), Point::new(5, 1)).unwrap_err();
        assert!(err.is_unreachable());
    }

    #[test]
    fn test_basic_shortcut() {
        let mut grid = create_basic_grid();
        // open a gap between the two corridors
        grid.set(Point::new(2, 3), Cell::Open).unwrap();

        let path = solve(&grid, Point::new(1, 1), Point::new(5, 1)).unwrap();
        assert_eq!(path.len(), 8);
        assert!(path.contains(&Point::new(2, 3)));
        assert_valid_path(&grid, &path);
    }

    #[test]
    fn test_wall_entrance() {
        let grid = create_basic_grid();

        // the wall at (2, 3) touches both corridors
        let path = solve(&grid, Point::new(2, 3), Point::new(5, 1)).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&Point::new(3, 3)));

        // a wall without open neighbours can not go anywhere
        assert!(solve(&grid, Point::new(0, 0), Point::new(5, 1))
            .unwrap_err()
            .is_unreachable());
    }

    #[test]
    fn test_same_entrance_and_goal() {
        let grid = create_basic_grid();
        let path = solve(&grid, Point::new(1, 1), Point::new(1, 1)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = create_basic_grid();

        assert!(matches!(
            solve(&grid, Point::new(7, 1), Point::new(5, 1)),
            Err(MazeError::OutOfBounds { .. })
        ));
        assert!(matches!(
            solve(&grid, Point::new(1, 1), Point::new(1, 70)),
            Err(MazeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_shortest_on_open_field() {
        // many routes of equal length
        let grid: Grid = vec![" ".repeat(9); 7].join("\n").parse().unwrap();

        let path = solve(&grid, Point::new(0, 0), Point::new(8, 6)).unwrap();
        assert_eq!(path.len(), 14);
        assert_valid_path(&grid, &path);

        let again = solve(&grid, Point::new(0, 0), Point::new(8, 6)).unwrap();
        assert_eq!(path, again);
    }

    #[test]
    fn test_matches_breadth_first_search() {
        let mut generator = MazeGenerator::new(Some(99));
        for (width, height) in [(5, 5), (11, 7), (20, 13), (31, 31)] {
            let mut grid = generator.generate(width, height).unwrap();
            // knock out a few interior walls to create loops
            for x in (3..width - 1).step_by(4) {
                grid.set(Point::new(x, height / 2), Cell::Open).unwrap();
            }

            let (entrance, exit) = (grid.entrance(), grid.exit());
            let path = solve(&grid, entrance, exit).unwrap();

            assert_eq!(Some(path.len()), bfs_distance(&grid, entrance, exit));
            assert_valid_path(&grid, &path);
            assert_eq!(solve(&grid, entrance, exit).unwrap(), path);
        }
    }

    #[test]
    fn test_overlay_only_changes_open_cells() {
        let grid = MazeGenerator::new(Some(8)).generate(5, 5).unwrap();
        let path = solve(&grid, grid.entrance(), grid.exit()).unwrap();

        let overlay = grid.overlay(&path);
        let rows = overlay.to_rows();
        assert_eq!(rows.len(), 5);

        for (y, row) in rows.iter().enumerate() {
            for (x, marker) in row.chars().enumerate() {
                let cell = grid.get(Point::new(x, y)).unwrap();
                if marker == PATH_MARKER {
                    assert_eq!(cell, Cell::Open);
                }
                if cell == Cell::Wall {
                    assert_eq!(marker, WALL_MARKER);
                }
            }
        }
        assert_eq!(
            rows.iter().flat_map(|r| r.chars()).filter(|c| *c == PATH_MARKER).count(),
            path.len()
        );
    }
}
