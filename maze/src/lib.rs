pub mod error;
pub mod find;
pub mod generate;
pub mod grid;
pub mod solve;
pub mod util;

pub use error::MazeError;
pub use find::{MapStorage, MapTrait, PathFinder, PathFinderState, PathResult};
pub use generate::{generate, MazeGenerator};
pub use grid::{Cell, Grid, Overlay, Point};
pub use solve::{solve, Path};
