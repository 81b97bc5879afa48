use thiserror::Error;

use crate::grid::Point;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("width and height must be greater than 1 (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("point {point} is outside of the {width}x{height} grid")]
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },
    #[error("no path from {entrance} to {goal}")]
    Unreachable { entrance: Point, goal: Point },
    #[error("malformed maze on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl MazeError {
    /// Unreachable is an expected search outcome, every other variant is a fault
    pub fn is_unreachable(&self) -> bool {
        matches!(self, MazeError::Unreachable { .. })
    }
}
