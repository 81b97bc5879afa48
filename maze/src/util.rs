use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use crate::grid::{OPEN_MARKER, PATH_MARKER};
use crate::{Cell, Grid, Point};

const WALL_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const OPEN_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const PATH_COLOR: Rgb<u8> = Rgb([220, 40, 40]);

/// Reads a grid from an image, one cell per pixel. Dark pixels are walls.
pub fn parse_img(img: &DynamicImage) -> Result<Grid, anyhow::Error> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    anyhow::ensure!(width > 0 && height > 0, "image has no pixels");

    let mut grid = Grid::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let p = img.get_pixel(x as u32, y as u32);

            if p.0[0] >= 128 {
                grid.set(Point::new(x, y), Cell::Open)?;
            }
        }
    }

    Ok(grid)
}

/// Draws a grid as an image, one pixel per cell, with the optional path on top of the open cells
pub fn to_img(grid: &Grid, path: &[Point]) -> RgbImage {
    let overlay = grid.overlay(path);

    RgbImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        match overlay.marker_at(Point::new(x as usize, y as usize)) {
            Some(PATH_MARKER) => PATH_COLOR,
            Some(OPEN_MARKER) => OPEN_COLOR,
            _ => WALL_COLOR,
        }
    })
}
