use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use maze::{
    solve,
    util::{parse_img, to_img},
    Grid, MazeGenerator, Point,
};

/// Generate mazes and find the shortest way through them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new maze
    Generate {
        /// Number of columns
        #[arg(long, default_value_t = 21)]
        width: usize,

        /// Number of rows
        #[arg(long, default_value_t = 21)]
        height: usize,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Also draw the path from the entrance to the exit
        #[arg(long)]
        solve: bool,

        #[command(flatten)]
        output: Output,
    },
    /// Solve a maze given as text, JSON rows or a PNG image
    Solve {
        /// Maze file, reads stdin when absent or `-`
        file: Option<PathBuf>,

        #[command(flatten)]
        output: Output,
    },
}

#[derive(clap::Args, Debug)]
struct Output {
    /// How the maze is printed
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also save the maze as an image, one pixel per cell
    #[arg(long)]
    png: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Output {
    fn write(&self, grid: &Grid, path: &[Point]) -> Result<(), anyhow::Error> {
        let overlay = grid.overlay(path);
        match self.format {
            Format::Text => print!("{}", overlay),
            Format::Json => println!("{}", serde_json::to_string_pretty(&overlay.to_rows())?),
        }

        if let Some(png) = &self.png {
            to_img(grid, path)
                .save(png)
                .with_context(|| format!("could not write {}", png.display()))?;
            info!("saved image to {}", png.display());
        }

        Ok(())
    }
}

fn read_grid(file: Option<&Path>) -> Result<Grid, anyhow::Error> {
    let file = file.filter(|f| *f != Path::new("-"));

    if let Some(file) = file.filter(|f| f.extension().is_some_and(|e| e == "png")) {
        let img = image::open(file).with_context(|| format!("could not open {}", file.display()))?;
        return parse_img(&img);
    }

    let text = match file {
        Some(file) => fs::read_to_string(file)
            .with_context(|| format!("could not read {}", file.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("could not read maze from stdin")?;
            text
        }
    };

    let grid = if text.trim_start().starts_with('[') {
        serde_json::from_str(&text).context("invalid JSON maze")?
    } else {
        text.parse().context("invalid maze")?
    };
    Ok(grid)
}

/// Prints the maze with its solution, or reports that the exit can not be reached
fn write_solution(grid: &Grid, output: &Output) -> Result<ExitCode, anyhow::Error> {
    match solve(grid, grid.entrance(), grid.exit()) {
        Ok(path) => {
            info!(
                "path from {} to {} takes {} steps",
                path.entrance(),
                path.goal(),
                path.len()
            );
            output.write(grid, &path)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_unreachable() => {
            warn!("{}", e);
            output.write(grid, &[])?;
            println!("No path found.");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<ExitCode, anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            width,
            height,
            seed,
            solve: with_path,
            output,
        } => {
            let grid = MazeGenerator::new(seed)
                .generate(width, height)
                .context("could not generate maze")?;
            info!("generated {}x{} maze", width, height);

            if with_path {
                write_solution(&grid, &output)
            } else {
                output.write(&grid, &[])?;
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Solve { file, output } => {
            let grid = read_grid(file.as_deref())?;
            info!("read {}x{} maze", grid.width(), grid.height());
            write_solution(&grid, &output)
        }
    }
}
