//! Terminal-friendly board for the interactive game
//!
//! Tracks tiles in a plain array alongside the move string fed to the
//! solver, and renders with coloured terminal output.

use anyhow::{anyhow, Result};
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect_four::{HEIGHT, WIDTH};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Tile {
    Empty,
    PlayerOne,
    PlayerTwo,
}

#[derive(Copy, Clone, Debug)]
pub enum Status {
    InProgress,
    PlayerOneWins,
    PlayerTwoWins,
    Draw,
}

#[derive(Clone)]
pub struct TextBoard {
    // left-to-right, bottom-to-top
    tiles: [Tile; WIDTH * HEIGHT],
    heights: [usize; WIDTH],
    num_moves: usize,
    pub player_one_to_move: bool,
    /// The game so far as solver input (1-indexed column digits)
    pub moves: String,
    pub status: Status,
}

impl TextBoard {
    pub fn new() -> Self {
        Self {
            tiles: [Tile::Empty; WIDTH * HEIGHT],
            heights: [0; WIDTH],
            num_moves: 0,
            player_one_to_move: true,
            moves: String::new(),
            status: Status::InProgress,
        }
    }

    /// Plays a 1-indexed column, validating it first, and reports the
    /// resulting game status
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<Status> {
        if column_one_indexed < 1 || column_one_indexed > WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                WIDTH
            ));
        }
        let column = column_one_indexed - 1;
        if self.heights[column] >= HEIGHT {
            return Err(anyhow!("Invalid move, column {} full", column_one_indexed));
        }

        self.status = if self.completes_alignment(column) {
            if self.player_one_to_move {
                Status::PlayerOneWins
            } else {
                Status::PlayerTwoWins
            }
        } else if self.num_moves + 1 == WIDTH * HEIGHT {
            Status::Draw
        } else {
            Status::InProgress
        };

        self.drop_tile(column);
        self.moves.push_str(&column_one_indexed.to_string());

        Ok(self.status)
    }

    fn drop_tile(&mut self, column: usize) {
        let tile = if self.player_one_to_move {
            Tile::PlayerOne
        } else {
            Tile::PlayerTwo
        };
        self.tiles[column + WIDTH * self.heights[column]] = tile;
        self.heights[column] += 1;
        self.num_moves += 1;
        self.player_one_to_move = !self.player_one_to_move;
    }

    // would the side to move complete a 4-alignment by playing here?
    fn completes_alignment(&self, column: usize) -> bool {
        let tile = if self.player_one_to_move {
            Tile::PlayerOne
        } else {
            Tile::PlayerTwo
        };
        let row = self.heights[column];

        for &(dx, dy) in [(1i32, 0i32), (0, 1), (1, 1), (1, -1)].iter() {
            // count outwards from the landing cell in both directions
            let mut run = 1;
            for &sign in [1i32, -1].iter() {
                let mut x = column as i32 + sign * dx;
                let mut y = row as i32 + sign * dy;
                while x >= 0
                    && x < WIDTH as i32
                    && y >= 0
                    && y < HEIGHT as i32
                    && self.tiles[x as usize + WIDTH * y as usize] == tile
                {
                    run += 1;
                    x += sign * dx;
                    y += sign * dy;
                }
            }
            if run >= 4 {
                return true;
            }
        }
        false
    }

    /// Draws the board with column numbers underneath
    pub fn draw(&self) -> Result<()> {
        let mut stdout = stdout();

        for row in (0..HEIGHT).rev() {
            for column in 0..WIDTH {
                let colour = match self.tiles[column + WIDTH * row] {
                    Tile::PlayerOne => Color::Red,
                    Tile::PlayerTwo => Color::Yellow,
                    Tile::Empty => Color::DarkBlue,
                };
                stdout.queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(colour),
                ))?;
            }
            stdout.queue(PrintStyledContent(style("\n")))?;
        }

        let numbers: String = (1..=WIDTH).map(|c| c.to_string()).collect();
        stdout.queue(PrintStyledContent(style(numbers + "\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for TextBoard {
    fn default() -> Self {
        Self::new()
    }
}
