//! Bitboard representation of a Connect 4 position
//!
//! A column occupies `HEIGHT + 1` bits, least significant bit at the
//! bottom; the spare bit above each column keeps carries from spilling
//! into the neighbouring column during move generation.

use anyhow::{anyhow, Result};

use crate::{HEIGHT, WIDTH};

mod masks {
    use crate::{HEIGHT, WIDTH};

    /// One bit at the bottom cell of every column
    pub const fn bottom_edge() -> u64 {
        let mut mask = 0;
        let mut column = 0;
        while column < WIDTH {
            mask |= 1 << (column * (HEIGHT + 1));
            column += 1;
        }
        mask
    }

    /// Every playable cell on the board
    pub const fn full_board() -> u64 {
        bottom_edge() * ((1 << HEIGHT as u64) - 1)
    }
}

/// A compact game position, cheap to copy during tree search
#[derive(Copy, Clone)]
pub struct Position {
    // stones of the side to move
    current: u64,
    // stones of both sides
    occupied: u64,
    plies: usize,
}

impl Position {
    pub fn new() -> Self {
        Self {
            current: 0,
            occupied: 0,
            plies: 0,
        }
    }

    /// Replays a game given as a string of 1-indexed column digits
    ///
    /// Fails on characters outside `1..=WIDTH`, on full columns, and on
    /// sequences that continue past a finished game.
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut position = Self::new();

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    let column = column - 1;
                    if !position.playable(column) {
                        return Err(anyhow!("Invalid move, column {} full", column + 1));
                    }
                    if position.is_winning_move(column) {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    position.play_column(column);
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(position)
    }

    /// Replays 0-indexed columns, `None` if any move is illegal or the
    /// game finishes early. Used by opening book generation, which probes
    /// enormous numbers of candidate sequences.
    pub fn from_columns(columns: &[usize]) -> Option<Self> {
        let mut position = Self::new();
        for &column in columns {
            if !position.playable(column) || position.is_winning_move(column) {
                return None;
            }
            position.play_column(column);
        }
        Some(position)
    }

    pub fn from_parts(current: u64, occupied: u64, plies: usize) -> Self {
        Self {
            current,
            occupied,
            plies,
        }
    }

    pub fn current_mask(&self) -> u64 {
        self.current
    }

    pub fn occupied_mask(&self) -> u64 {
        self.occupied
    }

    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn top_cell(column: usize) -> u64 {
        1 << (column * (HEIGHT + 1) + (HEIGHT - 1))
    }

    pub fn bottom_cell(column: usize) -> u64 {
        1 << (column * (HEIGHT + 1))
    }

    pub fn column_mask(column: usize) -> u64 {
        ((1 << HEIGHT) - 1) << (column * (HEIGHT + 1))
    }

    pub fn playable(&self, column: usize) -> bool {
        Self::top_cell(column) & self.occupied == 0
    }

    /// Bitmap of the lowest open cell in every non-full column
    pub fn possible_moves(&self) -> u64 {
        (self.occupied + masks::bottom_edge()) & masks::full_board()
    }

    /// Possible moves that do not hand the opponent a win on their reply
    ///
    /// Returns 0 when every move loses: either the opponent holds two
    /// immediate threats, or every playable cell sits below one.
    pub fn non_losing_moves(&self) -> u64 {
        let mut possible = self.possible_moves();
        let opponent_wins = self.opponent_winning_spots();
        let forced = possible & opponent_wins;

        if forced != 0 {
            // two or more immediate threats cannot all be blocked
            if forced & (forced - 1) != 0 {
                return 0;
            }
            possible = forced;
        }
        // never play directly below an opponent winning cell
        possible & !(opponent_wins >> 1)
    }

    /// Number of winning cells this move would open up, used to order moves
    pub fn move_score(&self, move_bitmap: u64) -> i32 {
        self.winning_spots(self.current | move_bitmap).count_ones() as i32
    }

    /// Would dropping a stone in `column` win for the side to move?
    pub fn is_winning_move(&self, column: usize) -> bool {
        let stones =
            self.current | ((self.occupied + Self::bottom_cell(column)) & Self::column_mask(column));

        // each test marks runs of 2, then looks for a run of 2 runs
        // horizontal
        let mut pairs = stones & (stones >> (HEIGHT + 1));
        if pairs & (pairs >> (2 * (HEIGHT + 1))) != 0 {
            return true;
        }
        // diagonal /
        pairs = stones & (stones >> HEIGHT);
        if pairs & (pairs >> (2 * HEIGHT)) != 0 {
            return true;
        }
        // diagonal \
        pairs = stones & (stones >> (HEIGHT + 2));
        if pairs & (pairs >> (2 * (HEIGHT + 2))) != 0 {
            return true;
        }
        // vertical
        pairs = stones & (stones >> 1);
        pairs & (pairs >> 2) != 0
    }

    /// Open cells that would complete an alignment for the opponent
    fn opponent_winning_spots(&self) -> u64 {
        self.winning_spots(self.current ^ self.occupied)
    }

    /// Open cells that would complete a 4-alignment for `stones`
    fn winning_spots(&self, stones: u64) -> u64 {
        // vertical: cell on top of a run of 3
        let mut spots = (stones << 1) & (stones << 2) & (stones << 3);

        // the three other axes need both run ends and interior holes,
        // scanned in both directions
        for &shift in [HEIGHT + 1, HEIGHT, HEIGHT + 2].iter() {
            // runs growing rightwards
            let pair = (stones << shift) & (stones << (2 * shift));
            // right end of a run of 3: O O O _
            spots |= pair & (stones << (3 * shift));
            // hole: O O _ O
            spots |= pair & (stones >> shift);

            // runs growing leftwards
            let pair = (stones >> shift) & (stones >> (2 * shift));
            // left end of a run of 3: _ O O O
            spots |= pair & (stones >> (3 * shift));
            // hole: O _ O O
            spots |= pair & (stones << shift);
        }

        spots & (masks::full_board() ^ self.occupied)
    }

    pub fn play(&mut self, move_bitmap: u64) {
        // hand the move over: the opponent's stones become "current"
        self.current ^= self.occupied;
        self.occupied |= move_bitmap;
        self.plies += 1;
    }

    pub fn play_column(&mut self, column: usize) {
        let move_bitmap =
            (self.occupied + Self::bottom_cell(column)) & Self::column_mask(column);
        self.play(move_bitmap);
    }

    /// Unique key for the transposition table
    pub fn key(&self) -> u64 {
        self.current + self.occupied
    }

    /// Huffman encoding of the position for the opening book
    pub fn book_code(&self) -> u32 {
        self.code(false)
    }

    /// Huffman encoding of the left-right mirrored position
    pub fn book_code_mirrored(&self) -> u32 {
        self.code(true)
    }

    // 0 ends a column, 10 is a first-player stone, 11 a second-player stone
    fn code(&self, mirrored: bool) -> u32 {
        let mut code = 0;

        for i in 0..WIDTH {
            let column = if mirrored { WIDTH - 1 - i } else { i };
            let column_mask = Self::column_mask(column);
            // run one row past the top so full columns still terminate
            for row in 0..=HEIGHT {
                let cell = column_mask & (masks::bottom_edge() << row);

                if self.occupied & cell == 0 {
                    // end of column
                    code <<= 1;
                    break;
                } else if self.stone_of_player_one(cell) {
                    code = (code << 2) | 0b10;
                } else {
                    code = (code << 2) | 0b11;
                }
            }
        }
        code << 1
    }

    // `current` flips every ply, undo that to get a stable owner bit
    fn stone_of_player_one(&self, cell: u64) -> bool {
        let player_one = if self.plies % 2 == 0 {
            self.current
        } else {
            self.current ^ self.occupied
        };
        player_one & cell != 0
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}
