//! The game tree search

use crate::{
    move_sorter::*,
    opening_book::{OpeningBook, BOOK_DEPTH},
    position::Position,
    transposition_table::{Table, TranspositionTable},
    HEIGHT, WIDTH,
};

use std::cmp::Ordering;

/// The minimum possible score of a position
pub const MIN_SCORE: i32 = -((WIDTH * HEIGHT) as i32) / 2 + 3;
/// The maximum possible score of a position
pub const MAX_SCORE: i32 = ((WIDTH * HEIGHT) as i32 + 1) / 2 - 3;

/// An agent that solves Connect 4 positions
///
/// # Position Scoring
/// A position is scored by how far a forced win lies from the start of the
/// game. If the first player wins with their final stone (the 21st on a 7x6
/// board) the score is 1, or -1 if the second player wins with theirs.
/// Earlier wins score further from 0, up to 18/-18 for a win with a
/// player's 4th stone. A drawn position scores 0.
#[derive(Clone)]
pub struct Solver<T = TranspositionTable> {
    position: Position,

    /// Number of nodes searched so far, for diagnostics only
    pub node_count: usize,
    table: T,
    opening_book: Option<OpeningBook>,
}

impl Solver<TranspositionTable> {
    /// Creates a solver with a fresh transposition table
    pub fn new(position: Position) -> Self {
        Self::with_table(position, TranspositionTable::new())
    }
}

impl<T: Table> Solver<T> {
    /// Creates a solver reusing an existing transposition table, which may
    /// carry bounds from earlier searches of related positions
    pub fn with_table(position: Position, table: T) -> Self {
        Self {
            position,
            node_count: 0,
            table,
            opening_book: None,
        }
    }

    /// Attaches an opening book, consulted whenever the search reaches
    /// book depth
    pub fn with_opening_book(mut self, opening_book: OpeningBook) -> Self {
        self.opening_book = Some(opening_book);
        self
    }

    /// Recovers the transposition table for reuse by a later solver
    pub fn into_table(self) -> T {
        self.table
    }

    /// Calculates the exact score and a best column for the position
    pub fn solve(&mut self) -> (i32, usize) {
        self.search(false, false)
    }

    /// As [`solve`](Self::solve), logging window progress to stdout
    pub fn solve_verbose(&mut self) -> (i32, usize) {
        self.search(false, true)
    }

    /// Determines only win (1), draw (0) or loss (-1), which prunes much
    /// harder than the full solve
    pub fn solve_weak(&mut self) -> (i32, usize) {
        self.search(true, false)
    }

    /// Scores every playable column of the position, `None` for full
    /// columns. The maximum entry equals the position score.
    pub fn analyze(&mut self) -> [Option<i32>; WIDTH] {
        let root = self.position;
        let mut scores = [None; WIDTH];

        for column in 0..WIDTH {
            if !root.playable(column) {
                continue;
            }
            if root.is_winning_move(column) {
                scores[column] = Some(((WIDTH * HEIGHT + 1 - root.plies()) / 2) as i32);
                continue;
            }
            let mut child = root;
            child.play_column(column);
            self.position = child;
            let (score, _) = self.search(false, false);
            scores[column] = Some(-score);
        }

        self.position = root;
        scores
    }

    /// Iterative deepening: a null-window binary search over the score
    /// range, so each top-level probe only answers "above or below mid?"
    fn search(&mut self, weak: bool, verbose: bool) -> (i32, usize) {
        let total = (WIDTH * HEIGHT) as i32;
        let plies = self.position.plies() as i32;

        let mut min = -(total - plies) / 2;
        let mut max = (total + 1 - plies) / 2;
        if weak {
            min = min.max(-1);
            max = max.min(1);
        }

        let mut next_move = WIDTH;
        while min < max {
            let mut mid = min + (max - min) / 2;
            // probe shallow (small absolute) scores first, they are the
            // cheapest to refute
            if mid <= 0 && min / 2 < mid {
                mid = min / 2
            } else if mid >= 0 && max / 2 > mid {
                mid = max / 2
            }

            if verbose {
                println!(
                    "Search depth: {}/{}, uncertainty: {}",
                    (total - plies) - min.abs().min(max.abs()),
                    total - plies,
                    max - min
                );
            }

            let (r, best_move) = self.top_level_search(mid, mid + 1);
            next_move = best_move;

            // r is not necessarily exact, but it lands on the same side of
            // mid as the true score
            if r <= mid {
                max = r
            } else {
                min = r
            }
        }

        // fail-soft cutoffs can land outside a weak window
        if weak {
            min = min.max(-1).min(1);
        }
        (min, next_move)
    }

    /// One root probe, tracking the best column alongside the score
    fn top_level_search(&mut self, mut alpha: i32, beta: i32) -> (i32, usize) {
        let position = self.position;
        self.node_count += 1;

        // win on this move?
        for column in 0..WIDTH {
            if position.playable(column) && position.is_winning_move(column) {
                return (
                    ((WIDTH * HEIGHT + 1 - position.plies()) / 2) as i32,
                    column,
                );
            }
        }

        let non_losing = position.non_losing_moves();
        if non_losing == 0 {
            // every move loses (or the board is full), report any legal
            // column; WIDTH stands in when there is none
            let first = (0..WIDTH).find(|&c| position.playable(c)).unwrap_or(WIDTH);
            return (
                -((WIDTH * HEIGHT) as i32 - position.plies() as i32) / 2,
                first,
            );
        }

        let mut moves = MoveSorter::new();
        // pushing edge columns first leaves central columns on top of
        // equal-score groups
        for &column in column_order().iter().rev() {
            let candidate = non_losing & Position::column_mask(column);
            if candidate != 0 {
                moves.push(candidate, column, position.move_score(candidate));
            }
        }

        let mut best_score = MIN_SCORE;
        let mut best_move = WIDTH;
        for (move_bitmap, column) in moves {
            let mut child = position;
            child.play(move_bitmap);
            // the window flips for the other player
            let score = -self.negamax(child, -beta, -alpha);
            // a perfect opponent never lets us into a branch above beta
            if score >= beta {
                return (score, column);
            }
            if score > alpha {
                alpha = score;
            }
            if score > best_score {
                best_score = score;
                best_move = column;
            }
        }

        (alpha, best_move)
    }

    /// The recursive alpha-beta negamax over copied positions
    fn negamax(&mut self, position: Position, mut alpha: i32, mut beta: i32) -> i32 {
        self.node_count += 1;

        // win on this move?
        for column in 0..WIDTH {
            if position.playable(column) && position.is_winning_move(column) {
                return ((WIDTH * HEIGHT + 1 - position.plies()) / 2) as i32;
            }
        }

        let non_losing = position.non_losing_moves();
        if non_losing == 0 {
            return -((WIDTH * HEIGHT) as i32 - position.plies() as i32) / 2;
        }

        // no win in sight with two stones to go means a draw
        if position.plies() >= WIDTH * HEIGHT - 2 {
            return 0;
        }

        if position.plies() == BOOK_DEPTH {
            if let Some(book) = &self.opening_book {
                if let Some(score) =
                    book.lookup(position.book_code(), position.book_code_mirrored())
                {
                    return score;
                }
            }
        }

        // upper bound given no immediate win exists
        let mut max = ((WIDTH * HEIGHT - 1 - position.plies()) / 2) as i32;

        let key = position.key();
        let value = self.table.get(key) as i32;
        if value != 0 {
            if value > MAX_SCORE - MIN_SCORE + 1 {
                // stored lower bound
                let min = value + 2 * MIN_SCORE - MAX_SCORE - 2;
                if alpha < min {
                    alpha = min;
                    if alpha >= beta {
                        return alpha;
                    }
                }
            } else {
                // stored upper bound
                max = value + MIN_SCORE - 1;
            }
        }
        if beta > max {
            beta = max;
            if alpha >= beta {
                return beta;
            }
        }

        let mut moves = MoveSorter::new();
        for &column in column_order().iter().rev() {
            let candidate = non_losing & Position::column_mask(column);
            if candidate != 0 {
                moves.push(candidate, column, position.move_score(candidate));
            }
        }

        for (move_bitmap, _column) in moves {
            let mut child = position;
            child.play(move_bitmap);
            let score = -self.negamax(child, -beta, -alpha);
            if score >= beta {
                // remember a lower bound; offsets keep the stored byte
                // clear of the 0 empty-slot sentinel
                self.table
                    .set(key, (score + MAX_SCORE - 2 * MIN_SCORE + 2) as u8);
                return score;
            }
            if score > alpha {
                alpha = score;
            }
        }

        // remember an upper bound
        self.table.set(key, (alpha - MIN_SCORE + 1) as u8);
        alpha
    }

    /// Converts a position score to a win distance in the winning
    /// player's remaining moves
    pub fn score_to_win_distance(&self, score: i32) -> usize {
        let plies = self.position.plies();
        match score.cmp(&0) {
            Ordering::Equal => WIDTH * HEIGHT - plies,
            Ordering::Greater => (WIDTH * HEIGHT / 2 + 1 - score as usize) - plies / 2,
            Ordering::Less => (WIDTH * HEIGHT / 2 + 1) - (-score as usize) - plies / 2,
        }
    }
}

impl<T> std::ops::Deref for Solver<T> {
    type Target = Position;

    fn deref(&self) -> &Self::Target {
        &self.position
    }
}
