//! Batch optimal-move finder
//!
//! Reads one move sequence (1-indexed column digits) per line on stdin
//! and prints `<moves> <score> <columns...>`, where the columns are every
//! 1-indexed move achieving the position's exact score.

use anyhow::Result;

use std::io::{stdin, BufRead};

use connect_four::{opening_book::OpeningBook, position::Position, solver::Solver};

fn main() -> Result<()> {
    let opening_book = OpeningBook::load().ok();

    let stdin = stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let moves = match line.split_whitespace().next() {
            Some(moves) => moves,
            None => continue,
        };

        let position = match Position::from_moves(moves) {
            Ok(position) => position,
            Err(err) => {
                eprintln!("skipping '{}': {}", moves, err);
                continue;
            }
        };

        let mut solver = Solver::new(position);
        if let Some(book) = opening_book.clone() {
            solver = solver.with_opening_book(book);
        }

        let scores = solver.analyze();
        let best = match scores.iter().flatten().max() {
            Some(&best) => best,
            // a full board that parsed is a finished draw, so report its
            // score with no columns to play
            None => {
                println!("{} 0", moves);
                continue;
            }
        };

        let optimal: Vec<String> = scores
            .iter()
            .enumerate()
            .filter(|(_, &score)| score == Some(best))
            .map(|(column, _)| (column + 1).to_string())
            .collect();

        println!("{} {} {}", moves, best, optimal.join(" "));
    }
    Ok(())
}
