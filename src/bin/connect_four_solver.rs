//! Batch position scorer
//!
//! Reads one move sequence (1-indexed column digits) per line on stdin
//! and prints `<moves> <score> <nodes> <millis>` per line. Anything after
//! the first whitespace is ignored, so annotated benchmark files work
//! unchanged as input. Pass `-w` for weak solving, which reports only the
//! sign of the result.

use anyhow::Result;

use std::io::{stdin, BufRead};
use std::time::Instant;

use connect_four::{opening_book::OpeningBook, position::Position, solver::Solver};

fn main() -> Result<()> {
    let weak = std::env::args().skip(1).any(|arg| arg == "-w");

    // optional, batch runs on deep positions don't need it
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

        let start = Instant::now();
        let (score, _) = if weak {
            solver.solve_weak()
        } else {
            solver.solve()
        };

        println!(
            "{} {} {} {:.3}",
            moves,
            score,
            solver.node_count,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(())
}
