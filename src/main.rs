//! Interactive Connect 4 against (or between) perfect players

use anyhow::Result;

use std::cmp::Ordering;
use std::io::{stdin, stdout, Write};

use connect_four::{
    opening_book::OpeningBook,
    position::Position,
    solver::Solver,
    transposition_table::{Table, TranspositionTable},
};

mod textboard;
use textboard::{Status, TextBoard};

fn main() -> Result<()> {
    println!("Welcome to Connect 4\n");

    let opening_book = load_or_offer_book()?;

    let ai_players = (
        ask_yes_no("Is player 1 AI controlled? y/n: ")?,
        ask_yes_no("Is player 2 AI controlled? y/n: ")?,
    );

    let mut board = TextBoard::new();
    // one transposition table for the whole game, handed to each solver
    // and taken back, so later searches reuse earlier bounds
    let mut table = Some(TranspositionTable::new());

    loop {
        board.draw()?;

        match board.status {
            Status::InProgress => {}
            Status::PlayerOneWins => {
                println!("Player 1 wins!");
                break;
            }
            Status::PlayerTwoWins => {
                println!("Player 2 wins!");
                break;
            }
            Status::Draw => {
                println!("Draw!");
                break;
            }
        }

        let ai_turn = if board.player_one_to_move {
            ai_players.0
        } else {
            ai_players.1
        };

        let next_move = if ai_turn {
            println!("AI is thinking...");
            stdout().flush()?;

            // slow the game down when it plays itself
            if ai_players == (true, true) {
                std::thread::sleep(std::time::Duration::new(3, 0));
            }

            let mut solver = Solver::with_table(
                Position::from_moves(&board.moves)?,
                table.take().unwrap_or_default(),
            );
            if let Some(book) = opening_book.clone() {
                solver = solver.with_opening_book(book);
            }

            let (score, best_move) = solver.solve();
            report_forecast(&solver, score, board.player_one_to_move);
            println!("Best move: {}", best_move + 1);

            table = Some(solver.into_table());
            best_move + 1
        } else {
            print!("Move input > ");
            stdout().flush()?;
            let mut input = String::new();
            stdin().read_line(&mut input)?;

            match input.trim().parse::<usize>() {
                Ok(column) => column,
                Err(_) => {
                    println!("Invalid number: {}", input.trim());
                    continue;
                }
            }
        };

        if let Err(err) = board.play_checked(next_move) {
            println!("{}", err);
            // try the move again
            continue;
        }
    }
    Ok(())
}

/// Loads the opening book, offering to generate it when missing.
/// Playing without one works, the early AI moves are just very slow.
fn load_or_offer_book() -> Result<Option<OpeningBook>> {
    match OpeningBook::load() {
        Ok(book) => Ok(Some(book)),
        Err(err) => {
            let missing = matches!(
                err.root_cause().downcast_ref::<std::io::Error>(),
                Some(io_error) if io_error.kind() == std::io::ErrorKind::NotFound
            );
            if !missing {
                println!("Error reading opening book: {}", err.root_cause());
                return Ok(None);
            }

            if ask_yes_no(
                "Opening book not found, would you like to generate one? (takes a LONG time)\ny/n: ",
            )? {
                OpeningBook::generate()?;
                Ok(Some(OpeningBook::load()?))
            } else {
                println!("Skipping book generation, expect early AI moves to take ~10 minutes");
                Ok(None)
            }
        }
    }
}

fn ask_yes_no(prompt: &str) -> Result<bool> {
    loop {
        print!("{}", prompt);
        stdout().flush()?;

        let mut buffer = String::new();
        stdin().read_line(&mut buffer)?;

        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

/// Prints who can force what, and in how many of their moves
fn report_forecast<T: Table>(solver: &Solver<T>, score: i32, player_one_to_move: bool) {
    let distance = solver.score_to_win_distance(score);
    let moves_word = if distance == 1 { "move" } else { "moves" };
    match score.cmp(&0) {
        Ordering::Greater => {
            let player = if player_one_to_move { 1 } else { 2 };
            println!(
                "Player {} can force a win in at most {} {}.",
                player, distance, moves_word
            );
        }
        Ordering::Less => {
            let player = if player_one_to_move { 2 } else { 1 };
            println!(
                "Player {} can force a win in at most {} {}.",
                player, distance, moves_word
            );
        }
        Ordering::Equal => {
            let player = if player_one_to_move { 1 } else { 2 };
            println!(
                "Player {} can at best force a draw, {} {} remaining",
                player, distance, moves_word
            );
        }
    }
}
