//! Opening book of exactly-solved early positions
//!
//! Deep searches are slowest near the start of the game, so every unique
//! position at [`BOOK_DEPTH`] plies is solved once, offline, and stored
//! with its exact score. The book file is a sorted sequence of records:
//! a big-endian u32 Huffman position code followed by an i8 score.
//! Mirrored positions share a record under the smaller of the two codes.

use anyhow::Result;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use indicatif::*;
use rayon::prelude::*;

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc::*;
use std::thread;
use std::time::*;

use crate::{
    position::Position, solver::Solver, transposition_table::SharedTranspositionTable, WIDTH,
};

pub const BOOK_PATH: &str = "opening_book.bin";
pub const STAGING_PATH: &str = "book_positions.bin";

/// Depth (in plies) at which the search probes the book
pub const BOOK_DEPTH: usize = 12;

// column sequences enumerated in stage 1: WIDTH ^ BOOK_DEPTH
const SEQUENCE_COUNT: u64 = (WIDTH as u64).pow(BOOK_DEPTH as u32);

/// A shared handle to a loaded opening book
#[derive(Clone)]
pub struct OpeningBook(Rc<BookStorage>);

impl OpeningBook {
    pub fn load() -> Result<Self> {
        Self::load_from(BOOK_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self(Rc::new(BookStorage::load(path)?)))
    }

    /// Looks up a position by its code and the code of its mirror image
    pub fn lookup(&self, code: u32, mirrored: u32) -> Option<i32> {
        // generation keys each pair of mirrors under the smaller code
        self.0.get(code.min(mirrored))
    }

    /// Builds the book from scratch and writes it to [`BOOK_PATH`]
    ///
    /// Runs in two stages: enumerate every unique book-depth position,
    /// then solve them all. Enumeration results are staged on disk so an
    /// interrupted run can resume with stage 2.
    pub fn generate() -> Result<()> {
        let start = Instant::now();

        let positions = if Path::new(STAGING_PATH).exists() {
            println!("Loading stored positions from {}", STAGING_PATH);
            read_staging()?
        } else {
            let positions = enumerate_positions()?;
            print!("Writing positions to {} ... ", STAGING_PATH);
            write_staging(&positions)?;
            println!("done");
            positions
        };

        let entries = score_positions(positions)?;

        print!("Writing book to {} ... ", BOOK_PATH);
        let mut file = BufWriter::new(File::create(BOOK_PATH)?);
        for (code, score) in entries {
            file.write_u32::<BigEndian>(code)?;
            file.write_i8(score)?;
        }
        file.flush()?;
        println!("done");

        println!(
            "Opening book generation completed in {}",
            HumanDuration(start.elapsed())
        );
        Ok(())
    }
}

/// The book's in-memory form: two parallel vectors sorted by code
pub struct BookStorage {
    codes: Vec<u32>,
    scores: Vec<i8>,
}

impl BookStorage {
    /// Builds storage from records already sorted by code
    pub fn from_entries(entries: &[(u32, i8)]) -> Self {
        Self {
            codes: entries.iter().map(|&(code, _)| code).collect(),
            scores: entries.iter().map(|&(_, score)| score).collect(),
        }
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = BufReader::new(File::open(path)?);
        let mut codes = Vec::new();
        let mut scores = Vec::new();

        loop {
            match file.read_u32::<BigEndian>() {
                Ok(code) => {
                    codes.push(code);
                    scores.push(file.read_i8()?);
                }
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Self { codes, scores })
    }

    pub fn get(&self, code: u32) -> Option<i32> {
        self.codes
            .binary_search(&code)
            .ok()
            .map(|i| self.scores[i] as i32)
    }
}

// position code, current mask, occupied mask
type StagedPosition = (u32, u64, u64);

/// Stage 1: walk every column sequence of length BOOK_DEPTH, one worker
/// per first column, and keep the unique legal positions
fn enumerate_positions() -> Result<Vec<StagedPosition>> {
    enum Message {
        Progress(u64),
        Done(Vec<StagedPosition>),
    }
    let start = Instant::now();
    let (tx, rx) = channel();

    for first in 0..WIDTH {
        let tx = tx.clone();

        thread::spawn(move || {
            let mut columns = [0usize; BOOK_DEPTH];
            columns[0] = first;
            let mut found: Vec<StagedPosition> = Vec::new();
            let mut last_dedup = 0;
            let mut attempts = 0u64;

            'sequences: loop {
                if let Some(position) = Position::from_columns(&columns) {
                    // next-move wins never reach the book probe, the
                    // search short-circuits them earlier
                    if !(0..WIDTH)
                        .any(|c| position.playable(c) && position.is_winning_move(c))
                    {
                        found.push((
                            position.book_code().min(position.book_code_mirrored()),
                            position.current_mask(),
                            position.occupied_mask(),
                        ));
                    }
                }

                attempts += 1;
                if attempts % (1 << 22) == 0 {
                    tx.send(Message::Progress(1 << 22)).unwrap();
                    // keep memory bounded while the walk is running
                    if found.len() - last_dedup > 10_000_000 {
                        found.sort_unstable();
                        found.dedup_by_key(|entry| entry.0);
                        last_dedup = found.len();
                    }
                }

                // odometer over every digit after the fixed first column
                let mut digit = BOOK_DEPTH;
                loop {
                    digit -= 1;
                    if digit == 0 {
                        break 'sequences;
                    }
                    columns[digit] += 1;
                    if columns[digit] < WIDTH {
                        break;
                    }
                    columns[digit] = 0;
                }
            }
            tx.send(Message::Done(found)).unwrap();
        });
    }

    let progress = ProgressBar::new(SEQUENCE_COUNT);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[1/2] Enumerating positions: {bar:40.cyan/blue} {msg} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let mut positions: Vec<StagedPosition> = Vec::new();
    let mut attempted = 0u64;
    let mut finished = 0;
    let mut next_update = Instant::now();

    while finished < WIDTH {
        match rx.recv()? {
            Message::Progress(n) => attempted += n,
            Message::Done(mut found) => {
                positions.append(&mut found);
                positions.sort_unstable();
                positions.dedup_by_key(|entry| entry.0);
                finished += 1;
            }
        }
        if Instant::now() > next_update {
            progress.set_position(attempted);
            progress.set_message(&format!(
                "({}M / {}M)",
                attempted / 1_000_000,
                SEQUENCE_COUNT / 1_000_000
            ));
            next_update += Duration::from_millis(100);
        }
    }

    progress.finish();
    println!(
        "Enumeration complete in {:.1}s, {} unique positions",
        start.elapsed().as_secs_f64(),
        positions.len(),
    );
    Ok(positions)
}

fn write_staging(positions: &[StagedPosition]) -> Result<()> {
    let mut file = BufWriter::new(File::create(STAGING_PATH)?);
    for &(code, current, occupied) in positions {
        file.write_u32::<BigEndian>(code)?;
        file.write_u64::<BigEndian>(current)?;
        file.write_u64::<BigEndian>(occupied)?;
    }
    file.flush()?;
    Ok(())
}

fn read_staging() -> Result<Vec<StagedPosition>> {
    let mut file = BufReader::new(File::open(STAGING_PATH)?);
    let mut positions = Vec::new();
    loop {
        match file.read_u32::<BigEndian>() {
            Ok(code) => {
                positions.push((
                    code,
                    file.read_u64::<BigEndian>()?,
                    file.read_u64::<BigEndian>()?,
                ));
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(positions)
}

/// Stage 2: solve every staged position exactly, all rayon workers
/// sharing one lock-free transposition table
fn score_positions(positions: Vec<StagedPosition>) -> Result<Vec<(u32, i8)>> {
    enum Message {
        Scored((u32, i8)),
        Done,
    }
    let (tx, rx) = channel();

    let progress = ProgressBar::new(positions.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[2/2] Scoring positions: {bar:40.cyan/blue} {msg} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let table = SharedTranspositionTable::new();
    thread::spawn(move || {
        positions.par_iter().for_each_with(
            (tx.clone(), table),
            |(tx, table), &(code, current, occupied)| {
                let position = Position::from_parts(current, occupied, BOOK_DEPTH);
                let mut solver = Solver::with_table(position, table.clone());
                let (score, _) = solver.solve();

                tx.send(Message::Scored((code, score as i8))).unwrap();
            },
        );
        tx.send(Message::Done).unwrap();
    });

    let mut entries = Vec::new();
    let mut pending = 0;
    let mut next_update = Instant::now();
    loop {
        match rx.recv()? {
            Message::Done => break,
            Message::Scored(entry) => {
                entries.push(entry);
                pending += 1;
            }
        }
        if Instant::now() > next_update {
            progress.inc(pending);
            pending = 0;
            progress.set_message(&format!(
                "({} / {})",
                progress.position(),
                progress.length()
            ));
            next_update += Duration::from_millis(100);
        }
    }
    progress.finish();

    entries.sort_unstable();
    Ok(entries)
}
