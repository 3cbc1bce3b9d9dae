//! Move ordering for the tree search

use crate::WIDTH;

/// Columns ordered from the middle outwards, as central columns take part
/// in more alignments and tend to be the strongest moves
pub const fn column_order() -> [usize; WIDTH] {
    let mut order = [0; WIDTH];
    let mut i = 0;
    while i < WIDTH {
        order[i] = (WIDTH / 2) + (i % 2) * (i / 2 + 1) - (1 - i % 2) * (i / 2);
        i += 1;
    }
    order
}

/// A fixed-capacity worklist that yields moves best-score-first
///
/// Entries are appended unsorted and the maximum is selected lazily on
/// `next`; at WIDTH entries a linear scan beats any real sorting. Equal
/// scores yield the most recent push first, so feeding candidates in
/// reverse exploration order preserves the intended tie-break.
pub struct MoveSorter {
    len: usize,
    // move bitmap, column, ordering score
    moves: [(u64, usize, i32); WIDTH],
}

impl MoveSorter {
    pub fn new() -> Self {
        Self {
            len: 0,
            moves: [(0, 0, 0); WIDTH],
        }
    }

    pub fn push(&mut self, move_bitmap: u64, column: usize, score: i32) {
        self.moves[self.len] = (move_bitmap, column, score);
        self.len += 1;
    }
}

impl Iterator for MoveSorter {
    type Item = (u64, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // scan from the newest entry backwards so ties go to later pushes
        let mut best = self.len - 1;
        for i in (0..best).rev() {
            if self.moves[i].2 > self.moves[best].2 {
                best = i;
            }
        }
        let (move_bitmap, column, _) = self.moves[best];

        // close the gap, keeping the push order of the rest
        self.len -= 1;
        for i in best..self.len {
            self.moves[i] = self.moves[i + 1];
        }
        Some((move_bitmap, column))
    }
}

impl Default for MoveSorter {
    fn default() -> Self {
        Self::new()
    }
}
