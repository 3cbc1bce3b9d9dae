#[cfg(test)]
pub mod test {
    use anyhow::Result;

    use crate::move_sorter::{column_order, MoveSorter};
    use crate::opening_book::BookStorage;
    use crate::position::Position;
    use crate::solver::Solver;
    use crate::transposition_table::{SharedTranspositionTable, Table, TranspositionTable};

    #[test]
    pub fn move_parsing_rejects_garbage() {
        assert!(Position::from_moves("0").is_err());
        assert!(Position::from_moves("8").is_err());
        assert!(Position::from_moves("a").is_err());
        assert!(Position::from_moves("12x").is_err());
    }

    #[test]
    pub fn move_parsing_rejects_full_column() -> Result<()> {
        // six stones fill a column, a seventh must fail
        assert!(Position::from_moves("111111").is_ok());
        assert!(Position::from_moves("1111111").is_err());
        Ok(())
    }

    #[test]
    pub fn move_parsing_rejects_finished_game() {
        // player 1 completes the bottom row with the final digit
        assert!(Position::from_moves("1122334").is_err());
    }

    #[test]
    pub fn winning_move_detection() -> Result<()> {
        // horizontal: player 1 holds the bottom of columns 1-3
        let position = Position::from_moves("112233")?;
        assert!(position.is_winning_move(3));
        assert!(!position.is_winning_move(0));
        assert!(!position.is_winning_move(6));

        // vertical: player 1 has stacked three in column 1
        let position = Position::from_moves("121212")?;
        assert!(position.is_winning_move(0));
        assert!(!position.is_winning_move(1));
        Ok(())
    }

    #[test]
    pub fn blocking_move_is_forced() -> Result<()> {
        // player 2 to move, player 1 threatens a vertical four in column 1;
        // the only non-losing move is the cell above that run (bit 3)
        let position = Position::from_moves("12121")?;
        assert_eq!(position.non_losing_moves(), 1 << 3);
        Ok(())
    }

    #[test]
    pub fn double_threat_leaves_no_moves() -> Result<()> {
        // player 1 has an open-ended bottom-row three on columns 3-5
        let position = Position::from_moves("3344557")?;
        assert_eq!(position.non_losing_moves(), 0);
        Ok(())
    }

    #[test]
    pub fn table_key_ignores_move_order() -> Result<()> {
        let a = Position::from_moves("123")?;
        let b = Position::from_moves("321")?;
        assert_eq!(a.key(), b.key());
        Ok(())
    }

    #[test]
    pub fn book_coding() -> Result<()> {
        let position = Position::from_moves("22244444")?;
        assert_eq!(position.book_code(), 0b010111000111011101100000);
        Ok(())
    }

    #[test]
    pub fn book_coding_mirror() -> Result<()> {
        let position = Position::from_moves("22244444")?;
        let mirrored = Position::from_moves("66644444")?;

        assert_eq!(position.book_code_mirrored(), mirrored.book_code());
        assert_eq!(position.book_code(), mirrored.book_code_mirrored());
        Ok(())
    }

    #[test]
    pub fn column_order_is_centre_out() {
        assert_eq!(column_order(), [3, 4, 2, 5, 1, 6, 0]);
    }

    #[test]
    pub fn move_sorter_yields_best_first() {
        let mut moves = MoveSorter::new();
        moves.push(0b001, 0, 0);
        moves.push(0b010, 1, 5);
        moves.push(0b100, 2, 2);

        assert_eq!(moves.next(), Some((0b010, 1)));
        assert_eq!(moves.next(), Some((0b100, 2)));
        assert_eq!(moves.next(), Some((0b001, 0)));
        assert_eq!(moves.next(), None);
    }

    #[test]
    pub fn move_sorter_breaks_ties_towards_later_pushes() {
        let mut moves = MoveSorter::new();
        moves.push(0b01, 4, 1);
        moves.push(0b10, 5, 1);

        assert_eq!(moves.next(), Some((0b10, 5)));
        assert_eq!(moves.next(), Some((0b01, 4)));

        // the tie-break must survive a higher-scored entry being yielded
        // from in between the tied pair
        let mut moves = MoveSorter::new();
        moves.push(0b001, 2, 5);
        moves.push(0b010, 3, 1);
        moves.push(0b100, 4, 1);

        assert_eq!(moves.next(), Some((0b001, 2)));
        assert_eq!(moves.next(), Some((0b100, 4)));
        assert_eq!(moves.next(), Some((0b010, 3)));
        assert_eq!(moves.next(), None);
    }

    #[test]
    pub fn transposition_table_roundtrip() {
        let mut table = TranspositionTable::new();
        assert_eq!(table.get(42), 0);

        table.set(42, 7);
        assert_eq!(table.get(42), 7);
        assert_eq!(table.get(43), 0);

        // always-replace
        table.set(42, 9);
        assert_eq!(table.get(42), 9);
    }

    #[test]
    pub fn shared_transposition_table_is_shared() {
        let mut writer = SharedTranspositionTable::new();
        let reader = writer.clone();

        writer.set(42, 7);
        assert_eq!(reader.get(42), 7);
        assert_eq!(reader.get(43), 0);
    }

    #[test]
    pub fn book_storage_lookup() {
        let storage = BookStorage::from_entries(&[(5, -3), (9, 7), (100, 0)]);

        assert_eq!(storage.get(5), Some(-3));
        assert_eq!(storage.get(9), Some(7));
        assert_eq!(storage.get(100), Some(0));
        assert_eq!(storage.get(7), None);
    }

    #[test]
    pub fn solves_immediate_wins() -> Result<()> {
        // player 1 completes the bottom row at column 4
        let mut solver = Solver::new(Position::from_moves("112233")?);
        assert_eq!(solver.solve(), (18, 3));

        // vertical four in column 1
        let mut solver = Solver::new(Position::from_moves("121212")?);
        assert_eq!(solver.solve(), (18, 0));

        // the mirror image of the first position
        let mut solver = Solver::new(Position::from_moves("776655")?);
        assert_eq!(solver.solve(), (18, 3));
        Ok(())
    }

    #[test]
    pub fn solves_unstoppable_double_threat() -> Result<()> {
        // player 2 faces winning cells on both ends of an open three
        let mut solver = Solver::new(Position::from_moves("3344557")?);
        let (score, _) = solver.solve();
        assert_eq!(score, -17);
        assert!(solver.node_count > 0);
        Ok(())
    }

    #[test]
    pub fn weak_solve_reports_signs() -> Result<()> {
        let mut solver = Solver::new(Position::from_moves("112233")?);
        let (score, _) = solver.solve_weak();
        assert_eq!(score, 1);

        let mut solver = Solver::new(Position::from_moves("3344557")?);
        let (score, _) = solver.solve_weak();
        assert_eq!(score, -1);
        Ok(())
    }

    #[test]
    pub fn analyze_scores_every_column() -> Result<()> {
        // every reply loses to the double threat at the same depth
        let mut solver = Solver::new(Position::from_moves("3344557")?);
        assert_eq!(solver.analyze(), [Some(-17); 7]);
        Ok(())
    }

    #[test]
    pub fn analyze_agrees_with_solve() -> Result<()> {
        let mut solver = Solver::new(Position::from_moves("3344557")?);
        let (score, best) = solver.solve();

        let scores = solver.analyze();
        assert_eq!(scores[best], Some(score));
        assert_eq!(scores.iter().flatten().max(), Some(&score));
        Ok(())
    }

    #[test]
    pub fn solves_packed_draw() -> Result<()> {
        // 40 stones with no alignment anywhere on the board, built from the
        // colouring (x + y / 2) mod 2, whose longest run in any direction is
        // two. The last two cells sit in column 1 and completing them gives
        // neither player a four, so the position is a dead draw.
        let moves = "1212343456567173214365274765323254547676";
        let mut solver = Solver::new(Position::from_moves(moves)?);

        assert_eq!(solver.solve(), (0, 0));
        assert_eq!(solver.score_to_win_distance(0), 2);
        Ok(())
    }

    #[test]
    pub fn analyze_of_full_board_is_empty() -> Result<()> {
        // the packed draw above, played out to the last cell
        let moves = "121234345656717321436527476532325454767611";
        let mut solver = Solver::new(Position::from_moves(moves)?);

        assert_eq!(solver.analyze(), [None; 7]);
        assert_eq!(solver.solve().0, 0);
        Ok(())
    }

    #[test]
    pub fn win_distance_from_score() -> Result<()> {
        let solver = Solver::new(Position::from_moves("112233")?);
        // the win lands with the very next stone
        assert_eq!(solver.score_to_win_distance(18), 1);
        // a drawn forecast counts the remaining cells
        assert_eq!(solver.score_to_win_distance(0), 36);
        Ok(())
    }
}
