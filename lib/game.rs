use crate::chess::{Board, Color, File, Move, Piece, Rank, Role, Square};
use tracing::debug;

mod cache;
mod movement;
mod rules;
mod turn;

pub use cache::*;
pub use movement::*;
pub use rules::*;
pub use turn::*;

/// The check and checkmate flags of both colors.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CheckState {
    pub white_in_check: bool,
    pub white_in_checkmate: bool,
    pub black_in_check: bool,
    pub black_in_checkmate: bool,
}

impl CheckState {
    /// Whether this color is in check.
    #[inline(always)]
    pub fn in_check(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_in_check,
            Color::Black => self.black_in_check,
        }
    }

    /// Whether this color is checkmated.
    #[inline(always)]
    pub fn in_checkmate(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_in_checkmate,
            Color::Black => self.black_in_checkmate,
        }
    }
}

/// A game of synchronous chess.
///
/// Both colors submit their move for a turn without seeing the other's; the
/// turn executes once every required side is in. The game owns the board and
/// the pending [`Turn`] exclusively and is advanced by discrete calls to
/// [`register_move`][`Game::register_move`],
/// [`register_choice`][`Game::register_choice`] and
/// [`run_turn`][`Game::run_turn`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    board: Board,
    previous_board: Board,
    turn: Turn,
    previous_turn: Option<Turn>,
    white_rules: Rules,
    black_rules: Rules,
    checks: CheckState,
    cache: AttackCache,
}

impl Default for Game {
    fn default() -> Self {
        Game::new(Board::default())
    }
}

impl Game {
    /// Starts a game from the given board.
    pub fn new(board: Board) -> Self {
        let mut game = Game {
            board,
            previous_board: board,
            turn: Turn::default(),
            previous_turn: None,
            white_rules: Rules::new(Color::White),
            black_rules: Rules::new(Color::Black),
            checks: CheckState::default(),
            cache: AttackCache::new(),
        };

        game.verify_check();
        game
    }

    /// Replaces the board wholesale and resets to a fresh sync turn.
    pub fn load(&mut self, board: Board) {
        let enabled = self.cache.is_enabled();
        *self = Game::new(board);
        self.cache.set_enabled(enabled);
    }

    /// The current board.
    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board as it was before the last executed turn.
    #[inline(always)]
    pub fn previous_board(&self) -> &Board {
        &self.previous_board
    }

    /// The pending turn.
    #[inline(always)]
    pub fn turn(&self) -> &Turn {
        &self.turn
    }

    /// The last executed turn, if any.
    #[inline(always)]
    pub fn previous_turn(&self) -> Option<&Turn> {
        self.previous_turn.as_ref()
    }

    /// The check and checkmate flags of both colors.
    #[inline(always)]
    pub fn check_state(&self) -> CheckState {
        self.checks
    }

    /// The rules of a color.
    #[inline(always)]
    pub fn rules(&self, color: Color) -> &Rules {
        match color {
            Color::White => &self.white_rules,
            Color::Black => &self.black_rules,
        }
    }

    #[inline(always)]
    fn rules_mut(&mut self, color: Color) -> &mut Rules {
        match color {
            Color::White => &mut self.white_rules,
            Color::Black => &mut self.black_rules,
        }
    }

    /// Enables or disables the attack cache.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    /// The colors still owing a promotion choice.
    pub fn pending_promotions(&self) -> Vec<Color> {
        match &self.turn {
            Turn::Promotion(t) => Color::iter().filter(|&c| !t.is_filled(c)).collect(),
            _ => Vec::new(),
        }
    }

    /// The destinations the piece on `sq` may play to this turn.
    ///
    /// Honors the pending turn's restrictions; empty for an empty square,
    /// during a promotion turn, and for a checkmated color.
    pub fn possible_plays(&self, sq: Square) -> Vec<Square> {
        let Some(color) = self.board.color_on(sq) else {
            return Vec::new();
        };

        if self.checks.in_checkmate(color) {
            return Vec::new();
        }

        let plays = self
            .rules(color)
            .possible_plays(sq, &self.board, Legality::Legal)
            .unwrap_or_default();

        match &self.turn {
            Turn::Sync(_) => plays,
            Turn::Intermediate(t) => t.restrict(color, sq, plays),
            Turn::Promotion(_) => Vec::new(),
        }
    }

    /// Buffers a color's [`Ply`] into the pending turn.
    ///
    /// Returns `false` if the pending turn does not collect moves, the color
    /// is checkmated, or the move is not playable; the turn does not execute
    /// yet either way.
    pub fn register_move(&mut self, color: Color, ply: Ply) -> bool {
        if self.checks.in_checkmate(color) {
            return false;
        }

        if let Ply::Play(m) = ply {
            if !self.is_move_valid(color, m) {
                return false;
            }
        }

        match &mut self.turn {
            Turn::Sync(t) => t.set(color, ply),
            Turn::Intermediate(t) => t.set(color, ply),
            Turn::Promotion(_) => return false,
        }

        true
    }

    /// Buffers a color's promotion choice into the pending turn.
    ///
    /// Returns `false` if the pending turn is not a promotion turn, the
    /// color owes no choice, or the choice is not a promotable piece.
    pub fn register_choice(&mut self, color: Color, role: Role) -> bool {
        if matches!(role, Role::King | Role::Pawn) {
            return false;
        }

        match &mut self.turn {
            Turn::Promotion(t) => t.choose(color, role),
            _ => false,
        }
    }

    fn is_move_valid(&self, color: Color, m: Move) -> bool {
        self.board.color_on(m.whence()) == Some(color)
            && self.possible_plays(m.whence()).contains(&m.whither())
    }

    /// Executes the pending turn once every required side is in.
    ///
    /// Returns `false` without effect otherwise.
    pub fn run_turn(&mut self) -> bool {
        if !self.turn.can_be_executed() {
            return false;
        }

        let turn = std::mem::take(&mut self.turn);
        self.previous_board = self.board;

        match &turn {
            Turn::Sync(t) => self.apply_moves(
                t.ply(Color::White).and_then(|p| p.play()),
                t.ply(Color::Black).and_then(|p| p.play()),
            ),

            Turn::Intermediate(t) => self.apply_moves(
                t.ply(Color::White).and_then(|p| p.play()),
                t.ply(Color::Black).and_then(|p| p.play()),
            ),

            Turn::Promotion(t) => self.apply_promotions(t),
        }

        let next = self.next_turn(&turn);
        let next = self.interpose_promotion(&turn, next);
        debug!(kind = %next.kind(), "turn executed");

        self.previous_turn = Some(turn);
        self.turn = next;
        self.cache.invalidate();
        self.verify_check();

        true
    }

    /// Applies both colors' moves at once, from the pre-turn snapshot.
    ///
    /// Converging moves destroy both movers; a king standing on the
    /// converged square survives, and the square is emptied otherwise.
    fn apply_moves(&mut self, white: Option<Move>, black: Option<Move>) {
        let before = self.board;
        let mut after = before;

        match (white, black) {
            (Some(w), Some(b)) if w.whither() == b.whither() => {
                after = after.with(w.whence(), None).with(b.whence(), None);
                if before.role_on(w.whither()) != Some(Role::King) {
                    after = after.with(w.whither(), None);
                }
            }

            _ => {
                for m in [white, black].into_iter().flatten() {
                    after = after.with(m.whence(), None);
                }

                for m in [white, black].into_iter().flatten() {
                    after = after.with(m.whither(), before[m.whence()]);

                    if let Some((corner, lane)) = castle_rook_relocation(&before, m) {
                        after = after.with(corner, None).with(lane, before[corner]);
                    }
                }
            }
        }

        self.board = after;
        self.update_castling_rights(&before, white, black);
    }

    fn update_castling_rights(&mut self, before: &Board, white: Option<Move>, black: Option<Move>) {
        for m in [white, black].into_iter().flatten() {
            if let Some(p) = before.piece_on(m.whence()) {
                let home = Rank::home(p.color());
                match p.role() {
                    Role::King => {
                        self.rules_mut(p.color()).revoke_kingside();
                        self.rules_mut(p.color()).revoke_queenside();
                    }

                    Role::Rook if m.whence() == Square::new(File::H, home) => {
                        self.rules_mut(p.color()).revoke_kingside();
                    }

                    Role::Rook if m.whence() == Square::new(File::A, home) => {
                        self.rules_mut(p.color()).revoke_queenside();
                    }

                    _ => {}
                }
            }

            if let Some(v) = before.piece_on(m.whither()) {
                if v.role() == Role::Rook {
                    let home = Rank::home(v.color());
                    if m.whither() == Square::new(File::H, home) {
                        self.rules_mut(v.color()).revoke_kingside();
                    } else if m.whither() == Square::new(File::A, home) {
                        self.rules_mut(v.color()).revoke_queenside();
                    }
                }
            }
        }
    }

    fn apply_promotions(&mut self, turn: &PromotionTurn) {
        for (color, square, role) in turn.choices() {
            debug!(%color, %square, %role, "pawn promoted");
            self.board = self.board.with(square, Some(Piece::new(role, color)));
        }
    }

    fn executed_move(turn: &Turn, color: Color) -> Option<Move> {
        match turn {
            Turn::Sync(t) => t.ply(color).and_then(|p| p.play()),
            Turn::Intermediate(t) => t.ply(color).and_then(|p| p.play()),
            Turn::Promotion(_) => None,
        }
    }

    /// The turn that follows the one just executed.
    ///
    /// A promotion turn resumes the turn it holds. Otherwise, when exactly
    /// one color displaced a piece, the other color is granted a reaction
    /// onto the mover's destination; in every other case a fresh sync turn
    /// begins.
    fn next_turn(&self, completed: &Turn) -> Turn {
        if let Turn::Promotion(t) = completed {
            return t.next().clone();
        }

        let white = Game::executed_move(completed, Color::White);
        let black = Game::executed_move(completed, Color::Black);

        match (white, black) {
            (Some(w), None) => IntermediateTurn::new(
                None,
                Some(Reaction {
                    target: w.whither(),
                    trigger: w,
                }),
            )
            .into(),

            (None, Some(b)) => IntermediateTurn::new(
                Some(Reaction {
                    target: b.whither(),
                    trigger: b,
                }),
                None,
            )
            .into(),

            _ => SyncTurn::new().into(),
        }
    }

    /// Wraps the next turn in a promotion turn if a pawn just reached the
    /// farthest rank and survived the turn.
    fn interpose_promotion(&self, completed: &Turn, next: Turn) -> Turn {
        let white = self.promotion_square(completed, Color::White);
        let black = self.promotion_square(completed, Color::Black);

        if white.is_none() && black.is_none() {
            next
        } else {
            PromotionTurn::new(white, black, next).into()
        }
    }

    fn promotion_square(&self, completed: &Turn, color: Color) -> Option<Square> {
        let m = Game::executed_move(completed, color)?;
        let pawn = Piece::new(Role::Pawn, color);

        if m.whither().rank() == Rank::farthest(color)
            && self.previous_board[m.whence()] == Some(pawn)
            && self.board[m.whither()] == Some(pawn)
        {
            Some(m.whither())
        } else {
            None
        }
    }

    /// Recomputes the check and checkmate flags of both colors.
    ///
    /// Runs only at a sync turn boundary; mid-reaction and mid-promotion
    /// boards are transient.
    fn verify_check(&mut self) {
        if !matches!(self.turn, Turn::Sync(_)) {
            return;
        }

        let board = self.board;
        for color in Color::iter() {
            let attacker = self.rules(!color);
            let rights = (
                attacker.is_kingside_castle_available(),
                attacker.is_queenside_castle_available(),
            );

            let king = board.king(color).expect("king on the board");
            let in_check = self.cache.attacks(&board, !color, rights).contains(&king);

            let in_checkmate = in_check
                && board
                    .iter()
                    .filter(|(p, _)| p.color() == color)
                    .all(|(_, sq)| {
                        self.rules(color)
                            .possible_plays(sq, &board, Legality::Legal)
                            .map_or(true, |plays| plays.is_empty())
                    });

            if in_check {
                debug!(%color, checkmate = in_checkmate, "king is in check");
            }

            match color {
                Color::White => {
                    self.checks.white_in_check = in_check;
                    self.checks.white_in_checkmate = in_checkmate;
                }

                Color::Black => {
                    self.checks.black_in_check = in_check;
                    self.checks.black_in_checkmate = in_checkmate;
                }
            }
        }
    }
}

/// The rook relocation implied by a castling move, if `m` is one.
///
/// Castling is a king move of exactly two files along its rank; the rook
/// comes from the corner the king moved towards and lands on the square the
/// king passed over.
fn castle_rook_relocation(before: &Board, m: Move) -> Option<(Square, Square)> {
    let piece = before.piece_on(m.whence())?;
    if piece.role() != Role::King
        || m.whence().rank() != m.whither().rank()
        || (m.whither().file() - m.whence().file()).abs() != 2
    {
        return None;
    }

    let towards = if m.whither().file() > m.whence().file() {
        File::H
    } else {
        File::A
    };

    let corner = Square::new(towards, m.whence().rank());
    if before.piece_on(corner) != Some(Piece::new(Role::Rook, piece.color())) {
        return None;
    }

    let lane = m.whence().offset(m.whence().vector_to(m.whither()).direction())?;
    Some((corner, lane))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    fn game(fen: &str) -> Game {
        Game::new(fen.parse().unwrap())
    }

    #[proptest(cases = 1)]
    fn converging_moves_destroy_both_movers() {
        let mut g = game("k7/8/2n5/8/8/2N5/8/K7");

        assert!(g.register_move(Color::White, Ply::Play("c3d5".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Play("c6d5".parse()?)));
        assert!(g.run_turn());

        assert_eq!(g.board()[Square::D5], None);
        assert_eq!(g.board()[Square::C3], None);
        assert_eq!(g.board()[Square::C6], None);
    }

    #[proptest(cases = 1)]
    fn a_king_survives_converging_moves() {
        // the stationary king is converged upon; both movers die
        let mut g = game("8/3r4/8/3k4/8/8/8/3R3K");

        g.apply_moves(Some("d1d5".parse()?), Some("d7d5".parse()?));

        assert_eq!(
            g.board()[Square::D5],
            Some(Piece::new(Role::King, Color::Black))
        );
        assert_eq!(g.board()[Square::D1], None);
        assert_eq!(g.board()[Square::D7], None);
    }

    #[proptest(cases = 1)]
    fn exchanging_moves_swap_the_pieces() {
        let mut g = game("r3k3/8/8/8/8/8/8/R3K3");

        g.apply_moves(Some("a1a8".parse()?), Some("a8a1".parse()?));

        assert_eq!(
            g.board()[Square::A8],
            Some(Piece::new(Role::Rook, Color::White))
        );
        assert_eq!(
            g.board()[Square::A1],
            Some(Piece::new(Role::Rook, Color::Black))
        );
    }

    #[proptest(cases = 1)]
    fn a_pass_leaves_the_passing_side_untouched() {
        let mut g = Game::default();

        assert!(g.register_move(Color::White, Ply::Play("e2e4".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Pass));
        assert!(g.run_turn());

        let before = *g.previous_board();
        for (p, sq) in before.iter() {
            if p.color() == Color::Black {
                assert_eq!(g.board()[sq], Some(p));
            }
        }
    }

    #[proptest(cases = 1)]
    fn castling_relocates_king_and_rook_and_revokes_the_right() {
        let mut g = game("rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");

        assert!(g.register_move(Color::Black, Ply::Play("e8g8".parse()?)));
        assert!(g.register_move(Color::White, Ply::Pass));
        assert!(g.run_turn());

        assert_eq!(
            g.board()[Square::G8],
            Some(Piece::new(Role::King, Color::Black))
        );
        assert_eq!(
            g.board()[Square::F8],
            Some(Piece::new(Role::Rook, Color::Black))
        );
        assert_eq!(g.board()[Square::E8], None);
        assert_eq!(g.board()[Square::H8], None);
        assert!(!g.rules(Color::Black).is_kingside_castle_available());
        assert!(!g.rules(Color::Black).is_queenside_castle_available());
    }

    #[proptest(cases = 1)]
    fn moving_a_rook_revokes_only_that_side() {
        let mut g = game("r3k2r/8/8/8/8/8/8/R3K2R");

        g.apply_moves(Some("h1h4".parse()?), None);

        assert!(!g.rules(Color::White).is_kingside_castle_available());
        assert!(g.rules(Color::White).is_queenside_castle_available());
        assert!(g.rules(Color::Black).is_kingside_castle_available());
    }

    #[proptest(cases = 1)]
    fn capturing_a_home_rook_revokes_the_owner_right() {
        let mut g = game("r3k2r/8/8/8/8/8/8/R3K2R");

        g.apply_moves(Some("a1a8".parse()?), None);

        assert!(!g.rules(Color::Black).is_queenside_castle_available());
        assert!(g.rules(Color::Black).is_kingside_castle_available());
    }

    #[proptest(cases = 1)]
    fn both_sides_moving_begins_a_fresh_sync_turn() {
        let mut g = Game::default();

        assert!(g.register_move(Color::White, Ply::Play("b1c3".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Play("b8c6".parse()?)));
        assert!(g.run_turn());

        assert_eq!(g.turn().kind(), TurnKind::Sync);
        assert_eq!(
            g.board()[Square::C3],
            Some(Piece::new(Role::Knight, Color::White))
        );
        assert_eq!(
            g.board()[Square::C6],
            Some(Piece::new(Role::Knight, Color::Black))
        );
    }

    #[proptest(cases = 1)]
    fn a_lone_mover_grants_the_opponent_a_reaction() {
        let mut g = Game::default();

        assert!(g.register_move(Color::White, Ply::Play("e2e4".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Pass));
        assert!(g.run_turn());

        let Turn::Intermediate(t) = g.turn() else {
            panic!("expected an intermediate turn");
        };

        assert_eq!(t.reaction(Color::White), None);
        assert_eq!(
            t.reaction(Color::Black),
            Some(Reaction {
                target: Square::E4,
                trigger: "e2e4".parse()?,
            })
        );
    }

    #[proptest(cases = 1)]
    fn reacting_plays_land_only_on_the_target() {
        let mut g = game("k7/8/8/3p4/8/8/4P3/K7");

        assert!(g.register_move(Color::White, Ply::Play("e2e4".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Pass));
        assert!(g.run_turn());

        assert_eq!(g.possible_plays(Square::D5), vec![Square::E4]);
        assert!(g.register_move(Color::Black, Ply::Play("d5e4".parse()?)));
        assert!(g.run_turn());

        assert_eq!(
            g.board()[Square::E4],
            Some(Piece::new(Role::Pawn, Color::Black))
        );
    }

    #[proptest(cases = 1)]
    fn a_checked_color_may_only_resolve_the_check() {
        let g = game("4k3/3q4/8/8/8/8/8/4RK2");

        assert!(g.check_state().in_check(Color::Black));
        assert!(!g.check_state().in_checkmate(Color::Black));
        assert_eq!(g.possible_plays(Square::D7), vec![Square::E7]);
    }

    #[proptest(cases = 1)]
    fn a_checkmated_color_has_no_plays_anywhere() {
        let mut g = game("R6k/6pp/8/8/8/8/8/K7");

        let state = g.check_state();
        assert!(state.in_check(Color::Black));
        assert!(state.in_checkmate(Color::Black));

        for sq in Square::iter() {
            if g.board().color_on(sq) == Some(Color::Black) {
                assert_eq!(g.possible_plays(sq), vec![]);
            }
        }

        assert!(!g.register_move(Color::Black, Ply::Pass));
    }

    #[proptest(cases = 1)]
    fn a_promoting_pawn_interposes_a_promotion_turn() {
        let mut g = game("1k6/P7/8/8/8/8/8/1K6");

        assert!(g.register_move(Color::White, Ply::Play("a7a8".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Pass));
        assert!(g.run_turn());

        assert_eq!(g.turn().kind(), TurnKind::Promotion);
        assert_eq!(g.pending_promotions(), vec![Color::White]);

        // no moves are accepted until the choice is in
        assert!(!g.register_move(Color::Black, Ply::Pass));
        assert!(!g.register_choice(Color::White, Role::King));
        assert!(g.register_choice(Color::White, Role::Queen));
        assert!(g.run_turn());

        assert_eq!(
            g.board()[Square::A8],
            Some(Piece::new(Role::Queen, Color::White))
        );

        // play resumes with the reaction the pawn's advance earned
        let Turn::Intermediate(t) = g.turn() else {
            panic!("expected an intermediate turn");
        };

        assert_eq!(t.reaction(Color::Black).map(|r| r.target), Some(Square::A8));
    }

    #[proptest(cases = 1)]
    fn loading_a_board_resets_the_game() {
        let mut g = Game::default();
        assert!(g.register_move(Color::White, Ply::Play("e2e4".parse()?)));
        assert!(g.register_move(Color::Black, Ply::Pass));
        assert!(g.run_turn());

        let board = Board::default();
        g.load(board);

        assert_eq!(g.board(), &board);
        assert_eq!(g.turn().kind(), TurnKind::Sync);
        assert_eq!(g.check_state(), CheckState::default());
        assert!(g.rules(Color::White).is_kingside_castle_available());
    }

    #[proptest(cases = 1)]
    fn registering_an_illegal_move_is_refused() {
        let mut g = Game::default();

        assert!(!g.register_move(Color::White, Ply::Play("e2e5".parse()?)));
        assert!(!g.register_move(Color::White, Ply::Play("e7e5".parse()?)));
        assert!(!g.register_move(Color::White, Ply::Play("e4e5".parse()?)));
        assert!(!g.run_turn());
    }
}
