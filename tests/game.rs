use lib::chess::{Board, Color, Piece, Role, Square};
use lib::game::{Game, Ply, Turn, TurnKind};
use test_strategy::proptest;

#[proptest(cases = 1)]
fn both_knights_advance_without_captures() {
    let mut game = Game::default();

    assert!(game.register_move(Color::White, Ply::Play("b1c3".parse()?)));
    assert!(game.register_move(Color::Black, Ply::Play("b8c6".parse()?)));
    assert!(game.run_turn());

    assert_eq!(
        game.board()[Square::C3],
        Some(Piece::new(Role::Knight, Color::White))
    );
    assert_eq!(
        game.board()[Square::C6],
        Some(Piece::new(Role::Knight, Color::Black))
    );
    assert_eq!(game.board()[Square::B1], None);
    assert_eq!(game.board()[Square::B8], None);

    // both sides moved, so no reaction window opens
    assert_eq!(game.turn().kind(), TurnKind::Sync);
    assert_eq!(game.board().iter().count(), 32);
}

#[proptest(cases = 1)]
fn kingside_castling_relocates_both_king_and_rook() {
    let board: Board = "rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".parse()?;
    let mut game = Game::new(board);

    assert!(game.register_move(Color::Black, Ply::Play("e8g8".parse()?)));
    assert!(game.register_move(Color::White, Ply::Pass));
    assert!(game.run_turn());

    assert_eq!(
        game.board()[Square::G8],
        Some(Piece::new(Role::King, Color::Black))
    );
    assert_eq!(
        game.board()[Square::F8],
        Some(Piece::new(Role::Rook, Color::Black))
    );
    assert_eq!(game.board()[Square::E8], None);
    assert_eq!(game.board()[Square::H8], None);
    assert!(!game.rules(Color::Black).is_kingside_castle_available());
}

#[proptest(cases = 1)]
fn converging_captures_empty_the_square() {
    let board: Board = "k7/8/2n5/8/8/2N5/8/K7".parse()?;
    let mut game = Game::new(board);

    assert!(game.register_move(Color::White, Ply::Play("c3d5".parse()?)));
    assert!(game.register_move(Color::Black, Ply::Play("c6d5".parse()?)));
    assert!(game.run_turn());

    assert_eq!(game.board()[Square::D5], None);
    assert_eq!(game.board()[Square::C3], None);
    assert_eq!(game.board()[Square::C6], None);
    assert_eq!(game.turn().kind(), TurnKind::Sync);
}

#[proptest(cases = 1)]
fn exchanging_rooks_swap_squares_in_one_turn() {
    let board: Board = "r3k3/8/8/8/8/8/8/R3K3".parse()?;
    let mut game = Game::new(board);

    assert!(game.register_move(Color::White, Ply::Play("a1a8".parse()?)));
    assert!(game.register_move(Color::Black, Ply::Play("a8a1".parse()?)));
    assert!(game.run_turn());

    assert_eq!(
        game.board()[Square::A8],
        Some(Piece::new(Role::Rook, Color::White))
    );
    assert_eq!(
        game.board()[Square::A1],
        Some(Piece::new(Role::Rook, Color::Black))
    );
}

#[proptest(cases = 1)]
fn a_double_pass_changes_nothing_and_stays_sync() {
    let mut game = Game::default();
    let before = *game.board();

    assert!(game.register_move(Color::White, Ply::Pass));
    assert!(game.register_move(Color::Black, Ply::Pass));
    assert!(game.run_turn());

    assert_eq!(game.board(), &before);
    assert_eq!(game.turn().kind(), TurnKind::Sync);
}

#[proptest(cases = 1)]
fn a_lone_move_opens_a_one_shot_reaction_window() {
    let board: Board = "k7/8/8/3p4/8/8/4P3/K7".parse()?;
    let mut game = Game::new(board);

    assert!(game.register_move(Color::White, Ply::Play("e2e4".parse()?)));
    assert!(game.register_move(Color::Black, Ply::Pass));
    assert!(game.run_turn());

    let Turn::Intermediate(turn) = game.turn() else {
        panic!("expected a reaction window");
    };

    assert_eq!(turn.reaction(Color::White), None);
    assert_eq!(
        turn.reaction(Color::Black).map(|r| r.target),
        Some(Square::E4)
    );

    // the black pawn may only play onto the target square
    assert_eq!(game.possible_plays(Square::D5), vec![Square::E4]);
    // the white pawn that just moved has no plays at all this turn
    assert_eq!(game.possible_plays(Square::E4), vec![]);

    // declining the window returns to an ordinary turn
    assert!(game.register_move(Color::Black, Ply::Pass));
    assert!(game.run_turn());
    assert_eq!(game.turn().kind(), TurnKind::Sync);
}

#[proptest(cases = 1)]
fn promotion_interposes_before_the_reaction_window() {
    let board: Board = "1k6/P7/8/8/8/8/8/1K6".parse()?;
    let mut game = Game::new(board);

    assert!(game.register_move(Color::White, Ply::Play("a7a8".parse()?)));
    assert!(game.register_move(Color::Black, Ply::Pass));
    assert!(game.run_turn());

    assert_eq!(game.turn().kind(), TurnKind::Promotion);
    assert_eq!(game.pending_promotions(), vec![Color::White]);
    assert_eq!(game.possible_plays(Square::B8), vec![]);

    assert!(game.register_choice(Color::White, Role::Queen));
    assert!(game.run_turn());

    assert_eq!(
        game.board()[Square::A8],
        Some(Piece::new(Role::Queen, Color::White))
    );

    // the opponent's window onto the promotion square resumes
    let Turn::Intermediate(turn) = game.turn() else {
        panic!("expected a reaction window");
    };

    assert_eq!(
        turn.reaction(Color::Black).map(|r| r.target),
        Some(Square::A8)
    );

    // and the freshly promoted queen may be captured there
    assert!(game.register_move(Color::Black, Ply::Play("b8a8".parse()?)));
    assert!(game.run_turn());
    assert_eq!(
        game.board()[Square::A8],
        Some(Piece::new(Role::King, Color::Black))
    );
}

#[proptest(cases = 1)]
fn check_restricts_plays_to_those_resolving_it() {
    let board: Board = "4k3/3q4/8/8/8/8/8/4RK2".parse()?;
    let game = Game::new(board);

    assert!(game.check_state().in_check(Color::Black));
    assert!(!game.check_state().in_checkmate(Color::Black));

    // the queen may only interpose
    assert_eq!(game.possible_plays(Square::D7), vec![Square::E7]);
}

#[proptest(cases = 1)]
fn checkmate_locks_the_mated_color_out() {
    let board: Board = "R6k/6pp/8/8/8/8/8/K7".parse()?;
    let mut game = Game::new(board);

    assert!(game.check_state().in_check(Color::Black));
    assert!(game.check_state().in_checkmate(Color::Black));

    for sq in Square::iter() {
        if game.board().color_on(sq) == Some(Color::Black) {
            assert_eq!(game.possible_plays(sq), vec![]);
        }
    }

    assert!(!game.register_move(Color::Black, Ply::Pass));
    assert!(game.register_move(Color::White, Ply::Pass));
}

#[proptest(cases = 1)]
fn castling_rights_never_come_back() {
    let board: Board = "rnbqk2r/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".parse()?;
    let mut game = Game::new(board);

    assert!(game.register_move(Color::Black, Ply::Play("e8f8".parse()?)));
    assert!(game.register_move(Color::White, Ply::Pass));
    assert!(game.run_turn());

    assert!(!game.rules(Color::Black).is_kingside_castle_available());
    assert!(!game.rules(Color::Black).is_queenside_castle_available());

    // white declines the reaction window the king's step opened
    assert!(game.register_move(Color::White, Ply::Pass));
    assert!(game.run_turn());

    // moving the king back does not restore the rights
    assert!(game.register_move(Color::Black, Ply::Play("f8e8".parse()?)));
    assert!(game.register_move(Color::White, Ply::Pass));
    assert!(game.run_turn());

    assert!(!game.rules(Color::Black).is_kingside_castle_available());
    assert!(!game.rules(Color::Black).is_queenside_castle_available());
}

#[proptest(cases = 1)]
fn exported_boards_load_back_identically() {
    let mut game = Game::default();

    assert!(game.register_move(Color::White, Ply::Play("d2d4".parse()?)));
    assert!(game.register_move(Color::Black, Ply::Play("d7d5".parse()?)));
    assert!(game.run_turn());

    let exported = game.board().to_string();
    let reloaded: Board = exported.parse()?;
    assert_eq!(&reloaded, game.board());

    let mut resumed = Game::new(reloaded);
    resumed.load(reloaded);
    assert_eq!(resumed.board(), game.board());
    assert_eq!(resumed.turn().kind(), TurnKind::Sync);
}
