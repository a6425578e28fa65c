use crate::chess::{Board, Color, File, Rank, Role, Square, Vector};

use super::movement::{Condition, InvalidPositionError, Legality, Movement};

const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

fn linear(df: i8, dr: i8, conditions: Vec<Condition>) -> Movement {
    Movement::linear(Vector::new(df, dr), conditions).expect("single step vector")
}

fn hop(df: i8, dr: i8, conditions: Vec<Condition>) -> Movement {
    Movement::hop(Vector::new(df, dr), conditions).expect("non-zero vector")
}

/// The movements with which a piece of this color attacks.
///
/// Castling is excluded; a castling king threatens nothing along the way.
pub fn attack_movements(color: Color, role: Role) -> Vec<Movement> {
    match role {
        Role::Pawn => {
            let (dir, start) = match color {
                Color::White => (1, Rank::Second),
                Color::Black => (-1, Rank::Seventh),
            };

            vec![
                hop(0, dir, vec![Condition::DestinationEmpty, Condition::KingSafe]),
                hop(
                    0,
                    2 * dir,
                    vec![
                        Condition::FromRank(start),
                        Condition::PathClear,
                        Condition::DestinationEmpty,
                        Condition::KingSafe,
                    ],
                ),
                hop(1, dir, vec![Condition::DestinationEnemy, Condition::KingSafe]),
                hop(-1, dir, vec![Condition::DestinationEnemy, Condition::KingSafe]),
            ]
        }

        Role::Knight => KNIGHT_JUMPS
            .into_iter()
            .map(|(df, dr)| hop(df, dr, vec![Condition::KingSafe]))
            .collect(),

        Role::Bishop => DIAGONALS
            .into_iter()
            .map(|(df, dr)| linear(df, dr, vec![Condition::KingSafe]))
            .collect(),

        Role::Rook => ORTHOGONALS
            .into_iter()
            .map(|(df, dr)| linear(df, dr, vec![Condition::KingSafe]))
            .collect(),

        Role::Queen => ORTHOGONALS
            .into_iter()
            .chain(DIAGONALS)
            .map(|(df, dr)| linear(df, dr, vec![Condition::KingSafe]))
            .collect(),

        Role::King => ORTHOGONALS
            .into_iter()
            .chain(DIAGONALS)
            .map(|(df, dr)| {
                hop(
                    df,
                    dr,
                    vec![
                        Condition::AwayFrom {
                            role: Role::King,
                            min: 2,
                        },
                        Condition::KingSafe,
                    ],
                )
            })
            .collect(),
    }
}

/// The squares attacked by this color's pieces.
///
/// Plays are pseudo-legal; whether the attacker's own king would be exposed
/// is irrelevant to the squares it threatens.
pub fn attacks(board: &Board, color: Color) -> Vec<Square> {
    let mut squares = Vec::new();
    for (piece, sq) in board.iter().filter(|(p, _)| p.color() == color) {
        for movement in attack_movements(color, piece.role()) {
            if let Ok(plays) = movement.possible_plays(sq, board, Legality::PseudoLegal) {
                squares.extend(plays);
            }
        }
    }

    squares.sort_unstable();
    squares.dedup();
    squares
}

/// Whether this color's king is not currently attacked.
pub fn is_king_safe(board: &Board, color: Color) -> bool {
    match board.king(color) {
        None => true,
        Some(king) => !attacks(board, !color).contains(&king),
    }
}

/// Movement catalogs and castling rights for one side.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Rules {
    color: Color,
    kingside_castle: bool,
    queenside_castle: bool,
}

impl Rules {
    /// Constructs the rules of a color with full castling rights.
    pub fn new(color: Color) -> Self {
        Rules {
            color,
            kingside_castle: true,
            queenside_castle: true,
        }
    }

    /// The [`Color`] this rule set belongs to.
    #[inline(always)]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Whether the kingside castle is still available.
    #[inline(always)]
    pub fn is_kingside_castle_available(&self) -> bool {
        self.kingside_castle
    }

    /// Whether the queenside castle is still available.
    #[inline(always)]
    pub fn is_queenside_castle_available(&self) -> bool {
        self.queenside_castle
    }

    /// Gives up the kingside castle for the rest of the game.
    #[inline(always)]
    pub fn revoke_kingside(&mut self) {
        self.kingside_castle = false;
    }

    /// Gives up the queenside castle for the rest of the game.
    #[inline(always)]
    pub fn revoke_queenside(&mut self) {
        self.queenside_castle = false;
    }

    /// The movements of a piece of the given role, castling included while
    /// the corresponding right lasts.
    pub fn movements(&self, role: Role) -> Vec<Movement> {
        let mut movements = attack_movements(self.color, role);

        if role == Role::King {
            if self.kingside_castle {
                movements.push(hop(
                    2,
                    0,
                    vec![
                        Condition::DestinationEmpty,
                        Condition::CastleLane {
                            rook_file: File::H,
                        },
                        Condition::KingSafe,
                    ],
                ));
            }

            if self.queenside_castle {
                movements.push(hop(
                    -2,
                    0,
                    vec![
                        Condition::DestinationEmpty,
                        Condition::CastleLane {
                            rook_file: File::A,
                        },
                        Condition::KingSafe,
                    ],
                ));
            }
        }

        movements
    }

    /// Every destination the piece on `sq` can play to.
    pub fn possible_plays(
        &self,
        sq: Square,
        board: &Board,
        legality: Legality,
    ) -> Result<Vec<Square>, InvalidPositionError> {
        let role = match board.piece_on(sq) {
            Some(p) if p.color() == self.color => p.role(),
            _ => return Err(InvalidPositionError(sq)),
        };

        let mut plays = Vec::new();
        for movement in self.movements(role) {
            plays.extend(movement.possible_plays(sq, board, legality)?);
        }

        Ok(plays)
    }
}
