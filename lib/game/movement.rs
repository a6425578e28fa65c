use crate::chess::{Board, File, Piece, Rank, Role, Square, Vector};
use derive_more::{Display, Error};

use super::rules::is_king_safe;

/// How a [`Movement`]'s vector covers the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Reach {
    /// The vector repeats until blocked or capturing.
    Linear,
    /// A single fixed-offset jump.
    Hop,
}

/// Whether plays must keep the mover's king safe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Legality {
    Legal,
    /// Skips [`Condition::KingSafe`]; used to probe threats without recursing.
    PseudoLegal,
}

/// A predicate a candidate play must satisfy to be playable.
///
/// Conditions are plain data over `(from, to, board)`; they carry no state
/// besides their construction parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Condition {
    /// The mover's own king is not attacked once the play is made.
    KingSafe,
    /// The destination square is empty.
    DestinationEmpty,
    /// The destination square holds a piece of the opposite color.
    DestinationEnemy,
    /// Every square strictly between origin and destination is empty.
    PathClear,
    /// The origin sits on the given rank.
    FromRank(Rank),
    /// The destination keeps a minimum Chebyshev distance from every enemy
    /// piece of the given role.
    AwayFrom { role: Role, min: i8 },
    /// An own rook still sits on the given file of the origin rank, with the
    /// lane between them empty.
    CastleLane { rook_file: File },
}

impl Condition {
    /// Whether the play `from` → `to` satisfies this condition on `board`.
    pub fn holds(&self, from: Square, to: Square, board: &Board, legality: Legality) -> bool {
        let Some(piece) = board.piece_on(from) else {
            return false;
        };

        let color = piece.color();

        match *self {
            Condition::KingSafe => {
                legality == Legality::PseudoLegal || is_king_safe(&board.relocate(from, to), color)
            }

            Condition::DestinationEmpty => board.piece_on(to).is_none(),
            Condition::DestinationEnemy => board.color_on(to) == Some(!color),
            Condition::PathClear => lane_is_empty(board, from, to),
            Condition::FromRank(rank) => from.rank() == rank,

            Condition::AwayFrom { role, min } => board
                .iter()
                .filter(|(p, _)| p.color() != color && p.role() == role)
                .all(|(_, sq)| to.distance(sq) >= min),

            Condition::CastleLane { rook_file } => {
                let corner = Square::new(rook_file, from.rank());
                board.piece_on(corner) == Some(Piece::new(Role::Rook, color))
                    && lane_is_empty(board, from, corner)
            }
        }
    }
}

/// Whether every square strictly between `from` and `to` is empty.
fn lane_is_empty(board: &Board, from: Square, to: Square) -> bool {
    let step = from.vector_to(to).direction();
    let mut next = from.offset(step);
    while let Some(sq) = next {
        if sq == to {
            return true;
        } else if board.piece_on(sq).is_some() {
            return false;
        }

        next = sq.offset(step);
    }

    false
}

/// The reason why constructing a [`Movement`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("invalid movement vector")]
pub struct InvalidVectorError;

/// The reason why generating plays failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("no piece to move on square `{_0}`")]
pub struct InvalidPositionError(#[error(not(source))] pub Square);

/// A movement a piece can make: a vector, a [`Reach`], and the ordered
/// [`Condition`]s its plays must pass.
///
/// Movements are immutable values; the catalogs owned by
/// [`Rules`][`super::Rules`] define one list per piece per color.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Movement {
    vector: Vector,
    reach: Reach,
    conditions: Vec<Condition>,
}

impl Movement {
    /// Constructs a movement that repeats `vector` until blocked.
    ///
    /// The vector must be a single step, i.e. of Chebyshev norm one.
    pub fn linear(vector: Vector, conditions: Vec<Condition>) -> Result<Self, InvalidVectorError> {
        if vector.norm() != 1 {
            return Err(InvalidVectorError);
        }

        Ok(Movement {
            vector,
            reach: Reach::Linear,
            conditions,
        })
    }

    /// Constructs a movement that jumps by `vector` exactly once.
    ///
    /// The vector must not be zero.
    pub fn hop(vector: Vector, conditions: Vec<Condition>) -> Result<Self, InvalidVectorError> {
        if vector.is_zero() {
            return Err(InvalidVectorError);
        }

        Ok(Movement {
            vector,
            reach: Reach::Hop,
            conditions,
        })
    }

    /// This movement's displacement per step.
    #[inline(always)]
    pub fn vector(&self) -> Vector {
        self.vector
    }

    /// This movement's [`Reach`].
    #[inline(always)]
    pub fn reach(&self) -> Reach {
        self.reach
    }

    /// The [`Condition`]s a play must pass.
    #[inline(always)]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Candidate destinations by geometry alone.
    ///
    /// A square occupied by a piece of the mover's own color is never a
    /// candidate; a linear movement stops at the first occupant either way.
    pub fn candidates(
        &self,
        from: Square,
        board: &Board,
    ) -> Result<Vec<Square>, InvalidPositionError> {
        let piece = board.piece_on(from).ok_or(InvalidPositionError(from))?;

        let mut plays = Vec::new();
        match self.reach {
            Reach::Hop => {
                if let Some(to) = from.offset(self.vector) {
                    if board.color_on(to) != Some(piece.color()) {
                        plays.push(to);
                    }
                }
            }

            Reach::Linear => {
                let mut next = from.offset(self.vector);
                while let Some(to) = next {
                    match board.piece_on(to) {
                        None => {
                            plays.push(to);
                            next = to.offset(self.vector);
                        }

                        Some(p) => {
                            if p.color() != piece.color() {
                                plays.push(to);
                            }

                            break;
                        }
                    }
                }
            }
        }

        Ok(plays)
    }

    /// Destinations that satisfy every condition.
    pub fn possible_plays(
        &self,
        from: Square,
        board: &Board,
        legality: Legality,
    ) -> Result<Vec<Square>, InvalidPositionError> {
        let mut plays = self.candidates(from, board)?;
        plays.retain(|&to| self.conditions.iter().all(|c| c.holds(from, to, board, legality)));
        Ok(plays)
    }
}
