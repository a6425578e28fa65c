use crate::chess::{Color, Move, Role, Square};
use derive_more::{Display, From};

/// What a player submits into a move turn.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Ply {
    #[display("{_0}")]
    Play(Move),
    #[display("pass")]
    Pass,
}

impl Ply {
    /// The underlying move, unless this is a pass.
    #[inline(always)]
    pub fn play(&self) -> Option<Move> {
        match *self {
            Ply::Play(m) => Some(m),
            Ply::Pass => None,
        }
    }
}

/// The ordinary turn, which both colors fill with a simultaneous [`Ply`].
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct SyncTurn {
    white: Option<Ply>,
    black: Option<Ply>,
}

impl SyncTurn {
    pub fn new() -> Self {
        Self::default()
    }

    /// The [`Ply`] this color has registered, if any.
    #[inline(always)]
    pub fn ply(&self, color: Color) -> Option<Ply> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Buffers this color's [`Ply`], replacing any previous one.
    #[inline(always)]
    pub fn set(&mut self, color: Color, ply: Ply) {
        match color {
            Color::White => self.white = Some(ply),
            Color::Black => self.black = Some(ply),
        }
    }

    /// Whether this color has nothing left to provide.
    #[inline(always)]
    pub fn is_filled(&self, color: Color) -> bool {
        self.ply(color).is_some()
    }

    /// Whether both colors have registered a [`Ply`].
    #[inline(always)]
    pub fn can_be_executed(&self) -> bool {
        self.is_filled(Color::White) && self.is_filled(Color::Black)
    }
}

/// The window a color gets to contest the opponent's just-revealed move.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Reaction {
    /// The square the opponent's piece just landed on.
    pub target: Square,
    /// The move that opened this window.
    pub trigger: Move,
}

/// The follow-up turn entered when only one color moved.
///
/// A color holding a [`Reaction`] may play onto the target square, and only
/// there; a color without one sits the turn out.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IntermediateTurn {
    white: Option<Ply>,
    black: Option<Ply>,
    white_reaction: Option<Reaction>,
    black_reaction: Option<Reaction>,
}

impl IntermediateTurn {
    pub fn new(white_reaction: Option<Reaction>, black_reaction: Option<Reaction>) -> Self {
        IntermediateTurn {
            white: None,
            black: None,
            white_reaction,
            black_reaction,
        }
    }

    /// The [`Reaction`] granted to this color, if any.
    #[inline(always)]
    pub fn reaction(&self, color: Color) -> Option<Reaction> {
        match color {
            Color::White => self.white_reaction,
            Color::Black => self.black_reaction,
        }
    }

    /// The [`Ply`] this color has registered, if any.
    #[inline(always)]
    pub fn ply(&self, color: Color) -> Option<Ply> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Buffers this color's [`Ply`], replacing any previous one.
    #[inline(always)]
    pub fn set(&mut self, color: Color, ply: Ply) {
        match color {
            Color::White => self.white = Some(ply),
            Color::Black => self.black = Some(ply),
        }
    }

    /// Whether this color has nothing left to provide.
    #[inline(always)]
    pub fn is_filled(&self, color: Color) -> bool {
        self.reaction(color).is_none() || self.ply(color).is_some()
    }

    /// Whether every color granted a [`Reaction`] has registered a [`Ply`].
    ///
    /// Vacuously true when neither color holds one.
    #[inline(always)]
    pub fn can_be_executed(&self) -> bool {
        self.is_filled(Color::White) && self.is_filled(Color::Black)
    }

    /// Restricts plays to those landing on this color's target.
    ///
    /// The play that merely repeats the trigger move is excluded; a color
    /// without a [`Reaction`] has no plays at all.
    pub fn restrict(&self, color: Color, from: Square, plays: Vec<Square>) -> Vec<Square> {
        match self.reaction(color) {
            None => Vec::new(),
            Some(r) => plays
                .into_iter()
                .filter(|&to| to == r.target && Move(from, to) != r.trigger)
                .collect(),
        }
    }
}

/// A choice of piece owed by a color whose pawn reached the farthest rank.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Promotion {
    /// The square the promoting pawn stands on.
    pub square: Square,
    /// The piece chosen to replace it, once registered.
    pub role: Option<Role>,
}

/// The turn interposed to collect promotion choices before play resumes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PromotionTurn {
    white: Option<Promotion>,
    black: Option<Promotion>,
    next: Box<Turn>,
}

impl PromotionTurn {
    pub fn new(white: Option<Square>, black: Option<Square>, next: Turn) -> Self {
        let promotion = |square| Promotion { square, role: None };

        PromotionTurn {
            white: white.map(promotion),
            black: black.map(promotion),
            next: Box::new(next),
        }
    }

    /// The [`Promotion`] owed by this color, if any.
    #[inline(always)]
    pub fn promotion(&self, color: Color) -> Option<Promotion> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Registers this color's choice; fails if it owes none.
    pub fn choose(&mut self, color: Color, role: Role) -> bool {
        let slot = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };

        match slot {
            None => false,
            Some(p) => {
                p.role = Some(role);
                true
            }
        }
    }

    /// Whether this color has nothing left to provide.
    #[inline(always)]
    pub fn is_filled(&self, color: Color) -> bool {
        match self.promotion(color) {
            None => true,
            Some(p) => p.role.is_some(),
        }
    }

    /// Whether every owed choice has been registered.
    ///
    /// Vacuously true when neither color owes one.
    #[inline(always)]
    pub fn can_be_executed(&self) -> bool {
        self.is_filled(Color::White) && self.is_filled(Color::Black)
    }

    /// The turn play resumes with afterwards.
    #[inline(always)]
    pub fn next(&self) -> &Turn {
        &self.next
    }

    /// An iterator over the registered choices.
    pub fn choices(&self) -> impl Iterator<Item = (Color, Square, Role)> + '_ {
        Color::iter().filter_map(|c| {
            let p = self.promotion(c)?;
            Some((c, p.square, p.role?))
        })
    }
}

/// The kind of a [`Turn`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TurnKind {
    #[display("sync")]
    Sync,
    #[display("intermediate")]
    Intermediate,
    #[display("promotion")]
    Promotion,
}

/// The pending turn.
#[derive(Debug, Clone, Eq, PartialEq, From)]
pub enum Turn {
    Sync(SyncTurn),
    Intermediate(IntermediateTurn),
    Promotion(PromotionTurn),
}

impl Default for Turn {
    fn default() -> Self {
        SyncTurn::new().into()
    }
}

impl Turn {
    /// This turn's [`TurnKind`].
    #[inline(always)]
    pub fn kind(&self) -> TurnKind {
        match self {
            Turn::Sync(_) => TurnKind::Sync,
            Turn::Intermediate(_) => TurnKind::Intermediate,
            Turn::Promotion(_) => TurnKind::Promotion,
        }
    }

    /// Whether this turn collects moves rather than choices.
    #[inline(always)]
    pub fn is_move_turn(&self) -> bool {
        !matches!(self, Turn::Promotion(_))
    }

    /// Whether every required side of this turn is filled.
    pub fn can_be_executed(&self) -> bool {
        match self {
            Turn::Sync(t) => t.can_be_executed(),
            Turn::Intermediate(t) => t.can_be_executed(),
            Turn::Promotion(t) => t.can_be_executed(),
        }
    }

    /// Whether this color has nothing left to provide.
    pub fn is_filled(&self, color: Color) -> bool {
        match self {
            Turn::Sync(t) => t.is_filled(color),
            Turn::Intermediate(t) => t.is_filled(color),
            Turn::Promotion(t) => t.is_filled(color),
        }
    }
}
