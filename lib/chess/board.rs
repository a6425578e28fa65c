use crate::chess::{Color, File, Piece, Rank, Role, Square};
use arrayvec::ArrayString;
use derive_more::{Debug, Display, Error};
use std::fmt::{self, Write};
use std::{ops::Index, str::FromStr};

/// The chess board, an 8x8 grid of cells each either empty or holding a piece.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug("Board({self})")]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        use Role::*;
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut cells = [[None; 8]; 8];
        for (f, role) in back.into_iter().enumerate() {
            cells[Rank::First.index() as usize][f] = Some(Piece::new(role, Color::White));
            cells[Rank::Second.index() as usize][f] = Some(Piece::new(Pawn, Color::White));
            cells[Rank::Seventh.index() as usize][f] = Some(Piece::new(Pawn, Color::Black));
            cells[Rank::Eighth.index() as usize][f] = Some(Piece::new(role, Color::Black));
        }

        Board { cells }
    }
}

impl Board {
    /// A board with no pieces on it.
    #[inline(always)]
    pub fn empty() -> Self {
        Board {
            cells: [[None; 8]; 8],
        }
    }

    /// The [`Piece`] on the given [`Square`], if any.
    #[inline(always)]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank().index() as usize][sq.file().index() as usize]
    }

    /// The [`Color`] of the piece on the given [`Square`], if any.
    #[inline(always)]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.piece_on(sq).map(|p| p.color())
    }

    /// The [`Role`] of the piece on the given [`Square`], if any.
    #[inline(always)]
    pub fn role_on(&self, sq: Square) -> Option<Role> {
        self.piece_on(sq).map(|p| p.role())
    }

    /// A copy of this board with the given [`Square`] set to `cell`.
    ///
    /// The board is a value; this never mutates `self`.
    #[inline(always)]
    #[must_use]
    pub fn with(&self, sq: Square, cell: Option<Piece>) -> Self {
        let mut next = *self;
        next.cells[sq.rank().index() as usize][sq.file().index() as usize] = cell;
        next
    }

    /// A copy of this board with the piece on `from` relocated to `to`.
    ///
    /// Whatever occupied `to` is overwritten; `from` becomes empty.
    #[inline(always)]
    #[must_use]
    pub fn relocate(&self, from: Square, to: Square) -> Self {
        self.with(from, None).with(to, self.piece_on(from))
    }

    /// The [`Square`] occupied by the king of a [`Color`].
    #[inline(always)]
    pub fn king(&self, side: Color) -> Option<Square> {
        let king = Piece::new(Role::King, side);
        Square::iter().find(|&sq| self[sq] == Some(king))
    }

    /// An iterator over all pieces on the board.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        Square::iter().filter_map(|sq| Some((self.piece_on(sq)?, sq)))
    }
}

/// Retrieves the [`Piece`] at a given [`Square`], if any.
impl Index<Square> for Board {
    type Output = Option<Piece>;

    #[inline(always)]
    fn index(&self, sq: Square) -> &Self::Output {
        &self.cells[sq.rank().index() as usize][sq.file().index() as usize]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut skip = 0;
        for sq in Square::iter().map(|sq| sq.flip()) {
            let mut buffer = ArrayString::<2>::new();

            match self[sq] {
                None => skip += 1,
                Some(p) => write!(buffer, "{}", p)?,
            }

            if sq.file() == File::H && sq.rank() != Rank::First {
                buffer.push('/');
            }

            if !buffer.is_empty() && skip > 0 {
                write!(f, "{}", skip)?;
                skip = 0;
            }

            f.write_str(&buffer)?;
        }

        if skip > 0 {
            write!(f, "{}", skip)?;
        }

        Ok(())
    }
}

/// The reason why parsing the piece placement failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse piece placement")]
pub struct ParseFenError;

impl FromStr for Board {
    type Err = ParseFenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranks: Vec<_> = s.split('/').rev().collect();
        let ranks @ [_1, _2, _3, _4, _5, _6, _7, _8] = &ranks[..] else {
            return Err(ParseFenError);
        };

        let mut cells = [[None; 8]; 8];
        for (rank, segment) in ranks.iter().enumerate() {
            let mut file = 0usize;
            for c in segment.chars() {
                let mut buffer = [0; 4];

                if file >= 8 {
                    return Err(ParseFenError);
                } else if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(ParseFenError);
                    }
                    file += skip as usize;
                } else if let Ok(p) = Piece::from_str(c.encode_utf8(&mut buffer)) {
                    cells[rank][file] = Some(p);
                    file += 1;
                } else {
                    return Err(ParseFenError);
                }
            }

            if file != 8 {
                return Err(ParseFenError);
            }
        }

        Ok(Board { cells })
    }
}
