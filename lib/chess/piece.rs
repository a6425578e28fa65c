use crate::chess::{Color, Role};
use derive_more::{Display, Error};
use std::{fmt, str::FromStr};

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(u8)]
pub enum Piece {
    WhitePawn,
    BlackPawn,
    WhiteKnight,
    BlackKnight,
    WhiteBishop,
    BlackBishop,
    WhiteRook,
    BlackRook,
    WhiteQueen,
    BlackQueen,
    WhiteKing,
    BlackKing,
}

impl Piece {
    /// Constructs [`Piece`] from a pair of [`Role`] and [`Color`].
    #[inline(always)]
    pub fn new(r: Role, c: Color) -> Self {
        use {Color::*, Piece::*, Role::*};
        match (r, c) {
            (Pawn, White) => WhitePawn,
            (Pawn, Black) => BlackPawn,
            (Knight, White) => WhiteKnight,
            (Knight, Black) => BlackKnight,
            (Bishop, White) => WhiteBishop,
            (Bishop, Black) => BlackBishop,
            (Rook, White) => WhiteRook,
            (Rook, Black) => BlackRook,
            (Queen, White) => WhiteQueen,
            (Queen, Black) => BlackQueen,
            (King, White) => WhiteKing,
            (King, Black) => BlackKing,
        }
    }

    /// This piece's [`Role`].
    #[inline(always)]
    pub fn role(&self) -> Role {
        use {Piece::*, Role::*};
        match self {
            WhitePawn | BlackPawn => Pawn,
            WhiteKnight | BlackKnight => Knight,
            WhiteBishop | BlackBishop => Bishop,
            WhiteRook | BlackRook => Rook,
            WhiteQueen | BlackQueen => Queen,
            WhiteKing | BlackKing => King,
        }
    }

    /// This piece's [`Color`].
    #[inline(always)]
    pub fn color(&self) -> Color {
        match *self as u8 % 2 {
            0 => Color::White,
            _ => Color::Black,
        }
    }

    /// The same piece in the opposite [`Color`].
    #[inline(always)]
    pub fn flip(&self) -> Self {
        Piece::new(self.role(), !self.color())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color() {
            Color::White => write!(f, "{}", self.role().to_string().to_uppercase()),
            Color::Black => fmt::Display::fmt(&self.role(), f),
        }
    }
}

/// The reason why parsing [`Piece`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse piece")]
pub struct ParsePieceError;

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.chars().next() {
            Some(c) if c.is_uppercase() => Color::White,
            Some(_) => Color::Black,
            None => return Err(ParsePieceError),
        };

        match s.to_lowercase().parse() {
            Ok(role) => Ok(Piece::new(role, color)),
            Err(_) => Err(ParsePieceError),
        }
    }
}
