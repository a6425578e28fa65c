use crate::chess::{File, ParseFileError, ParseRankError, Rank, Vector};
use derive_more::{Display, Error, From};
use std::{fmt, str::FromStr};

/// A square on the chess board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(i8)]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    #[rustfmt::skip]
    const ALL: [Self; 64] = {
        use Square::*;
        [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ]
    };

    /// Constructs [`Square`] from a pair of [`File`] and [`Rank`].
    #[inline(always)]
    pub fn new(f: File, r: Rank) -> Self {
        Self::ALL[(r.index() * 8 + f.index()) as usize]
    }

    /// This square's [`File`].
    #[inline(always)]
    pub fn file(&self) -> File {
        File::ALL[(*self as i8 & 0b111) as usize]
    }

    /// This square's [`Rank`].
    #[inline(always)]
    pub fn rank(&self) -> Rank {
        Rank::ALL[(*self as i8 >> 3) as usize]
    }

    /// An iterator over every square, in rank-major order from a1 to h8.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        Self::ALL.into_iter()
    }

    /// This square with its [`Rank`] flipped.
    #[inline(always)]
    pub fn flip(&self) -> Self {
        Square::new(self.file(), self.rank().flip())
    }

    /// The square reached by following a [`Vector`], if still on the board.
    #[inline(always)]
    pub fn offset(&self, v: Vector) -> Option<Square> {
        let f = File::from_index(self.file().index() + v.df)?;
        let r = Rank::from_index(self.rank().index() + v.dr)?;
        Some(Square::new(f, r))
    }

    /// The [`Vector`] leading from this square to another.
    #[inline(always)]
    pub fn vector_to(&self, other: Square) -> Vector {
        Vector::new(other.file() - self.file(), other.rank() - self.rank())
    }

    /// The [Chebyshev distance] between two squares.
    ///
    /// [Chebyshev distance]: https://en.wikipedia.org/wiki/Chebyshev_distance
    #[inline(always)]
    pub fn distance(&self, other: Square) -> i8 {
        self.vector_to(other).norm()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.file(), f)?;
        fmt::Display::fmt(&self.rank(), f)?;
        Ok(())
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseSquareError {
    #[display("failed to parse square")]
    InvalidFile(ParseFileError),
    #[display("failed to parse square")]
    InvalidRank(ParseRankError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Square::new(s[..i].parse()?, s[i..].parse()?))
    }
}
