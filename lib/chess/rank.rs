use crate::chess::Color;
use derive_more::{Display, Error};
use std::{ops::Sub, str::FromStr};

/// A row on the chess board.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(i8)]
pub enum Rank {
    #[display("1")]
    First,
    #[display("2")]
    Second,
    #[display("3")]
    Third,
    #[display("4")]
    Fourth,
    #[display("5")]
    Fifth,
    #[display("6")]
    Sixth,
    #[display("7")]
    Seventh,
    #[display("8")]
    Eighth,
}

impl Rank {
    pub(crate) const ALL: [Self; 8] = [
        Rank::First,
        Rank::Second,
        Rank::Third,
        Rank::Fourth,
        Rank::Fifth,
        Rank::Sixth,
        Rank::Seventh,
        Rank::Eighth,
    ];

    /// Constructs [`Rank`] from its index, if within the board.
    #[inline(always)]
    pub fn from_index(i: i8) -> Option<Self> {
        Self::ALL.get(usize::try_from(i).ok()?).copied()
    }

    /// This rank's index, `0` for the first rank through `7` for the eighth.
    #[inline(always)]
    pub fn index(&self) -> i8 {
        *self as i8
    }

    /// An iterator over every rank, from the first to the eighth.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        Self::ALL.into_iter()
    }

    /// This rank from the opponent's perspective.
    #[inline(always)]
    pub fn flip(&self) -> Self {
        Self::ALL[(7 - self.index()) as usize]
    }

    /// The rank where this color's pieces start out.
    #[inline(always)]
    pub fn home(color: Color) -> Self {
        match color {
            Color::White => Rank::First,
            Color::Black => Rank::Eighth,
        }
    }

    /// The farthest rank from this color's perspective.
    #[inline(always)]
    pub fn farthest(color: Color) -> Self {
        Rank::home(!color)
    }
}

impl Sub for Rank {
    type Output = i8;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        self.index() - rhs.index()
    }
}

/// The reason why parsing [`Rank`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(
    "failed to parse rank, expected digit in the range `({}..={})`",
    Rank::First,
    Rank::Eighth
)]
pub struct ParseRankError;

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Rank::First),
            "2" => Ok(Rank::Second),
            "3" => Ok(Rank::Third),
            "4" => Ok(Rank::Fourth),
            "5" => Ok(Rank::Fifth),
            "6" => Ok(Rank::Sixth),
            "7" => Ok(Rank::Seventh),
            "8" => Ok(Rank::Eighth),
            _ => Err(ParseRankError),
        }
    }
}
