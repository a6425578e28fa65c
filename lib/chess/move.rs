use crate::chess::{ParseSquareError, Square};
use derive_more::{Debug, Display, Error, From};
use std::str::FromStr;

/// A chess move in [pure coordinate notation].
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[cfg_attr(test, filter(#self.0 != #self.1))]
#[debug("Move({self})")]
#[display("{_0}{_1}")]
pub struct Move(pub Square, pub Square);

impl Move {
    /// The source [`Square`].
    #[inline(always)]
    pub fn whence(&self) -> Square {
        self.0
    }

    /// The destination [`Square`].
    #[inline(always)]
    pub fn whither(&self) -> Square {
        self.1
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
#[display("failed to parse move")]
pub struct ParseMoveError(ParseSquareError);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(2).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Move(s[..i].parse()?, s[i..].parse()?))
    }
}
