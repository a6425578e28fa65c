/// Chess domain types.
pub mod chess;
/// The synchronous turn engine.
pub mod game;
