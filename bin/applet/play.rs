use anyhow::{ensure, Context, Error as Anyhow};
use clap::Parser;
use lib::chess::{Board, Color, Role};
use lib::game::{Game, Ply, TurnKind};
use std::io::{stdin, BufRead};
use tracing::{instrument, warn};

/// Play a synchronous chess game on the terminal.
///
/// Each line registers one side's action: a move such as `w e2e4`, a pass
/// such as `b pass`, or, during a promotion turn, a choice such as `w =q`.
/// The turn executes as soon as both sides are in.
#[derive(Debug, Default, Parser)]
pub struct Play {
    /// The piece placement to start from.
    #[clap(short, long)]
    fen: Option<String>,
}

enum Command {
    Ply(Ply),
    Choice(Role),
}

fn parse(line: &str) -> Option<(Color, Command)> {
    let mut words = line.split_whitespace();

    let color = match words.next()? {
        "w" | "white" => Color::White,
        "b" | "black" => Color::Black,
        _ => return None,
    };

    let command = match words.next()? {
        "pass" => Command::Ply(Ply::Pass),
        word => match word.strip_prefix('=') {
            Some(role) => Command::Choice(role.parse().ok()?),
            None => Command::Ply(Ply::Play(word.parse().ok()?)),
        },
    };

    match words.next() {
        None => Some((color, command)),
        Some(_) => None,
    }
}

fn render(game: &Game) {
    println!("{}", game.board());

    let state = game.check_state();
    for color in Color::iter() {
        if state.in_checkmate(color) {
            println!("{} is checkmated", color);
        } else if state.in_check(color) {
            println!("{} is in check", color);
        }
    }

    match game.turn().kind() {
        TurnKind::Sync => {}
        TurnKind::Intermediate => println!("reaction window open"),
        TurnKind::Promotion => {
            for color in game.pending_promotions() {
                println!("{} must choose a promotion, e.g. `{} =q`", color, color);
            }
        }
    }
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let board: Board = match &self.fen {
            None => Board::default(),
            Some(fen) => fen.parse().context("invalid piece placement")?,
        };

        for color in Color::iter() {
            ensure!(board.king(color).is_some(), "the {} king is missing", color);
        }

        let mut game = Game::new(board);
        render(&game);

        for line in stdin().lock().lines() {
            let line = line.context("failed to read the next command")?;
            if line.trim().is_empty() {
                continue;
            }

            let accepted = match parse(&line) {
                None => {
                    warn!(command = %line, "unintelligible command");
                    continue;
                }

                Some((color, Command::Ply(ply))) => game.register_move(color, ply),
                Some((color, Command::Choice(role))) => game.register_choice(color, role),
            };

            if !accepted {
                println!("illegal");
            } else if game.run_turn() {
                render(&game);
            }
        }

        Ok(())
    }
}
