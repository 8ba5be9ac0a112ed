//! Blockfall — classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod collision;
mod game;
mod input;
mod piece;
mod theme;
mod ticker;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Options derived from CLI that affect engine behaviour.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Gravity interval in ms; constant for the whole session.
    pub tick_ms: u64,
    /// RNG seed for the piece catalog. None seeds from the OS.
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|_| {
        let mut t = theme::Theme::default();
        t.apply_palette(args.palette);
        t
    });
    let config = GameConfig {
        tick_ms: args.tick_ms.max(1),
        seed: args.seed,
    };
    let mut app = App::new(&args, &config, theme);
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Complete rows to clear them and score.",
    long_about = "Blockfall is a terminal falling-block puzzle on a 10x20 board.\n\n\
        Move and rotate the falling piece; it locks when it can fall no further. Every \
        completed row is cleared for 10 points. The game ends when a new piece has no room.\n\n\
        CONTROLS:\n  Left/Right h/l  Move      Up/k   Rotate    Down/j  Soft drop\n  \
        S/Enter  Start   P/Space  Pause/Resume   R  Restart   Q/Esc  Quit\n\n\
        MOUSE:\n  Swipe on the board (left/right move, down drops, up or tap rotates) or click the \
        sidebar buttons."
)]
pub struct Args {
    /// Gravity interval: one row every MS milliseconds.
    #[arg(long, default_value_t = ticker::DEFAULT_TICK_MS, value_name = "MS")]
    pub tick_ms: u64,

    /// Seed for the piece sequence (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast (classic colours), or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Start playing immediately instead of waiting on the start screen.
    #[arg(long)]
    pub autostart: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast", alias = "classic")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
