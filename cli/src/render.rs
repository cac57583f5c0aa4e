use std::fmt::Write as _;

use gemrush::grid::{GRID_SIZE, Gem};
use gemrush::view::SessionView;

fn glyph(cell: Option<Gem>) -> char {
    match cell {
        Some(Gem::Ruby) => 'R',
        Some(Gem::Sapphire) => 'S',
        Some(Gem::Emerald) => 'E',
        Some(Gem::Topaz) => 'T',
        Some(Gem::Amethyst) => 'A',
        None => '.',
    }
}

const BAR_WIDTH: usize = 12;

fn progress_bar(ratio: f32) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Board with row/column labels, followed by the HUD lines.
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();

    out.push_str("   ");
    for col in 0..GRID_SIZE {
        let _ = write!(out, " {col}");
    }
    out.push('\n');
    for (row, cells) in view.board.iter().enumerate() {
        let _ = write!(out, "{row:>2} ");
        for &cell in cells {
            let _ = write!(out, " {}", glyph(cell));
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "score {}  time {}s  x{}  ({:?})",
        view.score, view.time_remaining_secs, view.global_multiplier, view.phase
    );
    for kind in &view.kinds {
        let _ = writeln!(
            out,
            "  {} {:<9} lv {:>3} {} {}/{}",
            glyph(Some(kind.kind)),
            kind.kind.name(),
            kind.level,
            progress_bar(kind.fill_ratio),
            kind.experience,
            kind.experience_to_next
        );
    }
    out
}
