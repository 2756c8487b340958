//! Plain-text renderer for the gallery grid.
//!
//! The terminal shell has no image support, so the grid is drawn as a list:
//! breadcrumbs, folders, one line per tile, then the listing status and the
//! viewer or details panel.
//!
//! ```text
//! ───────────── 2024/05 (2 of 3) ─────────────
//! root / 2024 / [05]
//!   [dir] raw                        2024/05/raw
//!      0  a.png                      /thumb/a.png
//!   >  1  b.png                      /thumb/b.png
//! ── more available (180x135 tiles) ──
//! viewer: 2/2  b.png
//! next/prev: navigate  ...
//! ```

use crate::app::AppState;
use crate::ui::viewmodel::{FetchStatus, GridViewModel, ViewerInfo};
use std::fmt::Write as _;

/// Width of the name column.
const NAME_COLUMN_WIDTH: usize = 28;

/// Renders the gallery to stdout.
pub fn render(state: &AppState, cols: usize) {
    print!("{}", render_to_string(&state.compute_viewmodel(), cols));
}

/// Renders a view model into a string, one screen line per text line.
#[must_use]
pub fn render_to_string(vm: &GridViewModel, cols: usize) -> String {
    let mut out = String::new();

    let title_len = vm.header.title.chars().count();
    let side = cols.saturating_sub(title_len) / 2;
    let _ = writeln!(out, "{}{}{}", "─".repeat(side), vm.header.title, "─".repeat(side));

    let crumbs: Vec<String> = vm
        .crumbs
        .iter()
        .map(|c| if c.is_current { format!("[{}]", c.label) } else { c.label.clone() })
        .collect();
    let _ = writeln!(out, "{}", crumbs.join(" / "));

    if let Some(details) = &vm.details {
        let _ = writeln!(out, "details of {}", details.path);
        for line in &details.lines {
            let _ = writeln!(out, "  {line}");
        }
        return out;
    }

    for folder in &vm.folders {
        let _ = writeln!(out, "  [dir] {:<width$} {}", truncate(&folder.name), folder.path, width = NAME_COLUMN_WIDTH);
    }

    for tile in &vm.tiles {
        let marker = if tile.is_open { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "  {marker} {:>3}  {:<width$} {}",
            tile.index,
            truncate(&tile.name),
            tile.src,
            width = NAME_COLUMN_WIDTH
        );
    }

    if let Some(empty) = &vm.empty_state {
        let _ = writeln!(out, "  {}: {}", empty.message, empty.subtitle);
    }

    let (w, h) = vm.tile_size;
    let status = match &vm.fetch_status {
        FetchStatus::Idle => format!("more available ({w}x{h} tiles)"),
        FetchStatus::Loading => "loading...".to_string(),
        FetchStatus::Failed(reason) => format!("load failed: {reason} (`more` retries)"),
        FetchStatus::Complete => "end of listing".to_string(),
    };
    let _ = writeln!(out, "── {status} ──");

    match &vm.viewer {
        Some(ViewerInfo::Open { index, count, name }) => {
            let _ = writeln!(out, "viewer: {}/{count}  {name}", index + 1);
        }
        Some(ViewerInfo::Pending { src }) => {
            let _ = writeln!(out, "viewer: looking for {src}");
        }
        None => {}
    }

    let _ = writeln!(out, "{}", vm.footer.keybindings);
    out
}

fn truncate(name: &str) -> String {
    if name.chars().count() > NAME_COLUMN_WIDTH {
        let kept: String = name.chars().take(NAME_COLUMN_WIDTH - 3).collect();
        format!("{kept}...")
    } else {
        name.to_string()
    }
}
