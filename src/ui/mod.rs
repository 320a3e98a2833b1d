mod action_sheet;
mod dialogs;
pub mod gallery;
mod status_bar;

pub use action_sheet::ActionSheet;

use ratatui::prelude::*;

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: gallery + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    gallery::render(frame, app, main_chunks[0]);
    status_bar::render(frame, app, main_chunks[1]);

    // Overlays
    if app.mode == AppMode::Confirming {
        if let Some(ref sheet) = app.action_sheet {
            action_sheet::render(frame, sheet, area);
        }
    }

    if app.mode == AppMode::Help {
        dialogs::render_help(frame, area);
    }
}
