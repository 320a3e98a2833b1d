//! Action sheet shown on the selected photo: delete or cancel.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Dialog state for the per-photo action sheet
pub struct ActionSheet {
    /// Id of the photo the sheet was opened on
    pub photo_id: String,
    /// Filename shown to the user
    pub filename: String,
}

impl ActionSheet {
    pub fn new(photo_id: String, filename: String) -> Self {
        Self { photo_id, filename }
    }
}

pub fn render(frame: &mut Frame, sheet: &ActionSheet, area: Rect) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let dialog_height = 8;

    let x = (area.width.saturating_sub(dialog_width)) / 2;
    let y = (area.height.saturating_sub(dialog_height)) / 2;

    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Message
            Constraint::Length(3), // Buttons
        ])
        .margin(1)
        .split(dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Photos ");
    frame.render_widget(block, dialog_area);

    let message = Paragraph::new(format!("Delete {}?", sheet.filename))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);
    frame.render_widget(message, chunks[0]);

    let buttons = Line::from(vec![
        Span::styled(
            "  [Enter/y] ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw("Delete"),
        Span::raw("    "),
        Span::styled(
            "[Esc/n] ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("Cancel"),
    ]);
    let button_widget = Paragraph::new(buttons).alignment(Alignment::Center);
    frame.render_widget(button_widget, chunks[1]);
}
