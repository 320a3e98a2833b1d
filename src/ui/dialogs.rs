//! Help overlay.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

pub fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_width = 55.min(area.width.saturating_sub(4));
    let dialog_height = 16.min(area.height.saturating_sub(4));

    let x = (area.width.saturating_sub(dialog_width)) / 2;
    let y = (area.height.saturating_sub(dialog_height)) / 2;

    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let help_text = vec![
        Line::from(Span::styled(
            "snapshelf",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from("  h/Left           Move left"),
        Line::from("  l/Right          Move right"),
        Line::from("  k/Up             Move up"),
        Line::from("  j/Down           Move down"),
        Line::from("  g/Home           Go to first"),
        Line::from("  G/End            Go to last"),
        Line::from("  PgUp/PgDn        Page up/down"),
        Line::from("  a                Capture a new photo"),
        Line::from("  x/Delete         Delete selected photo"),
        Line::from("  r                Reload album from storage"),
        Line::from("  +/=, -           Larger/smaller thumbnails"),
        Line::from("  Esc/q            Quit"),
        Line::from("  ?                Toggle this help"),
    ];

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help "),
    );

    frame.render_widget(paragraph, dialog_area);
}
