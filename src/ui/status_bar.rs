use ratatui::{prelude::*, widgets::Paragraph};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // If there's a status message, show it prominently
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        )]);
        let paragraph = Paragraph::new(line);
        frame.render_widget(paragraph, area);
        return;
    }

    let count = app.catalog.len();
    let position = if count > 0 {
        format!("{}/{}", app.gallery.selected + 1, count)
    } else {
        "0/0".to_string()
    };

    let mut spans = Vec::new();

    spans.push(Span::styled(
        format!(" {} photos ", count),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    let help_text = format!(" {} | a:capture x:delete r:reload ?:help q:quit ", position);

    // Right-align the help text
    let content_len: usize = spans.iter().map(|s| s.content.len()).sum();
    let padding = (area.width as usize)
        .saturating_sub(content_len)
        .saturating_sub(help_text.len());
    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }
    spans.push(Span::styled(help_text, Style::default().fg(Color::Gray)));

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}
