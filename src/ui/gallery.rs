//! Gallery view: the photo catalog rendered as a thumbnail grid.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, StatefulImage};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{imageops::FilterType, DynamicImage};

use crate::app::App;
use crate::catalog::PhotoRecord;
use crate::config::ImageProtocol;

/// Thumbnail size options for the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ThumbnailSize {
    /// Approximate cell width in terminal columns
    pub fn cell_width(&self) -> u16 {
        match self {
            ThumbnailSize::Small => 20,
            ThumbnailSize::Medium => 30,
            ThumbnailSize::Large => 50,
        }
    }

    /// Approximate cell height in terminal rows
    pub fn cell_height(&self) -> u16 {
        match self {
            ThumbnailSize::Small => 10,
            ThumbnailSize::Medium => 15,
            ThumbnailSize::Large => 25,
        }
    }

    /// Pixel size thumbnails are decoded at
    pub fn pixel_size(&self) -> u32 {
        match self {
            ThumbnailSize::Small => 128,
            ThumbnailSize::Medium => 256,
            ThumbnailSize::Large => 512,
        }
    }

    pub fn cycle_next(&self) -> Self {
        match self {
            ThumbnailSize::Small => ThumbnailSize::Medium,
            ThumbnailSize::Medium => ThumbnailSize::Large,
            ThumbnailSize::Large => ThumbnailSize::Small,
        }
    }

    pub fn cycle_prev(&self) -> Self {
        match self {
            ThumbnailSize::Small => ThumbnailSize::Large,
            ThumbnailSize::Medium => ThumbnailSize::Small,
            ThumbnailSize::Large => ThumbnailSize::Medium,
        }
    }
}

/// Gallery view state. The photo list itself lives in the catalog; this
/// tracks selection, scrolling, and the thumbnail cache.
pub struct GalleryView {
    /// Currently selected index into the catalog's record list
    pub selected: usize,
    /// First visible row (for scrolling)
    pub scroll_offset: usize,
    /// Current thumbnail size setting
    pub thumbnail_size: ThumbnailSize,
    /// Image picker for protocol detection
    picker: Option<Picker>,
    /// Cache of loaded thumbnails, keyed by record id
    thumbnail_cache: HashMap<String, StatefulProtocol>,
    /// Record ids currently being decoded
    loading: HashSet<String>,
    /// Receiver for async thumbnail loading
    receiver: mpsc::Receiver<(String, DynamicImage)>,
    /// Sender for async thumbnail loading
    sender: mpsc::Sender<(String, DynamicImage)>,
    /// Upper bound on decode size from config
    decode_cap: u32,
}

impl GalleryView {
    pub fn new(protocol: ImageProtocol, decode_cap: u32) -> Self {
        let picker = Self::create_picker(protocol);
        let (tx, rx) = mpsc::channel();
        Self {
            selected: 0,
            scroll_offset: 0,
            thumbnail_size: ThumbnailSize::default(),
            picker,
            thumbnail_cache: HashMap::new(),
            loading: HashSet::new(),
            receiver: rx,
            sender: tx,
            decode_cap,
        }
    }

    fn create_picker(protocol: ImageProtocol) -> Option<Picker> {
        match protocol {
            ImageProtocol::None => None,
            _ => Picker::from_query_stdio().ok(),
        }
    }

    /// Poll for completed async thumbnail loads
    pub fn poll_async_loads(&mut self) {
        while let Ok((id, dyn_img)) = self.receiver.try_recv() {
            self.loading.remove(&id);
            if let Some(ref mut picker) = self.picker {
                let protocol = picker.new_resize_protocol(dyn_img);
                self.thumbnail_cache.insert(id, protocol);
            }
        }
    }

    /// Number of columns based on terminal width
    pub fn columns(&self, area_width: u16) -> usize {
        let cell_width = self.thumbnail_size.cell_width();
        (area_width / cell_width).max(1) as usize
    }

    /// Number of visible rows based on terminal height
    pub fn visible_rows(&self, area_height: u16) -> usize {
        let cell_height = self.thumbnail_size.cell_height();
        (area_height / cell_height).max(1) as usize
    }

    /// Move selection left
    pub fn move_left(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Move selection right
    pub fn move_right(&mut self, len: usize) {
        if self.selected < len.saturating_sub(1) {
            self.selected += 1;
        }
    }

    /// Move selection up
    pub fn move_up(&mut self, columns: usize) {
        if self.selected >= columns {
            self.selected -= columns;
        }
    }

    /// Move selection down
    pub fn move_down(&mut self, columns: usize, len: usize) {
        let new_idx = self.selected + columns;
        if new_idx < len {
            self.selected = new_idx;
        }
    }

    /// Move to first photo
    pub fn move_to_start(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    /// Move to last photo
    pub fn move_to_end(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Page up
    pub fn page_up(&mut self, columns: usize, visible_rows: usize) {
        let page_size = columns * visible_rows;
        self.selected = self.selected.saturating_sub(page_size);
    }

    /// Page down
    pub fn page_down(&mut self, columns: usize, visible_rows: usize, len: usize) {
        let page_size = columns * visible_rows;
        let new_idx = self.selected + page_size;
        if new_idx < len {
            self.selected = new_idx;
        } else {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Keep the selection in range after the catalog shrank
    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Ensure selected item is visible
    pub fn ensure_visible(&mut self, columns: usize, visible_rows: usize) {
        let selected_row = self.selected / columns;

        if selected_row < self.scroll_offset {
            self.scroll_offset = selected_row;
        }

        if selected_row >= self.scroll_offset + visible_rows {
            self.scroll_offset = selected_row - visible_rows + 1;
        }
    }

    /// Drop a cached thumbnail (after a delete)
    pub fn invalidate(&mut self, id: &str) {
        self.thumbnail_cache.remove(id);
        self.loading.remove(id);
    }

    /// Clear thumbnail cache (size change, reload)
    pub fn clear_cache(&mut self) {
        self.thumbnail_cache.clear();
        self.loading.clear();
    }

    pub fn increase_size(&mut self) {
        self.thumbnail_size = self.thumbnail_size.cycle_next();
        self.clear_cache();
    }

    pub fn decrease_size(&mut self) {
        self.thumbnail_size = self.thumbnail_size.cycle_prev();
        self.clear_cache();
    }

    /// Fetch a thumbnail, kicking off an async decode on a miss
    /// (does NOT poll - call poll_async_loads first)
    pub fn load_thumbnail(&mut self, record: &PhotoRecord) -> Option<&mut StatefulProtocol> {
        if self.thumbnail_cache.contains_key(&record.id) {
            return self.thumbnail_cache.get_mut(&record.id);
        }

        if !self.loading.contains(&record.id) && self.picker.is_some() {
            self.loading.insert(record.id.clone());
            let id = record.id.clone();
            let display_path = record.display_path.clone();
            let sender = self.sender.clone();
            let size = self.thumbnail_size.pixel_size().min(self.decode_cap.max(64));

            std::thread::spawn(move || {
                if let Some(img) = decode_display(&display_path) {
                    let resized = img.resize(size, size, FilterType::Triangle);
                    let _ = sender.send((id, resized));
                }
            });
        }

        None
    }

    /// Check if a thumbnail is currently loading
    pub fn is_loading(&self, id: &str) -> bool {
        self.loading.contains(id)
    }
}

/// Decode a display path into an image: either a `data:` URI with inline
/// base64 bytes, or a plain filesystem path.
fn decode_display(display_path: &str) -> Option<DynamicImage> {
    if let Some(rest) = display_path.strip_prefix("data:") {
        let encoded = rest.split_once(',').map(|(_, data)| data)?;
        let bytes = BASE64.decode(encoded).ok()?;
        image::load_from_memory(&bytes).ok()
    } else {
        image::ImageReader::open(display_path)
            .ok()
            .and_then(|r| r.decode().ok())
    }
}

/// Render the gallery view
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let records = app.catalog.records();
    let gallery = &mut app.gallery;

    // Poll for completed thumbnail loads once per frame (not per cell)
    gallery.poll_async_loads();

    let columns = gallery.columns(area.width);
    let visible_rows = gallery.visible_rows(area.height.saturating_sub(3));
    gallery.ensure_visible(columns, visible_rows);

    // Main layout: header + grid + footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Grid
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_header(frame, gallery, records.len(), chunks[0]);
    render_grid(frame, gallery, records, chunks[1], columns, visible_rows);
    render_footer(frame, gallery, records, chunks[2]);
}

fn render_header(frame: &mut Frame, gallery: &GalleryView, count: usize, area: Rect) {
    let header = format!(
        " Album | {} photos | Size: {:?}",
        count, gallery.thumbnail_size
    );

    let paragraph = Paragraph::new(header)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(paragraph, area);
}

fn render_grid(
    frame: &mut Frame,
    gallery: &mut GalleryView,
    records: &[PhotoRecord],
    area: Rect,
    columns: usize,
    visible_rows: usize,
) {
    if records.is_empty() {
        let empty = Paragraph::new("No photos yet. Press 'a' to capture one.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        let y_offset = area.height / 2;
        let centered = Rect::new(area.x, area.y + y_offset, area.width, 1);
        frame.render_widget(empty, centered);
        return;
    }

    let cell_width = gallery.thumbnail_size.cell_width();
    let cell_height = gallery.thumbnail_size.cell_height();

    let col_constraints: Vec<Constraint> = (0..columns)
        .map(|_| Constraint::Length(cell_width))
        .collect();

    let row_constraints: Vec<Constraint> = (0..visible_rows)
        .map(|_| Constraint::Length(cell_height))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let actual_row = gallery.scroll_offset + row_idx;

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints.clone())
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let photo_idx = actual_row * columns + col_idx;

            if let Some(record) = records.get(photo_idx) {
                let is_selected = photo_idx == gallery.selected;
                render_thumbnail_cell(frame, gallery, record, *cell_area, is_selected);
            }
        }
    }
}

fn render_thumbnail_cell(
    frame: &mut Frame,
    gallery: &mut GalleryView,
    record: &PhotoRecord,
    area: Rect,
    is_selected: bool,
) {
    let border_color = if is_selected {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let filename = record.stored_filename().to_string();

    // Truncate filename to fit cell width
    let max_name_len = (area.width as usize).saturating_sub(4);
    let display_name = if filename.len() > max_name_len {
        format!("{}...", &filename[..max_name_len.saturating_sub(3)])
    } else {
        filename
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(display_name);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 2 || inner.height < 2 {
        return;
    }

    if let Some(protocol) = gallery.load_thumbnail(record) {
        let image = StatefulImage::new(None);
        frame.render_stateful_widget(image, inner, protocol);
    } else if gallery.is_loading(&record.id) {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);

        if inner.height > 1 {
            let y_offset = inner.height / 2;
            let centered = Rect::new(inner.x, inner.y + y_offset, inner.width, 1);
            frame.render_widget(loading, centered);
        }
    } else {
        let placeholder = Paragraph::new("[ ]")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);

        if inner.height > 1 {
            let y_offset = inner.height / 2;
            let centered = Rect::new(inner.x, inner.y + y_offset, inner.width, 1);
            frame.render_widget(placeholder, centered);
        }
    }
}

fn render_footer(frame: &mut Frame, gallery: &GalleryView, records: &[PhotoRecord], area: Rect) {
    let selected_info = if let Some(record) = records.get(gallery.selected) {
        format!(
            "{} | {}/{}",
            record.stored_filename(),
            gallery.selected + 1,
            records.len()
        )
    } else {
        "No selection".to_string()
    };

    let help = "Arrows:move | a:capture | x:delete | r:reload | +/-:size | ?:help | q:quit";

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let info = Paragraph::new(selected_info).style(Style::default().fg(Color::Yellow));
    frame.render_widget(info, footer_chunks[0]);

    let help_text = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help_text, footer_chunks[1]);
}
