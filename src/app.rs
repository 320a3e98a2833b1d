use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use std::time::Duration;

use crate::catalog::{Catalog, CatalogError};
use crate::config::{Config, ImageProtocol};
use crate::ui;
use crate::ui::gallery::GalleryView;
use crate::ui::ActionSheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
    Confirming,
}

pub struct App {
    pub config: Config,
    pub catalog: Catalog,
    pub gallery: GalleryView,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    // Action sheet for the delete flow
    pub action_sheet: Option<ActionSheet>,
}

impl App {
    pub fn new(config: Config, mut catalog: Catalog) -> Result<Self> {
        catalog.load()?;
        let protocol = if config.preview.image_preview {
            config.preview.protocol
        } else {
            ImageProtocol::None
        };
        let gallery = GalleryView::new(protocol, config.preview.thumbnail_size);

        Ok(Self {
            config,
            catalog,
            gallery,
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            action_sheet: None,
        })
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Any keypress dismisses a transient status message
        if self.status_message.is_some() {
            self.status_message = None;
        }

        if self.mode == AppMode::Help {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.mode = AppMode::Normal;
                }
                _ => {}
            }
            return Ok(());
        }

        if self.mode == AppMode::Confirming {
            return self.handle_action_sheet_key(key);
        }

        // Approximate dimensions for navigation; rendering re-clamps
        let columns = self.gallery.columns(120);
        let visible_rows = self.gallery.visible_rows(30);
        let len = self.catalog.len();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }

            KeyCode::Char('?') => {
                self.mode = AppMode::Help;
            }

            // Navigation
            KeyCode::Char('h') | KeyCode::Left => self.gallery.move_left(),
            KeyCode::Char('l') | KeyCode::Right => self.gallery.move_right(len),
            KeyCode::Char('k') | KeyCode::Up => self.gallery.move_up(columns),
            KeyCode::Char('j') | KeyCode::Down => self.gallery.move_down(columns, len),
            KeyCode::Char('g') | KeyCode::Home => self.gallery.move_to_start(),
            KeyCode::Char('G') | KeyCode::End => self.gallery.move_to_end(len),
            KeyCode::PageUp => self.gallery.page_up(columns, visible_rows),
            KeyCode::PageDown => self.gallery.page_down(columns, visible_rows, len),

            // Thumbnail size
            KeyCode::Char('+') | KeyCode::Char('=') => self.gallery.increase_size(),
            KeyCode::Char('-') => self.gallery.decrease_size(),

            // Capture a new photo
            KeyCode::Char('a') => self.capture_photo(),

            // Delete via action sheet
            KeyCode::Char('x') | KeyCode::Delete => self.open_action_sheet(),

            // Reload from durable storage
            KeyCode::Char('r') => self.reload()?,

            _ => {}
        }

        Ok(())
    }

    fn handle_action_sheet_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                if let Some(sheet) = self.action_sheet.take() {
                    self.delete_photo(&sheet.photo_id);
                }
                self.mode = AppMode::Normal;
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.action_sheet = None;
                self.mode = AppMode::Normal;
            }
            _ => {}
        }
        Ok(())
    }

    /// Run the capture flow. Blocks the UI while the camera command runs;
    /// there is never more than one mutation in flight.
    fn capture_photo(&mut self) {
        match self.catalog.add_new() {
            Ok(record) => {
                self.status_message = Some(format!("Captured {}", record.stored_filename()));
                // The new photo lands at the front of the album
                self.gallery.move_to_start();
            }
            Err(CatalogError::CaptureCancelled) => {
                self.status_message = Some("Capture cancelled".to_string());
            }
            Err(e) => {
                tracing::error!("Capture failed: {}", e);
                self.status_message = Some(format!("Capture failed: {}", e));
            }
        }
    }

    fn open_action_sheet(&mut self) {
        let selected = self.gallery.selected;
        if let Some(record) = self.catalog.records().get(selected) {
            self.action_sheet = Some(ActionSheet::new(
                record.id.clone(),
                record.stored_filename().to_string(),
            ));
            self.mode = AppMode::Confirming;
        }
    }

    fn delete_photo(&mut self, id: &str) {
        match self.catalog.delete(id) {
            Ok(record) => {
                self.status_message = Some(format!("Deleted {}", record.stored_filename()));
                self.gallery.invalidate(&record.id);
            }
            Err(e) => {
                tracing::error!("Delete failed: {}", e);
                self.status_message = Some(format!("Delete failed: {}", e));
            }
        }
        self.gallery.clamp_selection(self.catalog.len());
    }

    fn reload(&mut self) -> Result<()> {
        self.catalog.load()?;
        self.gallery.clear_cache();
        self.gallery.clamp_selection(self.catalog.len());
        self.status_message = Some(format!("Reloaded {} photos", self.catalog.len()));
        Ok(())
    }
}
