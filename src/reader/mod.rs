pub mod menu;
pub mod tts;

use crate::error::{SessionError, SpeechError};
use crate::highlights::HighlightStore;
use crate::models::{
    ColumnMode, FlowMode, Highlight, MIN_FONT_SIZE, NavDirection, RangeToken, ReadingPosition,
    ReadingSettings, Relocation, SessionExit, SpeechState,
};
use crate::rendition::{Rendition, RenderingBridge};
use crate::state::KeyValueStore;

use menu::{MenuState, Point, Region};
use tts::{SpeechController, SpeechEngine};

pub const COLUMN_ADVISORY: &str = "Column toggle works only in paginated mode.";
pub const NO_HIGHLIGHTS: &str = "No highlights yet.";
pub const DEFAULT_FONT_STEP: u32 = 2;

/// What the control menu needs to draw itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView<'a> {
    pub open: bool,
    pub page_label: &'a str,
    pub flow_label: &'static str,
    pub column_label: &'static str,
    pub column_enabled: bool,
    pub column_hint: Option<&'static str>,
    pub speech: SpeechState,
    pub speak_enabled: bool,
    pub stop_enabled: bool,
    pub highlights: &'a [Highlight],
}

/// Canonical state of one open book. Every change to settings, position or
/// highlights goes through here and is then pushed to the rendering bridge.
pub struct ReadingSession {
    source: String,
    settings: ReadingSettings,
    font_step: i32,
    position: ReadingPosition,
    page_label: String,
    highlights: Vec<Highlight>,
    store: HighlightStore<Box<dyn KeyValueStore>>,
    bridge: RenderingBridge,
    speech: SpeechController,
    menu: MenuState,
}

impl ReadingSession {
    pub fn initialize(
        source: Option<&str>,
        store: Box<dyn KeyValueStore>,
        speech: Box<dyn SpeechEngine>,
        settings: ReadingSettings,
    ) -> Result<Self, SessionError> {
        let source = source
            .map(str::trim)
            .filter(|source| !source.is_empty())
            .ok_or(SessionError::MissingSource)?;

        let store = HighlightStore::new(store, source);
        let highlights = store.load();
        let settings = ReadingSettings {
            font_size: settings.font_size.max(MIN_FONT_SIZE),
            ..settings
        };
        log::info!(
            "Opening {} ({}) with {} stored highlights",
            source,
            store.key(),
            highlights.len()
        );

        Ok(Self {
            source: source.to_string(),
            settings,
            font_step: DEFAULT_FONT_STEP as i32,
            position: ReadingPosition::Start,
            page_label: String::new(),
            highlights,
            store,
            bridge: RenderingBridge::new(),
            speech: SpeechController::new(speech),
            menu: MenuState::default(),
        })
    }

    pub fn with_font_step(mut self, step: u32) -> Self {
        self.font_step = i32::try_from(step.max(1)).unwrap_or(i32::MAX);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn settings(&self) -> &ReadingSettings {
        &self.settings
    }

    pub fn position(&self) -> &ReadingPosition {
        &self.position
    }

    pub fn page_label(&self) -> &str {
        &self.page_label
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn speech_state(&self) -> SpeechState {
        SpeechState {
            is_speaking: self.speech.is_speaking(),
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn is_rendition_ready(&self) -> bool {
        self.bridge.is_ready()
    }

    // Engine lifecycle

    pub fn attach_rendition(&mut self, handle: Box<dyn Rendition>) {
        self.bridge.attach(handle, &self.settings, &self.highlights);
        if self.position != ReadingPosition::Start {
            self.bridge.go_to(&self.position);
        }
    }

    pub fn detach_rendition(&mut self) -> Option<Box<dyn Rendition>> {
        self.bridge.detach()
    }

    /// Drains engine callbacks: the newest relocation, speech completion.
    pub fn pump(&mut self) {
        if let Some(relocation) = self.bridge.take_relocation() {
            self.handle_relocation(relocation);
        }
        self.speech.pump();
    }

    pub fn handle_relocation(&mut self, relocation: Relocation) {
        self.page_label = relocation.page.label();
        if let ReadingPosition::Token(token) = relocation.position {
            self.position = ReadingPosition::Token(token);
        }
    }

    // Position

    /// Jumps to `token`, which came from the engine or from a stored
    /// highlight. Empty tokens are ignored.
    pub fn set_position(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            return;
        }
        let position = ReadingPosition::Token(token);
        if position == self.position {
            return;
        }
        self.position = position;
        self.bridge.go_to(&self.position);
    }

    /// Always reaches the engine, even when the cached position already
    /// matches: the view may have moved without a relocation being pumped.
    pub fn jump_to_highlight(&mut self, range: &RangeToken) {
        if range.as_str().is_empty() {
            return;
        }
        self.position = ReadingPosition::Token(range.as_str().to_string());
        self.bridge.go_to(&self.position);
    }

    pub fn navigate(&mut self, direction: NavDirection) {
        self.bridge.navigate(direction);
    }

    // Settings

    /// Adjusts the font size by `delta` points, never going below the floor.
    pub fn set_font_size(&mut self, delta: i32) -> u32 {
        let size = (self.settings.font_size as i64 + delta as i64).max(MIN_FONT_SIZE as i64);
        self.settings.font_size = u32::try_from(size).unwrap_or(u32::MAX);
        self.bridge.apply_settings(&self.settings);
        log::debug!("Font size {}", self.settings.font_size);
        self.settings.font_size
    }

    pub fn increase_font_size(&mut self) -> u32 {
        self.set_font_size(self.font_step)
    }

    pub fn decrease_font_size(&mut self) -> u32 {
        self.set_font_size(self.font_step.saturating_neg())
    }

    pub fn toggle_flow_mode(&mut self) -> FlowMode {
        self.settings.flow = self.settings.flow.toggled();
        self.bridge.apply_settings(&self.settings);
        log::debug!("Flow mode {}", self.settings.flow.as_str());
        self.settings.flow
    }

    /// Flips between one and two columns. Only valid while paginated; in
    /// scrolled mode nothing changes and the advisory is returned.
    pub fn toggle_column_mode(&mut self) -> Result<ColumnMode, SessionError> {
        if self.settings.flow == FlowMode::Scrolled {
            return Err(SessionError::UnsupportedOperation(COLUMN_ADVISORY.to_string()));
        }
        self.settings.columns = self.settings.columns.toggled();
        self.bridge.apply_settings(&self.settings);
        log::debug!("Column mode {}", self.settings.columns.as_str());
        Ok(self.settings.columns)
    }

    // Highlights

    /// Highlights the live selection. Without a selection this does nothing
    /// and returns `Ok(None)`.
    pub fn add_highlight(&mut self) -> Result<Option<Highlight>, SessionError> {
        let Some(selection) = self.bridge.current_selection() else {
            return Ok(None);
        };
        if selection.text.trim().is_empty() {
            self.bridge.clear_selection();
            return Ok(None);
        }

        if self
            .highlights
            .iter()
            .any(|highlight| highlight.cfi_range == selection.range)
        {
            self.bridge.clear_selection();
            return Ok(None);
        }

        let highlight = Highlight {
            cfi_range: selection.range,
            text: selection.text,
        };
        let mut updated = self.highlights.clone();
        updated.push(highlight.clone());
        self.store.save(&updated)?;

        self.highlights = updated;
        self.bridge.mark_highlight(&highlight.cfi_range);
        self.bridge.clear_selection();
        log::debug!("Added highlight {}", highlight.cfi_range);
        Ok(Some(highlight))
    }

    /// Removes the highlight for `range`. Unknown ranges are ignored.
    pub fn delete_highlight(&mut self, range: &RangeToken) -> Result<bool, SessionError> {
        if !self
            .highlights
            .iter()
            .any(|highlight| &highlight.cfi_range == range)
        {
            return Ok(false);
        }

        let updated: Vec<Highlight> = self
            .highlights
            .iter()
            .filter(|highlight| &highlight.cfi_range != range)
            .cloned()
            .collect();
        self.store.save(&updated)?;

        self.highlights = updated;
        self.bridge.unmark_highlight(range);
        log::debug!("Deleted highlight {}", range);
        Ok(true)
    }

    pub fn clear_highlights(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        for highlight in std::mem::take(&mut self.highlights) {
            self.bridge.unmark_highlight(&highlight.cfi_range);
        }
        Ok(())
    }

    // Speech

    /// Reads the live selection aloud. The selection is cleared whenever one
    /// existed, spoken or not.
    pub fn speak_selection(&mut self) -> Result<bool, SpeechError> {
        if !self.speech.can_speak() {
            return Ok(false);
        }
        let Some(selection) = self.bridge.current_selection() else {
            return Ok(false);
        };
        let started = self.speech.speak(&selection.text);
        self.bridge.clear_selection();
        started
    }

    pub fn speak(&mut self, text: &str) -> Result<bool, SpeechError> {
        self.speech.speak(text)
    }

    pub fn stop_speaking(&mut self) {
        self.speech.stop();
    }

    // Menu

    pub fn toggle_menu(&mut self) {
        self.menu.toggle();
    }

    pub fn close_menu(&mut self) {
        self.menu.close();
    }

    pub fn set_menu_region(&mut self, region: Option<Region>) {
        self.menu.set_menu_region(region);
    }

    pub fn set_reader_region(&mut self, region: Option<Region>) {
        self.menu.set_reader_region(region);
    }

    /// Document-wide pointer observer; returns whether the menu closed.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        self.menu.pointer_down(point)
    }

    pub fn menu_view(&self) -> MenuView<'_> {
        let paginated = self.settings.flow == FlowMode::Paginated;
        MenuView {
            open: self.menu.is_open(),
            page_label: &self.page_label,
            flow_label: if paginated { "Scrolled" } else { "Paginated" },
            column_label: match self.settings.columns {
                ColumnMode::Auto => "One Column",
                ColumnMode::None => "Two Columns",
            },
            column_enabled: paginated,
            column_hint: (!paginated).then_some(COLUMN_ADVISORY),
            speech: self.speech_state(),
            speak_enabled: self.speech.can_speak(),
            stop_enabled: self.speech.can_stop(),
            highlights: &self.highlights,
        }
    }

    /// Leaves the reader for the library.
    pub fn back(&mut self) -> SessionExit {
        self.speech.stop();
        self.menu.close();
        SessionExit::Library
    }
}
