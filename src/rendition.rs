//! Bridge between the reading session and the external rendering engine.
//!
//! The engine handle shows up asynchronously once the book is mounted, so the
//! bridge holds it as an `Option`. Every operation over a missing handle is a
//! no-op.

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{
    ColumnMode, FlowMode, Highlight, NavDirection, RangeToken, ReadingPosition, ReadingSettings,
    Relocation, TextSelection,
};

pub const HIGHLIGHT_ANNOTATION: &str = "highlight";
pub const HIGHLIGHT_CLASS: &str = "custom-highlight";

/// Single-slot channel for relocation events. A newer event overwrites one
/// that has not been consumed yet.
pub type RelocationSlot = Rc<RefCell<Option<Relocation>>>;

/// A rendered content frame (one per loaded section of the book).
pub trait ContentFrame {
    /// The live selection in this frame, if the reader has one.
    fn selection(&self) -> Option<TextSelection>;
    fn clear_selection(&mut self);
}

/// Live handle of the rendering engine.
pub trait Rendition {
    fn set_font_size(&mut self, px: u32);
    fn set_flow(&mut self, mode: FlowMode);
    fn set_spread(&mut self, mode: ColumnMode);
    fn next(&mut self);
    fn prev(&mut self);
    fn display(&mut self, position: &ReadingPosition);
    fn add_annotation(&mut self, kind: &str, range: &RangeToken, class_name: &str);
    fn remove_annotation(&mut self, range: &RangeToken, kind: &str);
    fn contents(&mut self) -> Vec<&mut dyn ContentFrame>;
    fn on_relocated(&mut self, listener: Box<dyn FnMut(Relocation)>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct AppliedSettings {
    font_size: Option<u32>,
    flow: Option<FlowMode>,
    spread: Option<ColumnMode>,
}

pub struct RenderingBridge {
    handle: Option<Box<dyn Rendition>>,
    applied: AppliedSettings,
    relocations: RelocationSlot,
}

impl Default for RenderingBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingBridge {
    pub fn new() -> Self {
        Self {
            handle: None,
            applied: AppliedSettings::default(),
            relocations: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    /// Takes ownership of a freshly mounted engine handle and brings it in
    /// line with the session: settings, stored highlights, relocation events.
    pub fn attach(
        &mut self,
        handle: Box<dyn Rendition>,
        settings: &ReadingSettings,
        highlights: &[Highlight],
    ) {
        self.handle = Some(handle);
        self.applied = AppliedSettings::default();
        self.apply_settings(settings);
        for highlight in highlights {
            self.mark_highlight(&highlight.cfi_range);
        }
        self.register_relocation_listener(self.relocations.clone());
        log::debug!("Rendition attached with {} highlights", highlights.len());
    }

    /// Releases the handle. Its listener keeps the old slot, so late events
    /// from a detached engine never reach the next one.
    pub fn detach(&mut self) -> Option<Box<dyn Rendition>> {
        self.applied = AppliedSettings::default();
        self.relocations = Rc::new(RefCell::new(None));
        self.handle.take()
    }

    /// Pushes only what differs from the last applied state. The spread is
    /// suppressed while scrolled and reasserted on return to paginated.
    pub fn apply_settings(&mut self, settings: &ReadingSettings) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        if self.applied.font_size != Some(settings.font_size) {
            handle.set_font_size(settings.font_size);
            self.applied.font_size = Some(settings.font_size);
        }
        if self.applied.flow != Some(settings.flow) {
            handle.set_flow(settings.flow);
            self.applied.flow = Some(settings.flow);
        }
        let spread = settings.effective_columns();
        if self.applied.spread != spread {
            if let Some(columns) = spread {
                handle.set_spread(columns);
            }
            self.applied.spread = spread;
        }
    }

    /// Routes engine relocation events into `slot`.
    pub fn register_relocation_listener(&mut self, slot: RelocationSlot) {
        if let Some(handle) = self.handle.as_mut() {
            let sink = slot.clone();
            handle.on_relocated(Box::new(move |relocation| {
                *sink.borrow_mut() = Some(relocation);
            }));
        }
        self.relocations = slot;
    }

    /// Most recent relocation since the last call, older ones are gone.
    pub fn take_relocation(&self) -> Option<Relocation> {
        self.relocations.borrow_mut().take()
    }

    pub fn navigate(&mut self, direction: NavDirection) {
        if let Some(handle) = self.handle.as_mut() {
            match direction {
                NavDirection::Previous => handle.prev(),
                NavDirection::Next => handle.next(),
            }
        }
    }

    pub fn go_to(&mut self, position: &ReadingPosition) {
        if let Some(handle) = self.handle.as_mut() {
            handle.display(position);
        }
    }

    pub fn mark_highlight(&mut self, range: &RangeToken) {
        if let Some(handle) = self.handle.as_mut() {
            handle.add_annotation(HIGHLIGHT_ANNOTATION, range, HIGHLIGHT_CLASS);
        }
    }

    pub fn unmark_highlight(&mut self, range: &RangeToken) {
        if let Some(handle) = self.handle.as_mut() {
            handle.remove_annotation(range, HIGHLIGHT_ANNOTATION);
        }
    }

    /// Selection of the first content frame holding a non-empty range.
    pub fn current_selection(&mut self) -> Option<TextSelection> {
        let handle = self.handle.as_mut()?;
        handle
            .contents()
            .into_iter()
            .find_map(|frame| frame.selection())
    }

    pub fn clear_selection(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            for frame in handle.contents() {
                frame.clear_selection();
            }
        }
    }
}
