use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the reader currently is. `Start` is only used before the engine has
/// reported a real location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadingPosition {
    #[default]
    Start,
    Token(String),
}

impl ReadingPosition {
    pub fn token(&self) -> Option<&str> {
        match self {
            ReadingPosition::Start => None,
            ReadingPosition::Token(token) => Some(token),
        }
    }
}

/// Opaque engine identifier for a span of rendered text (an EPUB CFI range).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeToken(pub String);

impl RangeToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(rename = "cfiRange")]
    pub cfi_range: RangeToken,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    #[default]
    Paginated,
    Scrolled,
}

impl FlowMode {
    pub fn toggled(self) -> Self {
        match self {
            FlowMode::Paginated => FlowMode::Scrolled,
            FlowMode::Scrolled => FlowMode::Paginated,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowMode::Paginated => "paginated",
            FlowMode::Scrolled => "scrolled",
        }
    }
}

/// `Auto` lets the engine lay out two columns when there is room, `None`
/// forces a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMode {
    #[default]
    Auto,
    None,
}

impl ColumnMode {
    pub fn toggled(self) -> Self {
        match self {
            ColumnMode::Auto => ColumnMode::None,
            ColumnMode::None => ColumnMode::Auto,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnMode::Auto => "auto",
            ColumnMode::None => "none",
        }
    }
}

pub const MIN_FONT_SIZE: u32 = 12;
pub const DEFAULT_FONT_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingSettings {
    pub font_size: u32,
    pub flow: FlowMode,
    pub columns: ColumnMode,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            flow: FlowMode::Paginated,
            columns: ColumnMode::Auto,
        }
    }
}

impl ReadingSettings {
    /// Spread the engine should currently show; suppressed while scrolled.
    pub fn effective_columns(&self) -> Option<ColumnMode> {
        match self.flow {
            FlowMode::Paginated => Some(self.columns),
            FlowMode::Scrolled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub current: u32,
    pub total: u32,
}

impl PageDescriptor {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub position: ReadingPosition,
    pub page: PageDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSelection {
    pub range: RangeToken,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechState {
    pub is_speaking: bool,
}

/// Signal handed to the routing layer when the reader leaves the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    Library,
}
