use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{ColumnMode, DEFAULT_FONT_SIZE, FlowMode, MIN_FONT_SIZE, ReadingSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_font_size: u32,
    pub font_size_step: u32,
    pub start_flow_mode: FlowMode,
    pub start_column_mode: ColumnMode,
    pub preferred_tts_engine: Option<String>,
    pub tts_engine_args: Vec<String>,
    pub state_db: Option<PathBuf>,
}

impl Settings {
    pub fn merge(&mut self, other: Self) {
        self.default_font_size = other.default_font_size;
        self.font_size_step = other.font_size_step;
        self.start_flow_mode = other.start_flow_mode;
        self.start_column_mode = other.start_column_mode;
        if other.preferred_tts_engine.is_some() {
            self.preferred_tts_engine = other.preferred_tts_engine;
        }
        if !other.tts_engine_args.is_empty() {
            self.tts_engine_args = other.tts_engine_args;
        }
        if other.state_db.is_some() {
            self.state_db = other.state_db;
        }
    }

    /// Settings a new reading session starts with.
    pub fn reading_settings(&self) -> ReadingSettings {
        ReadingSettings {
            font_size: self.default_font_size.max(MIN_FONT_SIZE),
            flow: self.start_flow_mode,
            columns: self.start_column_mode,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            font_size_step: 2,
            start_flow_mode: FlowMode::Paginated,
            start_column_mode: ColumnMode::Auto,
            preferred_tts_engine: None,
            tts_engine_args: Vec::new(),
            state_db: None,
        }
    }
}
