use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::{
        ChineseVariant,
        KikitoriError,
    },
    persistence::{
        get_data_file_path,
        load_json_or_default,
        save_json_to,
    },
    subtitle::IngestOptions,
};

pub const SETTINGS_FILE: &str = "settings.json";

/// Padding applied around subtitle cues, expressed in frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub frame_rate_ms: i64,
    pub start_multiplier: i64,
    pub end_multiplier: i64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self { frame_rate_ms: 30, start_multiplier: 3, end_multiplier: 8 }
    }
}

impl TimingSettings {
    pub fn lead_in_ms(&self) -> i64 {
        self.frame_rate_ms * self.start_multiplier
    }

    pub fn tail_ms(&self) -> i64 {
        self.frame_rate_ms * self.end_multiplier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timing: TimingSettings,
    pub remove_hearing_impaired: bool,
    /// Step used when the user nudges the subtitle offset.
    pub shift_step_ms: i64,
    /// Number of distractors requested per question.
    pub question_options: usize,
    pub chinese_variant: ChineseVariant,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timing: TimingSettings::default(),
            remove_hearing_impaired: false,
            shift_step_ms: 100,
            question_options: 3,
            chinese_variant: ChineseVariant::default(),
        }
    }
}

impl Settings {
    /// Reads `settings.json` from the app data directory, falling back to
    /// defaults when it is missing or unreadable.
    pub fn load() -> Self {
        Self::load_from(&get_data_file_path(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        load_json_or_default(path)
    }

    pub fn save(&self) -> Result<(), KikitoriError> {
        self.save_to(&get_data_file_path(SETTINGS_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), KikitoriError> {
        save_json_to(self, path)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            timing: self.timing,
            remove_hearing_impaired: self.remove_hearing_impaired,
            chinese_variant: self.chinese_variant,
            converter: None,
        }
    }
}
