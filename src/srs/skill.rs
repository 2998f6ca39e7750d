use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::KikitoriError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Interval growth per level: level 1 waits one day, level 2 1.4 days...
const INTERVAL_BASE: f64 = 1.4;

/// Reviews are never pushed further out than a century.
pub const MAX_INTERVAL_SECS: i64 = 100 * 365 * 86_400;

/// Stored as its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SkillKind {
    Writing = 0,
    Conveyance = 1,
    Translation = 2,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::Writing, SkillKind::Conveyance, SkillKind::Translation];
}

impl From<SkillKind> for u8 {
    fn from(kind: SkillKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for SkillKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SkillKind::Writing),
            1 => Ok(SkillKind::Conveyance),
            2 => Ok(SkillKind::Translation),
            other => Err(format!("unknown skill {}", other)),
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillKind::Writing => "Writing",
            SkillKind::Conveyance => "Conveyance",
            SkillKind::Translation => "Translation",
        };
        f.write_str(name)
    }
}

/// Review grade on the 0..=5 SM-2 scale. Grades of 3 and up count as recalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Grade(u8);

impl Grade {
    pub const CORRECT: Grade = Grade(5);
    pub const WRONG: Grade = Grade(2);
    pub const PASS_THRESHOLD: u8 = 3;

    pub fn new(value: u8) -> Result<Self, KikitoriError> {
        if value > 5 {
            return Err(KikitoriError::InvalidGrade(value));
        }
        Ok(Grade(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_pass(&self) -> bool {
        self.0 >= Self::PASS_THRESHOLD
    }
}

impl TryFrom<u8> for Grade {
    type Error = KikitoriError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

/// Review state of one skill of one term. Times are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: SkillKind,
    pub level: u32,
    pub last_updated: i64,
    pub next_review_time: i64,
}

impl Skill {
    /// A fresh skill, due immediately.
    pub fn new(name: SkillKind, now: i64) -> Self {
        Self { name, level: 0, last_updated: now, next_review_time: now }
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_review_time <= now
    }

    pub fn apply_grade(&mut self, grade: Grade, now: i64) {
        if grade.is_pass() {
            self.level = self.level.saturating_add(1);
            self.next_review_time = now.saturating_add(review_interval_secs(self.level));
        } else {
            self.level = self.level.saturating_sub(1);
            self.next_review_time = now;
        }
        self.last_updated = now;
    }
}

pub fn review_interval_secs(level: u32) -> i64 {
    let days = INTERVAL_BASE.powf(f64::from(level.saturating_sub(1)));
    (days * SECONDS_PER_DAY).round().min(MAX_INTERVAL_SECS as f64) as i64
}
