pub mod config;
pub mod core;
pub mod dictionary;
pub mod learning;
pub mod parser;
pub mod persistence;
pub mod segmentation;
pub mod srs;
pub mod store;
pub mod subtitle;

#[cfg(test)]
mod testing;

pub use crate::core::{
    ActiveSubtitle,
    ChineseVariant,
    Entry,
    KikitoriError,
    Language,
};
pub use config::Settings;
pub use learning::{
    LearningState,
    LearningStates,
};
pub use srs::{
    Grade,
    Question,
    SkillKind,
    SrsEngine,
};
pub use subtitle::{
    Line,
    SubtitleContainer,
    SubtitleSession,
};
