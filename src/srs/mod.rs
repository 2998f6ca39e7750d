mod engine;
mod index;
mod question;
mod record;
mod skill;

pub use engine::{
    Clock,
    SrsEngine,
    DEFAULT_QUESTION_OPTIONS,
};
pub use index::{
    Iter,
    RankedSet,
    SchedulingKey,
};
pub use question::{
    sample_distractor_ranks,
    Question,
    QuestionItem,
    QuestionMode,
};
pub use record::SrsRecord;
pub use skill::{
    review_interval_secs,
    Grade,
    Skill,
    SkillKind,
};
