use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    index::SchedulingKey,
    skill::{
        Grade,
        Skill,
        SkillKind,
    },
};
use crate::core::Language;

pub const SRS_PREFIX: &str = "srs";

/// Review state of one term across every skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsRecord {
    pub character: String,
    pub lang: Language,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(with = "skill_pairs")]
    pub skills: BTreeMap<SkillKind, Skill>,
}

impl SrsRecord {
    pub fn new(character: impl Into<String>, lang: Language, now: i64) -> Self {
        Self {
            character: character.into(),
            lang,
            created_at: now,
            updated_at: now,
            skills: SkillKind::ALL.iter().map(|&kind| (kind, Skill::new(kind, now))).collect(),
        }
    }

    pub fn store_key(lang: Language, term: &str) -> String {
        format!("{}/{}/{}", SRS_PREFIX, lang.code(), term)
    }

    pub fn store_prefix(lang: Language) -> String {
        format!("{}/{}/", SRS_PREFIX, lang.code())
    }

    pub fn key(&self) -> String {
        Self::store_key(self.lang, &self.character)
    }

    pub fn scheduling_key(&self, kind: SkillKind) -> Option<SchedulingKey> {
        self.skills.get(&kind).map(|skill| SchedulingKey::new(skill.next_review_time, self.character.clone()))
    }

    /// Grades one skill, creating it first if an older record lacks it.
    pub fn apply_grade(&mut self, kind: SkillKind, grade: Grade, now: i64) {
        self.skills.entry(kind).or_insert_with(|| Skill::new(kind, now)).apply_grade(grade, now);
        self.updated_at = now;
    }
}

/// Skills are stored as `[[kind, skill], ...]`.
mod skill_pairs {
    use std::collections::BTreeMap;

    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };

    use super::{
        Skill,
        SkillKind,
    };

    pub fn serialize<S: Serializer>(skills: &BTreeMap<SkillKind, Skill>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(skills.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<SkillKind, Skill>, D::Error> {
        let pairs = Vec::<(SkillKind, Skill)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
