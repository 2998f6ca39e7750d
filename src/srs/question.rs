use rand::{
    seq::SliceRandom,
    Rng,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::skill::SkillKind;
use crate::dictionary::DictEntry;

/// Above this many distractors a full shuffle of the candidate ranks is
/// cheaper than rejection-free sequential sampling.
const SHUFFLE_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionMode {
    /// The term is due.
    Exam,
    /// Nothing is due yet; practising the earliest upcoming term.
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    pub term: String,
    pub entries: Vec<DictEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: QuestionItem,
    pub options: Vec<QuestionItem>,
    pub mode: QuestionMode,
    pub skill: SkillKind,
}

/// Draws `count` distinct ranks from `1..size`, rank 0 being the question itself.
pub fn sample_distractor_ranks<R: Rng + ?Sized>(size: usize, count: usize, rng: &mut R) -> Vec<usize> {
    let count = count.min(size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    if count > SHUFFLE_THRESHOLD {
        let mut ranks: Vec<usize> = (1..size).collect();
        ranks.shuffle(rng);
        ranks.truncate(count);
        return ranks;
    }

    // Pick a position among the ranks not taken yet, then map it back onto
    // the full range by stepping over the taken ones in ascending order.
    let mut chosen: Vec<usize> = Vec::with_capacity(count);
    for taken in 0..count {
        let mut rank = rng.random_range(1..=size - 1 - taken);
        for &previous in &chosen {
            if previous <= rank {
                rank += 1;
            } else {
                break;
            }
        }
        let position = chosen.partition_point(|&previous| previous < rank);
        chosen.insert(position, rank);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sampled_ranks_are_distinct_and_in_range() {
        let mut rng = rand::rng();
        for size in 1..40 {
            for count in 0..45 {
                let ranks = sample_distractor_ranks(size, count, &mut rng);
                assert_eq!(ranks.len(), count.min(size - 1));
                assert!(ranks.iter().all(|&rank| rank >= 1 && rank < size));
                assert_eq!(ranks.iter().collect::<HashSet<_>>().len(), ranks.len());
            }
        }
    }

    #[test]
    fn test_large_samples_use_shuffle() {
        let ranks = sample_distractor_ranks(500, 150, &mut rand::rng());
        assert_eq!(ranks.len(), 150);
        assert!(ranks.iter().all(|&rank| (1..500).contains(&rank)));
        assert_eq!(ranks.iter().collect::<HashSet<_>>().len(), 150);

        let all = sample_distractor_ranks(120, 500, &mut rand::rng());
        let mut sorted = all.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..120).collect::<Vec<_>>());
    }
}
