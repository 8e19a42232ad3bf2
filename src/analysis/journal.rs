//! Journal statistics: emotion frequencies and highlight moments.

use crate::models::{Emotion, JournalEntry};
use serde::Serialize;

/// How often an emotion was tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: usize,
}

/// Count emotion tags across entries, in order of first appearance.
pub fn emotion_distribution(entries: &[JournalEntry]) -> Vec<EmotionCount> {
    let mut counts: Vec<EmotionCount> = Vec::new();

    for emotion in entries.iter().flat_map(|entry| entry.emotions.iter()) {
        match counts.iter_mut().find(|c| c.emotion == *emotion) {
            Some(existing) => existing.count += 1,
            None => counts.push(EmotionCount {
                emotion: *emotion,
                count: 1,
            }),
        }
    }

    counts
}

/// The most frequently tagged emotion; earliest seen wins a tie.
pub fn dominant_emotion(entries: &[JournalEntry]) -> Option<Emotion> {
    let mut best: Option<EmotionCount> = None;
    for candidate in emotion_distribution(entries) {
        if best.map_or(true, |b| candidate.count > b.count) {
            best = Some(candidate);
        }
    }
    best.map(|b| b.emotion)
}

/// Entries marked as highlight moments, in input order.
pub fn highlights(entries: &[JournalEntry]) -> Vec<JournalEntry> {
    entries
        .iter()
        .filter(|entry| entry.highlight_moment)
        .cloned()
        .collect()
}
