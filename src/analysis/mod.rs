//! Aggregation engine.
//!
//! Everything here is a pure function over immutable record snapshots.
//! Nothing performs I/O and nothing fails on missing or empty data: gaps
//! surface as the "Unknown Location" sentinel, zero-filled averages, or
//! `None` for "no data".

pub mod aggregator;
pub mod journal;
pub mod overview;
pub mod scoring;

pub use aggregator::*;
pub use journal::{dominant_emotion, emotion_distribution, highlights, EmotionCount};
pub use overview::{journey_overview, JourneyOverview};
pub use scoring::{
    environment_profiles, harmony_score, harmony_score_with, harmony_timeline, normalize,
    EnvironmentProfile, HarmonyField, HarmonyPoint, NormalizationScales,
};
