//! Track classification from the first user message.
//!
//! Deterministic keyword heuristic, no provider call. Consulted only
//! when the caller supplies no track; once a track is set the caller
//! echoes it back for the rest of the session and this module is never
//! asked again.

use crate::models::Track;

const SKIN_KEYWORDS: &[&str] = &[
    "피부", "여드름", "트러블", "두드러기", "건조", "아토피", "주름", "skin", "acne", "rash",
];

const EYE_KEYWORDS: &[&str] = &[
    "눈", "시력", "안구", "충혈", "침침", "눈물", "eye", "vision", "blurry",
];

const SLEEP_KEYWORDS: &[&str] = &[
    "잠", "수면", "불면", "피곤", "피로", "새벽에 깨", "sleep", "insomnia", "tired",
];

const DIGESTION_KEYWORDS: &[&str] = &[
    "소화", "속이", "배가", "위장", "변비", "설사", "더부룩", "digestion", "stomach", "bloated",
];

const MOOD_KEYWORDS: &[&str] = &[
    "우울", "불안", "스트레스", "무기력", "짜증", "마음이", "anxious", "depressed", "stress",
];

/// Fixed priority order; the first track with any keyword hit wins, so
/// classification is deterministic for a given message.
const TRACK_KEYWORDS: &[(Track, &[&str])] = &[
    (Track::Skin, SKIN_KEYWORDS),
    (Track::Eye, EYE_KEYWORDS),
    (Track::Sleep, SLEEP_KEYWORDS),
    (Track::Digestion, DIGESTION_KEYWORDS),
    (Track::Mood, MOOD_KEYWORDS),
];

/// Classify a message into a track. Unmatched input maps to the default
/// `General` track rather than failing.
pub fn classify(message: &str) -> Track {
    let message = message.to_lowercase();

    for (track, keywords) in TRACK_KEYWORDS {
        if keywords.iter().any(|k| message.contains(k)) {
            return *track;
        }
    }

    Track::General
}
