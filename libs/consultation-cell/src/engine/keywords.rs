//! Keyword containment matching over inbound messages.
//!
//! Matching is uniformly case-insensitive: both the configured keywords
//! and the message are lowercased before the containment test. The
//! original product mixed case-sensitive and case-insensitive checks per
//! set; normalizing is a documented deviation.

/// Named set of literal substrings tested any-of against a message.
/// Immutable product configuration, not user data.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    /// True iff any keyword in the set is a substring of the message.
    /// Pure and synchronous; runs before any provider call so that
    /// red-flag detection costs no latency and no tokens.
    pub fn matches(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl<'a> From<&'a [&'a str]> for KeywordSet {
    fn from(keywords: &'a [&'a str]) -> Self {
        Self::new(keywords.iter().copied())
    }
}

/// Symptoms implying acute medical risk. Any hit redirects to emergency
/// services without ever reaching the model.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "가슴 통증",
    "가슴이 아파",
    "가슴이 답답하고 숨",
    "호흡 곤란",
    "호흡곤란",
    "숨쉬기 힘들",
    "숨이 안 쉬어",
    "마비",
    "의식을 잃",
    "의식이 없",
    "피를 토",
    "객혈",
    "고열",
    "경련",
    "발작",
    "chest pain",
    "can't breathe",
    "difficulty breathing",
    "paralysis",
    "unconscious",
    "coughing blood",
    "seizure",
];

/// Phrases asking for a diagnosis or treatment the chat must not give
/// before login.
pub const MEDICAL_QUESTION_KEYWORDS: &[&str] = &[
    "무슨 약",
    "어떤 약",
    "약을 먹어야",
    "진단해",
    "진단 좀",
    "처방",
    "치료법",
    "what medicine",
    "diagnose me",
    "prescribe",
];

/// Affirmative phrases; meaningful only right after a booking offer.
pub const RESERVATION_KEYWORDS: &[&str] = &[
    "네 예약",
    "예약할게",
    "예약해 주세요",
    "예약해주세요",
    "예약 부탁",
    "좋아요 예약",
    "yes, book",
    "please book",
    "book it",
];

/// Free-form bodily complaints that get empathy plus a login prompt
/// rather than open-ended advice.
pub const CONCERN_KEYWORDS: &[&str] = &[
    "너무 아파",
    "계속 아프",
    "간지러워",
    "가려워서",
    "따가워",
    "붓고",
    "쓰라려",
    "it hurts",
    "so itchy",
];

/// Phrases the assistant uses when offering to book; the reservation
/// confirmation override fires only when the prior assistant message
/// contained one of these.
pub const BOOKING_OFFER_PHRASES: &[&str] = &[
    "예약을 도와드릴까요",
    "예약을 잡아드릴까요",
    "예약하시겠어요",
    "상담 예약",
    "would you like to book",
    "shall i book",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_any_keyword() {
        let set = KeywordSet::from(EMERGENCY_KEYWORDS);
        assert!(set.matches("어제부터 가슴 통증이 있어요"));
        assert!(set.matches("숨쉬기 힘들어요"));
        assert!(!set.matches("피부가 건조해요"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let set = KeywordSet::from(EMERGENCY_KEYWORDS);
        assert!(set.matches("I have CHEST PAIN right now"));
        assert!(set.matches("Chest Pain since morning"));
    }

    #[test]
    fn test_empty_message_matches_nothing() {
        let set = KeywordSet::from(RESERVATION_KEYWORDS);
        assert!(!set.matches(""));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = KeywordSet::new(Vec::<String>::new());
        assert!(set.is_empty());
        assert!(!set.matches("가슴 통증"));
    }
}
