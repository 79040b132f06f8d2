//! Summary extraction: one structured analysis per completed session.
//!
//! The provider is asked for strict JSON; whatever comes back is
//! fence-stripped, parsed and coarsely validated. Any failure resolves
//! to `SummaryResult::fallback()` so callers never see an error from
//! this path.

use tracing::warn;

use crate::models::{ChatMessage, MessageRole, SummaryResult, Track};

pub fn build_summary_prompt(history: &[ChatMessage], track: Track) -> String {
    let transcript = history
        .iter()
        .map(|m| match m.role {
            MessageRole::User => format!("사용자: {}", m.content),
            MessageRole::Ai => format!("상담사: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "다음은 '{}' 주제의 사전 상담 대화 전체입니다. 대화를 분석해 아래 형식의 JSON만 \
         출력하세요. 다른 텍스트나 코드 블록 없이 JSON 객체 하나만 출력합니다.\n\
         {{\"pattern_tags\": [3~5개의 짧은 한국어 태그], \"rhythm_score\": 0에서 100 사이의 정수, \
         \"summary_text\": \"2~3문장 요약\", \"main_concern\": \"핵심 고민 한 줄\"}}\n\n{}",
        track.label(),
        transcript
    )
}

/// Strip a Markdown code fence if the provider wrapped its JSON in one.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the fence line ("```json" or bare "```") and the closing fence.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse and validate the provider's output. `None` means the caller
/// should substitute the fallback.
pub fn parse_summary(raw: &str) -> Option<SummaryResult> {
    let cleaned = strip_code_fences(raw);

    let summary: SummaryResult = match serde_json::from_str(cleaned) {
        Ok(s) => s,
        Err(e) => {
            warn!("Summary output was not valid JSON: {}", e);
            return None;
        }
    };

    if !(0..=100).contains(&summary.rhythm_score) {
        warn!("Summary rhythm_score out of range: {}", summary.rhythm_score);
        return None;
    }
    if summary.pattern_tags.is_empty() || summary.summary_text.is_empty() {
        warn!("Summary missing required fields");
        return None;
    }

    Some(summary)
}

pub fn parse_summary_or_fallback(raw: &str) -> SummaryResult {
    parse_summary(raw).unwrap_or_else(SummaryResult::fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{"pattern_tags":["수면 부족","카페인"],"rhythm_score":80,"summary_text":"수면 리듬이 흔들리고 있습니다.","main_concern":"불면"}"#;

    #[test]
    fn test_parses_well_formed_json() {
        let summary = parse_summary(WELL_FORMED).unwrap();
        assert_eq!(summary.rhythm_score, 80);
        assert_eq!(summary.pattern_tags, vec!["수면 부족", "카페인"]);
        assert_eq!(summary.main_concern, "불면");
    }

    #[test]
    fn test_strips_code_fence() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        let summary = parse_summary(&fenced).unwrap();
        assert_eq!(summary.rhythm_score, 80);

        let bare_fence = format!("```\n{}\n```", WELL_FORMED);
        assert!(parse_summary(&bare_fence).is_some());
    }

    #[test]
    fn test_malformed_text_yields_fallback() {
        let summary = parse_summary_or_fallback("not json");
        assert_eq!(summary, SummaryResult::fallback());
        assert_eq!(summary.rhythm_score, 50);
        assert_eq!(summary.pattern_tags, vec!["분석 실패"]);
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let raw = r#"{"pattern_tags":["a"],"rhythm_score":140,"summary_text":"x","main_concern":"y"}"#;
        assert!(parse_summary(raw).is_none());
    }

    #[test]
    fn test_missing_tags_rejected() {
        let raw = r#"{"pattern_tags":[],"rhythm_score":60,"summary_text":"x","main_concern":"y"}"#;
        assert!(parse_summary(raw).is_none());
    }

    #[test]
    fn test_prompt_contains_transcript_and_topic() {
        let history = vec![
            ChatMessage::user("잠을 못 자요"),
            ChatMessage::ai("언제부터 그러셨나요?"),
        ];
        let prompt = build_summary_prompt(&history, Track::Sleep);

        assert!(prompt.contains("수면 리듬"));
        assert!(prompt.contains("사용자: 잠을 못 자요"));
        assert!(prompt.contains("상담사: 언제부터 그러셨나요?"));
        assert!(prompt.contains("rhythm_score"));
    }
}
