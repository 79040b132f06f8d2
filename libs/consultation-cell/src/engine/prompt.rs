//! Prompt composition for the text-generation provider.
//!
//! One text prompt per call: a phase/track/intent-keyed system
//! instruction, the prior history replayed in order as labeled lines,
//! the new user message, and a fixed role cue so the model continues as
//! the counselor.

use crate::engine::policy::Phase;
use crate::models::{ChatMessage, EntryIntent, MessageRole, Track};

const USER_LABEL: &str = "사용자";
const ASSISTANT_LABEL: &str = "상담사";

fn base_instruction(track: Track) -> String {
    format!(
        "당신은 아람 클리닉의 사전 상담사입니다. 지금 대화의 주제는 '{}'입니다. \
         따뜻하고 간결하게 답하되, 진단이나 처방은 하지 말고 생활 습관 관점에서 \
         증상을 함께 정리해 주세요. 답변은 세 문장 이내로 합니다.",
        track.label()
    )
}

fn intent_instruction(entry_intent: Option<EntryIntent>) -> &'static str {
    match entry_intent {
        Some(EntryIntent::SymptomCheck) => {
            " 사용자는 증상 확인을 위해 들어왔습니다. 증상이 언제부터, 어떤 상황에서 나타나는지 한 가지씩 물어보세요."
        }
        Some(EntryIntent::Booking) => {
            " 사용자는 예약에 관심이 있습니다. 대화가 자연스러울 때 상담 예약을 도와드릴까요 하고 제안하세요."
        }
        Some(EntryIntent::GeneralQuestion) => {
            " 사용자는 가벼운 질문으로 시작했습니다. 부담 없이 답하되 필요하면 상담 예약을 안내하세요."
        }
        None => "",
    }
}

fn phase_instruction(phase: Phase) -> &'static str {
    match phase {
        Phase::Normal => "",
        Phase::SoftGate => {
            " 이번 답변 끝에는 로그인하면 상담 내용을 저장하고 이어갈 수 있다는 점을 한 문장으로 안내하세요."
        }
        Phase::HardStop => {
            " 지금까지의 대화를 마무리합니다. 사용자가 말한 증상과 생활 패턴을 2~3문장으로 정리하고, \
             정확한 확인을 위해 로그인 후 의료진 상담을 예약하도록 안내하세요."
        }
        // Post-hard-stop never reaches the composer; the engine answers
        // with a fixed message before any prompt is built.
        Phase::PostHardStop => "",
    }
}

/// Serialize history oldest-first as labeled lines. When the history
/// exceeds `max_messages` the oldest messages are dropped first; the
/// tail is always kept intact.
fn render_history(history: &[ChatMessage], max_messages: usize) -> String {
    let start = history.len().saturating_sub(max_messages);

    history[start..]
        .iter()
        .map(|m| match m.role {
            MessageRole::User => format!("{}: {}", USER_LABEL, m.content),
            MessageRole::Ai => format!("{}: {}", ASSISTANT_LABEL, m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn compose(
    phase: Phase,
    track: Track,
    entry_intent: Option<EntryIntent>,
    history: &[ChatMessage],
    message: &str,
    max_history_messages: usize,
) -> String {
    let mut prompt = base_instruction(track);
    prompt.push_str(intent_instruction(entry_intent));
    prompt.push_str(phase_instruction(phase));
    prompt.push_str("\n\n");

    let rendered = render_history(history, max_history_messages);
    if !rendered.is_empty() {
        prompt.push_str(&rendered);
        prompt.push('\n');
    }

    prompt.push_str(&format!("{}: {}\n", USER_LABEL, message));
    prompt.push_str(&format!("{}:", ASSISTANT_LABEL));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("요즘 잠을 못 자요"),
            ChatMessage::ai("언제부터 그러셨나요?"),
        ]
    }

    #[test]
    fn test_history_replayed_in_order() {
        let prompt = compose(
            Phase::Normal,
            Track::Sleep,
            None,
            &sample_history(),
            "일주일쯤 됐어요",
            20,
        );

        let first = prompt.find("사용자: 요즘 잠을 못 자요").unwrap();
        let second = prompt.find("상담사: 언제부터 그러셨나요?").unwrap();
        let third = prompt.find("사용자: 일주일쯤 됐어요").unwrap();
        assert!(first < second && second < third);
        assert!(prompt.ends_with("상담사:"));
    }

    #[test]
    fn test_track_appears_in_instruction() {
        let prompt = compose(Phase::Normal, Track::Skin, None, &[], "피부가 가려워요", 20);
        assert!(prompt.contains("피부 고민"));
    }

    #[test]
    fn test_oldest_messages_dropped_first() {
        let history: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("메시지 {}", i)))
            .collect();

        let prompt = compose(Phase::Normal, Track::General, None, &history, "마지막", 4);

        assert!(!prompt.contains("메시지 0"));
        assert!(!prompt.contains("메시지 5"));
        assert!(prompt.contains("메시지 6"));
        assert!(prompt.contains("메시지 9"));
    }

    #[test]
    fn test_soft_gate_and_intent_change_instruction() {
        let normal = compose(Phase::Normal, Track::General, None, &[], "안녕하세요", 20);
        let gated = compose(Phase::SoftGate, Track::General, None, &[], "안녕하세요", 20);
        let booking = compose(
            Phase::Normal,
            Track::General,
            Some(EntryIntent::Booking),
            &[],
            "안녕하세요",
            20,
        );

        assert_ne!(normal, gated);
        assert!(gated.contains("로그인"));
        assert!(booking.contains("예약"));
    }
}
