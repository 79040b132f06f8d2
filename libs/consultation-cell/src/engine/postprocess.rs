//! Response finalization: fixed product copy, control markers, and the
//! post-generation decision ladder.

use crate::engine::keywords::KeywordSet;
use crate::engine::policy::Phase;

/// In-band token the client UI watches for to open the booking sheet.
pub const RESERVATION_MARKER: &str = "[RESERVATION_REQUEST]";

/// Red-flag redirect. Always starts with the emergency marker so the
/// client can render it distinctly.
pub const EMERGENCY_MESSAGE: &str = "🚨 말씀하신 증상은 응급 상황일 수 있습니다. \
    지금 바로 119에 연락하시거나 가까운 응급실을 방문해 주세요. \
    이 채팅은 응급 의료 상황을 대신할 수 없습니다.";

pub const MEDICAL_QUESTION_MESSAGE: &str = "진단이나 처방에 대한 안내는 채팅에서 드리기 어려워요. \
    로그인 후 의료진 상담을 예약하시면 정확한 안내를 받으실 수 있습니다.";

pub const CONCERN_LOGIN_MESSAGE: &str = "많이 불편하셨겠어요. 증상을 정확히 살펴보려면 \
    의료진의 확인이 필요합니다. 로그인하시면 맞춤 상담과 예약을 도와드릴 수 있어요.";

pub const SESSION_CONCLUDED_MESSAGE: &str = "이번 사전 상담은 마무리되었습니다. \
    로그인하시면 상담 요약을 저장하고 예약을 이어서 진행하실 수 있어요.";

pub const UNAVAILABLE_MESSAGE: &str =
    "죄송해요, 지금은 답변을 드리기 어려워요. 잠시 후 다시 시도해 주세요.";

pub const RESERVATION_CONFIRMED_MESSAGE: &str = "네, 예약을 도와드릴게요. \
    아래에서 원하시는 시간대를 선택해 주세요. [RESERVATION_REQUEST]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub require_login: bool,
    pub is_hard_stop: bool,
    pub reservation_requested: bool,
}

impl ControlFlags {
    pub fn login() -> Self {
        Self {
            require_login: true,
            ..Self::default()
        }
    }

    pub fn terminal() -> Self {
        Self {
            require_login: true,
            is_hard_stop: true,
            reservation_requested: false,
        }
    }
}

/// Post-generation steps of the decision ladder. The pre-generation
/// overrides (emergency, medical/concern redirect, hard stop, post hard
/// stop) are applied by the engine before the provider is ever called;
/// by the time text reaches here the phase is Normal or SoftGate.
///
/// First match wins:
/// 1. reservation confirmation (current message affirms AND the prior
///    assistant message contained a booking offer) -> fixed confirmation
///    carrying the reservation marker;
/// 2. soft gate -> generated text unchanged, login flag set;
/// 3. reservation nudge turn reached -> generated text plus marker;
/// 4. passthrough.
pub fn finalize(
    phase: Phase,
    turn_count: u32,
    reservation_confirmed: bool,
    prior_assistant: Option<&str>,
    raw: String,
    booking_offers: &KeywordSet,
    reservation_nudge_turn: u32,
) -> (String, ControlFlags) {
    let offer_stood = prior_assistant
        .map(|m| booking_offers.matches(m))
        .unwrap_or(false);

    if reservation_confirmed && offer_stood {
        let flags = ControlFlags {
            reservation_requested: true,
            ..ControlFlags::default()
        };
        return (RESERVATION_CONFIRMED_MESSAGE.to_string(), flags);
    }

    if phase == Phase::SoftGate {
        return (raw, ControlFlags::login());
    }

    if turn_count >= reservation_nudge_turn {
        let flags = ControlFlags {
            reservation_requested: true,
            ..ControlFlags::default()
        };
        return (format!("{} {}", raw, RESERVATION_MARKER), flags);
    }

    (raw, ControlFlags::default())
}
