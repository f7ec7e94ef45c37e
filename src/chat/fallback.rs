//! Deterministic demo-fallback answers.
//!
//! When the backend is unreachable the chat answers from this fixed table
//! instead: the first topic whose keyword appears as a substring of the
//! query wins, scanning in declared order. Queries matching nothing get the
//! fixed not-found answer with no sources. The table text is the product's
//! onboarding Q&A corpus and is carried verbatim.

use crate::message::SourceRef;

/// One fixed topic of the demo corpus.
#[derive(Debug)]
pub struct DemoTopic {
    /// Substring that selects this topic.
    pub keyword: &'static str,
    /// The fixed answer body.
    pub answer: &'static str,
    /// Fixed citations, as (title, url) pairs.
    pub sources: &'static [(&'static str, &'static str)],
}

/// Answer returned when no topic keyword matches.
pub const NOT_FOUND_ANSWER: &str = "죄송합니다. 해당 질문에 대한 답변을 찾지 못했습니다.\n\n다음 주제로 질문해보시겠어요?\n- 연차 사용 방법\n- 재택근무 신청\n- 경조사 휴가\n- 건강검진 안내\n- 교육 및 자격증 지원";

/// The demo corpus. Scan order is significant: matching is
/// first-match-wins over this slice.
pub const TOPICS: &[DemoTopic] = &[
    DemoTopic {
        keyword: "연차",
        answer: "**📅 연차 발생 및 사용 안내**\n\n**발생 기준**\n• 입사 첫해: 월 1개씩 발생 (최대 11개)\n• 1년 근속 이후: 연 15일 발생\n• 3년 이상: 2년마다 1일 추가 (최대 25일)\n\n**신청 방법**\n1️⃣ HR Portal 로그인 → 전자결재\n2️⃣ 휴가신청서 작성\n3️⃣ 팀장 승인 후 사용\n\n**💡 중요 사항**\n• 당해연도 내 사용 원칙 (미사용시 소멸)\n• 미사용분 금전 보상 가능 (부득이한 사유)",
        sources: &[
            ("인사관리규정 - 연차휴가", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/123"),
            ("복리후생 가이드", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/456"),
            ("HR Portal 사용 매뉴얼", "https://lloydk.atlassian.net/wiki/spaces/IT/pages/789"),
            ("휴가 신청 절차", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/234"),
        ],
    },
    DemoTopic {
        keyword: "재택근무",
        answer: "**💻 재택근무 신청 가이드**\n\n**신청 자격**\n• 정규직 6개월 이상 근속\n• 재택 가능 직무 (팀장 확인 필요)\n\n**신청 절차**\n1️⃣ 전자결재 → 재택근무 신청서\n2️⃣ 팀장 승인 → 인사팀 최종 승인\n\n**운영 규칙**\n• 주 2회 이내 / 코어타임 10:00-16:00 준수\n• 온라인 상태 유지 필수\n• 화상회의 필수 참석\n\n**🔒 보안 준수사항**\n• 회사 노트북 + VPN 필수\n• 개인 PC 사용 금지",
        sources: &[
            ("재택근무 운영 지침", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/789"),
            ("정보보안 정책", "https://lloydk.atlassian.net/wiki/spaces/IT/pages/321"),
            ("VPN 접속 가이드", "https://lloydk.atlassian.net/wiki/spaces/IT/pages/654"),
            ("재택근무 FAQ", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/987"),
        ],
    },
    DemoTopic {
        keyword: "경조사",
        answer: "**🎉 경조사 휴가 및 경조금**\n\n**휴가 일수**\n• 본인 결혼: 5일\n• 배우자/부모 사망: 5일\n• 자녀 결혼: 1일\n• 조부모 사망: 2일\n\n**경조금 지급**\n• 본인 결혼: 20만원\n• 직계존속 사망: 10만원\n• 자녀 결혼: 10만원\n\n**신청 방법**\n1️⃣ 팀장 구두 보고\n2️⃣ HR Portal 경조사 휴가 신청\n3️⃣ 증빙서류 제출 (청첩장/부고장)",
        sources: &[
            ("복리후생 규정 - 경조사", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/654"),
            ("경조사 신청 절차", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/111"),
            ("경조금 지급 규정", "https://lloydk.atlassian.net/wiki/spaces/FIN/pages/222"),
        ],
    },
    DemoTopic {
        keyword: "건강검진",
        answer: "**🏥 건강검진 제도**\n\n**대상 및 주기**\n• 사무직: 2년마다 / 비사무직: 매년\n• 40세 이상: 종합검진 매년\n\n**지원 내역**\n• 기본 건강검진: 100% 회사 부담\n• 정밀검진: 50% 본인 부담\n• 배우자 검진: 70% 회사 지원\n\n**이용 방법**\n1️⃣ 인사팀 지정 병원 확인\n2️⃣ 본인이 직접 병원 예약\n3️⃣ 검진일 신분증 지참\n4️⃣ 결과지 인사팀 제출\n\n**✅ 검진 당일 유급휴가 1일 제공**",
        sources: &[
            ("건강검진 안내", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/987"),
            ("지정 병원 리스트", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/333"),
            ("건강검진 예약 방법", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/444"),
        ],
    },
    DemoTopic {
        keyword: "교육",
        answer: "**📚 교육 및 자기계발 지원**\n\n**사내 교육**\n• 신입 입문교육: 2주\n• 직무 전문교육: 분기별\n• 리더십 교육: 관리자 대상\n• 어학 교육: 희망자 대상\n\n**외부 교육 지원**\n• 업무 관련 교육: 100% 지원\n• 자격증 취득: 응시료/교재비 지원\n• 온라인 강의: 연 50만원 한도\n\n**신청 절차**\n1️⃣ 교육 신청서 작성\n2️⃣ 팀장 → 인사팀 승인\n3️⃣ 수료 후 증빙서류 제출\n\n**💰 자격증 보유 수당: 월 5~20만원**",
        sources: &[
            ("교육훈련 규정", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/741"),
            ("자격증 지원 안내", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/852"),
            ("교육 신청 방법", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/555"),
            ("온라인 교육 플랫폼 가이드", "https://lloydk.atlassian.net/wiki/spaces/IT/pages/666"),
        ],
    },
    DemoTopic {
        keyword: "급여",
        answer: "**💰 급여 및 복리후생**\n\n**급여 지급일**\n• 매월 25일 (주말/공휴일시 전일 지급)\n• 계좌이체 방식\n\n**급여 명세서**\n• HR Portal에서 확인 가능\n• 매월 25일 자동 업로드\n\n**포함 항목**\n• 기본급 + 직책수당\n• 식대 (20만원)\n• 교통비 (10만원)\n• 자격증 수당 (해당자)\n\n**💳 복지카드: 월 10만원 자동 충전**",
        sources: &[
            ("급여 지급 규정", "https://lloydk.atlassian.net/wiki/spaces/FIN/pages/100"),
            ("HR Portal 급여명세서 확인", "https://lloydk.atlassian.net/wiki/spaces/IT/pages/200"),
            ("복지카드 사용 안내", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/300"),
        ],
    },
    DemoTopic {
        keyword: "퇴사",
        answer: "**👋 퇴사 절차 안내**\n\n**사직 신청**\n• 최소 30일 전 사직서 제출\n• 전자결재 시스템 이용\n\n**퇴사 처리 순서**\n1️⃣ 사직서 제출 및 승인\n2️⃣ 업무 인수인계 (2주)\n3️⃣ 회사 자산 반납 (노트북, 명함 등)\n4️⃣ 퇴직금 정산\n5️⃣ 최종 근무일 확정\n\n**퇴직금**\n• 1년 이상 근속시 지급\n• 최종 근무일 기준 14일 이내 지급\n\n**📄 경력증명서: 인사팀 요청**",
        sources: &[
            ("퇴사 절차 안내", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/900"),
            ("인수인계 가이드", "https://lloydk.atlassian.net/wiki/spaces/HR/pages/910"),
            ("퇴직금 정산 규정", "https://lloydk.atlassian.net/wiki/spaces/FIN/pages/920"),
        ],
    },
];

/// Frequently-asked question prompts used to seed an empty transcript.
#[derive(Debug)]
pub struct FaqCategory {
    pub category: &'static str,
    pub icon: &'static str,
    pub questions: &'static [&'static str],
}

pub const FAQ: &[FaqCategory] = &[
    FaqCategory {
        category: "근태 관리",
        icon: "📅",
        questions: &[
            "연차는 어떻게 사용하나요?",
            "재택근무 신청 방법이 궁금해요",
            "경조사 휴가는 며칠인가요?",
        ],
    },
    FaqCategory {
        category: "복리후생",
        icon: "🎁",
        questions: &[
            "건강검진은 언제 받나요?",
            "교육 지원은 어떻게 받나요?",
            "급여는 언제 지급되나요?",
        ],
    },
    FaqCategory {
        category: "기타",
        icon: "❓",
        questions: &["퇴사 절차가 궁금합니다", "복지카드는 어떻게 사용하나요?"],
    },
];

/// Every FAQ prompt, in category order.
pub fn suggested_questions() -> impl Iterator<Item = &'static str> {
    FAQ.iter().flat_map(|category| category.questions.iter().copied())
}

/// First topic whose keyword is a substring of `query`, in table order.
#[must_use]
pub fn lookup(query: &str) -> Option<&'static DemoTopic> {
    TOPICS.iter().find(|topic| query.contains(topic.keyword))
}

/// Resolves a query to (answer text, citations); unmatched queries get the
/// fixed not-found answer with no sources.
#[must_use]
pub fn answer_for(query: &str) -> (&'static str, Vec<SourceRef>) {
    match lookup(query) {
        Some(topic) => {
            let sources = topic
                .sources
                .iter()
                .map(|(title, url)| SourceRef::new(*title, *url))
                .collect();
            (topic.answer, sources)
        }
        None => (NOT_FOUND_ANSWER, Vec::new()),
    }
}
