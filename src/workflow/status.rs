use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of case statuses a placement moves through, from service
/// registration to onboarding.
///
/// The Japanese wire keys (`as_str`) are the canonical identifiers used by the
/// data layer, the catalog mapping files and the recommendation matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    // 初期段階
    Registered,
    CounselingScheduled,
    CounselingCompleted,

    // 求人紹介・応募段階
    JobRecommended,
    ApplicationSubmitted,
    DocumentUnderReview,

    // 書類選考結果
    DocumentPassed,
    DocumentRejected,

    // 面接段階
    InterviewScheduling,
    InterviewScheduled,
    InterviewCompleted,
    InterviewFeedbackPending,

    // 選考結果・意向確認
    InterviewPassed,
    InterviewRejected,
    IntentionConfirmation,
    AdditionalInfoRequested,

    // 内定段階
    OfferReceived,
    OfferConsideration,
    OfferAccepted,
    OfferDeclined,

    // 入社準備段階
    ResignationNegotiation,
    ResignationCompleted,
    OnboardingPreparation,
    OnboardingCompleted,
}

impl CaseStatus {
    /// All statuses in definition order. Substring matching during
    /// recommendation walks this order, so it must stay stable.
    pub const ALL: [CaseStatus; 24] = [
        CaseStatus::Registered,
        CaseStatus::CounselingScheduled,
        CaseStatus::CounselingCompleted,
        CaseStatus::JobRecommended,
        CaseStatus::ApplicationSubmitted,
        CaseStatus::DocumentUnderReview,
        CaseStatus::DocumentPassed,
        CaseStatus::DocumentRejected,
        CaseStatus::InterviewScheduling,
        CaseStatus::InterviewScheduled,
        CaseStatus::InterviewCompleted,
        CaseStatus::InterviewFeedbackPending,
        CaseStatus::InterviewPassed,
        CaseStatus::InterviewRejected,
        CaseStatus::IntentionConfirmation,
        CaseStatus::AdditionalInfoRequested,
        CaseStatus::OfferReceived,
        CaseStatus::OfferConsideration,
        CaseStatus::OfferAccepted,
        CaseStatus::OfferDeclined,
        CaseStatus::ResignationNegotiation,
        CaseStatus::ResignationCompleted,
        CaseStatus::OnboardingPreparation,
        CaseStatus::OnboardingCompleted,
    ];

    /// The canonical Japanese key for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Registered => "登録完了",
            CaseStatus::CounselingScheduled => "面談予定",
            CaseStatus::CounselingCompleted => "面談完了",
            CaseStatus::JobRecommended => "求人紹介中",
            CaseStatus::ApplicationSubmitted => "応募済み",
            CaseStatus::DocumentUnderReview => "書類選考中",
            CaseStatus::DocumentPassed => "書類通過",
            CaseStatus::DocumentRejected => "書類不合格",
            CaseStatus::InterviewScheduling => "面接日程調整中",
            CaseStatus::InterviewScheduled => "面接予定",
            CaseStatus::InterviewCompleted => "面接完了",
            CaseStatus::InterviewFeedbackPending => "面接感想待ち",
            CaseStatus::InterviewPassed => "面接通過",
            CaseStatus::InterviewRejected => "面接不合格",
            CaseStatus::IntentionConfirmation => "意向確認中",
            CaseStatus::AdditionalInfoRequested => "追加情報依頼中",
            CaseStatus::OfferReceived => "内定通知",
            CaseStatus::OfferConsideration => "内定検討中",
            CaseStatus::OfferAccepted => "内定承諾",
            CaseStatus::OfferDeclined => "内定辞退",
            CaseStatus::ResignationNegotiation => "退職交渉中",
            CaseStatus::ResignationCompleted => "退職完了",
            CaseStatus::OnboardingPreparation => "入社準備中",
            CaseStatus::OnboardingCompleted => "入社完了",
        }
    }

    /// Resolve a wire key back to a status. Returns `None` for anything that is
    /// not an exact key — the recommender then falls through to fuzzy matching.
    pub fn from_key(key: &str) -> Option<CaseStatus> {
        CaseStatus::ALL.iter().copied().find(|s| s.as_str() == key)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Macro-phases grouping the statuses, in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Initial,
    JobRecommendation,
    Application,
    DocumentScreening,
    Interview,
    Selection,
    Offer,
    Onboarding,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initial => "初期段階",
            Phase::JobRecommendation => "求人紹介段階",
            Phase::Application => "応募段階",
            Phase::DocumentScreening => "書類選考段階",
            Phase::Interview => "面接段階",
            Phase::Selection => "選考段階",
            Phase::Offer => "内定段階",
            Phase::Onboarding => "入社準備段階",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participants in a placement case.
///
/// CA is the career advisor driving the case, CS the candidate, RA the
/// recruiting advisor on the company side. Template names carry directional
/// markers such as `CA→CS` built from these short labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Ca,
    Cs,
    Ra,
}

impl Role {
    /// Short label as used inside template names.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Ca => "CA",
            Role::Cs => "CS",
            Role::Ra => "RA",
        }
    }

    /// Human-readable role description.
    pub fn description(&self) -> &'static str {
        match self {
            Role::Ca => "キャリアアドバイザー",
            Role::Cs => "候補者",
            Role::Ra => "リクルーティングアドバイザー",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_roundtrip_for_every_status() {
        for status in CaseStatus::ALL {
            assert_eq!(CaseStatus::from_key(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_key_is_none() {
        assert_eq!(CaseStatus::from_key("面接調整中"), None);
        assert_eq!(CaseStatus::from_key(""), None);
    }

    #[test]
    fn all_keys_are_distinct() {
        let mut keys: Vec<&str> = CaseStatus::ALL.iter().map(|s| s.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CaseStatus::ALL.len());
    }

    #[test]
    fn status_display_uses_wire_key() {
        assert_eq!(CaseStatus::DocumentUnderReview.to_string(), "書類選考中");
        assert_eq!(CaseStatus::OfferReceived.to_string(), "内定通知");
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Initial < Phase::DocumentScreening);
        assert!(Phase::Offer < Phase::Onboarding);
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::Ca.to_string(), "CA");
        assert_eq!(Role::Cs.description(), "候補者");
    }
}
