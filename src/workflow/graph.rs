use serde::{Deserialize, Serialize};

use super::status::{CaseStatus, Phase, Role};

/// A concrete follow-up the responsible role has to perform while a case sits
/// in a given status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub id: String,
    pub description: String,
    pub responsible: Role,
    /// Days until the action is due, when the workflow prescribes one.
    pub deadline_days: Option<u32>,
    /// Labels of information that must be collected before acting.
    pub required_info: Vec<String>,
}

impl NextAction {
    fn new(id: &str, description: &str, responsible: Role, deadline_days: u32) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            responsible,
            deadline_days: Some(deadline_days),
            required_info: Vec::new(),
        }
    }
}

/// Everything the workflow knows about one status: where the case can go next,
/// what the advisors have to do, and which message templates apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusNode {
    pub status: CaseStatus,
    pub description: String,
    pub phase: Phase,
    /// Legal follow-up statuses. Empty means the status is terminal.
    pub next_statuses: Vec<CaseStatus>,
    pub required_actions: Vec<NextAction>,
    /// Template names eligible while the case is in this status.
    pub eligible_templates: Vec<String>,
}

/// The static workflow graph: one node per [`CaseStatus`], built once at
/// startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct StatusGraph {
    nodes: Vec<StatusNode>,
}

fn node(
    status: CaseStatus,
    description: &str,
    phase: Phase,
    next_statuses: &[CaseStatus],
    required_actions: Vec<NextAction>,
    eligible_templates: &[&str],
) -> StatusNode {
    StatusNode {
        status,
        description: description.to_string(),
        phase,
        next_statuses: next_statuses.to_vec(),
        required_actions,
        eligible_templates: eligible_templates.iter().map(|t| t.to_string()).collect(),
    }
}

impl StatusGraph {
    /// Build the full built-in workflow graph.
    ///
    /// Node order follows [`CaseStatus::ALL`]; the recommender's substring
    /// matching resolves ties by this order.
    pub fn builtin() -> Self {
        use CaseStatus::*;

        let nodes = vec![
            node(
                Registered,
                "サービス登録完了、面談予定調整中",
                Phase::Initial,
                &[CounselingScheduled],
                vec![
                    NextAction::new("schedule_interview", "面談日程調整", Role::Ca, 3),
                    NextAction::new("send_reminder", "リマインド送信", Role::Ca, 1),
                ],
                &["登録お礼", "リマインド"],
            ),
            node(
                CounselingScheduled,
                "面談日程確定、面談実施待ち",
                Phase::Initial,
                &[CounselingCompleted],
                vec![NextAction::new("send_reminder", "リマインド送信", Role::Ca, 1)],
                &["面談お礼", "リマインド"],
            ),
            node(
                CounselingCompleted,
                "面談完了、求人紹介準備中",
                Phase::Initial,
                &[JobRecommended],
                vec![
                    NextAction::new("send_interview_thanks", "面談お礼送信", Role::Ca, 1),
                    NextAction::new("recommend_jobs", "求人紹介", Role::Ca, 3),
                ],
                &["面談お礼", "求人紹介"],
            ),
            node(
                JobRecommended,
                "求人紹介済み、応募意思確認中",
                Phase::JobRecommendation,
                &[ApplicationSubmitted],
                vec![
                    NextAction::new("confirm_application", "応募意思確認", Role::Ca, 3),
                    NextAction::new("document_reminder", "応募書類リマインド", Role::Ca, 5),
                ],
                &["求人紹介", "応募書類リマインド"],
            ),
            node(
                ApplicationSubmitted,
                "応募完了、書類選考中",
                Phase::Application,
                &[DocumentPassed, DocumentRejected],
                vec![
                    NextAction::new("send_application_thanks", "応募お礼送信", Role::Ca, 1),
                    NextAction::new("follow_up_screening", "書類選考状況確認", Role::Ra, 7),
                ],
                &["応募お礼"],
            ),
            node(
                DocumentUnderReview,
                "書類選考中、結果待ち",
                Phase::DocumentScreening,
                &[DocumentPassed, DocumentRejected],
                vec![NextAction::new(
                    "follow_up_screening",
                    "書類選考状況確認",
                    Role::Ra,
                    7,
                )],
                &["書類通過(CA→CS)", "書類お見送り"],
            ),
            node(
                DocumentPassed,
                "書類選考通過、面接日程調整中",
                Phase::DocumentScreening,
                &[InterviewScheduled],
                vec![
                    NextAction::new("notify_document_pass", "書類通過通知", Role::Ca, 1),
                    NextAction::new("schedule_interview_company", "面接日程調整", Role::Ra, 3),
                ],
                &["書類通過(CA→CS)", "書類通過(RA→CA)"],
            ),
            node(
                DocumentRejected,
                "書類選考不合格、他の求人検討",
                Phase::DocumentScreening,
                &[JobRecommended],
                vec![
                    NextAction::new("notify_document_reject", "書類不合格通知", Role::Ca, 1),
                    NextAction::new("recommend_alternative_jobs", "代替求人紹介", Role::Ca, 3),
                ],
                &["書類お見送り"],
            ),
            node(
                InterviewScheduling,
                "面接日程調整中",
                Phase::Interview,
                &[InterviewScheduled],
                vec![
                    NextAction::new("confirm_interview_schedule", "面接日程最終確認", Role::Ca, 2),
                    NextAction::new("send_schedule_fix", "日程確定通知", Role::Ca, 1),
                ],
                &["日程最終確認(CA→CS)", "日程最終確認(RA→CA)", "日程FIX連絡"],
            ),
            node(
                InterviewScheduled,
                "面接日程確定、面接実施待ち",
                Phase::Interview,
                &[InterviewCompleted],
                vec![NextAction::new(
                    "send_interview_reminder",
                    "面接リマインド送信",
                    Role::Ca,
                    1,
                )],
                &["面接感想依頼", "日程最終確認(CA→CS)", "面接結果＋日程調整(CA→CS)"],
            ),
            node(
                InterviewCompleted,
                "面接完了、感想・結果待ち",
                Phase::Interview,
                &[InterviewPassed, InterviewRejected],
                vec![
                    NextAction::new("request_interview_feedback", "面接感想依頼", Role::Ca, 1),
                    NextAction::new("follow_up_interview_result", "面接結果確認", Role::Ra, 3),
                ],
                &["面接感想依頼", "面接感想連携"],
            ),
            node(
                InterviewFeedbackPending,
                "面接完了、候補者の感想待ち",
                Phase::Interview,
                &[InterviewPassed, InterviewRejected],
                vec![NextAction::new(
                    "request_interview_feedback",
                    "面接感想依頼",
                    Role::Ca,
                    1,
                )],
                &["面接感想依頼", "日程最終確認(CA→CS)", "面接結果＋日程調整(CA→CS)"],
            ),
            node(
                InterviewPassed,
                "面接通過、次回面接または意向確認",
                Phase::Selection,
                &[InterviewScheduled, IntentionConfirmation],
                vec![
                    NextAction::new("notify_interview_pass", "面接通過通知", Role::Ca, 1),
                    NextAction::new("schedule_next_interview", "次回面接調整", Role::Ra, 3),
                ],
                &["面接結果＋日程調整(CA→CS)"],
            ),
            node(
                InterviewRejected,
                "面接不合格、他の求人検討",
                Phase::Selection,
                &[JobRecommended],
                vec![
                    NextAction::new("notify_interview_reject", "面接不合格通知", Role::Ca, 1),
                    NextAction::new("recommend_alternative_jobs", "代替求人紹介", Role::Ca, 3),
                ],
                &["面接感想依頼", "日程最終確認(CA→CS)", "面接結果＋日程調整(CA→CS)"],
            ),
            node(
                IntentionConfirmation,
                "意向確認中",
                Phase::Selection,
                &[OfferReceived, AdditionalInfoRequested],
                vec![
                    NextAction::new("request_intention", "意向確認依頼", Role::Ca, 2),
                    NextAction::new("share_intention_result", "意向確認結果共有", Role::Ra, 1),
                ],
                &["意向確認(CA→CS)", "意向確認返信(CS→CA)", "意向確認接続(CA→RA)"],
            ),
            node(
                AdditionalInfoRequested,
                "追加情報依頼中",
                Phase::Selection,
                &[IntentionConfirmation],
                vec![
                    NextAction::new("request_additional_info", "追加情報依頼", Role::Ca, 2),
                    NextAction::new("share_additional_info", "追加情報共有", Role::Ra, 1),
                ],
                &[
                    "追加情報依頼(CA→CS)",
                    "追加情報依頼(RA→CA)",
                    "追加情報返信(CA→RA)",
                    "追加情報返信(CS→CA)",
                ],
            ),
            node(
                OfferReceived,
                "内定通知、検討中",
                Phase::Offer,
                &[OfferAccepted, OfferDeclined],
                vec![
                    NextAction::new("notify_offer", "内定通知", Role::Ca, 1),
                    NextAction::new("follow_up_offer_decision", "内定回答確認", Role::Ca, 3),
                ],
                &["内定連絡(CA→CS)", "内定連絡(RA→CA)"],
            ),
            node(
                OfferConsideration,
                "内定条件を検討中",
                Phase::Offer,
                &[OfferAccepted, OfferDeclined],
                vec![NextAction::new(
                    "follow_up_offer_decision",
                    "内定回答確認",
                    Role::Ca,
                    3,
                )],
                &["内定連絡(CA→CS)", "正式内定ログ(CA→CS)"],
            ),
            node(
                OfferAccepted,
                "内定承諾、退職交渉開始",
                Phase::Offer,
                &[ResignationNegotiation],
                vec![
                    NextAction::new("process_offer_acceptance", "内定承諾手続き", Role::Ca, 1),
                    NextAction::new("start_resignation_support", "退職交渉サポート開始", Role::Ca, 3),
                ],
                &["正式内定ログ(CA→CS)", "内定受諾(CS→CA)", "内定受諾(CA→RA)"],
            ),
            node(
                OfferDeclined,
                "内定辞退、他の求人検討",
                Phase::Offer,
                &[JobRecommended],
                vec![NextAction::new("share_offer_decline", "内定辞退連絡", Role::Ca, 1)],
                &["内定連絡(CA→CS)", "正式内定ログ(CA→CS)"],
            ),
            node(
                ResignationNegotiation,
                "退職交渉中",
                Phase::Onboarding,
                &[ResignationCompleted],
                vec![
                    NextAction::new("support_resignation", "退職交渉サポート", Role::Ca, 7),
                    NextAction::new("confirm_resignation_status", "退職状況確認", Role::Ca, 3),
                ],
                &["退職交渉ログ(CA→CS)", "退職交渉ログ(CS→CA)", "退職交渉ログ(CA→RA)"],
            ),
            node(
                ResignationCompleted,
                "退職完了、入社準備中",
                Phase::Onboarding,
                &[OnboardingCompleted],
                vec![
                    NextAction::new("confirm_onboarding", "入社準備確認", Role::Ca, 5),
                    NextAction::new("final_support", "最終サポート", Role::Ca, 1),
                ],
                &[],
            ),
            node(
                OnboardingPreparation,
                "入社準備中",
                Phase::Onboarding,
                &[OnboardingCompleted],
                vec![NextAction::new("confirm_onboarding", "入社準備確認", Role::Ca, 5)],
                &[],
            ),
            node(
                OnboardingCompleted,
                "入社完了",
                Phase::Onboarding,
                &[],
                vec![NextAction::new("final_support", "最終サポート", Role::Ca, 1)],
                &[],
            ),
        ];

        Self { nodes }
    }

    /// Replace eligible-template lists from an externally loaded
    /// status → templates mapping. Unknown status keys are ignored; statuses
    /// absent from the mapping keep their built-in lists.
    ///
    /// Meant to be applied once at startup, before the graph is shared.
    pub fn with_template_mapping(mut self, mapping: &[(String, Vec<String>)]) -> Self {
        for (key, templates) in mapping {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.status.as_str() == key) {
                node.eligible_templates = templates.clone();
            }
        }
        self
    }

    /// Look up the node for an exact status key.
    pub fn lookup(&self, key: &str) -> Option<&StatusNode> {
        self.nodes.iter().find(|n| n.status.as_str() == key)
    }

    /// Node for a known status. Total over `CaseStatus` by construction.
    pub fn node_for(&self, status: CaseStatus) -> &StatusNode {
        // builtin() defines a node per variant; with_template_mapping never removes one.
        self.nodes
            .iter()
            .find(|n| n.status == status)
            .unwrap_or_else(|| unreachable!("graph is total over CaseStatus"))
    }

    /// All nodes in definition order.
    pub fn nodes(&self) -> &[StatusNode] {
        &self.nodes
    }
}
