//! Template recommendation: scores and ranks message templates against the
//! current case status, the candidate's sentiment scores and the recent
//! message history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::TemplateCatalog;
use crate::workflow::{Role, StatusGraph};

/// One message previously exchanged on the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub content: String,
    pub is_outbound: bool,
}

/// The per-request bundle of case data driving recommendation and generation.
///
/// Supplied by the data layer; the pipeline only reads it. `current_status`
/// is free text and need not match a graph key exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseContext {
    pub current_status: String,
    pub candidate_name: String,
    pub company: String,
    pub job_title: String,
    /// Candidate enthusiasm in [0, 1].
    pub enthusiasm_score: f64,
    /// Candidate concern in [0, 1].
    pub concern_score: f64,
    pub latest_summary: String,
    /// Prior messages, oldest first.
    #[serde(default)]
    pub message_history: Vec<MessageRecord>,
}

/// Which stage of the placement a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateCategory {
    Initial,
    JobRecommendation,
    Application,
    DocumentScreening,
    Interview,
    Selection,
    Offer,
    Onboarding,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Initial => "初期段階",
            TemplateCategory::JobRecommendation => "求人紹介段階",
            TemplateCategory::Application => "応募段階",
            TemplateCategory::DocumentScreening => "書類選考段階",
            TemplateCategory::Interview => "面接段階",
            TemplateCategory::Selection => "選考段階",
            TemplateCategory::Offer => "内定段階",
            TemplateCategory::Onboarding => "入社準備段階",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked template suggestion for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub template_name: String,
    pub template_content: String,
    /// Heuristic relevance in [0, 1].
    pub relevance_score: f64,
    pub reason: String,
    pub sender: Role,
    pub receiver: Role,
    pub category: TemplateCategory,
    pub customization_hints: Vec<String>,
}

/// Keyword fallback for status strings that match no graph key, checked in
/// order; the first keyword contained in the status wins.
const KEYWORD_FALLBACK: &[(&str, &[&str])] = &[
    ("登録", &["登録お礼"]),
    ("面談", &["面談お礼", "リマインド"]),
    ("求人", &["求人紹介", "応募書類リマインド"]),
    ("応募", &["応募お礼"]),
    ("書類", &["書類通過(CA→CS)", "書類お見送り"]),
    (
        "面接",
        &["面接感想依頼", "日程最終確認(CA→CS)", "面接結果＋日程調整(CA→CS)"],
    ),
    ("意向", &["意向確認(CA→CS)"]),
    ("内定", &["内定連絡(CA→CS)", "正式内定ログ(CA→CS)"]),
    ("退職", &["退職交渉ログ(CA→CS)"]),
];

/// Directional markers in template names, checked in order.
const DIRECTION_RULES: &[(&str, (Role, Role))] = &[
    ("CA→CS", (Role::Ca, Role::Cs)),
    ("CS→CA", (Role::Cs, Role::Ca)),
    ("RA→CA", (Role::Ra, Role::Ca)),
    ("CA→RA", (Role::Ca, Role::Ra)),
];

/// Name-keyword rules mapping a template to its category. Evaluated in order,
/// first match wins; overlapping names (e.g. 面接/意向) resolve by this
/// precedence, which mirrors the workflow definition.
const CATEGORY_RULES: &[(&[&str], TemplateCategory)] = &[
    (&["登録", "面談", "リマインド"], TemplateCategory::Initial),
    (&["求人", "応募書類"], TemplateCategory::JobRecommendation),
    (&["応募お礼"], TemplateCategory::Application),
    (&["書類"], TemplateCategory::DocumentScreening),
    (&["面接", "日程"], TemplateCategory::Interview),
    (&["意向", "追加情報"], TemplateCategory::Selection),
    (&["内定"], TemplateCategory::Offer),
    (&["退職"], TemplateCategory::Onboarding),
];

/// Ranks catalog templates for a case context against the status graph.
///
/// Stateless apart from the two shared read-only structures; safe to call
/// concurrently and idempotent for identical inputs.
pub struct TemplateRecommender<'a> {
    graph: &'a StatusGraph,
    catalog: &'a TemplateCatalog,
}

impl<'a> TemplateRecommender<'a> {
    pub fn new(graph: &'a StatusGraph, catalog: &'a TemplateCatalog) -> Self {
        Self { graph, catalog }
    }

    /// Produce recommendations ranked by descending relevance. Equal scores
    /// keep eligibility order. An empty result means no template applies.
    pub fn recommend(&self, ctx: &CaseContext) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for template_name in self.applicable_templates(&ctx.current_status) {
            let Some(body) = self.catalog.body(&template_name) else {
                continue;
            };

            let (sender, receiver) = infer_direction(&template_name);
            recommendations.push(Recommendation {
                relevance_score: relevance_score(&template_name, body, ctx),
                reason: recommendation_reason(&template_name, ctx),
                sender,
                receiver,
                category: infer_category(&template_name),
                customization_hints: customization_hints(&template_name, ctx),
                template_content: body.to_string(),
                template_name,
            });
        }

        // Stable sort: ties keep eligibility order.
        recommendations.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        recommendations
    }

    /// Resolve the candidate template set for a status string: exact graph key
    /// first, then substring match over graph keys in definition order, then
    /// the keyword fallback table.
    fn applicable_templates(&self, status: &str) -> Vec<String> {
        if let Some(node) = self.graph.lookup(status) {
            return node.eligible_templates.clone();
        }

        for node in self.graph.nodes() {
            let key = node.status.as_str();
            if key.contains(status) || status.contains(key) {
                return node.eligible_templates.clone();
            }
        }

        for (keyword, templates) in KEYWORD_FALLBACK {
            if status.contains(keyword) {
                return templates.iter().map(|t| t.to_string()).collect();
            }
        }

        Vec::new()
    }
}

/// Relevance heuristic: base 0.5, independent additive adjustments, clamped
/// to [0, 1] only at the end.
fn relevance_score(name: &str, body: &str, ctx: &CaseContext) -> f64 {
    let mut score: f64 = 0.5;

    if ctx.current_status.contains(name) || name.contains(&ctx.current_status) {
        score += 0.3;
    }

    // Only one enthusiasm bonus can apply, chosen by threshold.
    if ctx.enthusiasm_score > 0.8 {
        if name.contains("お礼") || body.contains("おめでとう") {
            score += 0.2;
        }
    } else if ctx.enthusiasm_score < 0.5 && (name.contains("確認") || name.contains("依頼")) {
        score += 0.1;
    }

    if ctx.concern_score > 0.6 && (name.contains("追加情報") || name.contains("意向確認")) {
        score += 0.2;
    }

    // Recently used templates are penalized once per matching entry.
    let name_lower = name.to_lowercase();
    let recent = ctx.message_history.iter().rev().take(3);
    for msg in recent {
        if msg.subject.to_lowercase().contains(&name_lower) {
            score -= 0.1;
        }
    }

    score.clamp(0.0, 1.0)
}

/// Free-text explanation of why a template was suggested. Never empty.
fn recommendation_reason(name: &str, ctx: &CaseContext) -> String {
    let mut reasons: Vec<String> = Vec::new();

    if name.contains(&ctx.current_status) {
        reasons.push(format!("現在のステータス「{}」に最適", ctx.current_status));
    }

    if ctx.enthusiasm_score > 0.8 {
        reasons.push("候補者の熱意が高いため".to_string());
    } else if ctx.enthusiasm_score < 0.5 {
        reasons.push("候補者の熱意向上が必要なため".to_string());
    }

    if ctx.concern_score > 0.6 {
        reasons.push("候補者の懸念解消が必要なため".to_string());
    }

    if name.contains("お礼") {
        reasons.push("感謝の気持ちを伝える重要なタイミング".to_string());
    } else if name.contains("確認") {
        reasons.push("状況確認が必要な段階".to_string());
    } else if name.contains("調整") {
        reasons.push("日程調整が必要な段階".to_string());
    }

    if reasons.is_empty() {
        "標準的な対応として推奨".to_string()
    } else {
        reasons.join("、")
    }
}

/// Infer sender/receiver from a directional marker in the template name.
fn infer_direction(name: &str) -> (Role, Role) {
    for (marker, pair) in DIRECTION_RULES {
        if name.contains(marker) {
            return *pair;
        }
    }
    (Role::Ca, Role::Cs)
}

/// Infer the category from the template name via the ordered rule table.
fn infer_category(name: &str) -> TemplateCategory {
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|k| name.contains(k)) {
            return *category;
        }
    }
    TemplateCategory::Initial
}

/// Placeholder-substitution hints plus situational guidance. Informational
/// only; no effect on ranking.
fn customization_hints(name: &str, ctx: &CaseContext) -> Vec<String> {
    let mut hints = vec![
        format!("「CS様」を「{}様」に置換", ctx.candidate_name),
        format!("「●●社」を「{}」に置換", ctx.company),
        format!("「●●」職種を「{}」に置換", ctx.job_title),
    ];

    if ctx.enthusiasm_score > 0.8 {
        hints.push("候補者の熱意が高いため、ポジティブな表現を強調".to_string());
    } else if ctx.enthusiasm_score < 0.5 {
        hints.push("候補者の熱意向上のため、メリットや魅力を具体的に記載".to_string());
    }

    if ctx.concern_score > 0.6 {
        hints.push("候補者の懸念があるため、丁寧な説明と配慮を追加".to_string());
    }

    if name.contains("日程") {
        hints.push("具体的な日時候補を複数提示".to_string());
    } else if name.contains("内定") {
        hints.push("条件詳細と回答期限を明確に記載".to_string());
    } else if name.contains("面接") {
        hints.push("面接内容と準備事項を具体的に説明".to_string());
    }

    hints
}
