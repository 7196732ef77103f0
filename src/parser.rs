//! Fault-tolerant extraction of structured fields from raw model output.
//!
//! Generative models wrap answers in reasoning blocks, drop labels, or emit
//! free-form prose; every operation here is total and degrades to
//! deterministic defaults instead of failing. The raw text is always retained
//! for audit.

use std::fmt;

use serde::{Deserialize, Serialize};

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Deterministic subject/body used when extraction produces nothing.
#[derive(Debug, Clone)]
pub struct EmailFallbacks {
    pub subject: String,
    pub body: String,
}

impl EmailFallbacks {
    /// Build fallbacks referencing the case. The subject differs slightly
    /// between template-guided and plain generation.
    pub fn for_case(candidate_name: &str, company: &str, template_guided: bool) -> Self {
        let subject = if template_guided {
            format!("【{candidate_name}様】{company}の件について")
        } else {
            format!("【{candidate_name}様】{company}案件の件")
        };
        let body = format!(
            "お疲れ様です。{candidate_name}様の{company}の件についてご連絡いたします。\n\n詳細は別途お話しさせていただければと思います。"
        );
        Self { subject, body }
    }
}

/// Structured result of [`parse_email`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    pub subject: String,
    pub body: String,
    /// True when the subject or the body came from the fallback values.
    pub used_defaults: bool,
}

/// Structured result of [`parse_scores`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAnalysis {
    pub enthusiasm_score: f64,
    pub concern_score: f64,
    pub analysis_reason: String,
    pub raw_response: String,
}

/// Urgency of a suggested follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "高",
            Priority::Medium => "中",
            Priority::Low => "低",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of [`parse_next_action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextActionSuggestion {
    pub action: String,
    pub reason: String,
    pub priority: Priority,
    pub raw_response: String,
}

/// States of the reasoning-block stripper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StripState {
    /// No opening marker seen yet.
    Seeking,
    /// Between an opening marker and its close.
    Inside,
    /// Past the closing marker.
    Post,
}

/// Remove a `<think>…</think>` reasoning block from raw model output.
///
/// Runs a small line-oriented state machine; an opening marker without its
/// close triggers recovery: keep everything from the first 件名/本文 labeled
/// line onward, else the text before the marker, else the trimmed original.
fn strip_reasoning(raw: &str) -> String {
    if !raw.contains(THINK_OPEN) {
        return raw.trim().to_string();
    }

    let mut state = StripState::Seeking;
    let mut kept: Vec<String> = Vec::new();

    for line in raw.lines() {
        state = match state {
            StripState::Seeking => {
                if let Some(open) = line.find(THINK_OPEN) {
                    let prefix = &line[..open];
                    let rest = &line[open + THINK_OPEN.len()..];
                    if let Some(close) = rest.find(THINK_CLOSE) {
                        let merged = format!("{prefix}{}", &rest[close + THINK_CLOSE.len()..]);
                        if !merged.trim().is_empty() {
                            kept.push(merged);
                        }
                        StripState::Post
                    } else {
                        if !prefix.trim().is_empty() {
                            kept.push(prefix.to_string());
                        }
                        StripState::Inside
                    }
                } else {
                    kept.push(line.to_string());
                    StripState::Seeking
                }
            }
            StripState::Inside => {
                if let Some(close) = line.find(THINK_CLOSE) {
                    let tail = &line[close + THINK_CLOSE.len()..];
                    if !tail.trim().is_empty() {
                        kept.push(tail.to_string());
                    }
                    StripState::Post
                } else {
                    StripState::Inside
                }
            }
            StripState::Post => {
                kept.push(line.to_string());
                StripState::Post
            }
        };
    }

    if state == StripState::Inside {
        recover_unclosed(raw)
    } else {
        kept.join("\n").trim().to_string()
    }
}

/// Recovery for an unterminated reasoning block.
fn recover_unclosed(raw: &str) -> String {
    let mut captured: Vec<&str> = Vec::new();
    let mut capturing = false;
    for line in raw.lines() {
        let line = line.trim();
        if is_label_line(line) {
            capturing = true;
        }
        if capturing && !line.is_empty() {
            captured.push(line);
        }
    }
    if !captured.is_empty() {
        return captured.join("\n");
    }

    let before = raw.split(THINK_OPEN).next().unwrap_or("").trim();
    if before.is_empty() {
        raw.trim().to_string()
    } else {
        before.to_string()
    }
}

fn is_label_line(line: &str) -> bool {
    line.starts_with("件名:")
        || line.starts_with("件名：")
        || line.starts_with("本文:")
        || line.starts_with("本文：")
}

/// If `line` starts with `label` followed by a colon in either width, return
/// the text after the first colon found.
fn label_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let starts = line.starts_with(&format!("{label}:")) || line.starts_with(&format!("{label}："));
    if !starts {
        return None;
    }
    if let Some(idx) = line.find(':') {
        Some(&line[idx + 1..])
    } else {
        line.find('：').map(|idx| &line[idx + '：'.len_utf8()..])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Subject,
    Body,
}

/// Extract subject and body from raw model output.
///
/// Never fails: worst case both fields are the provided fallbacks and
/// `used_defaults` is set.
pub fn parse_email(raw: &str, fallbacks: &EmailFallbacks) -> ParsedEmail {
    let clean = strip_reasoning(raw);

    let mut subject: Option<String> = None;
    let mut body_lines: Vec<String> = Vec::new();
    let mut section = Section::None;

    for line in clean.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(value) = label_value(line, "件名") {
            subject = Some(value.trim().to_string());
            section = Section::Subject;
        } else if let Some(value) = label_value(line, "本文") {
            let value = value.trim();
            if !value.is_empty() {
                body_lines.push(value.to_string());
            }
            section = Section::Body;
        } else if section == Section::Body {
            body_lines.push(line.to_string());
        } else if section == Section::None
            && !line.starts_with("件名")
            && !line.starts_with("本文")
        {
            // Unlabeled leading output is treated as body text.
            body_lines.push(line.to_string());
        }
    }

    let body = if !body_lines.is_empty() {
        body_lines.join("\n")
    } else if section == Section::None {
        clean
    } else {
        String::new()
    };

    let mut used_defaults = false;
    let subject = match subject.filter(|s| !s.trim().is_empty()) {
        Some(s) => s,
        None => {
            used_defaults = true;
            fallbacks.subject.clone()
        }
    };
    let body = if body.trim().is_empty() {
        used_defaults = true;
        fallbacks.body.clone()
    } else {
        body
    };

    ParsedEmail {
        subject,
        body,
        used_defaults,
    }
}

/// Extract enthusiasm/concern scores and the analysis reason.
///
/// Each field falls back independently: an unparsable number on one line
/// leaves that field's default (0.5) untouched without affecting the others.
/// Parsed scores are clamped to [0, 1].
pub fn parse_scores(raw: &str) -> ScoreAnalysis {
    let mut enthusiasm = 0.5;
    let mut concern = 0.5;
    let mut reason = "分析できませんでした".to_string();

    for line in raw.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("熱意スコア:") {
            if let Some(v) = parse_unit_score(value) {
                enthusiasm = v;
            }
        } else if let Some(value) = line.strip_prefix("懸念スコア:") {
            if let Some(v) = parse_unit_score(value) {
                concern = v;
            }
        } else if let Some(value) = line.strip_prefix("分析理由:") {
            reason = value.trim().to_string();
        }
    }

    ScoreAnalysis {
        enthusiasm_score: enthusiasm,
        concern_score: concern,
        analysis_reason: reason,
        raw_response: raw.to_string(),
    }
}

fn parse_unit_score(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

/// Extract a suggested next action, its reason and its priority.
pub fn parse_next_action(raw: &str) -> NextActionSuggestion {
    let mut action = "候補者に連絡を取る".to_string();
    let mut reason = "状況を確認するため".to_string();
    let mut priority = Priority::Medium;

    for line in raw.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("アクション:") {
            let value = value.trim();
            if !value.is_empty() {
                action = value.to_string();
            }
        } else if let Some(value) = line.strip_prefix("理由:") {
            let value = value.trim();
            if !value.is_empty() {
                reason = value.to_string();
            }
        } else if let Some(value) = line.strip_prefix("優先度:") {
            priority = match value.trim() {
                "高" => Priority::High,
                "低" => Priority::Low,
                _ => Priority::Medium,
            };
        }
    }

    NextActionSuggestion {
        action,
        reason,
        priority,
        raw_response: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallbacks() -> EmailFallbacks {
        EmailFallbacks::for_case("田中太郎", "Acme株式会社", false)
    }

    // --- strip_reasoning ---

    #[test]
    fn strip_removes_complete_reasoning_block() {
        let raw = "<think>noise</think>件名: Hello\n本文: World";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.subject, "Hello");
        assert_eq!(email.body, "World");
        assert!(!email.used_defaults);
    }

    #[test]
    fn strip_keeps_text_around_multiline_block() {
        let raw = "前置き\n<think>段落1\n段落2</think>\n件名: A\n本文: B";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.subject, "A");
        assert_eq!(email.body, "前置き\nB");
    }

    #[test]
    fn unclosed_marker_recovers_from_labeled_line() {
        let raw = "<think>まだ考え中\n結論が出ない\n件名: 面接日程のご連絡\n本文: 日程をご確認ください。";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.subject, "面接日程のご連絡");
        assert_eq!(email.body, "日程をご確認ください。");
        assert!(!email.used_defaults);
    }

    #[test]
    fn unclosed_marker_without_labels_uses_text_before_marker() {
        let raw = "ご連絡いたします。\n<think>延々と続く思考";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.body, "ご連絡いたします。");
        // No subject anywhere: fallback fires.
        assert!(email.used_defaults);
        assert_eq!(email.subject, "【田中太郎様】Acme株式会社案件の件");
    }

    #[test]
    fn unclosed_marker_with_nothing_before_keeps_original() {
        let raw = "<think>思考のみ";
        let email = parse_email(raw, &fallbacks());
        // The marker text itself ends up as body — better than losing output.
        assert!(email.body.contains("思考のみ"));
    }

    // --- parse_email ---

    #[test]
    fn plain_paragraph_becomes_body_with_fallback_subject() {
        let email = parse_email("Just a plain paragraph.", &fallbacks());
        assert_eq!(email.body, "Just a plain paragraph.");
        assert_eq!(email.subject, "【田中太郎様】Acme株式会社案件の件");
        assert!(email.used_defaults);
    }

    #[test]
    fn full_width_colons_are_accepted() {
        let email = parse_email("件名：ご連絡\n本文：本文です。", &fallbacks());
        assert_eq!(email.subject, "ご連絡");
        assert_eq!(email.body, "本文です。");
    }

    #[test]
    fn body_section_accumulates_following_lines() {
        let raw = "件名: お知らせ\n本文: 一行目\n二行目\n\n三行目";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.body, "一行目\n二行目\n三行目");
    }

    #[test]
    fn body_label_with_empty_remainder_starts_section() {
        let raw = "件名: お知らせ\n本文:\nこちらが本文です。";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.body, "こちらが本文です。");
    }

    #[test]
    fn unlabeled_lines_before_labels_go_to_body() {
        let raw = "挨拶文\n件名: お知らせ\n本文: 中身";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.subject, "お知らせ");
        assert_eq!(email.body, "挨拶文\n中身");
    }

    #[test]
    fn subject_only_gets_fallback_body() {
        let email = parse_email("件名: お知らせ", &fallbacks());
        assert_eq!(email.subject, "お知らせ");
        assert!(email.used_defaults);
        assert!(email.body.contains("田中太郎様"));
        assert!(email.body.contains("Acme株式会社"));
    }

    #[test]
    fn empty_input_falls_back_entirely() {
        let email = parse_email("", &fallbacks());
        assert!(email.used_defaults);
        assert_eq!(email.subject, "【田中太郎様】Acme株式会社案件の件");
        assert!(email.body.contains("ご連絡いたします"));
    }

    #[test]
    fn template_guided_fallback_subject_differs() {
        let fb = EmailFallbacks::for_case("佐藤花子", "Tech Corp", true);
        let email = parse_email("", &fb);
        assert_eq!(email.subject, "【佐藤花子様】Tech Corpの件について");
    }

    #[test]
    fn lines_in_subject_section_are_dropped() {
        let raw = "件名: お知らせ\n補足のつもりの行\n本文: 中身";
        let email = parse_email(raw, &fallbacks());
        assert_eq!(email.body, "中身");
    }

    // --- parse_scores ---

    #[test]
    fn scores_parse_labeled_lines() {
        let analysis = parse_scores("熱意スコア: 0.9\n懸念スコア: 0.2\n分析理由: 前向きな返信");
        assert_eq!(analysis.enthusiasm_score, 0.9);
        assert_eq!(analysis.concern_score, 0.2);
        assert_eq!(analysis.analysis_reason, "前向きな返信");
    }

    #[test]
    fn bad_number_leaves_that_field_default() {
        let analysis = parse_scores("熱意スコア: 0.9\n懸念スコア: bad\n分析理由: ok");
        assert_eq!(analysis.enthusiasm_score, 0.9);
        assert_eq!(analysis.concern_score, 0.5);
        assert_eq!(analysis.analysis_reason, "ok");
    }

    #[test]
    fn missing_lines_keep_all_defaults() {
        let analysis = parse_scores("モデルが形式を無視した出力");
        assert_eq!(analysis.enthusiasm_score, 0.5);
        assert_eq!(analysis.concern_score, 0.5);
        assert_eq!(analysis.analysis_reason, "分析できませんでした");
        assert_eq!(analysis.raw_response, "モデルが形式を無視した出力");
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let analysis = parse_scores("熱意スコア: 1.7\n懸念スコア: -0.2");
        assert_eq!(analysis.enthusiasm_score, 1.0);
        assert_eq!(analysis.concern_score, 0.0);
    }

    #[test]
    fn non_finite_score_is_rejected() {
        let analysis = parse_scores("熱意スコア: NaN\n懸念スコア: inf");
        assert_eq!(analysis.enthusiasm_score, 0.5);
        assert_eq!(analysis.concern_score, 0.5);
    }

    // --- parse_next_action ---

    #[test]
    fn next_action_parses_all_fields() {
        let suggestion =
            parse_next_action("アクション: 意向確認の連絡\n理由: 回答期限が近いため\n優先度: 高");
        assert_eq!(suggestion.action, "意向確認の連絡");
        assert_eq!(suggestion.reason, "回答期限が近いため");
        assert_eq!(suggestion.priority, Priority::High);
    }

    #[test]
    fn next_action_defaults_when_unlabeled() {
        let suggestion = parse_next_action("なんらかの自由文");
        assert_eq!(suggestion.action, "候補者に連絡を取る");
        assert_eq!(suggestion.reason, "状況を確認するため");
        assert_eq!(suggestion.priority, Priority::Medium);
    }

    #[test]
    fn unknown_priority_maps_to_medium() {
        let suggestion = parse_next_action("優先度: 最優先");
        assert_eq!(suggestion.priority, Priority::Medium);
        let low = parse_next_action("優先度: 低");
        assert_eq!(low.priority, Priority::Low);
    }

    #[test]
    fn priority_display() {
        assert_eq!(Priority::High.to_string(), "高");
        assert_eq!(Priority::Medium.to_string(), "中");
        assert_eq!(Priority::Low.to_string(), "低");
    }
}
