//! Terminal output for caflow — spinners and colored reports.
//!
//! Uses `indicatif` for progress spinners during model calls and `console`
//! for styled output. [`GenerationProgress`] tracks a single model call
//! visually; the free functions render the pipeline's structured results.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::generator::GenerationResult;
use crate::parser::{NextActionSuggestion, Priority, ScoreAnalysis};
use crate::recommend::Recommendation;
use crate::workflow::{Phase, StatusGraph};

/// Visual progress indicator for a model call.
///
/// Shows an animated spinner while waiting on the backend and a colored
/// completion line: green for a parsed result, yellow when the pipeline
/// recovered with fallbacks.
pub struct GenerationProgress {
    pb: ProgressBar,
    green: Style,
    yellow: Style,
}

impl GenerationProgress {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
        }
    }

    pub fn complete_ok(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    /// The call failed but the pipeline produced a fallback result.
    pub fn complete_fallback(&self, error: &str) {
        self.pb.finish_and_clear();
        println!(
            "  {} モデル呼び出しに失敗したため、フォールバック文面を使用します: {error}",
            self.yellow.apply_to("↻")
        );
    }
}

/// Print the status graph grouped by workflow phase.
pub fn print_graph(graph: &StatusGraph) {
    let header = Style::new().cyan().bold();
    let dim = Style::new().dim();

    let mut current_phase: Option<Phase> = None;
    for node in graph.nodes() {
        if current_phase != Some(node.phase) {
            current_phase = Some(node.phase);
            println!();
            println!("{}", header.apply_to(format!("── {} ──", node.phase)));
        }
        println!("  {} — {}", node.status, node.description);
        if !node.next_statuses.is_empty() {
            let next: Vec<&str> = node.next_statuses.iter().map(|s| s.as_str()).collect();
            println!(
                "    {}",
                dim.apply_to(format!("次の状態: {}", next.join(", ")))
            );
        }
        for action in &node.required_actions {
            let deadline = match action.deadline_days {
                Some(days) => format!("（期限: {days}日以内）"),
                None => String::new(),
            };
            println!(
                "    {}",
                dim.apply_to(format!(
                    "対応 [{}]: {}{deadline}",
                    action.responsible.label(),
                    action.description
                ))
            );
        }
    }
    println!();
}

/// Print ranked recommendations with scores and reasons.
pub fn print_recommendations(recommendations: &[Recommendation], verbose: bool) {
    if recommendations.is_empty() {
        println!("該当するテンプレートが見つかりませんでした。");
        return;
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} {}",
            rank + 1,
            bold.apply_to(&rec.template_name),
            dim.apply_to(format!("(スコア: {:.2})", rec.relevance_score))
        );
        println!(
            "   {} → {} / {}",
            rec.sender.label(),
            rec.receiver.label(),
            rec.category
        );
        println!("   理由: {}", rec.reason);
        for hint in &rec.customization_hints {
            println!("   {}", dim.apply_to(format!("ヒント: {hint}")));
        }
        if verbose {
            println!("{}", dim.apply_to("--- テンプレート本文 ---"));
            println!("{}", rec.template_content);
        }
        println!();
    }
}

/// Print a generated email with its metadata footer.
pub fn print_generation(result: &GenerationResult) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!("{} {}", bold.apply_to("件名:"), result.subject);
    println!();
    println!("{}", result.body);
    println!();
    println!(
        "{}",
        dim.apply_to(format!(
            "model={} temperature={} template={} request_id={}",
            result.metadata.model,
            result.metadata.temperature,
            result.metadata.template_name,
            result.metadata.request_id
        ))
    );
    if let Some(error) = &result.metadata.error {
        let yellow = Style::new().yellow();
        println!("{}", yellow.apply_to(format!("エラー: {error}")));
    }
}

pub fn print_analysis(analysis: &ScoreAnalysis) {
    let bold = Style::new().bold();
    println!(
        "{} {:.2}",
        bold.apply_to("熱意スコア:"),
        analysis.enthusiasm_score
    );
    println!(
        "{} {:.2}",
        bold.apply_to("懸念スコア:"),
        analysis.concern_score
    );
    println!("{} {}", bold.apply_to("分析理由:"), analysis.analysis_reason);
}

pub fn print_suggestion(suggestion: &NextActionSuggestion) {
    let style = match suggestion.priority {
        Priority::High => Style::new().red().bold(),
        Priority::Medium => Style::new().yellow(),
        Priority::Low => Style::new().dim(),
    };
    println!(
        "{} {}",
        style.apply_to(format!("[優先度: {}]", suggestion.priority)),
        suggestion.action
    );
    println!("理由: {}", suggestion.reason);
}
