//! Generation orchestration: turns a case context (and optionally a
//! recommended template) into a prompt, calls the model backend and parses
//! the raw output into a structured result.
//!
//! Transport failures are recovered locally into fallback results — callers
//! always receive a complete, well-typed value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ollama::TextGenerator;
use crate::parser::{
    self, EmailFallbacks, NextActionSuggestion, ScoreAnalysis,
};
use crate::recommend::{CaseContext, Recommendation};

const EMAIL_TEMPERATURE: f64 = 0.6;
const EMAIL_MAX_TOKENS: u32 = 1000;
const ANALYZE_TEMPERATURE: f64 = 0.3;
const ANALYZE_MAX_TOKENS: u32 = 300;
const ACTION_TEMPERATURE: f64 = 0.4;
const ACTION_MAX_TOKENS: u32 = 300;

/// Bookkeeping attached to every generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub request_id: Uuid,
    pub model: String,
    pub temperature: f64,
    pub used_reference_template: bool,
    /// Reference template name, or "なし" when generation was template-free.
    pub template_name: String,
    pub generated_at: DateTime<Utc>,
    /// Transport error message when the model call failed and the result is
    /// the deterministic fallback.
    pub error: Option<String>,
}

/// A generated email plus audit context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub subject: String,
    pub body: String,
    pub metadata: GenerationMetadata,
    /// The untouched model output, kept for debugging. Empty when the call
    /// itself failed.
    pub raw_response: String,
}

/// Drives the external model for email drafting, message scoring and
/// next-action suggestion.
pub struct EmailGenerator<C> {
    client: C,
}

impl<C: TextGenerator> EmailGenerator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Generate an email for the case, optionally guided by a recommended
    /// template. Never fails: a transport error degrades to the fallback
    /// subject/body with the error recorded in metadata.
    pub async fn generate(
        &self,
        ctx: &CaseContext,
        reference: Option<&Recommendation>,
    ) -> GenerationResult {
        let prompt = match reference {
            Some(rec) => template_prompt(ctx, rec),
            None => plain_prompt(ctx),
        };
        let template_guided = reference.is_some();
        let template_name = reference
            .map(|r| r.template_name.clone())
            .unwrap_or_else(|| "なし".to_string());
        let fallbacks =
            EmailFallbacks::for_case(&ctx.candidate_name, &ctx.company, template_guided);

        let metadata = |error: Option<String>| GenerationMetadata {
            request_id: Uuid::new_v4(),
            model: self.client.model_name().to_string(),
            temperature: EMAIL_TEMPERATURE,
            used_reference_template: template_guided,
            template_name: template_name.clone(),
            generated_at: Utc::now(),
            error,
        };

        match self
            .client
            .generate(&prompt, EMAIL_TEMPERATURE, EMAIL_MAX_TOKENS)
            .await
        {
            Ok(raw) => {
                let email = parser::parse_email(&raw, &fallbacks);
                GenerationResult {
                    subject: email.subject,
                    body: email.body,
                    metadata: metadata(None),
                    raw_response: raw,
                }
            }
            Err(e) => GenerationResult {
                subject: fallbacks.subject,
                body: format!(
                    "お疲れ様です。{}様の{}の件についてご連絡いたします。\n\nエラーが発生したため、詳細は別途お話しさせていただければと思います。",
                    ctx.candidate_name, ctx.company
                ),
                metadata: metadata(Some(e.to_string())),
                raw_response: String::new(),
            },
        }
    }

    /// Score a candidate message for enthusiasm and concern.
    pub async fn analyze_message(&self, content: &str) -> ScoreAnalysis {
        let prompt = format!(
            "以下のメール内容を分析して、候補者の熱意と懸念を0-1の範囲で評価してください。\n\n\
             メール内容:\n{content}\n\n\
             以下の形式で回答してください：\n\
             熱意スコア: [0-1の値]\n\
             懸念スコア: [0-1の値]\n\
             分析理由: [理由]"
        );

        match self
            .client
            .generate(&prompt, ANALYZE_TEMPERATURE, ANALYZE_MAX_TOKENS)
            .await
        {
            Ok(raw) => parser::parse_scores(&raw),
            Err(e) => ScoreAnalysis {
                enthusiasm_score: 0.5,
                concern_score: 0.5,
                analysis_reason: format!("分析エラー: {e}"),
                raw_response: String::new(),
            },
        }
    }

    /// Suggest the next action for the case.
    pub async fn suggest_next_action(&self, ctx: &CaseContext) -> NextActionSuggestion {
        let prompt = format!(
            "候補者の状況を分析して、次に取るべきアクションを提案してください。\n\n\
             候補者: {candidate}様\n\
             企業: {company}\n\
             職種: {job_title}\n\
             現在の状況: {status}\n\
             熱意レベル: {enthusiasm:.0}%\n\
             懸念レベル: {concern:.0}%\n\n\
             状況詳細:\n{summary}\n\n\
             以下の形式で回答してください：\n\
             アクション: [具体的なアクション]\n\
             理由: [理由]\n\
             優先度: [高/中/低]",
            candidate = ctx.candidate_name,
            company = ctx.company,
            job_title = ctx.job_title,
            status = ctx.current_status,
            enthusiasm = ctx.enthusiasm_score * 100.0,
            concern = ctx.concern_score * 100.0,
            summary = ctx.latest_summary,
        );

        match self
            .client
            .generate(&prompt, ACTION_TEMPERATURE, ACTION_MAX_TOKENS)
            .await
        {
            Ok(raw) => parser::parse_next_action(&raw),
            Err(e) => NextActionSuggestion {
                action: "候補者に連絡を取る".to_string(),
                reason: format!("エラー: {e}"),
                priority: parser::Priority::Medium,
                raw_response: String::new(),
            },
        }
    }
}

/// Shared case-detail block embedded in both prompt shapes.
fn case_details(ctx: &CaseContext) -> String {
    format!(
        "## 案件の詳細情報\n\
         - 候補者: {candidate}様\n\
         - 企業: {company}\n\
         - 職種: {job_title}\n\
         - 現在の状況: {status}\n\
         - 熱意レベル: {enthusiasm:.0}%（高いほど前向き）\n\
         - 懸念レベル: {concern:.0}%（高いほど心配事が多い）\n\n\
         ## 状況の詳細と過去の経緯\n{summary}",
        candidate = ctx.candidate_name,
        company = ctx.company,
        job_title = ctx.job_title,
        status = ctx.current_status,
        enthusiasm = ctx.enthusiasm_score * 100.0,
        concern = ctx.concern_score * 100.0,
        summary = ctx.latest_summary,
    )
}

const ANSWER_FORMAT: &str = "以下の形式で必ず回答してください：\n件名: [件名]\n本文: [本文]";

fn plain_prompt(ctx: &CaseContext) -> String {
    format!(
        "あなたは10年以上の経験を持つプロフェッショナルなキャリアアドバイザーです。\n\
         以下の詳細情報を基に、効果的なメール文面を作成してください。\n\n\
         {details}\n\n\
         ## 作成指示\n\
         過去のやり取りを踏まえた具体的な提案と、明確で実行可能な次のステップを含め、\n\
         丁寧だが堅すぎない文体で200-500文字程度にまとめてください。\n\
         候補者の懸念や希望を反映した、人間味のある内容にしてください。\n\n\
         {format}",
        details = case_details(ctx),
        format = ANSWER_FORMAT,
    )
}

fn template_prompt(ctx: &CaseContext, reference: &Recommendation) -> String {
    format!(
        "あなたは10年以上の経験を持つプロフェッショナルなキャリアアドバイザーです。\n\
         以下の参考テンプレートを基に、具体的な状況に合わせて{receiver}宛のメール文面を作成してください。\n\n\
         ## 参考テンプレート「{name}」\n{body}\n\n\
         {details}\n\n\
         ## 作成指示\n\
         参考テンプレートの構造・文体・表現を活かしつつ、●●や○○などのプレースホルダーを\n\
         具体的な情報に置換し、候補者の熱意や懸念の状況を考慮したトーンに調整してください。\n\n\
         {format}",
        receiver = reference.receiver.description(),
        name = reference.template_name,
        body = reference.template_content,
        details = case_details(ctx),
        format = ANSWER_FORMAT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::OllamaError;
    use crate::recommend::TemplateCategory;
    use crate::workflow::Role;

    struct MockClient {
        response: Result<String, ()>,
    }

    impl MockClient {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
            }
        }

        fn err() -> Self {
            Self { response: Err(()) }
        }
    }

    impl TextGenerator for MockClient {
        fn model_name(&self) -> &str {
            "qwen3:30b"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _temperature: f64,
            _max_tokens: u32,
        ) -> Result<String, OllamaError> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(OllamaError::ApiError {
                    status: 500,
                    message: "mock error".to_string(),
                }),
            }
        }
    }

    fn context() -> CaseContext {
        CaseContext {
            current_status: "書類選考中".to_string(),
            candidate_name: "田中太郎".to_string(),
            company: "Acme株式会社".to_string(),
            job_title: "シニアエンジニア".to_string(),
            enthusiasm_score: 0.8,
            concern_score: 0.3,
            latest_summary: "技術力は高いが、転職理由を詳しく聞く必要がある。".to_string(),
            message_history: Vec::new(),
        }
    }

    fn recommendation() -> Recommendation {
        Recommendation {
            template_name: "書類通過(CA→CS)".to_string(),
            template_content: "書類選考通過のご連絡です。".to_string(),
            relevance_score: 0.8,
            reason: "標準的な対応として推奨".to_string(),
            sender: Role::Ca,
            receiver: Role::Cs,
            category: TemplateCategory::DocumentScreening,
            customization_hints: Vec::new(),
        }
    }

    #[tokio::test]
    async fn generate_parses_model_output() {
        let generator = EmailGenerator::new(MockClient::ok("件名: ご連絡\n本文: お世話になっております。"));
        let result = generator.generate(&context(), None).await;

        assert_eq!(result.subject, "ご連絡");
        assert_eq!(result.body, "お世話になっております。");
        assert_eq!(result.metadata.model, "qwen3:30b");
        assert_eq!(result.metadata.temperature, 0.6);
        assert!(!result.metadata.used_reference_template);
        assert_eq!(result.metadata.template_name, "なし");
        assert!(result.metadata.error.is_none());
        assert_eq!(result.raw_response, "件名: ご連絡\n本文: お世話になっております。");
    }

    #[tokio::test]
    async fn generate_with_reference_records_template() {
        let generator = EmailGenerator::new(MockClient::ok("件名: 通過\n本文: おめでとうございます。"));
        let rec = recommendation();
        let result = generator.generate(&context(), Some(&rec)).await;

        assert!(result.metadata.used_reference_template);
        assert_eq!(result.metadata.template_name, "書類通過(CA→CS)");
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_fallback_result() {
        let generator = EmailGenerator::new(MockClient::err());
        let result = generator.generate(&context(), None).await;

        assert_eq!(result.subject, "【田中太郎様】Acme株式会社案件の件");
        assert!(result.body.contains("エラーが発生したため"));
        assert!(result.raw_response.is_empty());
        let error = result.metadata.error.unwrap();
        assert!(error.contains("mock error"));
    }

    #[tokio::test]
    async fn malformed_output_still_yields_complete_result() {
        let generator = EmailGenerator::new(MockClient::ok("形式を無視した一段落。"));
        let result = generator.generate(&context(), None).await;

        assert_eq!(result.subject, "【田中太郎様】Acme株式会社案件の件");
        assert_eq!(result.body, "形式を無視した一段落。");
    }

    #[tokio::test]
    async fn analyze_message_parses_scores() {
        let generator =
            EmailGenerator::new(MockClient::ok("熱意スコア: 0.9\n懸念スコア: 0.1\n分析理由: 前向き"));
        let analysis = generator.analyze_message("ぜひ面接に進みたいです。").await;

        assert_eq!(analysis.enthusiasm_score, 0.9);
        assert_eq!(analysis.concern_score, 0.1);
        assert_eq!(analysis.analysis_reason, "前向き");
    }

    #[tokio::test]
    async fn analyze_message_error_keeps_defaults() {
        let generator = EmailGenerator::new(MockClient::err());
        let analysis = generator.analyze_message("本文").await;

        assert_eq!(analysis.enthusiasm_score, 0.5);
        assert_eq!(analysis.concern_score, 0.5);
        assert!(analysis.analysis_reason.starts_with("分析エラー:"));
    }

    #[tokio::test]
    async fn suggest_next_action_parses_fields() {
        let generator = EmailGenerator::new(MockClient::ok(
            "アクション: 意向確認の連絡\n理由: 回答期限が近い\n優先度: 高",
        ));
        let suggestion = generator.suggest_next_action(&context()).await;

        assert_eq!(suggestion.action, "意向確認の連絡");
        assert_eq!(suggestion.priority, parser::Priority::High);
    }

    #[tokio::test]
    async fn suggest_next_action_error_degrades() {
        let generator = EmailGenerator::new(MockClient::err());
        let suggestion = generator.suggest_next_action(&context()).await;

        assert_eq!(suggestion.action, "候補者に連絡を取る");
        assert!(suggestion.reason.starts_with("エラー:"));
        assert_eq!(suggestion.priority, parser::Priority::Medium);
    }

    #[test]
    fn prompts_embed_required_case_fields() {
        let ctx = context();
        for prompt in [plain_prompt(&ctx), template_prompt(&ctx, &recommendation())] {
            assert!(prompt.contains("田中太郎"));
            assert!(prompt.contains("Acme株式会社"));
            assert!(prompt.contains("シニアエンジニア"));
            assert!(prompt.contains("書類選考中"));
            assert!(prompt.contains("80%"));
            assert!(prompt.contains("30%"));
            assert!(prompt.contains("転職理由"));
            assert!(prompt.contains("件名:"));
        }
    }

    #[test]
    fn template_prompt_embeds_reference() {
        let prompt = template_prompt(&context(), &recommendation());
        assert!(prompt.contains("書類通過(CA→CS)"));
        assert!(prompt.contains("書類選考通過のご連絡です。"));
        assert!(prompt.contains("候補者宛"));
    }
}
