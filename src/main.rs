use std::time::Duration;

use anyhow::{Context as _, bail};
use clap::Parser;

use caflow::catalog::{self, TemplateCatalog};
use caflow::cli::{CaseArgs, Cli, Command};
use caflow::config::CaflowConfig;
use caflow::generator::EmailGenerator;
use caflow::ollama::OllamaClient;
use caflow::recommend::{CaseContext, Recommendation, TemplateRecommender};
use caflow::ui;
use caflow::workflow::StatusGraph;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CaflowConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => CaflowConfig::load()?,
    };

    match cli.command {
        Command::Graph => {
            let (graph, _) = load_graph_and_catalog(&config);
            ui::print_graph(&graph);
        }
        Command::Recommend { case } => {
            let (graph, catalog) = load_graph_and_catalog(&config);
            let recommender = TemplateRecommender::new(&graph, &catalog);
            let recommendations = recommender.recommend(&case_context(&case));
            ui::print_recommendations(&recommendations, cli.verbose);
        }
        Command::Generate {
            case,
            template,
            no_template,
        } => {
            let (graph, catalog) = load_graph_and_catalog(&config);
            let ctx = case_context(&case);
            let reference = if no_template {
                None
            } else {
                pick_reference(&graph, &catalog, &ctx, template.as_deref())?
            };

            let generator = EmailGenerator::new(client_from(&config));
            let progress = ui::GenerationProgress::start("メール文面を生成中...");
            let result = generator.generate(&ctx, reference.as_ref()).await;
            match &result.metadata.error {
                None => progress.complete_ok("生成完了"),
                Some(error) => progress.complete_fallback(error),
            }
            println!();
            ui::print_generation(&result);
        }
        Command::Analyze { content, file } => {
            let text = match (content, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => bail!("provide message text or --file"),
            };

            let generator = EmailGenerator::new(client_from(&config));
            let progress = ui::GenerationProgress::start("メッセージを分析中...");
            let analysis = generator.analyze_message(&text).await;
            progress.complete_ok("分析完了");
            println!();
            ui::print_analysis(&analysis);
        }
        Command::Demo => {
            let (graph, catalog) = load_graph_and_catalog(&config);
            run_demo(&graph, &catalog, cli.verbose);
        }
    }

    Ok(())
}

fn case_context(args: &CaseArgs) -> CaseContext {
    CaseContext {
        current_status: args.status.clone(),
        candidate_name: args.candidate.clone(),
        company: args.company.clone(),
        job_title: args.job_title.clone(),
        enthusiasm_score: args.enthusiasm,
        concern_score: args.concern,
        latest_summary: args.summary.clone(),
        message_history: Vec::new(),
    }
}

/// Load the builtin graph and catalog, overlaid with whatever external data
/// files the configuration points at.
fn load_graph_and_catalog(config: &CaflowConfig) -> (StatusGraph, TemplateCatalog) {
    let catalog = TemplateCatalog::load_or_builtin(&config.catalog.templates_file);
    let mut graph = StatusGraph::builtin();
    if let Some(mapping) = catalog::load_status_mapping(&config.catalog.status_mapping_file) {
        graph = graph.with_template_mapping(&mapping);
    }
    (graph, catalog)
}

fn client_from(config: &CaflowConfig) -> OllamaClient {
    OllamaClient::with_timeout(
        &config.llm.base_url,
        &config.llm.model,
        Duration::from_secs(config.llm.timeout_secs),
    )
    .sampling(config.llm.top_p, config.llm.top_k)
}

/// Resolve the reference template for generation: an explicit name when
/// given, otherwise the top-ranked recommendation for the case.
fn pick_reference(
    graph: &StatusGraph,
    catalog: &TemplateCatalog,
    ctx: &CaseContext,
    explicit: Option<&str>,
) -> anyhow::Result<Option<Recommendation>> {
    if let Some(name) = explicit {
        if !catalog.contains(name) {
            bail!("template 「{name}」 is not in the catalog");
        }
        let recommender = TemplateRecommender::new(graph, catalog);
        let mut recommendations = recommender.recommend(ctx);
        if let Some(position) = recommendations
            .iter()
            .position(|rec| rec.template_name == name)
        {
            return Ok(Some(recommendations.swap_remove(position)));
        }
        bail!("template 「{name}」 is not applicable to status 「{}」", ctx.current_status);
    }

    let recommender = TemplateRecommender::new(graph, catalog);
    Ok(recommender.recommend(ctx).into_iter().next())
}

/// Offline demonstration: rank templates for three representative cases
/// without calling the model backend.
fn run_demo(graph: &StatusGraph, catalog: &TemplateCatalog, verbose: bool) {
    let cases = [
        CaseContext {
            current_status: "書類選考中".to_string(),
            candidate_name: "田中太郎".to_string(),
            company: "Acme株式会社".to_string(),
            job_title: "シニアエンジニア".to_string(),
            enthusiasm_score: 0.8,
            concern_score: 0.3,
            latest_summary: "技術面談の評価が高く、本人も前向き。".to_string(),
            message_history: Vec::new(),
        },
        CaseContext {
            current_status: "面接調整中".to_string(),
            candidate_name: "佐藤花子".to_string(),
            company: "Tech Corp".to_string(),
            job_title: "プロダクトマネージャー".to_string(),
            enthusiasm_score: 0.9,
            concern_score: 0.2,
            latest_summary: "一次面接の候補日を待っている状態。".to_string(),
            message_history: Vec::new(),
        },
        CaseContext {
            current_status: "内定".to_string(),
            candidate_name: "鈴木一郎".to_string(),
            company: "StartUp Inc".to_string(),
            job_title: "フロントエンドエンジニア".to_string(),
            enthusiasm_score: 0.7,
            concern_score: 0.6,
            latest_summary: "条件面で気になる点があり、回答を保留している。".to_string(),
            message_history: Vec::new(),
        },
    ];

    let recommender = TemplateRecommender::new(graph, catalog);
    for ctx in &cases {
        println!(
            "=== {}様 / {} / {} ===",
            ctx.candidate_name, ctx.company, ctx.current_status
        );
        let recommendations = recommender.recommend(ctx);
        ui::print_recommendations(&recommendations, verbose);
    }
}
