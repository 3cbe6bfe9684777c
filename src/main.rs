use anyhow::{Context, Result};
use newsroom::agent::{ImageAnalyzer, SearchProvider, TextGenerator};
use newsroom::cli::commands::{
    AnalyzeImageCommand, ArticlesCommand, GenerateCommand, ServeCommand, VersionsCommand,
};
use newsroom::cli::output::*;
use newsroom::cli::{Cli, Command};
use newsroom::core::{ArticleDraft, Credentials, NewsroomConfig};
use newsroom::execution::engine::http_capabilities;
use newsroom::execution::{ExecutionEvent, PipelineEngine, PipelineOptions};
use newsroom::persistence::{ArticleRecord, ArticleStore, SaveArticle, DRAFT_STATUS};
use newsroom::server::{self, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    let cli = Cli::from_args();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = NewsroomConfig::load(cli.config.as_deref())
        .context("Failed to load newsroom config")?;
    config.validate().context("Invalid newsroom config")?;

    // Execute command
    match &cli.command {
        Command::Generate(cmd) => generate(cmd, &config).await?,
        Command::Serve(cmd) => serve(cmd, &config).await?,
        Command::Articles(cmd) => list_articles(cmd, &config).await?,
        Command::Versions(cmd) => show_versions(cmd, &config).await?,
        Command::AnalyzeImage(cmd) => analyze_image(cmd, &config).await?,
    }

    Ok(())
}

fn credentials() -> Result<Credentials> {
    Credentials::from_env().context("Missing API credentials (set them in the environment or .env)")
}

#[cfg(feature = "sqlite")]
async fn open_store(config: &NewsroomConfig) -> Result<Arc<dyn ArticleStore>> {
    let path = config.database.resolved_path();
    let store = newsroom::persistence::SqliteArticleStore::new(&path)
        .await
        .with_context(|| format!("Failed to open article database at {}", path.display()))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_store(_config: &NewsroomConfig) -> Result<Arc<dyn ArticleStore>> {
    tracing::warn!("Built without sqlite; saved articles last only for this process");
    Ok(Arc::new(newsroom::persistence::InMemoryArticleStore::new()))
}

async fn generate(cmd: &GenerateCommand, config: &NewsroomConfig) -> Result<()> {
    let credentials = credentials()?;
    let mut engine = PipelineEngine::from_config(config, &credentials)
        .context("Failed to set up capabilities")?;
    let brief = cmd.brief();

    let spinner = (!cmd.json).then(|| create_spinner("Starting..."));
    if let Some(progress) = spinner.clone() {
        engine.add_event_handler(move |event| {
            if let ExecutionEvent::StageStarted { stage, .. } = &event {
                progress.set_message(stage_message(*stage));
            }
            progress.println(format_execution_event(&event));
        });
    }

    let result = engine.invoke(brief.clone()).await;
    if let Some(progress) = &spinner {
        progress.finish_and_clear();
    }
    let draft = result.context("Article generation failed")?;

    if let Some(path) = &cmd.output {
        std::fs::write(path, &draft.article)
            .with_context(|| format!("Failed to write article to {}", path.display()))?;
    }

    let saved = if cmd.save {
        let store = open_store(config).await?;
        Some(save_draft(store.as_ref(), &draft, &brief.topic, &brief.angle).await?)
    } else {
        None
    };

    if cmd.json {
        let data = serde_json::json!({
            "run_id": draft.run_id,
            "article": draft.article,
            "sources": draft.sources,
            "image_url": draft.image_url,
            "article_id": saved.as_ref().map(|record| record.id),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("\n{}\n", draft.article);
    println!("{} Sources:", INFO);
    println!("{}", format_sources(&draft.sources));
    if let Some(path) = &cmd.output {
        println!("\n{} Article written to {}", CHECK, style(path.display()).cyan());
    }
    if let Some(record) = &saved {
        println!(
            "\n{} Draft saved (ID: {})",
            CHECK,
            style(record.id).dim()
        );
    }

    Ok(())
}

async fn save_draft(
    store: &dyn ArticleStore,
    draft: &ArticleDraft,
    topic: &str,
    angle: &str,
) -> Result<ArticleRecord> {
    let request = SaveArticle {
        id: None,
        title: draft.headline().unwrap_or_else(|| topic.to_string()),
        content: draft.article.clone(),
        angle: (!angle.trim().is_empty()).then(|| angle.to_string()),
        status: DRAFT_STATUS.to_string(),
        sources: draft.sources.clone(),
        user_id: None,
    };
    store
        .save_article(&request)
        .await
        .context("Failed to save draft")
}

async fn serve(cmd: &ServeCommand, config: &NewsroomConfig) -> Result<()> {
    let credentials = credentials()?;
    let (search, generator) =
        http_capabilities(config, &credentials).context("Failed to set up capabilities")?;

    let generator = Arc::new(generator);
    let search: Arc<dyn SearchProvider> = Arc::new(search);
    let text: Arc<dyn TextGenerator> = generator.clone();
    let analyzer: Arc<dyn ImageAnalyzer> = generator;

    let mut engine = PipelineEngine::new(search, text, PipelineOptions::from_config(config));
    engine.add_event_handler(|event| debug!("{:?}", event));

    let mut server_config = config.server.clone();
    if let Some(listen) = cmd.listen {
        server_config.listen = listen;
    }

    let state = AppState {
        engine: Arc::new(engine),
        analyzer,
        store: open_store(config).await?,
        request_timeout: Duration::from_secs(server_config.request_timeout_secs),
    };

    println!(
        "{} Serving on {}",
        ROCKET,
        style(format!("http://{}", server_config.listen)).cyan()
    );
    server::serve(state, &server_config).await
}

async fn list_articles(cmd: &ArticlesCommand, config: &NewsroomConfig) -> Result<()> {
    let store = open_store(config).await?;
    let articles = store.list_articles().await?;

    if cmd.json {
        let data = serde_json::json!({ "articles": articles });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("{} No saved articles", INFO);
        return Ok(());
    }

    println!("{} Saved articles:", INFO);
    for article in &articles {
        println!("  {}", format_article_summary(article));
    }

    Ok(())
}

async fn show_versions(cmd: &VersionsCommand, config: &NewsroomConfig) -> Result<()> {
    let store = open_store(config).await?;

    let Some(article) = store.load_article(cmd.article_id).await? else {
        println!("{} Article not found", WARN);
        return Ok(());
    };
    let versions = store.list_versions(article.id).await?;

    if cmd.json {
        let data = serde_json::json!({ "article": article, "versions": versions });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{} {} ({} versions)",
        INFO,
        style(&article.title).bold(),
        style(versions.len()).cyan()
    );
    for version in &versions {
        println!("{}", format_version(version));
    }

    Ok(())
}

async fn analyze_image(cmd: &AnalyzeImageCommand, config: &NewsroomConfig) -> Result<()> {
    let credentials = credentials()?;
    let (_, generator) =
        http_capabilities(config, &credentials).context("Failed to set up capabilities")?;

    let spinner = create_spinner("Analyzing image...");
    let result = generator.analyze(&cmd.url).await;
    spinner.finish_and_clear();

    match result {
        Ok(analysis) => {
            println!("{} {}", CHECK, analysis);
            Ok(())
        }
        Err(e) => {
            println!("{} Image analysis failed:", CROSS);
            println!("  {}", style(&e).red());
            std::process::exit(1);
        }
    }
}
