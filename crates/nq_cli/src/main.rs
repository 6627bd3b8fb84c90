use anyhow::Context;
use clap::{Parser, Subcommand};
use nq_core::config::{GeneratorConfig, NewsSourceConfig, PipelineConfig, DEFAULT_GEMINI_MODEL};
use nq_core::PostStore;
use nq_sources::{BlogPipeline, GNewsClient};
use nq_web::{create_app, AppState};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

mod logging;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let factor = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(factor)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Turns technology headlines into AI-written blog posts", long_about = None)]
struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, global = true, default_value = "sqlite")]
    storage: String,
    /// SQLite database file
    #[arg(long, global = true, default_value = nq_storage::DEFAULT_DATABASE_PATH)]
    database: PathBuf,
    /// Content generator. Available generators: gemini (default), dummy
    #[arg(long, global = true, default_value = "gemini")]
    generator: String,
    #[arg(long, global = true, env = "GNEWS_API_KEY", hide_env_values = true)]
    gnews_api_key: Option<String>,
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    model: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the blog API over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
        /// Also run the pipeline in the background (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        generate_every: Option<HumanDuration>,
    },
    /// Run the generation pipeline once, or periodically with --interval
    Generate {
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Inspect stored posts
    Posts {
        #[command(subcommand)]
        command: PostCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PostCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 9)]
        page_size: usize,
    },
    Show {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

fn build_pipeline(cli: &Cli, store: Arc<dyn PostStore>) -> anyhow::Result<Arc<BlogPipeline>> {
    let source = Arc::new(GNewsClient::new(NewsSourceConfig::new(cli.gnews_api_key.clone())));

    let mut generator_config =
        GeneratorConfig::new(cli.gemini_api_key.clone()).with_model(cli.model.clone());
    generator_config.backend = cli.generator.clone();
    let generator = nq_inference::create_generator(&generator_config)?;
    info!("🧠 Content generator initialized (using {})", generator.name());

    Ok(Arc::new(BlogPipeline::new(
        source,
        generator,
        store,
        PipelineConfig::default(),
    )))
}

async fn run_periodically(pipeline: Arc<BlogPipeline>, interval: Duration) {
    info!(
        "⏱️ Running in periodic mode every {}s (topic: {})",
        interval.as_secs(),
        pipeline.config().topic
    );
    loop {
        let report = pipeline.run().await;
        info!(status = ?report.status, new_posts = report.new_post_count, "Generation cycle finished");
        info!("Waiting {}s before next run", interval.as_secs());
        tokio::time::sleep(interval).await;
    }
}

async fn serve(
    store: Arc<dyn PostStore>,
    pipeline: Arc<BlogPipeline>,
    host: &str,
    port: u16,
    generate_every: Option<HumanDuration>,
) -> anyhow::Result<()> {
    if let Some(HumanDuration(interval)) = generate_every {
        tokio::spawn(run_periodically(pipeline.clone(), interval));
    }

    let app = create_app(AppState::new(store, pipeline));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("🌐 Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Row offset of a 1-based page, saturating for absurd page numbers.
fn page_offset(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size)
}

async fn handle_posts(store: Arc<dyn PostStore>, command: PostCommands) -> anyhow::Result<()> {
    match command {
        PostCommands::List { page, page_size } => {
            let page = page.max(1);
            let page_size = page_size.clamp(1, 100);
            let posts = store
                .list_recent(page_offset(page, page_size), page_size)
                .await?;
            let total = store.count().await?;
            println!("Page {} ({} posts total)", page, total);
            for post in posts {
                println!(
                    "{}  {}  {}",
                    post.id,
                    post.created_at.format("%Y-%m-%d %H:%M"),
                    post.title
                );
            }
        }
        PostCommands::Show { id } => {
            let post = store
                .get(id)
                .await?
                .ok_or_else(|| nq_core::Error::not_found("Post", id))?;
            let comments = store.list_comments(id).await?;
            let mut detail = serde_json::to_value(&post)?;
            detail["tagList"] = serde_json::json!(post.tag_list());
            detail["comments"] = serde_json::to_value(&comments)?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        PostCommands::Delete { id } => {
            if store.delete(id).await? {
                println!("🗑️ Deleted post {}", id);
            } else {
                anyhow::bail!("Post with id {} not found", id);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();
    let cli = Cli::parse();

    let store = nq_storage::create_storage(&cli.storage, Some(cli.database.as_path())).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    match cli.command {
        Commands::Serve {
            ref host,
            port,
            generate_every,
        } => {
            let pipeline = build_pipeline(&cli, store.clone())?;
            serve(store, pipeline, host, port, generate_every).await?;
        }
        Commands::Generate { interval } => {
            let pipeline = build_pipeline(&cli, store)?;
            match interval {
                Some(HumanDuration(interval)) => run_periodically(pipeline, interval).await,
                None => {
                    let report = pipeline.run().await;
                    println!("{}", serde_json::to_string(&report)?);
                }
            }
        }
        Commands::Posts { command } => {
            if let Err(e) = handle_posts(store, command).await {
                error!("{}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
