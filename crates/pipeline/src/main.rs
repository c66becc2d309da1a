use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinematoday_pipeline::apply::{apply_clues, ApplyMode};
use cinematoday_pipeline::config::PipelineConfig;
use cinematoday_pipeline::ingest::{ingest_now_playing, IngestOptions};
use cinematoday_pipeline::review::{audit_clues, preview_clues, DEFAULT_PREVIEW_LIMIT};
use cinematoday_tmdb::NowPlayingQuery;

/// CinemaToday clue authoring pipeline.
#[derive(Debug, Parser)]
#[command(name = "cinematoday-pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh the movie store from the catalog's now-playing listing.
    Ingest {
        #[arg(long, default_value = "GB")]
        region: String,
        #[arg(long, default_value = "en-GB")]
        language: String,
        #[arg(long, default_value_t = 2)]
        max_pages: u32,
    },
    /// Generate clues and write them to the store.
    Apply {
        /// Regenerate clues for movies that already have them.
        #[arg(long)]
        overwrite: bool,
        /// With --overwrite, only the first N movies by id.
        #[arg(long, requires = "overwrite")]
        limit: Option<i64>,
    },
    /// Generate clues for a few movies and record them without storing.
    Preview {
        #[arg(long, default_value_t = DEFAULT_PREVIEW_LIMIT)]
        limit: i64,
    },
    /// Record word-count statistics and a sample of the stored clues.
    Audit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinematoday_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env()?;

    let pool = cinematoday_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    cinematoday_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let tracker = config.tracker();

    match cli.command {
        Command::Ingest {
            region,
            language,
            max_pages,
        } => {
            let catalog = config.tmdb_client()?;
            let options = IngestOptions {
                query: NowPlayingQuery {
                    region,
                    language,
                    max_pages,
                },
                image_base_url: config.tmdb_image_base_url.clone(),
            };
            let summary = ingest_now_playing(&pool, &catalog, tracker, &options).await?;
            for title in &summary.titles {
                println!("{title}");
            }
        }
        Command::Apply { overwrite, limit } => {
            let generator = config.clue_generator()?;
            let mode = if overwrite {
                ApplyMode::Overwrite { limit }
            } else {
                ApplyMode::MissingOnly
            };
            let summary = apply_clues(&pool, &generator, tracker, mode).await?;
            println!(
                "Applied clues to {} movies ({} inserted, {} deleted)",
                summary.movies_processed, summary.clues_inserted, summary.clues_deleted
            );
        }
        Command::Preview { limit } => {
            let generator = config.clue_generator()?;
            let items = preview_clues(&pool, &generator, tracker, limit).await?;
            print!(
                "{}",
                cinematoday_pipeline::review::render_clue_listing(&items)
            );
        }
        Command::Audit => {
            let report = audit_clues(&pool, tracker).await?;
            if let Some(lengths) = report.lengths {
                println!(
                    "{} clues across {} movies: min {} / mean {:.1} / max {} words",
                    report.num_clues, report.num_movies, lengths.min, lengths.mean, lengths.max
                );
            }
        }
    }

    pool.close().await;
    Ok(())
}
