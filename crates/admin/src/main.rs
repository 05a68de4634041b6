//! Operator CLI for the file engine: apply migrations, inspect templates,
//! and print entity chains or resolved file paths.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kinetrack_core::file_tree::{EntityRole, FileKind};
use kinetrack_core::types::DbId;
use kinetrack_pipeline::engine::build_registry;
use kinetrack_pipeline::paths::FileRevisionRef;
use kinetrack_pipeline::{FileEngine, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "kinetrack-admin")]
#[command(about = "Administer the kinetrack file revision store")]
#[command(version)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, env = "KINETRACK_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// List registered file tree templates
    Templates,
    /// Print the ancestor chain of an entity, project first
    Chain { entity_id: DbId },
    /// Print the canonical path of a stored file revision
    Resolve {
        #[arg(value_enum)]
        kind: RevisionKind,
        file_id: DbId,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RevisionKind {
    Working,
    Output,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = PipelineConfig::from_env().context("Invalid configuration")?;

    match args.command {
        Command::Templates => {
            let registry = build_registry(&config)?;
            for name in registry.names() {
                let template = registry.get(name)?;
                for kind in [FileKind::Working, FileKind::Output] {
                    let section = template.section(kind);
                    let roles: Vec<&str> = section.roles().into_iter().map(EntityRole::name).collect();
                    println!(
                        "{name}\t{kind}\tmount={}\troot={}\troles={}",
                        section.mountpoint(),
                        section.root(),
                        roles.join(",")
                    );
                }
            }
        }
        Command::Migrate => {
            let engine = FileEngine::connect(&config).await?;
            kinetrack_db::health_check(engine.pool())
                .await
                .context("Database health check failed")?;
            kinetrack_db::run_migrations(engine.pool())
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }
        Command::Chain { entity_id } => {
            let engine = FileEngine::connect(&config).await?;
            let chain = engine.resolve_chain(entity_id).await?;
            println!("{}", serde_json::to_string_pretty(&chain)?);
        }
        Command::Resolve { kind, file_id } => {
            let engine = FileEngine::connect(&config).await?;
            let file = match kind {
                RevisionKind::Working => FileRevisionRef::Working(file_id),
                RevisionKind::Output => FileRevisionRef::Output(file_id),
            };
            let path = engine.resolve_path_for(file).await?;
            println!("{}", path.full_path());
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kinetrack_admin=info,kinetrack_pipeline=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
