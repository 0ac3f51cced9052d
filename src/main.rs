use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use git_story::cli::{Outcome, Pipeline};
use git_story::config::{self, Config};
use git_story::git::{Git2Repository, Repository};
use git_story::http::{HttpTransport, ReqwestTransport};
use git_story::synth::{OpenAiGenerator, TextGenerator};
use git_story::tracker::TrackerGateway;
use git_story::{telemetry, ui};

#[derive(clap::Parser)]
#[command(
    name = "git-story",
    version,
    about = "Turn a feature branch into a tracker story and rename the branch to match"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Base branch to compare against (overrides config)")]
    base: Option<String>,

    #[arg(long, help = "Print the story draft without creating an issue or renaming")]
    dry_run: bool,

    #[arg(long, help = "Validate tracker credentials and exit")]
    check: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose);

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };
    if let Some(base) = args.base {
        config.base_branch = base;
    }

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new().context("Failed to initialize HTTP client")?,
    );

    let gateway = match TrackerGateway::new(config.tracker.clone(), transport.clone()) {
        Ok(gateway) => gateway,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    if args.check {
        return check_credentials(&gateway).await;
    }

    let repo: Arc<dyn Repository> = match Git2Repository::open(".") {
        Ok(repo) => Arc::new(repo),
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let generator = build_generator(&config, transport);
    let pipeline = Pipeline::new(config, repo, generator, gateway);

    if args.dry_run {
        return dry_run(&pipeline).await;
    }

    ui::display_status("Creating story for this branch...");
    let outcome = Outcome::classify(pipeline.run().await);

    match &outcome {
        Outcome::Completed(report) => ui::display_pipeline_success(report),
        Outcome::Skipped(reason) => ui::display_skip(reason),
        Outcome::Failed(e) => ui::display_error(&e.to_string()),
    }

    std::process::exit(outcome.exit_code());
}

fn build_generator(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Option<Arc<dyn TextGenerator>> {
    match OpenAiGenerator::from_config(&config.ai, transport) {
        Some(generator) => Some(Arc::new(generator)),
        None => {
            ui::display_status("No AI API key configured; using rule-based story drafts");
            None
        }
    }
}

async fn check_credentials(gateway: &TrackerGateway) -> Result<()> {
    ui::display_status(&format!("Checking {} credentials...", gateway.name()));
    match gateway.validate_credentials().await {
        Ok(user) => {
            ui::display_success(&format!("Authenticated as {}", user));
            Ok(())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn dry_run(pipeline: &Pipeline) -> Result<()> {
    match pipeline.analyze().await {
        Ok((change_set, draft)) => {
            ui::display_change_set(&change_set);
            ui::display_draft(&draft);
            ui::display_status("Dry run: no issue created, branch unchanged");
            Ok(())
        }
        Err(e) => match Outcome::classify(Err(e)) {
            Outcome::Skipped(reason) => {
                ui::display_skip(&reason);
                Ok(())
            }
            outcome => {
                if let Outcome::Failed(e) = &outcome {
                    ui::display_error(&e.to_string());
                }
                std::process::exit(outcome.exit_code());
            }
        },
    }
}
