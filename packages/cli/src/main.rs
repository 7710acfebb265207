mod api;
mod controller;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use common::{POLL_ID, POLL_QUESTION, PollOption};
use console::Term;
use dialoguer::Select;
use tracing_subscriber::EnvFilter;

use crate::api::HttpPollApi;
use crate::controller::{PollController, SubmitStatus, spawn_refresh_loop};

#[derive(Parser)]
#[command(name = "livepoll", version, about = "Vote in the live poll and watch the results")]
struct Cli {
    /// Base URL of the livepoll server.
    #[arg(
        long,
        global = true,
        env = "LIVEPOLL_SERVER",
        default_value = "http://127.0.0.1:3000"
    )]
    server: String,

    /// Seconds between results refreshes.
    #[arg(
        long,
        global = true,
        default_value_t = 3,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Cast a single vote
    Vote {
        /// Option id (A, B, C or D). Prompts when omitted.
        #[arg(long)]
        option: Option<PollOption>,
    },
    /// Show live results until interrupted
    Results {
        /// Print the results once and exit
        #[arg(long)]
        once: bool,
    },
    /// Vote, then watch the results
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let api = HttpPollApi::new(&cli.server).context("Failed to set up API client")?;
    let controller = Arc::new(PollController::new(Arc::new(api), POLL_ID));
    let period = Duration::from_secs(cli.interval);

    match cli.command.unwrap_or(Command::Run) {
        Command::Vote { option } => {
            let status = vote(&controller, option).await?;
            if status != SubmitStatus::Success {
                bail!("Vote was not accepted");
            }
        }
        Command::Results { once } => watch_results(controller, period, once).await?,
        Command::Run => {
            vote(&controller, None).await?;
            watch_results(controller, period, false).await?;
        }
    }

    Ok(())
}

async fn vote(
    controller: &PollController,
    option: Option<PollOption>,
) -> anyhow::Result<SubmitStatus> {
    let option = match option {
        Some(option) => option,
        None => prompt_option().await?,
    };

    controller.select(option);
    let status = controller.submit().await.unwrap_or_default();

    let term = Term::stdout();
    term.write_line(&render::render_ballot(&controller.snapshot()))?;
    term.write_line("")?;

    Ok(status)
}

async fn prompt_option() -> anyhow::Result<PollOption> {
    let index = tokio::task::spawn_blocking(|| {
        let labels: Vec<_> = PollOption::ALL.iter().map(|o| o.label()).collect();
        Select::new()
            .with_prompt(POLL_QUESTION)
            .items(&labels)
            .default(0)
            .interact()
    })
    .await
    .context("Selection prompt panicked")?
    .context("Failed to read selection")?;

    Ok(PollOption::ALL[index])
}

async fn watch_results(
    controller: Arc<PollController>,
    period: Duration,
    once: bool,
) -> anyhow::Result<()> {
    let term = Term::stdout();
    let mut rx = controller.subscribe();
    let refresh = spawn_refresh_loop(Arc::clone(&controller), period);

    if once {
        let state = rx.wait_for(|s| !s.results.loading).await?.clone();
        refresh.stop().await;
        term.write_line(&render::render_results(&state, controller.poll_id()))?;
        if state.results.error.is_some() {
            bail!("Failed to load results");
        }
        return Ok(());
    }

    loop {
        let state = rx.borrow_and_update().clone();
        term.clear_screen()?;
        term.write_line(&render::render_page(&state, controller.poll_id()))?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => changed?,
        }
    }

    refresh.stop().await;
    Ok(())
}
