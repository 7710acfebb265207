use common::{POLL_QUESTION, PollOption, percentage};
use console::style;

use crate::controller::{SubmitStatus, ViewState};

const BAR_WIDTH: usize = 24;

pub const SUCCESS_TEXT: &str =
    "Vote received! It's been pushed through Kinesis and processed by Lambda into DynamoDB.";
pub const ERROR_TEXT: &str = "Something went wrong submitting your vote. Try again.";
pub const LOADING_TEXT: &str = "Loading results…";
pub const EMPTY_TEXT: &str = "No votes yet. Be the first to vote!";

/// Ballot panel: options, button state, and the outcome of the last submit.
pub fn render_ballot(state: &ViewState) -> String {
    let mut lines = vec![style(POLL_QUESTION).bold().to_string(), String::new()];

    for option in PollOption::ALL {
        let line = if state.selected == Some(*option) {
            style(format!("(•) {}", option.label())).green().to_string()
        } else {
            format!("( ) {}", option.label())
        };
        lines.push(format!("  {line}"));
    }

    lines.push(String::new());
    let button = if state.submitting {
        "Submitting..."
    } else {
        "Cast vote"
    };
    if state.can_submit() {
        lines.push(format!("[ {} ]", style(button).green().bold()));
    } else {
        lines.push(format!("[ {} ]", style(button).dim()));
    }

    match state.submit_status {
        SubmitStatus::Success => lines.push(style(SUCCESS_TEXT).green().to_string()),
        SubmitStatus::Error => lines.push(style(ERROR_TEXT).red().to_string()),
        SubmitStatus::Idle => {}
    }

    lines.join("\n")
}

/// Live results panel. Cached results stay visible next to a refresh error.
pub fn render_results(state: &ViewState, poll_id: &str) -> String {
    let results = &state.results;
    let mut lines = vec![style("Live results").bold().to_string(), String::new()];

    if results.loading && results.items.is_none() {
        lines.push(style(LOADING_TEXT).dim().to_string());
    }

    if let Some(error) = &results.error {
        lines.push(style(error).red().to_string());
    }

    match results.items.as_deref() {
        Some([]) if !results.loading => lines.push(style(EMPTY_TEXT).dim().to_string()),
        Some(items) if !items.is_empty() => {
            let total = state.total_votes();
            lines.push(format!("Total votes  {total}"));
            lines.push(String::new());
            for item in items {
                let pct = percentage(item.count, total);
                lines.push(format!(
                    "{}  {} ({}%)",
                    item.label,
                    style(item.count).dim(),
                    pct
                ));
                lines.push(bar(pct));
            }
        }
        _ => {}
    }

    lines.push(String::new());
    lines.push(
        style(format!(
            "This panel polls /api/results/{poll_id} every few seconds. That endpoint reads \
             aggregated counts from the intermediate_results DynamoDB table that's updated by \
             your Lambda consumer."
        ))
        .dim()
        .to_string(),
    );

    lines.join("\n")
}

/// Both panels, ballot first.
pub fn render_page(state: &ViewState, poll_id: &str) -> String {
    format!(
        "{}\n\n{}",
        render_ballot(state),
        render_results(state, poll_id)
    )
}

fn bar(pct: u32) -> String {
    let filled = (pct.min(100) as usize * BAR_WIDTH) / 100;
    format!(
        "{}{}",
        style("█".repeat(filled)).green(),
        style("░".repeat(BAR_WIDTH - filled)).dim()
    )
}
