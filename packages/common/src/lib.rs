pub mod poll;
pub mod results;
pub mod vote;

pub use poll::{POLL_ID, POLL_QUESTION, PollOption, label_for};
pub use results::{ResultItem, ResultsResponse, normalize_labels, percentage, total_votes};
pub use vote::VoteSubmission;
