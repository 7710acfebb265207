use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::poll::PollOption;

/// A single ballot as sent to the vote endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    /// Per-submission voter id. Not a stable identity.
    #[schema(example = "user-482913")]
    pub user_id: String,
    #[schema(example = "poll-1")]
    pub poll_id: String,
    /// Option id, one of `A`, `B`, `C`, `D`.
    #[schema(example = "B")]
    pub option: String,
}

impl VoteSubmission {
    /// Build a submission with a freshly generated `user-<n>` id.
    pub fn new(poll_id: impl Into<String>, option: PollOption) -> Self {
        Self {
            user_id: random_user_id(),
            poll_id: poll_id.into(),
            option: option.id().to_string(),
        }
    }
}

/// Demo-only voter id; offers no de-duplication guarantee.
pub fn random_user_id() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("user-{n}")
}
