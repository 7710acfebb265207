use serde::Serialize;

/// Returned when the vote service accepted a submission.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VoteAccepted {
    /// Always `true`.
    #[schema(example = true)]
    pub ok: bool,
}

impl VoteAccepted {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for VoteAccepted {
    fn default() -> Self {
        Self::new()
    }
}
