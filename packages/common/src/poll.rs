use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the single poll this application votes on.
pub const POLL_ID: &str = "poll-1";

/// Question shown above the ballot.
pub const POLL_QUESTION: &str = "What's your favorite AWS serverless service?";

/// One of the fixed choices on the ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum PollOption {
    #[serde(rename = "A")]
    ApiGateway,
    #[serde(rename = "B")]
    Lambda,
    #[serde(rename = "C")]
    DynamoDb,
    #[serde(rename = "D")]
    Kinesis,
}

impl PollOption {
    /// All options in ballot order.
    pub const ALL: &'static [PollOption] = &[
        Self::ApiGateway,
        Self::Lambda,
        Self::DynamoDb,
        Self::Kinesis,
    ];

    /// Wire identifier (`"A"` through `"D"`).
    pub fn id(&self) -> &'static str {
        match self {
            Self::ApiGateway => "A",
            Self::Lambda => "B",
            Self::DynamoDb => "C",
            Self::Kinesis => "D",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ApiGateway => "API Gateway",
            Self::Lambda => "Lambda",
            Self::DynamoDb => "DynamoDB",
            Self::Kinesis => "Kinesis",
        }
    }

    /// Look up an option by its wire identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|opt| opt.id() == id)
    }
}

/// Label for an option id, falling back to the raw id when it is not on the ballot.
pub fn label_for(option_id: &str) -> &str {
    PollOption::from_id(option_id)
        .map(|opt| opt.label())
        .unwrap_or(option_id)
}

impl fmt::Display for PollOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error when parsing an unknown option id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionError {
    invalid: String,
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid option '{}'. Valid values: {}",
            self.invalid,
            PollOption::ALL
                .iter()
                .map(|o| o.id())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseOptionError {}

impl FromStr for PollOption {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim()).ok_or_else(|| ParseOptionError {
            invalid: s.to_string(),
        })
    }
}
