use serde::{Deserialize, Serialize};

use crate::state::column_stats::StatsReport;

/// Outcome of a statistics computation.
///
/// Serialized as `{"success": true, "result": {...}}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawEnvelope", try_from = "RawEnvelope")]
pub enum StatsEnvelope {
    Success(StatsReport),
    Failure(String),
}

#[derive(Serialize, Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<StatsReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<StatsEnvelope> for RawEnvelope {
    fn from(envelope: StatsEnvelope) -> Self {
        match envelope {
            StatsEnvelope::Success(report) => RawEnvelope {
                success: true,
                result: Some(report),
                error: None,
            },
            StatsEnvelope::Failure(message) => RawEnvelope {
                success: false,
                result: None,
                error: Some(message),
            },
        }
    }
}

impl TryFrom<RawEnvelope> for StatsEnvelope {
    type Error = String;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        match (raw.success, raw.result, raw.error) {
            (true, Some(report), None) => Ok(StatsEnvelope::Success(report)),
            (false, None, Some(message)) => Ok(StatsEnvelope::Failure(message)),
            (true, _, _) => Err("success envelope must carry only a result".to_string()),
            (false, _, _) => Err("failure envelope must carry only an error".to_string()),
        }
    }
}

impl StatsEnvelope {
    pub fn is_success(&self) -> bool {
        matches!(self, StatsEnvelope::Success(_))
    }

    pub fn result(&self) -> Option<&StatsReport> {
        match self {
            StatsEnvelope::Success(report) => Some(report),
            StatsEnvelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StatsEnvelope::Success(_) => None,
            StatsEnvelope::Failure(message) => Some(message),
        }
    }
}
