use std::str::FromStr;
use serde::Deserialize;

use crate::delivery::SinkResponse;

/// Identity of a watcher (the logical owner of one directory + file list).
pub type WatcherId = String;

/// Rule deciding whether a sink response counts as a successful delivery.
///
/// - `Permissive`: anything that came back without an error status is a
///   success. A response with no status at all is accepted, as is any status
///   below 400 (default).
/// - `Strict`: only an explicit 2xx status is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessPolicy {
    Permissive,
    Strict,
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        SuccessPolicy::Permissive
    }
}

impl SuccessPolicy {
    pub fn accepts(&self, response: &SinkResponse) -> bool {
        match (self, response.status) {
            (SuccessPolicy::Permissive, None) => true,
            (SuccessPolicy::Permissive, Some(status)) => status < 400,
            (SuccessPolicy::Strict, None) => false,
            (SuccessPolicy::Strict, Some(status)) => (200..300).contains(&status),
        }
    }
}

impl FromStr for SuccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(SuccessPolicy::Permissive),
            "strict" => Ok(SuccessPolicy::Strict),
            other => Err(format!(
                "invalid success_policy: {other} (expected \"permissive\" or \"strict\")"
            )),
        }
    }
}
