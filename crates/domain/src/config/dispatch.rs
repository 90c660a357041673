use serde::{Deserialize, Serialize};

/// Dispatcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum number of events processed at once.  `1` keeps the single
    /// dispatch loop; larger values fan out across actors while events of
    /// the same actor still run one at a time, in arrival order.
    #[serde(default = "d_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: d_max_in_flight(),
        }
    }
}

fn d_max_in_flight() -> usize {
    1
}
