/// Configuration for the history system.
use rich_pad_config::HistorySettings;

/// Maximum number of undo groups kept per document.
/// Oldest groups are evicted when this limit is exceeded.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 10_000;

/// Time window in milliseconds for grouping consecutive edits
/// into a single undo step.
const DEFAULT_GROUP_TIMEOUT_MS: u64 = 500;

/// Environment variable that overrides the configured history depth.
pub const HISTORY_DEPTH_ENV: &str = "RICH_PAD_HISTORY_DEPTH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max undo groups kept in memory.
    pub max_history_depth: usize,
    /// Grouping timeout in milliseconds. Zero disables grouping.
    pub group_timeout_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
            group_timeout_ms: DEFAULT_GROUP_TIMEOUT_MS,
        }
    }
}

impl From<&HistorySettings> for HistoryConfig {
    fn from(settings: &HistorySettings) -> Self {
        Self {
            max_history_depth: resolve_max_depth(settings.max_history_depth),
            group_timeout_ms: settings.group_timeout_ms,
        }
    }
}

/// Resolves the history depth.
///
/// Resolution order:
/// 1. `RICH_PAD_HISTORY_DEPTH` environment variable (when it parses as a positive number)
/// 2. the configured value
pub fn resolve_max_depth(configured: usize) -> usize {
    std::env::var(HISTORY_DEPTH_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&depth| depth > 0)
        .unwrap_or(configured)
        .max(1)
}
