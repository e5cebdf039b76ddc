/// Number of past snapshots kept when nothing else is configured.
///
/// The editor has shipped with both 10 and 25 for this bound. 10 is the
/// value the engine itself used; callers that want 25 pass it explicitly
/// until product decides which one is correct.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Construction parameters for [`crate::HistoryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum length of `past`. Zero keeps no undo information at all.
    pub max_history: usize,
}

impl HistoryConfig {
    pub fn with_max_history(max_history: usize) -> Self {
        Self { max_history }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}
