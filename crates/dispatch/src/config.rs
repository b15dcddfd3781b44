/// Dispatcher tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// How many times a conflicting commit is re-fetched and re-decided
    /// before surfacing `ConcurrentModification`.
    pub max_conflict_retries: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}
