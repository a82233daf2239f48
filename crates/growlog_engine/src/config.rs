//! Engine configuration.

/// Tunable policy for the sync engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed a newly registered end with dirty shadow rows for every
    /// live record the user already owns, so the new device downloads
    /// the existing diary on its first pull. Defaults to `true`.
    pub backfill_new_ends: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backfill_new_ends: true,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether new ends are backfilled with the existing diary.
    #[must_use]
    pub fn backfill_new_ends(mut self, backfill: bool) -> Self {
        self.backfill_new_ends = backfill;
        self
    }
}
