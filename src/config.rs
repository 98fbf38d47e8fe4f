//! Store configuration.

use std::env;

pub const STRICT_COLUMNS_ENV: &str = "TAB_STORE_STRICT_COLUMNS";
pub const SYNC_ON_CLOSE_ENV: &str = "TAB_STORE_SYNC_ON_CLOSE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Writes must carry exactly two fields free of tabs and line breaks.
    pub strict_columns: bool,
    /// `close` syncs written data to disk after flushing.
    pub sync_on_close: bool,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            strict_columns: env_flag(STRICT_COLUMNS_ENV),
            sync_on_close: env_flag(SYNC_ON_CLOSE_ENV),
        }
    }

    pub fn with_strict_columns(mut self, strict_columns: bool) -> Self {
        self.strict_columns = strict_columns;
        self
    }

    pub fn with_sync_on_close(mut self, sync_on_close: bool) -> Self {
        self.sync_on_close = sync_on_close;
        self
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}
