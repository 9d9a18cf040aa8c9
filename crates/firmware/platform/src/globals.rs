use log::Level;

/// Log settings
pub const DEFAULT_LOG_LEVEL: Level = Level::Info;
pub const EXTRA_LOGS: [&str; 1] = ["mmu"];
