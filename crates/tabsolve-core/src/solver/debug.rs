use std::fmt;

use log::debug;

pub(crate) const DEBUG_TARGET: &str = "tabsolve::solver";

/// Per-solver diagnostic output, tagged with a numeric debug code.
///
/// Messages go through the `log` facade at debug level and are dropped while
/// the channel is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugChannel {
    code: u32,
    enabled: bool,
}

impl DebugChannel {
    pub fn new(code: u32, enabled: bool) -> Self {
        DebugChannel { code, enabled }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn set_code(&mut self, code: u32) {
        self.code = code;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Emit a message if the channel is enabled.
    pub fn print(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            debug!(target: DEBUG_TARGET, "[{}] {}", self.code, args);
        }
    }
}
