//! Store configuration.

/// 30 minutes: the standard maximum APRS net cycle time. A station silent
/// for longer than this is considered gone.
pub const DEFAULT_UNHEARD_TIMEOUT: f64 = 30.0 * 60.0;

/// Tunables for [`crate::store::TelemetryStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Seconds after the last heard time at which an entity becomes
    /// expiry-eligible.
    pub unheard_timeout: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            unheard_timeout: DEFAULT_UNHEARD_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        assert_eq!(StoreConfig::default().unheard_timeout, 1800.0);
    }
}
