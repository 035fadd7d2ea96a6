//! Runtime parameters for the liquidation sweep.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bot runtime parameters (the `[bot]` table of a deployment file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Pause after each confirmed liquidation (milliseconds)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Bonus over the nominal debt amount when sizing the seize (basis points)
    #[serde(default = "default_liquidation_bonus_bps")]
    pub liquidation_bonus_bps: u16,

    /// Plan and log liquidations without submitting them
    #[serde(default)]
    pub dry_run: bool,
}

fn default_cooldown_ms() -> u64 {
    3000
}
fn default_liquidation_bonus_bps() -> u16 {
    1000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            liquidation_bonus_bps: default_liquidation_bonus_bps(),
            dry_run: false,
        }
    }
}

impl BotConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(
            cooldown_ms = self.cooldown_ms,
            liquidation_bonus_bps = self.liquidation_bonus_bps,
            dry_run = self.dry_run,
            "Bot parameters"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert_eq!(config.cooldown(), Duration::from_secs(3));
        assert_eq!(config.liquidation_bonus_bps, 1000);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let config: BotConfig = toml::from_str("dry_run = true").unwrap();
        assert!(config.dry_run);
        assert_eq!(config.cooldown_ms, 3000);
        assert_eq!(config.liquidation_bonus_bps, 1000);
    }
}
