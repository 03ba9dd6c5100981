use std::{env, str::FromStr, time::Duration};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub ledger: LedgerConfig,
    pub poll: PollConfig,
}

#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub pixels_per_side: u32,
    pub max_pixels_per_txn: usize,
    pub stroke_width_min: u32,
    pub stroke_width_max: u32,
    pub optimistic_ttl_ms: u64,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub node_url: String,
    pub module_id: String,
    pub canvas_address: String,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            canvas: CanvasConfig {
                pixels_per_side: env_or_parse("CANVAS_PIXELS_PER_SIDE", 1000)?,
                max_pixels_per_txn: env_or_parse("CANVAS_MAX_PIXELS_PER_TXN", 800)?,
                stroke_width_min: env_or_parse("CANVAS_STROKE_WIDTH_MIN", 1)?,
                stroke_width_max: env_or_parse("CANVAS_STROKE_WIDTH_MAX", 8)?,
                optimistic_ttl_ms: env_or_parse("CANVAS_OPTIMISTIC_TTL_MS", 30_000)?,
            },
            ledger: LedgerConfig {
                node_url: env_or_default("LEDGER_NODE_URL", "http://127.0.0.1:8080/v1"),
                module_id: env_or_default("LEDGER_MODULE_ID", "0x1::canvas_token"),
                canvas_address: env_or_default("LEDGER_CANVAS_ADDRESS", "0x1"),
            },
            poll: PollConfig {
                interval: Duration::from_millis(env_or_parse("CANVAS_POLL_INTERVAL_MS", 6000)?),
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas.pixels_per_side == 0 {
            return Err(EngineError::InvalidParams(
                "Canvas dimensions must be positive".into(),
            ));
        }

        if self.canvas.max_pixels_per_txn == 0 {
            return Err(EngineError::InvalidParams(
                "Max pixels per transaction must be positive".into(),
            ));
        }

        if self.canvas.stroke_width_min < 1
            || self.canvas.stroke_width_min > self.canvas.stroke_width_max
        {
            return Err(EngineError::InvalidParams(
                "Stroke width bounds must satisfy 1 <= min <= max".into(),
            ));
        }

        // The overlay must outlive at least one poll cycle or confirmed
        // pixels would flicker back to the stale authoritative color.
        if self.canvas.optimistic_ttl_ms <= self.poll.interval.as_millis() as u64 {
            return Err(EngineError::InvalidParams(
                "Optimistic TTL must exceed the poll interval".into(),
            ));
        }

        if !self.ledger.module_id.contains("::") {
            return Err(EngineError::InvalidParams(
                "Module id must be of the form <address>::<module>".into(),
            ));
        }

        Ok(())
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|_| EngineError::InvalidParams(format!("Invalid value for {key}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            canvas: CanvasConfig {
                pixels_per_side: 1000,
                max_pixels_per_txn: 800,
                stroke_width_min: 1,
                stroke_width_max: 8,
                optimistic_ttl_ms: 30_000,
            },
            ledger: LedgerConfig {
                node_url: "http://127.0.0.1:8080/v1".into(),
                module_id: "0x1::canvas_token".into(),
                canvas_address: "0x1".into(),
            },
            poll: PollConfig {
                interval: Duration::from_millis(6000),
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_ttl_not_exceeding_poll_interval() {
        let mut config = base_config();
        config.canvas.optimistic_ttl_ms = 6000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_stroke_width_bounds() {
        let mut config = base_config();
        config.canvas.stroke_width_min = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bare_module_id() {
        let mut config = base_config();
        config.ledger.module_id = "canvas_token".into();
        assert!(config.validate().is_err());
    }
}
