use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::delimited::Delimited;
use crate::error::Result;
use crate::fixed::FixedLength;
use crate::length_prefixed::{LengthPrefixed, LengthPrefixedConfig};
use crate::passthrough::Passthrough;
use crate::strategy::FramingStrategy;

/// Declarative strategy selection, e.g. from an application config file.
///
/// Construction-time validation happens in [`StrategyConfig::build`]; a
/// config that deserializes fine can still fail to build (both delimiters
/// empty, zero frame size).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum StrategyConfig {
    /// No boundary detection; deliver whatever each read returns.
    Passthrough {
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
    /// Every message is exactly `size` bytes.
    FixedLength {
        #[serde(default = "default_fixed_size")]
        size: usize,
    },
    /// Messages wrapped in head/tail marker sequences.
    Delimited {
        #[serde(default)]
        head: Vec<u8>,
        #[serde(default)]
        tail: Vec<u8>,
    },
    /// Messages declaring their own size in an embedded length field.
    LengthPrefixed(LengthPrefixedConfig),
}

fn default_poll_interval_ms() -> u64 {
    crate::passthrough::DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_fixed_size() -> usize {
    FixedLength::DEFAULT_SIZE
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Passthrough {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl StrategyConfig {
    /// Validate the configuration and construct the strategy it describes.
    pub fn build(&self) -> Result<Box<dyn FramingStrategy>> {
        match self {
            Self::Passthrough { poll_interval_ms } => Ok(Box::new(
                Passthrough::with_poll_interval(Duration::from_millis(*poll_interval_ms)),
            )),
            Self::FixedLength { size } => Ok(Box::new(FixedLength::new(*size)?)),
            Self::Delimited { head, tail } => {
                Ok(Box::new(Delimited::new(head.clone(), tail.clone())?))
            }
            Self::LengthPrefixed(config) => Ok(Box::new(LengthPrefixed::new(config.clone())?)),
        }
    }
}
