//! Resolver settings derived from the `[input]` configuration table.

use anyhow::{Context, Result, bail};
use core_config::Config;
use core_events::{KeyEvent, parse_keys};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    pub cancel_key: KeyEvent,
    pub register_prefix: KeyEvent,
    /// Counts saturate at this value.
    pub max_count: u32,
    /// Raw keys retained per resolution attempt.
    pub history_limit: usize,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            cancel_key: KeyEvent::esc(),
            register_prefix: KeyEvent::char('"'),
            max_count: 999_999,
            history_limit: 64,
        }
    }
}

impl DispatcherSettings {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let input = &cfg.file.input;
        let cancel_key = single_key(&input.cancel_key).context("invalid input.cancel_key")?;
        let register_prefix =
            single_key(&input.register_prefix).context("invalid input.register_prefix")?;
        if cancel_key == register_prefix {
            bail!("input.cancel_key and input.register_prefix must differ ({cancel_key})");
        }
        Ok(Self {
            cancel_key,
            register_prefix,
            max_count: input.max_count.max(1),
            history_limit: input.history_limit.max(1),
        })
    }
}

fn single_key(notation: &str) -> Result<KeyEvent> {
    let keys = parse_keys(notation)?;
    match keys.as_slice() {
        [key] => Ok(*key),
        _ => bail!("expected exactly one key, got `{notation}`"),
    }
}
