//! Run configuration read from the environment

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::presets::DEFAULT_SEED;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown policy '{0}', expected 'random' or 'greedy'")]
    UnknownPolicy(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Random,
    Greedy,
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(PolicyKind::Random),
            "greedy" => Ok(PolicyKind::Greedy),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub scenario: String,
    pub episodes: usize,
    pub seed: u64,
    pub policy: PolicyKind,
    /// Per-episode step cap
    pub max_steps: usize,
    pub render: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario: "KeyGiftsDoor-tiny-v0".to_string(),
            episodes: 5,
            seed: DEFAULT_SEED,
            policy: PolicyKind::Greedy,
            max_steps: 2000,
            render: false,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads every setting through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let policy = match lookup("PHASEGRID_POLICY") {
            Some(value) => value.parse()?,
            None => defaults.policy,
        };

        Ok(Self {
            scenario: lookup("PHASEGRID_SCENARIO").unwrap_or(defaults.scenario),
            episodes: parse_var(&lookup, "PHASEGRID_EPISODES")?.unwrap_or(defaults.episodes),
            seed: parse_var(&lookup, "PHASEGRID_SEED")?.unwrap_or(defaults.seed),
            policy,
            max_steps: parse_var(&lookup, "PHASEGRID_MAX_STEPS")?.unwrap_or(defaults.max_steps),
            render: parse_var(&lookup, "PHASEGRID_RENDER")?.unwrap_or(defaults.render),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<RunConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RunConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(from_pairs(&[]), Ok(RunConfig::default()));
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PHASEGRID_SCENARIO", "Key-8x8-v0"),
            ("PHASEGRID_EPISODES", "2"),
            ("PHASEGRID_SEED", "42"),
            ("PHASEGRID_POLICY", "Random"),
            ("PHASEGRID_MAX_STEPS", "50"),
            ("PHASEGRID_RENDER", "true"),
        ])
        .unwrap();

        assert_eq!(config.scenario, "Key-8x8-v0");
        assert_eq!(config.episodes, 2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.policy, PolicyKind::Random);
        assert_eq!(config.max_steps, 50);
        assert!(config.render);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            from_pairs(&[("PHASEGRID_EPISODES", "many")]),
            Err(ConfigError::InvalidValue {
                key: "PHASEGRID_EPISODES",
                value: "many".to_string(),
            })
        );
        assert_eq!(
            from_pairs(&[("PHASEGRID_POLICY", "ppo")]),
            Err(ConfigError::UnknownPolicy("ppo".to_string()))
        );
    }
}
