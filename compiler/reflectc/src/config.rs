//! Plugin configuration and its command-line flags.

use reflect_diagnostic::DiagnosticConfig;
use reflect_shape::{ShapeConfig, SingletonPolicy, DEFAULT_MAX_SHAPE_DEPTH};
use reflect_synth::{DecoratorOrder, SynthConfig, DEFAULT_MAX_NAME_SUFFIX};

/// Everything a pass can be tuned by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginConfig {
    /// Which decorator of a chain ends up outermost.
    pub decorator_order: DecoratorOrder,
    /// How one-variant hierarchies are classified.
    pub singleton: SingletonPolicy,
    /// Nesting limit for shape classification.
    pub max_shape_depth: usize,
    /// Highest `_N` suffix tried before naming gives up.
    pub max_name_suffix: u32,
    pub diagnostics: DiagnosticConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        PluginConfig {
            decorator_order: DecoratorOrder::default(),
            singleton: SingletonPolicy::default(),
            max_shape_depth: DEFAULT_MAX_SHAPE_DEPTH,
            max_name_suffix: DEFAULT_MAX_NAME_SUFFIX,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown value `{value}` for `--{flag}` (expected {expected})")]
    UnknownValue {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("`--{flag}` expects a non-negative number, got `{value}`")]
    InvalidNumber { flag: &'static str, value: String },
}

impl PluginConfig {
    /// The part of the configuration the generators see.
    pub fn synth(&self) -> SynthConfig {
        SynthConfig {
            shapes: ShapeConfig {
                singleton: self.singleton,
                max_depth: self.max_shape_depth,
            },
            decorator_order: self.decorator_order,
            max_name_suffix: self.max_name_suffix,
        }
    }

    /// Apply one `--flag=value` argument.
    ///
    /// Returns `Ok(false)` for arguments that are not configuration flags,
    /// so callers can handle them themselves.
    pub fn apply_flag(&mut self, arg: &str) -> Result<bool, ConfigError> {
        let Some((flag, value)) = arg.strip_prefix("--").and_then(|a| a.split_once('=')) else {
            return Ok(false);
        };
        match flag {
            "decorators" => {
                self.decorator_order = match value {
                    "first-outermost" => DecoratorOrder::FirstOutermost,
                    "last-outermost" => DecoratorOrder::LastOutermost,
                    _ => {
                        return Err(ConfigError::UnknownValue {
                            flag: "decorators",
                            value: value.to_owned(),
                            expected: "first-outermost or last-outermost",
                        })
                    }
                };
            }
            "singleton" => {
                self.singleton = match value {
                    "degrade" => SingletonPolicy::Degrade,
                    "keep" => SingletonPolicy::Keep,
                    _ => {
                        return Err(ConfigError::UnknownValue {
                            flag: "singleton",
                            value: value.to_owned(),
                            expected: "degrade or keep",
                        })
                    }
                };
            }
            "max-suffix" => self.max_name_suffix = number("max-suffix", value)?,
            "max-depth" => self.max_shape_depth = number("max-depth", value)?,
            "error-limit" => self.diagnostics.error_limit = number("error-limit", value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn number<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_generators() {
        assert_eq!(PluginConfig::default().synth(), SynthConfig::default());
    }

    #[test]
    fn flags_update_the_config() {
        let mut config = PluginConfig::default();
        for arg in [
            "--decorators=last-outermost",
            "--singleton=keep",
            "--max-suffix=3",
            "--max-depth=8",
            "--error-limit=0",
        ] {
            assert!(config.apply_flag(arg).unwrap(), "{arg}");
        }
        assert_eq!(config.decorator_order, DecoratorOrder::LastOutermost);
        assert_eq!(config.singleton, SingletonPolicy::Keep);
        assert_eq!(config.max_name_suffix, 3);
        assert_eq!(config.max_shape_depth, 8);
        assert_eq!(config.diagnostics.error_limit, 0);
        assert_eq!(config.synth().shapes.max_depth, 8);
    }

    #[test]
    fn other_arguments_are_left_alone() {
        let mut config = PluginConfig::default();
        assert!(!config.apply_flag("input.kt").unwrap());
        assert!(!config.apply_flag("--tree").unwrap());
        assert!(!config.apply_flag("--color=never").unwrap());
        assert_eq!(config, PluginConfig::default());
    }

    #[test]
    fn bad_values_are_reported() {
        let mut config = PluginConfig::default();
        assert_eq!(
            config.apply_flag("--singleton=drop").unwrap_err().to_string(),
            "unknown value `drop` for `--singleton` (expected degrade or keep)"
        );
        assert_eq!(
            config.apply_flag("--max-suffix=-1").unwrap_err(),
            ConfigError::InvalidNumber {
                flag: "max-suffix",
                value: "-1".to_owned(),
            }
        );
    }
}
