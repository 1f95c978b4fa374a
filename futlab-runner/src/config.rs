//! Sweep configuration loaded from TOML.
//!
//! ```toml
//! [data]
//! root = "data"                 # or: [data.synthetic] count/len/seed
//!
//! [backtest]
//! commission = 0.0003
//! price_basis = "adjusted"      # or "raw"
//!
//! [[strategy]]                  # fixed parameter sets, any number
//! kind = "momentum"
//! period = 20
//!
//! [[grid]]                      # parameter ranges, any number
//! kind = "dual_ma"
//! short_length = [5, 10]
//! long_length = [20, 40]
//! break_in = [0.0]
//! atr_length = [14]
//! trs = [2.0, 3.0]
//!
//! [output]
//! dir = "results"
//! parallel = true
//! ```

use std::path::{Path, PathBuf};

use futlab_core::{CoreError, PriceBasis, SimConfig, StrategySpec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sweep::ParamGrid;
use crate::synthetic::SyntheticConfig;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a sweep configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("[data] needs exactly one of `root` or `synthetic`")]
    DataSource,

    #[error("no strategies: add a [[strategy]] or a [[grid]] section")]
    NoStrategies,

    #[error("grid '{kind}' field `{field}` is empty")]
    EmptyGrid {
        kind: &'static str,
        field: &'static str,
    },

    #[error("grid '{0}' yields no valid parameter combination")]
    DegenerateGrid(&'static str),

    #[error("synthetic data needs count >= 1 and len >= 2")]
    Synthetic,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Where bars come from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub synthetic: Option<SyntheticConfig>,
}

/// Settings shared by every run of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Commission per trade leg as a fraction of notional.
    pub commission: f64,
    pub price_basis: PriceBasis,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            commission: SimConfig::default().commission,
            price_basis: PriceBasis::default(),
        }
    }
}

impl BacktestSettings {
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            commission: self.commission,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub parallel: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            parallel: true,
        }
    }
}

/// Complete sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategySpec>,
    #[serde(default, rename = "grid")]
    pub grids: Vec<ParamGrid>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SweepConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.data.root, &self.data.synthetic) {
            (Some(_), None) => {}
            (None, Some(syn)) if syn.count == 0 || syn.len < 2 => {
                return Err(ConfigError::Synthetic)
            }
            (None, Some(_)) => {}
            _ => return Err(ConfigError::DataSource),
        }
        self.backtest.sim_config().validate()?;

        if self.strategies.is_empty() && self.grids.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        for spec in &self.strategies {
            spec.validate()?;
        }
        for grid in &self.grids {
            grid.validate()?;
        }
        Ok(())
    }

    /// Every strategy to run: the fixed ones first, then each grid expanded.
    pub fn specs(&self) -> Vec<StrategySpec> {
        self.strategies
            .iter()
            .cloned()
            .chain(self.grids.iter().flat_map(ParamGrid::expand))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[data]
root = "bars"

[backtest]
commission = 0.0005
price_basis = "raw"

[[strategy]]
kind = "momentum"
period = 20

[[grid]]
kind = "dual_ma"
short_length = [5, 10]
long_length = [20]
break_in = [0.0, 0.01]
atr_length = [14]
trs = [3.0]

[output]
dir = "out"
parallel = false
"#;

    #[test]
    fn parses_full_config() {
        let config = SweepConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.data.root, Some(PathBuf::from("bars")));
        assert_eq!(config.backtest.commission, 0.0005);
        assert_eq!(config.backtest.price_basis, PriceBasis::Raw);
        assert_eq!(
            config.strategies,
            vec![StrategySpec::Momentum { period: 20 }]
        );
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(!config.output.parallel);
        // 1 fixed + 2 shorts x 2 break-ins
        assert_eq!(config.specs().len(), 5);
    }

    #[test]
    fn defaults_fill_optional_sections() {
        let config = SweepConfig::from_toml_str(
            r#"
[data.synthetic]
count = 2

[[strategy]]
kind = "momentum"
period = 5
"#,
        )
        .unwrap();
        assert_eq!(config.backtest, BacktestSettings::default());
        assert_eq!(config.backtest.commission, 0.0003);
        assert_eq!(config.data.synthetic.as_ref().unwrap().count, 2);
        assert_eq!(config.data.synthetic.as_ref().unwrap().len, 750);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn data_source_must_be_unique() {
        let both = r#"
[data]
root = "bars"
[data.synthetic]
count = 1
[[strategy]]
kind = "momentum"
period = 5
"#;
        assert!(matches!(
            SweepConfig::from_toml_str(both),
            Err(ConfigError::DataSource)
        ));

        let neither = "[data]\n[[strategy]]\nkind = \"momentum\"\nperiod = 5\n";
        assert!(matches!(
            SweepConfig::from_toml_str(neither),
            Err(ConfigError::DataSource)
        ));
    }

    #[test]
    fn needs_a_strategy() {
        assert!(matches!(
            SweepConfig::from_toml_str("[data]\nroot = \"x\"\n"),
            Err(ConfigError::NoStrategies)
        ));
    }

    #[test]
    fn negative_commission_rejected() {
        let text = "[data]\nroot = \"x\"\n[backtest]\ncommission = -0.1\n\
                    [[strategy]]\nkind = \"momentum\"\nperiod = 5\n";
        assert!(matches!(
            SweepConfig::from_toml_str(text),
            Err(ConfigError::Core(CoreError::InvalidParameter {
                name: "commission",
                ..
            }))
        ));
    }

    #[test]
    fn invalid_fixed_strategy_rejected() {
        let text = "[data]\nroot = \"x\"\n[[strategy]]\nkind = \"momentum\"\nperiod = 0\n";
        assert!(matches!(
            SweepConfig::from_toml_str(text),
            Err(ConfigError::Core(_))
        ));
    }

    #[test]
    fn unknown_strategy_kind_is_parse_error() {
        let text = "[data]\nroot = \"x\"\n[[strategy]]\nkind = \"martingale\"\n";
        assert!(matches!(
            SweepConfig::from_toml_str(text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SweepConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
