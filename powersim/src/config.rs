use anyhow::{anyhow, Context, Error as AnyError};
use linksim::{
    receivers::INDOOR_PROBABILITY, simulation::MONTHLY_DATA_GB, Carrier, HourlyShare, McsRow,
    ModulationAndCoding, Scenario,
};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

const HOURLY_DEMAND: &str = include_str!("../../data/hourly_demand.csv");

/// Optional overrides of the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    carrier: Option<Carrier>,
    monthly_data_gb: Option<f64>,
    indoor_probability: Option<f64>,
    scenarios: Option<Vec<Scenario>>,
    mcs: Option<BTreeMap<String, Vec<McsRow>>>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, AnyError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        Self::parse(&text).with_context(|| format!("parsing {path:?}"))
    }

    /// Deserializes and checks every configured scenario, so a
    /// malformed file fails before any simulation starts.
    fn parse(text: &str) -> Result<Self, AnyError> {
        let config: Self = serde_json::from_str(text)?;
        for scenario in config.scenarios.iter().flatten() {
            scenario
                .validate()
                .with_context(|| format!("scenario {:?}", scenario.name))?;
        }
        Ok(config)
    }

    pub fn carrier(&self) -> Carrier {
        self.carrier.clone().unwrap_or_default()
    }

    pub fn monthly_data_gb(&self) -> f64 {
        self.monthly_data_gb.unwrap_or(MONTHLY_DATA_GB)
    }

    pub fn indoor_probability(&self) -> f64 {
        self.indoor_probability.unwrap_or(INDOOR_PROBABILITY)
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        self.scenarios
            .clone()
            .unwrap_or_else(|| vec![Scenario::baseline(), Scenario::managed_power()])
    }

    pub fn scenario(&self, name: &str) -> Result<Scenario, AnyError> {
        self.scenarios()
            .into_iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| anyhow!("no scenario named {name:?}"))
    }

    /// Configured tables, or the built-in ones when none are given.
    pub fn mcs(&self) -> Result<ModulationAndCoding, AnyError> {
        let Some(rows) = &self.mcs else {
            return Ok(ModulationAndCoding::default());
        };
        Ok(ModulationAndCoding::from_rows(rows.clone())?)
    }
}

/// Reads an hourly traffic share table, or the built-in one when
/// `path` is `None`.
pub fn load_hourly_share(path: Option<&Path>) -> Result<HourlyShare, AnyError> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?,
        None => HOURLY_DEMAND.to_string(),
    };
    parse_hourly_share(&text)
}

fn parse_hourly_share(text: &str) -> Result<HourlyShare, AnyError> {
    let entries = text
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            let (hour, share) = line
                .split_once(',')
                .ok_or_else(|| anyhow!("line {}: expected hour,share", idx + 2))?;
            let hour: usize = hour.trim().parse().with_context(|| format!("line {}", idx + 2))?;
            let share: f64 = share.trim().parse().with_context(|| format!("line {}", idx + 2))?;
            Ok((hour, share))
        })
        .collect::<Result<Vec<_>, AnyError>>()?;
    Ok(HourlyShare::new(entries)?)
}

#[cfg(test)]
mod tests {
    use super::{parse_hourly_share, Config, HOURLY_DEMAND};
    use linksim::ConfigError;

    #[test]
    fn test_builtin_hourly_share() {
        let table = parse_hourly_share(HOURLY_DEMAND).unwrap();
        let total: f64 = table.iter().map(|(_, share)| share).sum();
        assert!((total - 100.0).abs() < 1e-6, "total {total}");
    }

    #[test]
    fn test_malformed_hourly_share() {
        assert!(parse_hourly_share("hour,share\n0,1.0\n").is_err());
        assert!(parse_hourly_share("hour,share\nmidnight,1.0\n").is_err());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"{"monthly_data_gb": 12, "scenarios": [{"name": "quiet", "min_w": 1, "max_w": 10}]}"#,
        )
        .unwrap();
        assert_eq!(config.monthly_data_gb(), 12.0);
        assert_eq!(config.indoor_probability(), 0.5);
        assert_eq!(config.carrier().frequency_ghz, 0.8);
        let quiet = config.scenario("quiet").unwrap();
        assert_eq!(quiet.min_w, 1.0);
        assert_eq!(quiet.max_w, 10.0);
        assert_eq!(quiet.tx_height_m, 30.0);
        assert!(config.scenario("baseline").is_err());
        assert!(config.mcs().unwrap().get("4G").is_ok());
    }

    #[test]
    fn test_sample_config_file() {
        let config = Config::parse(include_str!("../../data/scenarios.json")).unwrap();
        assert_eq!(config.scenarios().len(), 3);
        assert_eq!(config.scenario("managed_power").unwrap().min_w, 5.0);
    }

    #[test]
    fn test_scenario_without_name() {
        let err = Config::parse(r#"{"scenarios": [{"min_w": 5}, {"min_w": 20}]}"#).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnnamedScenario)
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(Config::parse(r#"{"scenarios": [{"name": "quiet", "max_W": 10}]}"#).is_err());
        assert!(Config::parse(r#"{"carrier": {"frequency": 0.7}}"#).is_err());
        assert!(Config::parse(r#"{"monthly_gb": 10}"#).is_err());
    }
}
