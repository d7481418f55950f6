//! Modulation and coding scheme lookup.
//!
//! # References
//!
//! 1. ETSI. 2018. 5G; NR; Physical Layer Procedures for Data (3GPP TS
//!    38.214 Version 15.3.0 Release 15).

use crate::error::ConfigError;
use std::collections::BTreeMap;

/// Returned only when no interval matches, which for a validated table
/// means the SINR was NaN.
const UNMATCHED_SPECTRAL_EFFICIENCY: f64 = 0.1;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    #[cfg_attr(feature = "serde", serde(rename = "QPSK"))]
    Qpsk,
    #[cfg_attr(feature = "serde", serde(rename = "16QAM"))]
    Qam16,
    #[cfg_attr(feature = "serde", serde(rename = "64QAM"))]
    Qam64,
    #[cfg_attr(feature = "serde", serde(rename = "256QAM"))]
    Qam256,
}

/// One channel quality indicator entry.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McsRow {
    pub cqi: u8,
    pub modulation: Modulation,
    /// Code rate × 1024.
    pub code_rate: u16,
    /// Bits per second per hertz.
    pub spectral_efficiency: f64,
    /// Lowest SINR at which this row is usable.
    pub min_sinr: f64,
}

/// The rows of a single generation, sorted by ascending `min_sinr`.
#[derive(Debug, Clone, PartialEq)]
pub struct McsTable {
    generation: String,
    rows: Vec<McsRow>,
}

impl McsTable {
    /// Returns a table after checking it is non-empty and strictly
    /// ascending in SINR.
    pub fn new(generation: impl Into<String>, rows: Vec<McsRow>) -> Result<Self, ConfigError> {
        let generation = generation.into();
        if rows.is_empty() {
            return Err(ConfigError::EmptyMcsTable(generation));
        }
        if let Some(pair) = rows.windows(2).find(|pair| pair[1].min_sinr <= pair[0].min_sinr) {
            return Err(ConfigError::UnsortedMcsTable {
                generation,
                cqi: pair[1].cqi,
            });
        }
        Ok(Self { generation, rows })
    }

    /// LTE 2x2 MIMO table.
    pub fn lte_2x2() -> Self {
        use Modulation::{Qam16, Qam64, Qpsk};
        let row = |cqi, modulation, code_rate, spectral_efficiency, min_sinr| McsRow {
            cqi,
            modulation,
            code_rate,
            spectral_efficiency,
            min_sinr,
        };
        Self {
            generation: "4G".to_string(),
            rows: vec![
                row(1, Qpsk, 78, 0.3, -6.7),
                row(2, Qpsk, 120, 0.46, -4.7),
                row(3, Qpsk, 193, 0.74, -2.3),
                row(4, Qpsk, 308, 1.2, 0.2),
                row(5, Qpsk, 449, 1.6, 2.4),
                row(6, Qpsk, 602, 2.2, 4.3),
                row(7, Qam16, 378, 2.8, 5.9),
                row(8, Qam16, 490, 3.8, 8.1),
                row(9, Qam16, 616, 4.8, 10.3),
                row(10, Qam64, 466, 5.4, 11.7),
                row(11, Qam64, 567, 6.6, 14.1),
                row(12, Qam64, 666, 7.8, 16.3),
                row(13, Qam64, 772, 9.0, 18.7),
                row(14, Qam64, 973, 10.2, 21.0),
                row(15, Qam64, 948, 11.4, 22.7),
            ],
        }
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn rows(&self) -> &[McsRow] {
        &self.rows
    }

    /// Maps `sinr` to spectral efficiency (bps/Hz).
    ///
    /// Each row covers `[row.min_sinr, next.min_sinr)`, the top row
    /// covers everything at or above its threshold, and anything below
    /// the bottom row yields `0`.
    pub fn spectral_efficiency(&self, sinr: f64) -> f64 {
        for pair in self.rows.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if lower.min_sinr <= sinr && sinr < upper.min_sinr {
                return lower.spectral_efficiency;
            }
        }
        // `new` guarantees at least one row.
        let (lowest, highest) = (&self.rows[0], &self.rows[self.rows.len() - 1]);
        if sinr >= highest.min_sinr {
            return highest.spectral_efficiency;
        }
        if sinr < lowest.min_sinr {
            return 0.0;
        }
        UNMATCHED_SPECTRAL_EFFICIENCY
    }
}

/// Modulation and coding tables keyed by generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulationAndCoding(BTreeMap<String, McsTable>);

impl Default for ModulationAndCoding {
    fn default() -> Self {
        Self::from_tables([McsTable::lte_2x2()])
    }
}

impl ModulationAndCoding {
    pub fn from_tables(tables: impl IntoIterator<Item = McsTable>) -> Self {
        Self(
            tables
                .into_iter()
                .map(|table| (table.generation.clone(), table))
                .collect(),
        )
    }

    /// Validates and collects raw rows keyed by generation.
    pub fn from_rows(rows: BTreeMap<String, Vec<McsRow>>) -> Result<Self, ConfigError> {
        let tables = rows
            .into_iter()
            .map(|(generation, rows)| McsTable::new(generation, rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_tables(tables))
    }

    pub fn get(&self, generation: &str) -> Result<&McsTable, ConfigError> {
        self.0
            .get(generation)
            .ok_or_else(|| ConfigError::UnknownGeneration(generation.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{McsRow, McsTable, Modulation, ModulationAndCoding};
    use crate::error::ConfigError;
    use std::collections::BTreeMap;

    #[test]
    fn test_lte_table_is_valid() {
        let table = McsTable::lte_2x2();
        let rows = table.rows().to_vec();
        assert_eq!(rows.len(), 15);
        assert_eq!(McsTable::new("4G", rows).unwrap(), table);
    }

    #[test]
    fn test_lower_bound_is_inclusive() {
        let table = McsTable::lte_2x2();
        assert_eq!(table.spectral_efficiency(-4.7), 0.46);
        assert_eq!(table.spectral_efficiency(-6.7), 0.3);
        assert_eq!(table.spectral_efficiency(-4.71), 0.3);
        assert_eq!(table.spectral_efficiency(22.69), 10.2);
    }

    #[test]
    fn test_out_of_range() {
        let table = McsTable::lte_2x2();
        assert_eq!(table.spectral_efficiency(-10.0), 0.0);
        assert_eq!(table.spectral_efficiency(22.7), 11.4);
        assert_eq!(table.spectral_efficiency(30.0), 11.4);
        assert_eq!(table.spectral_efficiency(39.01), 11.4);
    }

    #[test]
    fn test_nan_sinr() {
        assert_eq!(McsTable::lte_2x2().spectral_efficiency(f64::NAN), 0.1);
    }

    #[test]
    fn test_single_row_table() {
        let table = McsTable::new(
            "test",
            vec![McsRow {
                cqi: 1,
                modulation: Modulation::Qpsk,
                code_rate: 78,
                spectral_efficiency: 0.3,
                min_sinr: 0.0,
            }],
        )
        .unwrap();
        assert_eq!(table.spectral_efficiency(-1.0), 0.0);
        assert_eq!(table.spectral_efficiency(0.0), 0.3);
    }

    #[test]
    fn test_rejects_malformed_tables() {
        assert_eq!(
            McsTable::new("5G", vec![]),
            Err(ConfigError::EmptyMcsTable("5G".to_string()))
        );
        let mut rows = McsTable::lte_2x2().rows().to_vec();
        rows.swap(3, 4);
        assert_eq!(
            McsTable::new("4G", rows),
            Err(ConfigError::UnsortedMcsTable {
                generation: "4G".to_string(),
                cqi: 4
            })
        );
    }

    #[test]
    fn test_lookup_by_generation() {
        let tables = ModulationAndCoding::default();
        assert_eq!(tables.get("4G").unwrap().generation(), "4G");
        assert_eq!(
            tables.get("5G"),
            Err(ConfigError::UnknownGeneration("5G".to_string()))
        );
        let rows = BTreeMap::from([("4G".to_string(), McsTable::lte_2x2().rows().to_vec())]);
        assert_eq!(ModulationAndCoding::from_rows(rows).unwrap(), tables);
    }
}
