// relay-diversity: Diversity Charts for the Relay Network by Family, AS, Country, and Operator
// Copyright (C) 2024-2025 The relay-diversity developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Grouping dimensions and chart metrics, resolved from the output file name.

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use strum::IntoEnumIterator;

use crate::records::Entry;

lazy_static! {
    /// Matches the member count in an aggregate fp label like `"(17 relays)"`.
    static ref RELAY_COUNT: Regex = Regex::new(r"^\(([0-9]+) ").unwrap();
}

/// How the raw entity data is grouped and labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Dimension {
    #[strum(serialize = "network_families")]
    NetworkFamilies,
    #[strum(serialize = "as")]
    As,
    #[strum(serialize = "countries")]
    Countries,
    #[strum(serialize = "operators")]
    Operators,
}

impl Dimension {
    /// Human-readable name used in chart titles and axis labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NetworkFamilies => "network families",
            Self::As => "AS",
            Self::Countries => "countries",
            Self::Operators => "operators",
        }
    }

    /// Grouping flag understood by the census tool. `None` for the operator
    /// dimension, which is grouped locally from the snapshot.
    pub fn census_flag(&self) -> Option<&'static str> {
        match self {
            Self::NetworkFamilies => Some("--by-network-family"),
            Self::As => Some("--by-as"),
            Self::Countries => Some("--by-country"),
            Self::Operators => None,
        }
    }

    /// Display label of an entry under this grouping.
    pub fn label(&self, entry: &Entry) -> String {
        let label = match self {
            Self::NetworkFamilies | Self::Operators => entry.nick.as_deref(),
            Self::As => entry.as_info.as_deref(),
            Self::Countries => entry.cc.as_deref(),
        };
        label.unwrap_or_default().to_string()
    }
}

/// Metric plotted on the cumulative curve and in the pie chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Metric {
    /// Number of relays behind an aggregate.
    #[strum(serialize = "number")]
    Number,
    /// Consensus weight share in percent.
    #[strum(serialize = "cw")]
    ConsensusWeight,
    /// Exit selection probability in percent.
    #[strum(serialize = "p_exit")]
    ExitProbability,
}

impl Metric {
    /// Description used in chart titles and axis labels.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Number => "number of relays",
            Self::ConsensusWeight => "consensus weight",
            Self::ExitProbability => "exit probability",
        }
    }

    /// Extract the metric value of an entry. The relay count is carried
    /// inside the aggregate fp label and parsed out of it.
    pub fn extract(&self, entry: &Entry) -> f64 {
        match self {
            Self::Number => entry
                .fp
                .as_deref()
                .and_then(|fp| RELAY_COUNT.captures(fp))
                .and_then(|captures| captures[1].parse::<u64>().ok())
                .map(|count| count as f64)
                .unwrap_or(0.0),
            Self::ConsensusWeight => entry.cw,
            Self::ExitProbability => entry.p_exit,
        }
    }

    /// Whether an entry takes part in the ranking for this metric. Entities
    /// without any exit probability are dropped from the exit charts.
    pub fn keeps(&self, entry: &Entry) -> bool {
        match self {
            Self::ExitProbability => entry.p_exit > 0.0,
            Self::Number | Self::ConsensusWeight => true,
        }
    }

    /// Format a value for tick labels, annotations, and pie slices.
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Number => format!("{} relays", value.round() as i64),
            Self::ConsensusWeight | Self::ExitProbability => format!("{value:.1}%"),
        }
    }
}

/// A recognized (dimension, metric) pair selected by the output file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub dimension: Dimension,
    pub metric: Metric,
}

impl Target {
    /// Scan all dimension/metric combinations for a `<dimension>_by_<metric>`
    /// substring in `path`.
    pub fn from_path(path: &str) -> Option<Self> {
        Dimension::iter()
            .cartesian_product(Metric::iter())
            .find(|(dimension, metric)| path.contains(&format!("{dimension}_by_{metric}")))
            .map(|(dimension, metric)| Target { dimension, metric })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolve_target_from_path() {
        let target = Target::from_path("as_by_p_exit.png").unwrap();
        assert_eq!(target.dimension, Dimension::As);
        assert_eq!(target.metric, Metric::ExitProbability);

        let target = Target::from_path("plots/network_families_by_number.png").unwrap();
        assert_eq!(target.dimension, Dimension::NetworkFamilies);
        assert_eq!(target.metric, Metric::Number);

        let target = Target::from_path("countries_by_cw.png").unwrap();
        assert_eq!(target.dimension, Dimension::Countries);
        assert_eq!(target.metric, Metric::ConsensusWeight);
    }

    #[test]
    fn unrecognized_path_resolves_nothing() {
        assert_eq!(Target::from_path("foo.png"), None);
        assert_eq!(Target::from_path("countries_by_adv_bw.png"), None);
        assert_eq!(Target::from_path(""), None);
    }

    #[test]
    fn extract_relay_count_from_fp() {
        let entry = Entry {
            fp: Some("(42 relays)".to_string()),
            ..Default::default()
        };
        assert_eq!(Metric::Number.extract(&entry), 42.0);

        // single relays carry a plain fingerprint, which counts as zero
        let entry = Entry {
            fp: Some("F2044413DAC2E02E3D6BCF4735A19BCA1DE97281".to_string()),
            ..Default::default()
        };
        assert_eq!(Metric::Number.extract(&entry), 0.0);
        assert_eq!(Metric::Number.extract(&Entry::default()), 0.0);
    }

    #[test]
    fn exit_probability_filters_zero_entries() {
        let exit = Entry {
            p_exit: 1.5,
            ..Default::default()
        };
        let middle = Entry::default();
        assert!(Metric::ExitProbability.keeps(&exit));
        assert!(!Metric::ExitProbability.keeps(&middle));
        assert!(Metric::ConsensusWeight.keeps(&middle));
        assert!(Metric::Number.keeps(&middle));
    }

    #[test]
    fn format_by_metric() {
        assert_eq!(Metric::Number.format(1242.0), "1242 relays");
        assert_eq!(Metric::ConsensusWeight.format(24.13), "24.1%");
        assert_eq!(Metric::ExitProbability.format(0.0), "0.0%");
    }

    #[test]
    fn label_by_dimension() {
        let entry = Entry {
            nick: Some("∀ DFRI".to_string()),
            as_info: Some("AS1257 Tele2".to_string()),
            cc: Some("se".to_string()),
            ..Default::default()
        };
        assert_eq!(Dimension::NetworkFamilies.label(&entry), "∀ DFRI");
        assert_eq!(Dimension::Operators.label(&entry), "∀ DFRI");
        assert_eq!(Dimension::As.label(&entry), "AS1257 Tele2");
        assert_eq!(Dimension::Countries.label(&entry), "se");
        assert_eq!(Dimension::Countries.label(&Entry::default()), "");
    }
}
