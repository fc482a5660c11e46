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
//! Record data types deserialized from the census tool output and the relay
//! snapshot file.

use std::{fs, io, path::Path};

use serde::Deserialize;

/// File name of the relay census snapshot inside the census directory.
pub const SNAPSHOT_FILE: &str = "details.json";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot read relay snapshot: {0}")]
    Io(#[from] io::Error),
    #[error("malformed relay snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// One record of the `results` array returned by the census tool, or an
/// operator aggregate built locally from the snapshot. Which label and metric
/// fields are populated depends on the grouping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub nick: Option<String>,
    /// Fingerprint for single relays, `"(<n> relays)"` for aggregates.
    #[serde(default)]
    pub fp: Option<String>,
    #[serde(default)]
    pub as_info: Option<String>,
    #[serde(default)]
    pub cc: Option<String>,
    /// Consensus weight share in percent.
    #[serde(default)]
    pub cw: f64,
    /// Advertised bandwidth share in percent.
    #[serde(default)]
    pub adv_bw: f64,
    /// Guard, middle, and exit selection probabilities in percent.
    #[serde(default)]
    pub p_guard: f64,
    #[serde(default)]
    pub p_middle: f64,
    #[serde(default)]
    pub p_exit: f64,
}

/// Top-level JSON object emitted by the census tool.
#[derive(Debug, Deserialize)]
pub struct CensusOutput {
    pub results: Vec<Entry>,
}

/// The relay census snapshot (`details.json`).
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    /// Publication timestamp of the relay data, displayed in chart titles.
    pub relays_published: String,
    pub relays: Vec<RelayDetails>,
}

/// One relay of the snapshot. Bandwidth and probability fields are fractions
/// in `0..=1`; missing optional fields default to empty/zero.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayDetails {
    pub nickname: String,
    pub fingerprint: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub running: bool,
    /// Declared family members, as `$<FINGERPRINT>` or nickname mentions.
    #[serde(default)]
    pub family: Vec<String>,
    #[serde(default)]
    pub consensus_weight_fraction: f64,
    #[serde(default)]
    pub advertised_bandwidth_fraction: f64,
    #[serde(default)]
    pub guard_probability: f64,
    #[serde(default)]
    pub middle_probability: f64,
    #[serde(default)]
    pub exit_probability: f64,
}

impl Snapshot {
    /// Load and deserialize a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}
