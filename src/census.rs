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
//! Invocation of the external census tool to fetch grouped entity records.

use std::{
    io,
    path::Path,
    process::{Command, ExitStatus},
};

use crate::{
    records::{CensusOutput, Entry},
    target::Dimension,
    util::PathBufExt,
};

/// File name of the census executable inside the census directory.
pub const CENSUS_TOOL: &str = "census";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to run the census tool: {0}")]
    Spawn(#[from] io::Error),
    #[error("census tool exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("unparsable census output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Run the census tool for the given grouping and parse its JSON output.
/// `--top=-1` requests the full result set without truncation. The call
/// blocks until the tool exits; failures are propagated, never retried.
pub fn run(census_dir: &Path, dimension: Dimension) -> Result<Vec<Entry>, Error> {
    let flag = dimension
        .census_flag()
        .expect("the operator dimension is grouped from the snapshot");
    let tool = census_dir.then(CENSUS_TOOL);

    log::info!("running {} --json --top=-1 {flag}", tool.display());
    let output = Command::new(&tool)
        .args(["--json", "--top=-1", flag])
        .output()?;
    if !output.status.success() {
        return Err(Error::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let parsed: CensusOutput = serde_json::from_slice(&output.stdout)?;
    log::debug!(
        "census returned {} {} records",
        parsed.results.len(),
        dimension.name()
    );
    Ok(parsed.results)
}
