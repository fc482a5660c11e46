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
use std::{path::PathBuf, process};

use clap::Parser;

use relay_diversity::{
    census, operators,
    prelude::*,
    records::SNAPSHOT_FILE,
    render,
    util::{self, PathBufExt},
};

/// Render a diversity chart for the dimension/metric pair named by the
/// output file.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Destination image path; its name selects the chart, e.g.
    /// `countries_by_cw.png`.
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();
    let Some(target) = Target::from_path(&args.output.to_string_lossy()) else {
        log::error!(
            "{:?} does not name any <dimension>_by_<metric> chart",
            args.output
        );
        process::exit(1);
    };

    let census_dir = util::census_dir()?;
    let snapshot = Snapshot::load(census_dir.as_path().then(SNAPSHOT_FILE))?;

    let entries = match target.dimension {
        Dimension::Operators => operators::group_by_family(&snapshot),
        dimension => census::run(&census_dir, dimension)?,
    };

    let points = entries
        .iter()
        .filter(|entry| target.metric.keeps(entry))
        .map(|entry| (target.metric.extract(entry), target.dimension.label(entry)))
        .collect();
    let buckets = rank_and_bucket(points, &BucketConfig::default());

    render::render(&buckets, target, &snapshot.relays_published, &args.output)?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}
