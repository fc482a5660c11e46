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
//! Library for producing relay diversity charts grouped by network family,
//! autonomous system, country, or operator.

pub mod bucket;
pub mod census;
pub mod operators;
pub mod records;
pub mod render;
pub mod target;
pub mod util;

pub mod prelude {
    pub use super::{
        bucket::{rank_and_bucket, BucketConfig, PieSlice, RankedBuckets},
        records::{Entry, Snapshot},
        target::{Dimension, Metric, Target},
    };
}
