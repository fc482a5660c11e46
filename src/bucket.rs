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
//! Ranking and bucketing of (value, label) pairs into the cumulative plot
//! series and the pie series with its synthetic "others" slice.

/// Tunable thresholds of the ranker/bucketer.
#[derive(Debug, Clone)]
pub struct BucketConfig {
    /// At most this many entries make it onto the cumulative curve.
    pub top_count: usize,
    /// The largest entries always get their own pie slice, regardless of
    /// share.
    pub min_pie_entries: usize,
    /// Smaller entries keep their own slice while their value exceeds this
    /// multiple of 1% of the total.
    pub max_pie_share_multiple: f64,
    /// Pie labels longer than this many characters are shortened.
    pub max_label_len: usize,
}

impl Default for BucketConfig {
    fn default() -> Self {
        BucketConfig {
            top_count: 100,
            min_pie_entries: 3,
            max_pie_share_multiple: 2.5,
            max_label_len: 20,
        }
    }
}

/// One slice of the pie series.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub value: f64,
    pub label: String,
}

/// Plot-ready view over a ranked series.
#[derive(Debug, Clone)]
pub struct RankedBuckets {
    /// (rank, running cumulative value) for the top entries, rank starting
    /// at 1.
    pub plot: Vec<(usize, f64)>,
    /// Individually-kept slices followed by the "others" slice, which is
    /// always present (possibly zero). Kept slices are the first `kept`
    /// entries of the ranking: once an entry falls below the share
    /// threshold, every later one does too.
    pub pie: Vec<PieSlice>,
    /// Number of pie slices excluding "others".
    pub kept: usize,
    /// Sum of all input values, kept or not.
    pub total: f64,
    /// Number of input records.
    pub record_count: usize,
}

/// Sort `points` descending by value and partition them into the cumulative
/// plot series and the pie series.
///
/// The sort is stable: equal values keep their fetch order. Every value ends
/// up either in its own pie slice or in the trailing "others" slice, so the
/// pie always sums to the input total.
pub fn rank_and_bucket(mut points: Vec<(f64, String)>, config: &BucketConfig) -> RankedBuckets {
    points.sort_by(|a, b| b.0.total_cmp(&a.0));

    let total: f64 = points.iter().map(|(value, _)| value).sum();
    let top_count = config.top_count.min(points.len());
    let threshold = config.max_pie_share_multiple * total / 100.0;

    let mut plot = Vec::with_capacity(top_count);
    let mut cumulative = 0.0;
    let mut pie = Vec::new();
    let mut others = 0.0;
    for (rank, (value, label)) in points.iter().enumerate() {
        if rank < top_count {
            cumulative += value;
            plot.push((rank + 1, cumulative));
        }
        if pie.len() < config.min_pie_entries || *value > threshold {
            pie.push(PieSlice {
                value: *value,
                label: truncate_label(label, config.max_label_len),
            });
        } else {
            others += value;
        }
    }

    let kept = pie.len();
    pie.push(PieSlice {
        value: others,
        label: format!("{} others", points.len() - kept),
    });

    RankedBuckets {
        plot,
        pie,
        kept,
        total,
        record_count: points.len(),
    }
}

/// Shorten over-long labels to `max_len - 3` characters plus an ellipsis.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() > max_len {
        let mut short: String = label.chars().take(max_len - 3).collect();
        short.push('…');
        short
    } else {
        label.to_string()
    }
}
