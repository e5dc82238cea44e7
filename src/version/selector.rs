//! Nearest-in-time version selection

use chrono::{DateTime, Utc};

use crate::parser::types::VersionRecord;
use crate::version::types::{RankedVersion, RankedVersions};

/// Rank `records` by absolute distance of their publish time from `reference`.
///
/// The sort is stable: records at the same distance keep their input order.
/// `closest` is the head of the ranking, or `None` for no records.
pub fn select<'a, I>(records: I, reference: DateTime<Utc>) -> RankedVersions
where
    I: IntoIterator<Item = &'a VersionRecord>,
{
    let mut ranked: Vec<RankedVersion> = records
        .into_iter()
        .map(|record| RankedVersion {
            version: record.version.clone(),
            published_at: record.published_at,
            time_diff: (reference - record.published_at)
                .num_milliseconds()
                .unsigned_abs(),
        })
        .collect();

    ranked.sort_by_key(|v| v.time_diff);

    RankedVersions {
        closest: ranked.first().map(|v| v.version.clone()),
        ranked,
    }
}
