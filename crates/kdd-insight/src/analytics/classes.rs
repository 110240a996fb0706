//! Label counts and shares.

use std::collections::HashMap;

use crate::error::{AnalyticsError, Result};
use crate::types::{ClassDistribution, ClassShare};

pub struct ClassDistributionComputer;

impl ClassDistributionComputer {
    /// Count records per label.
    ///
    /// Percentages are `100 * count / total`, left unrounded. Entries are
    /// ordered by count descending, then label ascending.
    pub fn compute<S: AsRef<str>>(labels: &[S]) -> Result<ClassDistribution> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for label in labels {
            *counts.entry(label.as_ref()).or_insert(0) += 1;
        }
        Self::from_counts(counts.into_iter().map(|(label, count)| (label.to_string(), count)))
    }

    /// Build the distribution from already aggregated `(label, count)` pairs.
    ///
    /// Repeated labels are merged. The total is the sum of counts; a sum that
    /// does not fit in `usize` is a malformed input.
    pub fn from_counts<I>(counts: I) -> Result<ClassDistribution>
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let mut merged: Vec<(String, usize)> = Vec::new();
        for (label, count) in counts {
            match merged.iter_mut().find(|(l, _)| *l == label) {
                Some((_, existing)) => {
                    *existing = existing
                        .checked_add(count)
                        .ok_or_else(|| count_overflow(&label))?;
                }
                None => merged.push((label, count)),
            }
        }

        let total_records = merged
            .iter()
            .try_fold(0usize, |acc, (_, c)| acc.checked_add(*c))
            .ok_or_else(|| count_overflow("total_records"))?;
        if total_records == 0 {
            return Err(AnalyticsError::EmptyDataset);
        }

        merged.sort_by(|(la, ca), (lb, cb)| cb.cmp(ca).then_with(|| la.cmp(lb)));

        let entries = merged
            .into_iter()
            .map(|(label, count)| ClassShare {
                percentage: 100.0 * count as f64 / total_records as f64,
                label,
                count,
            })
            .collect();

        Ok(ClassDistribution {
            entries,
            total_records,
        })
    }
}

fn count_overflow(field: &str) -> AnalyticsError {
    AnalyticsError::malformed(field, "sum of counts overflows")
}
