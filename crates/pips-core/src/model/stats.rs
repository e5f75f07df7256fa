use super::face::Face;
use super::history::HistoryLedger;
use serde::{Serialize, Serializer};
use std::fmt;

/// Summary statistics over the current history.
///
/// Derived on demand; never stored alongside the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub count: usize,
    pub average: Average,
    pub max: Face,
    pub min: Face,
}

impl StatsSnapshot {
    /// Compute stats for `ledger`, or `None` if it is empty.
    #[must_use]
    pub fn from_ledger(ledger: &HistoryLedger) -> Option<Self> {
        Self::from_values(ledger.values())
    }

    /// Compute stats over an arbitrary sequence of faces.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = Face>) -> Option<Self> {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let (count, sum, max, min) = iter.fold(
            (1_usize, u64::from(first.get()), first, first),
            |(count, sum, max, min), face| {
                (
                    count + 1,
                    sum + u64::from(face.get()),
                    max.max(face),
                    min.min(face),
                )
            },
        );
        Some(Self {
            count,
            average: Average::of(sum, count),
            max,
            min,
        })
    }
}

/// Mean face value rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Average(f64);

impl Average {
    #[allow(clippy::cast_precision_loss)]
    fn of(sum: u64, count: usize) -> Self {
        let mean = sum as f64 / count as f64;
        Self((mean * 100.0).round() / 100.0)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Serialized as the two-decimal string shown to users (`"3.50"`).
impl Serialize for Average {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(values: &[u8]) -> Vec<Face> {
        values
            .iter()
            .map(|&v| Face::new(v).expect("valid face"))
            .collect()
    }

    #[test]
    fn empty_has_no_stats() {
        assert!(StatsSnapshot::from_ledger(&HistoryLedger::new()).is_none());
        assert!(StatsSnapshot::from_values(Vec::<Face>::new()).is_none());
    }

    #[test]
    fn basic_stats() {
        let stats = StatsSnapshot::from_values(faces(&[1, 5, 5, 3])).expect("stats");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.average.to_string(), "3.50");
        assert_eq!(stats.max.get(), 5);
        assert_eq!(stats.min.get(), 1);
    }

    #[test]
    fn average_rounds_to_two_places() {
        // 7 / 3 = 2.333..
        let stats = StatsSnapshot::from_values(faces(&[1, 2, 4])).expect("stats");
        assert!((stats.average.value() - 2.33).abs() < f64::EPSILON);
        // 5 / 3 = 1.666..
        let stats = StatsSnapshot::from_values(faces(&[1, 1, 3])).expect("stats");
        assert_eq!(stats.average.to_string(), "1.67");
    }

    #[test]
    fn single_roll() {
        let stats = StatsSnapshot::from_values(faces(&[6])).expect("stats");
        assert_eq!(stats.count, 1);
        assert_eq!(stats.average.to_string(), "6.00");
        assert_eq!(stats.max, stats.min);
    }

    #[test]
    fn serializes_average_as_string() {
        let stats = StatsSnapshot::from_values(faces(&[2, 3])).expect("stats");
        let json = serde_json::to_value(stats).expect("serialize");
        assert_eq!(json["average"], "2.50");
        assert_eq!(json["count"], 2);
        assert_eq!(json["max"], 3);
    }
}
