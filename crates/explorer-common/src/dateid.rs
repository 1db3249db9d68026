//! Dataset identifiers derived from cache file names.
//!
//! Every dataset in the floodsar cache is keyed by the acquisition date
//! encoded as `YYYYMMDD`. The same key ties together the k-means inputs,
//! the k-means outputs and the generated plot images.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, ExplorerResult};

/// Prefix of k-means input files, e.g. `input_20210110`.
pub const INPUT_PREFIX: &str = "input_";

/// Month names as rendered on the dashboard (Polish, nominative).
const POLISH_MONTHS: [&str; 12] = [
    "styczeń",
    "luty",
    "marzec",
    "kwiecień",
    "maj",
    "czerwiec",
    "lipiec",
    "sierpień",
    "wrzesień",
    "październik",
    "listopad",
    "grudzień",
];

/// An 8-digit `YYYYMMDD` date identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateId {
    raw: String,
    date: NaiveDate,
}

impl DateId {
    /// Parse and validate a date id.
    pub fn parse(s: &str) -> ExplorerResult<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ExplorerError::InvalidDateId(s.to_string()));
        }
        let date = NaiveDate::parse_from_str(s, "%Y%m%d")
            .map_err(|_| ExplorerError::InvalidDateId(s.to_string()))?;
        Ok(Self {
            raw: s.to_string(),
            date,
        })
    }

    /// Extract the date id from a k-means input file name.
    ///
    /// Names look like `input_20210110`; anything without the `input_`
    /// marker, or whose second `_`-separated part is not a valid date,
    /// yields `None`.
    pub fn from_input_filename(name: &str) -> Option<Self> {
        if !name.contains(INPUT_PREFIX) {
            return None;
        }
        name.split('_').nth(1).and_then(|part| Self::parse(part).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The calendar date this id encodes.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Human readable label, e.g. `10 styczeń 2021`.
    ///
    /// The day keeps its leading zero exactly as written in the id. The
    /// month is the id's own calendar month; earlier dashboards fed the
    /// 1-based month into a 0-based setter and showed the following
    /// month's name. That shift is intentionally not reproduced.
    pub fn pretty(&self) -> String {
        let month = POLISH_MONTHS[self.date.month0() as usize];
        format!("{} {} {}", &self.raw[6..8], month, &self.raw[0..4])
    }
}

impl fmt::Display for DateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DateId {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateId {
    type Error = ExplorerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateId> for String {
    fn from(id: DateId) -> Self {
        id.raw
    }
}

/// Collect the sorted, de-duplicated date ids found among input file names.
pub fn dates_from_filenames<I, S>(names: I) -> Vec<DateId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut dates: Vec<DateId> = names
        .into_iter()
        .filter_map(|n| DateId::from_input_filename(n.as_ref()))
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = DateId::parse("20210110").unwrap();
        assert_eq!(id.as_str(), "20210110");
        assert_eq!(id.date(), NaiveDate::from_ymd_opt(2021, 1, 10).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateId::parse("2021011").is_err());
        assert!(DateId::parse("2021-01-10").is_err());
        assert!(DateId::parse("20211310").is_err());
        assert!(DateId::parse("20210230").is_err());
        assert!(DateId::parse("２０２１０１１０").is_err());
    }

    #[test]
    fn test_pretty_date() {
        assert_eq!(DateId::parse("20210110").unwrap().pretty(), "10 styczeń 2021");
        assert_eq!(DateId::parse("20200305").unwrap().pretty(), "05 marzec 2020");
        assert_eq!(DateId::parse("19991231").unwrap().pretty(), "31 grudzień 1999");
    }

    #[test]
    fn test_pretty_is_deterministic() {
        let id = DateId::parse("20220815").unwrap();
        assert_eq!(id.pretty(), id.pretty());
        assert_eq!(id.pretty(), "15 sierpień 2022");
    }

    #[test]
    fn test_from_input_filename() {
        assert_eq!(
            DateId::from_input_filename("input_20210110"),
            Some(DateId::parse("20210110").unwrap())
        );
        assert_eq!(DateId::from_input_filename("KMEANS_INPUT"), None);
        assert_eq!(DateId::from_input_filename("input_notadate"), None);
        assert_eq!(DateId::from_input_filename("readme.txt"), None);
    }

    #[test]
    fn test_dates_sorted_and_unique() {
        let dates = dates_from_filenames([
            "input_20210315",
            "input_20210110",
            ".DS_Store",
            "input_20210110",
        ]);
        let ids: Vec<&str> = dates.iter().map(DateId::as_str).collect();
        assert_eq!(ids, vec!["20210110", "20210315"]);
    }

    #[test]
    fn test_serde_as_string() {
        let id = DateId::parse("20210110").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"20210110\"");
        let back: DateId = serde_json::from_str("\"20210110\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<DateId>("\"nope\"").is_err());
    }
}
