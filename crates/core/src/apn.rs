use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::county::{CountyCode, COUNTIES};
use crate::error::CoreError;

/// An Assessor Parcel Number as stored in the inventory: trimmed, never
/// empty, otherwise untouched (no case folding, no punctuation rewrite).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Apn(String);

impl Apn {
    /// Trim surrounding whitespace; `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Apn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collect the distinct non-empty APNs from raw address rows, keeping the
/// order in which they were first seen.
pub fn distinct_apns<I, S>(rows: I) -> Vec<Apn>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut out: Vec<Apn> = Vec::new();
    for raw in rows.into_iter().flatten() {
        if let Some(apn) = Apn::normalize(raw.as_ref()) {
            if !out.contains(&apn) {
                out.push(apn);
            }
        }
    }
    out
}

/// Compiled APN format patterns, one per county.
///
/// A pattern mismatch is advisory: the value may still exist in the parcel
/// layer, so callers search regardless and only report the mismatch.
#[derive(Debug, Clone)]
pub struct ApnPatterns {
    patterns: BTreeMap<CountyCode, Regex>,
}

impl ApnPatterns {
    /// Built-in patterns, with per-county overrides keyed by raw county code.
    pub fn new(overrides: &BTreeMap<u8, String>) -> Result<Self, CoreError> {
        for code in overrides.keys() {
            CountyCode::new(i64::from(*code))?;
        }

        let mut patterns = BTreeMap::new();
        for county in &COUNTIES {
            let source = overrides
                .get(&county.code)
                .map(String::as_str)
                .unwrap_or(county.apn_pattern);
            let regex = Regex::new(source).map_err(|e| CoreError::InvalidPattern {
                county: county.code,
                pattern: source.to_string(),
                source: e,
            })?;
            patterns.insert(CountyCode::new(i64::from(county.code))?, regex);
        }
        Ok(Self { patterns })
    }

    pub fn builtin() -> Result<Self, CoreError> {
        Self::new(&BTreeMap::new())
    }

    pub fn is_well_formed(&self, county: CountyCode, apn: &Apn) -> bool {
        self.patterns
            .get(&county)
            .map(|re| re.is_match(apn.as_str()))
            .unwrap_or(true)
    }

    pub fn pattern(&self, county: CountyCode) -> Option<&str> {
        self.patterns.get(&county).map(Regex::as_str)
    }
}
