use serde::Serialize;

use parcelmap_core::SelectionKind;

use crate::resolver::SkipReason;

/// Per-run counters. Skips count once per identifier; `malformed_apn`,
/// `no_parcel` and `multi_parcel` count once per searched record and are
/// independent of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub processed: usize,
    pub missing_record: usize,
    pub voided: usize,
    pub no_county: usize,
    pub unsupported_county: usize,
    pub no_apn: usize,
    pub malformed_apn: usize,
    pub no_parcel: usize,
    pub multi_parcel: usize,
    pub shapes_written: usize,
}

impl Tally {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingRecord => self.missing_record += 1,
            SkipReason::Voided => self.voided += 1,
            SkipReason::NoApn => self.no_apn += 1,
            SkipReason::NoCounty => self.no_county += 1,
            SkipReason::UnsupportedCounty(_) => self.unsupported_county += 1,
        }
    }

    /// Fold one searched record's outcome in.
    pub fn record_search(&mut self, total_matches: usize, malformed: bool) {
        if malformed {
            self.malformed_apn += 1;
        }
        match total_matches {
            0 => self.no_parcel += 1,
            1 => {}
            _ => self.multi_parcel += 1,
        }
    }

    /// Human summary, one line per counter that applies to `kind`.
    pub fn summary_lines(&self, kind: SelectionKind) -> Vec<String> {
        let noun = kind.noun();
        let mut lines = vec![format!("{} {noun} processed", self.processed)];
        if self.missing_record > 0 {
            lines.push(format!("{} {noun} not found in inventory", self.missing_record));
        }
        lines.push(format!("{} {noun} marked VOID", self.voided));
        match kind {
            SelectionKind::Reports => {
                lines.push(format!("{} {noun} have no county specified", self.no_county));
            }
            SelectionKind::Resources => {
                if self.unsupported_county > 0 {
                    lines.push(format!(
                        "{} {noun} in counties without a parcel layer",
                        self.unsupported_county
                    ));
                }
            }
        }
        lines.push(format!("{} {noun} have no APN value", self.no_apn));
        lines.push(format!("{} {noun} have possibly mal-formed APN value", self.malformed_apn));
        lines.push(format!("{} {noun} with APN but no parcel found", self.no_parcel));
        lines.push(format!("{} {noun} with APN matching multiple parcels", self.multi_parcel));
        lines.push(format!("{} parcel shapes copied", self.shapes_written));
        lines
    }
}
