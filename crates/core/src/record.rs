use serde::Serialize;

/// Placeholder written to `OtherID` when the record has no name.
pub const NO_NAME: &str = "[none]";

/// Parent row of a report (`tblInventory`) or resource (`tblResource`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentRecord {
    pub voided: bool,
    /// `CitTitle` for reports, `ResourceName` for resources.
    pub name: Option<String>,
    /// Trinomial number; resources only.
    pub trin_no: Option<i64>,
    /// Trinomial designation, e.g. `CA-CCO-000123H`; resources only.
    pub trin_h: Option<String>,
}

impl ParentRecord {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => NO_NAME,
        }
    }

    /// The trinomial number, only when it is a real (positive) number.
    /// Zero is how the inventory spells "not assigned".
    pub fn positive_trin_no(&self) -> Option<i64> {
        self.trin_no.filter(|n| *n > 0)
    }

    pub fn trinomial(&self) -> Option<&str> {
        self.trin_h.as_deref().filter(|t| !t.trim().is_empty())
    }
}
