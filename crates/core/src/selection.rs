use std::fmt;

use serde::Serialize;

/// Which kind of saved selection a workbook holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Reports,
    Resources,
}

impl SelectionKind {
    /// Sheet name written by the inventory's "save selection" export.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Reports => "tblInvSelect",
            Self::Resources => "tblResSelect",
        }
    }

    /// Expected header cells `A1`, `B1`.
    pub fn headers(self) -> [&'static str; 2] {
        match self {
            Self::Reports => ["DocCo", "DocNo"],
            Self::Resources => ["PrimCo", "PrimNo"],
        }
    }

    pub fn from_sheet_name(name: &str) -> Option<Self> {
        [Self::Reports, Self::Resources]
            .into_iter()
            .find(|k| k.sheet_name() == name)
    }

    /// Plural noun for summaries ("Reports", "Primary #'s").
    pub fn noun(self) -> &'static str {
        match self {
            Self::Reports => "Reports",
            Self::Resources => "Primary #'s",
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reports => write!(f, "reports"),
            Self::Resources => write!(f, "resources"),
        }
    }
}

/// One identifier from a saved selection.
///
/// Resource county codes stay raw here: the workbook may name a county
/// without a parcel layer, which is only a skip once the record resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEntry {
    Report { doc_no: i64 },
    Resource { prim_co: i64, prim_no: i64 },
}

impl fmt::Display for SelectionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report { doc_no } => write!(f, "S-{doc_no:06}"),
            Self::Resource { prim_co, prim_no } => write!(f, "P-{prim_co:02}-{prim_no:06}"),
        }
    }
}

/// A loaded saved-selection workbook.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub kind: SelectionKind,
    pub sheet: String,
    pub entries: Vec<SelectionEntry>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
