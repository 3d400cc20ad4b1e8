//! Document kinds.
//!
//! Both quotation families share numbering, totals and lifecycle. What differs
//! is captured by [`DocumentKind`]: the number prefix, the line-item pricing
//! strategy, and whether finalizing seeds progress tracking.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::interior::{InteriorItem, InteriorItemDraft};
use crate::pop::{PopItem, PopItemDraft};
use crate::pricing::{LineDraft, PricedLine};

/// Runtime tag of a document family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Interior,
    Pop,
}

impl Kind {
    /// Fixed number prefix of the family.
    pub fn prefix(self) -> &'static str {
        match self {
            Kind::Interior => "QT",
            Kind::Pop => "POP",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "QT" => Some(Kind::Interior),
            "POP" => Some(Kind::Pop),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Interior => "interior",
            Kind::Pop => "pop",
        }
    }

    /// Heading printed on the rendered document.
    pub fn document_title(self) -> &'static str {
        match self {
            Kind::Interior => "QUOTATION",
            Kind::Pop => "POP QUOTATION",
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numbered document family.
///
/// Implemented by zero-sized marker types; `Quotation<Interior>` and
/// `Quotation<Pop>` are the two concrete documents.
pub trait DocumentKind:
    Copy + Clone + core::fmt::Debug + PartialEq + Send + Sync + 'static
{
    const KIND: Kind;

    /// Whether finalizing a document seeds a progress record.
    const TRACKS_PROGRESS: bool;

    /// Raw, caller-supplied line item.
    type ItemDraft: LineDraft<Priced = Self::Item>
        + Clone
        + core::fmt::Debug
        + Send
        + Sync
        + Serialize
        + DeserializeOwned;

    /// Line item with all derived fields computed.
    type Item: PricedLine
        + Clone
        + core::fmt::Debug
        + PartialEq
        + Send
        + Sync
        + Serialize
        + DeserializeOwned;
}

/// Interior quotation (`QT-…`): area-priced room items with progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interior;

impl DocumentKind for Interior {
    const KIND: Kind = Kind::Interior;
    const TRACKS_PROGRESS: bool = true;
    type ItemDraft = InteriorItemDraft;
    type Item = InteriorItem;
}

/// Plaster-of-Paris quotation (`POP-…`): area- or quantity-priced items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pop;

impl DocumentKind for Pop {
    const KIND: Kind = Kind::Pop;
    const TRACKS_PROGRESS: bool = false;
    type ItemDraft = PopItemDraft;
    type Item = PopItem;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_round_trip() {
        for kind in [Kind::Interior, Kind::Pop] {
            assert_eq!(Kind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(Kind::from_prefix("INV"), None);
    }

    #[test]
    fn only_interior_tracks_progress() {
        assert!(Interior::TRACKS_PROGRESS);
        assert!(!Pop::TRACKS_PROGRESS);
    }
}
