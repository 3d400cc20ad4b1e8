//! Human-readable document numbers: `<PREFIX>-<year>-<seq>`.
//!
//! The sequence is scoped to (kind, year), starts at 1 and is zero-padded to
//! four digits. Numbers are never reused, even after the document is deleted.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use quotedesk_core::{DomainError, DomainResult, ValueObject};

use crate::kind::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DocumentNumber {
    kind: Kind,
    year: i32,
    sequence: u32,
}

impl ValueObject for DocumentNumber {}

impl DocumentNumber {
    pub fn new(kind: Kind, year: i32, sequence: u32) -> DomainResult<Self> {
        if !(1000..=9999).contains(&year) {
            return Err(DomainError::invalid_id(format!(
                "document number year out of range: {year}"
            )));
        }
        if sequence == 0 {
            return Err(DomainError::invalid_id("document sequence starts at 1"));
        }
        Ok(Self {
            kind,
            year,
            sequence,
        })
    }

    /// First number of a (kind, year) sequence.
    pub fn first(kind: Kind, year: i32) -> DomainResult<Self> {
        Self::new(kind, year, 1)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The number following this one in the same (kind, year) sequence.
    pub fn successor(&self) -> DomainResult<Self> {
        let next = self
            .sequence
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("document sequence exhausted"))?;
        Self::new(self.kind, self.year, next)
    }

    /// String prefix shared by every number of a (kind, year), e.g. `QT-2026-`.
    pub fn year_prefix(kind: Kind, year: i32) -> String {
        format!("{}-{}-", kind.prefix(), year)
    }

    /// Next number given the most recent existing number of the (kind, year).
    ///
    /// A last number that does not parse, or belongs to another sequence, is
    /// treated as corrupted data rather than silently restarting at 1.
    pub fn next_after(kind: Kind, year: i32, last: Option<&str>) -> DomainResult<Self> {
        let Some(last) = last else {
            return Self::first(kind, year);
        };
        let parsed: DocumentNumber = last.parse().map_err(|_| {
            DomainError::invariant(format!("corrupt document number in store: '{last}'"))
        })?;
        if parsed.kind != kind || parsed.year != year {
            return Err(DomainError::invariant(format!(
                "document number '{last}' does not belong to the {kind} sequence of {year}"
            )));
        }
        parsed.successor()
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}-{:04}", self.kind.prefix(), self.year, self.sequence)
    }
}

impl FromStr for DocumentNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_id(format!("malformed document number: '{s}'"));

        let mut parts = s.splitn(3, '-');
        let (Some(prefix), Some(year), Some(seq)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let kind = Kind::from_prefix(prefix).ok_or_else(invalid)?;
        if year.len() != 4 || seq.len() < 4 || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        // Padding stops at four digits, so `00012` is not a spelling of `0012`.
        if seq.len() > 4 && seq.starts_with('0') {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let sequence: u32 = seq.parse().map_err(|_| invalid())?;

        Self::new(kind, year, sequence)
    }
}

impl From<DocumentNumber> for String {
    fn from(value: DocumentNumber) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DocumentNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_number_of_year_is_zero_padded() {
        let n = DocumentNumber::first(Kind::Interior, 2026).unwrap();
        assert_eq!(n.to_string(), "QT-2026-0001");
        let p = DocumentNumber::first(Kind::Pop, 2026).unwrap();
        assert_eq!(p.to_string(), "POP-2026-0001");
    }

    #[test]
    fn next_after_continues_existing_sequence() {
        let n = DocumentNumber::next_after(Kind::Interior, 2026, Some("QT-2026-0041")).unwrap();
        assert_eq!(n.to_string(), "QT-2026-0042");
        let n = DocumentNumber::next_after(Kind::Pop, 2026, None).unwrap();
        assert_eq!(n.to_string(), "POP-2026-0001");
    }

    #[test]
    fn sequence_grows_past_four_digits() {
        let n = DocumentNumber::next_after(Kind::Interior, 2026, Some("QT-2026-9999")).unwrap();
        assert_eq!(n.to_string(), "QT-2026-10000");
        assert_eq!("QT-2026-10000".parse::<DocumentNumber>().unwrap(), n);
    }

    #[test]
    fn unparseable_last_number_is_corruption() {
        let err = DocumentNumber::next_after(Kind::Interior, 2026, Some("QT-2026-00x1")).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("corrupt")));
    }

    #[test]
    fn last_number_from_another_year_is_rejected() {
        let err = DocumentNumber::next_after(Kind::Interior, 2026, Some("QT-2025-0003")).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn malformed_numbers_do_not_parse() {
        for s in [
            "",
            "QT",
            "QT-2026",
            "QT-26-0001",
            "XX-2026-0001",
            "QT-2026-1",
            "QT-2026-0000",
            "QT-2026-00012",
            "POP-2026-010000",
        ] {
            assert!(s.parse::<DocumentNumber>().is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let n = DocumentNumber::new(Kind::Pop, 2026, 7).unwrap();
        assert_eq!(serde_json::to_value(n).unwrap(), serde_json::json!("POP-2026-0007"));
        let back: DocumentNumber = serde_json::from_value(serde_json::json!("POP-2026-0007")).unwrap();
        assert_eq!(back, n);
    }

    proptest! {
        #[test]
        fn display_parse_round_trip(year in 1000i32..=9999, seq in 1u32..=1_000_000, pop in any::<bool>()) {
            let kind = if pop { Kind::Pop } else { Kind::Interior };
            let n = DocumentNumber::new(kind, year, seq).unwrap();
            prop_assert_eq!(n.to_string().parse::<DocumentNumber>().unwrap(), n);
        }

        #[test]
        fn successor_is_strictly_increasing(seq in 1u32..1_000_000) {
            let n = DocumentNumber::new(Kind::Interior, 2026, seq).unwrap();
            let next = n.successor().unwrap();
            prop_assert_eq!(next.sequence(), seq + 1);
            prop_assert!(next > n);
        }
    }
}
