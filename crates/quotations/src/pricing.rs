//! Line-item pricing.
//!
//! Each document kind plugs in its own pricing rule through [`LineDraft`]; the
//! aggregate rule is shared: `total_amount = Σ item.total_price`, summed in
//! floating point without rounding.

use quotedesk_core::{DomainError, DomainResult};

/// A raw line item as supplied by the caller.
pub trait LineDraft {
    type Priced: PricedLine;

    /// Validate the draft and compute every derived field server-side.
    fn price(&self) -> DomainResult<Self::Priced>;
}

/// A line item whose derived fields have been computed.
pub trait PricedLine {
    fn total_price(&self) -> f64;

    /// Kind-specific presentation for the rendered document.
    fn describe(&self) -> LineDescription;
}

/// Printable view of one priced line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDescription {
    pub label: String,
    pub detail: Option<String>,
    /// Area in sq ft, or a unit count.
    pub quantity: f64,
    pub rate: f64,
}

/// Price every draft. An empty list is rejected; a failing item is reported
/// with its 1-based position.
pub fn price_items<D: LineDraft>(drafts: &[D]) -> DomainResult<Vec<D::Priced>> {
    if drafts.is_empty() {
        return Err(DomainError::validation("at least one item is required"));
    }

    drafts
        .iter()
        .enumerate()
        .map(|(idx, draft)| {
            draft.price().map_err(|e| match e {
                DomainError::Validation(msg) => {
                    DomainError::validation(format!("item {}: {msg}", idx + 1))
                }
                other => other,
            })
        })
        .collect()
}

/// Sum of the items' totals. A sum that overflows `f64` is rejected.
pub fn total_amount<L: PricedLine>(items: &[L]) -> DomainResult<f64> {
    require_finite(items.iter().map(PricedLine::total_price).sum(), "total amount")
}

/// Guard a derived amount: finite inputs can still multiply or add to infinity.
pub(crate) fn require_finite(value: f64, field: &str) -> DomainResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::validation(format!("{field} is too large")))
    }
}

/// Format an amount for display (two decimal places).
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Format a dimension without trailing zeros (`10`, `10.5`).
pub(crate) fn format_dimension(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(Option<f64>);

    #[derive(Debug)]
    struct FixedLine(f64);

    impl PricedLine for FixedLine {
        fn total_price(&self) -> f64 {
            self.0
        }

        fn describe(&self) -> LineDescription {
            LineDescription {
                label: "fixed".into(),
                detail: None,
                quantity: 1.0,
                rate: self.0,
            }
        }
    }

    impl LineDraft for Fixed {
        type Priced = FixedLine;

        fn price(&self) -> DomainResult<FixedLine> {
            self.0
                .map(FixedLine)
                .ok_or_else(|| DomainError::validation("amount is required"))
        }
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let err = price_items::<Fixed>(&[]).unwrap_err();
        assert_eq!(err, DomainError::validation("at least one item is required"));
    }

    #[test]
    fn failing_item_is_reported_by_position() {
        let err = price_items(&[Fixed(Some(1.0)), Fixed(None)]).unwrap_err();
        assert_eq!(err, DomainError::validation("item 2: amount is required"));
    }

    #[test]
    fn total_is_plain_sum() {
        let items = price_items(&[Fixed(Some(0.1)), Fixed(Some(0.2))]).unwrap();
        assert_eq!(total_amount(&items).unwrap(), 0.1 + 0.2);
    }

    #[test]
    fn overflowing_sum_is_rejected() {
        let items = price_items(&[Fixed(Some(f64::MAX)), Fixed(Some(f64::MAX))]).unwrap();
        assert_eq!(
            total_amount(&items).unwrap_err(),
            DomainError::validation("total amount is too large")
        );
    }

    #[test]
    fn amounts_and_dimensions_format() {
        assert_eq!(format_amount(12000.0), "12000.00");
        assert_eq!(format_amount(1234.5), "1234.50");
        assert_eq!(format_dimension(10.0), "10");
        assert_eq!(format_dimension(10.5), "10.5");
    }
}
