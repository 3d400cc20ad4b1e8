//! POP (Plaster of Paris) line items.
//!
//! Each item is priced in exactly one mode: by area (`length × width` at a
//! rate per sq ft) or by quantity (`quantity × unit_price`). The total is
//! always recomputed here; a caller-supplied total is not trusted.

use serde::{Deserialize, Serialize};

use quotedesk_core::{DomainError, DomainResult, ValueObject, require_positive, require_text};

use crate::pricing::{LineDescription, LineDraft, PricedLine, format_dimension, require_finite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PopPricingMode {
    Area,
    Quantity,
}

/// Caller-supplied POP item in its flat wire shape.
///
/// `area` and `total_price` are accepted for compatibility with existing
/// clients but ignored: both are derived server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopItemDraft {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub price_per_sqft: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub total_price: Option<f64>,
}

impl PopItemDraft {
    pub fn by_area(description: &str, length: f64, width: f64, price_per_sqft: f64) -> Self {
        Self {
            description: Some(description.to_string()),
            length: Some(length),
            width: Some(width),
            price_per_sqft: Some(price_per_sqft),
            ..Self::default()
        }
    }

    pub fn by_quantity(description: &str, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: Some(description.to_string()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            ..Self::default()
        }
    }

    /// Resolve which pricing mode the caller populated.
    ///
    /// Zero is treated like an absent field, so a client that zero-fills the
    /// unused mode is still understood.
    pub fn mode(&self) -> DomainResult<PopPricingMode> {
        let present = |v: Option<f64>| v.is_some_and(|x| x != 0.0);
        let area = present(self.length) || present(self.width) || present(self.price_per_sqft);
        let quantity = present(self.quantity) || present(self.unit_price);

        match (area, quantity) {
            (true, false) => Ok(PopPricingMode::Area),
            (false, true) => Ok(PopPricingMode::Quantity),
            (true, true) => Err(DomainError::validation(
                "item must use either area pricing or quantity pricing, not both",
            )),
            (false, false) => Err(DomainError::validation(
                "item requires area pricing (length, width, price per sqft) or quantity pricing (quantity, unit price)",
            )),
        }
    }
}

/// POP item with derived fields computed. Fields of the unused pricing mode
/// are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopItem {
    pub description: String,
    pub pricing_mode: PopPricingMode,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub area: Option<f64>,
    pub price_per_sqft: Option<f64>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: f64,
}

impl ValueObject for PopItem {}

impl LineDraft for PopItemDraft {
    type Priced = PopItem;

    fn price(&self) -> DomainResult<PopItem> {
        let description = require_text(self.description.as_deref(), "description")?;

        match self.mode()? {
            PopPricingMode::Area => {
                let length = require_positive(self.length, "length")?;
                let width = require_positive(self.width, "width")?;
                let price_per_sqft = require_positive(self.price_per_sqft, "price per sqft")?;
                let area = require_finite(length * width, "area")?;
                let total_price = require_finite(area * price_per_sqft, "total price")?;

                Ok(PopItem {
                    description,
                    pricing_mode: PopPricingMode::Area,
                    length: Some(length),
                    width: Some(width),
                    area: Some(area),
                    price_per_sqft: Some(price_per_sqft),
                    quantity: None,
                    unit_price: None,
                    total_price,
                })
            }
            PopPricingMode::Quantity => {
                let quantity = require_positive(self.quantity, "quantity")?;
                let unit_price = require_positive(self.unit_price, "unit price")?;
                let total_price = require_finite(quantity * unit_price, "total price")?;

                Ok(PopItem {
                    description,
                    pricing_mode: PopPricingMode::Quantity,
                    length: None,
                    width: None,
                    area: None,
                    price_per_sqft: None,
                    quantity: Some(quantity),
                    unit_price: Some(unit_price),
                    total_price,
                })
            }
        }
    }
}

impl PricedLine for PopItem {
    fn total_price(&self) -> f64 {
        self.total_price
    }

    fn describe(&self) -> LineDescription {
        match self.pricing_mode {
            PopPricingMode::Area => LineDescription {
                label: self.description.clone(),
                detail: match (self.length, self.width) {
                    (Some(l), Some(w)) => Some(format!(
                        "{} ft × {} ft",
                        format_dimension(l),
                        format_dimension(w)
                    )),
                    _ => None,
                },
                quantity: self.area.unwrap_or_default(),
                rate: self.price_per_sqft.unwrap_or_default(),
            },
            PopPricingMode::Quantity => LineDescription {
                label: self.description.clone(),
                detail: None,
                quantity: self.quantity.unwrap_or_default(),
                rate: self.unit_price.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn area_mode_derives_area_and_total() {
        let item = PopItemDraft::by_area("False ceiling", 12.0, 10.0, 85.0)
            .price()
            .unwrap();
        assert_eq!(item.pricing_mode, PopPricingMode::Area);
        assert_eq!(item.area, Some(120.0));
        assert_eq!(item.total_price, 10200.0);
        assert_eq!(item.quantity, None);
        assert_eq!(item.unit_price, None);
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let err = PopItemDraft::by_quantity("Cornice", 1e200, 1e200)
            .price()
            .unwrap_err();
        assert_eq!(err, DomainError::validation("total price is too large"));

        let err = PopItemDraft::by_area("Ceiling", 1e200, 1e200, 85.0)
            .price()
            .unwrap_err();
        assert_eq!(err, DomainError::validation("area is too large"));
    }

    #[test]
    fn quantity_mode_multiplies_quantity_by_unit_price() {
        let item = PopItemDraft::by_quantity("Cornice moulding", 14.0, 250.0)
            .price()
            .unwrap();
        assert_eq!(item.pricing_mode, PopPricingMode::Quantity);
        assert_eq!(item.total_price, 3500.0);
        assert_eq!(item.length, None);
        assert_eq!(item.area, None);
    }

    #[test]
    fn caller_total_is_ignored() {
        let draft = PopItemDraft {
            total_price: Some(1.0),
            area: Some(999.0),
            ..PopItemDraft::by_area("Ceiling", 2.0, 3.0, 10.0)
        };
        let item = draft.price().unwrap();
        assert_eq!(item.area, Some(6.0));
        assert_eq!(item.total_price, 60.0);
    }

    #[test]
    fn zero_filled_unused_mode_is_ignored() {
        let draft = PopItemDraft {
            quantity: Some(0.0),
            unit_price: Some(0.0),
            ..PopItemDraft::by_area("Ceiling", 2.0, 3.0, 10.0)
        };
        assert_eq!(draft.mode().unwrap(), PopPricingMode::Area);
    }

    #[test]
    fn both_or_neither_mode_is_rejected() {
        let both = PopItemDraft {
            quantity: Some(2.0),
            unit_price: Some(5.0),
            ..PopItemDraft::by_area("Ceiling", 2.0, 3.0, 10.0)
        };
        assert!(matches!(both.price(), Err(DomainError::Validation(msg)) if msg.contains("not both")));

        let neither = PopItemDraft {
            description: Some("Ceiling".into()),
            ..PopItemDraft::default()
        };
        assert!(matches!(neither.price(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn incomplete_area_mode_names_missing_field() {
        let draft = PopItemDraft {
            width: None,
            ..PopItemDraft::by_area("Ceiling", 2.0, 3.0, 10.0)
        };
        assert_eq!(draft.price().unwrap_err(), DomainError::validation("width is required"));
    }

    #[test]
    fn description_is_required() {
        let draft = PopItemDraft {
            description: Some("  ".into()),
            ..PopItemDraft::by_quantity("x", 1.0, 1.0)
        };
        assert_eq!(
            draft.price().unwrap_err(),
            DomainError::validation("description is required")
        );
    }

    #[test]
    fn flat_wire_shape_deserializes() {
        let draft: PopItemDraft = serde_json::from_value(serde_json::json!({
            "description": "Wall moulding",
            "quantity": 3,
            "unit_price": 120.5,
            "length": null,
            "total_price": 361.5
        }))
        .unwrap();
        let item = draft.price().unwrap();
        assert_eq!(item.total_price, 361.5);
    }

    proptest! {
        #[test]
        fn quantity_total_holds_exactly(qty in 0.01f64..10_000.0, price in 0.01f64..100_000.0) {
            let item = PopItemDraft::by_quantity("item", qty, price).price().unwrap();
            prop_assert_eq!(item.total_price, qty * price);
        }
    }
}
