//! Interior line items: area-priced room/furniture categories.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use quotedesk_core::{DomainError, DomainResult, ValueObject, optional_text, require_positive};

use crate::pricing::{LineDescription, LineDraft, PricedLine, format_dimension, require_finite};

/// Known interior categories. `Custom` carries free text in
/// `custom_room_type` on the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Kitchen,
    Wardrobe,
    Loft,
    TvUnit,
    Bed,
    PoojaRoom,
    CrockeryUnit,
    Pantry,
    MagicCorner,
    Custom,
}

impl RoomType {
    pub const ALL: [RoomType; 10] = [
        RoomType::Kitchen,
        RoomType::Wardrobe,
        RoomType::Loft,
        RoomType::TvUnit,
        RoomType::Bed,
        RoomType::PoojaRoom,
        RoomType::CrockeryUnit,
        RoomType::Pantry,
        RoomType::MagicCorner,
        RoomType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Kitchen => "kitchen",
            RoomType::Wardrobe => "wardrobe",
            RoomType::Loft => "loft",
            RoomType::TvUnit => "tv_unit",
            RoomType::Bed => "bed",
            RoomType::PoojaRoom => "pooja_room",
            RoomType::CrockeryUnit => "crockery_unit",
            RoomType::Pantry => "pantry",
            RoomType::MagicCorner => "magic_corner",
            RoomType::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoomType::Kitchen => "Kitchen",
            RoomType::Wardrobe => "Wardrobe",
            RoomType::Loft => "Loft",
            RoomType::TvUnit => "TV Unit",
            RoomType::Bed => "Bed",
            RoomType::PoojaRoom => "Pooja Room",
            RoomType::CrockeryUnit => "Crockery Unit",
            RoomType::Pantry => "Pantry",
            RoomType::MagicCorner => "Magic Corner",
            RoomType::Custom => "Custom",
        }
    }
}

impl FromStr for RoomType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown room type '{s}'")))
    }
}

impl core::fmt::Display for RoomType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item's rate came from. Recorded as provenance only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSource {
    Predefined,
    #[default]
    Custom,
}

/// Caller-supplied interior item. Every field is optional on the wire so that
/// missing values surface as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteriorItemDraft {
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub custom_room_type: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub price_per_sqft: Option<f64>,
    #[serde(default)]
    pub price_source: Option<PriceSource>,
    #[serde(default)]
    pub description: Option<String>,
}

impl InteriorItemDraft {
    pub fn new(room_type: RoomType, length: f64, width: f64, price_per_sqft: f64) -> Self {
        Self {
            room_type: Some(room_type.as_str().to_string()),
            length: Some(length),
            width: Some(width),
            price_per_sqft: Some(price_per_sqft),
            ..Self::default()
        }
    }
}

/// Interior item with `area = length × width` and
/// `total_price = area × price_per_sqft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorItem {
    pub room_type: RoomType,
    pub custom_room_type: Option<String>,
    pub length: f64,
    pub width: f64,
    pub area: f64,
    pub price_per_sqft: f64,
    pub total_price: f64,
    pub price_source: PriceSource,
    pub description: Option<String>,
}

impl ValueObject for InteriorItem {}

impl InteriorItem {
    /// Room label, or the free-text category for custom items.
    pub fn display_room(&self) -> &str {
        match (&self.room_type, &self.custom_room_type) {
            (RoomType::Custom, Some(custom)) => custom.as_str(),
            (room, _) => room.label(),
        }
    }
}

impl LineDraft for InteriorItemDraft {
    type Priced = InteriorItem;

    fn price(&self) -> DomainResult<InteriorItem> {
        let room_type: RoomType = match self.room_type.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => return Err(DomainError::validation("room type is required")),
        };

        let custom_room_type = match room_type {
            RoomType::Custom => Some(
                optional_text(self.custom_room_type.clone()).ok_or_else(|| {
                    DomainError::validation("custom room type is required for custom items")
                })?,
            ),
            _ => None,
        };

        let length = require_positive(self.length, "length")?;
        let width = require_positive(self.width, "width")?;
        let price_per_sqft = require_positive(self.price_per_sqft, "price per sqft")?;

        let area = require_finite(length * width, "area")?;
        let total_price = require_finite(area * price_per_sqft, "total price")?;

        Ok(InteriorItem {
            room_type,
            custom_room_type,
            length,
            width,
            area,
            price_per_sqft,
            total_price,
            price_source: self.price_source.unwrap_or_default(),
            description: optional_text(self.description.clone()),
        })
    }
}

impl PricedLine for InteriorItem {
    fn total_price(&self) -> f64 {
        self.total_price
    }

    fn describe(&self) -> LineDescription {
        LineDescription {
            label: self.display_room().to_string(),
            detail: Some(format!(
                "{} ft × {} ft",
                format_dimension(self.length),
                format_dimension(self.width)
            )),
            quantity: self.area,
            rate: self.price_per_sqft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn kitchen_item_prices_by_area() {
        let item = InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 150.0)
            .price()
            .unwrap();
        assert_eq!(item.area, 80.0);
        assert_eq!(item.total_price, 12000.0);
        assert_eq!(item.price_source, PriceSource::Custom);
        assert_eq!(item.custom_room_type, None);
    }

    #[test]
    fn overflowing_area_or_total_is_rejected() {
        let err = InteriorItemDraft::new(RoomType::Kitchen, 1e200, 1e200, 150.0)
            .price()
            .unwrap_err();
        assert_eq!(err, DomainError::validation("area is too large"));

        let err = InteriorItemDraft::new(RoomType::Kitchen, 1e150, 1e150, 1e10)
            .price()
            .unwrap_err();
        assert_eq!(err, DomainError::validation("total price is too large"));
    }

    #[test]
    fn caller_price_source_is_kept() {
        let draft = InteriorItemDraft {
            price_source: Some(PriceSource::Predefined),
            ..InteriorItemDraft::new(RoomType::Loft, 4.0, 2.0, 90.0)
        };
        assert_eq!(draft.price().unwrap().price_source, PriceSource::Predefined);
    }

    #[test]
    fn custom_room_requires_free_text() {
        let draft = InteriorItemDraft::new(RoomType::Custom, 3.0, 3.0, 100.0);
        assert_eq!(
            draft.price().unwrap_err(),
            DomainError::validation("custom room type is required for custom items")
        );

        let draft = InteriorItemDraft {
            custom_room_type: Some(" Study table ".into()),
            ..draft
        };
        let item = draft.price().unwrap();
        assert_eq!(item.display_room(), "Study table");
    }

    #[test]
    fn custom_text_is_dropped_for_known_rooms() {
        let draft = InteriorItemDraft {
            custom_room_type: Some("ignored".into()),
            ..InteriorItemDraft::new(RoomType::Bed, 6.0, 5.0, 100.0)
        };
        let item = draft.price().unwrap();
        assert_eq!(item.custom_room_type, None);
        assert_eq!(item.display_room(), "Bed");
    }

    #[test]
    fn missing_or_non_positive_dimensions_are_rejected() {
        let mut draft = InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 150.0);
        draft.width = None;
        assert_eq!(draft.price().unwrap_err(), DomainError::validation("width is required"));

        let draft = InteriorItemDraft::new(RoomType::Kitchen, -10.0, 8.0, 150.0);
        assert_eq!(
            draft.price().unwrap_err(),
            DomainError::validation("length must be greater than 0")
        );

        let draft = InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 0.0);
        assert!(draft.price().is_err());
    }

    #[test]
    fn unknown_room_type_is_a_validation_error() {
        let draft = InteriorItemDraft {
            room_type: Some("garage".into()),
            ..InteriorItemDraft::new(RoomType::Kitchen, 1.0, 1.0, 1.0)
        };
        assert_eq!(
            draft.price().unwrap_err(),
            DomainError::validation("unknown room type 'garage'")
        );
    }

    #[test]
    fn room_types_round_trip_through_strings() {
        for room in RoomType::ALL {
            assert_eq!(room.as_str().parse::<RoomType>().unwrap(), room);
            assert_eq!(
                serde_json::to_value(room).unwrap(),
                serde_json::json!(room.as_str())
            );
        }
    }

    #[test]
    fn describe_uses_area_and_rate() {
        let item = InteriorItemDraft::new(RoomType::TvUnit, 7.5, 2.0, 200.0)
            .price()
            .unwrap();
        let line = item.describe();
        assert_eq!(line.label, "TV Unit");
        assert_eq!(line.detail.as_deref(), Some("7.5 ft × 2 ft"));
        assert_eq!(line.quantity, 15.0);
        assert_eq!(line.rate, 200.0);
    }

    proptest! {
        #[test]
        fn derived_fields_hold_exactly(
            length in 0.01f64..1_000.0,
            width in 0.01f64..1_000.0,
            rate in 0.01f64..100_000.0,
        ) {
            let item = InteriorItemDraft::new(RoomType::Wardrobe, length, width, rate)
                .price()
                .unwrap();
            prop_assert_eq!(item.area, length * width);
            prop_assert_eq!(item.total_price, item.area * rate);
        }
    }
}
