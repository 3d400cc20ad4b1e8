//! Catalogs domain module.
//!
//! Per-owner reference data consulted while building quotations: predefined
//! price per sq ft for each room category, and the material price list.
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod material;
pub mod pricing;

pub use material::{Material, MaterialId, MaterialInput};
pub use pricing::{PredefinedPricing, PriceList, PricingId, PricingInput, RateSuggestion};
