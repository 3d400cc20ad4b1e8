//! Quotations domain module.
//!
//! Numbering, pricing and status-lifecycle rules shared by the two document
//! kinds (interior quotations and POP quotations), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod interior;
pub mod kind;
pub mod lifecycle;
pub mod number;
pub mod pop;
pub mod pricing;
pub mod progress;
pub mod quotation;
pub mod snapshot;

pub use interior::{InteriorItem, InteriorItemDraft, PriceSource, RoomType};
pub use kind::{DocumentKind, Interior, Kind, Pop};
pub use lifecycle::{QuotationStatus, Transition};
pub use number::DocumentNumber;
pub use pop::{PopItem, PopItemDraft, PopPricingMode};
pub use pricing::{LineDescription, LineDraft, PricedLine, price_items, total_amount};
pub use progress::{NewProgress, ProgressId, ProgressRecord, ProgressStatus, RecordProgress};
pub use quotation::{
    CreateQuotation, NewQuotation, Quotation, QuotationId, QuotationUpdate, UpdateQuotation,
};
pub use snapshot::{DocumentLine, DocumentSnapshot, SnapshotClient};
