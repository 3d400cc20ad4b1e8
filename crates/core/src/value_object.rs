//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A priced
/// line item or a document number is a value object; a quotation is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
