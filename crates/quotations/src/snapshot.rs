//! Read-only projection consumed by the document renderer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::kind::DocumentKind;
use crate::lifecycle::QuotationStatus;
use crate::pricing::{PricedLine, format_amount};
use crate::quotation::Quotation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotClient {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLine {
    /// 1-based position on the document.
    pub index: usize,
    pub label: String,
    pub detail: Option<String>,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

/// Everything needed to print a quotation, draft or finalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSnapshot {
    pub title: &'static str,
    pub quotation_number: String,
    pub status: QuotationStatus,
    /// Finalization date when finalized, creation date otherwise.
    pub date: NaiveDate,
    pub client: SnapshotClient,
    pub notes: Option<String>,
    pub lines: Vec<DocumentLine>,
    pub total_amount: f64,
    pub total_display: String,
}

impl<K: DocumentKind> From<&Quotation<K>> for DocumentSnapshot {
    fn from(q: &Quotation<K>) -> Self {
        let lines = q
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let d = item.describe();
                DocumentLine {
                    index: idx + 1,
                    label: d.label,
                    detail: d.detail,
                    quantity: d.quantity,
                    rate: d.rate,
                    amount: item.total_price(),
                }
            })
            .collect();

        Self {
            title: K::KIND.document_title(),
            quotation_number: q.quotation_number.to_string(),
            status: q.status,
            date: q.finalized_at.unwrap_or(q.created_at).date_naive(),
            client: SnapshotClient {
                name: q.client_name.clone(),
                phone: q.client_phone.clone(),
                email: q.client_email.clone(),
                address: q.client_address.clone(),
            },
            notes: q.notes.clone(),
            lines,
            total_amount: q.total_amount,
            total_display: format_amount(q.total_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interior::{InteriorItemDraft, RoomType};
    use crate::kind::{Interior, Kind, Pop};
    use crate::number::DocumentNumber;
    use crate::pop::PopItemDraft;
    use crate::quotation::CreateQuotation;
    use quotedesk_core::UserId;

    #[test]
    fn interior_snapshot_lists_rooms_with_dimensions() {
        let custom = InteriorItemDraft {
            custom_room_type: Some("Study table".into()),
            ..InteriorItemDraft::new(RoomType::Custom, 4.0, 2.5, 300.0)
        };
        let q = CreateQuotation::<Interior>::new(
            UserId::new(),
            "a",
            "Asha",
            vec![InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 150.0), custom],
        )
        .plan()
        .unwrap()
        .into_quotation(DocumentNumber::new(Kind::Interior, 2026, 12).unwrap());

        let snap = DocumentSnapshot::from(&q);
        assert_eq!(snap.title, "QUOTATION");
        assert_eq!(snap.quotation_number, "QT-2026-0012");
        assert_eq!(snap.date, q.created_at.date_naive());
        assert_eq!(snap.lines.len(), 2);
        assert_eq!(snap.lines[0].index, 1);
        assert_eq!(snap.lines[0].label, "Kitchen");
        assert_eq!(snap.lines[0].detail.as_deref(), Some("10 ft × 8 ft"));
        assert_eq!(snap.lines[0].quantity, 80.0);
        assert_eq!(snap.lines[1].label, "Study table");
        assert_eq!(snap.total_amount, 12000.0 + 3000.0);
        assert_eq!(snap.total_display, "15000.00");
    }

    #[test]
    fn pop_quantity_lines_carry_quantity_and_unit_price() {
        let q = CreateQuotation::<Pop>::new(
            UserId::new(),
            "a",
            "Asha",
            vec![PopItemDraft::by_quantity("Cornice", 14.0, 250.0)],
        )
        .plan()
        .unwrap()
        .into_quotation(DocumentNumber::first(Kind::Pop, 2026).unwrap());

        let snap = DocumentSnapshot::from(&q);
        assert_eq!(snap.title, "POP QUOTATION");
        let line = &snap.lines[0];
        assert_eq!(line.label, "Cornice");
        assert_eq!(line.detail, None);
        assert_eq!(line.quantity, 14.0);
        assert_eq!(line.rate, 250.0);
        assert_eq!(line.amount, 3500.0);
    }
}
