//! Borrowings table linking.

use crate::models::Borrowing;

use super::forms::FormTable;

/// One borrowing per donor link, in forms-table order.
pub fn link_borrowings(forms: &FormTable) -> Vec<Borrowing> {
    forms
        .donor_links
        .iter()
        .enumerate()
        .map(|(id, link)| Borrowing {
            id,
            target_form_id: link.target_form_id,
            source_form_id: link.source_form_id,
        })
        .collect()
}
