//! Forms table extraction.
//!
//! Every source row yields a recipient form; every row with an etymon also
//! yields a donor form. Recipient forms come first, in source order, then the
//! donor forms, also in source order. Ids are the 0-based table position.

use crate::models::{Form, FormOrigin, SourceRow};

/// What to put in the IPA and gloss cells of donor forms.
///
/// Source lists only record the English etymon, not its transcription or
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DonorFields {
    /// Repeat the etymon in the IPA and gloss cells.
    #[default]
    Etymon,
    /// Leave the IPA and gloss cells empty.
    Blank,
}

/// A recipient form paired with the donor form it was borrowed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonorLink {
    pub target_form_id: usize,
    pub source_form_id: usize,
}

/// The forms table plus the donor links recorded while building it.
#[derive(Debug, Clone, Default)]
pub struct FormTable {
    pub forms: Vec<Form>,
    pub donor_links: Vec<DonorLink>,
    /// Number of recipient forms, i.e. source rows.
    pub recipient_count: usize,
}

impl FormTable {
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn donor_count(&self) -> usize {
        self.forms.len() - self.recipient_count
    }

    pub fn recipient_forms(&self) -> &[Form] {
        &self.forms[..self.recipient_count]
    }

    pub fn donor_forms(&self) -> &[Form] {
        &self.forms[self.recipient_count..]
    }
}

/// Build the forms table for one language.
pub fn extract_forms(rows: &[SourceRow], donor_fields: DonorFields) -> FormTable {
    let mut forms: Vec<Form> = rows
        .iter()
        .enumerate()
        .map(|(id, row)| Form::new(id, FormOrigin::Recipient, &row.form, &row.ipa, &row.gloss))
        .collect();

    let mut donor_links = Vec::new();
    for (target_form_id, row) in rows.iter().enumerate() {
        let Some(etymon) = row.etymon.as_deref() else {
            continue;
        };

        let source_form_id = forms.len();
        let (ipa, gloss) = match donor_fields {
            DonorFields::Etymon => (etymon, etymon),
            DonorFields::Blank => ("", ""),
        };
        forms.push(Form::new(source_form_id, FormOrigin::Donor, etymon, ipa, gloss));
        donor_links.push(DonorLink {
            target_form_id,
            source_form_id,
        });
    }

    FormTable {
        forms,
        donor_links,
        recipient_count: rows.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<SourceRow> {
        vec![
            SourceRow::new("kutya", "/kuca/", "dog", None),
            SourceRow::new("lift", "/lift/", "elevator", Some("lift")),
            SourceRow::new("ház", "/ha:z/", "house", None),
            SourceRow::new("busz", "/bus/", "bus", Some("bus")),
        ]
    }

    #[test]
    fn test_single_borrowing_row() {
        let rows = [SourceRow::new("casa", "/kasa/", "house", Some("house"))];
        let table = extract_forms(&rows, DonorFields::Etymon);

        assert_eq!(
            table.forms,
            vec![
                Form::new(0, FormOrigin::Recipient, "casa", "/kasa/", "house"),
                Form::new(1, FormOrigin::Donor, "house", "house", "house"),
            ]
        );
        assert_eq!(
            table.donor_links,
            vec![DonorLink {
                target_form_id: 0,
                source_form_id: 1
            }]
        );
    }

    #[test]
    fn test_row_without_etymon_gives_one_form() {
        let rows = [SourceRow::new("kutya", "/kuca/", "dog", None)];
        let table = extract_forms(&rows, DonorFields::Etymon);

        assert_eq!(table.len(), 1);
        assert_eq!(table.forms[0].language_id, "0");
        assert!(table.donor_links.is_empty());
    }

    #[test]
    fn test_table_length_and_contiguous_ids() {
        let table = extract_forms(&rows(), DonorFields::Etymon);

        assert_eq!(table.len(), 4 + 2);
        for (position, form) in table.forms.iter().enumerate() {
            assert_eq!(form.id, position);
        }
    }

    #[test]
    fn test_recipients_precede_donors() {
        let table = extract_forms(&rows(), DonorFields::Etymon);

        assert!(table.recipient_forms().iter().all(|f| !f.is_donor()));
        assert!(table.donor_forms().iter().all(|f| f.is_donor()));
        assert_eq!(table.donor_count(), 2);

        let donors: Vec<&str> = table.donor_forms().iter().map(|f| f.form.as_str()).collect();
        assert_eq!(donors, vec!["lift", "bus"]);
    }

    #[test]
    fn test_donor_links_follow_source_order() {
        let table = extract_forms(&rows(), DonorFields::Etymon);

        assert_eq!(
            table.donor_links,
            vec![
                DonorLink { target_form_id: 1, source_form_id: 4 },
                DonorLink { target_form_id: 3, source_form_id: 5 },
            ]
        );
        for link in &table.donor_links {
            let recipient = &table.forms[link.target_form_id];
            let donor = &table.forms[link.source_form_id];
            assert!(!recipient.is_donor());
            assert_eq!(donor.form, rows()[link.target_form_id].etymon.clone().unwrap());
        }
    }

    #[test]
    fn test_blank_donor_fields() {
        let table = extract_forms(&rows(), DonorFields::Blank);
        let donor = &table.donor_forms()[0];

        assert_eq!(donor.form, "lift");
        assert_eq!(donor.ipa, "");
        assert_eq!(donor.gloss, "");
    }

    #[test]
    fn test_empty_source() {
        let table = extract_forms(&[], DonorFields::Etymon);
        assert!(table.is_empty());
        assert_eq!(table.donor_count(), 0);
    }
}
