//! Domain models for the CLDF conversion pipeline.
//!
//! - [`SourceRow`] - one record of a per-language borrowing list
//! - [`Form`] - one row of `forms.csv`
//! - [`Borrowing`] - one row of `borrowings.csv`
//! - [`TableRow`] - fixed CSV header of an output table

use serde::{Deserialize, Serialize};

// =============================================================================
// Source rows
// =============================================================================

/// One borrowing record from a per-language CSV.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRow {
    /// Recipient-language orthographic form.
    pub form: String,
    /// Recipient-language IPA transcription.
    pub ipa: String,
    /// Recipient-language gloss.
    pub gloss: String,
    /// English etymon, `None` when the row records no borrowing.
    pub etymon: Option<String>,
}

impl SourceRow {
    pub fn new(
        form: impl Into<String>,
        ipa: impl Into<String>,
        gloss: impl Into<String>,
        etymon: Option<&str>,
    ) -> Self {
        Self {
            form: form.into(),
            ipa: ipa.into(),
            gloss: gloss.into(),
            etymon: etymon.map(str::to_string),
        }
    }

    /// True when the row links a recipient form to a donor etymon.
    pub fn is_borrowing(&self) -> bool {
        self.etymon.is_some()
    }
}

// =============================================================================
// Output tables
// =============================================================================

/// A row type with a fixed CSV header.
///
/// The header is written explicitly so that empty tables still carry it.
pub trait TableRow: Serialize {
    const HEADER: &'static [&'static str];
}

/// `Language_ID` of forms in the recipient language.
pub const RECIPIENT_FORM_LANGUAGE_ID: &str = "0";

/// `Language_ID` of forms in the donor language.
pub const DONOR_FORM_LANGUAGE_ID: &str = "1";

/// Which side of a borrowing a form belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOrigin {
    Recipient,
    Donor,
}

impl FormOrigin {
    pub fn language_id(self) -> &'static str {
        match self {
            FormOrigin::Recipient => RECIPIENT_FORM_LANGUAGE_ID,
            FormOrigin::Donor => DONOR_FORM_LANGUAGE_ID,
        }
    }
}

/// One row of `forms.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "Form")]
    pub form: String,
    #[serde(rename = "IPA")]
    pub ipa: String,
    #[serde(rename = "Gloss")]
    pub gloss: String,
    #[serde(rename = "Language_ID")]
    pub language_id: String,
}

impl Form {
    pub fn new(
        id: usize,
        origin: FormOrigin,
        form: impl Into<String>,
        ipa: impl Into<String>,
        gloss: impl Into<String>,
    ) -> Self {
        Self {
            id,
            form: form.into(),
            ipa: ipa.into(),
            gloss: gloss.into(),
            language_id: origin.language_id().to_string(),
        }
    }

    pub fn is_donor(&self) -> bool {
        self.language_id == DONOR_FORM_LANGUAGE_ID
    }
}

impl TableRow for Form {
    const HEADER: &'static [&'static str] = &["ID", "Form", "IPA", "Gloss", "Language_ID"];
}

/// One row of `borrowings.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    #[serde(rename = "ID")]
    pub id: usize,
    /// The recipient form.
    #[serde(rename = "Target_Form_ID")]
    pub target_form_id: usize,
    /// The donor form.
    #[serde(rename = "Source_Form_ID")]
    pub source_form_id: usize,
}

impl TableRow for Borrowing {
    const HEADER: &'static [&'static str] = &["ID", "Target_Form_ID", "Source_Form_ID"];
}
