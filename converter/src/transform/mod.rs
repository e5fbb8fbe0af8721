//! Source rows to CLDF tables.
//!
//! ```text
//! SourceRow[0..n]  ──▶  forms:      recipient[0..n] ++ donor[n..n+k]
//!                  ──▶  borrowings: (recipient id, donor id) × k
//! ```
//!
//! Donor ids are captured while the forms table is built and handed to the
//! linker, so the two tables can never disagree about which donor form
//! belongs to which recipient form.

pub mod borrowings;
pub mod forms;

pub use borrowings::link_borrowings;
pub use forms::{extract_forms, DonorFields, DonorLink, FormTable};
