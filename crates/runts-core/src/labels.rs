//! Field labels as rendered by the RUNTS portal.
//!
//! These strings come from the portal's Italian UI text and can change
//! upstream without notice. Anything that no longer matches falls through to
//! [`Category::AltroDocumento`](crate::Category::AltroDocumento), so keep them
//! in this one place.

/// Exact field label for a newly published 2024 financial statement.
pub const BILANCIO_2024_LABEL: &str = "Nuovo bilancio 2024 pubblicato";

/// Case-insensitive substring marking any financial statement field.
///
/// Matches both the singular "Bilancio" and plural "Bilanci".
pub const BILANCIO_MARKER: &str = "bilanci";

/// Section headings used when rendering grouped notifications.
pub const HEADING_BILANCIO_2024: &str = "Nuovi bilanci 2024";
pub const HEADING_ALTRO_BILANCIO: &str = "Altri bilanci";
pub const HEADING_ALTRO_DOCUMENTO: &str = "Altri documenti";
