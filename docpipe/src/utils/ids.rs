//! Project identifier generation.

use uuid::Uuid;

/// Generates a new project identifier.
///
/// Identifiers take the form `PROJ-XXXXXXXX` where the suffix is eight
/// uppercase hex characters drawn from a v4 UUID. The identifier is embedded
/// in the context file name and in every deterministic output path, so it is
/// immutable once assigned.
///
/// # Examples
///
/// ```
/// use docpipe::utils::generate_project_id;
///
/// let id = generate_project_id();
/// assert!(id.starts_with("PROJ-"));
/// assert_eq!(id.len(), 13);
/// ```
#[must_use]
pub fn generate_project_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("PROJ-{}", hex[..8].to_uppercase())
}
