use serde::{Deserialize, Serialize};

use super::technology::{Stats, Technology};

/// Version label written into every export.
pub const EXPORT_VERSION: &str = "1.0";

/// The document produced by an export.
///
/// Imports accept this exact shape back (through its `technologies` array),
/// alongside a bare array of technologies or a single technology object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: String,
    pub roadmap_name: String,
    pub version: String,
    pub technologies: Vec<Technology>,
    pub statistics: Stats,
    /// Overall completion, 0 to 100.
    pub progress: u8,
}

/// Descriptive data about an imported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadata {
    pub roadmap_name: String,
    pub count: usize,
    pub exported_at: String,
}

/// Result of a successful import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// The records now forming the collection.
    pub technologies: Vec<Technology>,
    pub metadata: ImportMetadata,
    /// Non-fatal normalization notes (regenerated ids, dropped resources).
    pub warnings: Vec<String>,
}
