use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Primary key attribute of the competencies table.
pub const COMPETENCY_KEY: &str = "CompetencyId";

/// A competency row. Attributes beyond the key and domain are carried as-is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Competency {
    #[serde(rename = "CompetencyId")]
    pub competency_id: String,
    #[serde(rename = "Domain", default)]
    pub domain: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Competency ids are non-empty strings of ASCII digits.
pub fn validate_competency_id(id: &str) -> Result<(), ModelError> {
    if id.is_empty() {
        return Err(ModelError::MissingField("CompetencyId"));
    }
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::Validation(format!(
            "CompetencyId must contain only numeric characters, got {id:?}"
        )));
    }
    Ok(())
}
