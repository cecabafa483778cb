use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A named association keyed by an allocated identifier.
///
/// `member_ids` is replaced wholesale on every write; there is no merge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl AssociationRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, member_ids: Vec<String>) -> Self {
        Self { id: id.into(), name: name.into(), member_ids }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::MissingField("id"));
        }
        validate_name(&self.name)
    }
}

/// Request body linking a tracking location to competencies.
///
/// Accepts the table's attribute names (`LocationName`, `CompetencyIds`)
/// as well as the record's own field names.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct AssociationRequest {
    #[serde(rename = "LocationName", alias = "name")]
    pub name: Option<String>,
    #[serde(rename = "CompetencyIds", alias = "memberIds")]
    pub member_ids: Option<Vec<String>>,
}

impl AssociationRequest {
    /// Check required fields and return `(name, member_ids)`.
    pub fn into_parts(self) -> Result<(String, Vec<String>), ModelError> {
        let name = self.name.ok_or(ModelError::MissingField("LocationName"))?;
        validate_name(&name)?;
        let member_ids = self.member_ids.ok_or(ModelError::MissingField("CompetencyIds"))?;
        Ok((name, member_ids))
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name must not be empty".into()));
    }
    Ok(())
}
