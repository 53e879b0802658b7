//! FHIR DSTU2 `Patient` resource.
//!
//! Notes:
//! - `careProvider` is the DSTU2 name for what later releases call `generalPractitioner`
//! - contacts are modelled with telecom only; DVA messages carry an e-mail address there

use crate::datatypes::{ContactPoint, HumanName, Identifier, Reference};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<PatientContact>,

    /// Patient's nominated care provider (usually an Organization).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub care_provider: Vec<Reference>,
}

impl Patient {
    /// Returns the first identifier value issued by `system`.
    pub fn identifier_value(&self, system: &str) -> Option<&str> {
        self.identifier
            .iter()
            .find(|i| i.system.as_deref() == Some(system))
            .and_then(|i| i.value.as_deref())
    }

    /// Returns the primary (first) name, if any.
    pub fn primary_name(&self) -> Option<&HumanName> {
        self.name.first()
    }
}

/// A contact party for the patient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}
