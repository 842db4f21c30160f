//! Health-insurance provider ("obra social") models.

use serde::{Deserialize, Serialize};

/// Contact details for an insurance provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// An insurance provider accepted by the practice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    /// Generated at creation time, never reassigned
    pub id: String,
    pub name: String,
    /// Unique, uppercase alphanumeric
    pub code: String,
    /// Deactivated providers stay in the collection
    #[serde(alias = "active")]
    pub is_active: bool,
    /// Missing on records written before contact details were tracked
    #[serde(default)]
    pub contact_info: ContactInfo,
    /// Creation timestamp (RFC 3339), stamped once
    #[serde(default)]
    pub created_at: String,
}

impl Insurance {
    /// Build a stored record from validated input, stamping id and creation time.
    pub fn from_new(input: NewInsurance) -> Self {
        let now = chrono::Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("insurance_{}_{}", now.timestamp_millis(), &suffix[..9]),
            name: input.name,
            code: input.code,
            is_active: input.is_active,
            contact_info: input.contact_info,
            created_at: now.to_rfc3339(),
        }
    }

    /// Case-insensitive match on name, code or contact email.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.code.to_lowercase().contains(&needle)
            || self.contact_info.email.to_lowercase().contains(&needle)
    }
}

/// Validated input for creating an insurance provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInsurance {
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub contact_info: ContactInfo,
}

/// Raw, unvalidated contact info as typed into the admin form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfoForm {
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl From<&ContactInfo> for ContactInfoForm {
    fn from(info: &ContactInfo) -> Self {
        Self {
            phone: info.phone.clone(),
            email: info.email.clone(),
            address: info.address.clone(),
        }
    }
}

/// Raw, unvalidated admin form for creating an insurance provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceForm {
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub contact_info: ContactInfoForm,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub is_active: Option<bool>,
    pub contact_info: Option<ContactInfoForm>,
}

impl InsuranceUpdate {
    /// Overlay this update on an existing record, producing a raw form to validate.
    pub fn apply_to(&self, existing: &Insurance) -> InsuranceForm {
        InsuranceForm {
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            code: self.code.clone().unwrap_or_else(|| existing.code.clone()),
            is_active: self.is_active.unwrap_or(existing.is_active),
            contact_info: self
                .contact_info
                .clone()
                .unwrap_or_else(|| ContactInfoForm::from(&existing.contact_info)),
        }
    }
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsuranceStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl InsuranceStats {
    pub fn from_insurances(insurances: &[Insurance]) -> Self {
        let active = insurances.iter().filter(|i| i.is_active).count();
        Self {
            total: insurances.len(),
            active,
            inactive: insurances.len() - active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_new() -> NewInsurance {
        NewInsurance {
            name: "OSDE".into(),
            code: "OSDE001".into(),
            is_active: true,
            contact_info: ContactInfo {
                phone: "+54 11 4321-8765".into(),
                email: "prestadores@osde.com.ar".into(),
                address: "Av. Corrientes 1234, CABA".into(),
            },
        }
    }

    #[test]
    fn test_from_new_stamps_id_and_timestamp() {
        let insurance = Insurance::from_new(make_new());
        assert!(insurance.id.starts_with("insurance_"));
        assert!(!insurance.created_at.is_empty());
        assert_eq!(insurance.code, "OSDE001");

        let other = Insurance::from_new(make_new());
        assert_ne!(insurance.id, other.id);
    }

    #[test]
    fn test_update_overlay_keeps_unset_fields() {
        let insurance = Insurance::from_new(make_new());
        let update = InsuranceUpdate {
            name: Some("OSDE Binario".into()),
            ..Default::default()
        };
        let form = update.apply_to(&insurance);
        assert_eq!(form.name, "OSDE Binario");
        assert_eq!(form.code, "OSDE001");
        assert_eq!(form.contact_info.email, "prestadores@osde.com.ar");
    }

    #[test]
    fn test_matches_query() {
        let insurance = Insurance::from_new(make_new());
        assert!(insurance.matches_query("osde"));
        assert!(insurance.matches_query("PRESTADORES"));
        assert!(!insurance.matches_query("galeno"));
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_string(&Insurance::from_new(make_new())).unwrap();
        assert!(json.contains("\"isActive\":true"));
        assert!(json.contains("\"contactInfo\""));
        assert!(json.contains("\"createdAt\""));
    }
}
