//! Insurance provider administration.

use tracing::{info, warn};

use super::{load_collection, save_collection, seed_insurances, ServiceResult};
use crate::config::ClinicConfig;
use crate::db::KeyValueStore;
use crate::models::{Insurance, InsuranceForm, InsuranceStats, InsuranceUpdate};
use crate::validation::{validate_insurance, ValidationErrors};

const DUPLICATE_CODE: &str = "An insurance with this code already exists";

/// Insurance provider operations against a key/value store.
pub struct InsuranceService<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    key: &'a str,
}

impl<'a, S: KeyValueStore + ?Sized> InsuranceService<'a, S> {
    pub fn new(store: &'a S, config: &'a ClinicConfig) -> Self {
        Self {
            store,
            key: &config.storage.insurances,
        }
    }

    pub fn list(&self) -> ServiceResult<Vec<Insurance>> {
        load_collection(self.store, self.key, seed_insurances)
    }

    fn save(&self, insurances: &[Insurance]) -> ServiceResult<()> {
        save_collection(self.store, self.key, insurances)
    }

    pub fn active(&self) -> ServiceResult<Vec<Insurance>> {
        Ok(self.list()?.into_iter().filter(|i| i.is_active).collect())
    }

    pub fn inactive(&self) -> ServiceResult<Vec<Insurance>> {
        Ok(self.list()?.into_iter().filter(|i| !i.is_active).collect())
    }

    pub fn get(&self, id: &str) -> ServiceResult<Option<Insurance>> {
        Ok(self.list()?.into_iter().find(|i| i.id == id))
    }

    /// Case-insensitive lookup by code.
    pub fn by_code(&self, code: &str) -> ServiceResult<Option<Insurance>> {
        let code = code.trim();
        Ok(self
            .list()?
            .into_iter()
            .find(|i| i.code.eq_ignore_ascii_case(code)))
    }

    /// Match on name, code or contact email; a blank query returns everything.
    pub fn search(&self, query: &str) -> ServiceResult<Vec<Insurance>> {
        let query = query.trim();
        let insurances = self.list()?;
        if query.is_empty() {
            return Ok(insurances);
        }
        Ok(insurances
            .into_iter()
            .filter(|i| i.matches_query(query))
            .collect())
    }

    pub fn stats(&self) -> ServiceResult<InsuranceStats> {
        Ok(InsuranceStats::from_insurances(&self.list()?))
    }

    /// Validate and store a new provider.
    pub fn create(&self, form: &InsuranceForm) -> ServiceResult<Insurance> {
        let input = validate_insurance(form)?;
        let mut insurances = self.list()?;
        if insurances
            .iter()
            .any(|i| i.code.eq_ignore_ascii_case(&input.code))
        {
            return Err(ValidationErrors::single("code", DUPLICATE_CODE).into());
        }

        let insurance = Insurance::from_new(input);
        insurances.push(insurance.clone());
        self.save(&insurances)?;
        info!(id = %insurance.id, code = %insurance.code, "insurance created");
        Ok(insurance)
    }

    /// Apply a partial update. The merged record is re-validated as a whole;
    /// id and creation time never change.
    pub fn update(&self, id: &str, update: &InsuranceUpdate) -> ServiceResult<bool> {
        let mut insurances = self.list()?;
        let Some(index) = insurances.iter().position(|i| i.id == id) else {
            warn!(id, "insurance not found");
            return Ok(false);
        };

        let input = validate_insurance(&update.apply_to(&insurances[index]))?;
        let clash = insurances
            .iter()
            .any(|i| i.id != id && i.code.eq_ignore_ascii_case(&input.code));
        if clash {
            return Err(ValidationErrors::single("code", DUPLICATE_CODE).into());
        }

        let existing = &mut insurances[index];
        existing.name = input.name;
        existing.code = input.code;
        existing.is_active = input.is_active;
        existing.contact_info = input.contact_info;
        self.save(&insurances)?;
        info!(id, "insurance updated");
        Ok(true)
    }

    fn set_active(&self, id: &str, active: Option<bool>) -> ServiceResult<Option<bool>> {
        let mut insurances = self.list()?;
        let Some(insurance) = insurances.iter_mut().find(|i| i.id == id) else {
            warn!(id, "insurance not found");
            return Ok(None);
        };
        let active = active.unwrap_or(!insurance.is_active);
        insurance.is_active = active;
        self.save(&insurances)?;
        info!(id, active, "insurance status changed");
        Ok(Some(active))
    }

    /// Soft delete: the provider stays stored, marked inactive.
    pub fn deactivate(&self, id: &str) -> ServiceResult<bool> {
        Ok(self.set_active(id, Some(false))?.is_some())
    }

    /// Flip the active flag; returns the new value, `None` if the id is unknown.
    pub fn toggle_status(&self, id: &str) -> ServiceResult<Option<bool>> {
        self.set_active(id, None)
    }

    /// Set the active flag on several providers; returns how many changed.
    pub fn set_status_bulk(&self, ids: &[String], active: bool) -> ServiceResult<usize> {
        let mut insurances = self.list()?;
        let mut changed = 0;
        for insurance in insurances.iter_mut() {
            if insurance.is_active != active && ids.contains(&insurance.id) {
                insurance.is_active = active;
                changed += 1;
            }
        }
        if changed > 0 {
            self.save(&insurances)?;
            info!(changed, active, "insurance status changed in bulk");
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ContactInfoForm;
    use crate::services::ServiceError;

    fn form(code: &str) -> InsuranceForm {
        InsuranceForm {
            name: "IOMA".into(),
            code: code.into(),
            is_active: true,
            contact_info: ContactInfoForm {
                phone: "+54 221 429-5600".into(),
                email: "prestadores@ioma.gba.gov.ar".into(),
                address: "Calle 46 886, La Plata".into(),
            },
        }
    }

    #[test]
    fn test_seed_queries() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = InsuranceService::new(&store, &config);

        assert_eq!(service.list().unwrap().len(), 4);
        assert_eq!(service.active().unwrap().len(), 3);
        assert_eq!(service.inactive().unwrap()[0].name, "Medicus");
        assert_eq!(
            service.by_code("sm002").unwrap().unwrap().name,
            "Swiss Medical"
        );
        assert_eq!(service.search("galeno.com").unwrap().len(), 1);
        assert_eq!(service.search("  ").unwrap().len(), 4);
        assert_eq!(
            service.stats().unwrap(),
            InsuranceStats {
                total: 4,
                active: 3,
                inactive: 1
            }
        );
    }

    #[test]
    fn test_create_normalizes_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = InsuranceService::new(&store, &config);

        let created = service.create(&form("ioma1")).unwrap();
        assert_eq!(created.code, "IOMA1");
        assert!(created.id.starts_with("insurance_"));
        assert!(!created.created_at.is_empty());
        assert_eq!(service.get(&created.id).unwrap(), Some(created));

        match service.create(&form("IOMA1")) {
            Err(ServiceError::Invalid(errors)) => {
                assert_eq!(errors.field("code"), Some(DUPLICATE_CODE))
            }
            other => panic!("expected duplicate code error, got {other:?}"),
        }

        match service.create(&form("!")) {
            Err(ServiceError::Invalid(errors)) => assert!(errors.has_field("code")),
            other => panic!("expected invalid code error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_is_partial() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = InsuranceService::new(&store, &config);
        let before = service.get("3").unwrap().unwrap();

        let update = InsuranceUpdate {
            name: Some("Galeno Oro".into()),
            ..Default::default()
        };
        assert!(service.update("3", &update).unwrap());
        let after = service.get("3").unwrap().unwrap();
        assert_eq!(after.name, "Galeno Oro");
        assert_eq!(after.code, before.code);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.contact_info, before.contact_info);

        let steal_code = InsuranceUpdate {
            code: Some("osde001".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update("3", &steal_code),
            Err(ServiceError::Invalid(_))
        ));
        assert!(!service.update("missing", &update).unwrap());
    }

    #[test]
    fn test_status_changes() {
        let store = MemoryStore::new();
        let config = ClinicConfig::default();
        let service = InsuranceService::new(&store, &config);

        assert!(service.deactivate("1").unwrap());
        assert_eq!(service.list().unwrap().len(), 4);
        assert!(!service.get("1").unwrap().unwrap().is_active);

        assert_eq!(service.toggle_status("4").unwrap(), Some(true));
        assert_eq!(service.toggle_status("missing").unwrap(), None);

        let ids = vec!["1".to_string(), "2".to_string(), "4".to_string()];
        assert_eq!(service.set_status_bulk(&ids, true).unwrap(), 1);
        assert_eq!(service.set_status_bulk(&ids, false).unwrap(), 3);
        assert_eq!(service.stats().unwrap().active, 1);
    }
}
