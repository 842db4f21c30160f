//! Persistence integration tests.

use tempfile::TempDir;
use turnos_core::db::{Database, KeyValueStore};
use turnos_core::models::{Appointment, AppointmentStatus, ContactInfo, InsuranceUpdate};
use turnos_core::services::{seed_appointments, AppointmentService, InsuranceService};
use turnos_core::ClinicConfig;

#[test]
fn test_collection_round_trips_through_storage() {
    let db = Database::open_in_memory().unwrap();
    let config = ClinicConfig::default();
    let service = AppointmentService::new(&db, &config);

    assert!(service.cancel("1", Some("Reprogramado")).unwrap());
    let stored = db.get_item(&config.storage.appointments).unwrap().unwrap();

    let parsed: Vec<Appointment> = serde_json::from_str(&stored).unwrap();
    assert_eq!(parsed, service.list().unwrap());
    assert_eq!(parsed.len(), seed_appointments().len());

    // Stored with camelCase keys
    assert!(stored.contains("\"patientName\""));
    assert!(stored.contains("\"status\":\"cancelled\""));
}

#[test]
fn test_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("turnos.db");
    let config = ClinicConfig::default();

    {
        let db = Database::open(&path).unwrap();
        let insurances = InsuranceService::new(&db, &config);
        assert!(insurances.deactivate("2").unwrap());
        let update = InsuranceUpdate {
            name: Some("Swiss Medical Group".to_string()),
            ..Default::default()
        };
        assert!(insurances.update("2", &update).unwrap());
    }

    let db = Database::open(&path).unwrap();
    let insurances = InsuranceService::new(&db, &config);
    let swiss = insurances.get("2").unwrap().unwrap();
    assert_eq!(swiss.name, "Swiss Medical Group");
    assert!(!swiss.is_active);
    assert_eq!(insurances.active().unwrap().len(), 2);
}

#[test]
fn test_older_admin_appointments_load_and_update() {
    let db = Database::open_in_memory().unwrap();
    let config = ClinicConfig::default();
    let older = r#"[
        {"id": "1", "patientName": "Ana García", "patientEmail": "ana.garcia@email.com",
         "patientPhone": "+54 11 1234-5678", "date": "2025-10-03", "time": "09:00",
         "reason": "Cefaleas recurrentes - Evaluación inicial", "healthInsurance": "1",
         "status": "solicitada", "createdAt": "2025-10-02T10:00:00Z"},
        {"id": "2", "patientName": "Carlos López", "patientEmail": "carlos.lopez@email.com",
         "patientPhone": "+54 11 2345-6789", "date": "2025-10-03", "time": "10:30",
         "reason": "Control de epilepsia", "healthInsurance": "2",
         "status": "cancelada", "notes": "Avisó por teléfono",
         "createdAt": "2025-10-02T11:00:00Z"}
    ]"#;
    db.set_item(&config.storage.appointments, older).unwrap();

    let service = AppointmentService::new(&db, &config);
    assert!(!service.confirm("2").unwrap());
    let untouched = db.get_item(&config.storage.appointments).unwrap();
    assert_eq!(untouched.as_deref(), Some(older));

    assert!(service.confirm("1").unwrap());
    let confirmed = service.require("1").unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
    assert_eq!(confirmed.insurance, "1");
    assert_eq!(
        confirmed.reason.as_deref(),
        Some("Cefaleas recurrentes - Evaluación inicial")
    );
    assert_eq!(
        service.get("2").unwrap().unwrap().status,
        AppointmentStatus::Cancelled
    );

    // The rewrite keeps the visit reason and creation time.
    let stored = db.get_item(&config.storage.appointments).unwrap().unwrap();
    assert!(stored.contains("\"status\":\"confirmed\""));
    assert!(stored.contains("\"createdAt\":\"2025-10-02T10:00:00Z\""));
    assert!(stored.contains("\"reason\":\"Control de epilepsia\""));
}

#[test]
fn test_older_admin_insurances_load() {
    let db = Database::open_in_memory().unwrap();
    let config = ClinicConfig::default();
    let older = r#"[
        {"id": "1", "name": "OSDE", "code": "OSDE", "active": true,
         "createdAt": "2025-01-01T00:00:00Z"},
        {"id": "2", "name": "Swiss Medical", "code": "SWISS", "active": false,
         "createdAt": "2025-01-01T00:00:00Z"}
    ]"#;
    db.set_item(&config.storage.insurances, older).unwrap();

    let insurances = InsuranceService::new(&db, &config);
    assert_eq!(insurances.list().unwrap().len(), 2);
    let active = insurances.active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].code, "OSDE");
    assert_eq!(active[0].contact_info, ContactInfo::default());

    assert_eq!(insurances.toggle_status("2").unwrap(), Some(true));
    assert_eq!(insurances.active().unwrap().len(), 2);
    let stored = db.get_item(&config.storage.insurances).unwrap().unwrap();
    assert!(stored.contains("\"isActive\":true"));
}

#[test]
fn test_separate_keys_per_collection() {
    let db = Database::open_in_memory().unwrap();
    let config = ClinicConfig::default();

    AppointmentService::new(&db, &config).delete("5").unwrap();
    InsuranceService::new(&db, &config)
        .toggle_status("4")
        .unwrap();

    let keys = db.keys().unwrap();
    assert_eq!(
        keys,
        vec![
            "dr_osvaldo_appointments".to_string(),
            "dr_osvaldo_health_insurances".to_string()
        ]
    );
}
