//! Demo data served until a collection is first written.

use crate::models::{Appointment, AppointmentStatus, ContactInfo, Insurance};

const SEED_CREATED_AT: &str = "2025-01-01T00:00:00Z";

fn appointment(
    id: &str,
    patient: [&str; 3],
    (date, time): (&str, &str),
    insurance: &str,
    status: AppointmentStatus,
    notes: &str,
) -> Appointment {
    let [name, email, phone] = patient;
    Appointment {
        id: id.to_string(),
        patient_name: name.to_string(),
        patient_email: email.to_string(),
        patient_phone: phone.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        insurance: insurance.to_string(),
        status,
        notes: Some(notes.to_string()),
        reason: None,
        created_at: Some(SEED_CREATED_AT.to_string()),
    }
}

/// Sample neurology appointments.
pub fn seed_appointments() -> Vec<Appointment> {
    use AppointmentStatus::*;
    vec![
        appointment(
            "1",
            [
                "María González",
                "maria.gonzalez@email.com",
                "+54 11 1234-5678",
            ],
            ("2025-10-01", "09:30"),
            "OSDE",
            Confirmed,
            "Migrañas con aura - Evaluación inicial",
        ),
        appointment(
            "2",
            [
                "Carlos Rodríguez",
                "carlos.rodriguez@email.com",
                "+54 11 9876-5432",
            ],
            ("2025-10-01", "10:00"),
            "Swiss Medical",
            Pending,
            "Temblor esencial - Primera consulta",
        ),
        appointment(
            "3",
            [
                "Ana Martínez",
                "ana.martinez@email.com",
                "+54 11 5555-1234",
            ],
            ("2025-10-01", "14:30"),
            "Galeno",
            Confirmed,
            "Parkinson - Control de medicación",
        ),
        appointment(
            "4",
            [
                "Roberto Silva",
                "roberto.silva@email.com",
                "+54 11 7777-8888",
            ],
            ("2025-10-02", "09:00"),
            "Particular",
            Cancelled,
            "Vértigo - Evaluación pendiente",
        ),
        appointment(
            "5",
            [
                "Laura Fernández",
                "laura.fernandez@email.com",
                "+54 11 3333-4444",
            ],
            ("2025-09-29", "15:30"),
            "OSDE",
            Completed,
            "Post-ACV - Rehabilitación neurológica",
        ),
    ]
}

fn insurance(id: &str, name: &str, code: &str, is_active: bool, contact: [&str; 3]) -> Insurance {
    let [phone, email, address] = contact;
    Insurance {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        is_active,
        contact_info: ContactInfo {
            phone: phone.to_string(),
            email: email.to_string(),
            address: address.to_string(),
        },
        created_at: SEED_CREATED_AT.to_string(),
    }
}

/// Providers the practice works with out of the box.
pub fn seed_insurances() -> Vec<Insurance> {
    vec![
        insurance(
            "1",
            "OSDE",
            "OSDE001",
            true,
            [
                "+54 11 4321-8765",
                "prestadores@osde.com.ar",
                "Av. Corrientes 1234, CABA",
            ],
        ),
        insurance(
            "2",
            "Swiss Medical",
            "SM002",
            true,
            [
                "+54 11 5678-1234",
                "red@swissmedical.com.ar",
                "Av. Santa Fe 5678, CABA",
            ],
        ),
        insurance(
            "3",
            "Galeno",
            "GAL003",
            true,
            [
                "+54 11 9876-5432",
                "prestadores@galeno.com.ar",
                "Av. Rivadavia 9876, CABA",
            ],
        ),
        insurance(
            "4",
            "Medicus",
            "MED004",
            false,
            [
                "+54 11 1111-2222",
                "red@medicus.com.ar",
                "Av. Callao 1111, CABA",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_insurance;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_unique() {
        let ids: HashSet<String> = seed_appointments().into_iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), 5);
        let codes: HashSet<String> = seed_insurances().into_iter().map(|i| i.code).collect();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_seed_insurances_pass_validation() {
        for seeded in seed_insurances() {
            let form = crate::models::InsuranceUpdate::default().apply_to(&seeded);
            let validated = validate_insurance(&form).unwrap();
            assert_eq!(validated.code, seeded.code);
        }
    }
}
