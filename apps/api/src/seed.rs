use chrono::{NaiveDate, TimeZone, Utc};
use tracing::info;

use shared_database::{EntityStore, SharedStore};
use shared_models::{AppointmentDraft, PatientDraft};

/// Demo patients: (full name, date of birth, gender, phone).
const DEMO_PATIENTS: &[(&str, (i32, u32, u32), &str, &str)] = &[
    ("Tran An", (1985, 3, 14), "Male", "0901 234 567"),
    ("Le Binh", (1992, 11, 2), "Female", "0912 345 678"),
    ("Nguyen Chi", (1978, 6, 30), "Female", "0987 654 321"),
];

pub async fn seed_demo_data(store: &SharedStore) -> anyhow::Result<()> {
    let mut patients = Vec::with_capacity(DEMO_PATIENTS.len());

    for &(name, (year, month, day), gender, phone) in DEMO_PATIENTS {
        let date_of_birth = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| anyhow::anyhow!("invalid demo birth date for {}", name))?;

        let patient = store
            .insert_patient(PatientDraft {
                full_name: name.to_string(),
                date_of_birth,
                gender: gender.to_string(),
                phone_number: Some(phone.to_string()),
                address: None,
            })
            .await?;
        patients.push(patient);
    }

    for (hour, patient) in (9..).zip(&patients) {
        let scheduled_at = Utc
            .with_ymd_and_hms(2024, 1, 10, hour, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid demo appointment time"))?;

        store
            .insert_appointment(AppointmentDraft {
                scheduled_at,
                patient_id: patient.id,
                reason: "General checkup".to_string(),
            })
            .await?;
    }

    info!("Seeded {} demo patients with one appointment each", patients.len());
    Ok(())
}
