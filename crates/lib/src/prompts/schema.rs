//! # Schema Description
//!
//! The hand-written description of the medical records database that is placed at the
//! top of every query-generation prompt. It is deliberately terse: table and column
//! names plus the domain notes the model needs to pick the right literals.

/// The static schema description for the medical records database.
pub const MEDICAL_SCHEMA: &str = r#"Database Schema:
Table patients(id, name, gender, birth_date, age, phone)
Table patient_conditions(id, patient_id, disease_id, diagnosed_date, notes)
Table diseases(id, name, description)
Table medicines(id, patient_id, medicine_name, dose, date)
Table doctors(id, name, specialization)
Table appointments(id, patient_id, doctor_id, appointment_date, notes)

Notes:
- 'birth_date' is a DATE stored as text in 'YYYY-MM-DD' form
- 'age' is INT
- 'gender' values: 'Male', 'Female', 'Other'
- patient_conditions links patients to diseases
- Use joins when needed"#;
