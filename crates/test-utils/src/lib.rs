use anyhow::Result;
use async_trait::async_trait;
use medquery::errors::PromptError;
use medquery::providers::ai::AiProvider;
use medquery::providers::db::{pool::PoolOptions, sqlite::SqliteProvider};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use turso::Database;

// --- Seed Data ---

/// A small, fixed medical records dataset.
///
/// Female patients with Diabetes: Alice Smith and Carol White (2).
/// Every gender, disease, medicine and doctor is stored with canonical casing.
pub const SEED_DATA_SQL: &str = "
    INSERT INTO patients (id, name, gender, birth_date, age, phone) VALUES
        (1, 'Alice Smith', 'Female', '1980-04-12', 45, '555-0101'),
        (2, 'Bob Jones', 'Male', '1975-09-30', 50, '555-0102'),
        (3, 'Carol White', 'Female', '1992-01-05', 33, '555-0103'),
        (4, 'David Brown', 'Male', '1960-07-21', 65, '555-0104'),
        (5, 'Eve Davis', 'Female', '1988-11-02', 36, '555-0105'),
        (6, 'Frank Miller', 'Other', '2000-03-15', 25, '555-0106');
    INSERT INTO diseases (id, name, description) VALUES
        (1, 'Diabetes', 'Chronic high blood sugar'),
        (2, 'Hypertension', 'High blood pressure'),
        (3, 'Asthma', 'Inflamed airways');
    INSERT INTO patient_conditions (id, patient_id, disease_id, diagnosed_date, notes) VALUES
        (1, 1, 1, '2015-06-01', 'Type 2'),
        (2, 2, 1, '2018-02-14', 'Type 2'),
        (3, 3, 1, '2020-09-09', 'Type 1'),
        (4, 3, 2, '2021-03-03', NULL),
        (5, 4, 2, '2010-12-12', NULL),
        (6, 5, 3, '2005-05-05', 'Seasonal'),
        (7, 6, 1, '2022-08-08', NULL);
    INSERT INTO medicines (id, patient_id, medicine_name, dose, date) VALUES
        (1, 1, 'Metformin', '500mg', '2015-06-02'),
        (2, 2, 'Metformin', '850mg', '2018-02-15'),
        (3, 3, 'Insulin', '10 units', '2020-09-10'),
        (4, 4, 'Lisinopril', '10mg', '2011-01-01'),
        (5, 5, 'Albuterol', '90mcg', '2005-05-06');
    INSERT INTO doctors (id, name, specialization) VALUES
        (1, 'Dr. Emily Stone', 'Endocrinology'),
        (2, 'Dr. Raj Patel', 'Cardiology'),
        (3, 'Dr. Ana Lopez', 'Pulmonology');
    INSERT INTO appointments (id, patient_id, doctor_id, appointment_date, notes) VALUES
        (1, 1, 1, '2024-01-10', 'Quarterly review'),
        (2, 3, 1, '2024-02-11', NULL),
        (3, 4, 2, '2024-03-12', 'Blood pressure check'),
        (4, 5, 3, '2024-04-13', NULL);
";

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub provider: SqliteProvider,
    pub db: Database,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database with the schema and seed data.
    pub async fn new() -> Result<Self> {
        Self::with_pool_options(PoolOptions::default()).await
    }

    /// Like [`TestSetup::new`], with an explicitly sized connection pool.
    pub async fn with_pool_options(options: PoolOptions) -> Result<Self> {
        let setup = Self::empty(options).await?;
        setup.provider.initialize_with_data(SEED_DATA_SQL).await?;
        Ok(setup)
    }

    /// Creates the schema without inserting any rows.
    pub async fn empty(options: PoolOptions) -> Result<Self> {
        let provider = SqliteProvider::with_pool_options(":memory:", options).await?;
        provider.initialize_schema().await?;
        let db = provider.db.clone();
        Ok(Self { provider, db })
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the user prompt, e.g. the question.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if user_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for user prompt. Got: '{user_prompt}'"
        )))
    }
}

// --- Slow AI Provider ---

/// Answers every prompt with a fixed response after a delay.
#[derive(Clone, Debug)]
pub struct SlowAiProvider {
    delay: Duration,
    response: String,
}

impl SlowAiProvider {
    pub fn new(delay: Duration, response: &str) -> Self {
        Self {
            delay,
            response: response.to_string(),
        }
    }
}

#[async_trait]
impl AiProvider for SlowAiProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, PromptError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}
