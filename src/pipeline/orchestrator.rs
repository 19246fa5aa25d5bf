use rusqlite::Connection;
use serde::Serialize;

use super::extractor::MedicineExtractor;
use super::generic::LlmGenericResolver;
use super::types::{ExtractedMedicine, LlmClient};
use super::PipelineError;
use crate::alternatives::{AlternativeFinder, AlternativesReport, FinderSettings, MedicineRequest};
use crate::config::AppConfig;
use crate::intelligence::{ClinicalIntelligence, SafetyAnalysis};

/// Everything produced for one prescription.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrescriptionReport {
    pub medicines: Vec<ExtractedMedicine>,
    pub alternatives: AlternativesReport,
    pub safety: Option<SafetyAnalysis>,
    pub patient_age_months: Option<i64>,
}

/// Orchestrates the prescription pipeline:
/// extract → fuzzy correct → alternatives → safety analysis
pub struct PrescriptionPipeline<'a> {
    conn: &'a Connection,
    llm: &'a dyn LlmClient,
    config: &'a AppConfig,
}

impl<'a> PrescriptionPipeline<'a> {
    pub fn new(conn: &'a Connection, llm: &'a dyn LlmClient, config: &'a AppConfig) -> Self {
        Self { conn, llm, config }
    }

    pub fn process(&self, text: &str, age_years: Option<u32>) -> Result<PrescriptionReport, PipelineError> {
        let patient_age_months = age_years.map(|years| i64::from(years) * 12);

        let mut extractor =
            MedicineExtractor::new(self.conn, self.llm, &self.config.model, self.config.fuzzy_accept_score);
        let medicines = extractor.extract(text)?;
        if medicines.is_empty() {
            tracing::warn!("No medicines found in prescription");
            return Ok(PrescriptionReport {
                patient_age_months,
                ..Default::default()
            });
        }

        let requests: Vec<MedicineRequest> = medicines.iter().map(ExtractedMedicine::to_request).collect();

        let resolver = LlmGenericResolver::new(self.llm, &self.config.model);
        let finder = AlternativeFinder::new(self.conn, &resolver, FinderSettings::from(self.config));
        let alternatives = finder.suggest_alternatives(&requests)?;

        let names: Vec<String> = medicines.iter().map(|m| m.name.clone()).collect();
        let safety = ClinicalIntelligence::new(self.conn).analyze_prescription_safety(&names, patient_age_months)?;

        tracing::info!(
            medicines = medicines.len(),
            alternatives = alternatives.summary.total_alternatives_found,
            risk = safety.overall_safety_score.as_str(),
            "Prescription processed"
        );
        Ok(PrescriptionReport {
            medicines,
            alternatives,
            safety: Some(safety),
            patient_age_months,
        })
    }
}
