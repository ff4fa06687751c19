//! Structured case content.
//!
//! Every section and field is optional: AI-generated drafts are frequently
//! partial, and the validation engine scores whatever is present.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// The four content sections of a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseContent {
    /// Patient presentation
    pub presentation: Option<Presentation>,

    /// Exam, vitals and lab data
    pub clinical_data: Option<ClinicalData>,

    /// The multiple-choice question
    pub clinical_question: Option<ClinicalQuestion>,

    /// Teaching notes
    pub educational_notes: Option<EducationalNotes>,
}

impl CaseContent {
    /// True when no section is present at all.
    pub fn is_empty(&self) -> bool {
        self.presentation.is_none()
            && self.clinical_data.is_none()
            && self.clinical_question.is_none()
            && self.educational_notes.is_none()
    }
}

/// Patient presentation section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presentation {
    /// Age, sex and occupation
    pub demographics: Option<Demographics>,
    /// Reason for consultation
    pub chief_complaint: Option<String>,
    /// History of the current illness
    pub history_of_present_illness: Option<String>,
    /// Prior diagnoses
    pub past_medical_history: Option<Vec<String>>,
    /// Current medications
    pub medications: Option<Vec<Medication>>,
    /// Known allergies
    pub allergies: Option<Vec<String>>,
    /// Relevant family history
    pub family_history: Option<String>,
    /// Habits and social context
    pub social_history: Option<String>,
}

/// Patient demographics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Demographics {
    /// Age in years
    pub age: Option<u32>,
    /// Sex as written by the author
    pub sex: Option<String>,
    /// Occupation
    pub occupation: Option<String>,
}

/// A current medication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    /// Drug name
    pub name: String,
    /// Dose with unit
    pub dose: String,
    /// Dosing frequency
    pub frequency: String,
}

/// Clinical data section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicalData {
    /// Physical exam findings
    pub physical_examination: Option<String>,

    /// Vital signs keyed by display name (`Heart Rate`, `Temperature`, ...).
    /// Values are kept as raw JSON; only numbers are range-checked.
    pub vital_signs: Option<BTreeMap<String, serde_json::Value>>,

    /// Lab results
    pub laboratory_results: Option<Vec<LabResult>>,
    /// Imaging and other tests
    pub other_tests: Option<Vec<OtherTest>>,
}

/// A laboratory result as written by the author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabResult {
    /// Test name, matched exactly against the lab ranges
    pub test: String,
    /// Result text; only its leading number is range-checked
    pub result: String,
    /// Unit, if given separately
    pub unit: Option<String>,
    /// Range quoted by the author
    pub reference_range: Option<String>,
}

/// Any other diagnostic test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherTest {
    /// Test name
    pub test: String,
    /// Free-text result
    pub result: String,
}

/// Clinical question section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicalQuestion {
    /// Question text
    pub question: Option<String>,
    /// Answer options
    pub options: Option<Vec<AnswerOption>>,
    /// ID of the correct option
    pub correct_answer: Option<String>,
    /// Why the correct answer is correct
    pub explanation: Option<String>,
    /// Sources backing the explanation
    pub references: Option<Vec<Reference>>,
}

/// One answer option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerOption {
    /// Option ID
    pub id: String,
    /// Option text
    pub text: String,
    /// Whether this is the correct answer
    pub is_correct: bool,
}

/// A bibliographic reference backing the explanation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    /// Source kind, serialized as `type`
    #[serde(rename = "type")]
    pub kind: String,
    /// Section or chapter cited
    pub section: String,
    /// Quoted passage
    pub quote: Option<String>,
}

/// Educational notes section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationalNotes {
    /// Key teaching points
    pub key_points: Option<Vec<String>>,
    /// Mistakes learners often make
    pub common_mistakes: Option<Vec<String>>,
    /// Practical tips
    pub clinical_tips: Option<Vec<String>>,
}
