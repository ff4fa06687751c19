//! Score rules - thresholds, reference ranges and the transition table.
//!
//! All engines receive these tables at construction time. `Default` carries
//! the production values; an override file only needs the keys it changes.

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::case::{CaseStatus, Complexity};

/// Errors raised while loading or checking a rule set.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// Rule file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule file is not valid JSON for this schema
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule set parsed but contradicts itself
    #[error("inconsistent rules: {0}")]
    Inconsistent(String),
}

/// Complete rule set for validation, workflow and queueing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    /// Validation scoring rules
    pub validation: ValidationRules,
    /// Workflow preconditions and transitions
    pub workflow: WorkflowRules,
    /// Review queue ordering
    pub queue: QueueRules,
    /// Display bands for scores
    pub bands: ScoreBands,
}

impl ScoreRules {
    /// Load an override file and check it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let raw = std::fs::read_to_string(path)?;
        let rules: Self = serde_json::from_str(&raw)?;
        rules.check()?;
        Ok(rules)
    }

    /// Reject rule sets that cannot be applied consistently.
    pub fn check(&self) -> Result<(), RulesError> {
        let w = &self.validation.weights;
        let total = w.completeness + w.quality + w.accuracy;
        if (total - 1.0).abs() > 1e-6 {
            return Err(RulesError::Inconsistent(format!(
                "score weights must sum to 1.0, got {total}"
            )));
        }

        for (from, targets) in &self.workflow.transitions.0 {
            if targets.contains(from) {
                return Err(RulesError::Inconsistent(format!(
                    "{from} lists itself as a transition target"
                )));
            }
        }

        let accuracy = &self.validation.accuracy;
        for range in accuracy.vital_signs.iter().chain(accuracy.laboratory.iter()) {
            if range.min > range.max {
                return Err(RulesError::Inconsistent(format!(
                    "reference range for {} has min {} above max {}",
                    range.name, range.min, range.max
                )));
            }
        }

        let b = &self.bands;
        if !(b.excellent >= b.good && b.good >= b.acceptable && b.acceptable >= b.needs_work) {
            return Err(RulesError::Inconsistent(
                "score bands must be in descending order".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Rules used by the validation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Weights of the three sub-scores
    pub weights: ScoreWeights,
    /// Required-section thresholds
    pub completeness: CompletenessRules,
    /// Educational quality penalties
    pub quality: QualityRules,
    /// Reference ranges and plausibility penalties
    pub accuracy: AccuracyRules,
}

/// Weights of the sub-scores in the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of the completeness sub-score
    pub completeness: f64,
    /// Weight of the educational quality sub-score
    pub quality: f64,
    /// Weight of the accuracy sub-score
    pub accuracy: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            completeness: 0.4,
            quality: 0.4,
            accuracy: 0.2,
        }
    }
}

/// Thresholds deciding whether a section counts as present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletenessRules {
    /// Options a clinical question needs to count as present
    pub min_question_options: usize,
    /// Key points the notes need to count as present
    pub min_key_points: usize,
}

impl Default for CompletenessRules {
    fn default() -> Self {
        Self {
            min_question_options: 2,
            min_key_points: 1,
        }
    }
}

/// Fixed penalties subtracted from a quality score of 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityRules {
    /// Shortest question text without a penalty
    pub question_min_chars: usize,
    /// Longest question text without a penalty
    pub question_max_chars: usize,
    /// Penalty for a question under `question_min_chars`
    pub short_question_penalty: u8,
    /// Penalty for a question over `question_max_chars`
    pub long_question_penalty: u8,
    /// Shortest explanation without a penalty
    pub explanation_min_chars: usize,
    /// Penalty for a missing or short explanation
    pub short_explanation_penalty: u8,
    /// Key points expected in the educational notes
    pub min_key_points: usize,
    /// Penalty for fewer than `min_key_points`
    pub few_key_points_penalty: u8,
    /// Penalty when no common mistakes are listed
    pub missing_mistakes_penalty: u8,
    /// Answer options expected per question
    pub recommended_options: usize,
    /// Penalty for fewer than `recommended_options`
    pub few_options_penalty: u8,
    /// Penalty when the question cites no references
    pub missing_references_penalty: u8,
}

impl Default for QualityRules {
    fn default() -> Self {
        Self {
            question_min_chars: 20,
            question_max_chars: 500,
            short_question_penalty: 15,
            long_question_penalty: 10,
            explanation_min_chars: 50,
            short_explanation_penalty: 20,
            min_key_points: 2,
            few_key_points_penalty: 15,
            missing_mistakes_penalty: 5,
            recommended_options: 4,
            few_options_penalty: 10,
            missing_references_penalty: 5,
        }
    }
}

/// A named numeric reference range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Vital-sign key or lab test name, matched exactly
    pub name: String,
    /// Lowest plausible value
    pub min: f64,
    /// Highest plausible value
    pub max: f64,
    /// Unit shown in findings
    pub unit: String,
}

impl ReferenceRange {
    fn new(name: &str, min: f64, max: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            unit: unit.to_string(),
        }
    }

    /// Whether `value` lies inside the closed range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Reference ranges and plausibility penalties for the accuracy checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyRules {
    /// Vital-sign reference ranges
    pub vital_signs: Vec<ReferenceRange>,
    /// Lab test reference ranges
    pub laboratory: Vec<ReferenceRange>,
    /// Penalty per out-of-range vital sign
    pub vital_sign_penalty: u8,
    /// Penalty per out-of-range lab value
    pub laboratory_penalty: u8,
    /// Chief-complaint terms that imply a fever
    pub fever_terms: Vec<String>,
    /// Vital-sign key holding the temperature
    pub temperature_key: String,
    /// Temperatures below this contradict a fever complaint
    pub fever_min_temperature: f64,
    /// Penalty for a fever complaint without a fever
    pub fever_mismatch_penalty: u8,
}

impl AccuracyRules {
    /// Vital-sign range for a vital-sign key, matched exactly.
    pub fn vital_sign(&self, name: &str) -> Option<&ReferenceRange> {
        find_range(&self.vital_signs, name)
    }

    /// Lab range for a test name, matched exactly.
    pub fn laboratory(&self, name: &str) -> Option<&ReferenceRange> {
        find_range(&self.laboratory, name)
    }
}

fn find_range<'a>(ranges: &'a [ReferenceRange], name: &str) -> Option<&'a ReferenceRange> {
    ranges.iter().find(|r| r.name == name)
}

impl Default for AccuracyRules {
    fn default() -> Self {
        Self {
            vital_signs: vec![
                ReferenceRange::new("Heart Rate", 40.0, 120.0, "bpm"),
                ReferenceRange::new("Blood Pressure Systolic", 80.0, 180.0, "mmHg"),
                ReferenceRange::new("Blood Pressure Diastolic", 50.0, 120.0, "mmHg"),
                ReferenceRange::new("Temperature", 35.0, 42.0, "°C"),
                ReferenceRange::new("Respiratory Rate", 8.0, 30.0, "rpm"),
                ReferenceRange::new("SpO2", 85.0, 100.0, "%"),
                ReferenceRange::new("Blood Glucose", 40.0, 500.0, "mg/dL"),
            ],
            laboratory: vec![
                ReferenceRange::new("WBC", 3.5, 11.0, "x10^9/L"),
                ReferenceRange::new("Hemoglobin", 12.0, 18.0, "g/dL"),
                ReferenceRange::new("Platelets", 150.0, 400.0, "x10^9/L"),
                ReferenceRange::new("Sodium", 130.0, 145.0, "mEq/L"),
                ReferenceRange::new("Potassium", 3.5, 5.0, "mEq/L"),
                ReferenceRange::new("Creatinine", 0.7, 1.3, "mg/dL"),
                ReferenceRange::new("BUN", 7.0, 20.0, "mg/dL"),
                ReferenceRange::new("Glucose", 70.0, 100.0, "mg/dL"),
            ],
            vital_sign_penalty: 5,
            laboratory_penalty: 3,
            fever_terms: vec![
                "fiebre".to_string(),
                "fever".to_string(),
                "température".to_string(),
            ],
            temperature_key: "Temperature".to_string(),
            fever_min_temperature: 38.5,
            fever_mismatch_penalty: 2,
        }
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Allowed status transitions, keyed by source status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable(
    /// Targets per source status
    pub BTreeMap<CaseStatus, Vec<CaseStatus>>,
);

impl TransitionTable {
    /// Whether `from -> to` is allowed. Self-transitions never are.
    pub fn can_transition(&self, from: CaseStatus, to: CaseStatus) -> bool {
        from != to && self.valid_transitions(from).contains(&to)
    }

    /// Allowed targets from `status`; empty when the status has no entry.
    pub fn valid_transitions(&self, status: CaseStatus) -> &[CaseStatus] {
        self.0.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// String-level check for callers holding raw status names.
    /// Unknown names on either side yield `false`.
    pub fn can_transition_names(&self, from: &str, to: &str) -> bool {
        match (from.parse(), to.parse()) {
            (Ok(from), Ok(to)) => self.can_transition(from, to),
            _ => false,
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        let table = CaseStatus::ALL
            .into_iter()
            .map(|status| {
                let targets = match status {
                    CaseStatus::Draft => vec![CaseStatus::InReview, CaseStatus::Archived],
                    CaseStatus::InReview => vec![
                        CaseStatus::Approved,
                        CaseStatus::Draft,
                        CaseStatus::Archived,
                    ],
                    CaseStatus::Approved => vec![
                        CaseStatus::Published,
                        CaseStatus::Draft,
                        CaseStatus::Archived,
                    ],
                    CaseStatus::Published => vec![CaseStatus::Archived],
                    CaseStatus::Archived => vec![CaseStatus::Draft],
                    CaseStatus::Rejected => vec![],
                };
                (status, targets)
            })
            .collect();
        Self(table)
    }
}

/// Minimum validation score to enter review, per complexity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityMinimums {
    /// Minimum for BASIC cases
    pub basic: u8,
    /// Minimum for INTERMEDIATE cases
    pub intermediate: u8,
    /// Minimum for ADVANCED cases
    pub advanced: u8,
    /// Used when the case has no recognized complexity
    pub fallback: u8,
}

impl ComplexityMinimums {
    /// Minimum for a tier.
    pub fn for_complexity(&self, complexity: Option<Complexity>) -> u8 {
        match complexity {
            Some(Complexity::Basic) => self.basic,
            Some(Complexity::Intermediate) => self.intermediate,
            Some(Complexity::Advanced) => self.advanced,
            None => self.fallback,
        }
    }
}

impl Default for ComplexityMinimums {
    fn default() -> Self {
        Self {
            basic: 60,
            intermediate: 70,
            advanced: 80,
            fallback: 60,
        }
    }
}

/// Workflow preconditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRules {
    /// Allowed status transitions
    pub transitions: TransitionTable,
    /// Submission minimums per complexity
    pub complexity_minimums: ComplexityMinimums,
    /// Score required to publish, whatever the complexity
    pub publication_threshold: u8,
    /// Cap on non-blank rejection suggestions
    pub max_suggestions: usize,
    /// Hours after which a pending review counts as overdue
    pub review_time_limit_hours: f64,
}

impl WorkflowRules {
    /// Whether `score` reaches the submission minimum for `complexity`.
    pub fn meets_complexity_threshold(&self, score: u8, complexity: Option<Complexity>) -> bool {
        score >= self.complexity_minimums.for_complexity(complexity)
    }

    /// Whether a case in `status` with `score` may be published.
    pub fn is_ready_for_publication(&self, status: CaseStatus, score: Option<u8>) -> bool {
        status == CaseStatus::Approved
            && score.map_or(false, |score| score >= self.publication_threshold)
    }
}

impl Default for WorkflowRules {
    fn default() -> Self {
        Self {
            transitions: TransitionTable::default(),
            complexity_minimums: ComplexityMinimums::default(),
            publication_threshold: 85,
            max_suggestions: 5,
            review_time_limit_hours: 72.0,
        }
    }
}

// ============================================================================
// Queue
// ============================================================================

/// Review queue ordering weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueRules {
    /// Base priority of BASIC cases
    pub basic_weight: f64,
    /// Base priority of INTERMEDIATE cases
    pub intermediate_weight: f64,
    /// Base priority of ADVANCED cases
    pub advanced_weight: f64,
    /// Weight for cases without a recognized complexity
    pub default_weight: f64,
    /// Priority added per full day in the queue
    pub time_in_queue_boost: f64,
}

impl QueueRules {
    /// Weight of a complexity tier.
    pub fn weight(&self, complexity: Option<Complexity>) -> f64 {
        match complexity {
            Some(Complexity::Basic) => self.basic_weight,
            Some(Complexity::Intermediate) => self.intermediate_weight,
            Some(Complexity::Advanced) => self.advanced_weight,
            None => self.default_weight,
        }
    }
}

impl Default for QueueRules {
    fn default() -> Self {
        Self {
            basic_weight: 1.0,
            intermediate_weight: 2.0,
            advanced_weight: 3.0,
            default_weight: 1.0,
            time_in_queue_boost: 0.5,
        }
    }
}

// ============================================================================
// Display bands
// ============================================================================

/// Lower bounds of the score display bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBands {
    /// Lowest excellent score
    pub excellent: u8,
    /// Lowest good score
    pub good: u8,
    /// Lowest acceptable score
    pub acceptable: u8,
    /// Lowest needs-work score; anything below is insufficient
    pub needs_work: u8,
}

impl ScoreBands {
    /// Band for a persisted score; `None` when the case was never scored.
    pub fn classify(&self, score: Option<u8>) -> Option<ScoreBand> {
        let score = score?;
        let band = if score >= self.excellent {
            ScoreBand::Excellent
        } else if score >= self.good {
            ScoreBand::Good
        } else if score >= self.acceptable {
            ScoreBand::Acceptable
        } else if score >= self.needs_work {
            ScoreBand::NeedsWork
        } else {
            ScoreBand::Insufficient
        };
        Some(band)
    }
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            excellent: 90,
            good: 75,
            acceptable: 60,
            needs_work: 45,
        }
    }
}

/// Display band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreBand {
    /// At or above `excellent`
    Excellent,
    /// At or above `good`
    Good,
    /// At or above `acceptable`
    Acceptable,
    /// At or above `needs_work`
    NeedsWork,
    /// Below every band
    Insufficient,
}

impl ScoreBand {
    /// Reviewer-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excelente",
            Self::Good => "Bueno",
            Self::Acceptable => "Aceptable",
            Self::NeedsWork => "Necesita mejoras",
            Self::Insufficient => "Insuficiente",
        }
    }

    /// Short badge icon.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Excellent => "✓✓",
            Self::Good => "✓",
            Self::Acceptable => "→",
            Self::NeedsWork => "!",
            Self::Insufficient => "✗",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_self_transitions() {
        let table = TransitionTable::default();
        for status in CaseStatus::ALL {
            assert!(!table.can_transition(status, status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_transition_table_matches_lifecycle() {
        let table = TransitionTable::default();
        let allowed = [
            (CaseStatus::Draft, CaseStatus::InReview),
            (CaseStatus::Draft, CaseStatus::Archived),
            (CaseStatus::InReview, CaseStatus::Approved),
            (CaseStatus::InReview, CaseStatus::Draft),
            (CaseStatus::InReview, CaseStatus::Archived),
            (CaseStatus::Approved, CaseStatus::Published),
            (CaseStatus::Approved, CaseStatus::Draft),
            (CaseStatus::Approved, CaseStatus::Archived),
            (CaseStatus::Published, CaseStatus::Archived),
            (CaseStatus::Archived, CaseStatus::Draft),
        ];

        for from in CaseStatus::ALL {
            for to in CaseStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(table.can_transition(from, to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_valid_transitions_for_terminal_states() {
        let table = TransitionTable::default();
        assert_eq!(table.valid_transitions(CaseStatus::Published), &[CaseStatus::Archived]);
        assert_eq!(table.valid_transitions(CaseStatus::Archived), &[CaseStatus::Draft]);
        assert!(table.valid_transitions(CaseStatus::Rejected).is_empty());
    }

    #[test]
    fn test_unknown_status_names_never_transition() {
        let table = TransitionTable::default();
        assert!(table.can_transition_names("DRAFT", "IN_REVIEW"));
        assert!(!table.can_transition_names("PENDING", "DRAFT"));
        assert!(!table.can_transition_names("DRAFT", "DONE"));
    }

    #[test]
    fn test_complexity_minimums() {
        let rules = WorkflowRules::default();
        assert!(rules.meets_complexity_threshold(60, Some(Complexity::Basic)));
        assert!(!rules.meets_complexity_threshold(69, Some(Complexity::Intermediate)));
        assert!(rules.meets_complexity_threshold(80, Some(Complexity::Advanced)));
        assert!(rules.meets_complexity_threshold(60, None));
    }

    #[test]
    fn test_ready_for_publication() {
        let rules = WorkflowRules::default();
        assert!(rules.is_ready_for_publication(CaseStatus::Approved, Some(85)));
        assert!(!rules.is_ready_for_publication(CaseStatus::Approved, Some(84)));
        assert!(!rules.is_ready_for_publication(CaseStatus::Approved, None));
        assert!(!rules.is_ready_for_publication(CaseStatus::InReview, Some(99)));
    }

    #[test]
    fn test_score_bands() {
        let bands = ScoreBands::default();
        assert_eq!(bands.classify(None), None);
        assert_eq!(bands.classify(Some(90)), Some(ScoreBand::Excellent));
        assert_eq!(bands.classify(Some(89)), Some(ScoreBand::Good));
        assert_eq!(bands.classify(Some(60)), Some(ScoreBand::Acceptable));
        assert_eq!(bands.classify(Some(45)), Some(ScoreBand::NeedsWork));
        assert_eq!(bands.classify(Some(0)), Some(ScoreBand::Insufficient));
    }

    #[test]
    fn test_default_rules_are_consistent() {
        assert!(ScoreRules::default().check().is_ok());
    }

    #[test]
    fn test_check_rejects_self_transition() {
        let mut rules = ScoreRules::default();
        rules
            .workflow
            .transitions
            .0
            .insert(CaseStatus::Draft, vec![CaseStatus::Draft]);
        assert!(matches!(rules.check(), Err(RulesError::Inconsistent(_))));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let rules: ScoreRules = serde_json::from_str(
            r#"{ "workflow": { "publication_threshold": 90 } }"#,
        )
        .unwrap();
        assert_eq!(rules.workflow.publication_threshold, 90);
        assert_eq!(rules.workflow.complexity_minimums.basic, 60);
        assert_eq!(rules.validation.quality.question_min_chars, 20);
        assert!(rules.workflow.transitions.can_transition(CaseStatus::Draft, CaseStatus::InReview));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{ "workflow": { "publication_threshold": 90 } }"#).unwrap();

        let rules = ScoreRules::from_json_file(&path).unwrap();
        assert_eq!(rules.workflow.publication_threshold, 90);
        assert_eq!(rules.queue, QueueRules::default());
    }

    #[test]
    fn test_from_json_file_rejects_bad_files() {
        let dir = tempfile::tempdir().unwrap();

        let inconsistent = dir.path().join("weights.json");
        std::fs::write(&inconsistent, r#"{ "validation": { "weights": { "completeness": 0.5 } } }"#)
            .unwrap();
        assert!(matches!(
            ScoreRules::from_json_file(&inconsistent),
            Err(RulesError::Inconsistent(_))
        ));

        let malformed = dir.path().join("malformed.json");
        std::fs::write(&malformed, "{ not json").unwrap();
        assert!(matches!(ScoreRules::from_json_file(&malformed), Err(RulesError::Json(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(ScoreRules::from_json_file(&missing), Err(RulesError::Io(_))));
    }

    #[test]
    fn test_transition_table_serializes_with_wire_names() {
        let json = serde_json::to_value(TransitionTable::default()).unwrap();
        assert_eq!(json["PUBLISHED"], serde_json::json!(["ARCHIVED"]));
    }
}
