//! Case model - the educational clinical scenario moving through review.

use serde::{Deserialize, Deserializer, Serialize};
use crate::content::CaseContent;
use crate::id::CaseId;
use crate::Time;

/// A clinical case record as held by the case store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalCase {
    /// Unique identifier
    pub id: CaseId,

    /// Case title
    #[serde(default)]
    pub title: String,

    /// Clinical indication the case teaches
    #[serde(default)]
    pub indication: String,

    /// Authoring difficulty tier. Unrecognized tiers load as `None`.
    #[serde(default, deserialize_with = "lenient_complexity")]
    pub complexity: Option<Complexity>,

    /// Lifecycle stage
    pub status: CaseStatus,

    /// Structured case content
    #[serde(default)]
    pub content: Option<CaseContent>,

    /// Whether the last validation run judged the case valid
    #[serde(default)]
    pub validated: bool,

    /// Last persisted validation score (0-100)
    #[serde(default)]
    pub validation_score: Option<u8>,

    /// When the case entered review
    #[serde(default)]
    pub submitted_for_review_at: Option<Time>,

    /// Who sent the case to review
    #[serde(default)]
    pub submitted_for_review_by: Option<String>,

    /// When the case was approved
    #[serde(default)]
    pub reviewed_at: Option<Time>,

    /// Who approved the case
    #[serde(default)]
    pub reviewed_by: Option<String>,

    /// When the case was published
    #[serde(default)]
    pub published_at: Option<Time>,

    /// Who published the case
    #[serde(default)]
    pub published_by: Option<String>,

    /// When the case was archived
    #[serde(default)]
    pub archived_at: Option<Time>,

    /// Who archived the case
    #[serde(default)]
    pub archived_by: Option<String>,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl ClinicalCase {
    /// Create a new draft case without content.
    pub fn new(
        title: impl Into<String>,
        indication: impl Into<String>,
        complexity: Option<Complexity>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: CaseId::new(),
            title: title.into(),
            indication: indication.into(),
            complexity,
            status: CaseStatus::Draft,
            content: None,
            validated: false,
            validation_score: None,
            submitted_for_review_at: None,
            submitted_for_review_by: None,
            reviewed_at: None,
            reviewed_by: None,
            published_at: None,
            published_by: None,
            archived_at: None,
            archived_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach structured content.
    pub fn with_content(mut self, content: CaseContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Persisted score, treating an absent score as zero.
    pub fn score_or_zero(&self) -> u8 {
        self.validation_score.unwrap_or(0)
    }
}

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    /// Being edited by its author
    Draft,
    /// Waiting for a reviewer
    InReview,
    /// Approved, ready to publish
    Approved,
    /// Visible to students
    Published,
    /// Withdrawn from circulation
    Archived,
    /// Transient label; the store parks rejected cases in `Draft`
    Rejected,
}

impl CaseStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [CaseStatus; 6] = [
        CaseStatus::Draft,
        CaseStatus::InReview,
        CaseStatus::Approved,
        CaseStatus::Published,
        CaseStatus::Archived,
        CaseStatus::Rejected,
    ];

    /// Wire name (`DRAFT`, `IN_REVIEW`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::InReview => "IN_REVIEW",
            Self::Approved => "APPROVED",
            Self::Published => "PUBLISHED",
            Self::Archived => "ARCHIVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Display label shown to reviewers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Borrador",
            Self::InReview => "En Revisión",
            Self::Approved => "Aprobado",
            Self::Published => "Publicado",
            Self::Archived => "Archivado",
            Self::Rejected => "Rechazado",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Authoring difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Complexity {
    /// Classic presentation, direct diagnosis
    Basic,
    /// Partially atypical presentation
    Intermediate,
    /// Atypical presentation with several distractors
    Advanced,
}

impl Complexity {
    /// Every tier, lowest first.
    pub const ALL: [Complexity; 3] = [
        Complexity::Basic,
        Complexity::Intermediate,
        Complexity::Advanced,
    ];

    /// Wire name (`BASIC`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
        }
    }

    /// Parse a tier name, yielding `None` for anything unrecognized.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// A status or complexity name that matched no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label: {0}")]
pub struct UnknownLabel(pub String);

fn lenient_complexity<'de, D>(deserializer: D) -> Result<Option<Complexity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Complexity::parse_lenient))
}

/// Filter for querying cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseFilter {
    /// Filter by status
    pub status: Option<Vec<CaseStatus>>,

    /// Filter by complexity
    pub complexity: Option<Vec<Complexity>>,
}

impl CaseFilter {
    /// Only cases in the given status.
    pub fn with_status(status: CaseStatus) -> Self {
        Self {
            status: Some(vec![status]),
            ..Default::default()
        }
    }

    /// Whether a case passes this filter.
    pub fn matches(&self, case: &ClinicalCase) -> bool {
        let status_ok = self
            .status
            .as_ref()
            .map_or(true, |statuses| statuses.contains(&case.status));
        let complexity_ok = self.complexity.as_ref().map_or(true, |tiers| {
            case.complexity.map_or(false, |tier| tiers.contains(&tier))
        });
        status_ok && complexity_ok
    }
}
