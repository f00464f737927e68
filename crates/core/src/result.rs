//! The normalized assessment result.

use serde::{Deserialize, Serialize};

/// Letter grade attached to a score.
///
/// Canonical mapping over integer scores:
///
/// | Grade | Scores  |
/// |-------|---------|
/// | A+    | 97–100  |
/// | A     | 93–96   |
/// | A-    | 90–92   |
/// | B+    | 87–89   |
/// | B     | 83–86   |
/// | B-    | 80–82   |
/// | C+    | 77–79   |
/// | C     | 73–76   |
/// | C-    | 70–72   |
/// | D+    | 67–69   |
/// | D     | 60–66   |
/// | F     | 0–59    |
///
/// Scores outside 0–100 have no grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    /// Lower score bound of each grade, highest first.
    const BANDS: [(i64, Grade); 12] = [
        (97, Grade::APlus),
        (93, Grade::A),
        (90, Grade::AMinus),
        (87, Grade::BPlus),
        (83, Grade::B),
        (80, Grade::BMinus),
        (77, Grade::CPlus),
        (73, Grade::C),
        (70, Grade::CMinus),
        (67, Grade::DPlus),
        (60, Grade::D),
        (0, Grade::F),
    ];

    /// Grade for a score, `None` outside 0–100.
    pub fn from_score(score: i64) -> Option<Self> {
        if !(0..=100).contains(&score) {
            return None;
        }
        Self::BANDS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, grade)| *grade)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::BANDS
            .iter()
            .map(|(_, g)| *g)
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| format!("unknown grade '{s}'"))
    }
}

/// One concrete improvement suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub detail: String,
}

/// Projected cost of running the assessed prompt on one catalog model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub provider: String,
    pub model_name: String,
    pub input_price_per_mtok: f64,
    pub output_price_per_mtok: f64,
    pub cost_per_run_usd: f64,
    pub cost_per_100_runs_usd: f64,
    pub cost_per_1000_runs_usd: f64,
}

/// Cost projection across the pricing catalog, in catalog order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostEstimates {
    pub models: Vec<CostRow>,
    pub self_hosted_note: String,
}

/// A validated assessment, built once from a single backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Overall quality, nominally 0–100. Out-of-range values are kept as-is.
    pub score: i64,

    /// `None` when the backend gave no recognizable grade and the score is
    /// outside 0–100.
    pub grade: Option<Grade>,

    pub assessment_summary: String,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default)]
    pub issues: Vec<String>,

    #[serde(default)]
    pub missing_elements: Vec<String>,

    #[serde(default)]
    pub suggestions: Vec<Suggestion>,

    #[serde(default)]
    pub optimized_version: String,

    /// Estimated input tokens of the assessed prompt.
    pub token_count: u64,

    /// Estimated output tokens of a typical response to the prompt.
    pub estimated_output_tokens: u64,

    pub cost_estimates: CostEstimates,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_notes: Option<String>,
}

impl AssessmentResult {
    /// Grade text for display, `?` when unknown.
    pub fn grade_label(&self) -> &'static str {
        self.grade.as_ref().map_or("?", Grade::as_str)
    }
}
