use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

// FIELD NAMES

pub const GENDER: &str = "gender";
pub const BIRTHDATE: &str = "birthdate";
pub const CIVIL_STATUS: &str = "civilStatus";
pub const EMPLOYMENT_STATUS: &str = "employmentStatus";
pub const AVG_MONTHLY_INCOME: &str = "avgMonthlyIncome";
pub const HOUSEHOLD_NUM: &str = "householdNum";
pub const OCCUPATION: &str = "occupation";
pub const EDUCATIONAL_ATTAINMENT: &str = "educationalAttainment";
pub const RELATION_TO_HEAD: &str = "relationToHead";
pub const SECTOR_CODE: &str = "sectorCode";
pub const ETHNICITY: &str = "ethnicity";
pub const AGE: &str = "age";

/// Rows missing any of these are dropped by the cleaner.
pub const ESSENTIAL_FIELDS: [&str; 5] = [
    GENDER,
    BIRTHDATE,
    CIVIL_STATUS,
    EMPLOYMENT_STATUS,
    AVG_MONTHLY_INCOME,
];

/// Missing values in these are replaced by [`UNKNOWN`].
pub const OPTIONAL_CATEGORICAL_FIELDS: [&str; 5] = [
    OCCUPATION,
    EDUCATIONAL_ATTAINMENT,
    RELATION_TO_HEAD,
    SECTOR_CODE,
    ETHNICITY,
];

/// Sentinel category for absent optional categorical data.
pub const UNKNOWN: &str = "Unknown";

pub const MALE: &str = "Male";
pub const FEMALE: &str = "Female";

pub const COUNT_COLUMN: &str = "count";
pub const POPULATION_COLUMN: &str = "Population";

/// Text cells treated as missing before any cleaning step runs.
pub const DEFAULT_NULL_TOKENS: [&str; 8] = ["", "null", "NULL", "N/A", "NA", "nan", "NaN", "None"];

pub const DEFAULT_BIN_WIDTH: u32 = 10;

// STATISTICS

/// Ordinary least squares fit of `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Number of paired observations the fit used.
    pub observations: usize,
}

impl RegressionFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Human-readable line, e.g. `y = 2.00x + 3.00`.
    pub fn equation(&self) -> String {
        format!("y = {:.2}x + {:.2}", self.slope, self.intercept)
    }
}

/// Qualitative reading of a Pearson coefficient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationStrength {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    NoCorrelation,
    WeakNegative,
    ModerateNegative,
    StrongNegative,
    NotComputable,
}

impl CorrelationStrength {
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongPositive => "Strong Positive Correlation",
            Self::ModeratePositive => "Moderate Positive Correlation",
            Self::WeakPositive => "Weak Positive Correlation",
            Self::NoCorrelation => "No Correlation",
            Self::WeakNegative => "Weak Negative Correlation",
            Self::ModerateNegative => "Moderate Negative Correlation",
            Self::StrongNegative => "Strong Negative Correlation",
            Self::NotComputable => "Not Computable",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: Option<f64>,
    pub strength: CorrelationStrength,
}

/// Pairwise Pearson coefficients; `None` cells were not computable.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == left)?;
        let j = self.columns.iter().position(|c| c == right)?;
        self.data.get(i).and_then(|row| row.get(j)).copied().flatten()
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

// EVALUATION

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GroupExtreme {
    /// Key values in key-column order.
    pub keys: Vec<String>,
    pub count: i64,
}

/// Headline numbers shown next to a grouped-count chart.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GroupSummary {
    pub total: i64,
    pub groups: usize,
    pub largest: Option<GroupExtreme>,
    pub smallest: Option<GroupExtreme>,
    pub mean_size: Option<f64>,
    pub std_size: Option<f64>,
}

#[derive(Clone, Serialize, Debug)]
pub struct PopulationPyramid {
    /// `age_group`, `Male`, `Female`; one row per age bucket in ascending order.
    #[serde(skip)]
    pub table: DataFrame,
    pub age_groups: Vec<String>,
    pub total_male: f64,
    pub total_female: f64,
    /// Males per female; 0 when there are no females.
    pub male_to_female_ratio: f64,
    pub largest_male_group: Option<String>,
    pub largest_female_group: Option<String>,
}

impl PopulationPyramid {
    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }
}
