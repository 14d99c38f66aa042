//! Country domain model.
//!
//! # Responsibility
//! - Define the canonical country record persisted by the store.
//! - Enforce field-level validation before SQL mutations.
//!
//! # Invariants
//! - `code` is the stable identity and is never reused for another country.
//! - `continent` is a closed set; free-text geography lives in `region`.
//! - `life_expectancy` is measured in years and bounded to a plausible range.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound accepted for a persisted life expectancy, in years.
pub const LIFE_EXPECTANCY_MAX_YEARS: f64 = 120.0;

/// Closed set of continents a country can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Asia,
    Africa,
    Oceania,
    Antarctica,
}

impl Continent {
    /// Canonical display string, also used as the persisted column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NorthAmerica => "North America",
            Self::SouthAmerica => "South America",
            Self::Europe => "Europe",
            Self::Asia => "Asia",
            Self::Africa => "Africa",
            Self::Oceania => "Oceania",
            Self::Antarctica => "Antarctica",
        }
    }

    /// Parses the canonical display string back into the enum.
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "North America" => Some(Self::NorthAmerica),
            "South America" => Some(Self::SouthAmerica),
            "Europe" => Some(Self::Europe),
            "Asia" => Some(Self::Asia),
            "Africa" => Some(Self::Africa),
            "Oceania" => Some(Self::Oceania),
            "Antarctica" => Some(Self::Antarctica),
            _ => None,
        }
    }
}

impl Display for Continent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failure for a country record.
#[derive(Debug, Clone, PartialEq)]
pub enum CountryValidationError {
    /// `code` is not exactly three ASCII letters.
    InvalidCode(String),
    /// `name` is empty or whitespace-only.
    EmptyName,
    /// `population` is below zero.
    NegativePopulation(i64),
    /// `life_expectancy` is outside `(0, 120]` years.
    LifeExpectancyOutOfRange(f64),
}

impl Display for CountryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCode(code) => {
                write!(f, "country code must be three ASCII letters, got `{code}`")
            }
            Self::EmptyName => write!(f, "country name must not be blank"),
            Self::NegativePopulation(value) => {
                write!(f, "population must not be negative, got {value}")
            }
            Self::LifeExpectancyOutOfRange(value) => write!(
                f,
                "life expectancy must be within (0, {LIFE_EXPECTANCY_MAX_YEARS}] years, got {value}"
            ),
        }
    }
}

impl Error for CountryValidationError {}

/// Canonical persisted country row.
///
/// Mirrors the `countries` table one-to-one. Optional fields are genuinely
/// unknown for some territories (dependent areas have no independence year,
/// uninhabited ones no life expectancy or head of state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// ISO-3166 alpha-3 code, uppercase. Stable identity.
    pub code: String,
    pub name: String,
    pub continent: Continent,
    /// Free-text sub-continental grouping ("Southeast Asia", ...).
    pub region: String,
    /// Square kilometres.
    pub surface_area: f64,
    pub independence_year: Option<i16>,
    pub population: i64,
    /// Years. Absent for uninhabited territories.
    pub life_expectancy: Option<f64>,
    /// Gross national product, millions of USD.
    pub gnp: Option<f64>,
    /// GNP of the previous accounting period.
    pub gnp_old: Option<f64>,
    /// Endonym ("Pilipinas", "Bharat/India", ...).
    pub local_name: String,
    pub government_form: String,
    pub head_of_state: Option<String>,
    /// City id of the capital, when one exists.
    pub capital: Option<i64>,
    /// ISO-3166 alpha-2 code.
    pub code2: String,
}

impl CountryRecord {
    /// Creates a record with the required identity fields and everything
    /// else zeroed/empty. Callers fill in the attributes they care about.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        continent: Continent,
        region: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            continent,
            region: region.into(),
            surface_area: 0.0,
            independence_year: None,
            population: 0,
            life_expectancy: None,
            gnp: None,
            gnp_old: None,
            local_name: String::new(),
            government_form: String::new(),
            head_of_state: None,
            capital: None,
            code2: String::new(),
        }
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// Returns the first violated rule; write paths must treat any error as
    /// a hard failure.
    pub fn validate(&self) -> Result<(), CountryValidationError> {
        if self.code.len() != 3 || !self.code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryValidationError::InvalidCode(self.code.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(CountryValidationError::EmptyName);
        }
        if self.population < 0 {
            return Err(CountryValidationError::NegativePopulation(self.population));
        }
        if let Some(years) = self.life_expectancy {
            if years <= 0.0 || years > LIFE_EXPECTANCY_MAX_YEARS {
                return Err(CountryValidationError::LifeExpectancyOutOfRange(years));
            }
        }
        Ok(())
    }
}
