//! Country use-case service.
//!
//! # Responsibility
//! - Translate store queries into caller-facing views.
//! - Enforce not-found semantics for name-keyed lookups.
//! - Perform the in-memory aggregate selection the store does not provide.
//!
//! # Invariants
//! - A `CountryView` is produced only from a record that exists (the
//!   government-form projection being the one deliberate minimal shape).
//! - Store-returned ordering is preserved; this layer never re-sorts.
//! - Absence of a record surfaces as `CountryNotFound`, never as an empty
//!   projection.

use crate::model::country::{Continent, CountryRecord};
use crate::repo::country_repo::{CountryLanguageCount, CountryRepository, RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for country use-cases.
#[derive(Debug)]
pub enum CountryServiceError {
    /// No record matches the requested country name.
    CountryNotFound(String),
    /// An aggregate lookup ran against an empty store.
    NoCountries,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CountryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountryNotFound(name) => {
                write!(f, "Country Details Not Found for Country : {name}")
            }
            Self::NoCountries => write!(f, "no countries available in the store"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CountryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CountryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Read-only country projection returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryView {
    pub name: String,
    pub continent: Option<Continent>,
    pub region: Option<String>,
    pub population: i64,
    pub life_expectancy: Option<f64>,
    pub government_form: Option<String>,
    pub head_of_state: Option<String>,
}

impl CountryView {
    /// Projects a persisted record into the caller-facing shape.
    pub fn from_record(record: &CountryRecord) -> Self {
        Self {
            name: record.name.clone(),
            continent: Some(record.continent),
            region: Some(record.region.clone()),
            population: record.population,
            life_expectancy: record.life_expectancy,
            government_form: Some(record.government_form.clone()),
            head_of_state: record.head_of_state.clone(),
        }
    }

    /// Minimal projection carrying only a government form.
    pub fn from_government_form(form: impl Into<String>) -> Self {
        Self {
            government_form: Some(form.into()),
            ..Self::default()
        }
    }
}

/// A language paired with the region it was queried under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageView {
    pub language: String,
    pub region: String,
}

/// Partial-update input for a country.
///
/// Fields set to `None` are left unchanged. This replaces an open-ended
/// key/value patch: there is no way to pass an unrecognized field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryUpdate {
    pub head_of_state: Option<String>,
}

/// Country service facade over repository implementations.
pub struct CountryService<R: CountryRepository> {
    repo: R,
}

impl<R: CountryRepository> CountryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gets one country by exact name.
    ///
    /// # Errors
    /// `CountryNotFound` carrying the requested name when no record matches.
    pub fn get_by_country_name(&self, name: &str) -> Result<CountryView, CountryServiceError> {
        let record = self
            .repo
            .find_by_name(name)?
            .ok_or_else(|| CountryServiceError::CountryNotFound(name.to_string()))?;
        Ok(CountryView::from_record(&record))
    }

    /// Returns the country with the highest recorded life expectancy.
    ///
    /// Records without a life expectancy rank below any record with one.
    /// Ties keep the first record in store iteration order. An empty store
    /// fails with `NoCountries`.
    pub fn get_country_with_highest_life_expectancy(
        &self,
    ) -> Result<CountryView, CountryServiceError> {
        let countries = self.repo.find_all()?;

        let mut best: Option<&CountryRecord> = None;
        for candidate in &countries {
            // Strict comparison keeps the earlier record on ties.
            let improves = best
                .map(|current| life_expectancy_rank(candidate) > life_expectancy_rank(current))
                .unwrap_or(true);
            if improves {
                best = Some(candidate);
            }
        }

        best.map(CountryView::from_record)
            .ok_or(CountryServiceError::NoCountries)
    }

    /// Lists languages spoken in the given region, store order preserved.
    pub fn get_languages_by_region(&self, region: &str) -> RepoResult<Vec<LanguageView>> {
        let languages = self.repo.find_languages_by_region(region)?;
        Ok(languages
            .into_iter()
            .map(|language| LanguageView {
                language,
                region: region.to_string(),
            })
            .collect())
    }

    /// Lists deduplicated government forms as minimal projections.
    pub fn get_distinct_government_forms(&self) -> RepoResult<Vec<CountryView>> {
        let forms = self.repo.find_distinct_government_forms()?;
        Ok(forms
            .into_iter()
            .map(CountryView::from_government_form)
            .collect())
    }

    /// Lists the ten most populated countries, store order preserved.
    pub fn get_top10_populated_countries(&self) -> RepoResult<Vec<CountryView>> {
        let countries = self.repo.find_top10_populated_countries()?;
        Ok(countries
            .iter()
            .map(CountryView::from_record)
            .collect())
    }

    /// Applies a partial update to a country looked up by exact name.
    ///
    /// # Errors
    /// `CountryNotFound` with the same contract as [`Self::get_by_country_name`].
    pub fn update_head_of_state(
        &self,
        name: &str,
        update: &CountryUpdate,
    ) -> Result<CountryView, CountryServiceError> {
        let mut record = self
            .repo
            .find_by_name(name)?
            .ok_or_else(|| CountryServiceError::CountryNotFound(name.to_string()))?;

        if let Some(head_of_state) = &update.head_of_state {
            record.head_of_state = Some(head_of_state.clone());
        }

        let saved = self.repo.save(&record)?;
        Ok(CountryView::from_record(&saved))
    }

    /// Per-country language tallies, passed through from the store.
    pub fn get_countries_with_language_count(&self) -> RepoResult<Vec<CountryLanguageCount>> {
        self.repo.find_countries_with_language_count()
    }
}

/// Orders records by life expectancy; `None` sorts below every value.
fn life_expectancy_rank(record: &CountryRecord) -> f64 {
    record.life_expectancy.unwrap_or(f64::NEG_INFINITY)
}
