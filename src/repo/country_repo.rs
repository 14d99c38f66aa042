//! Country store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the query and persistence APIs the country service consumes.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `save` validates the record before touching SQL and upserts by `code`.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Result ordering is defined here; the service never re-sorts.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::country::{Continent, CountryRecord, CountryValidationError};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const COUNTRY_SELECT_SQL: &str = "SELECT
    code,
    name,
    continent,
    region,
    surface_area,
    independence_year,
    population,
    life_expectancy,
    gnp,
    gnp_old,
    local_name,
    government_form,
    head_of_state,
    capital,
    code2
FROM countries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for country persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CountryValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted country data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CountryValidationError> for RepoError {
    fn from(value: CountryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Per-country language tally returned by the aggregate query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryLanguageCount {
    pub name: String,
    pub language_count: i64,
}

/// Store interface consumed by the country service.
pub trait CountryRepository {
    /// Exact, case-sensitive lookup by country name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<CountryRecord>>;
    /// All countries in stable `code ASC` iteration order.
    fn find_all(&self) -> RepoResult<Vec<CountryRecord>>;
    /// Distinct language names spoken in countries of the given region.
    fn find_languages_by_region(&self, region: &str) -> RepoResult<Vec<String>>;
    /// Deduplicated government-form strings.
    fn find_distinct_government_forms(&self) -> RepoResult<Vec<String>>;
    /// Up to ten records, most populated first.
    fn find_top10_populated_countries(&self) -> RepoResult<Vec<CountryRecord>>;
    /// Language tally per country, most languages first.
    fn find_countries_with_language_count(&self) -> RepoResult<Vec<CountryLanguageCount>>;
    /// Validates and upserts by `code`, returning the persisted row.
    fn save(&self, record: &CountryRecord) -> RepoResult<CountryRecord>;
}

/// SQLite-backed country repository.
pub struct SqliteCountryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCountryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// Rejects connections whose schema version or shape does not match what
    /// this binary expects, so stale databases fail fast instead of at first
    /// query.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CountryRepository for SqliteCountryRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Option<CountryRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COUNTRY_SELECT_SQL}
             WHERE name = ?1
             ORDER BY code ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_country_row(row)?));
        }

        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<CountryRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COUNTRY_SELECT_SQL} ORDER BY code ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut countries = Vec::new();

        while let Some(row) = rows.next()? {
            countries.push(parse_country_row(row)?);
        }

        Ok(countries)
    }

    fn find_languages_by_region(&self, region: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT cl.language
             FROM country_languages cl
             INNER JOIN countries c ON c.code = cl.country_code
             WHERE c.region = ?1
             ORDER BY cl.language COLLATE NOCASE ASC;",
        )?;

        let mut rows = stmt.query([region])?;
        let mut languages = Vec::new();
        while let Some(row) = rows.next()? {
            languages.push(row.get(0)?);
        }

        Ok(languages)
    }

    fn find_distinct_government_forms(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT government_form
             FROM countries
             ORDER BY government_form COLLATE NOCASE ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut forms = Vec::new();
        while let Some(row) = rows.next()? {
            forms.push(row.get(0)?);
        }

        Ok(forms)
    }

    fn find_top10_populated_countries(&self) -> RepoResult<Vec<CountryRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COUNTRY_SELECT_SQL}
             ORDER BY population DESC, code ASC
             LIMIT 10;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut countries = Vec::new();
        while let Some(row) = rows.next()? {
            countries.push(parse_country_row(row)?);
        }

        Ok(countries)
    }

    fn find_countries_with_language_count(&self) -> RepoResult<Vec<CountryLanguageCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, COUNT(cl.language) AS language_count
             FROM countries c
             INNER JOIN country_languages cl ON cl.country_code = c.code
             GROUP BY c.code, c.name
             ORDER BY language_count DESC, c.name ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push(CountryLanguageCount {
                name: row.get("name")?,
                language_count: row.get("language_count")?,
            });
        }

        Ok(counts)
    }

    fn save(&self, record: &CountryRecord) -> RepoResult<CountryRecord> {
        record.validate()?;

        self.conn.execute(
            "INSERT INTO countries (
                code,
                name,
                continent,
                region,
                surface_area,
                independence_year,
                population,
                life_expectancy,
                gnp,
                gnp_old,
                local_name,
                government_form,
                head_of_state,
                capital,
                code2
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT (code) DO UPDATE SET
                name = excluded.name,
                continent = excluded.continent,
                region = excluded.region,
                surface_area = excluded.surface_area,
                independence_year = excluded.independence_year,
                population = excluded.population,
                life_expectancy = excluded.life_expectancy,
                gnp = excluded.gnp,
                gnp_old = excluded.gnp_old,
                local_name = excluded.local_name,
                government_form = excluded.government_form,
                head_of_state = excluded.head_of_state,
                capital = excluded.capital,
                code2 = excluded.code2;",
            params![
                record.code,
                record.name,
                record.continent.as_str(),
                record.region,
                record.surface_area,
                record.independence_year,
                record.population,
                record.life_expectancy,
                record.gnp,
                record.gnp_old,
                record.local_name,
                record.government_form,
                record.head_of_state,
                record.capital,
                record.code2,
            ],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "{COUNTRY_SELECT_SQL}
             WHERE code = ?1;"
        ))?;
        let mut rows = stmt.query([record.code.as_str()])?;
        match rows.next()? {
            Some(row) => parse_country_row(row),
            None => Err(RepoError::InvalidData(format!(
                "saved country `{}` not found in read-back",
                record.code
            ))),
        }
    }
}

fn parse_country_row(row: &Row<'_>) -> RepoResult<CountryRecord> {
    let continent_text: String = row.get("continent")?;
    let continent = Continent::from_str_opt(&continent_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid continent value `{continent_text}` in countries.continent"
        ))
    })?;

    let record = CountryRecord {
        code: row.get("code")?,
        name: row.get("name")?,
        continent,
        region: row.get("region")?,
        surface_area: row.get("surface_area")?,
        independence_year: row.get("independence_year")?,
        population: row.get("population")?,
        life_expectancy: row.get("life_expectancy")?,
        gnp: row.get("gnp")?,
        gnp_old: row.get("gnp_old")?,
        local_name: row.get("local_name")?,
        government_form: row.get("government_form")?,
        head_of_state: row.get("head_of_state")?,
        capital: row.get("capital")?,
        code2: row.get("code2")?,
    };
    record.validate()?;
    Ok(record)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["countries", "country_languages"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in [
        "code",
        "name",
        "continent",
        "region",
        "population",
        "life_expectancy",
        "government_form",
        "head_of_state",
    ] {
        if !table_has_column(conn, "countries", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "countries",
                column,
            });
        }
    }

    for column in ["country_code", "language"] {
        if !table_has_column(conn, "country_languages", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "country_languages",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
