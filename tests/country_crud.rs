use atlas_core::db::migrations::latest_version;
use atlas_core::db::open_db_in_memory;
use atlas_core::{
    Continent, CountryRecord, CountryRepository, RepoError, SqliteCountryRepository,
};
use rusqlite::{params, Connection};

fn country(code: &str, name: &str, population: i64, life_expectancy: Option<f64>) -> CountryRecord {
    let mut record = CountryRecord::new(code, name, Continent::Asia, "South Asia");
    record.population = population;
    record.life_expectancy = life_expectancy;
    record.government_form = "Republic".to_string();
    record
}

fn add_language(conn: &Connection, code: &str, language: &str) {
    conn.execute(
        "INSERT INTO country_languages (country_code, language) VALUES (?1, ?2);",
        params![code, language],
    )
    .unwrap();
}

#[test]
fn save_and_find_by_name_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    let mut record = country("IND", "India", 1_393_409_038, Some(69.7));
    record.head_of_state = Some("Narendra Modi".to_string());
    record.local_name = "Bharat/India".to_string();
    let saved = repo.save(&record).unwrap();
    assert_eq!(saved, record);

    let loaded = repo.find_by_name("India").unwrap().unwrap();
    assert_eq!(loaded.code, "IND");
    assert_eq!(loaded.population, 1_393_409_038);
    assert_eq!(loaded.life_expectancy, Some(69.7));
    assert_eq!(loaded.head_of_state.as_deref(), Some("Narendra Modi"));
}

#[test]
fn find_by_name_is_exact_and_case_sensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();
    repo.save(&country("IND", "India", 100, None)).unwrap();

    assert!(repo.find_by_name("india").unwrap().is_none());
    assert!(repo.find_by_name("Ind").unwrap().is_none());
    assert!(repo.find_by_name("India").unwrap().is_some());
}

#[test]
fn save_upserts_existing_row_by_code() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    let mut record = country("FRA", "France", 65_273_511, Some(82.7));
    repo.save(&record).unwrap();

    record.head_of_state = Some("Emmanuel Macron".to_string());
    record.population = 65_300_000;
    let saved = repo.save(&record).unwrap();
    assert_eq!(saved.head_of_state.as_deref(), Some("Emmanuel Macron"));
    assert_eq!(saved.population, 65_300_000);

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn save_rejects_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    let err = repo.save(&country("XX", "Nowhere", 0, None)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo.save(&country("NWH", "Nowhere", -5, None)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn find_all_iterates_in_code_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    repo.save(&country("RUS", "Russia", 145_912_025, Some(72.6)))
        .unwrap();
    repo.save(&country("BRA", "Brazil", 213_993_437, Some(75.7)))
        .unwrap();
    repo.save(&country("CHN", "China", 1_444_216_107, Some(76.9)))
        .unwrap();

    let codes: Vec<String> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|record| record.code)
        .collect();
    assert_eq!(codes, vec!["BRA", "CHN", "RUS"]);
}

#[test]
fn top10_orders_by_population_descending_with_stable_ties() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    for (index, code) in [
        "AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH", "III", "JJJ", "KKK",
    ]
    .into_iter()
    .enumerate()
    {
        let population = 1_000 + (index as i64) * 100;
        repo.save(&country(code, &format!("Country {code}"), population, None))
            .unwrap();
    }
    // Tie with KKK's population; code order must break it.
    repo.save(&country("ZZZ", "Tieland", 2_000, None)).unwrap();

    let top = repo.find_top10_populated_countries().unwrap();
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].code, "KKK");
    assert_eq!(top[1].code, "ZZZ");
    assert_eq!(top[2].code, "JJJ");
    assert!(top.iter().all(|record| record.population >= 1_200));
}

#[test]
fn languages_by_region_are_distinct_and_sorted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    repo.save(&country("IND", "India", 100, None)).unwrap();
    repo.save(&country("PAK", "Pakistan", 100, None)).unwrap();
    let mut other_region = country("DEU", "Germany", 100, None);
    other_region.region = "Central Europe".to_string();
    repo.save(&other_region).unwrap();

    add_language(&conn, "IND", "Hindi");
    add_language(&conn, "IND", "English");
    add_language(&conn, "PAK", "English");
    add_language(&conn, "PAK", "Urdu");
    add_language(&conn, "DEU", "German");

    let languages = repo.find_languages_by_region("South Asia").unwrap();
    assert_eq!(languages, vec!["English", "Hindi", "Urdu"]);
}

#[test]
fn distinct_government_forms_deduplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    let mut monarchy = country("GBR", "United Kingdom", 100, None);
    monarchy.government_form = "Monarchy".to_string();
    repo.save(&monarchy).unwrap();
    repo.save(&country("IND", "India", 100, None)).unwrap();
    repo.save(&country("FRA", "France", 100, None)).unwrap();

    let forms = repo.find_distinct_government_forms().unwrap();
    assert_eq!(forms, vec!["Monarchy", "Republic"]);
}

#[test]
fn language_count_orders_by_count_then_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCountryRepository::try_new(&conn).unwrap();

    repo.save(&country("AAA", "Alphaland", 100, None)).unwrap();
    repo.save(&country("BBB", "Betaland", 100, None)).unwrap();
    repo.save(&country("CCC", "Silentland", 100, None)).unwrap();

    for language in ["One", "Two", "Three"] {
        add_language(&conn, "BBB", language);
    }
    add_language(&conn, "AAA", "One");

    let counts = repo.find_countries_with_language_count().unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].name, "Betaland");
    assert_eq!(counts[0].language_count, 3);
    assert_eq!(counts[1].name, "Alphaland");
    assert_eq!(counts[1].language_count, 1);
}

#[test]
fn read_paths_reject_invalid_persisted_continent() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO countries (code, name, continent) VALUES ('XAN', 'Xanadu', 'Atlantis');",
        [],
    )
    .unwrap();

    let repo = SqliteCountryRepository::try_new(&conn).unwrap();
    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(err.to_string().contains("Atlantis"), "unexpected error: {err}");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteCountryRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_countries_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCountryRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("countries"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_country_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE countries (
            code TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            continent TEXT NOT NULL,
            region TEXT NOT NULL DEFAULT '',
            population INTEGER NOT NULL DEFAULT 0,
            life_expectancy REAL,
            government_form TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE country_languages (
            country_code TEXT NOT NULL,
            language TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCountryRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "countries",
            column: "head_of_state"
        })
    ));
}
