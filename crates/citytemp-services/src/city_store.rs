//! SQLite-based city and temperature storage.
//!
//! `SqliteCityStore` owns one connection. Deleting a city removes its
//! temperatures first, inside the same transaction, so no reading outlives
//! its city.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

use crate::city::{City, CityCreate, CityUpdate, NewTemperature, Temperature};
use crate::error::{validate_name, CityStoreError, CityStoreResult};

const TEMPERATURE_SELECT: &str = "SELECT t.id, t.date_time, t.temperature, c.id, c.name, c.additional_info
     FROM temperature t
     JOIN city c ON c.id = t.city_id";

/// SQLite-based city storage.
pub struct SqliteCityStore {
    conn: Connection,
}

impl SqliteCityStore {
    /// Open a store at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS city (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(45) NOT NULL UNIQUE,
                additional_info TEXT
            );

            CREATE TABLE IF NOT EXISTS temperature (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date_time TEXT NOT NULL,
                temperature REAL NOT NULL,
                city_id INTEGER NOT NULL REFERENCES city(id)
            );

            CREATE INDEX IF NOT EXISTS idx_temperature_city ON temperature(city_id);
            "#,
        )?;
        Ok(())
    }

    fn row_to_city(row: &rusqlite::Row) -> rusqlite::Result<City> {
        Ok(City {
            id: row.get(0)?,
            name: row.get(1)?,
            additional_info: row.get(2)?,
        })
    }

    /// Convert a joined temperature/city row to a Temperature.
    fn row_to_temperature(row: &rusqlite::Row) -> rusqlite::Result<Temperature> {
        let date_time_str: String = row.get(1)?;
        let date_time = DateTime::parse_from_rfc3339(&date_time_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Temperature {
            id: row.get(0)?,
            date_time,
            temperature: row.get(2)?,
            city: City {
                id: row.get(3)?,
                name: row.get(4)?,
                additional_info: row.get(5)?,
            },
        })
    }

    /// Insert a new city.
    ///
    /// # Errors
    /// Returns `CityStoreError::Conflict` if the name is taken and
    /// `CityStoreError::Validation` if the name is empty or too long.
    pub fn create_city(&self, input: &CityCreate) -> CityStoreResult<City> {
        validate_name(&input.name)?;

        self.conn
            .execute(
                "INSERT INTO city (name, additional_info) VALUES (?1, ?2)",
                params![input.name, input.additional_info],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    CityStoreError::Conflict(input.name.clone())
                }
                other => other.into(),
            })?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created city {} with ID: {}", input.name, id);

        Ok(City {
            id,
            name: input.name.clone(),
            additional_info: input.additional_info.clone(),
        })
    }

    /// Get a city by ID.
    pub fn get_city(&self, id: i64) -> CityStoreResult<City> {
        self.conn
            .query_row(
                "SELECT id, name, additional_info FROM city WHERE id = ?1",
                params![id],
                Self::row_to_city,
            )
            .optional()?
            .ok_or(CityStoreError::NotFound(id))
    }

    /// List all cities in insertion order.
    pub fn list_cities(&self) -> CityStoreResult<Vec<City>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, additional_info FROM city ORDER BY id")?;

        let rows = stmt.query_map([], Self::row_to_city)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply a partial update and return the refreshed city.
    pub fn update_city(&self, id: i64, update: &CityUpdate) -> CityStoreResult<City> {
        if !self.exists(id)? {
            return Err(CityStoreError::NotFound(id));
        }

        if let Some(ref additional_info) = update.additional_info {
            self.conn.execute(
                "UPDATE city SET additional_info = ?1 WHERE id = ?2",
                params![additional_info, id],
            )?;
            tracing::debug!("Updated city: {}", id);
        }

        self.get_city(id)
    }

    /// Delete a city and its temperatures in one transaction.
    ///
    /// Returns a confirmation message naming the city.
    pub fn delete_city(&self, id: i64) -> CityStoreResult<String> {
        let city = self.get_city(id)?;

        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM temperature WHERE city_id = ?1", params![id])?;
        tx.execute("DELETE FROM city WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!("Deleted city {} and {} temperatures", id, removed);
        Ok(format!("City: '{}' was successfully deleted", city.name))
    }

    /// Insert all records in one transaction.
    ///
    /// Nothing is written unless every insert succeeds. An empty batch is a no-op.
    pub fn insert_temperatures(&self, records: &[NewTemperature]) -> CityStoreResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO temperature (date_time, temperature, city_id) VALUES (?1, ?2, ?3)",
            )?;
            let now = Utc::now();
            for record in records {
                let date_time = record.date_time.unwrap_or(now).to_rfc3339();
                stmt.execute(params![date_time, record.temperature, record.city_id])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// All temperatures with their city attached.
    pub fn list_temperatures(&self) -> CityStoreResult<Vec<Temperature>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY t.id", TEMPERATURE_SELECT))?;

        let rows = stmt.query_map([], Self::row_to_temperature)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Temperatures recorded for one city.
    pub fn list_temperatures_for_city(&self, city_id: i64) -> CityStoreResult<Vec<Temperature>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE t.city_id = ?1 ORDER BY t.id",
            TEMPERATURE_SELECT
        ))?;

        let rows = stmt.query_map(params![city_id], Self::row_to_temperature)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Check if a city exists by ID.
    pub fn exists(&self, id: i64) -> CityStoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM city WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Total number of stored temperatures.
    pub fn count_temperatures(&self) -> CityStoreResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM temperature", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> CityStoreResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn create_test_store() -> SqliteCityStore {
        SqliteCityStore::in_memory().expect("Failed to create in-memory store")
    }

    fn city(name: &str, note: Option<&str>) -> CityCreate {
        CityCreate {
            name: name.to_string(),
            additional_info: note.map(str::to_string),
        }
    }

    #[test]
    fn test_create_and_get_city() {
        let store = create_test_store();

        let created = store.create_city(&city("Kyiv", Some("Capital"))).unwrap();
        assert!(created.id > 0);

        let fetched = store.get_city(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.additional_info.as_deref(), Some("Capital"));
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let store = create_test_store();

        store.create_city(&city("Kyiv", None)).unwrap();
        let result = store.create_city(&city("Kyiv", Some("again")));
        assert!(matches!(result, Err(CityStoreError::Conflict(ref name)) if name == "Kyiv"));
        assert_eq!(store.list_cities().unwrap().len(), 1);
    }

    #[test]
    fn test_create_invalid_name() {
        let store = create_test_store();

        let result = store.create_city(&city("  ", None));
        assert!(matches!(result, Err(CityStoreError::Validation(_))));
    }

    #[test]
    fn test_get_nonexistent() {
        let store = create_test_store();
        assert!(matches!(store.get_city(99999), Err(CityStoreError::NotFound(99999))));
    }

    #[test]
    fn test_list_cities_in_insertion_order() {
        let store = create_test_store();

        store.create_city(&city("Lviv", None)).unwrap();
        store.create_city(&city("Dnipro", None)).unwrap();
        store.create_city(&city("Odesa", None)).unwrap();

        let names: Vec<String> = store
            .list_cities()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Lviv", "Dnipro", "Odesa"]);
    }

    #[test]
    fn test_update_note_keeps_identity() {
        let store = create_test_store();

        let created = store.create_city(&city("Lviv", Some("West"))).unwrap();
        let updated = store
            .update_city(
                created.id,
                &CityUpdate {
                    additional_info: Some("Lion city".to_string()),
                },
            )
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Lviv");
        assert_eq!(updated.additional_info.as_deref(), Some("Lion city"));
        assert_eq!(store.get_city(created.id).unwrap(), updated);
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let store = create_test_store();

        let created = store.create_city(&city("Lviv", Some("West"))).unwrap();
        let updated = store.update_city(created.id, &CityUpdate::default()).unwrap();
        assert_eq!(updated, created);
    }

    #[test]
    fn test_update_nonexistent() {
        let store = create_test_store();

        let result = store.update_city(
            42,
            &CityUpdate {
                additional_info: Some("x".to_string()),
            },
        );
        assert!(matches!(result, Err(CityStoreError::NotFound(42))));
    }

    #[test]
    fn test_delete_cascades_to_temperatures() {
        let store = create_test_store();

        let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
        let lviv = store.create_city(&city("Lviv", None)).unwrap();
        store
            .insert_temperatures(&[
                NewTemperature::new(kyiv.id, 20.0),
                NewTemperature::new(kyiv.id, 21.0),
                NewTemperature::new(lviv.id, 15.0),
            ])
            .unwrap();

        let message = store.delete_city(kyiv.id).unwrap();
        assert_eq!(message, "City: 'Kyiv' was successfully deleted");

        assert!(matches!(store.get_city(kyiv.id), Err(CityStoreError::NotFound(_))));
        assert!(store.list_temperatures_for_city(kyiv.id).unwrap().is_empty());
        assert_eq!(store.count_temperatures().unwrap(), 1);
    }

    #[test]
    fn test_delete_nonexistent() {
        let store = create_test_store();
        assert!(matches!(store.delete_city(7), Err(CityStoreError::NotFound(7))));
    }

    #[test]
    fn test_insert_temperatures_links_cities() {
        let store = create_test_store();

        let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
        let lviv = store.create_city(&city("Lviv", Some("West"))).unwrap();

        let inserted = store
            .insert_temperatures(&[
                NewTemperature::new(kyiv.id, 20.5),
                NewTemperature::new(lviv.id, 14.0),
            ])
            .unwrap();
        assert_eq!(inserted, 2);

        let all = store.list_temperatures().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].city, kyiv);
        assert_eq!(all[0].temperature, 20.5);
        assert_eq!(all[1].city, lviv);
    }

    #[test]
    fn test_insert_keeps_explicit_timestamp() {
        let store = create_test_store();

        let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
        let when = DateTime::parse_from_rfc3339("2023-12-31T23:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        store
            .insert_temperatures(&[NewTemperature {
                city_id: kyiv.id,
                temperature: -4.0,
                date_time: Some(when),
            }])
            .unwrap();

        let stored = store.list_temperatures_for_city(kyiv.id).unwrap();
        assert_eq!(stored[0].date_time, when);
    }

    #[test]
    fn test_insert_defaults_timestamp_to_now() {
        let store = create_test_store();

        let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
        let before = Utc::now();
        store.insert_temperatures(&[NewTemperature::new(kyiv.id, 1.0)]).unwrap();

        let stored = store.list_temperatures().unwrap();
        assert!(stored[0].date_time >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn test_insert_empty_batch() {
        let store = create_test_store();
        assert_eq!(store.insert_temperatures(&[]).unwrap(), 0);
        assert_eq!(store.count_temperatures().unwrap(), 0);
    }

    #[test]
    fn test_insert_rolls_back_whole_batch() {
        let store = create_test_store();

        let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
        let result = store.insert_temperatures(&[
            NewTemperature::new(kyiv.id, 20.0),
            NewTemperature::new(9999, 10.0),
        ]);

        assert!(matches!(result, Err(CityStoreError::Storage(_))));
        assert_eq!(store.count_temperatures().unwrap(), 0);
    }

    #[test]
    fn test_temperatures_for_city_without_readings() {
        let store = create_test_store();

        let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
        assert!(store.list_temperatures_for_city(kyiv.id).unwrap().is_empty());
        assert!(store.list_temperatures_for_city(12345).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.db");

        {
            let store = SqliteCityStore::new(&path).unwrap();
            let kyiv = store.create_city(&city("Kyiv", None)).unwrap();
            store.insert_temperatures(&[NewTemperature::new(kyiv.id, 3.0)]).unwrap();
        }

        let store = SqliteCityStore::new(&path).unwrap();
        assert_eq!(store.list_cities().unwrap().len(), 1);
        assert_eq!(store.count_temperatures().unwrap(), 1);
    }
}
