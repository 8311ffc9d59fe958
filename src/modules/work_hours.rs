use super::sqlite::{self, Migration};
use crate::datatypes::mysql_time::MySqlTime;
use anyhow::{Context, Error};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

static SCHEMA: &[Migration] = &[
    // 0 -> 1
    "CREATE TABLE work_hour (\
        user_id INTEGER NOT NULL PRIMARY KEY, \
        work_hour_start TEXT NULL, \
        work_hour_end TEXT NULL\
    );",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct WorkHour {
    pub user_id: i64,
    pub work_hour_start: MySqlTime,
    pub work_hour_end: MySqlTime,
}

pub struct WorkHourStore {
    connection: Connection,
}
impl WorkHourStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let connection = sqlite::open(path).context("open")?;
        Self::new(connection)
    }
    pub fn open_in_memory() -> Result<Self, Error> {
        let connection = sqlite::open_in_memory().context("open_in_memory")?;
        Self::new(connection)
    }
    fn new(mut connection: Connection) -> Result<Self, Error> {
        sqlite::migrate(&mut connection, SCHEMA).context("migrate")?;
        Ok(Self { connection })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn upsert(
        &self,
        work_hour: &WorkHour,
    ) -> Result<(), Error> {
        self.connection
            .execute(
                "INSERT INTO work_hour (user_id, work_hour_start, work_hour_end) \
                VALUES (?1, ?2, ?3) \
                ON CONFLICT (user_id) DO UPDATE SET \
                    work_hour_start = excluded.work_hour_start, \
                    work_hour_end = excluded.work_hour_end",
                params![
                    work_hour.user_id,
                    work_hour.work_hour_start,
                    work_hour.work_hour_end,
                ],
            )
            .context("execute")?;
        log::trace!("work hour stored: {work_hour:?}");
        Ok(())
    }

    pub fn get(
        &self,
        user_id: i64,
    ) -> Result<Option<WorkHour>, Error> {
        let work_hour = self
            .connection
            .query_row(
                "SELECT user_id, work_hour_start, work_hour_end FROM work_hour WHERE user_id = ?1",
                params![user_id],
                row_work_hour,
            )
            .optional()
            .with_context(|| format!("query_row (user_id = {user_id})"))?;
        Ok(work_hour)
    }

    pub fn list(&self) -> Result<Box<[WorkHour]>, Error> {
        let mut statement = self
            .connection
            .prepare("SELECT user_id, work_hour_start, work_hour_end FROM work_hour ORDER BY user_id")
            .context("prepare")?;

        let work_hours = statement
            .query_map((), row_work_hour)
            .context("query_map")?
            .enumerate()
            .map(|(index, work_hour)| {
                work_hour
                    .inspect_err(|error| log::debug!("row {index} failed to scan: {error}"))
                    .with_context(|| format!("row {index}"))
            })
            .collect::<Result<Box<[_]>, _>>()?;

        Ok(work_hours)
    }

    pub fn remove(
        &self,
        user_id: i64,
    ) -> Result<bool, Error> {
        let removed = self
            .connection
            .execute("DELETE FROM work_hour WHERE user_id = ?1", params![user_id])
            .context("execute")?;
        Ok(removed > 0)
    }
}

fn row_work_hour(row: &Row<'_>) -> rusqlite::Result<WorkHour> {
    Ok(WorkHour {
        user_id: row.get(0)?,
        work_hour_start: row.get(1)?,
        work_hour_end: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{WorkHour, WorkHourStore};
    use crate::datatypes::mysql_time::MySqlTime;
    use chrono::TimeDelta;

    fn work_hour(
        user_id: i64,
        start_hours: i64,
        end_hours: i64,
    ) -> WorkHour {
        WorkHour {
            user_id,
            work_hour_start: MySqlTime::from(TimeDelta::hours(start_hours)),
            work_hour_end: MySqlTime::from(TimeDelta::hours(end_hours)),
        }
    }

    #[test]
    fn json_1() {
        let work_hour = work_hour(1, 9, 17);

        let json = serde_json::to_value(work_hour).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_id": 1,
                "work_hour_start": "009:00:00",
                "work_hour_end": "017:00:00",
            })
        );

        let parsed = serde_json::from_value::<WorkHour>(json).unwrap();
        assert_eq!(parsed, work_hour);
    }
    #[test]
    fn json_null() {
        let work_hour = WorkHour {
            user_id: 2,
            work_hour_start: MySqlTime::null(),
            work_hour_end: MySqlTime::from(TimeDelta::minutes(-90)),
        };

        let json = serde_json::to_string(&work_hour).unwrap();
        assert_eq!(
            json,
            r#"{"user_id":2,"work_hour_start":"","work_hour_end":"-001:30:00"}"#
        );
        assert_eq!(serde_json::from_str::<WorkHour>(&json).unwrap(), work_hour);
    }

    #[test]
    fn upsert_get_1() {
        let store = WorkHourStore::open_in_memory().unwrap();
        assert_eq!(store.get(1).unwrap(), None);

        store.upsert(&work_hour(1, 9, 17)).unwrap();
        assert_eq!(store.get(1).unwrap(), Some(work_hour(1, 9, 17)));

        store.upsert(&work_hour(1, 8, 16)).unwrap();
        assert_eq!(store.get(1).unwrap(), Some(work_hour(1, 8, 16)));
    }
    #[test]
    fn upsert_null() {
        let store = WorkHourStore::open_in_memory().unwrap();
        let work_hour = WorkHour {
            user_id: 3,
            work_hour_start: MySqlTime::null(),
            work_hour_end: MySqlTime::from(TimeDelta::zero()),
        };
        store.upsert(&work_hour).unwrap();

        let (start, end) = store
            .connection()
            .query_row(
                "SELECT typeof(work_hour_start), work_hour_end FROM work_hour WHERE user_id = 3",
                (),
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .unwrap();
        assert_eq!(start, "null");
        assert_eq!(end, "000:00:00");

        assert_eq!(store.get(3).unwrap(), Some(work_hour));
    }

    #[test]
    fn list_1() {
        let store = WorkHourStore::open_in_memory().unwrap();
        store.upsert(&work_hour(2, 10, 18)).unwrap();
        store.upsert(&work_hour(1, 9, 17)).unwrap();

        assert_eq!(
            store.list().unwrap().to_vec(),
            vec![work_hour(1, 9, 17), work_hour(2, 10, 18)]
        );
    }
    #[test]
    fn list_scans_external_rows() {
        let store = WorkHourStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch(
                "INSERT INTO work_hour VALUES (1, '5:30', '173000'); \
                INSERT INTO work_hour VALUES (2, NULL, '-838:59:59');",
            )
            .unwrap();

        let work_hours = store.list().unwrap();
        assert_eq!(work_hours.len(), 2);
        assert_eq!(work_hours[0].work_hour_start.to_string(), "005:30:00");
        assert_eq!(work_hours[0].work_hour_end.to_string(), "017:30:00");
        assert!(!work_hours[1].work_hour_start.is_set());
        assert_eq!(work_hours[1].work_hour_end.to_string(), "-838:59:59");
    }
    #[test]
    fn list_malformed() {
        let store = WorkHourStore::open_in_memory().unwrap();
        store.upsert(&work_hour(1, 9, 17)).unwrap();
        store
            .connection()
            .execute_batch("INSERT INTO work_hour VALUES (2, 'invalid', NULL);")
            .unwrap();

        assert!(store.list().is_err());
        assert!(store.get(2).is_err());
        assert_eq!(store.get(1).unwrap(), Some(work_hour(1, 9, 17)));
    }
    #[test]
    fn list_blob() {
        let store = WorkHourStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch("INSERT INTO work_hour VALUES (1, CAST('1234' AS BLOB), NULL);")
            .unwrap();

        let work_hour = store.get(1).unwrap().unwrap();
        assert_eq!(
            work_hour.work_hour_start.duration(),
            Some(TimeDelta::minutes(12) + TimeDelta::seconds(34))
        );
    }

    #[test]
    fn remove_1() {
        let store = WorkHourStore::open_in_memory().unwrap();
        store.upsert(&work_hour(1, 9, 17)).unwrap();

        assert!(store.remove(1).unwrap());
        assert!(!store.remove(1).unwrap());
        assert!(store.list().unwrap().is_empty());
    }
}
