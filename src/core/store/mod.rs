//! Typed, versioned client-state store.
//!
//! Replaces the ad hoc string-keyed browser-storage reads of the original
//! frontend with an explicit schema. Every open runs pending migrations in
//! order; a store written by a newer binary is refused rather than guessed at.

pub mod types;

use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use std::path::Path;

pub use types::{MediaRecord, Mission, MissionKind};

/// Bump when appending to MIGRATIONS.
const SCHEMA_VERSION: i64 = 2;

/// Migration n brings the schema from version n to n+1; applied in order.
const MIGRATIONS: &[&str] = &[
    // v0 -> v1: missions
    "CREATE TABLE missions (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        kind TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        position INTEGER NOT NULL DEFAULT 0
    )",
    // v1 -> v2: generated media cache. created_at must be TEXT: NUMERIC
    // affinity would coerce all-digit epoch strings to INTEGER and break
    // reads.
    "CREATE TABLE media_records (
        id TEXT PRIMARY KEY,
        mission_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        url TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT ''
    )",
];

#[derive(Debug)]
pub struct StateStore {
    db: Connection,
}

impl StateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            )",
            [],
        )?;
        let mut store = Self { db };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        let current: i64 = self
            .db
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current > SCHEMA_VERSION {
            bail!(
                "store schema version {} is newer than this binary supports ({})",
                current,
                SCHEMA_VERSION
            );
        }

        for (i, migration) in MIGRATIONS.iter().enumerate().skip(current as usize) {
            self.db.execute(migration, [])?;
            tracing::info!("store: applied migration v{} -> v{}", i, i + 1);
        }

        self.db.execute(
            "INSERT INTO schema_version (id, version) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET version = ?1",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i64> {
        Ok(self.db.query_row(
            "SELECT version FROM schema_version WHERE id = 1",
            [],
            |row| row.get(0),
        )?)
    }

    // --- Missions ---

    /// Insert or replace; last write wins, matching the storage semantics the
    /// frontend relied on.
    pub fn put_mission(&self, mission: &Mission) -> Result<()> {
        self.db.execute(
            "INSERT INTO missions (id, title, kind, description, content, position)
             VALUES (?1, ?2, ?3, ?4, ?5,
                     COALESCE((SELECT position FROM missions WHERE id = ?1),
                              (SELECT COALESCE(MAX(position), -1) + 1 FROM missions)))
             ON CONFLICT(id) DO UPDATE SET
                 title = ?2, kind = ?3, description = ?4, content = ?5",
            params![
                mission.id,
                mission.title,
                mission.kind.as_str(),
                mission.description,
                mission.content
            ],
        )?;
        Ok(())
    }

    pub fn get_mission(&self, id: &str) -> Result<Option<Mission>> {
        let mut stmt = self.db.prepare(
            "SELECT id, title, kind, description, content FROM missions WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_mission(row)?)),
            None => Ok(None),
        }
    }

    /// Missions in wizard order (insertion order).
    pub fn list_missions(&self) -> Result<Vec<Mission>> {
        let mut stmt = self.db.prepare(
            "SELECT id, title, kind, description, content FROM missions ORDER BY position",
        )?;
        let missions = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        missions
            .into_iter()
            .map(|(id, title, kind, description, content)| {
                let kind = MissionKind::parse(&kind)
                    .ok_or_else(|| anyhow::anyhow!("corrupt mission kind: {kind}"))?;
                Ok(Mission {
                    id,
                    title,
                    kind,
                    description,
                    content,
                })
            })
            .collect()
    }

    pub fn delete_mission(&self, id: &str) -> Result<bool> {
        let changed = self
            .db
            .execute("DELETE FROM missions WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // --- Generated media ---

    pub fn put_media(&self, record: &MediaRecord) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO media_records (id, mission_id, kind, url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.mission_id,
                record.kind,
                record.url,
                record.created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_media(&self, id: &str) -> Result<Option<MediaRecord>> {
        let mut stmt = self.db.prepare(
            "SELECT id, mission_id, kind, url, created_at FROM media_records WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(MediaRecord {
                id: row.get(0)?,
                mission_id: row.get(1)?,
                kind: row.get(2)?,
                url: row.get(3)?,
                created_at: row.get(4)?,
            })),
            None => Ok(None),
        }
    }

    pub fn list_media(&self) -> Result<Vec<MediaRecord>> {
        let mut stmt = self.db.prepare(
            "SELECT id, mission_id, kind, url, created_at FROM media_records
             ORDER BY created_at DESC",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(MediaRecord {
                    id: row.get(0)?,
                    mission_id: row.get(1)?,
                    kind: row.get(2)?,
                    url: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn row_to_mission(row: &rusqlite::Row<'_>) -> Result<Mission> {
    let kind_raw: String = row.get(2)?;
    let kind = MissionKind::parse(&kind_raw)
        .ok_or_else(|| anyhow::anyhow!("corrupt mission kind: {kind_raw}"))?;
    Ok(Mission {
        id: row.get(0)?,
        title: row.get(1)?,
        kind,
        description: row.get(3)?,
        content: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission(id: &str, kind: MissionKind) -> Mission {
        Mission {
            id: id.to_string(),
            title: format!("mission {id}"),
            kind,
            description: String::new(),
            content: "写一段拜年词".to_string(),
        }
    }

    #[test]
    fn open_runs_all_migrations() {
        let store = StateStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn reopen_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let store = StateStore::open(&path).unwrap();
            store.put_mission(&mission("m1", MissionKind::Text)).unwrap();
        }
        let store = StateStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(store.list_missions().unwrap().len(), 1);
    }

    #[test]
    fn newer_schema_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        drop(StateStore::open(&path).unwrap());

        let db = Connection::open(&path).unwrap();
        db.execute("UPDATE schema_version SET version = 999", [])
            .unwrap();
        drop(db);

        let err = StateStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("newer"));
    }

    #[test]
    fn mission_roundtrip_and_last_write_wins() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_mission(&mission("m1", MissionKind::Text)).unwrap();

        let mut updated = mission("m1", MissionKind::Voice);
        updated.content = "录一段语音".to_string();
        store.put_mission(&updated).unwrap();

        let missions = store.list_missions().unwrap();
        assert_eq!(missions.len(), 1);
        assert_eq!(missions[0].kind, MissionKind::Voice);
        assert_eq!(missions[0].content, "录一段语音");
    }

    #[test]
    fn missions_keep_insertion_order_across_updates() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_mission(&mission("a", MissionKind::Text)).unwrap();
        store.put_mission(&mission("b", MissionKind::Voice)).unwrap();
        store.put_mission(&mission("c", MissionKind::Screen)).unwrap();
        // Updating "a" must not move it to the end.
        store.put_mission(&mission("a", MissionKind::Screen)).unwrap();

        let ids: Vec<String> = store
            .list_missions()
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn delete_mission_reports_whether_it_existed() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_mission(&mission("m1", MissionKind::Text)).unwrap();
        assert!(store.delete_mission("m1").unwrap());
        assert!(!store.delete_mission("m1").unwrap());
        assert!(store.get_mission("m1").unwrap().is_none());
    }

    #[test]
    fn media_records_roundtrip() {
        let store = StateStore::open_in_memory().unwrap();
        let record = MediaRecord {
            id: "r1".to_string(),
            mission_id: "m1".to_string(),
            kind: "avatar".to_string(),
            url: "https://cdn.example.com/avatar.png".to_string(),
            created_at: "2026-02-17 08:00:00".to_string(),
        };
        store.put_media(&record).unwrap();
        assert_eq!(store.get_media("r1").unwrap().unwrap(), record);
        assert_eq!(store.list_media().unwrap().len(), 1);
    }

    #[test]
    fn media_created_at_survives_all_digit_strings() {
        // Epoch-seconds timestamps must come back as the string they were
        // written as, not as a coerced integer.
        let store = StateStore::open_in_memory().unwrap();
        let record = MediaRecord {
            id: "r1".to_string(),
            mission_id: "m1".to_string(),
            kind: "voice".to_string(),
            url: "https://cdn.example.com/greeting.mp3".to_string(),
            created_at: "1774000000".to_string(),
        };
        store.put_media(&record).unwrap();
        assert_eq!(
            store.get_media("r1").unwrap().unwrap().created_at,
            "1774000000"
        );
        assert_eq!(store.list_media().unwrap()[0].created_at, "1774000000");
    }
}
