//! SQLite implementation of [`IndexRepository`]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::IndexRepository;
use crate::models::{
    IndexEntry, Lemma, LemmaId, NewPage, Page, PageId, Site, SiteId, SiteStatus,
};

/// Ids bound per statement when querying by id list
const ID_CHUNK: usize = 500;

/// SQLite index store
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteIndexRepository {
    conn: Mutex<Connection>,
}

impl SqliteIndexRepository {
    /// Open or create a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self::with_connection(conn)?;
        tracing::info!(path = %path.display(), "SQLite index repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .context("Failed to enable foreign keys")?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn create_schema(&self) -> Result<()> {
        self.lock()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS site (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL,
                    name TEXT NOT NULL,
                    status TEXT NOT NULL,
                    status_time TEXT NOT NULL,
                    last_error TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_site_url ON site(url);

                CREATE TABLE IF NOT EXISTS page (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    site_id INTEGER NOT NULL REFERENCES site(id) ON DELETE CASCADE,
                    path TEXT NOT NULL,
                    code INTEGER NOT NULL,
                    content TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_page_site ON page(site_id);

                CREATE TABLE IF NOT EXISTS lemma (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    site_id INTEGER NOT NULL REFERENCES site(id) ON DELETE CASCADE,
                    lemma TEXT NOT NULL,
                    frequency INTEGER NOT NULL,
                    UNIQUE(site_id, lemma)
                );

                CREATE TABLE IF NOT EXISTS index_entry (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    page_id INTEGER NOT NULL REFERENCES page(id) ON DELETE CASCADE,
                    lemma_id INTEGER NOT NULL REFERENCES lemma(id) ON DELETE CASCADE,
                    rank REAL NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_index_entry_lemma ON index_entry(lemma_id);
                CREATE INDEX IF NOT EXISTS idx_index_entry_page ON index_entry(page_id);
                "#,
            )
            .context("Failed to create SQLite schema")?;

        Ok(())
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: row
            .get::<_, String>(3)?
            .parse()
            .unwrap_or(SiteStatus::Failed),
        status_time: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        last_error: row.get(5)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        site_id: row.get(1)?,
        path: row.get(2)?,
        code: row.get(3)?,
        content: row.get(4)?,
    })
}

fn lemma_from_row(row: &Row<'_>) -> rusqlite::Result<Lemma> {
    Ok(Lemma {
        id: row.get(0)?,
        site_id: row.get(1)?,
        lemma: row.get(2)?,
        frequency: row.get(3)?,
    })
}

const SITE_COLUMNS: &str = "id, url, name, status, status_time, last_error";
const PAGE_COLUMNS: &str = "id, site_id, path, code, content";

impl IndexRepository for SqliteIndexRepository {
    fn find_site(&self, url: &str) -> Result<Option<Site>> {
        let conn = self.lock();
        conn.query_row(
            &format!("SELECT {SITE_COLUMNS} FROM site WHERE url = ?1 ORDER BY id DESC LIMIT 1"),
            params![url],
            site_from_row,
        )
        .optional()
        .context("Failed to find site")
    }

    fn all_sites(&self) -> Result<Vec<Site>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT {SITE_COLUMNS} FROM site ORDER BY id"))?;
        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list sites")?;
        Ok(sites)
    }

    fn create_site(&self, url: &str, name: &str, status: SiteStatus) -> Result<Site> {
        let conn = self.lock();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO site (url, name, status, status_time, last_error)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![url, name, status.as_str(), now.to_rfc3339()],
        )
        .context("Failed to insert site")?;

        Ok(Site {
            id: conn.last_insert_rowid(),
            url: url.to_string(),
            name: name.to_string(),
            status,
            status_time: now,
            last_error: None,
        })
    }

    fn update_site_status(
        &self,
        site_id: SiteId,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE site SET status = ?1, status_time = ?2, last_error = ?3 WHERE id = ?4",
            params![status.as_str(), Utc::now().to_rfc3339(), last_error, site_id],
        )
        .context("Failed to update site status")?;
        Ok(())
    }

    fn delete_site(&self, site_id: SiteId) -> Result<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM site WHERE id = ?1", params![site_id])
            .context("Failed to delete site")?;
        Ok(())
    }

    fn any_site_indexing(&self) -> Result<bool> {
        let conn = self.lock();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM site WHERE status = ?1)",
                params![SiteStatus::Indexing.as_str()],
                |row| row.get(0),
            )
            .context("Failed to check indexing sites")?;
        Ok(exists)
    }

    fn save_pages(&self, site_id: SiteId, pages: &[NewPage]) -> Result<Vec<PageId>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(pages.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO page (site_id, path, code, content) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for page in pages {
                stmt.execute(params![site_id, page.path, page.code, page.content])
                    .with_context(|| format!("Failed to insert page {}", page.path))?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit().context("Failed to commit pages")?;
        Ok(ids)
    }

    fn pages_of_site(&self, site_id: SiteId) -> Result<Vec<Page>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PAGE_COLUMNS} FROM page WHERE site_id = ?1 ORDER BY id"
        ))?;
        let pages = stmt
            .query_map(params![site_id], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list pages")?;
        Ok(pages)
    }

    fn pages_by_ids(&self, ids: &[PageId]) -> Result<Vec<Page>> {
        let conn = self.lock();
        let mut pages = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAGE_COLUMNS} FROM page WHERE id IN ({}) ORDER BY id",
                placeholders(chunk.len())
            ))?;
            let rows = stmt
                .query_map(params_from_iter(chunk), page_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to load pages")?;
            pages.extend(rows);
        }
        Ok(pages)
    }

    fn count_pages(&self, site_id: SiteId) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM page WHERE site_id = ?1",
                params![site_id],
                |row| row.get(0),
            )
            .context("Failed to count pages")?;
        Ok(count as usize)
    }

    fn save_lemmas(&self, site_id: SiteId, lemmas: &[(String, u32)]) -> Result<Vec<Lemma>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut saved = Vec::with_capacity(lemmas.len());
        {
            let mut stmt =
                tx.prepare("INSERT INTO lemma (site_id, lemma, frequency) VALUES (?1, ?2, ?3)")?;
            for (lemma, frequency) in lemmas {
                stmt.execute(params![site_id, lemma, frequency])
                    .with_context(|| format!("Failed to insert lemma {lemma}"))?;
                saved.push(Lemma {
                    id: tx.last_insert_rowid(),
                    site_id,
                    lemma: lemma.clone(),
                    frequency: *frequency,
                });
            }
        }
        tx.commit().context("Failed to commit lemmas")?;
        Ok(saved)
    }

    fn lemmas_of_site(&self, site_id: SiteId) -> Result<Vec<Lemma>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, site_id, lemma, frequency FROM lemma WHERE site_id = ?1 ORDER BY id",
        )?;
        let lemmas = stmt
            .query_map(params![site_id], lemma_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load lemmas")?;
        Ok(lemmas)
    }

    fn find_lemmas(&self, texts: &[String], site_ids: &[SiteId]) -> Result<Vec<Lemma>> {
        if texts.is_empty() || site_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock();
        let query = format!(
            "SELECT id, site_id, lemma, frequency FROM lemma
             WHERE lemma IN ({}) AND site_id IN ({}) ORDER BY id",
            placeholders(texts.len()),
            placeholders(site_ids.len())
        );
        let mut bound: Vec<&dyn rusqlite::ToSql> =
            texts.iter().map(|t| t as &dyn rusqlite::ToSql).collect();
        bound.extend(site_ids.iter().map(|id| id as &dyn rusqlite::ToSql));

        let mut stmt = conn.prepare(&query)?;
        let lemmas = stmt
            .query_map(bound.as_slice(), lemma_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to find lemmas")?;
        Ok(lemmas)
    }

    fn count_lemmas(&self, site_id: SiteId) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM lemma WHERE site_id = ?1",
                params![site_id],
                |row| row.get(0),
            )
            .context("Failed to count lemmas")?;
        Ok(count as usize)
    }

    fn save_index(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO index_entry (page_id, lemma_id, rank) VALUES (?1, ?2, ?3)",
            )?;
            for entry in entries {
                stmt.execute(params![entry.page_id, entry.lemma_id, entry.rank as f64])?;
            }
        }
        tx.commit().context("Failed to commit index entries")?;
        Ok(())
    }

    fn pages_with_lemmas(&self, lemma_ids: &[LemmaId]) -> Result<HashSet<PageId>> {
        let conn = self.lock();
        let mut pages = HashSet::new();
        for chunk in lemma_ids.chunks(ID_CHUNK) {
            let mut stmt = conn.prepare(&format!(
                "SELECT DISTINCT page_id FROM index_entry WHERE lemma_id IN ({})",
                placeholders(chunk.len())
            ))?;
            let rows = stmt
                .query_map(params_from_iter(chunk), |row| row.get::<_, PageId>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to load pages for lemmas")?;
            pages.extend(rows);
        }
        Ok(pages)
    }

    fn index_entries(&self, page_ids: &[PageId], lemma_ids: &[LemmaId]) -> Result<Vec<IndexEntry>> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: HashSet<PageId> = page_ids.iter().copied().collect();
        let conn = self.lock();
        let mut entries = Vec::new();
        for chunk in lemma_ids.chunks(ID_CHUNK) {
            let mut stmt = conn.prepare(&format!(
                "SELECT page_id, lemma_id, rank FROM index_entry WHERE lemma_id IN ({}) ORDER BY id",
                placeholders(chunk.len())
            ))?;
            let rows = stmt
                .query_map(params_from_iter(chunk), |row| {
                    Ok(IndexEntry {
                        page_id: row.get(0)?,
                        lemma_id: row.get(1)?,
                        rank: row.get::<_, f64>(2)? as f32,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to load index entries")?;
            entries.extend(rows.into_iter().filter(|e| wanted.contains(&e.page_id)));
        }
        Ok(entries)
    }

    fn clear_site_index(&self, site_id: SiteId) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM index_entry WHERE page_id IN (SELECT id FROM page WHERE site_id = ?1)",
            params![site_id],
        )?;
        tx.execute("DELETE FROM lemma WHERE site_id = ?1", params![site_id])?;
        tx.commit().context("Failed to clear site index")?;
        Ok(())
    }
}
