//! SQLite-backed lesson store.
//!
//! Writes go through a single connection, reads are spread round-robin over a
//! pool of read-only connections. The database runs in WAL mode so readers
//! never wait behind the writer.

use super::models::*;
use super::schema::LESSON_VERSIONED_SCHEMAS;
use super::LessonStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const LESSON_COLUMNS: &str = "id, title, creator_email, category, visibility, is_featured, \
    review_status, likes_count, favorites_count, views_count, created_at";

const REPORT_COLUMNS: &str = "id, lesson_id, lesson_title, reason, status, created_at";

#[derive(Clone)]
pub struct SqliteLessonStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

impl SqliteLessonStore {
    /// Opens (or creates) the lessons database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of read-only connections, at least one is always opened
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open lessons database")?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::create_or_migrate(&mut write_conn, path)?;

        let user_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap_or(0);
        let lesson_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM lessons", [], |r| r.get(0))
            .unwrap_or(0);
        info!(
            "Opened lessons database: {} users, {} lessons",
            user_count, lesson_count
        );

        let pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let read_conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open read connection")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteLessonStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn create_or_migrate(conn: &mut Connection, path: &Path) -> Result<()> {
        let latest = LESSON_VERSIONED_SCHEMAS
            .last()
            .context("No lesson schema defined")?;
        let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if raw_version == 0 {
            info!("Creating lessons schema v{} at {:?}", latest.version, path);
            let tx = conn.transaction()?;
            latest.create(&tx)?;
            tx.commit()?;
            return Ok(());
        }

        let db_version = raw_version - BASE_DB_VERSION as i64;
        if db_version < 1 {
            anyhow::bail!(
                "Lessons database version {} is invalid (expected >= 1)",
                db_version
            );
        }

        let version_index = LESSON_VERSIONED_SCHEMAS
            .iter()
            .position(|s| s.version == db_version as usize)
            .with_context(|| format!("Unknown lessons database version {}", db_version))?;
        LESSON_VERSIONED_SCHEMAS[version_index]
            .validate(conn)
            .with_context(|| {
                format!(
                    "Lessons database schema validation failed for version {}",
                    db_version
                )
            })?;

        if (db_version as usize) < latest.version {
            info!(
                "Migrating lessons database from version {} to {}",
                db_version, latest.version
            );
            let tx = conn.transaction()?;
            for schema in &LESSON_VERSIONED_SCHEMAS[version_index + 1..] {
                if let Some(migration_fn) = schema.migration {
                    migration_fn(&tx).with_context(|| {
                        format!("Failed to run migration to version {}", schema.version)
                    })?;
                }
            }
            tx.pragma_update(None, "user_version", BASE_DB_VERSION + latest.version)?;
            tx.commit()?;
        }
        Ok(())
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn row_to_lesson(row: &rusqlite::Row) -> rusqlite::Result<Lesson> {
        let id: String = row.get("id")?;
        let raw_visibility: String = row.get("visibility")?;
        let visibility = Visibility::parse(&raw_visibility).unwrap_or_else(|| {
            warn!(
                "Lesson {} has unknown visibility '{}', reading it as Private",
                id, raw_visibility
            );
            Visibility::Private
        });
        Ok(Lesson {
            id,
            title: row.get("title")?,
            creator_email: row.get("creator_email")?,
            category: row.get("category")?,
            visibility,
            is_featured: row.get::<_, i64>("is_featured")? != 0,
            review_status: row.get("review_status")?,
            likes_count: row.get::<_, Option<i64>>("likes_count")?.unwrap_or(0),
            favorites_count: row.get::<_, Option<i64>>("favorites_count")?.unwrap_or(0),
            views_count: row.get("views_count")?,
            created_at: timestamp_to_datetime(row.get("created_at")?),
        })
    }

    fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
        let id: String = row.get("id")?;
        let raw_status: String = row.get("status")?;
        let status = ReportStatus::parse(&raw_status).unwrap_or_else(|| {
            warn!(
                "Report {} has unknown status '{}', reading it as pending",
                id, raw_status
            );
            ReportStatus::Pending
        });
        Ok(Report {
            id,
            lesson_id: row.get("lesson_id")?,
            lesson_title: row.get("lesson_title")?,
            reason: row.get("reason")?,
            status,
            created_at: timestamp_to_datetime(row.get("created_at")?),
        })
    }

    fn row_to_activity(row: &rusqlite::Row) -> rusqlite::Result<AdminActivity> {
        let action_type: String = row.get("action_type")?;
        Ok(AdminActivity {
            id: row.get("id")?,
            admin_email: row.get("admin_email")?,
            action_type: AdminActionType::parse(&action_type)
                .unwrap_or(AdminActionType::Moderated),
            description: row.get("description")?,
            created_at: timestamp_to_datetime(row.get("created_at")?),
        })
    }

    fn insert_activity(tx: &Transaction, activity: &AdminActivity) -> Result<()> {
        tx.execute(
            "INSERT INTO admin_activity (id, admin_email, action_type, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                activity.id,
                activity.admin_email,
                activity.action_type.as_str(),
                activity.description,
                activity.created_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    fn lesson_exists(tx: &Transaction, id: &str) -> Result<bool> {
        Ok(tx
            .query_row("SELECT 1 FROM lessons WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    fn count_pending_reported_lessons(conn: &Connection) -> Result<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT lesson_id) FROM reports WHERE status = 'pending'",
            [],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Builds the `WHERE` clause and its positional parameters for a lesson filter.
fn lesson_filter_clause(filter: &LessonFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(category) = &filter.category {
        conditions.push("category = ?");
        params.push(Box::new(category.clone()));
    }
    if let Some(visibility) = &filter.visibility {
        conditions.push("visibility = ?");
        params.push(Box::new(visibility.clone()));
    }
    if let Some(is_featured) = filter.is_featured {
        conditions.push("is_featured = ?");
        params.push(Box::new(is_featured as i64));
    }
    if let Some(review_status) = &filter.review_status {
        conditions.push("review_status = ?");
        params.push(Box::new(review_status.clone()));
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), params)
    }
}

impl LessonStore for SqliteLessonStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (id, email, name, role, is_premium, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.name,
                user.role.as_str(),
                user.is_premium as i64,
                user.created_at.timestamp(),
            ],
        )
        .with_context(|| format!("Failed to insert user {}", user.email))?;
        Ok(())
    }

    fn insert_lesson(&self, lesson: &Lesson) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO lessons ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                LESSON_COLUMNS
            ),
            params![
                lesson.id,
                lesson.title,
                lesson.creator_email,
                lesson.category,
                lesson.visibility.as_str(),
                lesson.is_featured as i64,
                lesson.review_status,
                lesson.likes_count,
                lesson.favorites_count,
                lesson.views_count,
                lesson.created_at.timestamp(),
            ],
        )
        .with_context(|| format!("Failed to insert lesson {}", lesson.id))?;
        Ok(())
    }

    fn insert_report(&self, report: &Report) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO reports ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                REPORT_COLUMNS
            ),
            params![
                report.id,
                report.lesson_id,
                report.lesson_title,
                report.reason,
                report.status.as_str(),
                report.created_at.timestamp(),
            ],
        )
        .with_context(|| format!("Failed to insert report {}", report.id))?;
        Ok(())
    }

    fn get_lesson(&self, id: &str) -> Result<Option<Lesson>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let lesson = conn
            .query_row(
                &format!("SELECT {} FROM lessons WHERE id = ?1", LESSON_COLUMNS),
                params![id],
                Self::row_to_lesson,
            )
            .optional()?;
        Ok(lesson)
    }

    fn collection_counts(&self, collection: Collection, since: i64) -> Result<CollectionCounts> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let (total, created_since): (i64, i64) = conn.query_row(
            &format!(
                "SELECT COUNT(*), COALESCE(SUM(CASE WHEN created_at >= ?1 THEN 1 ELSE 0 END), 0)
                 FROM {}",
                collection.table_name()
            ),
            params![since],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(CollectionCounts {
            total: total as u64,
            created_since: created_since as u64,
        })
    }

    fn count_reported_lessons(&self) -> Result<u64> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Self::count_pending_reported_lessons(&conn)
    }

    fn total_engagement(&self) -> Result<i64> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(COALESCE(likes_count, 0) + COALESCE(favorites_count, 0)), 0)
             FROM lessons",
            [],
            |r| r.get(0),
        )?;
        Ok(total)
    }

    fn top_contributors(&self, limit: usize) -> Result<Vec<TopContributor>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT l.creator_email AS email,
                    u.name AS name,
                    COUNT(*) AS lesson_count,
                    COALESCE(SUM(COALESCE(l.likes_count, 0)), 0) AS total_likes
             FROM lessons l
             LEFT JOIN users u ON u.email = l.creator_email
             GROUP BY l.creator_email
             ORDER BY lesson_count DESC, total_likes DESC, email ASC
             LIMIT ?1",
        )?;
        let contributors = stmt
            .query_map(params![limit as i64], |row| {
                Ok(TopContributor {
                    email: row.get("email")?,
                    name: row.get("name")?,
                    lesson_count: row.get::<_, i64>("lesson_count")? as u64,
                    total_likes: row.get("total_likes")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contributors)
    }

    fn lessons_created_since(&self, since: i64, limit: usize) -> Result<Vec<Lesson>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM lessons WHERE created_at >= ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
            LESSON_COLUMNS
        ))?;
        let lessons = stmt
            .query_map(params![since, limit as i64], Self::row_to_lesson)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lessons)
    }

    fn daily_creation_counts(
        &self,
        collection: Collection,
        since: i64,
        utc_offset_minutes: i32,
    ) -> Result<Vec<(String, u64)>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let offset_modifier = format!("{:+} minutes", utc_offset_minutes);
        let mut stmt = conn.prepare(&format!(
            "SELECT date(created_at, 'unixepoch', ?2) AS day, COUNT(*) AS count
             FROM {} WHERE created_at >= ?1
             GROUP BY day ORDER BY day",
            collection.table_name()
        ))?;
        let counts = stmt
            .query_map(params![since, offset_modifier], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    fn lesson_moderation_facet(
        &self,
        filter: &LessonFilter,
        page: PageRequest,
    ) -> Result<LessonFacet> {
        let read_conn = self.get_read_conn();
        let mut conn = read_conn.lock().unwrap();
        let tx = conn.transaction()?;

        let (where_clause, filter_params) = lesson_filter_clause(filter);
        let filter_refs: Vec<&dyn rusqlite::ToSql> =
            filter_params.iter().map(|p| p.as_ref()).collect();

        let (total, public, private, featured): (i64, i64, i64, i64) = tx.query_row(
            &format!(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN visibility = 'Public' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN visibility = 'Private' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN is_featured != 0 THEN 1 ELSE 0 END), 0)
                 FROM lessons {}",
                where_clause
            ),
            filter_refs.as_slice(),
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?;

        let reported = Self::count_pending_reported_lessons(&tx)?;

        let limit = page.limit as i64;
        let offset = page.sql_offset();
        let mut page_refs = filter_refs.clone();
        page_refs.push(&limit);
        page_refs.push(&offset);

        let lessons = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM lessons {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                LESSON_COLUMNS, where_clause
            ))?;
            let rows = stmt
                .query_map(page_refs.as_slice(), Self::row_to_lesson)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        tx.commit()?;

        debug!(
            "Moderation facet: {} matching lessons, {} on page {}",
            total,
            lessons.len(),
            page.page
        );

        Ok(LessonFacet {
            lessons,
            total: total as u64,
            stats: ModerationStats {
                total_lessons: total as u64,
                public_lessons: public as u64,
                private_lessons: private as u64,
                featured_lessons: featured as u64,
                reported_lessons: reported,
            },
        })
    }

    fn pending_report_groups(&self, page: PageRequest) -> Result<ReportGroupPage> {
        let read_conn = self.get_read_conn();
        let mut conn = read_conn.lock().unwrap();
        let tx = conn.transaction()?;

        let total = Self::count_pending_reported_lessons(&tx)?;

        let heads: Vec<(String, String, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT r.lesson_id,
                        (SELECT r2.lesson_title FROM reports r2
                         WHERE r2.status = 'pending' AND r2.lesson_id = r.lesson_id
                         ORDER BY r2.rowid DESC LIMIT 1) AS lesson_title,
                        COUNT(*) AS report_count,
                        MAX(r.created_at) AS latest_at
                 FROM reports r
                 WHERE r.status = 'pending'
                 GROUP BY r.lesson_id
                 ORDER BY report_count DESC, latest_at DESC, r.lesson_id ASC
                 LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(
                    params![page.limit as i64, page.sql_offset()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut groups = Vec::with_capacity(heads.len());
        {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM reports WHERE status = 'pending' AND lesson_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                REPORT_COLUMNS
            ))?;
            for (lesson_id, lesson_title, report_count) in heads {
                let reports = stmt
                    .query_map(params![lesson_id], Self::row_to_report)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                groups.push(ReportGroup {
                    lesson_id,
                    lesson_title,
                    report_count: report_count as u64,
                    reports,
                });
            }
        }
        tx.commit()?;

        Ok(ReportGroupPage { groups, total })
    }

    fn list_admin_activity(
        &self,
        action_type: Option<AdminActionType>,
        page: PageRequest,
    ) -> Result<ActivityPage> {
        let read_conn = self.get_read_conn();
        let mut conn = read_conn.lock().unwrap();
        let tx = conn.transaction()?;

        let action_filter = action_type.map(|a| a.as_str());
        let total: i64 = tx.query_row(
            "SELECT COUNT(*) FROM admin_activity WHERE ?1 IS NULL OR action_type = ?1",
            params![action_filter],
            |r| r.get(0),
        )?;
        let entries = {
            let mut stmt = tx.prepare(
                "SELECT id, admin_email, action_type, description, created_at
                 FROM admin_activity WHERE ?1 IS NULL OR action_type = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            )?;
            let rows = stmt
                .query_map(
                    params![action_filter, page.limit as i64, page.sql_offset()],
                    Self::row_to_activity,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        tx.commit()?;

        Ok(ActivityPage {
            entries,
            total: total as u64,
        })
    }

    fn update_lesson_moderation(
        &self,
        id: &str,
        update: &LessonModerationUpdate,
        activity: &AdminActivity,
    ) -> Result<bool> {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;
        if !Self::lesson_exists(&tx, id)? {
            return Ok(false);
        }

        if let Some(is_featured) = update.is_featured {
            tx.execute(
                "UPDATE lessons SET is_featured = ?1 WHERE id = ?2",
                params![is_featured as i64, id],
            )?;
        }
        if let Some(visibility) = update.visibility {
            tx.execute(
                "UPDATE lessons SET visibility = ?1 WHERE id = ?2",
                params![visibility.as_str(), id],
            )?;
        }
        if let Some(review_status) = &update.review_status {
            tx.execute(
                "UPDATE lessons SET review_status = ?1 WHERE id = ?2",
                params![review_status, id],
            )?;
        }
        Self::insert_activity(&tx, activity)?;
        tx.commit()?;
        Ok(true)
    }

    fn delete_lesson(&self, id: &str, activity: &AdminActivity) -> Result<bool> {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM lessons WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Ok(false);
        }
        Self::insert_activity(&tx, activity)?;
        tx.commit()?;
        Ok(true)
    }

    fn set_pending_reports_status(
        &self,
        lesson_id: &str,
        status: ReportStatus,
        activity: &AdminActivity,
    ) -> Result<Option<usize>> {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE reports SET status = ?1 WHERE lesson_id = ?2 AND status = 'pending'",
            params![status.as_str(), lesson_id],
        )?;
        if updated == 0 && !Self::lesson_exists(&tx, lesson_id)? {
            return Ok(None);
        }
        Self::insert_activity(&tx, activity)?;
        tx.commit()?;
        Ok(Some(updated))
    }
}
