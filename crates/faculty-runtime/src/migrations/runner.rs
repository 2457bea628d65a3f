//! Migration runner.
//!
//! Only one process applies migrations at a time; the others wait on a
//! PostgreSQL advisory lock.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use faculty_core::error::{FacultyError, Result};

/// Advisory lock key, "FACULTY" in ASCII.
const MIGRATION_LOCK_ID: i64 = 0x46_4143_554C_5459;

/// A single migration.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique name, e.g. "0001_faculty_records".
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// A migration recorded in `faculty_migrations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// Applies built-in migrations followed by migrations loaded from disk.
pub struct MigrationRunner {
    pool: PgPool,
}

impl MigrationRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations while holding the advisory lock.
    ///
    /// Returns the names of the migrations applied by this call.
    pub async fn run(&self, extra_migrations: Vec<Migration>) -> Result<Vec<String>> {
        // pg_advisory_lock is per session, so lock and unlock must share a connection
        let mut conn = self.pool.acquire().await?;

        debug!("Acquiring migration lock...");
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(MIGRATION_LOCK_ID)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                FacultyError::Database(format!("Failed to acquire migration lock: {}", e))
            })?;

        let result = self.run_inner(extra_migrations).await;

        if let Err(e) = sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(MIGRATION_LOCK_ID)
            .execute(&mut *conn)
            .await
        {
            warn!("Failed to release migration lock: {}", e);
        }

        result
    }

    async fn run_inner(&self, extra_migrations: Vec<Migration>) -> Result<Vec<String>> {
        self.ensure_migrations_table().await?;

        let applied: HashSet<String> = self
            .applied_migrations()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect();
        debug!("Already applied migrations: {:?}", applied);

        let mut newly_applied = Vec::new();
        let all = super::builtin::get_builtin_migrations()
            .into_iter()
            .chain(extra_migrations);
        for migration in all {
            if !applied.contains(&migration.name) {
                self.apply_migration(&migration).await?;
                newly_applied.push(migration.name);
            }
        }

        Ok(newly_applied)
    }

    /// Migrations recorded as applied, oldest first.
    pub async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        self.ensure_migrations_table().await?;

        let rows: Vec<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT name, applied_at FROM faculty_migrations ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    FacultyError::Database(format!("Failed to get applied migrations: {}", e))
                })?;

        Ok(rows
            .into_iter()
            .map(|(name, applied_at)| AppliedMigration { name, applied_at })
            .collect())
    }

    /// Names of migrations that `run` would apply.
    pub async fn pending_migrations(&self, extra_migrations: &[Migration]) -> Result<Vec<String>> {
        let applied: HashSet<String> = self
            .applied_migrations()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect();

        Ok(super::builtin::get_builtin_migrations()
            .iter()
            .chain(extra_migrations)
            .filter(|m| !applied.contains(&m.name))
            .map(|m| m.name.clone())
            .collect())
    }

    async fn ensure_migrations_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faculty_migrations (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) UNIQUE NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            FacultyError::Database(format!("Failed to create migrations table: {}", e))
        })?;
        Ok(())
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<()> {
        info!("Applying migration: {}", migration.name);

        let mut tx = self.pool.begin().await?;

        for statement in split_sql_statements(&migration.sql) {
            if is_comment_only(&statement) {
                continue;
            }

            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    FacultyError::Database(format!(
                        "Failed to apply migration '{}': {}",
                        migration.name, e
                    ))
                })?;
        }

        sqlx::query("INSERT INTO faculty_migrations (name) VALUES ($1)")
            .bind(&migration.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                FacultyError::Database(format!(
                    "Failed to record migration '{}': {}",
                    migration.name, e
                ))
            })?;

        tx.commit().await?;

        info!("Migration applied: {}", migration.name);
        Ok(())
    }
}

fn is_comment_only(statement: &str) -> bool {
    statement.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with("--")
    })
}

/// Split SQL into individual statements, respecting dollar-quoted strings.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut dollar_tag: Option<String> = None;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if c == '$' {
            let mut tag = String::from("$");
            while let Some(&next) = chars.peek() {
                if next == '$' || next.is_alphanumeric() || next == '_' {
                    chars.next();
                    tag.push(next);
                    current.push(next);
                    if next == '$' {
                        break;
                    }
                } else {
                    break;
                }
            }

            if tag.len() >= 2 && tag.ends_with('$') {
                match &dollar_tag {
                    Some(open) if *open == tag => dollar_tag = None,
                    Some(_) => {}
                    None => dollar_tag = Some(tag),
                }
            }
        }

        if c == ';' && dollar_tag.is_none() {
            push_statement(&mut statements, &current);
            current.clear();
        }
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim().trim_end_matches(';').trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}

/// Load migrations from a directory.
///
/// Files are named like `0002_add_office_column.sql` and run in name order.
pub fn load_migrations_from_dir(dir: &Path) -> Result<Vec<Migration>> {
    if !dir.exists() {
        debug!("Migrations directory does not exist: {:?}", dir);
        return Ok(Vec::new());
    }

    let mut migrations = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().map(|e| e == "sql").unwrap_or(false) {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| FacultyError::Config("Invalid migration filename".into()))?
                .to_string();

            let sql = std::fs::read_to_string(&path)?;
            migrations.push(Migration::new(name, sql));
        }
    }

    migrations.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("Loaded {} migrations from {:?}", migrations.len(), dir);
    Ok(migrations)
}
