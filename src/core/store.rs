// cloud archive - persists audit records
// supports postgres, sqlite, and mysql

use crate::Error;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{AnyPool, any::AnyPoolOptions};

// how many records /history hands back
const HISTORY_LIMIT: i64 = 10;

pub struct Archive {
    pool: AnyPool,
    dialect: Dialect,
}

/// One persisted audit. Immutable once written, never updated or deleted.
#[derive(Serialize)]
pub struct AuditRecord {
    pub id: i64,
    pub code: String,
    pub report: String,
    /// ISO-8601 creation time, set server-side at insert.
    pub created_at: Option<String>,
}

enum Dialect {
    Postgres,
    Sqlite,
    Mysql,
}

impl Archive {
    pub async fn connect(url: &str) -> Result<Self, Error> {
        sqlx::any::install_default_drivers();

        // figure out which database we're talking to
        let dialect = detect_dialect(url);

        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        let archive = Self { pool, dialect };
        archive.ensure_table().await?;

        Ok(archive)
    }

    // the archive owns its table, create it on first connect
    async fn ensure_table(&self) -> Result<(), Error> {
        let ddl = match self.dialect {
            Dialect::Postgres => {
                r#"CREATE TABLE IF NOT EXISTS audits (
                       id BIGSERIAL PRIMARY KEY,
                       code TEXT NOT NULL,
                       report TEXT NOT NULL,
                       created_at TEXT
                   )"#
            }
            Dialect::Sqlite => {
                r#"CREATE TABLE IF NOT EXISTS audits (
                       id INTEGER PRIMARY KEY AUTOINCREMENT,
                       code TEXT NOT NULL,
                       report TEXT NOT NULL,
                       created_at TEXT
                   )"#
            }
            Dialect::Mysql => {
                r#"CREATE TABLE IF NOT EXISTS audits (
                       id BIGINT AUTO_INCREMENT PRIMARY KEY,
                       code TEXT NOT NULL,
                       report TEXT NOT NULL,
                       created_at VARCHAR(40)
                   )"#
            }
        };

        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(())
    }

    // insert one record with a server-side timestamp
    pub async fn insert(&self, code: &str, report: &str) -> Result<(), Error> {
        // fixed-width utc so text ordering matches time ordering
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        // placeholder syntax differs per backend
        let sql = match self.dialect {
            Dialect::Postgres => {
                "INSERT INTO audits (code, report, created_at) VALUES ($1, $2, $3)"
            }
            Dialect::Sqlite | Dialect::Mysql => {
                "INSERT INTO audits (code, report, created_at) VALUES (?, ?, ?)"
            }
        };

        sqlx::query(sql)
            .bind(code)
            .bind(report)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // the most recent audits, newest first
    pub async fn recent(&self) -> Result<Vec<AuditRecord>, Error> {
        let sql = format!(
            "SELECT id, code, report, created_at FROM audits \
             ORDER BY created_at DESC LIMIT {HISTORY_LIMIT}"
        );

        let rows: Vec<(i64, String, String, Option<String>)> =
            sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(id, code, report, created_at)| AuditRecord {
                id,
                code,
                report,
                created_at,
            })
            .collect())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// figure out dialect from connection string
fn detect_dialect(url: &str) -> Dialect {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Dialect::Postgres
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Dialect::Mysql
    } else {
        Dialect::Sqlite
    }
}
