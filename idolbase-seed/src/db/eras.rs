//! Era persistence
//!
//! Eras partition the group's history into named date ranges; albums reference
//! them by name during seeding.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Era record (named date range, open-ended while ongoing)
#[derive(Debug, Clone)]
pub struct Era {
    pub guid: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

/// Insert an era row. Fails on a duplicate name (UNIQUE constraint) or an
/// end date before the start date (CHECK constraint).
pub async fn insert_era(conn: &mut SqliteConnection, era: &Era) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO eras (guid, name, start_date, end_date, description)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(era.guid.to_string())
    .bind(&era.name)
    .bind(era.start_date)
    .bind(era.end_date)
    .bind(&era.description)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load an era by name
pub async fn load_era_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Era>> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, start_date, end_date, description
        FROM eras
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");

            Ok(Some(Era {
                guid: Uuid::parse_str(&guid_str)?,
                name: row.get("name"),
                start_date: row.get("start_date"),
                end_date: row.get("end_date"),
                description: row.get("description"),
            }))
        }
        None => Ok(None),
    }
}

/// Natural-key index of existing eras (name -> guid)
pub async fn name_index(pool: &SqlitePool) -> Result<Vec<(String, Uuid)>> {
    let rows = sqlx::query("SELECT name, guid FROM eras")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let guid: String = row.get("guid");
            Ok((row.get("name"), Uuid::parse_str(&guid)?))
        })
        .collect()
}

/// Count era rows (idempotency gate signal)
pub async fn count_eras(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM eras")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        idolbase_common::db::create_eras_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_load_era() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let era = Era {
            guid: Uuid::new_v4(),
            name: "Wings Era".to_string(),
            start_date: NaiveDate::from_ymd_opt(2016, 10, 1).unwrap(),
            end_date: None,
            description: "Second studio album promotions".to_string(),
        };
        insert_era(&mut conn, &era).await.expect("Failed to insert era");

        let loaded = load_era_by_name(&pool, "Wings Era")
            .await
            .expect("Failed to load era")
            .expect("Era not found");

        assert_eq!(loaded.guid, era.guid);
        assert_eq!(loaded.start_date, era.start_date);
        assert!(loaded.end_date.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let era = Era {
            guid: Uuid::new_v4(),
            name: "Wings Era".to_string(),
            start_date: NaiveDate::from_ymd_opt(2016, 10, 1).unwrap(),
            end_date: None,
            description: String::new(),
        };
        insert_era(&mut conn, &era).await.unwrap();

        let dup = Era { guid: Uuid::new_v4(), ..era };
        assert!(insert_era(&mut conn, &dup).await.is_err());
        assert_eq!(count_eras(&pool).await.unwrap(), 1);
    }
}
