//! Device repository for database operations.
//!
//! Each mutating operation runs in a single transaction spanning the
//! `users`, `radusergroup` and `radcheck` tables. Dropping an uncommitted
//! transaction rolls it back.

use domain::models::device::{CREDENTIAL_ATTRIBUTE, CREDENTIAL_OP, DEFAULT_GROUP_PRIORITY};
use domain::models::DeviceView;
use domain::services::{DeviceStore, StoreError};
use shared::mac::format_mac_display;
use sqlx::{PgConnection, PgPool};

use crate::entities::{DeviceRowEntity, RadUserGroupEntity, UserEntity};
use crate::metrics::{record_device_mutation, QueryTimer};

/// Repository for device-related database operations.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn fetch_user(conn: &mut PgConnection, mac: &str) -> Result<Option<UserEntity>, sqlx::Error> {
    sqlx::query_as::<_, UserEntity>(
        r#"
        SELECT id, username, description
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(mac)
    .fetch_optional(conn)
    .await
}

async fn fetch_group(
    conn: &mut PgConnection,
    mac: &str,
) -> Result<Option<RadUserGroupEntity>, sqlx::Error> {
    sqlx::query_as::<_, RadUserGroupEntity>(
        r#"
        SELECT id, username, groupname, priority
        FROM radusergroup
        WHERE username = $1
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(mac)
    .fetch_optional(conn)
    .await
}

/// Maps any storage fault to a repository error naming the operation.
fn repository_error(operation: &str) -> impl Fn(sqlx::Error) -> StoreError + '_ {
    move |err| StoreError::Repository(format!("{}: {}", operation, err))
}

#[async_trait::async_trait]
impl DeviceStore for DeviceRepository {
    async fn list(&self) -> Result<Vec<DeviceView>, StoreError> {
        let timer = QueryTimer::new("list_devices");
        let rows = sqlx::query_as::<_, DeviceRowEntity>(
            r#"
            SELECT u.username, u.description, r.groupname
            FROM users u
            LEFT OUTER JOIN radusergroup r ON u.username = r.username
            ORDER BY u.username ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error("list_devices"))?;
        timer.record();

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_mac(&self, mac: &str) -> Result<DeviceView, StoreError> {
        let timer = QueryTimer::new("find_device");
        let row = sqlx::query_as::<_, DeviceRowEntity>(
            r#"
            SELECT u.username, u.description, r.groupname
            FROM users u
            LEFT OUTER JOIN radusergroup r ON u.username = r.username
            WHERE u.username = $1
            ORDER BY r.id
            LIMIT 1
            "#,
        )
        .bind(mac)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error("find_device"))?;
        timer.record();

        row.map(Into::into)
            .ok_or_else(|| StoreError::NotFound(format_mac_display(mac)))
    }

    async fn create(
        &self,
        mac: &str,
        description: Option<&str>,
        vlan_name: &str,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("create_device");
        let map_err = repository_error("create_device");

        let mut tx = self.pool.begin().await.map_err(&map_err)?;

        if fetch_user(&mut *tx, mac).await.map_err(&map_err)?.is_some() {
            return Err(StoreError::AlreadyExists(format_mac_display(mac)));
        }

        sqlx::query(
            r#"
            INSERT INTO users (username, description)
            VALUES ($1, $2)
            "#,
        )
        .bind(mac)
        .bind(description)
        .execute(&mut *tx)
        .await
        .map_err(&map_err)?;

        sqlx::query(
            r#"
            INSERT INTO radusergroup (username, groupname, priority)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(mac)
        .bind(vlan_name)
        .bind(DEFAULT_GROUP_PRIORITY)
        .execute(&mut *tx)
        .await
        .map_err(&map_err)?;

        sqlx::query(
            r#"
            INSERT INTO radcheck (username, attribute, op, value)
            VALUES ($1, $2, $3, $1)
            "#,
        )
        .bind(mac)
        .bind(CREDENTIAL_ATTRIBUTE)
        .bind(CREDENTIAL_OP)
        .execute(&mut *tx)
        .await
        .map_err(&map_err)?;

        tx.commit().await.map_err(&map_err)?;
        timer.record();
        record_device_mutation("create");
        Ok(())
    }

    async fn update(
        &self,
        mac: &str,
        description: Option<&str>,
        vlan_name: &str,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("update_device");
        let map_err = repository_error("update_device");

        let mut tx = self.pool.begin().await.map_err(&map_err)?;

        if fetch_user(&mut *tx, mac).await.map_err(&map_err)?.is_none() {
            return Err(StoreError::NotFound(format_mac_display(mac)));
        }

        sqlx::query(
            r#"
            UPDATE users
            SET description = $2
            WHERE username = $1
            "#,
        )
        .bind(mac)
        .bind(description)
        .execute(&mut *tx)
        .await
        .map_err(&map_err)?;

        match fetch_group(&mut *tx, mac).await.map_err(&map_err)? {
            Some(group) => {
                sqlx::query(
                    r#"
                    UPDATE radusergroup
                    SET groupname = $2
                    WHERE id = $1
                    "#,
                )
                .bind(group.id)
                .bind(vlan_name)
                .execute(&mut *tx)
                .await
                .map_err(&map_err)?;
            }
            None => {
                tracing::info!(mac = %mac, "Device had no group membership, inserting one");
                sqlx::query(
                    r#"
                    INSERT INTO radusergroup (username, groupname, priority)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(mac)
                .bind(vlan_name)
                .bind(DEFAULT_GROUP_PRIORITY)
                .execute(&mut *tx)
                .await
                .map_err(&map_err)?;
            }
        }

        tx.commit().await.map_err(&map_err)?;
        timer.record();
        record_device_mutation("update");
        Ok(())
    }

    async fn delete(&self, mac: &str) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_device");
        let map_err = repository_error("delete_device");

        let mut tx = self.pool.begin().await.map_err(&map_err)?;

        if fetch_user(&mut *tx, mac).await.map_err(&map_err)?.is_none() {
            return Err(StoreError::NotFound(format_mac_display(mac)));
        }

        for statement in [
            "DELETE FROM radcheck WHERE username = $1",
            "DELETE FROM radusergroup WHERE username = $1",
            "DELETE FROM users WHERE username = $1",
        ] {
            sqlx::query(statement)
                .bind(mac)
                .execute(&mut *tx)
                .await
                .map_err(&map_err)?;
        }

        tx.commit().await.map_err(&map_err)?;
        timer.record();
        record_device_mutation("delete");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(repository_error("ping"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_names_operation() {
        let err = repository_error("create_device")(sqlx::Error::PoolTimedOut);
        match err {
            StoreError::Repository(msg) => assert!(msg.starts_with("create_device: ")),
            other => panic!("Expected Repository error, got {:?}", other),
        }
    }
}
