use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{UpdateUserInput, User},
    utils::sql,
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

const USER_COLUMNS: &str = r#"
    id,
    username,
    real_name,
    password_hash,
    role,
    entry_time,
    lunch_out_time,
    lunch_in_time,
    exit_time,
    schedule,
    schedule_anchor_date,
    created_at,
    updated_at
"#;

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(&sql(r#"
            INSERT INTO
                users (
                    id,
                    username,
                    real_name,
                    password_hash,
                    role,
                    entry_time,
                    lunch_out_time,
                    lunch_in_time,
                    exit_time,
                    schedule,
                    schedule_anchor_date,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.real_name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.entry_time)
        .bind(user.lunch_out_time)
        .bind(user.lunch_in_time)
        .bind(user.exit_time)
        .bind(user.schedule)
        .bind(user.schedule_anchor_date)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY real_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn update_user(&self, id: Uuid, input: &UpdateUserInput) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                real_name = $1,
                role = $2,
                entry_time = $3,
                lunch_out_time = $4,
                lunch_in_time = $5,
                exit_time = $6,
                schedule = $7,
                schedule_anchor_date = $8,
                updated_at = $9
            WHERE
                id = $10
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.real_name)
        .bind(input.role)
        .bind(input.entry_time)
        .bind(input.lunch_out_time)
        .bind(input.lunch_in_time)
        .bind(input.exit_time)
        .bind(input.schedule)
        .bind(input.schedule_anchor_date)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
