use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::parse_role;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const SELECT_USER: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name, u.user_type,
           u.created_at, u.updated_at, t.token, t.refresh_token
    FROM users u
    LEFT JOIN user_tokens t ON t.user_id = u.id
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User, UserError> {
        let column = |e: sqlx::Error| UserError::DatabaseError(e.to_string());
        let user_type: String = row.try_get("user_type").map_err(column)?;

        Ok(User {
            id: UserId(row.try_get("id").map_err(column)?),
            email: EmailAddress::new(row.try_get("email").map_err(column)?)?,
            password_hash: row.try_get("password_hash").map_err(column)?,
            first_name: PersonName::first(row.try_get("first_name").map_err(column)?)?,
            last_name: PersonName::last(row.try_get("last_name").map_err(column)?)?,
            role: parse_role(&user_type)?,
            token: row.try_get("token").map_err(column)?,
            refresh_token: row.try_get("refresh_token").map_err(column)?,
            created_at: row.try_get("created_at").map_err(column)?,
            updated_at: row.try_get("updated_at").map_err(column)?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, user_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                    return UserError::EmailAlreadyExists(user.email.to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("{} WHERE u.id = $1", SELECT_USER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("{} WHERE u.email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("{} WHERE t.refresh_token = $1", SELECT_USER))
            .bind(refresh_token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query(&format!("{} ORDER BY u.created_at DESC", SELECT_USER))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_user).collect()
    }

    async fn update_tokens(
        &self,
        id: &UserId,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let result = sqlx::query("UPDATE users SET updated_at = $2 WHERE id = $1")
            .bind(id.0)
            .bind(updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, token, refresh_token, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token,
                refresh_token = EXCLUDED.refresh_token,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(id.0)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}
