//! Profile repository (language preference)

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ProfileRepository;

impl ProfileRepository {
    /// Stored language code, if the user has a profile
    pub async fn get_language(pool: &PgPool, user_id: Uuid) -> Result<Option<String>> {
        let language: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT language
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(language.map(|(code,)| code))
    }

    pub async fn set_language(pool: &PgPool, user_id: Uuid, language: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, language)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET language = EXCLUDED.language, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(language)
        .execute(pool)
        .await?;

        Ok(())
    }
}
