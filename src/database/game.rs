use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::game::Game;

impl PostgresRepository {
    /// Insert-or-fetch a game by its external catalog id in one statement.
    ///
    /// Two users reviewing the same game for the first time race on the
    /// insert; `ON CONFLICT DO NOTHING` plus the fallback select makes the
    /// loser see the winner's row instead of failing or duplicating. Title
    /// and cover are fixed by whichever request wins.
    pub async fn resolve_game(&self, api_id: i64, title: &str, cover_url: Option<&str>) -> Result<Game, AppError> {
        let game = sqlx::query_as::<_, Game>(
            r#"
            WITH inserted AS (
                INSERT INTO game (api_id, title, cover_url)
                VALUES ($1, $2, $3)
                ON CONFLICT (api_id) DO NOTHING
                RETURNING id, api_id, title, cover_url, created_at
            )
            SELECT id, api_id, title, cover_url, created_at FROM inserted
            UNION ALL
            SELECT id, api_id, title, cover_url, created_at FROM game WHERE api_id = $1
            LIMIT 1
            "#,
        )
        .bind(api_id)
        .bind(title)
        .bind(cover_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(game)
    }
}
