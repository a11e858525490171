use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::review::{GameReview, Review, UserReview};
use uuid::Uuid;

/// The DO UPDATE list deliberately omits `created_at`: an overwrite keeps
/// the timestamp of the first submission.
const UPSERT_REVIEW_SQL: &str = r#"
    INSERT INTO review (user_id, game_id, rating, review_text)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id, game_id)
    DO UPDATE SET rating = EXCLUDED.rating, review_text = EXCLUDED.review_text
    RETURNING id, user_id, game_id, rating, review_text, created_at
"#;

impl PostgresRepository {
    /// Insert a review, or overwrite rating and text in place when the user
    /// has already reviewed this game. `created_at` keeps the time of the
    /// first submission; only the content is replaced.
    pub async fn upsert_review(&self, user_id: &Uuid, game_id: &Uuid, rating: i32, review_text: Option<&str>) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(UPSERT_REVIEW_SQL)
            .bind(user_id)
            .bind(game_id)
            .bind(rating)
            .bind(review_text)
            .fetch_one(&self.pool)
            .await?;

        Ok(review)
    }

    /// All reviews for a game, looked up by its external catalog id and
    /// joined with the reviewer's name, newest first.
    pub async fn list_reviews_for_game(&self, game_api_id: i64) -> Result<Vec<GameReview>, AppError> {
        let reviews = sqlx::query_as::<_, GameReview>(
            r#"
            SELECT r.id, r.rating, r.review_text, r.created_at,
                   u.id AS user_id, u.name AS user_name
            FROM review r
            JOIN users u ON u.id = r.user_id
            JOIN game g ON g.id = r.game_id
            WHERE g.api_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(game_api_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// A user's review history joined with game metadata, newest first.
    pub async fn list_reviews_for_user(&self, user_id: &Uuid) -> Result<Vec<UserReview>, AppError> {
        let reviews = sqlx::query_as::<_, UserReview>(
            r#"
            SELECT r.id, r.rating, r.review_text, r.created_at,
                   g.api_id AS game_api_id, g.title AS game_title, g.cover_url AS game_cover_url
            FROM review r
            JOIN game g ON g.id = r.game_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_never_touches_created_at() {
        let update_list = UPSERT_REVIEW_SQL
            .split("DO UPDATE SET")
            .nth(1)
            .and_then(|rest| rest.split("RETURNING").next())
            .expect("upsert statement has a DO UPDATE SET clause");
        assert!(update_list.contains("rating"));
        assert!(update_list.contains("review_text"));
        assert!(!update_list.contains("created_at"));
    }

    // Needs a live Postgres; run with:
    //   DATABASE_URL=postgresql://... cargo test -- --ignored
    #[rocket::async_test]
    #[ignore = "requires a Postgres instance at DATABASE_URL"]
    async fn double_submission_keeps_one_row_and_its_timestamp() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = sqlx::PgPool::connect(&url).await.expect("connect");
        sqlx::migrate!().run(&pool).await.expect("migrate");
        let repo = PostgresRepository { pool };

        let email = format!("reviewer-{}@example.com", Uuid::new_v4());
        let user = repo.create_user("Reviewer", &email, "hunter2").await.expect("create user");
        let api_id = Uuid::new_v4().as_u128() as i64;
        let game = repo.resolve_game(api_id, "Outer Wilds", None).await.expect("resolve game");

        let first = repo.upsert_review(&user.id, &game.id, 3, Some("fine")).await.expect("first submit");
        let second = repo.upsert_review(&user.id, &game.id, 5, Some("a masterpiece")).await.expect("second submit");

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.rating, 5);
        assert_eq!(second.review_text.as_deref(), Some("a masterpiece"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM review WHERE user_id = $1 AND game_id = $2")
            .bind(user.id)
            .bind(game.id)
            .fetch_one(&repo.pool)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }
}
