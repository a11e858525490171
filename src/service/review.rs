use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::review::{Review, ReviewRequest};
use uuid::Uuid;

/// Two-step review write: resolve the game row (insert-or-fetch by external
/// catalog id), then insert-or-update the caller's review for it. Each step
/// is a single atomic statement; the pair is deliberately not wrapped in a
/// transaction, so the worst partial outcome is a game row without a review.
pub struct ReviewService<'a> {
    pub repo: &'a PostgresRepository,
}

impl<'a> ReviewService<'a> {
    pub fn new(repo: &'a PostgresRepository) -> Self {
        Self { repo }
    }

    pub async fn submit(&self, user_id: &Uuid, request: &ReviewRequest) -> Result<Review, AppError> {
        let game = self
            .repo
            .resolve_game(request.game_api_id, &request.game_title, request.game_cover_url.as_deref())
            .await?;

        self.repo
            .upsert_review(user_id, &game.id, request.rating, request.review_text.as_deref())
            .await
    }
}
