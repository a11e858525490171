use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for submitting or updating a review. The game metadata travels
/// with the request so the game row can be created lazily on first review.
/// The rating domain (1-5) is a client convention and is not enforced here.
#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ReviewRequest {
    pub game_api_id: i64,

    #[validate(length(min = 1))]
    pub game_title: String,

    pub game_cover_url: Option<String>,

    pub rating: i32,

    pub review_text: Option<String>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewResponse {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            game_id: review.game_id,
            rating: review.rating,
            review_text: review.review_text.clone(),
            created_at: review.created_at,
        }
    }
}

/// A review joined with its author, as listed on a game page.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameReview {
    pub id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct GameReviewResponse {
    pub id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
}

impl From<&GameReview> for GameReviewResponse {
    fn from(review: &GameReview) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            review_text: review.review_text.clone(),
            created_at: review.created_at,
            user_id: review.user_id,
            user_name: review.user_name.clone(),
        }
    }
}

/// A review joined with its game, as listed on a user's history.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserReview {
    pub id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub game_api_id: i64,
    pub game_title: String,
    pub game_cover_url: Option<String>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct UserReviewResponse {
    pub id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub game_api_id: i64,
    pub game_title: String,
    pub game_cover_url: Option<String>,
}

impl From<&UserReview> for UserReviewResponse {
    fn from(review: &UserReview) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            review_text: review.review_text.clone(),
            created_at: review.created_at,
            game_api_id: review.game_api_id,
            game_title: review.game_title.clone(),
            game_cover_url: review.game_cover_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_request_requires_game_and_rating() {
        // Missing rating must fail at deserialization, before any handler runs.
        let missing_rating = serde_json::json!({
            "game_api_id": 42,
            "game_title": "Outer Wilds"
        });
        assert!(serde_json::from_value::<ReviewRequest>(missing_rating).is_err());

        let missing_game = serde_json::json!({
            "game_title": "Outer Wilds",
            "rating": 5
        });
        assert!(serde_json::from_value::<ReviewRequest>(missing_game).is_err());
    }

    #[test]
    fn review_request_text_is_optional() {
        let payload = serde_json::json!({
            "game_api_id": 42,
            "game_title": "Outer Wilds",
            "rating": 5
        });
        let request: ReviewRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.rating, 5);
        assert!(request.review_text.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn review_request_rejects_empty_title() {
        let request = ReviewRequest {
            game_api_id: 42,
            game_title: "".to_string(),
            game_cover_url: None,
            rating: 3,
            review_text: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn out_of_range_rating_is_not_rejected() {
        // The 1-5 domain is a client convention, deliberately not enforced.
        let request = ReviewRequest {
            game_api_id: 42,
            game_title: "Outer Wilds".to_string(),
            game_cover_url: None,
            rating: 11,
            review_text: None,
        };
        assert!(request.validate().is_ok());
    }
}
