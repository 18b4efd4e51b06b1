//! # Recipe Aggregate
//!
//! Line-list normalization and the derived rating arithmetic. The derived
//! fields (`rating`, `ratings_count`) are only ever written here, always
//! recomputed from the full review list so repeated mutations cannot drift.

use serde::Deserialize;
use uuid::Uuid;
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Recipe, Review, Role};
use crate::policy::Principal;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Ingredients and instructions arrive either pre-joined or as a list of
/// lines; both normalize to the stored newline-joined form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lines {
    Text(String),
    List(Vec<String>),
}

impl Lines {
    pub fn into_joined(self) -> String {
        match self {
            Lines::Text(text) => text,
            Lines::List(lines) => lines.join("\n"),
        }
    }
}

/// Expands stored text back into the list form served by the API.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

impl Recipe {
    /// Recomputes `rating` and `ratings_count` from the full review list.
    pub fn recompute_rating(&mut self) {
        self.ratings_count = self.reviews.len() as u32;
        if self.reviews.is_empty() {
            self.rating = 0.0;
        } else {
            let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
            self.rating = f64::from(total) / self.reviews.len() as f64;
        }
    }

    /// The review `user` left on this recipe, if any.
    pub fn review_by(&self, user: Uuid) -> Option<&Review> {
        self.reviews.iter().find(|r| r.user == user)
    }

    /// Appends a review and refreshes the aggregate stats.
    pub fn add_review(&mut self, user: Uuid, rating: i64, comment: String) -> Result<Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if self.review_by(user).is_some() {
            return Err(AppError::Conflict("Recipe already reviewed".to_string()));
        }
        let review = Review {
            id: Uuid::now_v7(),
            user,
            rating: rating as u8,
            comment,
            created_at: Utc::now(),
        };
        self.reviews.push(review.clone());
        self.recompute_rating();
        Ok(review)
    }

    /// Removes a review; only its author or an Admin may do so. Deletion
    /// filters the list and rewrites it, never positional mutation.
    pub fn remove_review(&mut self, review_id: Uuid, requester: &Principal) -> Result<()> {
        let review = self
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .ok_or_else(|| AppError::NotFound("Review".to_string(), review_id.to_string()))?;
        if review.user != requester.id && !requester.has_role(Role::Admin) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this review".to_string(),
            ));
        }
        self.reviews.retain(|r| r.id != review_id);
        self.recompute_rating();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe::new(
            Uuid::now_v7(),
            "Soup".to_string(),
            None,
            "water\nsalt".to_string(),
            "boil\nseason".to_string(),
            10,
            None,
        )
    }

    fn principal(id: Uuid, roles: Vec<Role>) -> Principal {
        Principal {
            id,
            username: "tester".to_string(),
            roles,
        }
    }

    #[test]
    fn lines_normalize_both_ways() {
        let list = Lines::List(vec!["water".to_string(), "salt".to_string()]);
        assert_eq!(list.into_joined(), "water\nsalt");
        let text = Lines::Text("water\nsalt".to_string());
        assert_eq!(text.into_joined(), "water\nsalt");
        assert_eq!(split_lines("water\nsalt"), vec!["water", "salt"]);
    }

    #[test]
    fn lines_deserialize_untagged() {
        let from_list: Lines = serde_json::from_str(r#"["water","salt"]"#).unwrap();
        assert_eq!(from_list.into_joined(), "water\nsalt");
        let from_text: Lines = serde_json::from_str(r#""water\nsalt""#).unwrap();
        assert_eq!(from_text.into_joined(), "water\nsalt");
    }

    #[test]
    fn rating_is_mean_of_reviews() {
        let mut r = recipe();
        r.add_review(Uuid::now_v7(), 4, "good".to_string()).unwrap();
        assert_eq!(r.rating, 4.0);
        assert_eq!(r.ratings_count, 1);

        r.add_review(Uuid::now_v7(), 5, "great".to_string()).unwrap();
        assert!((r.rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(r.ratings_count, 2);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let mut r = recipe();
        for bad in [0, 6, -1] {
            let err = r.add_review(Uuid::now_v7(), bad, "x".to_string()).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        assert!(r.reviews.is_empty());
    }

    #[test]
    fn second_review_by_same_user_conflicts() {
        let mut r = recipe();
        let reviewer = Uuid::now_v7();
        r.add_review(reviewer, 4, "good".to_string()).unwrap();
        let err = r.add_review(reviewer, 5, "again".to_string()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(r.ratings_count, 1);
    }

    #[test]
    fn removing_last_review_resets_aggregates() {
        let mut r = recipe();
        let reviewer = Uuid::now_v7();
        let review = r.add_review(reviewer, 3, "ok".to_string()).unwrap();
        r.remove_review(review.id, &principal(reviewer, vec![Role::Reader]))
            .unwrap();
        assert_eq!(r.rating, 0.0);
        assert_eq!(r.ratings_count, 0);
    }

    #[test]
    fn only_author_or_admin_may_remove() {
        let mut r = recipe();
        let author = Uuid::now_v7();
        let review = r.add_review(author, 2, "meh".to_string()).unwrap();

        let stranger = principal(Uuid::now_v7(), vec![Role::Writer]);
        let err = r.remove_review(review.id, &stranger).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(r.ratings_count, 1);

        let admin = principal(Uuid::now_v7(), vec![Role::Admin]);
        r.remove_review(review.id, &admin).unwrap();
        assert_eq!(r.ratings_count, 0);
    }

    #[test]
    fn removing_unknown_review_is_not_found() {
        let mut r = recipe();
        let err = r
            .remove_review(Uuid::now_v7(), &principal(Uuid::now_v7(), vec![Role::Admin]))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }
}
