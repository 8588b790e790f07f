//! Procedure inputs and small outputs. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Input of `post.create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub published: bool,
}

/// Input of `post.getAll`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsInput {
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Input of `post.update`. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    pub id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    /// Present (even empty) replaces every category link.
    #[serde(default)]
    pub category_ids: Option<Vec<i32>>,
}

/// Input of `category.create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input of `category.update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input of the `getBySlug` procedures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugInput {
    pub slug: String,
}

/// Input of `post.getById` and the delete procedures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdInput {
    pub id: i32,
}

/// Output of the delete procedures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_defaults_to_unpublished() {
        let input: CreatePostInput = serde_json::from_str(r#"{"title":"Hello"}"#).unwrap();
        assert!(!input.published);
        assert!(input.category_ids.is_none());
    }

    #[test]
    fn update_distinguishes_empty_from_absent_categories() {
        let cleared: UpdatePostInput =
            serde_json::from_str(r#"{"id":1,"categoryIds":[]}"#).unwrap();
        let untouched: UpdatePostInput = serde_json::from_str(r#"{"id":1}"#).unwrap();

        assert_eq!(cleared.category_ids, Some(vec![]));
        assert_eq!(untouched.category_ids, None);
    }
}
