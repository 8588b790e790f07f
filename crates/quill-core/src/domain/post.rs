use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CategorySummary;

/// Post entity - a blog post as persisted, without its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post together with every category it is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithCategories {
    #[serde(flatten)]
    pub post: Post,
    pub categories: Vec<CategorySummary>,
}

impl PostWithCategories {
    pub fn category_ids(&self) -> Vec<i32> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Edit-form shape: bare fields plus the linked category ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEditView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub category_ids: Vec<i32>,
}

impl PostEditView {
    pub fn new(post: Post, category_ids: Vec<i32>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content.unwrap_or_default(),
            published: post.published,
            category_ids,
        }
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct CreatePost {
    pub title: String,
    pub content: Option<String>,
    pub category_ids: Option<Vec<i32>>,
    pub published: bool,
}

/// Input for a partial post update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    /// `Some(vec![])` unlinks every category.
    pub category_ids: Option<Vec<i32>>,
}

/// Validated post row handed to a repository for insertion.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub published: bool,
    pub category_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
}

/// Validated partial update handed to a repository.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub category_ids: Option<Vec<i32>>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for listing posts. Both filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<i32>,
    /// Case-insensitive substring of the title.
    pub search_term: Option<String>,
}

impl PostFilter {
    /// The search term, with an empty string treated as no filter.
    pub fn search(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|term| !term.is_empty())
    }

    pub fn matches_title(&self, title: &str) -> bool {
        match self.search() {
            Some(term) => title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
