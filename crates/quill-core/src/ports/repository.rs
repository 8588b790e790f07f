use async_trait::async_trait;

use crate::domain::{
    Category, CategoryChanges, NewCategory, NewPost, Post, PostChanges, PostFilter,
    PostWithCategories,
};
use crate::error::RepoError;

/// Post storage.
///
/// Every write that touches more than one row must be atomic: implementations
/// either apply the post row and all of its category links, or nothing.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and link it to `post.category_ids`.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Apply a partial update. When `changes.category_ids` is set, the post's
    /// links are replaced wholesale. Returns `RepoError::NotFound` for an
    /// unknown id.
    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;

    /// Remove a post and its links. Unknown ids are not an error.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// Posts matching `filter`, newest first, with their categories attached.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostWithCategories>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithCategories>, RepoError>;

    /// A post and the ids of the categories linked to it.
    async fn find_with_category_ids(&self, id: i32)
    -> Result<Option<(Post, Vec<i32>)>, RepoError>;
}

/// Category storage.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: NewCategory) -> Result<Category, RepoError>;

    /// Returns `RepoError::NotFound` for an unknown id.
    async fn update(&self, id: i32, changes: CategoryChanges) -> Result<Category, RepoError>;

    /// Remove a category and every link to it. Linked posts are kept.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// All categories, ordered by name descending.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}
