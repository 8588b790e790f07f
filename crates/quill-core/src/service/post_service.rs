use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    CreatePost, NewPost, Post, PostChanges, PostEditView, PostFilter, PostWithCategories,
    UpdatePost, dedup_ids,
};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;
use crate::slug::slugify;

use super::{internal, require_min_chars};

pub const MIN_TITLE_LEN: usize = 3;

/// Post mutations and queries.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a post, linking it to the given categories in the same write.
    pub async fn create_post(&self, input: CreatePost) -> Result<Post, DomainError> {
        require_min_chars("Title", &input.title, MIN_TITLE_LEN)?;

        let category_ids = dedup_ids(input.category_ids.unwrap_or_default());
        let new_post = NewPost {
            slug: slugify(&input.title),
            title: input.title,
            content: input.content,
            published: input.published,
            category_ids: category_ids.clone(),
            created_at: Utc::now(),
        };

        let post = self
            .repo
            .insert(new_post)
            .await
            .map_err(|e| write_error(e, None, &category_ids))?;

        tracing::info!(post_id = post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Apply a partial update. `updated_at` is refreshed even when no field
    /// changes.
    pub async fn update_post(&self, id: i32, input: UpdatePost) -> Result<Post, DomainError> {
        if let Some(title) = &input.title {
            require_min_chars("Title", title, MIN_TITLE_LEN)?;
        }

        let category_ids = input.category_ids.map(dedup_ids);
        let changes = PostChanges {
            slug: input.title.as_deref().map(slugify),
            title: input.title,
            content: input.content,
            published: input.published,
            category_ids: category_ids.clone(),
            updated_at: Utc::now(),
        };

        let post = self
            .repo
            .update(id, changes)
            .await
            .map_err(|e| write_error(e, Some(id), category_ids.as_deref().unwrap_or_default()))?;

        tracing::info!(post_id = post.id, slug = %post.slug, "Post updated");
        Ok(post)
    }

    /// Delete a post and its category links. Succeeds for unknown ids.
    pub async fn delete_post(&self, id: i32) -> Result<(), DomainError> {
        self.repo.delete(id).await.map_err(internal)?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    pub async fn list_posts(
        &self,
        filter: PostFilter,
    ) -> Result<Vec<PostWithCategories>, DomainError> {
        self.repo.list(&filter).await.map_err(internal)
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<PostWithCategories, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await
            .map_err(internal)?
            .ok_or_else(|| DomainError::not_found("Post", slug))
    }

    /// The lighter edit-form shape: category ids instead of full categories.
    pub async fn get_post_by_id(&self, id: i32) -> Result<PostEditView, DomainError> {
        let (post, category_ids) = self
            .repo
            .find_with_category_ids(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        Ok(PostEditView::new(post, category_ids))
    }
}

fn write_error(err: RepoError, id: Option<i32>, category_ids: &[i32]) -> DomainError {
    match err {
        RepoError::NotFound => {
            DomainError::not_found("Post", id.map_or_else(String::new, |id| id.to_string()))
        }
        RepoError::Constraint(_) => {
            DomainError::Conflict("A post with this title or slug already exists.".to_string())
        }
        RepoError::ForeignKey(_) => DomainError::not_found("Category", format!("{category_ids:?}")),
        other => internal(other),
    }
}
