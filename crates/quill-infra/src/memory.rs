//! In-memory blog store - used when no database is configured, and as a
//! storage double in tests.
//!
//! Mirrors the relational constraints of the PostgreSQL schema: unique post
//! slugs, unique category names and slugs, and links that may only reference
//! existing rows. Each operation runs under one write lock and validates
//! before mutating, so a failed write leaves no partial state behind.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{
    Category, CategoryChanges, CategorySummary, NewCategory, NewPost, Post, PostChanges,
    PostFilter, PostWithCategories,
};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostRepository};

#[derive(Default)]
struct StoreState {
    posts: BTreeMap<i32, Post>,
    categories: BTreeMap<i32, Category>,
    /// `(post_id, category_id)` pairs.
    links: BTreeSet<(i32, i32)>,
    last_post_id: i32,
    last_category_id: i32,
}

impl StoreState {
    fn check_categories_exist(&self, category_ids: &[i32]) -> Result<(), RepoError> {
        match category_ids
            .iter()
            .find(|id| !self.categories.contains_key(id))
        {
            Some(missing) => Err(RepoError::ForeignKey(format!(
                "category {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }

    fn check_post_slug_free(&self, slug: &str, except: Option<i32>) -> Result<(), RepoError> {
        let taken = self
            .posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except);
        if taken {
            return Err(RepoError::Constraint(format!("post slug `{slug}` exists")));
        }
        Ok(())
    }

    fn check_category_free(
        &self,
        name: Option<&str>,
        slug: Option<&str>,
        except: Option<i32>,
    ) -> Result<(), RepoError> {
        let taken = self.categories.values().any(|c| {
            Some(c.id) != except
                && (name == Some(c.name.as_str()) || slug == Some(c.slug.as_str()))
        });
        if taken {
            return Err(RepoError::Constraint(
                "category name or slug exists".to_string(),
            ));
        }
        Ok(())
    }

    fn replace_links(&mut self, post_id: i32, category_ids: &[i32]) {
        self.links.retain(|(p, _)| *p != post_id);
        self.links
            .extend(category_ids.iter().map(|&category_id| (post_id, category_id)));
    }

    fn category_ids_for(&self, post_id: i32) -> Vec<i32> {
        self.links
            .range((post_id, i32::MIN)..=(post_id, i32::MAX))
            .map(|&(_, category_id)| category_id)
            .collect()
    }

    fn with_categories(&self, post: &Post) -> PostWithCategories {
        let categories = self
            .category_ids_for(post.id)
            .into_iter()
            .filter_map(|id| self.categories.get(&id))
            .cloned()
            .map(CategorySummary::from)
            .collect();

        PostWithCategories {
            post: post.clone(),
            categories,
        }
    }
}

/// Shared in-memory storage implementing both repositories.
///
/// Clones share state, so the same store can back a `PostService` and a
/// `CategoryService`. Data is lost on process restart.
#[derive(Clone, Default)]
pub struct InMemoryBlogStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of post/category links currently stored.
    pub async fn link_count(&self) -> usize {
        self.state.read().await.links.len()
    }

    /// Links pointing at `category_id`.
    pub async fn links_to_category(&self, category_id: i32) -> usize {
        self.state
            .read()
            .await
            .links
            .iter()
            .filter(|(_, c)| *c == category_id)
            .count()
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        state.check_post_slug_free(&new_post.slug, None)?;
        state.check_categories_exist(&new_post.category_ids)?;

        state.last_post_id += 1;
        let post = Post {
            id: state.last_post_id,
            title: new_post.title,
            slug: new_post.slug,
            content: new_post.content,
            published: new_post.published,
            created_at: new_post.created_at,
            updated_at: new_post.created_at,
        };

        state.posts.insert(post.id, post.clone());
        state.replace_links(post.id, &new_post.category_ids);
        Ok(post)
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if let Some(slug) = &changes.slug {
            state.check_post_slug_free(slug, Some(id))?;
        }
        if let Some(category_ids) = &changes.category_ids {
            state.check_categories_exist(category_ids)?;
            state.replace_links(id, category_ids);
        }

        let post = state.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(slug) = changes.slug {
            post.slug = slug;
        }
        if let Some(content) = changes.content {
            post.content = Some(content);
        }
        if let Some(published) = changes.published {
            post.published = published;
        }
        post.updated_at = changes.updated_at;

        Ok(post.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.links.retain(|(p, _)| *p != id);
        state.posts.remove(&id);
        Ok(())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostWithCategories>, RepoError> {
        let state = self.state.read().await;

        let mut posts: Vec<&Post> = state
            .posts
            .values()
            .filter(|p| {
                filter
                    .category_id
                    .is_none_or(|c| state.links.contains(&(p.id, c)))
            })
            .filter(|p| filter.matches_title(&p.title))
            .collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(posts.into_iter().map(|p| state.with_categories(p)).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithCategories>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .find(|p| p.slug == slug)
            .map(|p| state.with_categories(p)))
    }

    async fn find_with_category_ids(
        &self,
        id: i32,
    ) -> Result<Option<(Post, Vec<i32>)>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .get(&id)
            .map(|p| (p.clone(), state.category_ids_for(id))))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryBlogStore {
    async fn insert(&self, new_category: NewCategory) -> Result<Category, RepoError> {
        let mut state = self.state.write().await;
        state.check_category_free(
            Some(new_category.name.as_str()),
            Some(new_category.slug.as_str()),
            None,
        )?;

        state.last_category_id += 1;
        let category = Category {
            id: state.last_category_id,
            name: new_category.name,
            slug: new_category.slug,
            description: new_category.description,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i32, changes: CategoryChanges) -> Result<Category, RepoError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        state.check_category_free(changes.name.as_deref(), changes.slug.as_deref(), Some(id))?;

        let category = state.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(slug) = changes.slug {
            category.slug = slug;
        }
        if let Some(description) = changes.description {
            category.description = Some(description);
        }

        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.links.retain(|(_, c)| *c != id);
        state.categories.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let state = self.state.read().await;
        Ok(state.categories.values().find(|c| c.slug == slug).cloned())
    }
}
