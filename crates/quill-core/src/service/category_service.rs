use std::sync::Arc;

use crate::domain::{Category, CategoryChanges, CreateCategory, NewCategory, UpdateCategory};
use crate::error::{DomainError, RepoError};
use crate::ports::CategoryRepository;
use crate::slug::slugify;

use super::{internal, require_min_chars};

pub const MIN_NAME_LEN: usize = 2;

/// Category mutations and queries.
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_category(&self, input: CreateCategory) -> Result<Category, DomainError> {
        require_min_chars("Name", &input.name, MIN_NAME_LEN)?;

        let category = self
            .repo
            .insert(NewCategory {
                slug: slugify(&input.name),
                name: input.name,
                description: input.description,
            })
            .await
            .map_err(|e| write_error(e, None))?;

        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    /// Partial update; the slug follows the name only when a name is given.
    pub async fn update_category(
        &self,
        id: i32,
        input: UpdateCategory,
    ) -> Result<Category, DomainError> {
        if let Some(name) = &input.name {
            require_min_chars("Name", name, MIN_NAME_LEN)?;
        }

        let changes = CategoryChanges {
            slug: input.name.as_deref().map(slugify),
            name: input.name,
            description: input.description,
        };

        let category = self
            .repo
            .update(id, changes)
            .await
            .map_err(|e| write_error(e, Some(id)))?;

        tracing::info!(category_id = category.id, slug = %category.slug, "Category updated");
        Ok(category)
    }

    /// Delete a category after unlinking it from every post. Posts survive.
    pub async fn delete_category(&self, id: i32) -> Result<(), DomainError> {
        self.repo.delete(id).await.map_err(internal)?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list().await.map_err(internal)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await
            .map_err(internal)?
            .ok_or_else(|| DomainError::not_found("Category", slug))
    }
}

fn write_error(err: RepoError, id: Option<i32>) -> DomainError {
    match err {
        RepoError::NotFound => {
            DomainError::not_found("Category", id.map_or_else(String::new, |id| id.to_string()))
        }
        RepoError::Constraint(_) => DomainError::Conflict(
            "A category with this name or slug already exists.".to_string(),
        ),
        other => internal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Fails every call so a test can prove storage was never reached.
    struct UnreachableRepo;

    #[async_trait]
    impl CategoryRepository for UnreachableRepo {
        async fn insert(&self, _category: NewCategory) -> Result<Category, RepoError> {
            panic!("storage must not be reached")
        }

        async fn update(&self, _id: i32, _changes: CategoryChanges) -> Result<Category, RepoError> {
            panic!("storage must not be reached")
        }

        async fn delete(&self, _id: i32) -> Result<(), RepoError> {
            panic!("storage must not be reached")
        }

        async fn list(&self) -> Result<Vec<Category>, RepoError> {
            panic!("storage must not be reached")
        }

        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Category>, RepoError> {
            panic!("storage must not be reached")
        }
    }

    #[tokio::test]
    async fn one_character_name_is_rejected() {
        let service = CategoryService::new(Arc::new(UnreachableRepo));

        let create = service
            .create_category(CreateCategory {
                name: "x".into(),
                description: None,
            })
            .await;
        let update = service
            .update_category(
                1,
                UpdateCategory {
                    name: Some(String::new()),
                    description: None,
                },
            )
            .await;

        assert!(matches!(create, Err(DomainError::Validation(_))));
        assert!(matches!(update, Err(DomainError::Validation(_))));
    }

    #[test]
    fn constraint_violation_is_conflict() {
        let err = write_error(RepoError::Constraint("categories_name_key".into()), None);
        assert_eq!(
            err,
            DomainError::Conflict("A category with this name or slug already exists.".into())
        );
    }

    #[test]
    fn query_failure_is_internal() {
        let err = write_error(RepoError::Query("relation missing".into()), Some(1));
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
