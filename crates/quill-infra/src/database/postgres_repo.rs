//! PostgreSQL repository implementations.
//!
//! Every multi-statement write runs in one `DatabaseTransaction`. Returning
//! early with `?` drops the transaction, which rolls it back.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use quill_core::domain::{
    Category, CategoryChanges, CategorySummary, NewCategory, NewPost, Post, PostChanges,
    PostFilter, PostWithCategories,
};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category;
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        let created_at: DateTimeWithTimeZone = new_post.created_at.into();
        let model = post::ActiveModel {
            title: Set(new_post.title),
            slug: Set(new_post.slug),
            content: Set(new_post.content),
            published: Set(new_post.published),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        insert_links(&txn, model.id, &new_post.category_ids).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            post_id = model.id,
            links = new_post.category_ids.len(),
            "Inserted post"
        );
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        let existing = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(content) = changes.content {
            active.content = Set(Some(content));
        }
        if let Some(published) = changes.published {
            active.published = Set(published);
        }
        active.updated_at = Set(changes.updated_at.into());

        let updated = active.update(&txn).await.map_err(map_db_err)?;

        if let Some(category_ids) = &changes.category_ids {
            post_category::Entity::delete_many()
                .filter(post_category::Column::PostId.eq(id))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            insert_links(&txn, id, category_ids).await?;
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        post_category::Entity::delete_many()
            .filter(post_category::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        if result.rows_affected == 0 {
            tracing::debug!(post_id = id, "Delete matched no post");
        }
        Ok(())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostWithCategories>, RepoError> {
        let mut query = PostEntity::find();

        if let Some(category_id) = filter.category_id {
            query = query.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_category::Column::PostId)
                        .from(post_category::Entity)
                        .and_where(post_category::Column::CategoryId.eq(category_id))
                        .to_owned(),
                ),
            );
        }

        if let Some(term) = filter.search() {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Title))))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }

        let posts = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        with_categories(self.conn(), posts).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithCategories>, RepoError> {
        let Some(model) = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.conn())
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(with_categories(self.conn(), vec![model]).await?.pop())
    }

    async fn find_with_category_ids(
        &self,
        id: i32,
    ) -> Result<Option<(Post, Vec<i32>)>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let category_ids = post_category::Entity::find()
            .filter(post_category::Column::PostId.eq(id))
            .order_by_asc(post_category::Column::CategoryId)
            .all(self.conn())
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|link| link.category_id)
            .collect();

        Ok(Some((model.into(), category_ids)))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn insert(&self, new_category: NewCategory) -> Result<Category, RepoError> {
        let model = category::ActiveModel {
            name: Set(new_category.name),
            slug: Set(new_category.slug),
            description: Set(new_category.description),
            ..Default::default()
        }
        .insert(self.conn())
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: CategoryChanges) -> Result<Category, RepoError> {
        let existing = CategoryEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        if changes.is_empty() {
            return Ok(existing.into());
        }

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }

        let updated = active.update(self.conn()).await.map_err(map_db_err)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        let unlinked = post_category::Entity::delete_many()
            .filter(post_category::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        CategoryEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            category_id = id,
            unlinked_posts = unlinked.rows_affected,
            "Deleted category"
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_desc(category::Column::Name)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

async fn insert_links<C>(conn: &C, post_id: i32, category_ids: &[i32]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    if category_ids.is_empty() {
        return Ok(());
    }

    post_category::Entity::insert_many(post_category::links_for(post_id, category_ids))
        .exec_without_returning(conn)
        .await
        .map_err(map_db_err)?;

    Ok(())
}

/// Attach linked categories to each post with one junction query.
async fn with_categories<C>(
    conn: &C,
    posts: Vec<post::Model>,
) -> Result<Vec<PostWithCategories>, RepoError>
where
    C: ConnectionTrait,
{
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let rows = post_category::Entity::find()
        .filter(post_category::Column::PostId.is_in(post_ids))
        .order_by_asc(post_category::Column::CategoryId)
        .find_also_related(CategoryEntity)
        .all(conn)
        .await
        .map_err(map_db_err)?;

    let mut by_post: HashMap<i32, Vec<CategorySummary>> = HashMap::new();
    for (link, category) in rows {
        if let Some(category) = category {
            by_post.entry(link.post_id).or_default().push(category.into());
        }
    }

    Ok(posts
        .into_iter()
        .map(|model| {
            let categories = by_post.remove(&model.id).unwrap_or_default();
            PostWithCategories {
                post: model.into(),
                categories,
            }
        })
        .collect())
}

/// Escape LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
