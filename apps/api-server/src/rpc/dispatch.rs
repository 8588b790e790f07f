//! Procedure dispatch: decode input, call the service, encode output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use quill_core::domain::{CreateCategory, CreatePost, PostFilter, UpdateCategory, UpdatePost};
use quill_shared::dto::{
    CreateCategoryInput, CreatePostInput, DeleteResponse, IdInput, ListPostsInput, SlugInput,
    UpdateCategoryInput, UpdatePostInput,
};

use super::Procedure;
use super::logging::logged;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Run one procedure inside the logging decorator.
pub async fn call(state: &AppState, procedure: Procedure, input: Value) -> AppResult<Value> {
    logged(
        procedure.kind(),
        procedure.path(),
        run(state, procedure, input),
    )
    .await
}

async fn run(state: &AppState, procedure: Procedure, input: Value) -> AppResult<Value> {
    match procedure {
        Procedure::PostCreate => {
            let input: CreatePostInput = decode(input)?;
            let post = state
                .posts
                .create_post(CreatePost {
                    title: input.title,
                    content: input.content,
                    category_ids: input.category_ids,
                    published: input.published,
                })
                .await?;
            encode(post)
        }
        Procedure::PostGetAll => {
            let input: ListPostsInput = decode(input)?;
            let posts = state
                .posts
                .list_posts(PostFilter {
                    category_id: input.category_id,
                    search_term: input.search_term,
                })
                .await?;
            encode(posts)
        }
        Procedure::PostGetBySlug => {
            let input: SlugInput = decode(input)?;
            encode(state.posts.get_post_by_slug(&input.slug).await?)
        }
        Procedure::PostGetById => {
            let input: IdInput = decode(input)?;
            encode(state.posts.get_post_by_id(input.id).await?)
        }
        Procedure::PostUpdate => {
            let input: UpdatePostInput = decode(input)?;
            let post = state
                .posts
                .update_post(
                    input.id,
                    UpdatePost {
                        title: input.title,
                        content: input.content,
                        published: input.published,
                        category_ids: input.category_ids,
                    },
                )
                .await?;
            encode(post)
        }
        Procedure::PostDelete => {
            let input: IdInput = decode(input)?;
            state.posts.delete_post(input.id).await?;
            encode(DeleteResponse::ok())
        }
        Procedure::CategoryCreate => {
            let input: CreateCategoryInput = decode(input)?;
            let category = state
                .categories
                .create_category(CreateCategory {
                    name: input.name,
                    description: input.description,
                })
                .await?;
            encode(category)
        }
        Procedure::CategoryGetAll => encode(state.categories.list_categories().await?),
        Procedure::CategoryGetBySlug => {
            let input: SlugInput = decode(input)?;
            encode(state.categories.get_category_by_slug(&input.slug).await?)
        }
        Procedure::CategoryUpdate => {
            let input: UpdateCategoryInput = decode(input)?;
            let category = state
                .categories
                .update_category(
                    input.id,
                    UpdateCategory {
                        name: input.name,
                        description: input.description,
                    },
                )
                .await?;
            encode(category)
        }
        Procedure::CategoryDelete => {
            let input: IdInput = decode(input)?;
            state.categories.delete_category(input.id).await?;
            encode(DeleteResponse::ok())
        }
    }
}

fn decode<T: DeserializeOwned>(input: Value) -> AppResult<T> {
    serde_json::from_value(input).map_err(|e| AppError::BadRequest(format!("Invalid input: {e}")))
}

fn encode<T: Serialize>(output: T) -> AppResult<Value> {
    serde_json::to_value(output).map_err(|e| AppError::Internal(e.to_string()))
}
