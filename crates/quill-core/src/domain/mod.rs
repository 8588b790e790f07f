//! Domain entities - the core business objects.

mod category;
mod post;

pub use category::{
    Category, CategoryChanges, CategorySummary, CreateCategory, NewCategory, UpdateCategory,
};
pub use post::{
    CreatePost, NewPost, Post, PostChanges, PostEditView, PostFilter, PostWithCategories,
    UpdatePost, dedup_ids,
};
