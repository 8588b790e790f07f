#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::database::entity::{category, post, post_category};
    use crate::database::postgres_base::{PostgresBaseRepository, map_db_err};
    use crate::database::postgres_repo::{PostgresCategoryRepository, PostgresPostRepository};
    use chrono::Utc;
    use quill_core::domain::{CategoryChanges, NewPost, PostChanges};
    use quill_core::error::RepoError;
    use quill_core::ports::{CategoryRepository, PostRepository};
    use sea_orm::{DatabaseBackend, DbErr, EntityTrait, MockDatabase, MockExecResult, RuntimeErr};

    fn post_model(id: i32, title: &str, slug: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            title: title.to_owned(),
            slug: slug.to_owned(),
            content: Some("Body".to_owned()),
            published: false,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn category_model(id: i32, name: &str) -> category::Model {
        category::Model {
            id,
            name: name.to_owned(),
            slug: name.to_lowercase(),
            description: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn changes(category_ids: Option<Vec<i32>>) -> PostChanges {
        PostChanges {
            title: Some("Renamed".into()),
            slug: Some("renamed".into()),
            content: None,
            published: Some(true),
            category_ids,
            updated_at: Utc::now(),
        }
    }

    /// SQL of every statement the repository issued, grouped by transaction.
    fn transaction_log<E: EntityTrait>(repo: PostgresBaseRepository<E>) -> Vec<Vec<String>> {
        let conn = Arc::into_inner(repo.db).expect("repository holds the only pool handle");
        conn.into_transaction_log()
            .iter()
            .map(|txn| txn.statements().iter().map(|s| s.sql.clone()).collect())
            .collect()
    }

    fn assert_statements(txn: &[String], expected: &[&str]) {
        assert_eq!(txn.len(), expected.len(), "unexpected statements: {txn:#?}");
        for (sql, prefix) in txn.iter().zip(expected) {
            assert!(sql.starts_with(prefix), "expected `{prefix}...`, got `{sql}`");
        }
    }

    const LINK_DELETE: &str = r#"DELETE FROM "posts_to_categories""#;
    const LINK_INSERT: &str = r#"INSERT INTO "posts_to_categories""#;

    #[tokio::test]
    async fn test_insert_post_with_links() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(1, "Hello World", "hello-world")]])
            .append_exec_results([exec(2)])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let post = repo
            .insert(NewPost {
                title: "Hello World".into(),
                slug: "hello-world".into(),
                content: Some("Body".into()),
                published: false,
                category_ids: vec![1, 2],
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(post.id, 1);
        assert_eq!(post.slug, "hello-world");

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(
            &log[0],
            &["BEGIN", r#"INSERT INTO "posts""#, LINK_INSERT, "COMMIT"],
        );
    }

    #[tokio::test]
    async fn test_failed_link_insert_rolls_back_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(1, "Hello World", "hello-world")]])
            .append_exec_errors([DbErr::Custom("link insert failed".into())])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let result = repo
            .insert(NewPost {
                title: "Hello World".into(),
                slug: "hello-world".into(),
                content: None,
                published: false,
                category_ids: vec![9],
                created_at: Utc::now(),
            })
            .await;

        assert!(matches!(result, Err(RepoError::Query(_))));

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(
            &log[0],
            &["BEGIN", r#"INSERT INTO "posts""#, LINK_INSERT, "ROLLBACK"],
        );
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let result = repo.update(99, changes(Some(vec![]))).await;

        assert_eq!(result.unwrap_err(), RepoError::NotFound);

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(&log[0], &["BEGIN", "SELECT", "ROLLBACK"]);
    }

    #[tokio::test]
    async fn test_update_replaces_links() {
        let mut updated = post_model(3, "Renamed", "renamed");
        updated.published = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(3, "Original", "original")]])
            .append_query_results([vec![updated]])
            .append_exec_results([exec(2), exec(1)])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let post = repo.update(3, changes(Some(vec![4]))).await.unwrap();

        assert_eq!(post.slug, "renamed");
        assert!(post.published);

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(
            &log[0],
            &[
                "BEGIN",
                "SELECT",
                r#"UPDATE "posts""#,
                LINK_DELETE,
                LINK_INSERT,
                "COMMIT",
            ],
        );
    }

    #[tokio::test]
    async fn test_update_with_empty_category_ids_only_unlinks() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(3, "Original", "original")]])
            .append_query_results([vec![post_model(3, "Renamed", "renamed")]])
            .append_exec_results([exec(2)])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        repo.update(3, changes(Some(vec![]))).await.unwrap();

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(
            &log[0],
            &["BEGIN", "SELECT", r#"UPDATE "posts""#, LINK_DELETE, "COMMIT"],
        );
    }

    #[tokio::test]
    async fn test_update_without_category_ids_keeps_links() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(3, "Original", "original")]])
            .append_query_results([vec![post_model(3, "Renamed", "renamed")]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        repo.update(3, changes(None)).await.unwrap();

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(&log[0], &["BEGIN", "SELECT", r#"UPDATE "posts""#, "COMMIT"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_post_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(0)])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        assert!(repo.delete(12345).await.is_ok());

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(
            &log[0],
            &["BEGIN", LINK_DELETE, r#"DELETE FROM "posts""#, "COMMIT"],
        );
    }

    #[tokio::test]
    async fn test_find_with_category_ids() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(5, "Edit Me", "edit-me")]])
            .append_query_results([vec![
                post_category::Model {
                    post_id: 5,
                    category_id: 1,
                },
                post_category::Model {
                    post_id: 5,
                    category_id: 2,
                },
            ]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let (post, category_ids) = repo.find_with_category_ids(5).await.unwrap().unwrap();

        assert_eq!(post.title, "Edit Me");
        assert_eq!(category_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_find_by_slug_miss() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        assert!(repo.find_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_categories() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category_model(2, "Rust"), category_model(1, "Go")]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(Arc::new(db));
        let categories = repo.list().await.unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Rust");
        assert_eq!(categories[1].slug, "go");
    }

    #[tokio::test]
    async fn test_update_category_without_changes_skips_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category_model(7, "Design")]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(Arc::new(db));
        let category = repo.update(7, CategoryChanges::default()).await.unwrap();

        assert_eq!(category.name, "Design");

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(&log[0], &["SELECT"]);
    }

    #[tokio::test]
    async fn test_delete_category_unlinks_first() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(3), exec(1)])
            .into_connection();

        let repo = PostgresCategoryRepository::new(Arc::new(db));
        assert!(repo.delete(2).await.is_ok());

        let log = transaction_log(repo);
        assert_eq!(log.len(), 1);
        assert_statements(
            &log[0],
            &["BEGIN", LINK_DELETE, r#"DELETE FROM "categories""#, "COMMIT"],
        );
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(map_db_err(DbErr::RecordNotUpdated), RepoError::NotFound);
        assert!(matches!(
            map_db_err(DbErr::Conn(RuntimeErr::Internal("refused".into()))),
            RepoError::Connection(_)
        ));
        assert!(matches!(
            map_db_err(DbErr::Custom("boom".into())),
            RepoError::Query(_)
        ));
    }
}
