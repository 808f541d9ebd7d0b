use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::{error::StoreError, users::repo::UserProfile};

/// Post record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64, // owner, fixed at creation
    pub published: OffsetDateTime,
    pub updated: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: UserProfile,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

/// Flat row of a post joined with its author.
#[derive(Debug, FromRow)]
struct PostAuthorRow {
    id: i64,
    title: String,
    content: String,
    user_id: i64,
    published: OffsetDateTime,
    updated: OffsetDateTime,
    author_display_name: String,
    author_email: String,
    author_image: Option<String>,
}

impl From<PostAuthorRow> for PostWithAuthor {
    fn from(r: PostAuthorRow) -> Self {
        Self {
            author: UserProfile {
                id: r.user_id,
                display_name: r.author_display_name,
                email: r.author_email,
                image: r.author_image,
            },
            post: Post {
                id: r.id,
                title: r.title,
                content: r.content,
                user_id: r.user_id,
                published: r.published,
                updated: r.updated,
            },
        }
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, StoreError>;
    async fn find_with_author(&self, id: i64) -> Result<Option<PostWithAuthor>, StoreError>;
    async fn list(&self) -> Result<Vec<PostWithAuthor>, StoreError>;
    /// Posts whose title or content contains `query` (case-sensitive). An
    /// empty query matches every post.
    async fn find_matching(&self, query: &str) -> Result<Vec<PostWithAuthor>, StoreError>;
    async fn create(&self, new: NewPost) -> Result<Post, StoreError>;
    /// Replaces title and content and refreshes `updated`. `None` if the
    /// post no longer exists.
    async fn update(&self, id: i64, title: &str, content: &str)
        -> Result<Option<Post>, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.content, p.user_id, p.published, p.updated,
           u.display_name AS author_display_name,
           u.email        AS author_email,
           u.image        AS author_image
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

#[derive(Clone)]
pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, user_id, published, updated
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn find_with_author(&self, id: i64) -> Result<Option<PostWithAuthor>, StoreError> {
        let row = sqlx::query_as::<_, PostAuthorRow>(&format!(
            "{SELECT_WITH_AUTHOR} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(PostWithAuthor::from))
    }

    async fn list(&self) -> Result<Vec<PostWithAuthor>, StoreError> {
        let rows = sqlx::query_as::<_, PostAuthorRow>(&format!(
            "{SELECT_WITH_AUTHOR} ORDER BY p.id ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn find_matching(&self, query: &str) -> Result<Vec<PostWithAuthor>, StoreError> {
        // strpos is case-sensitive and takes the query literally (no LIKE wildcards)
        let rows = sqlx::query_as::<_, PostAuthorRow>(&format!(
            "{SELECT_WITH_AUTHOR} WHERE strpos(p.title, $1) > 0 OR strpos(p.content, $1) > 0 \
             ORDER BY p.id ASC"
        ))
        .bind(query)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn create(&self, new: NewPost) -> Result<Post, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, user_id, published, updated
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(post)
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
               SET title = $2, content = $3, updated = now()
             WHERE id = $1
            RETURNING id, title, content, user_id, published, updated
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
