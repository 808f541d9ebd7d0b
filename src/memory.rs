//! In-process stores used by tests in place of Postgres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    auth::password::hash_password,
    error::StoreError,
    posts::repo::{NewPost, Post, PostStore, PostWithAuthor},
    users::repo::{NewUser, User, UserProfile, UserStore},
};

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    last_user_id: i64,
    last_post_id: i64,
}

impl Inner {
    fn with_author(&self, post: &Post) -> Option<PostWithAuthor> {
        let author = self.users.get(&post.user_id)?.clone();
        Some(PostWithAuthor {
            post: post.clone(),
            author: author.into(),
        })
    }

    fn posts_where(&self, keep: impl Fn(&Post) -> bool) -> Vec<PostWithAuthor> {
        self.posts
            .values()
            .filter(|p| keep(*p))
            .filter_map(|p| self.with_author(p))
            .collect()
    }
}

/// Both stores over one map pair, with ids handed out from 1 like a
/// `BIGSERIAL` column.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub async fn seed_user(&self, display_name: &str, email: &str, password: &str) -> User {
        let password_hash = hash_password(password).expect("hash");
        UserStore::create(
            self,
            NewUser {
                display_name: display_name.to_string(),
                email: email.to_string(),
                password_hash,
                image: None,
            },
        )
        .await
        .expect("seed user")
    }

    pub async fn user_count(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    pub async fn post_count(&self) -> usize {
        self.inner.lock().await.posts.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn exists_email(&self, email: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().any(|u| u.email == email))
    }

    async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().cloned().map(UserProfile::from).collect())
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            display_name: new.display_name,
            email: new.email,
            password_hash: new.password_hash,
            image: new.image,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.users.remove(&id);
        inner.posts.retain(|_, p| p.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        Ok(self.inner.lock().await.posts.get(&id).cloned())
    }

    async fn find_with_author(&self, id: i64) -> Result<Option<PostWithAuthor>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.posts.get(&id).and_then(|p| inner.with_author(p)))
    }

    async fn list(&self) -> Result<Vec<PostWithAuthor>, StoreError> {
        Ok(self.inner.lock().await.posts_where(|_| true))
    }

    async fn find_matching(&self, query: &str) -> Result<Vec<PostWithAuthor>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.posts_where(|p| p.title.contains(query) || p.content.contains(query)))
    }

    async fn create(&self, new: NewPost) -> Result<Post, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.last_post_id += 1;
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: inner.last_post_id,
            title: new.title,
            content: new.content,
            user_id: new.user_id,
            published: now,
            updated: now,
        };
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(post) = inner.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = title.to_string();
        post.content = content.to_string();
        post.updated = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.lock().await.posts.remove(&id);
        Ok(())
    }
}
