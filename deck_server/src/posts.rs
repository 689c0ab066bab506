//! Mock social feed
//!
//! Decks can be "posted" to a public feed and liked. Posts live in memory
//! only and are gone after a restart.

use chrono::{DateTime, Utc};
use deck_common::Deck;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found: {0}")]
    NotFound(String),
    #[error("Deck already posted: {0}")]
    AlreadyPosted(String),
    #[error("Post {0} belongs to another user")]
    NotOwner(String),
    #[error("Post already liked: {0}")]
    AlreadyLiked(String),
    #[error("Post not liked: {0}")]
    NotLiked(String),
}

pub type PostResult<T> = std::result::Result<T, PostError>;

/// A deck published to the feed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub file_name: String,
    pub deck_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub concept_count: usize,
    pub author: String,
    pub likes: usize,
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// In-memory list of posts, oldest first
#[derive(Debug, Default)]
pub struct PostFeed {
    posts: RwLock<Vec<Post>>,
}

impl PostFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a deck snapshot. Each author can post a given deck once.
    pub async fn publish(&self, author: &str, file_name: &str, deck: &Deck) -> PostResult<Post> {
        let mut posts = self.posts.write().await;

        if posts
            .iter()
            .any(|p| p.author == author && p.file_name == file_name)
        {
            return Err(PostError::AlreadyPosted(file_name.to_string()));
        }

        let post = Post {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            deck_id: deck.id.clone(),
            title: deck.title.clone(),
            description: deck.description.clone(),
            concept_count: deck.concepts.len(),
            author: author.to_string(),
            likes: 0,
            liked_by: Vec::new(),
            created_at: Utc::now(),
        };
        posts.push(post.clone());

        log::info!("{} posted deck {} as {}", author, file_name, post.id);
        Ok(post)
    }

    /// Remove one of the author's posts
    pub async fn unpublish(&self, author: &str, post_id: &str) -> PostResult<Post> {
        let mut posts = self.posts.write().await;

        let index = posts
            .iter()
            .position(|p| p.id == post_id)
            .ok_or_else(|| PostError::NotFound(post_id.to_string()))?;
        if posts[index].author != author {
            return Err(PostError::NotOwner(post_id.to_string()));
        }

        let post = posts.remove(index);
        log::info!("{} removed post {}", author, post_id);
        Ok(post)
    }

    /// Drop every post of a deck that no longer exists. Returns how many went.
    pub async fn remove_for_deck(&self, file_name: &str) -> usize {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.file_name != file_name);

        let removed = before - posts.len();
        if removed > 0 {
            log::info!("Removed {} post(s) of deleted deck {}", removed, file_name);
        }
        removed
    }

    pub async fn like(&self, user: &str, post_id: &str) -> PostResult<Post> {
        let mut posts = self.posts.write().await;
        let post = find_mut(&mut posts, post_id)?;

        if post.liked_by.iter().any(|u| u == user) {
            return Err(PostError::AlreadyLiked(post_id.to_string()));
        }
        post.liked_by.push(user.to_string());
        post.likes = post.liked_by.len();
        Ok(post.clone())
    }

    pub async fn unlike(&self, user: &str, post_id: &str) -> PostResult<Post> {
        let mut posts = self.posts.write().await;
        let post = find_mut(&mut posts, post_id)?;

        let index = post
            .liked_by
            .iter()
            .position(|u| u == user)
            .ok_or_else(|| PostError::NotLiked(post_id.to_string()))?;
        post.liked_by.remove(index);
        post.likes = post.liked_by.len();
        Ok(post.clone())
    }

    /// Every post, newest first
    pub async fn public(&self) -> Vec<Post> {
        self.posts.read().await.iter().rev().cloned().collect()
    }

    /// The author's posts, newest first
    pub async fn by_author(&self, author: &str) -> Vec<Post> {
        self.posts
            .read()
            .await
            .iter()
            .rev()
            .filter(|p| p.author == author)
            .cloned()
            .collect()
    }
}

fn find_mut<'a>(posts: &'a mut [Post], post_id: &str) -> PostResult<&'a mut Post> {
    posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or_else(|| PostError::NotFound(post_id.to_string()))
}
