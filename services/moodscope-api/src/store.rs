//! In-memory post store
//!
//! Holds the most recent enriched posts, newest first, behind an RwLock so
//! concurrent scrape jobs and readers don't block each other for long.
//! Bounded: inserting into a full store drops the oldest entries. The rest
//! of the service treats this as the persistence collaborator — nothing in
//! the collection core knows it exists.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use serde::Serialize;

/// One stored post: the canonical record plus everything the pipeline
/// derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredPost {
    pub tweet_id: String,
    pub username: String,
    pub display_name: String,
    pub date: String,
    pub text: String,
    pub cleaned_text: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub topics: Vec<String>,
    pub like_count: u64,
    pub retweet_count: u64,
    pub stored_at: String,
}

pub struct PostStore {
    capacity: usize,
    posts: RwLock<VecDeque<StoredPost>>,
}

impl PostStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            posts: RwLock::new(VecDeque::new()),
        }
    }

    /// Insert a post at the front, evicting the oldest past capacity.
    pub fn insert(&self, post: StoredPost) {
        let mut posts = self
            .posts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        posts.push_front(post);
        posts.truncate(self.capacity);
    }

    /// Most recent posts, newest first.
    pub fn recent(&self, limit: usize) -> Vec<StoredPost> {
        let posts = self
            .posts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        posts.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.posts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
