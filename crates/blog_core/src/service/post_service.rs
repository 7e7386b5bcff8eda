//! Post authoring use cases.
//!
//! # Invariants
//! - Create and update reject authors without the staff flag.
//! - `set_tags` normalizes and deduplicates titles, creates missing tags and
//!   replaces the post's whole tag set in one transaction; a failure leaves
//!   neither new tags nor a partial tag set behind.

use crate::model::post::{NewPost, Post, PostId};
use crate::model::tag::Tag;
use crate::model::user::{User, UserId};
use crate::repo::post_repo::PostRepository;
use crate::repo::user_repo::UserRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Post use-case service over repository implementations.
pub struct PostService<P: PostRepository, U: UserRepository> {
    posts: P,
    users: U,
}

impl<P: PostRepository, U: UserRepository> PostService<P, U> {
    pub fn new(posts: P, users: U) -> Self {
        Self { posts, users }
    }

    /// Publishes a new post authored by a staff user.
    pub fn create_post(&self, post: &NewPost) -> ServiceResult<Post> {
        self.require_staff_author(post.author_id)?;
        let created = self.posts.create_post(post)?;
        info!(
            "event=post_create module=service status=ok post_id={} author_id={}",
            created.id, created.author_id
        );
        Ok(created)
    }

    /// Replaces a post's fields. The (possibly new) author must be staff.
    pub fn update_post(&self, post: &Post) -> ServiceResult<Post> {
        self.require_staff_author(post.author_id)?;
        Ok(self.posts.update_post(post)?)
    }

    /// Deletes a post together with its comments and associations.
    pub fn delete_post(&self, id: PostId) -> ServiceResult<()> {
        self.posts.delete_post(id)?;
        info!("event=post_delete module=service status=ok post_id={id}");
        Ok(())
    }

    /// Replaces the post's tags with `titles`, returning the new tag set.
    pub fn set_tags(&self, id: PostId, titles: &[String]) -> ServiceResult<Vec<Tag>> {
        let tags = self.posts.set_post_tag_titles(id, titles)?;
        info!(
            "event=post_set_tags module=service status=ok post_id={id} tags={}",
            tags.len()
        );
        Ok(tags)
    }

    pub fn like(&self, id: PostId, user_id: UserId) -> ServiceResult<()> {
        self.posts.add_like(id, user_id)?;
        Ok(())
    }

    pub fn unlike(&self, id: PostId, user_id: UserId) -> ServiceResult<()> {
        self.posts.remove_like(id, user_id)?;
        Ok(())
    }

    fn require_staff_author(&self, user_id: UserId) -> ServiceResult<User> {
        let author = self
            .users
            .get_user(user_id)?
            .ok_or(ServiceError::UnknownUser(user_id))?;
        if !author.is_staff {
            return Err(ServiceError::AuthorNotStaff {
                user_id,
                username: author.username,
            });
        }
        Ok(author)
    }
}
