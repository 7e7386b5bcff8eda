//! Comment use cases.

use crate::model::comment::{Comment, NewComment};
use crate::model::post::PostId;
use crate::repo::comment_repo::CommentRepository;
use crate::repo::user_repo::UserRepository;
use crate::service::{ServiceError, ServiceResult};

/// Comment use-case service; any existing user may comment.
pub struct CommentService<C: CommentRepository, U: UserRepository> {
    comments: C,
    users: U,
}

impl<C: CommentRepository, U: UserRepository> CommentService<C, U> {
    pub fn new(comments: C, users: U) -> Self {
        Self { comments, users }
    }

    pub fn add_comment(&self, comment: &NewComment) -> ServiceResult<Comment> {
        if self.users.get_user(comment.author_id)?.is_none() {
            return Err(ServiceError::UnknownUser(comment.author_id));
        }
        Ok(self.comments.create_comment(comment)?)
    }

    /// Comments under a post, oldest first.
    pub fn comments_for(&self, post_id: PostId) -> ServiceResult<Vec<Comment>> {
        Ok(self.comments.list_for_post(post_id)?)
    }
}
