//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod article_rating_repo;
pub mod article_repo;
pub mod article_vote_repo;
pub mod category_repo;
pub mod comment_history_repo;
pub mod comment_repo;
pub mod comment_vote_repo;
pub mod follow_repo;
pub mod notification_repo;
pub mod revoked_token_repo;
pub mod user_repo;

pub use article_rating_repo::ArticleRatingRepo;
pub use article_repo::ArticleRepo;
pub use article_vote_repo::ArticleVoteRepo;
pub use category_repo::CategoryRepo;
pub use comment_history_repo::CommentHistoryRepo;
pub use comment_repo::CommentRepo;
pub use comment_vote_repo::CommentVoteRepo;
pub use follow_repo::FollowRepo;
pub use notification_repo::NotificationRepo;
pub use revoked_token_repo::RevokedTokenRepo;
pub use user_repo::UserRepo;
