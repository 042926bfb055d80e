pub mod blog_comments;
pub mod blogs;
pub mod comments;
pub mod post_comments;
pub mod posts;
pub mod users;
