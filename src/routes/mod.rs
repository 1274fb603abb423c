pub mod home;
pub mod posts;
pub mod subreddits;
pub mod users;
pub mod votes;
