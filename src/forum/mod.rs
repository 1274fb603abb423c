pub mod communities;
pub mod posts;
pub mod tree;
pub mod votes;

pub use communities::CommunityService;
pub use posts::{PostDetail, PostDraft, PostListing, PostService};
pub use votes::{Removal, VoteLedger};
