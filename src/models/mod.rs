// 领域模型

pub mod session;
pub mod tweet;
pub mod user;

pub use session::Session;
pub use tweet::{Tweet, TweetWithUser, TweetsList};
pub use user::{User, UserWithToken, UsersList};
