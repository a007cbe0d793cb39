mod github_commit;
mod github_repository;
mod github_user;
mod payload;

pub use github_commit::GithubCommit;
pub use github_repository::GithubRepository;
pub use github_user::GithubUser;
pub use payload::GithubPushWebhookPayload;
