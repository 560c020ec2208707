#![allow(dead_code)]

use bithub::areas::platform::Platform;
use bithub::artifacts::auth::{AccessContext, Role};
use bithub::artifacts::branch::branch_name::BranchName;
use bithub::artifacts::objects::commit::Author;
use bithub::artifacts::repo::RepoId;

pub fn platform(temp: &assert_fs::TempDir) -> Platform {
    Platform::with_writer(temp.path().join("data"), Box::new(std::io::sink())).unwrap()
}

pub fn user(name: &str) -> AccessContext {
    AccessContext::new(name.to_string(), Role::User)
}

pub fn admin(name: &str) -> AccessContext {
    AccessContext::new(name.to_string(), Role::Admin)
}

pub fn author(name: &str) -> Author {
    Author::new(name.to_string())
}

pub fn branch(name: &str) -> BranchName {
    BranchName::try_parse(name.to_string()).unwrap()
}

pub fn repo_id(owner: &str, name: &str) -> RepoId {
    RepoId::new(owner, name)
}
