use git2::Signature;

use crate::error::{GitError, Result, ResultExt};
use crate::git::GitRepo;

pub const TEST_NAME: &str = "Test User";
pub const TEST_EMAIL: &str = "test@example.com";

/// Create a new temporary repository for testing with user config set up
pub fn create_test_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let repo = GitRepo::init(temp_dir.path()).unwrap();
    set_user_config(&repo);
    (temp_dir, repo)
}

/// Create a new temporary bare repository for testing
pub fn create_test_bare_repo() -> (assert_fs::TempDir, GitRepo) {
    let temp_dir = assert_fs::TempDir::new().unwrap();
    let repo = GitRepo::init_bare(temp_dir.path()).unwrap();
    set_user_config(&repo);
    (temp_dir, repo)
}

fn set_user_config(repo: &GitRepo) {
    let mut config = repo.repo().config().unwrap();
    config.set_str("user.name", TEST_NAME).unwrap();
    config.set_str("user.email", TEST_EMAIL).unwrap();
}

/// Test-only trait that adds assertion methods to GitRepo
pub trait RepoAssertions {
    /// Assert that the current branch matches the expected branch name
    fn assert_current_branch(&self, branch_name: &str) -> &Self;

    fn assert_file_exists(&self, filename: &str) -> &Self;

    fn assert_file_not_exists(&self, filename: &str) -> &Self;

    /// Assert that commit messages match the expected order (newest first)
    fn assert_commit_messages(&self, expected_messages: &[&str]) -> &Self;
}

/// Test-only trait that adds test helper operations to GitRepo
pub trait RepoTestOperations {
    /// Write a file, creating parent directories (fluent)
    fn add_file(&self, filename: &str, content: &str) -> Result<&Self>;

    /// Write, stage and commit a file as the test user (fluent)
    fn add_file_and_commit(
        &self,
        filename: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<&Self>;

    /// Add a remote pointing to another local GitRepo
    fn add_local_remote(&self, name: &str, other_repo: &GitRepo) -> Result<()>;

    /// Lightweight tag on HEAD (fluent)
    fn create_tag(&self, name: &str) -> Result<&Self>;
}

impl RepoAssertions for GitRepo {
    fn assert_current_branch(&self, branch_name: &str) -> &Self {
        let expected_target = format!("refs/heads/{branch_name}");
        match self.head_symbolic_target() {
            Ok(actual_target) => {
                if actual_target != expected_target {
                    panic!(
                        "HEAD symbolic target mismatch. Expected: '{expected_target}', Found: '{actual_target}'"
                    );
                }
            }
            Err(e) => {
                panic!("Failed to get HEAD symbolic target: {e}");
            }
        }
        self
    }

    fn assert_file_exists(&self, filename: &str) -> &Self {
        let file_path = self.path().join(filename);
        if !file_path.exists() {
            panic!("Expected file '{filename}' to exist at path: {file_path:?}");
        }
        self
    }

    fn assert_file_not_exists(&self, filename: &str) -> &Self {
        let file_path = self.path().join(filename);
        if file_path.exists() {
            panic!("Expected file '{filename}' to not exist at path: {file_path:?}");
        }
        self
    }

    fn assert_commit_messages(&self, expected_messages: &[&str]) -> &Self {
        let commits = self.log(0, usize::MAX).unwrap_or_default();

        if commits.len() != expected_messages.len() {
            panic!(
                "Expected {} commits, but found {}. Commits: {:?}",
                expected_messages.len(),
                commits.len(),
                commits.iter().map(|c| &c.message).collect::<Vec<_>>()
            );
        }

        for (i, (commit, expected)) in commits.iter().zip(expected_messages.iter()).enumerate() {
            if commit.message != *expected {
                panic!(
                    "Commit {} message mismatch. Expected: '{}', Found: '{}'",
                    i, expected, commit.message
                );
            }
        }

        self
    }
}

impl RepoTestOperations for GitRepo {
    fn add_file(&self, filename: &str, content: &str) -> Result<&Self> {
        let file_path = self.path().join(filename);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).git_context("Failed to create parent directory")?;
        }
        std::fs::write(&file_path, content)
            .map_err(|e| GitError::io_at("write", &file_path, e))?;
        Ok(self)
    }

    fn add_file_and_commit(
        &self,
        filename: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<&Self> {
        self.add_file(filename, content)?.add(&[filename])?;

        let repo = self.repo();
        let mut index = repo.index().git_context("Failed to get index")?;
        let tree_id = index.write_tree().git_context("Failed to write tree")?;
        let tree = repo.find_tree(tree_id).git_context("Failed to find tree")?;
        let signature =
            Signature::now(TEST_NAME, TEST_EMAIL).git_context("Failed to create signature")?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().git_context("Failed to get HEAD commit")?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            commit_message,
            &tree,
            &parents,
        )
        .git_context("Failed to create commit")?;

        Ok(self)
    }

    fn add_local_remote(&self, name: &str, other_repo: &GitRepo) -> Result<()> {
        let remote_path = other_repo.path().to_str().ok_or_else(|| {
            GitError::Invalid("Failed to convert remote repository path to string".to_string())
        })?;

        self.add_remote(name, remote_path)
    }

    fn create_tag(&self, name: &str) -> Result<&Self> {
        let head = self
            .repo()
            .head()
            .git_context("Failed to get HEAD")?
            .peel(git2::ObjectType::Commit)
            .git_context("Failed to peel HEAD")?;
        self.repo()
            .tag_lightweight(name, &head, false)
            .git_context(format!("Failed to create tag '{name}'"))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_commit_messages_works_correctly() {
        let (_temp_dir, repo) = create_test_repo();

        repo.assert_commit_messages(&[]);

        repo.add_file_and_commit("test_file_1.txt", "foo", "Test commit 1")
            .unwrap();
        repo.assert_commit_messages(&["Test commit 1"]);

        repo.add_file_and_commit("test_file_2.txt", "foo", "Test commit 2")
            .unwrap();
        repo.assert_commit_messages(&["Test commit 2", "Test commit 1"]);
    }

    #[test]
    fn add_local_remote_works() {
        let (_local_dir, local_repo) = create_test_repo();
        let (remote_dir, remote_repo) = create_test_bare_repo();

        assert!(local_repo.list_remotes().unwrap().is_empty());

        local_repo.add_local_remote("origin", &remote_repo).unwrap();

        let remotes = local_repo.list_remotes().unwrap();
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].name, "origin");
        assert_eq!(remotes[0].url, remote_dir.path().to_str().unwrap());
    }

    #[test]
    fn add_file_creates_parent_directories() {
        let (_temp_dir, repo) = create_test_repo();

        repo.add_file("views/main/view.json", "{}").unwrap();

        repo.assert_file_exists("views/main/view.json");
    }
}
