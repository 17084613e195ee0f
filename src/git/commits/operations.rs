use git2::IndexAddOption;
use tracing::info;

use crate::error::{GitError, Result, ResultExt};
use crate::git::repository::core::GitRepo;

impl GitRepo {
    /// Stage matching paths, including deletions of tracked files.
    pub fn add(&self, pathspecs: &[&str]) -> Result<&Self> {
        let mut index = self
            .repo()
            .index()
            .git_context("Failed to get repository index")?;

        index
            .add_all(pathspecs, IndexAddOption::DEFAULT, None)
            .git_context("Failed to add files to index")?;
        index
            .update_all(pathspecs, None)
            .git_context("Failed to stage removed files")?;

        index.write().git_context("Failed to write index")?;

        Ok(self)
    }

    /// Stage every listed path one by one.
    pub fn stage_paths(&self, paths: &[String]) -> Result<()> {
        for path in paths {
            self.add(&[path.as_str()])?;
        }
        Ok(())
    }

    /// Stage `paths` and commit the index, authored by `email` alone.
    ///
    /// With `amend` the HEAD commit is replaced instead of extended.
    /// Returns the new commit id.
    pub fn commit(&self, paths: &[String], message: &str, amend: bool, email: &str) -> Result<String> {
        self.stage_paths(paths)?;

        let signature = self.create_signature(email)?;

        let mut index = self
            .repo()
            .index()
            .git_context("Failed to get repository index")?;

        let tree_id = index
            .write_tree()
            .git_context("Failed to write tree from index")?;

        let tree = self
            .repo()
            .find_tree(tree_id)
            .git_context("Failed to find tree")?;

        // Get parent commit (if any)
        let parent_commit = match self.repo().head() {
            Ok(head) => Some(
                head.peel_to_commit()
                    .git_context("Failed to find parent commit")?,
            ),
            Err(_) => None, // First commit, no parent
        };

        let commit_id = if amend {
            let head_commit = parent_commit
                .ok_or_else(|| GitError::Invalid("There is no commit to amend".to_string()))?;
            head_commit
                .amend(
                    Some("HEAD"),
                    Some(&signature),
                    Some(&signature),
                    None,
                    Some(message),
                    Some(&tree),
                )
                .git_context("Failed to amend commit")?
        } else {
            let parents: Vec<_> = parent_commit.iter().collect();
            self.repo()
                .commit(
                    Some("HEAD"),
                    &signature,
                    &signature,
                    message,
                    &tree,
                    &parents,
                )
                .git_context("Failed to create commit")?
        };

        info!(commit = %commit_id, amend, paths = paths.len(), "committed");
        Ok(commit_id.to_string())
    }

    /// Stage the whole working tree and commit it.
    pub fn commit_all(&self, message: &str, email: &str) -> Result<String> {
        self.add(&["."])?;
        self.commit(&[], message, false, email)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_repo, RepoAssertions, RepoTestOperations};

    const TEST_EMAIL: &str = "dev@example.com";

    #[test]
    fn add_works_for_single_file_path() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();

        let file_name = "test_file.txt";
        repo.add_file(file_name, "foo")?.add(&[file_name])?;

        let index = repo.repo().index().unwrap();
        let entry = index.get_path(std::path::Path::new(file_name), 0);
        assert!(entry.is_some(), "File should be in the index after adding");
        Ok(())
    }

    #[test]
    fn add_works_for_glob_patterns() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();

        repo.add_file("test_file_1.txt", "foo")?
            .add_file("test_file_2.txt", "foo")?
            .add_file("test_file_non_text.rs", "foo")?
            .add(&["*.txt"])?;

        let index = repo.repo().index().unwrap();
        assert_eq!(index.len(), 2);
        Ok(())
    }

    #[test]
    fn commit_stages_listed_paths_only() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file("a.txt", "a")?.add_file("b.txt", "b")?;

        repo.commit(&["a.txt".to_string()], "Add a", false, TEST_EMAIL)?;

        let status = repo.status()?;
        assert!(status.untracked.contains("b.txt"));
        assert!(!status.untracked.contains("a.txt"));
        repo.assert_commit_messages(&["Add a"]);
        Ok(())
    }

    #[test]
    fn commit_stages_deletions() -> Result<(), Box<dyn std::error::Error>> {
        let (temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("gone.txt", "bye", "Initial commit")?;
        std::fs::remove_file(temp_dir.path().join("gone.txt"))?;

        repo.commit(&["gone.txt".to_string()], "Remove file", false, TEST_EMAIL)?;

        let head = repo.repo().head()?.peel_to_tree()?;
        assert!(head.get_path(std::path::Path::new("gone.txt")).is_err());
        assert!(!repo.status()?.is_dirty());
        Ok(())
    }

    #[test]
    fn commit_uses_email_for_authorship() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file("a.txt", "a")?;

        let id = repo.commit(&["a.txt".to_string()], "Add a", false, TEST_EMAIL)?;

        let commit = repo.repo().find_commit(git2::Oid::from_str(&id)?)?;
        assert_eq!(commit.author().email(), Some(TEST_EMAIL));
        assert_eq!(commit.committer().email(), Some(TEST_EMAIL));
        Ok(())
    }

    #[test]
    fn amend_replaces_head_commit() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("a.txt", "a", "First")?
            .add_file_and_commit("b.txt", "b", "Second")?
            .add_file("c.txt", "c")?;

        repo.commit(&["c.txt".to_string()], "Second, amended", true, TEST_EMAIL)?;

        repo.assert_commit_messages(&["Second, amended", "First"]);
        let tree = repo.repo().head()?.peel_to_tree()?;
        assert!(tree.get_path(std::path::Path::new("b.txt")).is_ok());
        assert!(tree.get_path(std::path::Path::new("c.txt")).is_ok());
        Ok(())
    }

    #[test]
    fn amend_without_commits_fails() {
        let (_temp_dir, repo) = create_test_repo();

        let result = repo.commit(&[], "Nothing", true, TEST_EMAIL);

        assert!(result.is_err());
    }

    #[test]
    fn commit_all_picks_up_everything() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file("a.txt", "a")?.add_file("nested/b.txt", "b")?;

        repo.commit_all("Initial commit", TEST_EMAIL)?;

        assert!(!repo.status()?.is_dirty());
        repo.assert_commit_messages(&["Initial commit"]);
        Ok(())
    }
}
