use git2::{build::CheckoutBuilder, BranchType};
use tracing::info;

use crate::error::{GitError, Result, ResultExt};
use crate::git::repository::core::GitRepo;

impl GitRepo {
    pub fn local_branches(&self) -> Result<Vec<String>> {
        self.branch_names(BranchType::Local)
    }

    /// Remote-tracking branches as `remote/branch`, without symbolic `*/HEAD` refs.
    pub fn remote_branches(&self) -> Result<Vec<String>> {
        let mut branches = self.branch_names(BranchType::Remote)?;
        branches.retain(|name| !name.ends_with("/HEAD"));
        Ok(branches)
    }

    fn branch_names(&self, branch_type: BranchType) -> Result<Vec<String>> {
        let mut branches = Vec::new();

        let branch_iter = self
            .repo()
            .branches(Some(branch_type))
            .git_context("Failed to list branches")?;

        for branch in branch_iter {
            let (branch, _) = branch.git_context("Failed to read branch")?;
            if let Some(name) = branch.name().git_context("Failed to read branch name")? {
                branches.push(name.to_string());
            }
        }

        branches.sort();
        Ok(branches)
    }

    pub fn head_symbolic_target(&self) -> Result<String> {
        let head_ref = self
            .repo()
            .find_reference("HEAD")
            .git_context("Failed to find HEAD reference")?;

        match head_ref.symbolic_target() {
            Some(target) => Ok(target.to_string()),
            None => Err(GitError::Invalid(
                "HEAD is not a symbolic reference".to_string(),
            )),
        }
    }

    /// Name of the checked out branch. Works on an unborn branch too.
    pub fn current_branch(&self) -> Result<String> {
        let head_target = self.head_symbolic_target()?;

        let branch_name = head_target
            .strip_prefix("refs/heads/")
            .ok_or_else(|| GitError::Invalid("HEAD is not pointing to a branch".to_string()))?;

        Ok(branch_name.to_string())
    }

    pub fn branch_exists(&self, branch_name: &str) -> bool {
        self.repo()
            .find_branch(branch_name, BranchType::Local)
            .is_ok()
    }

    /// Create a local branch at `start_point` (any revision; HEAD when `None`)
    /// without switching to it.
    pub fn create_branch(&self, branch_name: &str, start_point: Option<&str>) -> Result<()> {
        let start = start_point.filter(|s| !s.is_empty()).unwrap_or("HEAD");
        let commit = self
            .repo()
            .revparse_single(start)
            .git_context(format!("Failed to resolve start point '{start}'"))?
            .peel_to_commit()
            .git_context(format!("Start point '{start}' is not a commit"))?;

        self.repo()
            .branch(branch_name, &commit, false)
            .git_context(format!("Failed to create branch '{branch_name}'"))?;

        info!(branch = branch_name, start, "created branch");
        Ok(())
    }

    /// Delete a local branch, merged or not. The checked out branch is refused
    /// before anything is touched.
    pub fn delete_branch(&self, branch_name: &str) -> Result<()> {
        if self.current_branch().ok().as_deref() == Some(branch_name) {
            return Err(GitError::CurrentBranchDeleteAttempt {
                branch: branch_name.to_string(),
            });
        }

        let mut branch = self
            .repo()
            .find_branch(branch_name, BranchType::Local)
            .git_context(format!("Failed to find branch '{branch_name}'"))?;
        branch
            .delete()
            .git_context(format!("Failed to delete branch '{branch_name}'"))?;

        info!(branch = branch_name, "deleted branch");
        Ok(())
    }

    /// Check out a local branch, creating it from `origin/<name>` when only the
    /// remote-tracking branch exists.
    pub fn checkout_branch(&self, branch_name: &str) -> Result<()> {
        // From an unborn HEAD a safe checkout reads the empty tree as deletions
        let force = !self.has_commits();
        if !self.branch_exists(branch_name) {
            let remote_branch = format!("origin/{branch_name}");
            self.create_tracking_branch(branch_name, &remote_branch)?;
        }
        self.switch_to_branch(branch_name, force)
    }

    /// Check out a local branch, overwriting working tree changes.
    pub fn force_checkout_branch(&self, branch_name: &str) -> Result<()> {
        self.switch_to_branch(branch_name, true)
    }

    fn switch_to_branch(&self, branch_name: &str, force: bool) -> Result<()> {
        let branch_ref = format!("refs/heads/{branch_name}");
        let obj = self
            .repo()
            .revparse_single(&branch_ref)
            .git_context(format!("Failed to find branch '{branch_name}'"))?;

        if !self.is_bare() {
            let mut checkout = CheckoutBuilder::new();
            if force {
                checkout.force();
            } else {
                checkout.safe();
            }
            self.repo()
                .checkout_tree(&obj, Some(&mut checkout))
                .git_context(format!("Failed to check out branch '{branch_name}'"))?;
        }

        self.repo()
            .set_head(&branch_ref)
            .git_context("Failed to set HEAD to branch")?;

        info!(branch = branch_name, force, "checked out branch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::GitError,
        git::GitRepo,
        test_utils::{create_test_repo, RepoAssertions, RepoTestOperations},
    };

    #[test]
    fn create_branch_and_list_local_branches() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("test_file_1.txt", "foo", "Test commit 1")?;

        repo.create_branch("foo_branch", None)?;
        repo.create_branch("bar_branch", Some("master"))?;

        assert_eq!(
            repo.local_branches()?,
            vec!["bar_branch", "foo_branch", "master"]
        );
        repo.assert_current_branch("master");
        Ok(())
    }

    #[test]
    fn create_branch_from_older_commit() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("a.txt", "a", "First")?
            .add_file_and_commit("b.txt", "b", "Second")?;
        let first = repo.log(0, 10)?[1].hash.clone();

        repo.create_branch("from_first", Some(&first))?;
        repo.checkout_branch("from_first")?;

        repo.assert_current_branch("from_first")
            .assert_file_exists("a.txt")
            .assert_file_not_exists("b.txt");
        Ok(())
    }

    #[test]
    fn current_branch_works_before_first_commit() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let repo = GitRepo::init(temp_dir.path()).unwrap();

        assert_eq!(repo.current_branch().unwrap(), "master");
    }

    #[test]
    fn checkout_branch_switches_tree() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("README.md", "initial", "Initial commit")?;
        repo.create_branch("feature", None)?;
        repo.checkout_branch("feature")?;
        repo.add_file_and_commit("feature.txt", "feature", "Add feature")?;

        repo.checkout_branch("master")?;

        repo.assert_current_branch("master")
            .assert_file_not_exists("feature.txt");
        Ok(())
    }

    #[test]
    fn checkout_unknown_branch_fails() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("README.md", "initial", "Initial commit")?;

        assert!(repo.checkout_branch("nope").is_err());
        repo.assert_current_branch("master");
        Ok(())
    }

    #[test]
    fn deleting_current_branch_is_refused() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("README.md", "initial", "Initial commit")?;
        repo.create_branch("other", None)?;
        let before = repo.local_branches()?;

        let result = repo.delete_branch("master");

        assert!(matches!(
            result,
            Err(GitError::CurrentBranchDeleteAttempt { ref branch }) if branch == "master"
        ));
        assert_eq!(repo.local_branches()?, before);
        repo.assert_current_branch("master");
        Ok(())
    }

    #[test]
    fn delete_unmerged_branch_works() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, repo) = create_test_repo();
        repo.add_file_and_commit("README.md", "initial", "Initial commit")?;
        repo.create_branch("feature", None)?;
        repo.checkout_branch("feature")?;
        repo.add_file_and_commit("feature.txt", "feature", "Unmerged work")?;
        repo.checkout_branch("master")?;

        repo.delete_branch("feature")?;

        assert_eq!(repo.local_branches()?, vec!["master"]);
        Ok(())
    }
}
