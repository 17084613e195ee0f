pub mod repo_extensions;
pub mod workspace;

pub use repo_extensions::{
    create_test_bare_repo, create_test_repo, RepoAssertions, RepoTestOperations,
};
pub use workspace::{TestWorkspace, TEST_USER};
