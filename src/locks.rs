//! Per-repository serialization of git operations.
//!
//! libgit2 handles are not safe for concurrent mutation of one working copy.
//! Writers (commit, push, pull, checkout, stash, discard) take the exclusive
//! side of the working copy's lock; readers (log, status, diff) share it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tracing::trace;

#[derive(Debug, Default)]
pub struct RepoLocks {
    locks: Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>,
}

impl RepoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, path: &Path) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    /// Run `f` while holding the exclusive lock of the working copy at `path`.
    pub fn with_write<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(path);
        // A panic in another writer leaves no state behind the lock itself
        let _guard = lock.write().unwrap_or_else(|e| e.into_inner());
        trace!(path = %path.display(), "acquired write lock");
        f()
    }

    /// Run `f` while sharing the lock of the working copy at `path`.
    pub fn with_read<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(path);
        let _guard = lock.read().unwrap_or_else(|e| e.into_inner());
        trace!(path = %path.display(), "acquired read lock");
        f()
    }

    /// Number of working copies that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn writers_on_one_path_never_overlap() {
        let locks = Arc::new(RepoLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    locks.with_write(Path::new("/projects/demo"), || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn separate_paths_get_separate_locks() {
        let locks = RepoLocks::new();

        let value = locks.with_write(Path::new("/projects/a"), || {
            locks.with_write(Path::new("/projects/b"), || 42)
        });

        assert_eq!(value, 42);
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn readers_share_the_lock() {
        let locks = Arc::new(RepoLocks::new());
        let both_inside = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let both_inside = Arc::clone(&both_inside);
                thread::spawn(move || {
                    locks.with_read(Path::new("/projects/demo"), || {
                        both_inside.wait();
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
