//! Recursive removal over a [`FileStore`].
//!
//! The store itself only removes files and empty directories. Removal of a
//! subtree is post-order: every child is gone before its parent's `rmdir`
//! runs. Siblings are removed concurrently.

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use srs_store::{path, FileStore, StoreError};
use tracing::{debug, warn};

use crate::error::SyncResult;
use crate::types::Removal;

/// Remove `target` and everything beneath it.
///
/// The storage root `root` is never removed: a target that is the root or
/// one of its ancestors (in any spelling, such as `/sites/`, `//` or `/.`)
/// is refused without touching the store. A missing target is not an
/// error. The count in [`Removal::Removed`] excludes the target itself.
pub async fn remove_tree(files: &dyn FileStore, root: &str, target: &str) -> SyncResult<Removal> {
    let root = path::normalize(root)?;
    let target = path::normalize(target)?;
    if path::encloses(&target, &root) {
        warn!(path = %target, root = %root, "refusing to delete the storage root");
        return Ok(Removal::RefusedRoot);
    }

    let stat = match files.stat(&target).await {
        Ok(stat) => stat,
        Err(StoreError::NotFound(_)) => return Ok(Removal::Absent),
        Err(e) => return Err(e.into()),
    };

    if !stat.is_dir() {
        files.unlink(&target).await?;
        debug!(path = %target, "removed file");
        return Ok(Removal::Removed { entries: 0 });
    }

    let entries = remove_contents(files, target.clone()).await?;
    files.rmdir(&target).await?;
    debug!(path = %target, entries, "removed directory tree");
    Ok(Removal::Removed { entries })
}

/// Empty `dir`, returning how many entries were removed.
fn remove_contents(files: &dyn FileStore, dir: String) -> BoxFuture<'_, SyncResult<usize>> {
    async move {
        let children = files.read_dir(&dir).await?;
        let removals = children
            .iter()
            .map(|name| remove_entry(files, path::join(&dir, name)));
        Ok(try_join_all(removals).await?.into_iter().sum())
    }
    .boxed()
}

async fn remove_entry(files: &dyn FileStore, entry: String) -> SyncResult<usize> {
    if !files.stat(&entry).await?.is_dir() {
        files.unlink(&entry).await?;
        return Ok(1);
    }
    let below = remove_contents(files, entry.clone()).await?;
    files.rmdir(&entry).await?;
    Ok(below + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use srs_store::path::ROOT;
    use srs_store::InMemoryFileStore;

    async fn populate(files: &InMemoryFileStore) {
        files.mkdir_all("/site/assets/img").await.unwrap();
        files.mkdir_all("/site/.git/refs").await.unwrap();
        files.write_file("/site/index.html", b"hi").await.unwrap();
        files.write_file("/site/assets/app.js", b"js").await.unwrap();
        files.write_file("/site/assets/img/logo.png", b"png").await.unwrap();
        files.write_file("/site/.git/HEAD", b"ref: refs/heads/main").await.unwrap();
        files.write_file("/keep.txt", b"stay").await.unwrap();
    }

    #[tokio::test]
    async fn removes_whole_subtree() {
        let files = InMemoryFileStore::new();
        populate(&files).await;

        let removal = remove_tree(&files, ROOT, "/site").await.unwrap();
        // assets, img, .git, refs + four files
        assert_eq!(removal, Removal::Removed { entries: 8 });
        assert!(!files.exists("/site").await.unwrap());
        assert_eq!(files.read_dir("/").await.unwrap(), vec!["keep.txt"]);
    }

    #[tokio::test]
    async fn refuses_every_spelling_of_root() {
        let files = InMemoryFileStore::new();
        populate(&files).await;
        let before = files.paths();
        for root in ["/", "//", "/.", "/./"] {
            assert_eq!(remove_tree(&files, ROOT, root).await.unwrap(), Removal::RefusedRoot);
        }
        assert_eq!(files.paths(), before);
    }

    #[tokio::test]
    async fn refuses_configured_root_and_its_ancestors() {
        let files = InMemoryFileStore::new();
        files.mkdir_all("/sites/blog").await.unwrap();
        files.write_file("/sites/blog/index.html", b"hi").await.unwrap();
        let before = files.paths();
        for target in ["/sites", "/sites/", "//sites/.", "/"] {
            assert_eq!(
                remove_tree(&files, "/sites", target).await.unwrap(),
                Removal::RefusedRoot
            );
        }
        assert_eq!(files.paths(), before);

        assert_eq!(
            remove_tree(&files, "/sites", "/sites/blog").await.unwrap(),
            Removal::Removed { entries: 1 }
        );
        assert!(files.exists("/sites").await.unwrap());
    }

    #[tokio::test]
    async fn absent_target_and_plain_file() {
        let files = InMemoryFileStore::new();
        populate(&files).await;
        assert_eq!(remove_tree(&files, ROOT, "/nothing").await.unwrap(), Removal::Absent);
        assert_eq!(
            remove_tree(&files, ROOT, "/keep.txt").await.unwrap(),
            Removal::Removed { entries: 0 }
        );
        assert!(!files.exists("/keep.txt").await.unwrap());
    }

    #[tokio::test]
    async fn invalid_target_is_an_error() {
        let files = InMemoryFileStore::new();
        assert!(remove_tree(&files, ROOT, "relative/path").await.is_err());
        assert!(remove_tree(&files, ROOT, "/a/../b").await.is_err());
    }

    #[tokio::test]
    async fn works_over_disk_store() {
        let tmp = tempfile::tempdir().unwrap();
        let files = srs_store::DiskFileStore::open(tmp.path()).await.unwrap();
        files.mkdir_all("/repo/a/b").await.unwrap();
        files.write_file("/repo/a/b/c.txt", b"c").await.unwrap();
        assert_eq!(
            remove_tree(&files, ROOT, "/repo").await.unwrap(),
            Removal::Removed { entries: 3 }
        );
        assert!(!tmp.path().join("repo").exists());
    }

    fn tree_strategy() -> impl Strategy<Value = Vec<(Vec<u8>, bool)>> {
        // Each entry is a path of small component indices and whether it is a file.
        prop::collection::vec((prop::collection::vec(0u8..3, 1..4), any::<bool>()), 0..24)
    }

    proptest! {
        #[test]
        fn removes_arbitrary_trees_and_keeps_siblings(entries in tree_strategy()) {
            futures::executor::block_on(async {
                let files = InMemoryFileStore::new();
                files.mkdir("/target").await.unwrap();
                files.write_file("/sibling", b"s").await.unwrap();

                for (components, is_file) in &entries {
                    let mut dir = String::from("/target");
                    let (last, parents) = components.split_last().unwrap();
                    for c in parents {
                        dir = path::join(&dir, &format!("d{c}"));
                    }
                    if files.mkdir_all(&dir).await.is_err() {
                        continue;
                    }
                    let leaf = path::join(&dir, &format!("d{last}"));
                    if files.exists(&leaf).await.unwrap() {
                        continue;
                    }
                    if *is_file {
                        files.write_file(&leaf, b"x").await.unwrap();
                    } else {
                        files.mkdir(&leaf).await.unwrap();
                    }
                }

                let expected = files
                    .paths()
                    .iter()
                    .filter(|p| p.starts_with("/target/"))
                    .count();
                let removal = remove_tree(&files, ROOT, "/target").await.unwrap();
                prop_assert_eq!(removal, Removal::Removed { entries: expected });
                prop_assert!(!files.exists("/target").await.unwrap());
                prop_assert!(files.exists("/sibling").await.unwrap());
                Ok(())
            })?;
        }
    }
}
