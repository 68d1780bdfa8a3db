use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::path::{self, ROOT};
use crate::traits::{EntryKind, FileStat, FileStore};

#[derive(Clone, Debug)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// In-memory, `BTreeMap`-based file store.
///
/// Intended for tests and embedding. Entries are keyed by normalized path;
/// the ordered map lets directory listings be answered with a range scan.
pub struct InMemoryFileStore {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl InMemoryFileStore {
    /// Create a store containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT.to_string(), Node::Dir);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Number of entries, excluding the root.
    pub fn len(&self) -> usize {
        self.nodes.read().map(|n| n.len() - 1).unwrap_or(0)
    }

    /// Returns `true` if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every path in the store, sorted, excluding the root.
    pub fn paths(&self) -> Vec<String> {
        self.nodes
            .read()
            .map(|n| n.keys().filter(|k| *k != ROOT).cloned().collect())
            .unwrap_or_default()
    }

    fn read_nodes(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<String, Node>>> {
        self.nodes.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_nodes(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Node>>> {
        self.nodes.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require_parent_dir(nodes: &BTreeMap<String, Node>, path: &str) -> StoreResult<()> {
    let parent = path::parent(path).ok_or_else(|| StoreError::InvalidPath {
        path: path.to_string(),
        reason: "the root has no parent".into(),
    })?;
    match nodes.get(parent) {
        Some(Node::Dir) => Ok(()),
        Some(Node::File(_)) => Err(StoreError::NotADirectory(parent.to_string())),
        None => Err(StoreError::NotFound(parent.to_string())),
    }
}

fn children<'a>(nodes: &'a BTreeMap<String, Node>, dir: &str) -> impl Iterator<Item = &'a str> {
    let prefix = if dir == ROOT {
        ROOT.to_string()
    } else {
        format!("{dir}/")
    };
    nodes
        .range(prefix.clone()..)
        .take_while(move |(key, _)| key.starts_with(&prefix))
        .filter_map({
            let skip = if dir == ROOT { 1 } else { dir.len() + 1 };
            move |(key, _)| {
                let rest = key.get(skip..)?;
                (!rest.is_empty() && !rest.contains('/')).then_some(rest)
            }
        })
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn stat(&self, path: &str) -> StoreResult<FileStat> {
        let path = path::normalize(path)?;
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(Node::Dir) => Ok(FileStat {
                kind: EntryKind::Directory,
                size: 0,
            }),
            Some(Node::File(data)) => Ok(FileStat {
                kind: EntryKind::File,
                size: data.len() as u64,
            }),
            None => Err(StoreError::NotFound(path)),
        }
    }

    async fn read_dir(&self, path: &str) -> StoreResult<Vec<String>> {
        let path = path::normalize(path)?;
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(Node::Dir) => Ok(children(&nodes, &path).map(str::to_string).collect()),
            Some(Node::File(_)) => Err(StoreError::NotADirectory(path)),
            None => Err(StoreError::NotFound(path)),
        }
    }

    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        let path = path::normalize(path)?;
        let nodes = self.read_nodes()?;
        match nodes.get(&path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(StoreError::IsADirectory(path)),
            None => Err(StoreError::NotFound(path)),
        }
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let mut nodes = self.write_nodes()?;
        require_parent_dir(&nodes, &path)?;
        if let Some(Node::Dir) = nodes.get(&path) {
            return Err(StoreError::IsADirectory(path));
        }
        nodes.insert(path, Node::File(data.to_vec()));
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let mut nodes = self.write_nodes()?;
        if nodes.contains_key(&path) {
            return Err(StoreError::AlreadyExists(path));
        }
        require_parent_dir(&nodes, &path)?;
        nodes.insert(path, Node::Dir);
        Ok(())
    }

    async fn unlink(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let mut nodes = self.write_nodes()?;
        match nodes.get(&path) {
            Some(Node::File(_)) => {
                nodes.remove(&path);
                Ok(())
            }
            Some(Node::Dir) => Err(StoreError::IsADirectory(path)),
            None => Err(StoreError::NotFound(path)),
        }
    }

    async fn rmdir(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        if path == ROOT {
            return Err(StoreError::InvalidPath {
                path,
                reason: "the root cannot be removed".into(),
            });
        }
        let mut nodes = self.write_nodes()?;
        match nodes.get(&path) {
            Some(Node::Dir) => {
                if children(&nodes, &path).next().is_some() {
                    return Err(StoreError::NotEmpty(path));
                }
                nodes.remove(&path);
                Ok(())
            }
            Some(Node::File(_)) => Err(StoreError::NotADirectory(path)),
            None => Err(StoreError::NotFound(path)),
        }
    }
}

impl std::fmt::Debug for InMemoryFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryFileStore")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryFileStore {
        let store = InMemoryFileStore::new();
        store.mkdir_all("/site/css").await.unwrap();
        store.write_file("/site/index.html", b"<h1>hi</h1>").await.unwrap();
        store.write_file("/site/css/main.css", b"body{}").await.unwrap();
        store
    }

    #[tokio::test]
    async fn root_exists_on_creation() {
        let store = InMemoryFileStore::new();
        assert!(store.stat("/").await.unwrap().is_dir());
        assert!(store.is_empty());
        assert!(store.read_dir("/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_and_read_file() {
        let store = seeded().await;
        assert_eq!(store.read_file("/site/index.html").await.unwrap(), b"<h1>hi</h1>");
        let stat = store.stat("/site/index.html").await.unwrap();
        assert!(stat.is_file());
        assert_eq!(stat.size, 11);
    }

    #[tokio::test]
    async fn read_dir_lists_direct_children_only() {
        let store = seeded().await;
        assert_eq!(store.read_dir("/").await.unwrap(), vec!["site"]);
        assert_eq!(
            store.read_dir("/site").await.unwrap(),
            vec!["css", "index.html"]
        );
    }

    #[tokio::test]
    async fn read_dir_does_not_confuse_sibling_prefixes() {
        let store = InMemoryFileStore::new();
        store.mkdir("/site").await.unwrap();
        store.mkdir("/site-old").await.unwrap();
        store.write_file("/site-old/a", b"").await.unwrap();
        assert!(store.read_dir("/site").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_requires_existing_parent() {
        let store = InMemoryFileStore::new();
        let err = store.write_file("/missing/file", b"x").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn mkdir_rejects_existing_entry() {
        let store = seeded().await;
        assert!(matches!(
            store.mkdir("/site").await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn mkdir_all_through_a_file_fails() {
        let store = seeded().await;
        assert!(matches!(
            store.mkdir_all("/site/index.html/deeper").await,
            Err(StoreError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn rmdir_requires_empty_directory() {
        let store = seeded().await;
        assert!(matches!(
            store.rmdir("/site/css").await,
            Err(StoreError::NotEmpty(_))
        ));
        store.unlink("/site/css/main.css").await.unwrap();
        store.rmdir("/site/css").await.unwrap();
        assert!(!store.exists("/site/css").await.unwrap());
    }

    #[tokio::test]
    async fn rmdir_never_removes_root() {
        let store = InMemoryFileStore::new();
        assert!(matches!(
            store.rmdir("/").await,
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn unlink_refuses_directories() {
        let store = seeded().await;
        assert!(matches!(
            store.unlink("/site").await,
            Err(StoreError::IsADirectory(_))
        ));
    }

    #[tokio::test]
    async fn read_to_string_decodes_utf8() {
        let store = seeded().await;
        store.write_file("/site/bin", &[0xff, 0xfe]).await.unwrap();
        assert_eq!(store.read_to_string("/site/css/main.css").await.unwrap(), "body{}");
        assert!(matches!(
            store.read_to_string("/site/bin").await,
            Err(StoreError::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn paths_are_normalized() {
        let store = seeded().await;
        assert!(store.exists("//site/./css/").await.unwrap());
        assert_eq!(
            store.paths(),
            vec!["/site", "/site/css", "/site/css/main.css", "/site/index.html"]
        );
    }
}
