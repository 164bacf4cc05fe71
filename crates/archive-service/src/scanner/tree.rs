//! Depth-limited directory trees.

use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use archive_auth::AccessPolicy;
use archive_core::result::AppResult;
use archive_entity::listing::{DirectoryTreeNode, FolderKind, TreeNodeMetadata};
use archive_entity::user::User;
use archive_storage::PathResolver;

use super::FilesystemScanner;
use super::listing::ROOT_NAME;

impl FilesystemScanner {
    /// Tree rooted at `path`, expanded `depth` levels.
    ///
    /// Every node carries immediate file and folder counts even when its
    /// children are not loaded. Children are the visible subdirectories,
    /// sorted by name.
    pub async fn get_directory_tree(
        &self,
        path: &str,
        user: &User,
        depth: u32,
    ) -> AppResult<DirectoryTreeNode> {
        let path = PathResolver::normalize_path(path);
        self.store
            .resolver()
            .resolve_existing_directory(&path)
            .await?;
        let policy = AccessPolicy::for_user(user);
        let owner = self.path_owner(&path).await?;
        self.build_tree_node(path, user, &policy, owner, depth).await
    }

    fn build_tree_node<'a>(
        &'a self,
        path: String,
        user: &'a User,
        policy: &'a AccessPolicy,
        owner: Option<User>,
        depth: u32,
    ) -> BoxFuture<'a, AppResult<DirectoryTreeNode>> {
        async move {
            let meta = self.store.metadata(&path).await?;
            let entries = match self.store.list(&path).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to read tree node children");
                    Vec::new()
                }
            };
            let folder_count = entries.iter().filter(|e| e.is_directory).count() as u64;
            let file_count = entries.iter().filter(|e| e.is_file).count() as u64;
            let has_children = !entries.is_empty();

            let mut children = Vec::new();
            let children_loaded = depth > 0 && has_children;
            if children_loaded {
                for entry in entries.into_iter().filter(|e| e.is_directory) {
                    let child_owner = self.path_owner(&entry.path).await?;
                    if !self
                        .enforcer
                        .can_view_path(policy, &entry.path, child_owner.as_ref())
                    {
                        continue;
                    }
                    match self
                        .build_tree_node(entry.path.clone(), user, policy, child_owner, depth - 1)
                        .await
                    {
                        Ok(child) => children.push(child),
                        Err(e) => warn!(path = %entry.path, error = %e, "Skipping tree node"),
                    }
                }
                children.sort_by_key(|c| c.name.to_lowercase());
            }

            let can_write = self.has_write_access(user, &path);
            Ok(DirectoryTreeNode {
                name: if path.is_empty() {
                    ROOT_NAME.to_string()
                } else {
                    PathResolver::get_name(&path)
                },
                node_type: FolderKind::classify(&path),
                entity_id: self
                    .stores
                    .folders
                    .find_by_path(&path)
                    .await?
                    .map(|folder| folder.id),
                modified_at: meta.modified,
                has_children,
                children,
                children_loaded,
                can_write,
                can_delete: can_write,
                etag: self.compute_directory_etag(&path).await,
                file_count,
                folder_count,
                metadata: tree_metadata(&path, user, owner.as_ref()),
                path,
            })
        }
        .boxed()
    }
}

fn tree_metadata(path: &str, user: &User, owner: Option<&User>) -> TreeNodeMetadata {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut metadata = TreeNodeMetadata {
        academic_year_code: parts.first().map(|s| s.to_string()),
        semester_type: parts.get(1).map(|s| s.to_string()),
        course_code: parts
            .get(3)
            .map(|s| s.split_once(" - ").map_or(*s, |(code, _)| code).to_string()),
        ..Default::default()
    };
    if let Some(professor) = owner {
        metadata.professor_id = Some(professor.id);
        metadata.professor_name = Some(professor.display_name());
        metadata.department_id = professor.department_id;
        metadata.is_own_folder = professor.id == user.id;
    }
    metadata
}
