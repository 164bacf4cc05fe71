//! Role-specific access rules.
//!
//! ADMIN and DEANSHIP see everything. HOD and PROFESSOR are scoped to their
//! own department for reading; only owners write. No rule ever fails or
//! panics, and an absent department never matches another absent one.

use archive_entity::file::UploadedFile;
use archive_entity::user::{User, UserRole};

/// Professor folders sit at the third path segment.
const PROFESSOR_DEPTH: usize = 3;

/// Access rules for one authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// System administrator.
    Admin {
        /// Caller id.
        user_id: i64,
    },
    /// Deanship: read everything, write nothing.
    Dean {
        /// Caller id.
        user_id: i64,
    },
    /// Head of department.
    Hod {
        /// Caller id.
        user_id: i64,
        /// Caller department.
        department_id: Option<i64>,
    },
    /// Professor.
    Professor {
        /// Caller id.
        user_id: i64,
        /// Caller department.
        department_id: Option<i64>,
    },
}

/// Who a file belongs to: its uploader, or the professor of its submission
/// when the uploader is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOwner {
    /// Owning user, if any could be determined.
    pub user_id: Option<i64>,
    /// The owner's department.
    pub department_id: Option<i64>,
}

fn same_department(a: Option<i64>, b: Option<i64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

impl AccessPolicy {
    /// Build the policy matching the user's role.
    pub fn for_user(user: &User) -> Self {
        match user.role {
            UserRole::Admin => Self::Admin { user_id: user.id },
            UserRole::Deanship => Self::Dean { user_id: user.id },
            UserRole::Hod => Self::Hod {
                user_id: user.id,
                department_id: user.department_id,
            },
            UserRole::Professor => Self::Professor {
                user_id: user.id,
                department_id: user.department_id,
            },
        }
    }

    /// The caller's id.
    pub fn user_id(&self) -> i64 {
        match *self {
            Self::Admin { user_id }
            | Self::Dean { user_id }
            | Self::Hod { user_id, .. }
            | Self::Professor { user_id, .. } => user_id,
        }
    }

    /// The caller's department, when scoped to one.
    pub fn department_id(&self) -> Option<i64> {
        match *self {
            Self::Admin { .. } | Self::Dean { .. } => None,
            Self::Hod { department_id, .. } | Self::Professor { department_id, .. } => {
                department_id
            }
        }
    }

    /// ADMIN or DEANSHIP.
    pub fn has_admin_level_access(&self) -> bool {
        matches!(self, Self::Admin { .. } | Self::Dean { .. })
    }

    /// Whether the caller may read a file owned by someone in
    /// `owner_department`.
    pub fn can_access_file(&self, owner_department: Option<i64>) -> bool {
        self.has_admin_level_access() || same_department(self.department_id(), owner_department)
    }

    /// Whether the caller may read files of `department_id`.
    pub fn can_access_department_files(&self, department_id: i64) -> bool {
        self.has_admin_level_access() || self.department_id() == Some(department_id)
    }

    /// Only a professor writes, and only into their own folders.
    pub fn can_write(&self, owner_id: i64) -> bool {
        matches!(self, Self::Professor { user_id, .. } if *user_id == owner_id)
    }

    /// Professors and HODs upload into folders they own. Deanship is
    /// read-only here.
    pub fn can_upload_to_folder(&self, owner_id: i64) -> bool {
        match self {
            Self::Professor { user_id, .. } | Self::Hod { user_id, .. } => *user_id == owner_id,
            Self::Admin { .. } | Self::Dean { .. } => false,
        }
    }

    /// Only the owning professor deletes.
    pub fn can_delete(&self, owner_id: i64) -> bool {
        self.can_write(owner_id)
    }

    /// Whether the caller may browse a professor's folders.
    pub fn can_read_professor(&self, professor: &User) -> bool {
        self.has_admin_level_access()
            || professor
                .department_id
                .is_some_and(|dept| self.can_access_department_files(dept))
    }

    /// Whether a directory is visible in listings and trees.
    ///
    /// Year and semester levels are open to everyone. At the professor level
    /// and below, `path_owner` is the professor resolved from the third
    /// segment; an unresolved owner is visible only to admin-level callers.
    pub fn can_view_path(&self, path: &str, path_owner: Option<&User>) -> bool {
        if self.has_admin_level_access() {
            return true;
        }
        let depth = path.split('/').filter(|s| !s.is_empty()).count();
        if depth < PROFESSOR_DEPTH {
            return true;
        }
        path_owner.is_some_and(|owner| same_department(self.department_id(), owner.department_id))
    }

    /// Whether the caller may see a file belonging to `owner`: everything
    /// for admin-level callers, the department's files for an HOD, and a
    /// professor's own files.
    pub fn can_see_file(&self, owner: FileOwner) -> bool {
        match *self {
            Self::Admin { .. } | Self::Dean { .. } => true,
            Self::Hod { department_id, .. } => {
                owner.user_id.is_some() && same_department(department_id, owner.department_id)
            }
            Self::Professor { user_id, .. } => owner.user_id == Some(user_id),
        }
    }

    /// The files of `files` the caller may see.
    pub fn filter_accessible_files<F>(
        &self,
        files: Vec<UploadedFile>,
        owner: F,
    ) -> Vec<UploadedFile>
    where
        F: Fn(&UploadedFile) -> FileOwner,
    {
        files
            .into_iter()
            .filter(|f| self.can_see_file(owner(f)))
            .collect()
    }

    /// Admin-level department filter; `None` keeps everything. Other callers
    /// get nothing.
    pub fn filter_by_department<F>(
        &self,
        files: Vec<UploadedFile>,
        department_id: Option<i64>,
        owner: F,
    ) -> Vec<UploadedFile>
    where
        F: Fn(&UploadedFile) -> FileOwner,
    {
        if !self.has_admin_level_access() {
            return Vec::new();
        }
        match department_id {
            None => files,
            Some(dept) => files
                .into_iter()
                .filter(|f| owner(f).department_id == Some(dept))
                .collect(),
        }
    }
}
