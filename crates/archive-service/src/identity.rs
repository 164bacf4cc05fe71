//! Professor folder names and their resolution back to users.
//!
//! The third segment of every hierarchy path names a professor. Writers
//! produce it with [`generate_professor_folder_name`]; readers map it back
//! with [`IdentityResolver`]. Both sides must agree textually, so nothing
//! else may build or compare professor segments.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_database::UserStore;
use archive_entity::user::User;

/// Prefix of the id-based professor segment.
const ID_PREFIX: &str = "prof_";

/// Characters that may not appear in a professor folder name.
const RESERVED_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// The `prof_<id>` segment of a user.
pub fn id_segment(user_id: i64) -> String {
    format!("{ID_PREFIX}{user_id}")
}

/// Filesystem-safe folder name for a professor.
///
/// Two professors with the same display name get the same folder name.
pub fn generate_professor_folder_name(user: &User) -> String {
    let full_name = format!("{} {}", user.first_name.trim(), user.last_name.trim());
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return id_segment(user.id);
    }

    let replaced: String = full_name
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    let mut previous: Option<char> = None;
    for c in replaced.chars() {
        let c = if c.is_whitespace() { ' ' } else { c };
        if (c == ' ' || c == '_') && previous == Some(c) {
            continue;
        }
        collapsed.push(c);
        previous = Some(c);
    }
    collapsed.trim().to_string()
}

/// Whether `segment` names `user`, either by generated name or by id.
pub fn is_own_segment(user: &User, segment: &str) -> bool {
    segment == generate_professor_folder_name(user) || segment == id_segment(user.id)
}

/// Whether `user` owns the professor folder that `path` lies in.
///
/// Only PROFESSOR callers own folders; paths above the professor level have
/// no owner.
pub fn owns_path(user: &User, path: &str) -> bool {
    if !user.is_professor() {
        return false;
    }
    path.split('/')
        .filter(|s| !s.is_empty())
        .nth(2)
        .is_some_and(|segment| is_own_segment(user, segment))
}

/// Maps professor path segments back to users.
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
}

impl fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    /// Creates a resolver over the user store.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Resolve a segment, failing with `NotFound` when nothing matches.
    pub async fn resolve(&self, segment: &str) -> AppResult<User> {
        self.find(segment)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Professor not found: {segment}")))
    }

    /// Resolve a segment by `prof_<id>`, then the legacy professor tag, then
    /// a scan of active professors comparing generated folder names.
    ///
    /// Colliding names resolve to the professor with the lowest id.
    pub async fn find(&self, segment: &str) -> AppResult<Option<User>> {
        if segment.is_empty() {
            return Ok(None);
        }

        if let Some(id) = segment
            .strip_prefix(ID_PREFIX)
            .and_then(|rest| rest.parse::<i64>().ok())
        {
            if let Some(user) = self.users.find_by_id(id).await? {
                debug!(segment, user_id = user.id, "Resolved professor by id segment");
                return Ok(Some(user));
            }
        }

        if let Some(user) = self.users.find_by_professor_tag(segment).await? {
            debug!(segment, user_id = user.id, "Resolved professor by legacy tag");
            return Ok(Some(user));
        }

        let mut professors = self.users.list_professors(None).await?;
        professors.sort_by_key(|p| p.id);
        let found = professors
            .into_iter()
            .find(|p| generate_professor_folder_name(p) == segment);

        match &found {
            Some(user) => debug!(segment, user_id = user.id, "Resolved professor by folder name"),
            None => warn!(segment, "Could not resolve professor segment"),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use archive_database::MemoryDatabase;
    use archive_entity::user::UserRole;

    use super::*;

    fn named(id: i64, first: &str, last: &str) -> User {
        User {
            id,
            email: format!("u{id}@archive.test"),
            first_name: first.into(),
            last_name: last.into(),
            role: UserRole::Professor,
            department_id: Some(1),
            professor_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_folder_name_sanitization() {
        assert_eq!(generate_professor_folder_name(&named(1, " John ", "Doe ")), "John Doe");
        assert_eq!(generate_professor_folder_name(&named(2, "A/B", "C:D")), "A_B C_D");
        assert_eq!(generate_professor_folder_name(&named(3, "x??", "y")), "x_ y");
        assert_eq!(generate_professor_folder_name(&named(4, "Mary\t\tAnn", "Lee")), "Mary Ann Lee");
        assert_eq!(generate_professor_folder_name(&named(5, "", "  ")), "prof_5");
        assert_eq!(generate_professor_folder_name(&named(6, "<|>", "")), "_");
    }

    #[test]
    fn test_folder_name_never_contains_reserved_characters() {
        let samples = [
            ("a\\b", "c/d"),
            ("e:f*g", "h?i"),
            ("\"j\"", "<k>|l"),
            ("  ", "m\u{7}n"),
        ];
        for (i, (first, last)) in samples.iter().enumerate() {
            let name = generate_professor_folder_name(&named(i as i64, first, last));
            assert!(!name.chars().any(|c| RESERVED_CHARS.contains(&c)), "{name}");
            assert_eq!(name, generate_professor_folder_name(&named(i as i64, first, last)));
        }
    }

    #[test]
    fn test_identical_names_collapse() {
        assert_eq!(
            generate_professor_folder_name(&named(1, "Sam", "Lee")),
            generate_professor_folder_name(&named(2, "Sam", "Lee"))
        );
    }

    #[test]
    fn test_owns_path() {
        let john = named(7, "John", "Doe");
        assert!(owns_path(&john, "2024-2025/first/John Doe"));
        assert!(owns_path(&john, "2024-2025/first/prof_7/CS101 - Intro"));
        assert!(!owns_path(&john, "2024-2025/first"));
        assert!(!owns_path(&john, "2024-2025/first/Jane Roe/x"));

        let mut hod = john.clone();
        hod.role = UserRole::Hod;
        assert!(!owns_path(&hod, "2024-2025/first/John Doe"));
    }

    #[tokio::test]
    async fn test_resolution_strategies() {
        let db = MemoryDatabase::new();
        let john = db.add_user("John", "Doe", UserRole::Professor, Some(1)).await;
        let tagged = db.add_user("Old", "Timer", UserRole::Professor, Some(1)).await;
        db.set_professor_tag(tagged.id, "P-0042").await;
        let resolver = IdentityResolver::new(db.stores().users);

        assert_eq!(resolver.resolve("John Doe").await.unwrap().id, john.id);
        assert_eq!(resolver.resolve(&id_segment(john.id)).await.unwrap().id, john.id);
        assert_eq!(resolver.resolve("P-0042").await.unwrap().id, tagged.id);
        assert!(resolver.resolve("Nobody Here").await.unwrap_err().is_not_found());
        assert!(resolver.find("prof_999").await.unwrap().is_none());
        assert!(resolver.find("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_collision_resolves_to_lowest_id() {
        let db = MemoryDatabase::new();
        let first = db.add_user("Sam", "Lee", UserRole::Professor, Some(1)).await;
        let second = db.add_user("Sam", "Lee", UserRole::Professor, Some(2)).await;
        let resolver = IdentityResolver::new(db.stores().users);

        assert!(first.id < second.id);
        assert_eq!(resolver.resolve("Sam Lee").await.unwrap().id, first.id);
        assert_eq!(
            resolver.resolve(&id_segment(second.id)).await.unwrap().id,
            second.id
        );
    }
}
