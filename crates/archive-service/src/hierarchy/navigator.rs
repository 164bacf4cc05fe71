//! Node resolution over the logical hierarchy.

use serde_json::Value;
use tracing::{debug, warn};

use archive_auth::{AccessEnforcer, AccessPolicy};
use archive_core::error::AppError;
use archive_core::result::AppResult;
use archive_database::Stores;
use archive_entity::academic::{AcademicYear, Course, CourseAssignment, Semester};
use archive_entity::folder::{Folder, FolderType};
use archive_entity::node::{AttachedFile, Breadcrumb, Node, NodeType};
use archive_entity::submission::{DocumentSubmission, DocumentType};
use archive_entity::user::User;

use super::path::HierarchyPath;
use crate::identity::{IdentityResolver, generate_professor_folder_name};

/// Display name of the root node and first breadcrumb.
pub const HOME_NAME: &str = "Home";

/// Prefix of the segment addressing a custom course subfolder.
const CUSTOM_PREFIX: &str = "custom-";

/// Entities resolved along a path, as deep as the path goes.
#[derive(Debug, Default)]
struct Scope {
    year: Option<AcademicYear>,
    semester: Option<Semester>,
    professor: Option<User>,
    course: Option<(Course, CourseAssignment)>,
}

/// Resolves hierarchy paths into nodes, children, files, and breadcrumbs.
#[derive(Debug, Clone)]
pub struct HierarchyNavigator {
    stores: Stores,
    identity: IdentityResolver,
    enforcer: AccessEnforcer,
}

impl HierarchyNavigator {
    /// Creates a new navigator.
    pub fn new(stores: Stores, enforcer: AccessEnforcer) -> Self {
        let identity = IdentityResolver::new(stores.users.clone());
        Self {
            stores,
            identity,
            enforcer,
        }
    }

    /// The node at `path`, with its children and, for document types, its
    /// files.
    pub async fn get_node(&self, path: &str, user: &User) -> AppResult<Node> {
        let parsed = HierarchyPath::parse(path)?;
        let scope = self.resolve(&parsed).await?;
        let policy = AccessPolicy::for_user(user);
        self.check_read(&scope, &policy, &parsed)?;

        let mut node = match parsed.node_type() {
            NodeType::Root => {
                Node::new("/", HOME_NAME, NodeType::Root).with_permissions(true, false, false)
            }
            NodeType::Year => year_node(scope.year()?),
            NodeType::Semester => semester_node(scope.year()?, scope.semester()?),
            NodeType::Professor => professor_node(&parsed, scope.professor()?, user, &policy),
            NodeType::Course => {
                let (course, assignment) = scope.course()?;
                course_node(&parsed, course, assignment, scope.professor()?, &policy)
            }
            NodeType::DocumentType => {
                let segment = parsed.document_type.as_deref().unwrap_or_default();
                let (course, assignment) = scope.course()?;
                let professor = scope.professor()?;
                let children = self
                    .course_subfolders(course, assignment, scope.semester()?)
                    .await?;
                let folder = children
                    .into_iter()
                    .find(|folder| subfolder_segment(folder) == segment || folder.name == segment);
                let doc_type = parsed.parsed_document_type();
                if folder.is_none() && doc_type.is_none() {
                    return Err(AppError::not_found(format!(
                        "Document folder not found: {segment}"
                    )));
                }
                let submissions = self.stores.submissions.list_by_assignment(assignment.id).await?;
                let mut node = document_node(
                    &parsed.truncate(4).build(),
                    folder.as_ref(),
                    doc_type,
                    assignment,
                    professor,
                    &policy,
                    &submissions,
                );
                node.attached_files = self
                    .attached_files(folder.as_ref(), doc_type, assignment, professor)
                    .await?;
                node
            }
        };

        node.children = self.children_of(&parsed, &scope, user, &policy).await?;
        Ok(node)
    }

    /// Immediate children of the node at `path`. Document-type nodes have no
    /// child nodes; their files come from [`get_files`](Self::get_files).
    pub async fn get_children(&self, path: &str, user: &User) -> AppResult<Vec<Node>> {
        let parsed = HierarchyPath::parse(path)?;
        let scope = self.resolve(&parsed).await?;
        let policy = AccessPolicy::for_user(user);
        self.check_read(&scope, &policy, &parsed)?;
        self.children_of(&parsed, &scope, user, &policy).await
    }

    /// Files of the document-type node at `path`, newest order first.
    pub async fn get_files(&self, path: &str, user: &User) -> AppResult<Vec<AttachedFile>> {
        let parsed = HierarchyPath::parse(path)?;
        if parsed.node_type() != NodeType::DocumentType {
            return Err(AppError::invalid_path(format!(
                "Files are only attached to document type paths: '{path}'"
            )));
        }
        let node = self.get_node(path, user).await?;
        Ok(node.attached_files)
    }

    /// Breadcrumbs from the root to `path`. Unresolvable levels end the
    /// trail early.
    pub async fn generate_breadcrumbs(&self, path: &str) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            name: HOME_NAME.to_string(),
            path: "/".to_string(),
            node_type: NodeType::Root,
        }];

        let parsed = match HierarchyPath::parse(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(path, error = %e, "Cannot build breadcrumbs");
                return crumbs;
            }
        };

        for depth in 1..=parsed.depth() {
            let prefix = parsed.truncate(depth);
            let name = match prefix.node_type() {
                NodeType::Root => continue,
                NodeType::Year => prefix.year_code.clone(),
                NodeType::Semester => prefix.semester.map(|s| s.display_name().to_string()),
                NodeType::Professor => {
                    let segment = prefix.professor.clone().unwrap_or_default();
                    match self.identity.find(&segment).await {
                        Ok(found) => Some(found.map(|p| p.display_name()).unwrap_or(segment)),
                        Err(e) => {
                            warn!(path, error = %e, "Breadcrumb professor lookup failed");
                            None
                        }
                    }
                }
                NodeType::Course => prefix.course_code.clone(),
                NodeType::DocumentType => Some(match prefix.parsed_document_type() {
                    Some(doc_type) => doc_type.folder_name().to_string(),
                    None => title_case(prefix.document_type.as_deref().unwrap_or_default()),
                }),
            };
            let Some(name) = name else { break };
            crumbs.push(Breadcrumb {
                name,
                path: prefix.build(),
                node_type: prefix.node_type(),
            });
        }
        crumbs
    }

    async fn resolve(&self, path: &HierarchyPath) -> AppResult<Scope> {
        let mut scope = Scope::default();
        let Some(year_code) = path.year_code.as_deref() else {
            return Ok(scope);
        };
        let year = self
            .stores
            .academic
            .find_year_by_code(year_code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Academic year not found: {year_code}")))?;

        if let Some(semester_type) = path.semester {
            let semester = self
                .stores
                .academic
                .find_semester_by_type(year.id, semester_type)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!(
                        "Semester not found: {year_code}/{semester_type}"
                    ))
                })?;

            if let Some(segment) = path.professor.as_deref() {
                let professor = self.identity.resolve(segment).await?;

                if let Some(code) = path.course_code.as_deref() {
                    let course = self
                        .stores
                        .academic
                        .find_course_by_code(code)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("Course not found: {code}")))?;
                    let assignment = self
                        .stores
                        .academic
                        .find_assignment_for(semester.id, course.id, professor.id)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!(
                                "Course assignment not found: {code} for {}",
                                professor.display_name()
                            ))
                        })?;
                    scope.course = Some((course, assignment));
                }
                scope.professor = Some(professor);
            }
            scope.semester = Some(semester);
        }
        scope.year = Some(year);
        Ok(scope)
    }

    fn check_read(
        &self,
        scope: &Scope,
        policy: &AccessPolicy,
        path: &HierarchyPath,
    ) -> AppResult<()> {
        match &scope.professor {
            Some(professor) => {
                self.enforcer
                    .require_read_professor(policy, professor, &path.build())
            }
            None => Ok(()),
        }
    }

    async fn children_of(
        &self,
        path: &HierarchyPath,
        scope: &Scope,
        user: &User,
        policy: &AccessPolicy,
    ) -> AppResult<Vec<Node>> {
        match path.node_type() {
            NodeType::Root => Ok(self
                .stores
                .academic
                .list_active_years()
                .await?
                .iter()
                .map(year_node)
                .collect()),
            NodeType::Year => {
                let year = scope.year()?;
                let mut semesters = self.stores.academic.list_semesters(year.id).await?;
                semesters.sort_by_key(|s| s.semester_type);
                Ok(semesters.iter().map(|s| semester_node(year, s)).collect())
            }
            NodeType::Semester => {
                let mut professors = if policy.has_admin_level_access() {
                    self.stores.users.list_professors(None).await?
                } else {
                    match policy.department_id() {
                        Some(dept) => self.stores.users.list_professors(Some(dept)).await?,
                        None => Vec::new(),
                    }
                };
                professors.sort_by(|a, b| {
                    (&a.first_name, &a.last_name).cmp(&(&b.first_name, &b.last_name))
                });
                Ok(professors
                    .iter()
                    .map(|professor| {
                        let child = HierarchyPath {
                            professor: Some(generate_professor_folder_name(professor)),
                            ..path.clone()
                        };
                        professor_node(&child, professor, user, policy)
                    })
                    .collect())
            }
            NodeType::Professor => {
                let professor = scope.professor()?;
                let assignments = self
                    .stores
                    .academic
                    .list_assignments(scope.semester()?.id, professor.id)
                    .await?;
                let mut courses = Vec::with_capacity(assignments.len());
                for assignment in assignments {
                    match self.stores.academic.find_course(assignment.course_id).await? {
                        Some(course) => courses.push((course, assignment)),
                        None => warn!(
                            assignment_id = assignment.id,
                            course_id = assignment.course_id,
                            "Assignment references a missing course"
                        ),
                    }
                }
                courses.sort_by(|a, b| a.0.course_name.cmp(&b.0.course_name));
                Ok(courses
                    .iter()
                    .map(|(course, assignment)| {
                        let child = HierarchyPath {
                            course_code: Some(course.course_code.clone()),
                            ..path.clone()
                        };
                        course_node(&child, course, assignment, professor, policy)
                    })
                    .collect())
            }
            NodeType::Course => {
                let (course, assignment) = scope.course()?;
                let professor = scope.professor()?;
                let parent = path.build();
                let submissions = self.stores.submissions.list_by_assignment(assignment.id).await?;
                let subfolders = self
                    .course_subfolders(course, assignment, scope.semester()?)
                    .await?;

                let mut nodes: Vec<Node> = if subfolders.is_empty() {
                    debug!(path = %parent, "No course folder, synthesizing document types");
                    DocumentType::ALL
                        .into_iter()
                        .map(|doc_type| {
                            document_node(
                                &parent,
                                None,
                                Some(doc_type),
                                assignment,
                                professor,
                                policy,
                                &submissions,
                            )
                        })
                        .collect()
                } else {
                    subfolders
                        .iter()
                        .map(|folder| {
                            document_node(
                                &parent,
                                Some(folder),
                                standard_type(folder),
                                assignment,
                                professor,
                                policy,
                                &submissions,
                            )
                        })
                        .collect()
                };
                nodes.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(nodes)
            }
            NodeType::DocumentType => Ok(Vec::new()),
        }
    }

    /// Subfolders of the course folder, empty when it was never provisioned.
    async fn course_subfolders(
        &self,
        course: &Course,
        assignment: &CourseAssignment,
        semester: &Semester,
    ) -> AppResult<Vec<Folder>> {
        match self
            .stores
            .folders
            .find_course_folder(assignment.professor_id, course.id, semester.id)
            .await?
        {
            Some(folder) => self.stores.folders.list_children(folder.id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn attached_files(
        &self,
        folder: Option<&Folder>,
        doc_type: Option<DocumentType>,
        assignment: &CourseAssignment,
        professor: &User,
    ) -> AppResult<Vec<AttachedFile>> {
        let files = match (doc_type, folder) {
            (Some(doc_type), _) => {
                let submission = self
                    .stores
                    .submissions
                    .find_for(assignment.id, doc_type)
                    .await?;
                match submission {
                    Some(submission) => self.stores.files.list_by_submission(submission.id).await?,
                    None => Vec::new(),
                }
            }
            (None, Some(folder)) => {
                let mut files: Vec<_> = self
                    .stores
                    .files
                    .list_all()
                    .await?
                    .into_iter()
                    .filter(|f| f.folder_id == Some(folder.id))
                    .collect();
                files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                files
            }
            (None, None) => Vec::new(),
        };

        let mut attached = Vec::with_capacity(files.len());
        for file in files {
            let uploader = match file.uploader_id {
                Some(id) => self.stores.users.find_by_id(id).await?,
                None => None,
            };
            attached.push(AttachedFile {
                id: file.id,
                original_filename: file.original_filename,
                file_size: file.file_size,
                file_type: file.file_type,
                uploader_name: Some(uploader.as_ref().unwrap_or(professor).display_name()),
                created_at: file.created_at,
                notes: file.notes,
            });
        }
        Ok(attached)
    }
}

impl Scope {
    fn year(&self) -> AppResult<&AcademicYear> {
        self.year
            .as_ref()
            .ok_or_else(|| AppError::internal("Path resolved without a year"))
    }

    fn semester(&self) -> AppResult<&Semester> {
        self.semester
            .as_ref()
            .ok_or_else(|| AppError::internal("Path resolved without a semester"))
    }

    fn professor(&self) -> AppResult<&User> {
        self.professor
            .as_ref()
            .ok_or_else(|| AppError::internal("Path resolved without a professor"))
    }

    fn course(&self) -> AppResult<(&Course, &CourseAssignment)> {
        self.course
            .as_ref()
            .map(|(c, a)| (c, a))
            .ok_or_else(|| AppError::internal("Path resolved without a course"))
    }
}

fn year_node(year: &AcademicYear) -> Node {
    let path = HierarchyPath {
        year_code: Some(year.year_code.clone()),
        ..Default::default()
    };
    Node::new(path.build(), &year.year_code, NodeType::Year)
        .with_entity(year.id)
        .with_permissions(true, false, false)
        .meta("academicYearId", year.id)
        .meta("yearCode", year.year_code.as_str())
}

fn semester_node(year: &AcademicYear, semester: &Semester) -> Node {
    let path = HierarchyPath {
        year_code: Some(year.year_code.clone()),
        semester: Some(semester.semester_type),
        ..Default::default()
    };
    let name = format!("{} - {}", year.year_code, semester.semester_type.display_name());
    Node::new(path.build(), name, NodeType::Semester)
        .with_entity(semester.id)
        .with_permissions(true, false, false)
        .meta("academicYearId", year.id)
        .meta("semesterId", semester.id)
        .meta("yearCode", year.year_code.as_str())
        .meta("semesterType", enum_name(&semester.semester_type))
}

fn professor_node(
    path: &HierarchyPath,
    professor: &User,
    user: &User,
    policy: &AccessPolicy,
) -> Node {
    Node::new(path.build(), professor.display_name(), NodeType::Professor)
        .with_entity(professor.id)
        .with_permissions(
            policy.can_read_professor(professor),
            policy.can_write(professor.id),
            policy.can_delete(professor.id),
        )
        .meta("professorId", professor.id)
        .meta("professorFolderName", generate_professor_folder_name(professor))
        .meta("email", professor.email.as_str())
        .meta("departmentId", professor.department_id)
        .meta("isOwnProfile", professor.id == user.id)
}

fn course_node(
    path: &HierarchyPath,
    course: &Course,
    assignment: &CourseAssignment,
    professor: &User,
    policy: &AccessPolicy,
) -> Node {
    Node::new(path.build(), course.folder_name(), NodeType::Course)
        .with_entity(assignment.id)
        .with_permissions(
            policy.can_read_professor(professor),
            policy.can_write(professor.id),
            policy.can_delete(professor.id),
        )
        .meta("courseId", course.id)
        .meta("courseCode", course.course_code.as_str())
        .meta("courseName", course.course_name.as_str())
        .meta("assignmentId", assignment.id)
        .meta("isOwnCourse", policy.user_id() == professor.id)
}

fn document_node(
    parent: &str,
    folder: Option<&Folder>,
    doc_type: Option<DocumentType>,
    assignment: &CourseAssignment,
    professor: &User,
    policy: &AccessPolicy,
    submissions: &[DocumentSubmission],
) -> Node {
    let segment = match (folder, doc_type) {
        (Some(folder), _) => subfolder_segment(folder),
        (None, Some(doc_type)) => doc_type.url_segment().to_string(),
        (None, None) => String::new(),
    };
    let name = match (folder, doc_type) {
        (Some(folder), _) => folder.name.clone(),
        (None, Some(doc_type)) => doc_type.folder_name().to_string(),
        (None, None) => segment.clone(),
    };
    let is_custom = folder.is_some_and(|f| f.folder_type == FolderType::Custom);
    let file_count: i64 = doc_type
        .map(|doc_type| {
            submissions
                .iter()
                .filter(|s| s.document_type == doc_type)
                .map(|s| i64::from(s.file_count))
                .sum()
        })
        .unwrap_or(0);

    let mut node = Node::new(
        format!("{}/{segment}", parent.trim_end_matches('/')),
        name,
        NodeType::DocumentType,
    )
    .with_permissions(
        policy.can_read_professor(professor),
        policy.can_write(professor.id),
        is_custom && policy.can_delete(professor.id),
    )
    .meta("assignmentId", assignment.id)
    .meta("isOwnCourse", policy.user_id() == professor.id)
    .meta("isCustomFolder", is_custom)
    .meta("fileCount", file_count);
    if let Some(doc_type) = doc_type {
        node = node.meta("documentType", enum_name(&doc_type));
    }
    if let Some(folder) = folder {
        node = node
            .with_entity(folder.id)
            .meta("folderId", folder.id)
            .meta("folderName", folder.name.as_str());
    }
    node
}

fn standard_type(folder: &Folder) -> Option<DocumentType> {
    if folder.folder_type == FolderType::Custom {
        return None;
    }
    DocumentType::from_folder_name(&folder.name)
}

/// Path segment of a course subfolder.
fn subfolder_segment(folder: &Folder) -> String {
    if folder.folder_type == FolderType::Custom {
        return format!("{CUSTOM_PREFIX}{}", folder.id);
    }
    match DocumentType::from_folder_name(&folder.name) {
        Some(doc_type) => doc_type.url_segment().to_string(),
        None => folder.name.to_lowercase().replace(' ', "-"),
    }
}

/// `lab_reports` → `Lab reports`.
pub(crate) fn title_case(segment: &str) -> String {
    let spaced = segment.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn enum_name<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use archive_core::error::ErrorKind;
    use archive_entity::academic::SemesterType;
    use archive_entity::user::UserRole;

    use super::*;
    use crate::context::RequestContext;
    use crate::testing::Fixture;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("lab_reports"), "Lab reports");
        assert_eq!(title_case("x"), "X");
        assert_eq!(title_case(""), "");
    }

    #[tokio::test]
    async fn test_root_year_semester_levels() {
        let fx = Fixture::new().await;
        let (year, _) = fx.academic().await;
        fx.db.add_semester(year.id, SemesterType::Summer).await;
        fx.db.add_semester(year.id, SemesterType::Second).await;
        fx.db.add_year("2025-2026").await;
        fx.db.add_inactive_year("2019-2020").await;
        let admin = fx.user("Ada", "Admin", UserRole::Admin, None).await;

        let root = fx.navigator.get_node("/", &admin).await.unwrap();
        assert_eq!(root.name, HOME_NAME);
        let years: Vec<_> = root.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(years, vec!["2025-2026", "2024-2025"]);

        let semesters = fx.navigator.get_children("/2024-2025", &admin).await.unwrap();
        let paths: Vec<_> = semesters.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/2024-2025/first", "/2024-2025/second", "/2024-2025/summer"]
        );
        assert_eq!(semesters[0].name, "2024-2025 - First Semester");
        assert_eq!(semesters[0].metadata["semesterType"], "FIRST");

        let err = fx.navigator.get_node("/1999-2000", &admin).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_semester_children_by_department() {
        let fx = Fixture::new().await;
        fx.academic().await;
        fx.user("Zed", "Zulu", UserRole::Professor, Some(fx.cs)).await;
        fx.user("Amy", "Alpha", UserRole::Professor, Some(fx.cs)).await;
        fx.user("Mona", "Math", UserRole::Professor, Some(fx.math)).await;

        let dean = fx.user("Dee", "Dean", UserRole::Deanship, None).await;
        let all = fx.navigator.get_children("/2024-2025/first", &dean).await.unwrap();
        let names: Vec<_> = all.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Amy Alpha", "Mona Math", "Zed Zulu"]);
        assert_eq!(all[0].path, "/2024-2025/first/Amy Alpha");

        let hod = fx.user("Hana", "Head", UserRole::Hod, Some(fx.cs)).await;
        let cs: Vec<_> = fx
            .navigator
            .get_children("/2024-2025/first", &hod)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(cs, vec!["Amy Alpha", "Zed Zulu"]);

        let loner = fx.user("No", "Dept", UserRole::Professor, None).await;
        let none = fx.navigator.get_children("/2024-2025/first", &loner).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_professor_and_course_levels() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS201", "Zeta Systems", &john).await;
        let (course, assignment) = fx.assign(&semester, "CS101", "Algorithms", &john).await;

        let node = fx.navigator.get_node("/2024-2025/first/John Doe", &john).await.unwrap();
        assert_eq!(node.entity_id, Some(john.id));
        assert!(node.can_write);
        let courses: Vec<_> = node.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(courses, vec!["CS101 - Algorithms", "CS201 - Zeta Systems"]);
        assert_eq!(node.children[0].path, "/2024-2025/first/John Doe/CS101");
        assert_eq!(node.children[0].entity_id, Some(assignment.id));

        // Unprovisioned course: the four standard types are synthesized.
        let course_path = "/2024-2025/first/John Doe/CS101";
        let docs = fx.navigator.get_children(course_path, &john).await.unwrap();
        assert_eq!(docs.len(), 4);
        assert!(docs.iter().all(|d| d.entity_id.is_none()));
        assert!(docs.iter().any(|d| d.path == format!("{course_path}/course_notes")));

        // Provisioned: real folders mapped back to segments, plus a custom one.
        let folders = fx
            .provisioner
            .create_course_folder_structure(
                john.id,
                course.id,
                semester.academic_year_id,
                semester.id,
            )
            .await
            .unwrap();
        let custom = fx
            .provisioner
            .create_folder_if_not_exists(
                &format!("{}/Lab Work", folders[0].path),
                john.id,
                FolderType::Custom,
            )
            .await
            .unwrap();
        let docs = fx.navigator.get_children(course_path, &john).await.unwrap();
        assert_eq!(docs.len(), 5);
        let syllabus = docs.iter().find(|d| d.name == "Syllabus").unwrap();
        assert_eq!(syllabus.path, format!("{course_path}/syllabus"));
        assert_eq!(syllabus.entity_id, Some(folders[1].id));
        assert!(!syllabus.can_delete);
        let lab = docs.iter().find(|d| d.name == "Lab Work").unwrap();
        assert_eq!(lab.path, format!("{course_path}/custom-{}", custom.id));
        assert!(lab.can_delete);

        // The same node under the id segment.
        let by_id = fx
            .navigator
            .get_node(&format!("/2024-2025/first/prof_{}/CS101", john.id), &john)
            .await
            .unwrap();
        assert_eq!(by_id.entity_id, Some(assignment.id));

        let err = fx
            .navigator
            .get_node("/2024-2025/first/John Doe/CS999", &john)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_document_files_and_read_check() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;
        let ctx = RequestContext::new(john.clone());
        let path = "/2024-2025/first/John Doe/CS101/syllabus";
        fx.archive
            .store_file(&ctx, path, "outline.pdf", Bytes::from("one"), None)
            .await
            .unwrap();
        fx.archive
            .store_file(&ctx, path, "reading.pdf", Bytes::from("two"), Some("week 1".into()))
            .await
            .unwrap();

        let node = fx.navigator.get_node(path, &john).await.unwrap();
        assert_eq!(node.node_type, NodeType::DocumentType);
        assert_eq!(node.name, "Syllabus");
        assert!(node.entity_id.is_some());
        assert_eq!(node.metadata["fileCount"], 2);
        assert_eq!(node.attached_files.len(), 2);
        assert!(node
            .attached_files
            .iter()
            .all(|f| f.uploader_name.as_deref() == Some("John Doe")));

        let files = fx.navigator.get_files(path, &john).await.unwrap();
        assert_eq!(files.len(), 2);

        let hod = fx.user("Hana", "Head", UserRole::Hod, Some(fx.cs)).await;
        assert_eq!(fx.navigator.get_files(path, &hod).await.unwrap().len(), 2);

        let outsider = fx.user("Mona", "Math", UserRole::Professor, Some(fx.math)).await;
        let err = fx.navigator.get_node(path, &outsider).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err = fx
            .navigator
            .get_children("/2024-2025/first/John Doe", &outsider)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = fx.navigator.get_files("/2024-2025", &john).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
    }

    #[tokio::test]
    async fn test_breadcrumbs() {
        let fx = Fixture::new().await;
        let (_, semester) = fx.academic().await;
        let john = fx.user("John", "Doe", UserRole::Professor, Some(fx.cs)).await;
        fx.assign(&semester, "CS101", "Algorithms", &john).await;

        let crumbs = fx
            .navigator
            .generate_breadcrumbs(&format!("/2024-2025/first/prof_{}/CS101/course_notes", john.id))
            .await;
        let names: Vec<_> = crumbs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Home", "2024-2025", "First Semester", "John Doe", "CS101", "Course Notes"]
        );
        assert_eq!(crumbs[2].path, "/2024-2025/first");
        assert_eq!(crumbs[5].node_type, NodeType::DocumentType);

        let custom = fx
            .navigator
            .generate_breadcrumbs("/2024-2025/first/Ghost/CS101/lab_reports")
            .await;
        assert_eq!(custom[3].name, "Ghost");
        assert_eq!(custom[5].name, "Lab reports");

        let root = fx.navigator.generate_breadcrumbs("/").await;
        assert_eq!(root.len(), 1);
        let bad = fx.navigator.generate_breadcrumbs("/a/b/c/d/e/f").await;
        assert_eq!(bad.len(), 1);
    }
}
