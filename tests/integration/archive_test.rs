use bytes::Bytes;

use archive_core::error::ErrorKind;
use archive_entity::node::NodeType;
use archive_entity::user::UserRole;
use archive_service::RequestContext;

use crate::helpers::TestApp;

const SYLLABUS: &str = "/2024-2025/first/John Doe/CS101/syllabus";

#[tokio::test]
async fn test_syllabus_upload_is_navigable_and_department_scoped() {
    let app = TestApp::new().await;
    let (_, john) = app.seed().await;

    let file = app
        .archive
        .store_file(
            &RequestContext::new(john.clone()),
            SYLLABUS,
            "syllabus.pdf",
            Bytes::from("%PDF-1.7"),
            None,
        )
        .await
        .unwrap();
    assert!(file.file_url.starts_with("2024-2025/first/John Doe/CS101"));
    assert!(file.file_url.contains("/Syllabus/"));
    assert_eq!(
        app.store.read_bytes(&file.file_url).await.unwrap(),
        Bytes::from("%PDF-1.7")
    );

    let node = app.navigator.get_node(SYLLABUS, &john).await.unwrap();
    assert_eq!(node.path, SYLLABUS);
    assert_eq!(node.node_type, NodeType::DocumentType);
    assert_eq!(node.attached_files.len(), 1);
    assert_eq!(node.attached_files[0].original_filename, "syllabus.pdf");

    let hod = app.db.add_user("Hana", "Head", UserRole::Hod, Some(1)).await;
    let (read, _) = app
        .archive
        .read_file(&RequestContext::new(hod.clone()), file.id)
        .await
        .unwrap();
    assert_eq!(read.id, file.id);
    assert_eq!(app.navigator.get_files(SYLLABUS, &hod).await.unwrap().len(), 1);

    let math = app
        .db
        .add_user("Mona", "Math", UserRole::Professor, Some(2))
        .await;
    let err = app
        .archive
        .read_file(&RequestContext::new(math.clone()), file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    let err = app.navigator.get_node(SYLLABUS, &math).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_hierarchy_walk_from_root() {
    let app = TestApp::new().await;
    let (_, john) = app.seed().await;

    let root = app.navigator.get_node("/", &john).await.unwrap();
    assert_eq!(root.node_type, NodeType::Root);
    assert_eq!(root.children.len(), 1);

    let mut path = root.children[0].path.clone();
    for expected in [NodeType::Semester, NodeType::Professor, NodeType::Course] {
        let children = app.navigator.get_children(&path, &john).await.unwrap();
        assert_eq!(children.len(), 1, "{path}");
        assert_eq!(children[0].node_type, expected);
        path = children[0].path.clone();
    }
    assert_eq!(path, "/2024-2025/first/John Doe/CS101");

    let types = app.navigator.get_children(&path, &john).await.unwrap();
    assert_eq!(types.len(), 4);
    assert!(types.iter().all(|t| t.node_type == NodeType::DocumentType));

    let crumbs = app.navigator.generate_breadcrumbs(SYLLABUS).await;
    let names: Vec<_> = crumbs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"Home"));
    assert_eq!(names.last(), Some(&"Syllabus"));
    assert_eq!(crumbs.len(), 6);
}

#[tokio::test]
async fn test_delete_removes_row_and_bytes() {
    let app = TestApp::new().await;
    let (_, john) = app.seed().await;
    let ctx = RequestContext::new(john.clone());

    let file = app
        .archive
        .store_file(&ctx, SYLLABUS, "old.pdf", Bytes::from("x"), None)
        .await
        .unwrap();
    app.archive.delete_file(&ctx, file.id).await.unwrap();

    assert!(app.stores.files.find_by_id(file.id).await.unwrap().is_none());
    assert!(!app.store.exists(&file.file_url).await.unwrap());
    let err = app.archive.read_file(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
