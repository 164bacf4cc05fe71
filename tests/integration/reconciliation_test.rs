use archive_entity::folder::FolderType;
use archive_storage::PathResolver;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_deleted_professor_root_is_recreated() {
    let app = TestApp::new().await;
    let (semester, john) = app.seed().await;
    let root = app
        .provisioner
        .create_professor_folder(john.id, semester.academic_year_id, semester.id)
        .await
        .unwrap();
    assert_eq!(root.path, "2024-2025/first/John Doe");

    tokio::fs::remove_dir_all(app.dir.path().join(&root.path))
        .await
        .unwrap();
    let result = app.reconciliation.run_now().await;

    assert_eq!(result.folders_recreated, 1);
    assert!(app.is_dir(&root.path));
    let row = app.stores.folders.find_by_id(root.id).await.unwrap();
    assert_eq!(row, Some(root));
}

#[tokio::test]
async fn test_deleted_custom_folder_disappears_from_listing() {
    let app = TestApp::new().await;
    let (_, john) = app.seed().await;
    let syllabus = app
        .provisioner
        .get_or_create_folder_by_path("/2024-2025/first/John Doe/CS101/syllabus", &john)
        .await
        .unwrap();
    let course = PathResolver::get_parent_path(&syllabus.path);
    let custom = app
        .provisioner
        .create_folder_if_not_exists(&format!("{course}/Projects"), john.id, FolderType::Custom)
        .await
        .unwrap();

    let before = app
        .scanner
        .list_directory(&course, &john, 1, 50, None, None)
        .await
        .unwrap();
    assert!(before.folders.iter().any(|f| f.path == custom.path));

    tokio::fs::remove_dir_all(app.dir.path().join(&custom.path))
        .await
        .unwrap();
    let result = app.reconciliation.run_now().await;

    assert_eq!(result.orphaned_folders_removed, 1);
    assert_eq!(result.folders_recreated, 0);
    assert!(app.stores.folders.find_by_id(custom.id).await.unwrap().is_none());
    let after = app
        .scanner
        .list_directory(&course, &john, 1, 50, None, None)
        .await
        .unwrap();
    assert!(after.folders.iter().all(|f| f.path != custom.path));
    assert_eq!(after.folders.len(), 4);
}
