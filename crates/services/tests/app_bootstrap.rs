use lms_core::model::{CourseId, PlayerSettings};
use lms_core::time::fixed_clock;
use services::{AppServices, CatalogServiceError, StoreTarget};
use storage::repository::StorageError;

#[tokio::test]
async fn sqlite_store_is_seeded_on_first_use() {
    let target = StoreTarget::Sqlite("sqlite:file:svc_seed?mode=memory&cache=shared".into());
    let app = AppServices::new(&target, None, PlayerSettings::default(), fixed_clock())
        .await
        .unwrap();

    let listed = app.catalog().list().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["nakshi-kantha-basics", "workshop-safety"]);

    let mut player = app
        .open_player(&CourseId::new("workshop-safety"))
        .await
        .unwrap();
    player.go_next().await;

    let reopened = app
        .open_player(&CourseId::new("workshop-safety"))
        .await
        .unwrap();
    assert_eq!(reopened.state().current_index(), 1);
}

#[tokio::test]
async fn course_file_replaces_demo_catalogue() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("courses.json");
    std::fs::write(
        &path,
        r#"[{
            "id": "block-printing",
            "title": "Block Printing",
            "modules": [{ "id": "bp-m1", "title": "Blocks", "lessons": [
                { "id": "bp-l1", "title": "Carving", "type": "text", "body": "Carve with the grain." },
                { "id": "bp-l2", "title": "Registering", "type": "pdf", "file": "docs/bp/register.pdf", "pages": 4 }
            ]}]
        }]"#,
    )
    .unwrap();

    let app = AppServices::new(
        &StoreTarget::Memory,
        Some(&path),
        PlayerSettings::default(),
        fixed_clock(),
    )
    .await
    .unwrap();

    let listed = app.catalog().list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].lesson_count, 2);
    assert!(
        app.open_player(&CourseId::new("nakshi-kantha-basics"))
            .await
            .is_err()
    );

    let err = app.seed_demo().await.unwrap_err();
    assert!(matches!(err, CatalogServiceError::Storage(StorageError::ReadOnly)));
}

#[tokio::test]
async fn missing_course_file_fails_bootstrap() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope.json");
    let result = AppServices::new(
        &StoreTarget::Memory,
        Some(&missing),
        PlayerSettings::default(),
        fixed_clock(),
    )
    .await;
    assert!(result.is_err());
}
