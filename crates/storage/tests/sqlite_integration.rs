use lms_core::model::CourseId;
use storage::demo::demo_courses;
use storage::repository::{CourseRepository, ProgressRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_course_round_trip() {
    let repo = connect("memdb_courses").await;
    for course in demo_courses().unwrap() {
        repo.upsert_course(&course).await.unwrap();
    }

    let listed = repo.list_courses().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id().as_str(), "nakshi-kantha-basics");

    let original = &demo_courses().unwrap()[0];
    let fetched = repo.get_course(original.id()).await.unwrap();
    assert_eq!(&fetched, original);

    let missing = repo.get_course(&CourseId::new("missing")).await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn sqlite_progress_overwrites_per_course() {
    let repo = connect("memdb_progress").await;
    let kantha = CourseId::new("nakshi-kantha-basics");
    let safety = CourseId::new("workshop-safety");

    assert_eq!(repo.load_progress(&kantha).await.unwrap(), None);

    repo.save_progress(&kantha, r#"{"currentIndex":1}"#).await.unwrap();
    repo.save_progress(&safety, r#"{"currentIndex":0}"#).await.unwrap();
    repo.save_progress(&kantha, r#"{"currentIndex":4}"#).await.unwrap();

    assert_eq!(
        repo.load_progress(&kantha).await.unwrap().as_deref(),
        Some(r#"{"currentIndex":4}"#)
    );
    assert_eq!(
        repo.load_progress(&safety).await.unwrap().as_deref(),
        Some(r#"{"currentIndex":0}"#)
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
