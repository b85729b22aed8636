use guildhall_core::db::open_db_in_memory;
use guildhall_core::model::image::UserImage;
use guildhall_core::{
    FileReportRequest, RepoError, Report, ReportRepository, ReportService, ReportStatus,
    ReportedThing, SqliteReportRepository, SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;

const PREFIX: &str = "uploads/";

fn create_user(conn: &Connection, username: &str) -> i64 {
    SqliteUserRepository::new(conn)
        .create_user(&User::new(username, format!("{username}@example.com")), "en")
        .unwrap()
}

fn request(owner_id: i64, thing: ReportedThing, images: &[&str]) -> FileReportRequest {
    FileReportRequest {
        owner_id,
        reported_thing: thing,
        reported_thing_title: "Spam post".to_string(),
        message: "This is advertising.".to_string(),
        image_filenames: images.iter().map(|name| name.to_string()).collect(),
        saved_data: None,
    }
}

fn count_user_images(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM user_images;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn filing_a_report_registers_uploaded_images() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let repo = SqliteReportRepository::new(&conn);
    let service = ReportService::new(SqliteReportRepository::new(&conn), PREFIX);

    let report = service
        .file_report(&request(ana, ReportedThing::Activity(7), &["Proof.PNG", "raw"]))
        .unwrap();

    assert_eq!(report.status, ReportStatus::Pending);
    assert!(!report.is_resolved());
    assert_eq!(report.reported_thing, ReportedThing::Activity(7));
    assert_eq!(report.images.len(), 2);

    let first = repo.get_user_image(report.images[0]).unwrap().unwrap();
    assert!(first.image.starts_with("uploads/user_images/"));
    assert!(first.image.ends_with(".png"));
    let second = repo.get_user_image(report.images[1]).unwrap().unwrap();
    assert!(!second.image.contains('.'));
}

#[test]
fn invalid_report_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let service = ReportService::new(SqliteReportRepository::new(&conn), PREFIX);

    let mut invalid = request(ana, ReportedThing::User(3), &["proof.jpg"]);
    invalid.message = "  ".to_string();
    assert!(matches!(
        service.file_report(&invalid),
        Err(RepoError::Validation(_))
    ));

    assert_eq!(count_user_images(&conn), 0);
    assert!(service.pending_reports().unwrap().is_empty());
}

#[test]
fn failed_filing_leaves_no_uploaded_images() {
    let conn = open_db_in_memory().unwrap();
    let service = ReportService::new(SqliteReportRepository::new(&conn), PREFIX);

    let err = service
        .file_report(&request(404, ReportedThing::Activity(1), &["a.png", "b.png"]))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(count_user_images(&conn), 0);
}

#[test]
fn create_report_links_existing_and_new_images_atomically() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let repo = SqliteReportRepository::new(&conn);

    let existing = repo
        .create_user_image(&UserImage::new("uploads/user_images/existing.png"))
        .unwrap();
    let mut report = Report::new(ana, ReportedThing::User(2), "Profile", "Offensive avatar");
    report.images.push(existing);
    let id = repo
        .create_report(&report, &["uploads/user_images/new.png".to_string()])
        .unwrap();
    assert_eq!(repo.get_report(id).unwrap().unwrap().images.len(), 2);
    assert_eq!(count_user_images(&conn), 2);

    let mut dangling = Report::new(ana, ReportedThing::User(2), "Profile", "Again");
    dangling.images.push(9_999);
    assert!(repo
        .create_report(&dangling, &["uploads/user_images/lost.png".to_string()])
        .is_err());
    assert_eq!(count_user_images(&conn), 2);
    assert_eq!(repo.list_reports(None).unwrap().len(), 1);
}

#[test]
fn resolving_moves_report_out_of_pending_queue() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let staff = create_user(&conn, "mod");
    let service = ReportService::new(SqliteReportRepository::new(&conn), PREFIX);

    let first = service
        .file_report(&request(ana, ReportedThing::Activity(1), &[]))
        .unwrap();
    let second = service
        .file_report(&request(ana, ReportedThing::User(staff), &[]))
        .unwrap();

    let pending: Vec<i64> = service
        .pending_reports()
        .unwrap()
        .into_iter()
        .map(|report| report.id)
        .collect();
    assert_eq!(pending, vec![first.id, second.id]);

    let resolved = service
        .resolve(first.id, staff, ReportStatus::Deleted, Some("Removed."))
        .unwrap();
    assert!(resolved.is_resolved());
    assert_eq!(resolved.staff_id, Some(staff));
    assert_eq!(resolved.staff_message.as_deref(), Some("Removed."));

    let pending: Vec<i64> = service
        .pending_reports()
        .unwrap()
        .into_iter()
        .map(|report| report.id)
        .collect();
    assert_eq!(pending, vec![second.id]);
}

#[test]
fn resolve_rejects_pending_status_and_unknown_reports() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let staff = create_user(&conn, "mod");
    let service = ReportService::new(SqliteReportRepository::new(&conn), PREFIX);
    let report = service
        .file_report(&request(ana, ReportedThing::Activity(1), &[]))
        .unwrap();

    assert!(matches!(
        service.resolve(report.id, staff, ReportStatus::Pending, None),
        Err(RepoError::Validation(_))
    ));
    assert!(matches!(
        service.resolve(999, staff, ReportStatus::Ignored, None),
        Err(RepoError::NotFound { entity: "report", .. })
    ));
}

#[test]
fn deleting_staff_user_keeps_resolution_without_staff() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let staff = create_user(&conn, "mod");
    let service = ReportService::new(SqliteReportRepository::new(&conn), PREFIX);
    let report = service
        .file_report(&request(ana, ReportedThing::Activity(1), &[]))
        .unwrap();
    service
        .resolve(report.id, staff, ReportStatus::Edited, None)
        .unwrap();

    SqliteUserRepository::new(&conn).delete_user(staff).unwrap();

    let stored = service.get_report(report.id).unwrap().unwrap();
    assert_eq!(stored.status, ReportStatus::Edited);
    assert_eq!(stored.staff_id, None);
}
