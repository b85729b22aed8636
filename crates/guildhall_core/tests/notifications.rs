use guildhall_core::db::open_db_in_memory;
use guildhall_core::{
    FormatError, NotificationFormatter, NotificationService, NotifyRequest, RepoError,
    SiteConfig, SqliteNotificationRepository, SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;

const LIKED: u32 = 1;
const FOLLOWED: u32 = 2;

fn create_user(conn: &Connection, username: &str) -> i64 {
    SqliteUserRepository::new(conn)
        .create_user(&User::new(username, format!("{username}@example.com")), "en")
        .unwrap()
}

fn service(
    conn: &Connection,
) -> NotificationService<SqliteNotificationRepository<'_>, SqliteUserRepository<'_>> {
    NotificationService::new(
        SqliteNotificationRepository::new(conn),
        SqliteUserRepository::new(conn),
    )
}

fn request(owner_id: i64, message: u32, data: &[&str]) -> NotifyRequest {
    NotifyRequest {
        owner_id,
        message,
        message_data: data.iter().map(|value| value.to_string()).collect(),
        ..NotifyRequest::default()
    }
}

fn unread(conn: &Connection, user_id: i64) -> u32 {
    SqliteUserRepository::new(conn)
        .get_preferences(user_id)
        .unwrap()
        .unwrap()
        .unread_notifications
}

fn site_config() -> SiteConfig {
    SiteConfig::from_json_str(
        r#"{
            "notifications": {
                "1": {
                    "message": "{} liked your activity.",
                    "url": "/activities/{1}/",
                    "icon": "heart"
                },
                "2": {
                    "message": "{} followed you.",
                    "url": "/user/{0}/",
                    "icon": "users"
                }
            },
            "translations": {
                "fr": {"{} followed you.": "{} vous suit."}
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn notify_stores_arguments_and_bumps_unread_counter() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let service = service(&conn);

    let created = service
        .notify(&request(ana, LIKED, &["bo", "12"]))
        .unwrap();
    service.notify(&request(ana, FOLLOWED, &["cy"])).unwrap();

    assert!(created.id > 0);
    assert!(!created.seen);
    assert!(!created.email_sent);
    assert_eq!(created.message_args(), vec!["bo", "12"]);
    assert_eq!(created.url_args(), vec!["bo", "12"]);
    assert_eq!(unread(&conn, ana), 2);
}

#[test]
fn notify_unknown_owner_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn)
        .notify(&request(404, LIKED, &["bo"]))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "user", id: 404 }));
}

#[test]
fn mark_seen_decrements_once_and_filters_unseen_listing() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let service = service(&conn);
    let first = service.notify(&request(ana, LIKED, &["bo", "1"])).unwrap();
    let second = service.notify(&request(ana, FOLLOWED, &["cy"])).unwrap();

    assert!(service.mark_seen(first.id).unwrap());
    assert!(!service.mark_seen(first.id).unwrap());
    assert_eq!(unread(&conn, ana), 1);

    let unseen: Vec<i64> = service
        .list_for_owner(ana, false, None)
        .unwrap()
        .into_iter()
        .map(|notification| notification.id)
        .collect();
    assert_eq!(unseen, vec![second.id]);

    let all: Vec<i64> = service
        .list_for_owner(ana, true, None)
        .unwrap()
        .into_iter()
        .map(|notification| notification.id)
        .collect();
    assert_eq!(all, vec![second.id, first.id]);

    assert!(matches!(
        service.mark_seen(999),
        Err(RepoError::NotFound {
            entity: "notification",
            ..
        })
    ));
}

#[test]
fn pending_emails_honor_opt_outs_and_sent_state() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let bo = create_user(&conn, "bo");
    let users = SqliteUserRepository::new(&conn);
    let service = service(&conn);

    let mut prefs = users.get_preferences(ana).unwrap().unwrap();
    prefs.save_email_notifications_turned_off(&[FOLLOWED]);
    users.update_preferences(&prefs).unwrap();

    let ana_liked = service.notify(&request(ana, LIKED, &["bo", "1"])).unwrap();
    service.notify(&request(ana, FOLLOWED, &["bo"])).unwrap();
    let bo_followed = service.notify(&request(bo, FOLLOWED, &["ana"])).unwrap();

    let pending: Vec<i64> = service
        .pending_emails(None)
        .unwrap()
        .into_iter()
        .map(|notification| notification.id)
        .collect();
    assert_eq!(pending, vec![ana_liked.id, bo_followed.id]);

    service.mark_email_sent(ana_liked.id).unwrap();
    let pending: Vec<i64> = service
        .pending_emails(None)
        .unwrap()
        .into_iter()
        .map(|notification| notification.id)
        .collect();
    assert_eq!(pending, vec![bo_followed.id]);
}

#[test]
fn opted_out_backlog_does_not_hide_eligible_emails() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let bo = create_user(&conn, "bo");
    let users = SqliteUserRepository::new(&conn);
    let service = service(&conn);

    let mut prefs = users.get_preferences(ana).unwrap().unwrap();
    prefs.save_email_notifications_turned_off(&[FOLLOWED]);
    users.update_preferences(&prefs).unwrap();

    for _ in 0..205 {
        service.notify(&request(ana, FOLLOWED, &["cy"])).unwrap();
    }
    let eligible: Vec<i64> = (0..3)
        .map(|_| service.notify(&request(bo, LIKED, &["ana", "1"])).unwrap().id)
        .collect();

    let ids = |limit: Option<u32>| -> Vec<i64> {
        service
            .pending_emails(limit)
            .unwrap()
            .into_iter()
            .map(|notification| notification.id)
            .collect()
    };
    assert_eq!(ids(None), eligible);
    assert_eq!(ids(Some(2)), eligible[..2].to_vec());
}

#[test]
fn pending_emails_fail_on_corrupt_opt_out_lists() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let service = service(&conn);
    service.notify(&request(ana, LIKED, &["bo", "1"])).unwrap();

    conn.execute(
        "UPDATE user_preferences SET email_notifications_turned_off_string = '1,x' WHERE user_id = ?1;",
        [ana],
    )
    .unwrap();

    assert!(matches!(
        service.pending_emails(None),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn stored_notifications_render_with_configured_templates() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let service = service(&conn);
    let config = site_config();

    let liked = service
        .notify(&NotifyRequest {
            url_data: Some(vec!["ignored".to_string(), "42".to_string()]),
            ..request(ana, LIKED, &["bo, the \"great\""])
        })
        .unwrap();
    let followed = service.notify(&request(ana, FOLLOWED, &["cy"])).unwrap();

    let english = config.translator("en");
    let formatter = NotificationFormatter::new(&config.notifications, &english);
    let rendered = formatter.render(&liked).unwrap();
    assert_eq!(rendered.message, "bo, the \"great\" liked your activity.");
    assert_eq!(rendered.url, "/activities/42/");
    assert_eq!(rendered.icon, "heart");

    let french = config.translator("fr");
    let formatter = NotificationFormatter::new(&config.notifications, &french);
    assert_eq!(formatter.localized_message(&followed).unwrap(), "cy vous suit.");
    assert_eq!(formatter.website_url(&followed).unwrap(), "/user/cy/");
}

#[test]
fn rendering_reports_unknown_codes_and_missing_arguments() {
    let conn = open_db_in_memory().unwrap();
    let ana = create_user(&conn, "ana");
    let service = service(&conn);
    let config = site_config();
    let translator = config.translator("en");
    let formatter = NotificationFormatter::new(&config.notifications, &translator);

    let unknown = service.notify(&request(ana, 77, &["x"])).unwrap();
    assert_eq!(
        formatter.render(&unknown).unwrap_err(),
        FormatError::UnknownMessage(77)
    );

    let short = service.notify(&request(ana, LIKED, &["bo"])).unwrap();
    assert!(formatter.localized_message(&short).is_ok());
    assert!(matches!(
        formatter.website_url(&short),
        Err(FormatError::MissingArgument {
            code: LIKED,
            index: 1,
            provided: 1
        })
    ));
}
