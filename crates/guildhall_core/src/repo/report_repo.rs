//! Moderation report and uploaded image repository.

use crate::model::image::{UserImage, UserImageId};
use crate::model::report::{Report, ReportId, ReportStatus, ReportedThing};
use crate::model::user::UserId;
use crate::repo::user_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const REPORT_SELECT_SQL: &str = "SELECT
    id,
    created_at,
    updated_at,
    owner_id,
    reported_thing,
    reported_thing_title,
    reported_thing_id,
    message,
    staff_id,
    staff_message,
    status,
    saved_data
FROM reports";

pub trait ReportRepository {
    fn create_user_image(&self, image: &UserImage) -> RepoResult<UserImageId>;
    fn get_user_image(&self, id: UserImageId) -> RepoResult<Option<UserImage>>;
    /// Inserts the report, a `user_images` row per entry of `new_image_paths`
    /// and links to those plus `report.images`, all in one transaction.
    fn create_report(&self, report: &Report, new_image_paths: &[String]) -> RepoResult<ReportId>;
    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>>;
    /// Oldest first, optionally restricted to one status.
    fn list_reports(&self, status: Option<ReportStatus>) -> RepoResult<Vec<Report>>;
    fn resolve_report(
        &self,
        id: ReportId,
        staff_id: UserId,
        status: ReportStatus,
        staff_message: Option<&str>,
    ) -> RepoResult<()>;
}

pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_image_ids(&self, report_id: ReportId) -> RepoResult<Vec<UserImageId>> {
        let mut stmt = self.conn.prepare(
            "SELECT image_id FROM report_images WHERE report_id = ?1 ORDER BY image_id ASC;",
        )?;
        let ids = stmt
            .query_map([report_id], |row| row.get(0))?
            .collect::<Result<Vec<UserImageId>, _>>()?;
        Ok(ids)
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn create_user_image(&self, image: &UserImage) -> RepoResult<UserImageId> {
        self.conn.execute(
            "INSERT INTO user_images (image) VALUES (?1);",
            [image.image.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_user_image(&self, id: UserImageId) -> RepoResult<Option<UserImage>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, image FROM user_images WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(UserImage {
                id: row.get("id")?,
                image: row.get("image")?,
            }));
        }
        Ok(None)
    }

    fn create_report(&self, report: &Report, new_image_paths: &[String]) -> RepoResult<ReportId> {
        report.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO reports (
                owner_id,
                reported_thing,
                reported_thing_title,
                reported_thing_id,
                message,
                staff_id,
                staff_message,
                status,
                saved_data
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                report.owner_id,
                report.reported_thing.kind_code(),
                report.reported_thing_title.as_str(),
                report.reported_thing.id(),
                report.message.as_str(),
                report.staff_id,
                report.staff_message.as_deref(),
                report.status.as_code(),
                report.saved_data.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        let mut image_ids = report.images.clone();
        for path in new_image_paths {
            tx.execute("INSERT INTO user_images (image) VALUES (?1);", [path.as_str()])?;
            image_ids.push(tx.last_insert_rowid());
        }
        for image_id in &image_ids {
            tx.execute(
                "INSERT OR IGNORE INTO report_images (report_id, image_id) VALUES (?1, ?2);",
                params![id, image_id],
            )?;
        }
        tx.commit()?;
        Ok(id)
    }

    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPORT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut report = parse_report_row(row)?;
            report.images = self.load_image_ids(report.id)?;
            return Ok(Some(report));
        }
        Ok(None)
    }

    fn list_reports(&self, status: Option<ReportStatus>) -> RepoResult<Vec<Report>> {
        let mut sql = format!("{REPORT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Integer(status.as_code()));
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next()? {
            reports.push(parse_report_row(row)?);
        }
        for report in &mut reports {
            report.images = self.load_image_ids(report.id)?;
        }
        Ok(reports)
    }

    fn resolve_report(
        &self,
        id: ReportId,
        staff_id: UserId,
        status: ReportStatus,
        staff_message: Option<&str>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reports
             SET
                staff_id = ?2,
                status = ?3,
                staff_message = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, staff_id, status.as_code(), staff_message],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "report",
                id,
            });
        }
        Ok(())
    }
}

fn parse_report_row(row: &Row<'_>) -> RepoResult<Report> {
    let kind: String = row.get("reported_thing")?;
    let thing_id: i64 = row.get("reported_thing_id")?;
    let reported_thing = ReportedThing::from_parts(&kind, thing_id).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid reported thing `{kind}` in reports.reported_thing"
        ))
    })?;

    let status_code: i64 = row.get("status")?;
    let status = ReportStatus::from_code(status_code).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_code}` in reports.status"))
    })?;

    Ok(Report {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        owner_id: row.get("owner_id")?,
        reported_thing,
        reported_thing_title: row.get("reported_thing_title")?,
        message: row.get("message")?,
        images: Vec::new(),
        staff_id: row.get("staff_id")?,
        staff_message: row.get("staff_message")?,
        status,
        saved_data: row.get("saved_data")?,
    })
}
