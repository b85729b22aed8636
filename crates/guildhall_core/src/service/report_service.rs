//! Moderation report use-case service.

use crate::model::image::{upload_path, UploadKind};
use crate::model::report::{Report, ReportId, ReportStatus, ReportedThing};
use crate::model::user::UserId;
use crate::model::ValidationError;
use crate::repo::report_repo::ReportRepository;
use crate::repo::user_repo::{RepoError, RepoResult};
use log::info;

/// Request model for filing a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReportRequest {
    pub owner_id: UserId,
    pub reported_thing: ReportedThing,
    pub reported_thing_title: String,
    pub message: String,
    /// Original file names of attached uploads.
    pub image_filenames: Vec<String>,
    pub saved_data: Option<String>,
}

pub struct ReportService<R: ReportRepository> {
    repo: R,
    uploaded_files_prefix: String,
}

impl<R: ReportRepository> ReportService<R> {
    pub fn new(repo: R, uploaded_files_prefix: impl Into<String>) -> Self {
        Self {
            repo,
            uploaded_files_prefix: uploaded_files_prefix.into(),
        }
    }

    /// Files the report together with its uploaded images; nothing is
    /// stored when any insert fails.
    pub fn file_report(&self, request: &FileReportRequest) -> RepoResult<Report> {
        let mut report = Report::new(
            request.owner_id,
            request.reported_thing,
            request.reported_thing_title.clone(),
            request.message.clone(),
        );
        report.saved_data = request.saved_data.clone();
        report.validate()?;

        let image_paths: Vec<String> = request
            .image_filenames
            .iter()
            .map(|filename| upload_path(&self.uploaded_files_prefix, UploadKind::UserImage, filename))
            .collect();
        let id = self.repo.create_report(&report, &image_paths)?;
        info!(
            "event=report_file module=report status=ok report_id={id} owner_id={} thing={} thing_id={}",
            request.owner_id,
            request.reported_thing.kind_code(),
            request.reported_thing.id()
        );
        self.require_report(id)
    }

    pub fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        self.repo.get_report(id)
    }

    pub fn pending_reports(&self) -> RepoResult<Vec<Report>> {
        self.repo.list_reports(Some(ReportStatus::Pending))
    }

    /// Records a staff decision. Reports cannot be resolved back to pending.
    pub fn resolve(
        &self,
        id: ReportId,
        staff_id: UserId,
        status: ReportStatus,
        staff_message: Option<&str>,
    ) -> RepoResult<Report> {
        if status == ReportStatus::Pending {
            return Err(RepoError::Validation(ValidationError::InvalidFormat {
                field: "status",
                message: "a resolution cannot be pending".to_string(),
            }));
        }
        self.repo.resolve_report(id, staff_id, status, staff_message)?;
        info!(
            "event=report_resolve module=report status=ok report_id={id} staff_id={staff_id} resolution={}",
            status.as_code()
        );
        self.require_report(id)
    }

    fn require_report(&self, id: ReportId) -> RepoResult<Report> {
        self.repo.get_report(id)?.ok_or(RepoError::NotFound {
            entity: "report",
            id,
        })
    }
}
