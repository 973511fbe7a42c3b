//! Case service: reporting, listing and triage.

use std::sync::Arc;

use aashray_common::{
    AppError, AppResult, FieldError, IdGenerator, StorageBackend, case_image_key,
};
use aashray_db::{
    entities::case::{self, CasePriority, CaseStatus, StatusBucket},
    repositories::{CaseFilter, CaseRepository},
};
use bytes::Bytes;
use chrono::Utc;
use image::ImageFormat;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;

const CASE_TYPE_MAX: usize = 100;
const PLACE_SPOTTED_MAX: usize = 255;
const VOLUNTEER_RECENT: u64 = 5;

const ACCEPTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Raw bytes of an uploaded image part. The format is sniffed from the bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
}

/// Raw report fields as submitted by a form or the JSON endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseReportInput {
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub place_spotted: Option<String>,
    #[serde(default)]
    pub needs: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

/// How an absent priority is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityDefault {
    /// The HTML form requires a choice.
    Required,
    /// The JSON endpoint falls back to MEDIUM.
    Medium,
}

#[derive(Debug)]
struct ValidImage {
    data: Bytes,
    format: ImageFormat,
}

#[derive(Debug)]
struct ValidReport {
    case_type: String,
    place_spotted: String,
    needs: String,
    priority: CasePriority,
    image: Option<ValidImage>,
}

fn required_text(
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
    errors: &mut Vec<FieldError>,
) -> String {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.push(FieldError::missing(field));
    } else if let Some(max) = max.filter(|max| value.chars().count() > *max) {
        errors.push(FieldError::too_long(field, max));
    }
    value.to_string()
}

fn check_image(upload: &ImageUpload) -> Result<ImageFormat, FieldError> {
    let invalid = || FieldError::invalid("image", INVALID_IMAGE);

    let format = image::guess_format(&upload.data)
        .ok()
        .filter(|f| ACCEPTED_FORMATS.contains(f))
        .ok_or_else(invalid)?;
    image::load_from_memory_with_format(&upload.data, format).map_err(|_| invalid())?;

    Ok(format)
}

fn validate_report(
    input: &CaseReportInput,
    priority_default: PriorityDefault,
) -> Result<ValidReport, Vec<FieldError>> {
    let mut errors = Vec::new();

    let case_type = required_text(
        "case_type",
        input.case_type.as_deref(),
        Some(CASE_TYPE_MAX),
        &mut errors,
    );
    let place_spotted = required_text(
        "place_spotted",
        input.place_spotted.as_deref(),
        Some(PLACE_SPOTTED_MAX),
        &mut errors,
    );
    let needs = required_text("needs", input.needs.as_deref(), None, &mut errors);

    let priority = match input.priority.as_deref().map(str::trim) {
        None | Some("") => match priority_default {
            PriorityDefault::Medium => Some(CasePriority::Medium),
            PriorityDefault::Required => {
                errors.push(FieldError::missing("priority"));
                None
            }
        },
        Some(raw) => CasePriority::parse(raw).or_else(|| {
            errors.push(FieldError::invalid_choice("priority", raw));
            None
        }),
    };

    // An empty file part means no file was chosen.
    let image = match input.image.as_ref().filter(|u| !u.data.is_empty()) {
        None => None,
        Some(upload) => match check_image(upload) {
            Ok(format) => Some(ValidImage {
                data: upload.data.clone(),
                format,
            }),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    match priority {
        Some(priority) if errors.is_empty() => Ok(ValidReport {
            case_type,
            place_spotted,
            needs,
            priority,
            image,
        }),
        _ => Err(errors),
    }
}

/// Query-string filters of the case board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl BoardQuery {
    /// Translate into a repository filter.
    ///
    /// Empty parameters are ignored. Returns `None` when a parameter names
    /// no known value, meaning nothing can match.
    #[must_use]
    pub fn filter(&self) -> Option<CaseFilter> {
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(CaseStatus::parse(raw)?),
        };
        let priority = match self.priority.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(CasePriority::parse(raw)?),
        };
        Some(CaseFilter { status, priority })
    }
}

/// Cases split into the three team dashboard columns, each newest first.
#[derive(Debug, Clone, Default)]
pub struct TeamBoard {
    pub pending: Vec<case::Model>,
    pub in_progress: Vec<case::Model>,
    pub resolved: Vec<case::Model>,
}

impl TeamBoard {
    /// Partition cases by status bucket, keeping their order.
    #[must_use]
    pub fn from_cases(cases: Vec<case::Model>) -> Self {
        let mut board = Self::default();
        for case in cases {
            match case.status.bucket() {
                StatusBucket::Pending => board.pending.push(case),
                StatusBucket::InProgress => board.in_progress.push(case),
                StatusBucket::Resolved => board.resolved.push(case),
            }
        }
        board
    }
}

/// What a volunteer sees on their home page.
#[derive(Debug, Clone)]
pub struct VolunteerSummary {
    pub recent: Vec<case::Model>,
    pub total: u64,
}

/// Case service for business logic.
#[derive(Clone)]
pub struct CaseService {
    case_repo: CaseRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl CaseService {
    /// Create a new case service.
    #[must_use]
    pub fn new(case_repo: CaseRepository, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            case_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate and store a new case owned by `reporter_id`.
    ///
    /// The status always starts as PENDING.
    pub async fn report(
        &self,
        reporter_id: i64,
        input: CaseReportInput,
        priority_default: PriorityDefault,
    ) -> AppResult<case::Model> {
        let report = validate_report(&input, priority_default).map_err(AppError::InvalidFields)?;

        let image_key = match &report.image {
            Some(image) => {
                let extension = image.format.extensions_str().first().copied().unwrap_or("bin");
                let key = case_image_key(&self.id_gen, extension);
                let stored = self
                    .storage
                    .upload(&key, &image.data, image.format.to_mime_type())
                    .await?;
                tracing::debug!(
                    key = %stored.key,
                    url = %stored.url,
                    size = stored.size,
                    content_type = %stored.content_type,
                    "Stored case image"
                );
                Some(stored.key)
            }
            None => None,
        };

        let now = Utc::now();
        let model = case::ActiveModel {
            case_type: Set(report.case_type),
            place_spotted: Set(report.place_spotted),
            needs: Set(report.needs),
            priority: Set(report.priority),
            image: Set(image_key.clone()),
            status: Set(CaseStatus::Pending),
            reported_by: Set(reporter_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let created = match self.case_repo.create(model).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(key) = image_key {
                    if let Err(cleanup) = self.storage.delete(&key).await {
                        tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned upload");
                    }
                }
                return Err(e);
            }
        };

        tracing::info!(
            case_id = created.id,
            reporter_id,
            priority = created.priority.as_str(),
            "Case reported"
        );
        Ok(created)
    }

    /// Cases on the board, newest first.
    pub async fn board(&self, query: &BoardQuery) -> AppResult<Vec<case::Model>> {
        match query.filter() {
            Some(filter) => self.case_repo.find_filtered(filter).await,
            None => Ok(Vec::new()),
        }
    }

    /// All cases partitioned for the team dashboard.
    pub async fn team_board(&self) -> AppResult<TeamBoard> {
        let cases = self.case_repo.find_filtered(CaseFilter::default()).await?;
        Ok(TeamBoard::from_cases(cases))
    }

    /// Set the status of a case.
    ///
    /// A missing case is [`AppError::CaseNotFound`]. An unknown status leaves
    /// the case untouched and yields [`AppError::InvalidFields`].
    pub async fn update_status(&self, case_id: i64, raw_status: &str) -> AppResult<case::Model> {
        let case = self.case_repo.get_by_id(case_id).await?;

        let raw_status = raw_status.trim();
        let status = match raw_status {
            "" => return Err(AppError::InvalidFields(vec![FieldError::missing("status")])),
            raw => CaseStatus::parse(raw).ok_or_else(|| {
                AppError::InvalidFields(vec![FieldError::invalid_choice("status", raw)])
            })?,
        };

        let previous = case.status;
        let mut model = case.into_active_model();
        model.status = Set(status);
        model.updated_at = Set(Utc::now().into());
        let updated = self.case_repo.update(model).await?;

        tracing::info!(
            case_id,
            from = previous.as_str(),
            to = status.as_str(),
            "Case status updated"
        );
        Ok(updated)
    }

    /// A volunteer's most recent cases and their total.
    pub async fn volunteer_summary(&self, user_id: i64) -> AppResult<VolunteerSummary> {
        let recent = self
            .case_repo
            .find_recent_by_reporter(user_id, VOLUNTEER_RECENT)
            .await?;
        let total = self.case_repo.count_by_reporter(user_id).await?;
        Ok(VolunteerSummary { recent, total })
    }

    /// Public URL of a stored image.
    #[must_use]
    pub fn image_url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }
}
