//! Simulated policy upload.
//!
//! No document is read or indexed: the stages only advance on a timer, and a
//! draft policy is registered in the catalog when the sequence succeeds.

use std::{path::Path, sync::Arc, time::Duration};

use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{Months, NaiveDate, Utc};
use tokio::{sync::Mutex, time};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{Catalog, PolicyCategory, PolicyDocument, PolicyStatus};

const DEFAULT_OWNER: &str = "Me";
const DEFAULT_VERSION: &str = "1.0";

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum UploadStage {
    #[default]
    Idle,
    Uploading,
    Scanning,
    Indexing,
    Success,
}

impl UploadStage {
    /// The stage entered when the current one's delay elapses.
    pub(crate) fn next(self) -> Self {
        match self {
            UploadStage::Idle | UploadStage::Success => UploadStage::Idle,
            UploadStage::Uploading => UploadStage::Scanning,
            UploadStage::Scanning => UploadStage::Indexing,
            UploadStage::Indexing => UploadStage::Success,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) file_name: String,
    /// Defaults to the file name without its extension.
    pub(crate) title: Option<String>,
    pub(crate) category: Option<PolicyCategory>,
    pub(crate) owner: Option<String>,
    pub(crate) version: Option<String>,
}

#[derive(SimpleObject, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UploadStatus {
    pub(crate) stage: UploadStage,
    pub(crate) file_name: Option<String>,
    /// Set once the draft policy has been registered.
    pub(crate) policy_id: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum UploadError {
    #[error("no file selected")]
    MissingFile,
    #[error("an upload is already in progress ({0:?})")]
    InProgress(UploadStage),
}

pub(crate) struct Uploader {
    status: Arc<Mutex<UploadStatus>>,
    catalog: Arc<Catalog>,
    stage_delay: Duration,
}

impl Uploader {
    pub(crate) fn new(catalog: Arc<Catalog>, stage_delay: Duration) -> Self {
        Self {
            status: Arc::new(Mutex::new(UploadStatus::default())),
            catalog,
            stage_delay,
        }
    }

    pub(crate) async fn status(&self) -> UploadStatus {
        self.status.lock().await.clone()
    }

    /// Starts the timed sequence. Only one upload runs at a time.
    pub(crate) async fn start(&self, mut form: UploadForm) -> Result<UploadStatus, UploadError> {
        form.file_name = form.file_name.trim().to_string();
        if form.file_name.is_empty() {
            return Err(UploadError::MissingFile);
        }

        let mut status = self.status.lock().await;
        if status.stage != UploadStage::Idle {
            return Err(UploadError::InProgress(status.stage));
        }
        *status = UploadStatus {
            stage: UploadStage::Uploading,
            file_name: Some(form.file_name.clone()),
            policy_id: None,
        };
        let started = status.clone();
        drop(status);

        info!(file_name = %form.file_name, "Upload started");
        tokio::spawn(advance(
            self.status.clone(),
            self.catalog.clone(),
            self.stage_delay,
            form,
        ));
        Ok(started)
    }
}

async fn advance(
    status: Arc<Mutex<UploadStatus>>,
    catalog: Arc<Catalog>,
    stage_delay: Duration,
    form: UploadForm,
) {
    loop {
        time::sleep(stage_delay).await;

        let mut current = status.lock().await;
        let next = current.stage.next();
        info!(stage = ?next, "Upload stage advanced");
        match next {
            UploadStage::Success => {
                let policy = draft_policy(&form, Utc::now().date_naive());
                current.policy_id = Some(policy.id.clone());
                catalog.add_policy(policy).await;
            }
            UploadStage::Idle => {
                *current = UploadStatus::default();
                return;
            }
            _ => {}
        }
        current.stage = next;
    }
}

fn draft_policy(form: &UploadForm, today: NaiveDate) -> PolicyDocument {
    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map_or_else(|| title_from_file_name(&form.file_name), str::to_string);

    PolicyDocument {
        id: Uuid::new_v4().to_string(),
        title,
        category: form.category.unwrap_or(PolicyCategory::Hr),
        last_updated: today,
        status: PolicyStatus::Draft,
        owner: non_blank(form.owner.as_deref()).unwrap_or(DEFAULT_OWNER).to_string(),
        coverage: 0,
        version: non_blank(form.version.as_deref())
            .unwrap_or(DEFAULT_VERSION)
            .to_string(),
        next_review_date: today.checked_add_months(Months::new(12)).unwrap_or(today),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn title_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_string(), |stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1500);

    fn uploader() -> (Arc<Catalog>, Uploader) {
        let catalog = Arc::new(Catalog::with_sample_data());
        (catalog.clone(), Uploader::new(catalog, DELAY))
    }

    fn form(file_name: &str) -> UploadForm {
        UploadForm {
            file_name: file_name.to_string(),
            ..UploadForm::default()
        }
    }

    /// Sleeps into the middle of the `n`th stage after the start.
    async fn into_stage(n: u32) {
        time::sleep(DELAY * n + DELAY / 2).await;
    }

    #[test]
    fn stages_cycle_back_to_idle() {
        let mut stage = UploadStage::Uploading;
        let mut seen = vec![stage];
        while stage != UploadStage::Idle {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                UploadStage::Uploading,
                UploadStage::Scanning,
                UploadStage::Indexing,
                UploadStage::Success,
                UploadStage::Idle,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn upload_walks_through_stages_and_registers_draft() {
        let (catalog, uploader) = uploader();
        let started = uploader.start(form("Vendor_Risk_Standard.pdf")).await.unwrap();
        assert_eq!(started.stage, UploadStage::Uploading);
        assert_eq!(started.file_name.as_deref(), Some("Vendor_Risk_Standard.pdf"));

        into_stage(0).await;
        assert_eq!(uploader.status().await.stage, UploadStage::Uploading);
        time::sleep(DELAY).await;
        assert_eq!(uploader.status().await.stage, UploadStage::Scanning);
        time::sleep(DELAY).await;
        assert_eq!(uploader.status().await.stage, UploadStage::Indexing);
        assert_eq!(catalog.policies(None).await.len(), 5);

        time::sleep(DELAY).await;
        let status = uploader.status().await;
        assert_eq!(status.stage, UploadStage::Success);
        let policies = catalog.policies(None).await;
        assert_eq!(policies.len(), 6);
        let draft = &policies[0];
        assert_eq!(Some(&draft.id), status.policy_id.as_ref());
        assert_eq!(draft.title, "Vendor_Risk_Standard");
        assert_eq!(draft.status, PolicyStatus::Draft);
        assert_eq!(draft.category, PolicyCategory::Hr);
        assert_eq!(draft.owner, DEFAULT_OWNER);
        assert_eq!(draft.version, DEFAULT_VERSION);
        assert_eq!(draft.coverage, 0);

        time::sleep(DELAY).await;
        assert_eq!(uploader.status().await, UploadStatus::default());
    }

    #[tokio::test(start_paused = true)]
    async fn second_upload_is_rejected_until_idle() {
        let (_catalog, uploader) = uploader();
        uploader.start(form("a.pdf")).await.unwrap();
        let err = uploader.start(form("b.pdf")).await.unwrap_err();
        assert_eq!(err, UploadError::InProgress(UploadStage::Uploading));

        into_stage(4).await;
        assert!(uploader.start(form("b.pdf")).await.is_ok());
    }

    #[tokio::test]
    async fn blank_file_name_is_rejected() {
        let (_catalog, uploader) = uploader();
        assert_eq!(
            uploader.start(form("   ")).await.unwrap_err(),
            UploadError::MissingFile
        );
        assert_eq!(uploader.status().await.stage, UploadStage::Idle);
    }

    #[test]
    fn draft_uses_form_values_and_review_date_next_year() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let form = UploadForm {
            file_name: "ignored.docx".to_string(),
            title: Some("Clean Desk Policy".to_string()),
            category: Some(PolicyCategory::Ops),
            owner: Some("Facilities".to_string()),
            version: Some("2.0".to_string()),
        };
        let draft = draft_policy(&form, today);
        assert_eq!(draft.title, "Clean Desk Policy");
        assert_eq!(draft.category, PolicyCategory::Ops);
        assert_eq!(draft.owner, "Facilities");
        assert_eq!(draft.version, "2.0");
        assert_eq!(draft.last_updated, today);
        assert_eq!(
            draft.next_review_date,
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn title_drops_only_last_extension() {
        assert_eq!(title_from_file_name("report.v2.pdf"), "report.v2");
        assert_eq!(title_from_file_name("README"), "README");
    }
}
