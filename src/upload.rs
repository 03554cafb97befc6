//! Context Upload
//!
//! Sends one knowledge-base file for a chatbot to the ingestion endpoint.
//! Only one upload may be in flight per uploader.

use std::path::Path;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::busy::BusyFlag;
use crate::error::{ClientError, ClientResult};
use crate::forms::{is_accepted_upload, ACCEPTED_EXTENSIONS};

/// A finished upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReport {
    pub file_name: String,
    pub chunks_stored: u64,
}

/// Single-flight uploader bound to one API client
#[derive(Clone)]
pub struct ContextUploader {
    client: Arc<ApiClient>,
    busy: BusyFlag,
}

impl ContextUploader {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            busy: BusyFlag::new(),
        }
    }

    /// Whether the upload control should currently be disabled
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Read `path` and upload it for `chatbot_id`
    pub async fn upload(&self, path: &Path, chatbot_id: &str) -> ClientResult<UploadReport> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation(format!("Invalid file path: {}", path.display())))?
            .to_string();

        if !is_accepted_upload(&file_name) {
            return Err(ClientError::Validation(format!(
                "Unsupported file type. Accepted: {}",
                ACCEPTED_EXTENSIONS.map(|e| format!(".{}", e)).join(", ")
            )));
        }

        let _guard = self
            .busy
            .try_acquire()
            .ok_or_else(|| ClientError::Validation("An upload is already in progress.".into()))?;

        let bytes = tokio::fs::read(path).await?;
        let chunks_stored = self.client.upload_context(&file_name, bytes, chatbot_id).await?;

        Ok(UploadReport {
            file_name,
            chunks_stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::notify::{Notification, UPLOAD_FAILED};
    use crate::session::{MemoryStorage, SessionStore};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::Duration;

    async fn uploader(router: Router) -> ContextUploader {
        let base = mock::serve(router).await;
        let session = Arc::new(SessionStore::boxed(MemoryStorage::default()));
        ContextUploader::new(Arc::new(ApiClient::new(base, session).unwrap()))
    }

    fn write_file(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "Opening hours: 9 to 5").unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_reports_chunks() {
        let router = Router::new().route(
            "/context/upload-file",
            post(|| async { Json(json!({"chunksStored": 5})) }),
        );
        let uploader = uploader(router).await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "faq.txt");

        let report = uploader.upload(&path, "cb1").await.unwrap();
        assert_eq!(report.chunks_stored, 5);
        assert_eq!(report.file_name, "faq.txt");

        let toast = Notification::upload_outcome(&Ok(report.chunks_stored));
        assert!(toast.message.contains('5'));
        assert!(!uploader.is_busy());
    }

    #[tokio::test]
    async fn test_failed_upload_reenables_control() {
        let router = Router::new().route(
            "/context/upload-file",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "parser crashed") }),
        );
        let uploader = uploader(router).await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "brochure.pdf");

        let result = uploader.upload(&path, "cb1").await.map(|r| r.chunks_stored);
        assert!(result.is_err());
        assert_eq!(Notification::upload_outcome(&result).message, UPLOAD_FAILED);
        assert!(!uploader.is_busy());
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let uploader = uploader(Router::new()).await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "logo.png");

        let err = uploader.upload(&path, "cb1").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_second_upload_rejected_while_busy() {
        let router = Router::new().route(
            "/context/upload-file",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Json(json!({"chunksStored": 1}))
            }),
        );
        let uploader = uploader(router).await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "faq.txt");

        let first = {
            let uploader = uploader.clone();
            let path = path.clone();
            tokio::spawn(async move { uploader.upload(&path, "cb1").await })
        };

        // wait until the first upload holds the flag
        while !uploader.is_busy() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let err = uploader.upload(&path, "cb1").await.unwrap_err();
        assert_eq!(err.to_string(), "An upload is already in progress.");

        assert_eq!(first.await.unwrap().unwrap().chunks_stored, 1);
        assert!(!uploader.is_busy());
    }
}
