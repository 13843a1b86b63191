//! Signing workflow orchestration
//!
//! Sequences one signing attempt end to end:
//! transform → embed → store → ledger commit → lifecycle transition.
//!
//! Steps run strictly in order and any failure aborts the rest. The
//! lifecycle transition is the final, only externally-committing step, so
//! a failure anywhere earlier leaves the document's authoritative state
//! untouched and the attempt fully retryable from the same original
//! bytes. The orchestrator itself keeps no per-operation state and never
//! retries on its own; callers decide what to do with each failure kind.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::capture::CaptureExport;
use crate::document::{DocumentRegistry, DocumentState, DocumentStatus, LifecycleError};
use crate::geometry::{self, GeometryError, PageSize, Placement};
use crate::ledger::{CommitIntent, LedgerClient, LedgerError};
use crate::pdf::{self, PdfError};
use crate::storage::{ContentHash, ContentStore, StorageError};

/// Workflow error: the failure kind of whichever step aborted the attempt.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The document has no published content hash to resolve
    #[error("Document {0} has no published content")]
    NoContent(Uuid),
}

/// One signing attempt, fully specified up front.
#[derive(Debug, Clone)]
pub struct SignRequest {
    pub document_id: Uuid,
    pub signer: String,
    /// Where the signature goes, in capture space.
    pub placement: Placement,
    /// The captured raster plus its reference-frame dimensions.
    pub raster: CaptureExport,
    /// The document's current authoritative bytes.
    pub original_pdf: Vec<u8>,
    /// 0-based target page.
    pub page_index: usize,
    /// Native dimensions of the target page.
    pub page: PageSize,
}

/// Result of a committed signing attempt.
#[derive(Debug, Clone)]
pub struct SignOutcome {
    /// The superseding content hash now current on the document.
    pub content_hash: ContentHash,
    pub state: DocumentState,
}

/// Stateless coordinator for the co-signing pipeline.
///
/// Owns no per-operation state; the store and ledger are injected
/// collaborators and the registry holds the authoritative documents.
#[derive(Clone)]
pub struct SigningWorkflow {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn LedgerClient>,
    registry: DocumentRegistry,
}

impl SigningWorkflow {
    pub fn new(store: Arc<dyn ContentStore>, ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            store,
            ledger,
            registry: DocumentRegistry::new(),
        }
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// Register a new Draft document.
    pub async fn create_document(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> DocumentStatus {
        self.registry.create(title, description).await
    }

    /// Publish a Draft: store the initial PDF, commit the publish intent,
    /// then fix the signer set on the document.
    pub async fn publish_document(
        &self,
        id: Uuid,
        signers: Vec<String>,
        pdf_bytes: Vec<u8>,
    ) -> Result<DocumentStatus, WorkflowError> {
        // Misuse is caught before any bytes move.
        let status = self.registry.status(id).await?;
        if status.state != DocumentState::Draft {
            return Err(LifecycleError::AlreadyPublished(status.state).into());
        }
        if signers.iter().all(|s| s.is_empty()) {
            return Err(LifecycleError::EmptySignerSet.into());
        }

        let content_hash = self.store.put(pdf_bytes).await?;
        self.ledger
            .commit(CommitIntent::Publish {
                document_id: id,
                content_hash: content_hash.clone(),
                signers: signers.clone(),
            })
            .await?;

        let status = self.registry.publish(id, signers, content_hash).await?;
        Ok(status)
    }

    /// Run one signing attempt to completion.
    ///
    /// Order: capture-space transform, PDF embed, store put, ledger
    /// commit, lifecycle transition. The per-document lock is taken only
    /// inside the final transition, never across store or ledger awaits.
    pub async fn sign_and_commit(
        &self,
        request: SignRequest,
    ) -> Result<SignOutcome, WorkflowError> {
        // Cheap read-only misuse check before the pipeline runs. The
        // authoritative check repeats under the document lock at the end.
        self.registry
            .ensure_signable(request.document_id, &request.signer)
            .await?;

        let capture = PageSize::new(
            f64::from(request.raster.width),
            f64::from(request.raster.height),
        );
        let rect = geometry::to_page_space(request.placement, capture, request.page)?;
        tracing::debug!(
            document_id = %request.document_id,
            signer = %request.signer,
            page_index = request.page_index,
            x = rect.x,
            y = rect.y,
            "Placed signature in page space"
        );

        let signed_pdf = pdf::embed(
            &request.original_pdf,
            request.page_index,
            &request.raster.png,
            rect,
        )?;

        let content_hash = self.store.put(signed_pdf).await?;

        self.ledger
            .commit(CommitIntent::Signature {
                document_id: request.document_id,
                signer: request.signer.clone(),
                content_hash: content_hash.clone(),
            })
            .await?;

        let status = self
            .registry
            .record_signature(request.document_id, &request.signer, content_hash.clone())
            .await?;

        tracing::info!(
            document_id = %request.document_id,
            signer = %request.signer,
            content_hash = %content_hash,
            state = ?status.state,
            "Signing attempt committed"
        );
        Ok(SignOutcome {
            content_hash,
            state: status.state,
        })
    }

    /// Resolve the document's current authoritative bytes through the
    /// store.
    pub async fn fetch_current(&self, id: Uuid) -> Result<Vec<u8>, WorkflowError> {
        let status = self.registry.status(id).await?;
        let hash = status.content_hash.ok_or(WorkflowError::NoContent(id))?;
        let bytes = self.store.get(&hash).await?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::capture::SignaturePad;
    use crate::ledger::RecordingLedger;
    use crate::storage::InMemoryStore;

    const US_LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    fn sample_pdf() -> Vec<u8> {
        use lopdf::{dictionary, Document, Object, Stream};
        use std::io::Cursor;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut Cursor::new(&mut bytes)).unwrap();
        bytes
    }

    fn sample_capture() -> CaptureExport {
        let mut pad = SignaturePad::new(600, 800).unwrap();
        pad.begin_stroke();
        pad.add_point(20.0, 20.0);
        pad.add_point(180.0, 70.0);
        pad.export().unwrap()
    }

    fn sign_request(id: Uuid, signer: &str, pdf: Vec<u8>) -> SignRequest {
        SignRequest {
            document_id: id,
            signer: signer.to_string(),
            placement: Placement::new(50.0, 50.0, 200.0, 100.0),
            raster: sample_capture(),
            original_pdf: pdf,
            page_index: 0,
            page: US_LETTER,
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn put(&self, _bytes: Vec<u8>) -> Result<ContentHash, StorageError> {
            Err(StorageError::Unavailable("gateway down".into()))
        }

        async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::NotFound(hash.to_string()))
        }
    }

    /// Rejects the first commit, accepts the rest.
    struct FlakyLedger {
        inner: RecordingLedger,
        rejected: AtomicBool,
    }

    impl FlakyLedger {
        fn new() -> Self {
            Self {
                inner: RecordingLedger::new(),
                rejected: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl LedgerClient for FlakyLedger {
        async fn commit(&self, intent: CommitIntent) -> Result<(), LedgerError> {
            if !self.rejected.swap(true, Ordering::SeqCst) {
                return Err(LedgerError::CommitRejected("congested".into()));
            }
            self.inner.commit(intent).await
        }
    }

    async fn published_workflow(
        signers: &[&str],
    ) -> (SigningWorkflow, Arc<InMemoryStore>, Arc<RecordingLedger>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(RecordingLedger::new());
        let workflow = SigningWorkflow::new(store.clone(), ledger.clone());

        let status = workflow.create_document("NDA", "Mutual non-disclosure").await;
        workflow
            .publish_document(
                status.id,
                signers.iter().map(|s| s.to_string()).collect(),
                sample_pdf(),
            )
            .await
            .unwrap();
        (workflow, store, ledger, status.id)
    }

    #[tokio::test]
    async fn test_full_two_signer_flow() {
        let (workflow, store, ledger, id) = published_workflow(&["alice", "bob"]).await;

        let current = workflow.fetch_current(id).await.unwrap();
        let first = workflow
            .sign_and_commit(sign_request(id, "alice", current))
            .await
            .unwrap();
        assert_eq!(first.state, DocumentState::PartiallySigned);

        let current = workflow.fetch_current(id).await.unwrap();
        let second = workflow
            .sign_and_commit(sign_request(id, "bob", current))
            .await
            .unwrap();
        assert_eq!(second.state, DocumentState::Completed);
        assert_ne!(first.content_hash, second.content_hash);

        let status = workflow.registry().status(id).await.unwrap();
        assert!(status.completed);
        assert_eq!(status.content_hash.as_ref(), Some(&second.content_hash));

        // The final bytes resolve through the store and carry a signature.
        let final_bytes = store.get(&second.content_hash).await.unwrap();
        assert!(crate::pdf::embedded_signature_rect(&final_bytes, 0)
            .unwrap()
            .is_some());

        // Publish intent first, then one signature intent per signer.
        let intents = ledger.intents().await;
        assert_eq!(intents.len(), 3);
        assert!(matches!(intents[0], CommitIntent::Publish { .. }));
        assert!(matches!(intents[1], CommitIntent::Signature { .. }));
        assert!(matches!(intents[2], CommitIntent::Signature { .. }));
    }

    #[tokio::test]
    async fn test_out_of_bounds_placement_aborts_before_any_commit() {
        let (workflow, _store, ledger, id) = published_workflow(&["alice"]).await;
        let initial = workflow.registry().status(id).await.unwrap();

        let mut request = sign_request(id, "alice", sample_pdf());
        request.placement = Placement::new(100.0, 700.0, 200.0, 100.0);

        let err = workflow.sign_and_commit(request).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Geometry(GeometryError::PlacementOutOfBounds { .. })
        ));

        let after = workflow.registry().status(id).await.unwrap();
        assert_eq!(after.content_hash, initial.content_hash);
        assert!(after.signed_by.is_empty());
        // Only the publish intent ever reached the ledger.
        assert_eq!(ledger.intents().await.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_document_untouched() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(RecordingLedger::new());
        let workflow = SigningWorkflow::new(store, ledger.clone());
        let status = workflow.create_document("NDA", "desc").await;
        workflow
            .publish_document(status.id, vec!["alice".into()], sample_pdf())
            .await
            .unwrap();

        // Same registry, broken store.
        let broken = SigningWorkflow {
            store: Arc::new(FailingStore),
            ledger: ledger.clone(),
            registry: workflow.registry().clone(),
        };

        let err = broken
            .sign_and_commit(sign_request(status.id, "alice", sample_pdf()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Storage(StorageError::Unavailable(_))
        ));

        let after = workflow.registry().status(status.id).await.unwrap();
        assert!(after.signed_by.is_empty());
        assert_eq!(after.state, DocumentState::AwaitingSignatures);
    }

    #[tokio::test]
    async fn test_commit_rejection_is_retryable_from_same_bytes() {
        let store = Arc::new(InMemoryStore::new());
        let flaky = Arc::new(FlakyLedger::new());
        let workflow = SigningWorkflow::new(store, flaky.clone());
        let status = workflow.create_document("NDA", "desc").await;

        // First publish attempt is rejected at the commit boundary.
        let err = workflow
            .publish_document(status.id, vec!["alice".into()], sample_pdf())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Ledger(LedgerError::CommitRejected(_))
        ));
        let after = workflow.registry().status(status.id).await.unwrap();
        assert_eq!(after.state, DocumentState::Draft);

        // Retry from scratch with the same input succeeds.
        workflow
            .publish_document(status.id, vec!["alice".into()], sample_pdf())
            .await
            .unwrap();
        let after = workflow.registry().status(status.id).await.unwrap();
        assert_eq!(after.state, DocumentState::AwaitingSignatures);
    }

    #[tokio::test]
    async fn test_lifecycle_misuse_never_reaches_the_ledger() {
        let (workflow, _store, ledger, id) = published_workflow(&["alice"]).await;

        let err = workflow
            .sign_and_commit(sign_request(id, "mallory", sample_pdf()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Lifecycle(LifecycleError::UnknownSigner(_))
        ));
        assert_eq!(ledger.intents().await.len(), 1);

        workflow
            .sign_and_commit(sign_request(id, "alice", sample_pdf()))
            .await
            .unwrap();
        let err = workflow
            .sign_and_commit(sign_request(id, "alice", sample_pdf()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Lifecycle(LifecycleError::AlreadySigned(_))
        ));
        // Publish + the single accepted signature.
        assert_eq!(ledger.intents().await.len(), 2);
    }

    #[tokio::test]
    async fn test_publish_misuse_rejected_before_upload() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(RecordingLedger::new());
        let workflow = SigningWorkflow::new(store.clone(), ledger.clone());
        let status = workflow.create_document("NDA", "desc").await;

        let err = workflow
            .publish_document(status.id, vec![], sample_pdf())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Lifecycle(LifecycleError::EmptySignerSet)
        ));
        assert!(store.is_empty().await);
        assert!(ledger.intents().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_current_requires_published_content() {
        let (workflow, _store, _ledger, _id) = published_workflow(&["alice"]).await;
        let draft = workflow.create_document("Draft", "desc").await;

        assert!(matches!(
            workflow.fetch_current(draft.id).await,
            Err(WorkflowError::NoContent(_))
        ));
    }
}
