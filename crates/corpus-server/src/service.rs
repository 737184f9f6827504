//! Wires a concrete [`VectorStore`]/[`Embedder`] pair and the ingestion
//! controller into one shared, `Arc`-friendly handle the dispatcher reads
//! from (§4.G, §6 "Persisted state layout").

use std::path::PathBuf;
use std::sync::Arc;

use corpus_config::ServiceConfig;
use corpus_core::INDEXED_FIELDS;
use corpus_embeddings::{Embedder, FastEmbedEmbedder};
use corpus_ingest::IngestionController;
use corpus_store::qdrant::QdrantStore;
use corpus_store::VectorStore;

use crate::error::ServiceError;

pub struct Service {
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub controller: IngestionController,
    pub config: ServiceConfig,
}

impl Service {
    /// Connects to the backend, loads the embedder, and ensures both
    /// logical collections (§6: "two logical collections") plus their
    /// payload indexes exist before the service accepts its first request.
    ///
    /// # Errors
    /// Returns [`ServiceError`] if the backend is unreachable, the
    /// embedder fails to load, or the configured collections can't be
    /// prepared.
    pub async fn bootstrap(config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let store: Arc<dyn VectorStore> = Arc::new(
            QdrantStore::connect(&config.backend.url, Some(&config.backend.api_key))
                .map_err(corpus_ingest::IngestError::from)?,
        );
        let embedder: Arc<dyn Embedder> = Arc::new(
            FastEmbedEmbedder::load(&config.embedder.model_id, None).map_err(corpus_ingest::IngestError::from)?,
        );

        let dimensions = embedder.dimensions();
        for collection in [&config.backend.collection_documents, &config.backend.collection_code] {
            store.ensure_collection(collection, dimensions).await.map_err(corpus_ingest::IngestError::from)?;
            for field in INDEXED_FIELDS {
                let unqualified = field.strip_prefix("meta.").unwrap_or(field);
                store.ensure_payload_index(collection, unqualified).await.map_err(corpus_ingest::IngestError::from)?;
            }
        }

        let controller = IngestionController::new(Arc::clone(&store), Arc::clone(&embedder));
        Ok(Self { store, embedder, controller, config })
    }

    #[must_use]
    pub fn documents_collection(&self) -> &str {
        &self.config.backend.collection_documents
    }

    #[must_use]
    pub fn code_collection(&self) -> &str {
        &self.config.backend.collection_code
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        self.config.general.backup_dir.as_deref().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./backups"))
    }

    #[must_use]
    pub fn pass_threshold(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.config.general.verify_pass_threshold)
    }
}
