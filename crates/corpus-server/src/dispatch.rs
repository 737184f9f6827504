//! Maps one protocol request onto the corresponding `corpus-ingest` /
//! `corpus-search` call and shapes the result into a protocol response
//! payload. The sole place that knows both the wire types and the
//! internal ones.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use corpus_core::{Category, Filter, ImportPolicy};
use corpus_ingest::{ChunkingOptions, IngestError};
use corpus_protocol::requests::*;
use corpus_protocol::responses::*;
use corpus_search::ExportedDocument;
use corpus_store::VectorStore;
use serde_json::Value;

use crate::error::ServiceError;
use crate::service::Service;

fn collection_for(service: &Service, content_type: Option<ContentTypeArg>) -> String {
    match content_type {
        Some(ContentTypeArg::Code) => service.code_collection().to_string(),
        _ => service.documents_collection().to_string(),
    }
}

fn parse_category(raw: &str) -> Result<Category, ServiceError> {
    Category::parse(raw).ok_or_else(|| ServiceError::MalformedRequest(format!("unknown category {raw:?}")))
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, ServiceError> {
    serde_json::from_value(params).map_err(|e| ServiceError::MalformedRequest(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::Io(e.to_string()))
}

async fn ingest_one(
    service: &Service,
    collection: &str,
    content: &str,
    fragment: &corpus_core::MetadataFragment,
    enable_chunking: bool,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<IngestOutcome, IngestError> {
    if enable_chunking {
        let report = service
            .controller
            .ingest_chunked_document(
                collection,
                content,
                fragment,
                ChunkingOptions { enabled: true, chunk_size, chunk_overlap },
            )
            .await?;
        Ok(IngestOutcome::Chunked(ChunkDiffCountsPayload {
            total_chunks: report.counts.total_chunks,
            unchanged: report.counts.unchanged,
            changed: report.counts.changed,
            added: report.counts.added,
            removed: report.counts.removed,
        }))
    } else {
        let report = service.controller.ingest_document(collection, content, fragment, false).await?;
        Ok(IngestOutcome::Whole(IngestReportPayload {
            action: report.action,
            duplicate_level: report.duplicate_level,
            deprecated: report.deprecated,
            new_point_reference: report.new_point_reference,
        }))
    }
}

async fn lookup_by_doc_id(
    service: &Service,
    collection: &str,
    doc_id: &str,
) -> Result<(corpus_core::DocumentEnvelope, String), ServiceError> {
    let filter = Filter::eq("meta.doc_id", doc_id);
    let rows = service
        .store
        .search(collection, &vec![0.0; service.dimensions()], Some(&filter), 1)
        .await
        .map_err(IngestError::from)?;
    let row = rows.into_iter().next().ok_or_else(|| ServiceError::Query(corpus_search::QueryError::NotFound(doc_id.to_string())))?;
    Ok(corpus_ingest::decode_record(row).map_err(ServiceError::from)?)
}

/// Dispatches `tool` with `params` against `service`, returning the data
/// payload a successful [`corpus_protocol::ToolEnvelope`] wraps.
///
/// # Errors
/// Returns [`ServiceError::UnknownTool`] for an unrecognized tool name, or
/// whatever the underlying operation fails with.
#[allow(clippy::too_many_lines)]
pub async fn dispatch(service: &Service, tool: &str, params: Value) -> Result<Value, ServiceError> {
    match tool {
        "add_document" => {
            let req: AddDocumentRequest = parse_params(params)?;
            let outcome = ingest_one(
                service,
                service.documents_collection(),
                &req.content,
                &req.metadata,
                req.enable_chunking,
                req.chunk_size,
                req.chunk_overlap,
            )
            .await?;
            to_value(outcome)
        }
        "add_file" => {
            let req: AddFileRequest = parse_params(params)?;
            let content =
                tokio::fs::read_to_string(&req.file_path).await.map_err(|e| ServiceError::Io(e.to_string()))?;
            let mut fragment = req.metadata;
            if fragment.file_path.is_none() {
                fragment.file_path = Some(req.file_path.clone());
            }
            let outcome = ingest_one(
                service,
                service.documents_collection(),
                &content,
                &fragment,
                req.enable_chunking,
                req.chunk_size,
                req.chunk_overlap,
            )
            .await?;
            to_value(outcome)
        }
        "add_code" => {
            let req: AddCodeRequest = parse_params(params)?;
            let outcome = ingest_one(
                service,
                service.code_collection(),
                &req.content,
                &req.metadata,
                req.enable_chunking,
                req.chunk_size,
                req.chunk_overlap,
            )
            .await?;
            to_value(outcome)
        }
        "add_code_directory" => {
            let req: AddCodeDirectoryRequest = parse_params(params)?;
            to_value(add_code_directory(service, &req).await?)
        }
        "search_documents" => {
            let req: SearchDocumentsRequest = parse_params(params)?;
            to_value(search_documents(service, &req).await?)
        }
        "get_document_by_path" => {
            let req: GetDocumentByPathRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let (envelope, content) =
                corpus_search::get_document_by_path(service.store.as_ref(), &collection, &req.file_path, service.dimensions())
                    .await
                    .map_err(ServiceError::from)?;
            to_value(GetDocumentByPathResponse { envelope, content })
        }
        "get_metadata_stats" => {
            let req: GetMetadataStatsRequest = parse_params(params)?;
            to_value(get_metadata_stats(service, &req).await?)
        }
        "get_stats" => {
            let stats = corpus_search::get_stats(
                service.store.as_ref(),
                service.embedder.as_ref(),
                &[service.documents_collection(), service.code_collection()],
            )
            .await;
            to_value(ServiceStatsResponse {
                backend_reachable: stats.backend_reachable,
                embedder_dimensions: stats.embedder_dimensions,
                collections: stats
                    .collections
                    .into_iter()
                    .map(|c| CollectionStatsPayload { name: c.name, point_count: c.point_count })
                    .collect(),
            })
        }
        "update_document" => {
            let req: UpdateDocumentRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let report = corpus_search::update_document(
                &service.controller,
                &collection,
                &req.point_reference,
                &req.content,
                req.metadata_updates,
            )
            .await
            .map_err(ServiceError::from)?;
            to_value(IngestReportPayload {
                action: report.action,
                duplicate_level: report.duplicate_level,
                deprecated: report.deprecated,
                new_point_reference: report.new_point_reference,
            })
        }
        "update_metadata" => {
            let req: UpdateMetadataRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let count =
                corpus_search::update_metadata(service.store.as_ref(), &collection, &req.point_reference, req.metadata_updates)
                    .await
                    .map_err(ServiceError::from)?;
            to_value(PointCountResponse { count })
        }
        "delete_document" => {
            let req: DeleteDocumentRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let count = corpus_search::delete_document(service.store.as_ref(), &collection, &req.point_reference)
                .await
                .map_err(ServiceError::from)?;
            to_value(PointCountResponse { count })
        }
        "delete_by_filter" => {
            let req: DeleteByFilterRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let count = corpus_search::delete_by_filter(service.store.as_ref(), &collection, &req.filter)
                .await
                .map_err(ServiceError::from)?;
            to_value(PointCountResponse { count })
        }
        "bulk_update_metadata" => {
            let req: BulkUpdateMetadataRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let count = corpus_search::bulk_update_metadata(service.store.as_ref(), &collection, &req.filter, req.patch)
                .await
                .map_err(ServiceError::from)?;
            to_value(PointCountResponse { count })
        }
        "clear_all" => {
            let req: ClearAllRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            corpus_search::clear_all(service.store.as_ref(), &collection, req.confirmed).await.map_err(ServiceError::from)?;
            to_value(ClearAllResponse { cleared: true })
        }
        "get_version_history" => {
            let req: GetVersionHistoryRequest = parse_params(params)?;
            let category = parse_category(&req.category)?;
            let collection = collection_for(service, req.content_type);
            let versions = corpus_search::get_version_history(
                service.store.as_ref(),
                &collection,
                &req.doc_id,
                category,
                req.include_deprecated,
                service.dimensions(),
            )
            .await
            .map_err(ServiceError::from)?;
            to_value(VersionHistoryResponse { versions })
        }
        "verify_document" => {
            let req: VerifyDocumentRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let (envelope, content) = lookup_by_doc_id(service, &collection, &req.point_reference).await?;
            let threshold = service.pass_threshold(req.pass_threshold);
            let report = corpus_search::verify_document(&envelope, &content, threshold);
            to_value(VerifyDocumentResponse {
                checks: QualityChecksPayload {
                    has_content: report.checks.has_content,
                    min_length: report.checks.min_length,
                    no_placeholder: report.checks.no_placeholder,
                    has_required_fields: report.checks.has_required_fields,
                    hash_valid: report.checks.hash_valid,
                    has_status: report.checks.has_status,
                },
                score: report.score,
                passed: report.passed,
            })
        }
        "verify_category" => {
            let req: VerifyCategoryRequest = parse_params(params)?;
            let category = parse_category(&req.category)?;
            let collection = collection_for(service, req.content_type);
            let records = fetch_active_category(service, &collection, category).await?;
            let threshold = service.pass_threshold(req.pass_threshold);
            let (summary, reports) = corpus_search::verify_category(&records, threshold);
            let failures = reports.into_iter().filter(|(_, r)| !r.passed).map(|(doc_id, _)| doc_id).collect();
            to_value(VerifyCategoryResponse {
                total: summary.total,
                passed: summary.passed,
                failed: summary.failed,
                average_score: summary.average_score,
                failures,
            })
        }
        "audit_storage_integrity" => {
            let req: AuditStorageIntegrityRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let extensions: Vec<&str> = req.file_extensions.iter().map(String::as_str).collect();
            let report = corpus_search::audit_storage_integrity(
                service.store.as_ref(),
                &collection,
                Path::new(&req.source_directory),
                req.recursive,
                &extensions,
                service.dimensions(),
            )
            .await
            .map_err(ServiceError::from)?;
            to_value(AuditStorageIntegrityResponse {
                missing: report.missing,
                mismatch: report.mismatch,
                extra: report.extra,
                passed: report.passed,
                integrity_score: report.integrity_score,
            })
        }
        "export_documents" => {
            let req: ExportDocumentsRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let documents = corpus_search::export_documents(service.store.as_ref(), &collection, req.filter.as_ref(), service.dimensions())
                .await
                .map_err(ServiceError::from)?;
            to_value(ExportDocumentsResponse {
                documents: documents
                    .into_iter()
                    .map(|d| ExportedDocumentPayload { envelope: d.envelope, content: d.content, embedding: d.embedding })
                    .collect(),
            })
        }
        "import_documents" => {
            let req: ImportDocumentsRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let documents: Vec<ExportedDocument> =
                req.documents.into_iter().map(parse_params).collect::<Result<_, _>>()?;
            let policy = req.policy.unwrap_or(ImportPolicy::Skip);
            let report = corpus_search::import_documents(&service.controller, service.store.as_ref(), &collection, &documents, policy)
                .await
                .map_err(ServiceError::from)?;
            to_value(ImportDocumentsResponse { imported: report.imported, skipped: report.skipped })
        }
        "create_backup" => {
            let req: CreateBackupRequest = parse_params(params)?;
            let collection = collection_for(service, req.content_type);
            let root = service.backup_root();
            tokio::fs::create_dir_all(&root).await.map_err(|e| ServiceError::Io(e.to_string()))?;
            let dir = corpus_search::create_backup(
                service.store.as_ref(),
                &collection,
                req.filter.as_ref(),
                service.dimensions(),
                &root,
                Utc::now(),
            )
            .await
            .map_err(ServiceError::from)?;
            let metadata = read_backup_metadata(&dir).await?;
            to_value(CreateBackupResponse {
                backup_name: dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
                document_count: metadata.document_count,
            })
        }
        "restore_backup" => {
            let req: RestoreBackupRequest = parse_params(params)?;
            let dir = service.backup_root().join(&req.backup_name);
            let policy = req.policy.unwrap_or(ImportPolicy::Skip);
            let report = corpus_search::restore_backup(&service.controller, service.store.as_ref(), &dir, policy)
                .await
                .map_err(ServiceError::from)?;
            to_value(RestoreBackupResponse { imported: report.imported, skipped: report.skipped })
        }
        "list_backups" => {
            let _req: ListBackupsRequest = parse_params(params)?;
            let root = service.backup_root();
            tokio::fs::create_dir_all(&root).await.map_err(|e| ServiceError::Io(e.to_string()))?;
            let backups = corpus_search::list_backups(&root).await.map_err(ServiceError::from)?;
            to_value(ListBackupsResponse { backups })
        }
        other => Err(ServiceError::UnknownTool(other.to_string())),
    }
}

async fn read_backup_metadata(dir: &Path) -> Result<corpus_search::BackupMetadata, ServiceError> {
    let bytes = tokio::fs::read(dir.join("metadata.json")).await.map_err(|e| ServiceError::Io(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::Io(e.to_string()))
}

async fn fetch_active_category(
    service: &Service,
    collection: &str,
    category: Category,
) -> Result<Vec<(corpus_core::DocumentEnvelope, String)>, ServiceError> {
    let filter = Filter::and(vec![
        Filter::eq("meta.category", category.as_str()),
        Filter::eq("meta.status", corpus_core::Status::Active.as_str()),
    ]);
    let rows = service
        .store
        .search(collection, &vec![0.0; service.dimensions()], Some(&filter), 10_000)
        .await
        .map_err(IngestError::from)?;
    rows.into_iter().map(|row| corpus_ingest::decode_record(row).map_err(ServiceError::from)).collect()
}

async fn search_documents(service: &Service, req: &SearchDocumentsRequest) -> Result<SearchDocumentsResponse, ServiceError> {
    let content_type = req.content_type.unwrap_or(ContentTypeArg::All);
    let collections: Vec<&str> = match content_type {
        ContentTypeArg::Docs => vec![service.documents_collection()],
        ContentTypeArg::Code => vec![service.code_collection()],
        ContentTypeArg::All => vec![service.documents_collection(), service.code_collection()],
    };

    let mut rows = Vec::new();
    for collection in collections {
        let request = corpus_search::SearchRequest {
            query: req.query.clone(),
            top_k: req.top_k,
            content_type: corpus_search::ContentType::All,
            metadata_filters: req.metadata_filters.clone(),
        };
        let mut scored =
            corpus_search::search_documents(service.store.as_ref(), service.embedder.as_ref(), collection, &request)
                .await
                .map_err(ServiceError::from)?;
        rows.append(&mut scored);
    }
    rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(req.top_k);

    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let score = row.score;
        let (envelope, content) = corpus_ingest::decode_record(row).map_err(ServiceError::from)?;
        results.push(ScoredDocumentPayload { envelope, content, score });
    }
    Ok(SearchDocumentsResponse { results })
}

async fn get_metadata_stats(service: &Service, req: &GetMetadataStatsRequest) -> Result<MetadataStatsPayload, ServiceError> {
    let content_type = req.content_type.unwrap_or(ContentTypeArg::All);
    let collections: Vec<&str> = match content_type {
        ContentTypeArg::Docs => vec![service.documents_collection()],
        ContentTypeArg::Code => vec![service.code_collection()],
        ContentTypeArg::All => vec![service.documents_collection(), service.code_collection()],
    };
    let group_by: Vec<&str> = req.group_by_fields.iter().map(String::as_str).collect();

    let mut total = 0u64;
    let mut group_counts: HashMap<String, HashMap<String, u64>> = HashMap::new();
    for collection in collections {
        let stats = corpus_search::get_metadata_stats(service.store.as_ref(), collection, req.filters.as_ref(), &group_by, service.dimensions())
            .await
            .map_err(ServiceError::from)?;
        total += stats.total;
        for (field, counts) in stats.group_counts {
            let entry = group_counts.entry(field).or_default();
            for (value, count) in counts {
                *entry.entry(value).or_insert(0) += count;
            }
        }
    }
    Ok(MetadataStatsPayload { total, group_counts })
}

async fn add_code_directory(service: &Service, req: &AddCodeDirectoryRequest) -> Result<AddCodeDirectoryResponse, ServiceError> {
    let root = PathBuf::from(&req.directory);
    let mut builder = ignore::WalkBuilder::new(&root);
    builder.standard_filters(false).hidden(false);
    if !req.recursive {
        builder.max_depth(Some(1));
    }

    let mut response = AddCodeDirectoryResponse::default();
    for entry in builder.build().filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !req.file_extensions.is_empty() {
            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| req.file_extensions.iter().any(|wanted| wanted == ext));
            if !matches {
                continue;
            }
        }

        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path()).to_string_lossy().to_string();
        let result = match tokio::fs::read_to_string(entry.path()).await {
            Ok(content) => {
                let mut fragment = req.metadata.clone();
                fragment.file_path = Some(relative.clone());
                match ingest_one(
                    service,
                    service.code_collection(),
                    &content,
                    &fragment,
                    req.enable_chunking,
                    req.chunk_size,
                    req.chunk_overlap,
                )
                .await
                {
                    Ok(outcome) => FileIngestResult { file_path: relative, outcome: Some(outcome), error: None },
                    Err(e) => FileIngestResult { file_path: relative, outcome: None, error: Some(e.to_string()) },
                }
            }
            Err(e) => FileIngestResult { file_path: relative, outcome: None, error: Some(e.to_string()) },
        };

        if result.error.is_some() {
            response.failed += 1;
        } else {
            response.succeeded += 1;
        }
        response.results.push(result);
    }
    Ok(response)
}
