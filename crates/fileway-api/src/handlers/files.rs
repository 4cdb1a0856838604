//! File resource handlers: create, transfer, live status, download.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use fileway_core::models::{CreateFileRequest, FileRecord};
use fileway_core::AppError;
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::services::relay::UploadRelay;
use crate::services::status;
use crate::state::AppState;

/// Create a file record: assign an id, obtain a blob-store location, and
/// persist the record with status `init`.
#[tracing::instrument(skip(state, request), fields(operation = "create_file"))]
pub async fn create_file(
    State(state): State<AppState>,
    Json(request): Json<CreateFileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("file name must not be empty".to_string()).into());
    }

    let url = state.blobs.allocate(name).await.map_err(AppError::from)?;
    let record = FileRecord::new(name.to_string(), url);
    state.files.put(&record).await.map_err(AppError::from)?;

    tracing::info!(id = %record.id, name = %record.name, "File record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Drive one transfer attempt: relay the multipart `file` field to the
/// blob store and return the terminal record.
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<FileRecord>, HttpAppError> {
    // Declared total for progress fractions. This is the whole multipart
    // body, so sampled fractions slightly undershoot; the terminal write
    // sets 100 explicitly. Zero = unknown, sampler persists nothing.
    let declared_total: u64 = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest("'file' field has no filename".to_string()))?
            .to_string();

        let relay = UploadRelay::new(state.files.clone(), state.blobs.clone(), state.relay);
        let job = relay.begin(id, &filename).await?;

        // The inbound field is only readable inside this handler, so the
        // producer side of the relay borrows it as a chunk stream here.
        let source = async_stream::stream! {
            loop {
                match field.chunk().await {
                    Ok(Some(bytes)) => yield Ok(bytes),
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(AppError::Internal(format!("inbound read failed: {}", err)));
                        break;
                    }
                }
            }
        };
        futures::pin_mut!(source);

        let record = job.run(source, declared_total).await?;
        return Ok(Json(record));
    }

    Err(AppError::BadRequest("multipart body has no 'file' field".to_string()).into())
}

/// Long-lived status stream for one record, one SSE event per frame.
#[tracing::instrument(skip(state), fields(operation = "file_status"))]
pub async fn file_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, HttpAppError> {
    let record = state
        .files
        .get(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("file {}", id)))?;

    let frames = status::subscribe(state.files.clone(), record, state.status_poll_interval);
    let events = frames.map(|frame| Event::default().json_data(&frame));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Stream the stored blob back to the caller as an attachment.
#[tracing::instrument(skip(state), fields(operation = "download_file"))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let record = state
        .files
        .get(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("file {}", id)))?;

    let stream = state
        .blobs
        .fetch(&record.url)
        .await
        .map_err(AppError::from)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.name),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("failed to build response: {}", e)))?;
    Ok(response)
}
