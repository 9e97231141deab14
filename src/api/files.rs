// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use crate::{
    auth::Auth,
    classifier::is_image,
    error::ApiError,
    models::{DeleteFileRequest, UploadResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/files/{division}",
    params(
        ("division" = String, Path, description = "Logical grouping for the upload, e.g. `avatars`")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    tag = "Files",
    responses(
        (status = 201, body = UploadResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 422, description = "Content rejected by the classifier")
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Path(division): Path<String>,
    Auth(principal): Auth,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("malformed multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("file part has no file name"))?;
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(format!("failed to read file part: {err}")))?;

        if is_image(content_type.as_deref()) {
            if let Some(classifier) = &state.classifier {
                match classifier.is_flagged(&bytes).await {
                    Ok(true) => {
                        return Err(ApiError::unprocessable("upload rejected by content screen"));
                    }
                    Ok(false) => {}
                    // Classification is advisory; store the file anyway.
                    Err(err) => warn!(%err, "content classifier unavailable, skipping screen"),
                }
            }
        }

        let location = state
            .files
            .save(&principal.user_id, &division, &file_name, &bytes)
            .await?;
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                file_location: location,
            }),
        ));
    }

    Err(ApiError::bad_request("missing `file` part"))
}

#[utoipa::path(
    delete,
    path = "/v1/files",
    request_body = DeleteFileRequest,
    tag = "Files",
    responses(
        (status = 204),
        (status = 403, description = "File belongs to another user"),
        (status = 404, description = "No file at the given location")
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Json(request): Json<DeleteFileRequest>,
) -> Result<StatusCode, ApiError> {
    // Locations are prefixed with the owning user's id; only the owner
    // may delete.
    if !request
        .file_location
        .starts_with(&format!("{}/", principal.user_id))
    {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "file belongs to another user",
        ));
    }

    state.files.delete(&request.file_location).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/files/{user}/{division}/{name}",
    params(
        ("user" = String, Path, description = "Owning user id"),
        ("division" = String, Path, description = "Upload division"),
        ("name" = String, Path, description = "Stored file name")
    ),
    tag = "Files",
    responses(
        (status = 200, content_type = "application/octet-stream"),
        (status = 404, description = "No file at the given location")
    )
)]
pub async fn serve_file(
    State(state): State<AppState>,
    Auth(_principal): Auth,
    Path((user, division, name)): Path<(String, String, String)>,
) -> Result<Vec<u8>, ApiError> {
    let location = format!("{user}/{division}/{name}");
    Ok(state.files.load(&location).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::auth::{Authenticator, Principal, Role, TokenCodec};
    use crate::files::FileStore;
    use crate::store::MemoryAuthStore;

    fn state() -> (AppState, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let codec = TokenCodec::new("test-secret", 3_600_000, 604_800_000);
        let authenticator = Authenticator::new(codec, Arc::new(MemoryAuthStore::default()), 5);
        (
            AppState::new(authenticator, FileStore::new(dir.path())),
            dir,
        )
    }

    fn principal(user_id: &str) -> Principal {
        Principal {
            user_id: user_id.to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn delete_requires_ownership() {
        let (state, _dir) = state();
        let location = state
            .files
            .save("alice", "docs", "a.txt", b"hers")
            .await
            .unwrap();

        let err = delete_file(
            State(state.clone()),
            Auth(principal("mallory")),
            Json(DeleteFileRequest {
                file_location: location.clone(),
            }),
        )
        .await
        .expect_err("cross-user delete is refused");
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let status = delete_file(
            State(state.clone()),
            Auth(principal("alice")),
            Json(DeleteFileRequest {
                file_location: location,
            }),
        )
        .await
        .expect("owner delete succeeds");
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn delete_missing_file_is_404() {
        let (state, _dir) = state();
        let err = delete_file(
            State(state),
            Auth(principal("alice")),
            Json(DeleteFileRequest {
                file_location: "alice/docs/nope.txt".to_string(),
            }),
        )
        .await
        .expect_err("missing file is an error");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_returns_stored_bytes() {
        let (state, _dir) = state();
        let location = state
            .files
            .save("alice", "docs", "a.txt", b"contents")
            .await
            .unwrap();
        let name = location.rsplit('/').next().unwrap().to_string();

        let bytes = serve_file(
            State(state),
            Auth(principal("bob")),
            Path(("alice".to_string(), "docs".to_string(), name)),
        )
        .await
        .expect("stored file is served");
        assert_eq!(bytes, b"contents");
    }
}
