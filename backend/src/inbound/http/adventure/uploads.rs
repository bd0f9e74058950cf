//! Image upload and download.
//!
//! ```text
//! POST /api/upload            multipart, field `image`
//! GET  /uploads/{name}
//! ```

use actix_multipart::{Field, Multipart};
use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    Error, MAX_UPLOAD_BYTES, UploadName, UploadValidationError, accept_image,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::AdventureState;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// Location of a stored upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "http://localhost:5000/uploads/image-1718000000000-42.png")]
    pub url: String,
}

fn upload_error(err: &UploadValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": IMAGE_FIELD }))
}

fn multipart_error(err: &actix_multipart::MultipartError) -> Error {
    Error::invalid_request("Invalid multipart body").with_details(json!({
        "reason": err.to_string(),
    }))
}

/// Read a field into memory, refusing more than [`MAX_UPLOAD_BYTES`].
async fn read_limited(field: &mut Field) -> ApiResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|err| multipart_error(&err))? {
        if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(upload_error(&UploadValidationError::TooLarge));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Store an image and return its public URL.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "Field `image`: a jpeg, png, gif or webp file up to 5 MiB"),
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing, oversized or non-image file", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "uploadImage"
)]
#[post("/upload")]
pub async fn upload_image(
    state: web::Data<AdventureState>,
    mut payload: Multipart,
) -> ApiResult<web::Json<UploadResponse>> {
    while let Some(mut field) = payload.try_next().await.map_err(|err| multipart_error(&err))? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_owned();
        let mime = field.content_type().map(ToString::to_string);
        let extension =
            accept_image(&file_name, mime.as_deref()).map_err(|err| upload_error(&err))?;
        let bytes = read_limited(&mut field).await?;
        let name = UploadName::generate(extension, state.clock.utc(), rand::random::<u32>());
        let size = bytes.len();
        state.uploads.save(&name, bytes).await?;
        info!(upload = %name, size, "stored upload");
        let url = state
            .public_base_url
            .join(&format!("uploads/{name}"))
            .map_err(|err| Error::internal(format!("upload url: {err}")))?;
        return Ok(web::Json(UploadResponse {
            url: url.to_string(),
        }));
    }
    Err(upload_error(&UploadValidationError::Missing))
}

/// Serve a stored upload.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    params(("name" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "getUpload"
)]
#[get("/uploads/{name}")]
pub async fn serve_upload(
    state: web::Data<AdventureState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = UploadName::parse(&path.into_inner()).map_err(|err| upload_error(&err))?;
    let bytes = state
        .uploads
        .load(&name)
        .await?
        .ok_or_else(|| Error::not_found("Upload not found"))?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, name.content_type()))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    use crate::inbound::http::test_utils::AdventureMocks;

    const BOUNDARY: &str = "lvhub-test-boundary";

    fn multipart(field: &str, file_name: &str, mime: &str, data: &str) -> test::TestRequest {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n{data}\r\n--{BOUNDARY}--\r\n"
        );
        test::TestRequest::post()
            .uri("/api/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    macro_rules! app {
        ($mocks:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($mocks.into_state()))
                    .service(web::scope("/api").service(upload_image))
                    .service(serve_upload),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn image_is_stored_under_generated_name() {
        let mut mocks = AdventureMocks::default();
        mocks
            .uploads
            .expect_save()
            .withf(|name, bytes| {
                name.as_str().starts_with("image-")
                    && name.as_str().ends_with(".png")
                    && bytes.as_slice() == b"PNGDATA"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let app = app!(mocks);

        let res = test::call_service(
            &app,
            multipart("image", "trail.PNG", "image/png", "PNGDATA").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let url = body["url"].as_str().expect("url");
        assert!(url.starts_with("http://localhost:5000/uploads/image-"));
    }

    #[rstest]
    #[actix_web::test]
    async fn upload_url_keeps_the_base_path() {
        let mut mocks = AdventureMocks::default();
        mocks.uploads.expect_save().returning(|_, _| Ok(()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(mocks.into_state_at("https://example.lv/hub")))
                .service(web::scope("/api").service(upload_image)),
        )
        .await;

        let res = test::call_service(
            &app,
            multipart("image", "trail.png", "image/png", "PNGDATA").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let url = body["url"].as_str().expect("url");
        assert!(url.starts_with("https://example.lv/hub/uploads/image-"), "{url}");
    }

    #[rstest]
    #[case("image", "notes.txt", "text/plain", "Only image files are allowed!")]
    #[case("image", "photo.png", "application/pdf", "Only image files are allowed!")]
    #[case("document", "photo.png", "image/png", "No file uploaded")]
    #[actix_web::test]
    async fn rejected_uploads_explain_why(
        #[case] field: &str,
        #[case] file_name: &str,
        #[case] mime: &str,
        #[case] message: &str,
    ) {
        let app = app!(AdventureMocks::default());
        let res = test::call_service(
            &app,
            multipart(field, file_name, mime, "data").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], message);
    }

    #[rstest]
    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let app = app!(AdventureMocks::default());
        let data = "x".repeat(MAX_UPLOAD_BYTES + 1);
        let res = test::call_service(
            &app,
            multipart("image", "big.jpg", "image/jpeg", &data).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "File too large");
    }

    #[rstest]
    #[actix_web::test]
    async fn stored_upload_is_served_with_mime_type() {
        let mut mocks = AdventureMocks::default();
        mocks
            .uploads
            .expect_load()
            .returning(|_| Ok(Some(b"GIF89a".to_vec())));
        let app = app!(mocks);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/uploads/image-1-2.gif")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"image/gif"[..])
        );
        let body = test::read_body(res).await;
        assert_eq!(body.as_ref(), b"GIF89a");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_upload_is_not_found() {
        let mut mocks = AdventureMocks::default();
        mocks.uploads.expect_load().returning(|_| Ok(None));
        let app = app!(mocks);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/uploads/image-1-2.png").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn dot_segments_are_rejected() {
        let app = app!(AdventureMocks::default());
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/uploads/..png").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
