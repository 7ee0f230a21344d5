use crate::endpoint::model::{DetectQuery, DetectReply, ErrorReply};
use crate::generator::profile::{build_detections, content_seed, GeneratorConfig};
use anyhow::Context;
use bytes::Buf;
use futures_util::TryStreamExt;
use image::ImageReader;
use log::{info, warn};
use serde_json::json;
use std::future::Future;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use tubecore::geometry::ImageDimensions;
use tubecore::prelude::clamp_sensitivity;
use warp::{
    http::StatusCode,
    multipart::FormData,
    reply::Response,
    Filter, Rejection, Reply,
};

const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
const DEFAULT_SENSITIVITY: u8 = 50;

/// Hosts the stub detection endpoint backed by the synthetic generator.
pub struct DetectionServer {
    generator: Arc<GeneratorConfig>,
}

impl DetectionServer {
    pub fn new(generator: GeneratorConfig) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone + Send + Sync + 'static
    {
        let generator = self.generator.clone();
        let generator_filter = warp::any().map(move || generator.clone());

        let health_route = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| warp::reply::json(&json!({"status": "ok"})));

        let detect_route = warp::path("detect")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::query::<DetectQuery>())
            .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
            .and(generator_filter)
            .and_then(handle_detect);

        health_route.or(detect_route)
    }

    /// Serves until `shutdown` resolves.
    pub async fn run<F>(self, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding detection endpoint to {addr}"))?;
        info!("stub detector listening on http://{bound}/detect");
        server.await;
        Ok(())
    }
}

async fn handle_detect(
    query: DetectQuery,
    form: FormData,
    generator: Arc<GeneratorConfig>,
) -> Result<Response, Rejection> {
    let sensitivity = clamp_sensitivity(query.sensitivity.unwrap_or(DEFAULT_SENSITIVITY));

    let content = match read_file_part(form).await {
        Ok(Some(content)) => content,
        Ok(None) => return Ok(error_reply(StatusCode::BAD_REQUEST, "missing `file` part")),
        Err(err) => {
            warn!("detect: unreadable upload: {}", err);
            return Ok(error_reply(StatusCode::BAD_REQUEST, &err.to_string()));
        }
    };

    let dims = match probe_dimensions(&content) {
        Ok(dims) => dims,
        Err(err) => {
            warn!("detect: undecodable image ({} bytes): {:#}", content.len(), err);
            return Ok(error_reply(
                StatusCode::UNPROCESSABLE_ENTITY,
                &format!("{err:#}"),
            ));
        }
    };

    let points = build_detections(
        &generator,
        dims,
        sensitivity,
        content_seed(&generator, &content),
    );
    info!(
        "detect: {}x{} image at sensitivity {} -> {} tubes",
        dims.width,
        dims.height,
        sensitivity,
        points.len()
    );

    Ok(warp::reply::with_status(
        warp::reply::json(&DetectReply::new(points, dims, sensitivity)),
        StatusCode::OK,
    )
    .into_response())
}

/// Streams parts in order; a part's body is only readable while it is current.
async fn read_file_part(mut form: FormData) -> Result<Option<Vec<u8>>, warp::Error> {
    while let Some(part) = form.try_next().await? {
        if part.name() != "file" {
            continue;
        }
        let content = part
            .stream()
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(chunk.chunk());
                Ok(acc)
            })
            .await?;
        return Ok(Some(content));
    }
    Ok(None)
}

fn probe_dimensions(content: &[u8]) -> anyhow::Result<ImageDimensions> {
    let (width, height) = ImageReader::new(Cursor::new(content))
        .with_guessed_format()
        .context("sniffing image format")?
        .into_dimensions()
        .context("reading image dimensions")?;
    if width == 0 || height == 0 {
        anyhow::bail!("image has zero area");
    }
    Ok(ImageDimensions::new(width, height))
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorReply {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubecore::detection::{DetectionError, DetectionResponse};

    const BOUNDARY: &str = "tubecount-test-boundary";

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([180, 180, 180]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn multipart_body(field: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"tubes.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_detect(path: &str, body: Vec<u8>) -> warp::http::Response<bytes::Bytes> {
        let server = DetectionServer::new(GeneratorConfig::default());
        warp::test::request()
            .method("POST")
            .path(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .reply(&server.routes())
            .await
    }

    #[tokio::test]
    async fn detect_returns_points_inside_uploaded_image() {
        let response = post_detect("/detect?sensitivity=20", multipart_body("file", &png_bytes(320, 240))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let parsed = DetectionResponse::parse(response.body()).unwrap();
        assert!(!parsed.points.is_empty());
        assert!(parsed
            .points
            .iter()
            .all(|p| (0.0..=320.0).contains(&p.x) && (0.0..=240.0).contains(&p.y)));
    }

    #[tokio::test]
    async fn detect_is_deterministic_per_upload() {
        let body = multipart_body("file", &png_bytes(200, 200));
        let first = post_detect("/detect?sensitivity=40", body.clone()).await;
        let second = post_detect("/detect?sensitivity=40", body).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(first.body(), second.body());
    }

    #[tokio::test]
    async fn detect_without_file_part_is_a_client_error() {
        let response = post_detect("/detect", multipart_body("photo", &png_bytes(10, 10))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorReply = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body.error, "missing `file` part");
        assert!(matches!(
            DetectionResponse::parse(response.body()),
            Err(DetectionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn detect_skips_leading_fields_before_file() {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nbundle A\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&multipart_body("file", &png_bytes(120, 90)));
        let response = post_detect("/detect?sensitivity=10", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let reply: DetectReply = serde_json::from_slice(response.body()).unwrap();
        assert_eq!((reply.width, reply.height), (120, 90));
        assert_eq!(reply.sensitivity, 10);
        assert_eq!(reply.count, reply.points.len());
    }

    #[tokio::test]
    async fn detect_rejects_non_image_content() {
        let response = post_detect("/detect", multipart_body("file", b"not an image")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = DetectionServer::new(GeneratorConfig::default());
        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&server.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn probe_reads_png_dimensions() {
        assert_eq!(
            probe_dimensions(&png_bytes(33, 21)).unwrap(),
            ImageDimensions::new(33, 21)
        );
    }
}
