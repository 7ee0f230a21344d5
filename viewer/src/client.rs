use crate::upload::PreparedUpload;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tubecore::detection::{DetectionError, DetectionReply, DetectionResponse, DetectionTicket};
use tubecore::geometry::ImageDimensions;

/// Uploads `upload` to the detection endpoint for `ticket`.
pub async fn detect(
    client: reqwest::Client,
    endpoint: String,
    upload: PreparedUpload,
    ticket: DetectionTicket,
) -> Result<DetectionReply, DetectionError> {
    let dims = upload.dims;
    let part = Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(upload.mime)
        .map_err(|e| DetectionError::Transport(e.to_string()))?;
    let form = Form::new().part("file", part);

    let response = client
        .post(&endpoint)
        .query(&ticket.query())
        .multipart(form)
        .send()
        .await
        .map_err(|e| DetectionError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| DetectionError::Transport(e.to_string()))?;

    interpret(status, &body, dims)
}

/// Maps an HTTP status and body onto a detection outcome.
fn interpret(
    status: StatusCode,
    body: &[u8],
    dims: ImageDimensions,
) -> Result<DetectionReply, DetectionError> {
    if !status.is_success() {
        let text = String::from_utf8_lossy(body);
        return Err(DetectionError::Transport(format!("{}: {}", status, text.trim())));
    }
    let response = DetectionResponse::parse(body)?;
    Ok(DetectionReply::in_frame(response.points, dims))
}
