//! Image preparation before upload: upright, downscale and re-encode photos.
//!
//! Every size reported here is the displayed size, after the EXIF orientation
//! is applied, so overlay boxes and detection frames agree with what is shown.

use anyhow::{bail, Context};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use tubecore::geometry::ImageDimensions;

const JPEG_QUALITY_STEPS: [u8; 6] = [85, 75, 65, 55, 45, 35];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Longest side of the uploaded image, in pixels.
    pub max_side: u32,
    /// Size the re-encoded upload should fit in.
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_side: 1024,
            max_bytes: 512 * 1024,
        }
    }
}

/// The bytes actually sent to the detector and the pixel grid they describe.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub bytes: Vec<u8>,
    pub dims: ImageDimensions,
    pub mime: &'static str,
    pub file_name: &'static str,
}

/// Reads the displayed size without decoding pixel data.
pub fn probe_dimensions(bytes: &[u8]) -> anyhow::Result<ImageDimensions> {
    let mut decoder = decoder_for(bytes)?;
    let orientation = read_orientation(&mut decoder);
    oriented_dimensions(decoder.dimensions(), orientation)
}

/// Returns `bytes` unchanged when upright and within `limits`, otherwise an
/// upright, downscaled JPEG.
///
/// The JPEG quality steps down until the encoding fits `max_bytes`; if even
/// the lowest quality is too large the smallest encoding is used.
pub fn prepare_upload(bytes: &[u8], limits: UploadLimits) -> anyhow::Result<PreparedUpload> {
    let format = image::guess_format(bytes).context("unrecognized image format")?;
    let mut decoder = decoder_for(bytes)?;
    let orientation = read_orientation(&mut decoder);
    let dims = oriented_dimensions(decoder.dimensions(), orientation)?;
    let upright = matches!(orientation, Orientation::NoTransforms);
    if upright && bytes.len() <= limits.max_bytes && dims.longest_side() <= limits.max_side {
        return Ok(PreparedUpload {
            bytes: bytes.to_vec(),
            dims,
            mime: format.to_mime_type(),
            file_name: file_name_for(format),
        });
    }

    let mut decoded = DynamicImage::from_decoder(decoder).context("decoding image for upload")?;
    decoded.apply_orientation(orientation);
    let resized = if dims.longest_side() > limits.max_side {
        decoded.resize(limits.max_side, limits.max_side, FilterType::Triangle)
    } else {
        decoded
    };
    let encoded = encode_within(&resized, limits.max_bytes)?;
    log::debug!(
        "prepared upload {}x{} ({:?}) -> {}x{}, {} -> {} bytes",
        dims.width,
        dims.height,
        orientation,
        resized.width(),
        resized.height(),
        bytes.len(),
        encoded.len()
    );

    Ok(PreparedUpload {
        bytes: encoded,
        dims: ImageDimensions::new(resized.width(), resized.height()),
        mime: ImageFormat::Jpeg.to_mime_type(),
        file_name: file_name_for(ImageFormat::Jpeg),
    })
}

fn decoder_for(bytes: &[u8]) -> anyhow::Result<impl ImageDecoder + '_> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("sniffing image format")?
        .into_decoder()
        .context("reading image header")
}

/// Unreadable metadata is treated as upright.
fn read_orientation(decoder: &mut impl ImageDecoder) -> Orientation {
    decoder.orientation().unwrap_or_else(|err| {
        log::debug!("ignoring unreadable orientation: {err}");
        Orientation::NoTransforms
    })
}

fn oriented_dimensions(
    (width, height): (u32, u32),
    orientation: Orientation,
) -> anyhow::Result<ImageDimensions> {
    if width == 0 || height == 0 {
        bail!("image has zero area");
    }
    let swapped = matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    );
    Ok(if swapped {
        ImageDimensions::new(height, width)
    } else {
        ImageDimensions::new(width, height)
    })
}

fn encode_within(image: &DynamicImage, max_bytes: usize) -> anyhow::Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut smallest: Option<Vec<u8>> = None;
    for quality in JPEG_QUALITY_STEPS {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode_image(&rgb)
            .with_context(|| format!("encoding JPEG at quality {quality}"))?;
        if buffer.len() <= max_bytes {
            return Ok(buffer);
        }
        if smallest.as_ref().map_or(true, |best| buffer.len() < best.len()) {
            smallest = Some(buffer);
        }
    }
    smallest.context("no JPEG quality steps configured")
}

fn file_name_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "upload.png",
        ImageFormat::WebP => "upload.webp",
        _ => "upload.jpg",
    }
}
