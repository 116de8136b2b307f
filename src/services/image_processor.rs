// src/services/image_processor.rs
use crate::errors::StudioError;
use crate::models::ImageAttachment;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat as ImgFormat};

pub struct ImageProcessor {
    max_dimension: u32,
}

/// Formats the model accepts as-is; anything else is re-encoded to PNG.
fn passthrough_mime(format: ImgFormat) -> Option<&'static str> {
    match format {
        ImgFormat::Png => Some("image/png"),
        ImgFormat::Jpeg => Some("image/jpeg"),
        ImgFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, StudioError> {
    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
        .map_err(|e| StudioError::ImageProcessing(format!("Failed to encode image: {}", e)))?;
    Ok(output)
}

impl ImageProcessor {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Validates an upload and turns it into an attachment the model can take.
    /// Oversized images are scaled down to fit `max_dimension`.
    pub fn prepare_upload(&self, filename: &str, data: &[u8]) -> Result<ImageAttachment, StudioError> {
        let format = image::guess_format(data)
            .map_err(|e| StudioError::ImageProcessing(format!("Unrecognized image format: {}", e)))?;
        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| StudioError::ImageProcessing(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(StudioError::ImageProcessing("Image has no pixels".to_string()));
        }

        if width > self.max_dimension || height > self.max_dimension {
            let resized = img.resize(
                self.max_dimension,
                self.max_dimension,
                image::imageops::FilterType::Lanczos3,
            );
            let (new_width, new_height) = resized.dimensions();
            log::info!(
                "Downscaled {} from {}x{} to {}x{}",
                filename,
                width,
                height,
                new_width,
                new_height
            );
            return Ok(ImageAttachment {
                filename: filename.to_string(),
                mime_type: "image/png".to_string(),
                width: new_width,
                height: new_height,
                data: Bytes::from(encode_png(&resized)?),
            });
        }

        let (mime_type, data) = match passthrough_mime(format) {
            Some(mime) => (mime, Bytes::copy_from_slice(data)),
            None => ("image/png", Bytes::from(encode_png(&img)?)),
        };

        Ok(ImageAttachment {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            width,
            height,
            data,
        })
    }

    /// PNG bytes for download, re-encoding when the model answered in another format.
    pub fn to_png(&self, data: &[u8]) -> Result<Vec<u8>, StudioError> {
        if matches!(image::guess_format(data), Ok(ImgFormat::Png)) {
            return Ok(data.to_vec());
        }
        let img = image::load_from_memory(data)
            .map_err(|e| StudioError::ImageProcessing(format!("Failed to load image: {}", e)))?;
        encode_png(&img)
    }
}
