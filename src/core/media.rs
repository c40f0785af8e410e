use crate::domain::document::{Document, NodeId};
use crate::utils::error::Result;
use base64::Engine;
use std::path::Path;

pub const IMAGE_PREVIEW_ID: &str = "image-preview";

/// Mime type guessed from the file extension. Unknown extensions map to
/// `application/octet-stream`; the bytes are never inspected.
pub fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub async fn read_as_data_url(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(encode_data_url(mime_for(path), &bytes))
}

/// Reads the first file selected in `input` and shows it in `#image-preview`.
/// Returns false when no file is selected.
pub async fn preview_image(doc: &mut Document, input: NodeId) -> Result<bool> {
    let Some(path) = doc.element(input)?.files().first().cloned() else {
        return Ok(false);
    };

    let data_url = read_as_data_url(&path).await?;
    tracing::debug!(
        "Previewing {} ({} bytes as data URL)",
        path.display(),
        data_url.len()
    );

    let preview = doc.require_by_id(IMAGE_PREVIEW_ID)?;
    doc.element_mut(preview)?.set_attribute("src", data_url);
    Ok(true)
}
