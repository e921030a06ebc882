// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! File-extension to media-type mapping for attachments.

/// Media type assigned when the extension is unknown.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type used for textual log attachments.
pub const LOG_MEDIA_TYPE: &str = "text/x-log";

/// Known extensions, lowercase, without the leading dot.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("bmp", "image/bmp"),
    ("csv", "text/csv"),
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("json", "application/json"),
    ("log", "text/x-log"),
    ("md", "text/markdown"),
    ("mp4", "video/mp4"),
    ("ndjson", "application/x-ndjson"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
];

/// Resolves the media type for a file path by its extension,
/// case-insensitively. Unknown and missing extensions map to
/// [`FALLBACK_MEDIA_TYPE`].
#[must_use]
pub fn media_type_for_path(path: &std::path::Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(FALLBACK_MEDIA_TYPE, |ext| {
            let ext = ext.to_ascii_lowercase();
            MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map_or(FALLBACK_MEDIA_TYPE, |(_, media)| media)
        })
}
