//! multipart/form-data encoding
//!
//! Builds request bodies for form POSTs that may carry file uploads. The
//! whole body is materialized in memory. File handles are borrowed: they are
//! rewound and read to the end, but closing them stays with the caller.

use crate::{Result, TmdbError};
use reqwest::header::CONTENT_TYPE;
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

/// Content type used when neither the file name nor the content tell
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A readable, rewindable file handle
pub trait FileSource: Read + Seek {}

impl<T: Read + Seek> FileSource for T {}

/// A file to upload as one form part
pub struct FilePart<'a> {
    name: String,
    filename: String,
    source: &'a mut dyn FileSource,
}

impl<'a> FilePart<'a> {
    /// Creates a file part for form field `name`
    ///
    /// Only the last `/` separated segment of `path` is sent as the file name.
    pub fn new(name: impl Into<String>, path: &str, source: &'a mut dyn FileSource) -> Self {
        Self {
            name: name.into(),
            filename: path.rsplit('/').next().unwrap_or(path).to_string(),
            source,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        self.source.seek(SeekFrom::Start(0))?;
        let mut content = Vec::new();
        self.source.read_to_end(&mut content)?;
        Ok(content)
    }
}

/// Creates a boundary that will not appear in ordinary form content.
pub fn generate_boundary() -> String {
    format!("==============={}==", ulid::Ulid::new())
}

/// Guesses a part's content type from the file name, then from the content.
pub fn guess_content_type(filename: &str, content: &[u8]) -> String {
    mime_guess::from_path(filename)
        .first_raw()
        .or_else(|| infer::get(content).map(|kind| kind.mime_type()))
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

/// Encodes fields and files as a multipart/form-data body.
///
/// Fields come first, then files, each as its own part. The body ends with
/// the closing `--<boundary>--` marker.
///
/// # Arguments
///
/// * `fields` - Form fields as name/value pairs
/// * `files` - Files to upload
/// * `boundary` - Part boundary; generated when `None`
///
/// # Returns
///
/// The boundary used and the encoded body.
///
/// # Errors
///
/// Returns `TmdbError::Io` if a file cannot be rewound or read.
pub fn encode(
    fields: &[(&str, &str)],
    files: &mut [FilePart<'_>],
    boundary: Option<&str>,
) -> Result<(String, Vec<u8>)> {
    let boundary = boundary.map_or_else(generate_boundary, str::to_string);
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for file in files.iter_mut() {
        let content = file.read_all()?;
        let content_type = guess_content_type(&file.filename, &content);

        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                file.name, file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(&content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n\r\n").as_bytes());

    Ok((boundary, body))
}

/// A form body with its matching `Content-Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormBody {
    content_type: String,
    body: Vec<u8>,
}

impl FormBody {
    /// Encodes a form: URL-encoded when there are no files, multipart
    /// otherwise.
    ///
    /// # Errors
    ///
    /// - `TmdbError::Io` if a file cannot be read
    /// - `TmdbError::Base` if the fields cannot be URL-encoded
    pub fn build(fields: &[(&str, &str)], files: &mut [FilePart<'_>]) -> Result<Self> {
        if files.is_empty() {
            let body = serde_urlencoded::to_string(fields)
                .map_err(|e| TmdbError::Base(format!("Failed to encode form: {e}")))?;
            return Ok(Self {
                content_type: "application/x-www-form-urlencoded".to_string(),
                body: body.into_bytes(),
            });
        }

        let (boundary, body) = encode(fields, files, None)?;
        Ok(Self {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body,
        })
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// POSTs a form and returns the response body.
///
/// Without files the fields are sent URL-encoded, otherwise as
/// multipart/form-data.
///
/// # Errors
///
/// - `TmdbError::Io` if a file cannot be read
/// - `TmdbError::Network` if the request fails or the status is not a success
pub fn post_form(
    client: &reqwest::blocking::Client,
    url: &str,
    fields: &[(&str, &str)],
    files: &mut [FilePart<'_>],
) -> Result<String> {
    let request = if files.is_empty() {
        debug!(url, fields = fields.len(), "Posting URL-encoded form");
        client.post(url).form(fields)
    } else {
        let (boundary, body) = encode(fields, files, None)?;
        debug!(url, bytes = body.len(), "Posting multipart form");
        client
            .post(url)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(body)
    };

    let response = request
        .send()
        .map_err(|e| TmdbError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TmdbError::Network(format!(
            "HTTP {} {}",
            response.status().as_u16(),
            response.status().canonical_reason().unwrap_or("Unknown")
        )));
    }

    response
        .text()
        .map_err(|e| TmdbError::Network(format!("Failed to read response body: {e}")))
}
