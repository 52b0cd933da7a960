//! Loading DCAT metadata documents
//!
//! Documents are read from a local file or fetched over HTTP and parsed with
//! `oxrdfio`. JSON-LD, Turtle, RDF/XML and N-Triples are accepted; the
//! serialization is picked from the response content type, then the file
//! extension, and defaults to JSON-LD.

use std::path::PathBuf;
use std::time::Duration;

use oxrdf::Triple;
use oxrdfio::{RdfFormat, RdfParser};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::error::UploadError;
use crate::graph::RdfGraph;

const ACCEPTED_TYPES: &str =
    "application/ld+json, text/turtle;q=0.9, application/rdf+xml;q=0.8, application/n-triples;q=0.7";

/// Where a metadata document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Local file
    Path(PathBuf),
    /// Remote document, fetched with a blocking GET
    Url(String),
}

impl DocumentSource {
    /// Classify a command-line source argument
    pub fn parse(source: &str) -> Self {
        if is_url(source) {
            DocumentSource::Url(source.to_string())
        } else {
            DocumentSource::Path(PathBuf::from(source))
        }
    }

    /// Human-readable origin for error messages
    pub fn origin(&self) -> String {
        match self {
            DocumentSource::Path(p) => p.display().to_string(),
            DocumentSource::Url(u) => u.clone(),
        }
    }

    /// Serialization implied by the file extension, if it names one
    pub fn format_from_extension(&self) -> Option<RdfFormat> {
        let extension = match self {
            DocumentSource::Path(path) => path.extension()?.to_str()?.to_string(),
            DocumentSource::Url(url) => {
                let parsed = url::Url::parse(url).ok()?;
                let file = parsed.path_segments()?.last()?.to_string();
                file.rsplit_once('.')?.1.to_string()
            }
        };
        RdfFormat::from_extension(&extension.to_ascii_lowercase())
    }
}

/// Raw document bytes with the serialization to parse them as
#[derive(Debug)]
pub struct Document {
    pub content: Vec<u8>,
    pub format: RdfFormat,
}

/// Check if a source string is a URL
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Serialization assumed when neither content type nor extension tell
pub fn default_format() -> RdfFormat {
    RdfFormat::from_media_type("application/ld+json").unwrap_or(RdfFormat::Turtle)
}

/// Read the bytes behind a source; `timeout` bounds remote fetches
pub fn load_document(source: &DocumentSource, timeout: Duration) -> Result<Document, UploadError> {
    match source {
        DocumentSource::Path(path) => {
            if !path.is_file() {
                return Err(UploadError::InvalidPath(path.clone()));
            }
            let content = std::fs::read(path).map_err(|e| UploadError::LoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ok(Document {
                content,
                format: source.format_from_extension().unwrap_or_else(default_format),
            })
        }
        DocumentSource::Url(url) => {
            let (content, content_type) = fetch_url(url, timeout)?;
            let format = content_type
                .as_deref()
                .and_then(media_type_format)
                .or_else(|| source.format_from_extension())
                .unwrap_or_else(default_format);
            Ok(Document { content, format })
        }
    }
}

/// Load a source straight into a graph
pub fn load_graph(source: &DocumentSource, timeout: Duration) -> Result<RdfGraph, UploadError> {
    let document = load_document(source, timeout)?;
    let graph = parse_document(&document.content, document.format, &source.origin())?;
    debug!(
        origin = %source.origin(),
        format = document.format.name(),
        nodes = graph.len(),
        triples = graph.triple_count(),
        "Loaded graph"
    );
    Ok(graph)
}

/// Parse document bytes into a graph, naming the origin on failure
///
/// Relative IRIs resolve against the origin when it is a URL. Quads from
/// named graphs are merged into one graph.
pub fn parse_document(
    content: &[u8],
    format: RdfFormat,
    origin: &str,
) -> Result<RdfGraph, UploadError> {
    let mut parser = RdfParser::from_format(format);
    if is_url(origin) {
        parser = parser
            .with_base_iri(origin)
            .map_err(|e| UploadError::LoadError {
                path: origin.to_string(),
                reason: format!("Invalid base IRI: {}", e),
            })?;
    }

    let mut graph = RdfGraph::new();
    for quad in parser.for_reader(content) {
        let quad = quad.map_err(|e| UploadError::LoadError {
            path: origin.to_string(),
            reason: format!("Failed to parse {}: {}", format.name(), e),
        })?;
        graph.insert(Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

fn media_type_format(content_type: &str) -> Option<RdfFormat> {
    let media_type = content_type.split(';').next()?.trim();
    RdfFormat::from_media_type(media_type)
}

/// Fetch a document, returning its body and content type
fn fetch_url(url: &str, timeout: Duration) -> Result<(Vec<u8>, Option<String>), UploadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client
        .get(url)
        .header(ACCEPT, ACCEPTED_TYPES)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| UploadError::LoadError {
            path: url.to_string(),
            reason: format!("HTTP request failed: {}", e),
        })?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = response.bytes().map_err(|e| UploadError::LoadError {
        path: url.to_string(),
        reason: format!("Failed to read response: {}", e),
    })?;
    Ok((body.to_vec(), content_type))
}
