//! DCAT-AP.de to CKAN Upload Library
//!
//! This library publishes dataset metadata described with the DCAT-AP.de
//! profile into a CKAN open data portal.
//!
//! # Overview
//!
//! A dataset arrives as a node in a linked-data graph, read from JSON-LD,
//! Turtle, RDF/XML or N-Triples. Uploading it:
//!
//! 1. Flattens the dataset node into a CKAN package (name, title, notes,
//!    license, owning organization, groups, tags and extras)
//! 2. Creates the package through the CKAN action API
//! 3. Creates one resource per `dcat:distribution`
//! 4. Adds the package to every portal collection it is a version of
//!
//! The calls run strictly in that order. There is no rollback: a failure
//! leaves everything created before it in place.
//!
//! # Usage
//!
//! ```ignore
//! use dcat_ckan_upload::{load_graph, CkanApi, Config, DcatUploader, DocumentSource};
//!
//! let config = Config::default();
//! let graph = load_graph(&DocumentSource::parse("catalog.jsonld"), config.timeout)?;
//! let uploader = DcatUploader::new(CkanApi::from_config(&config)?);
//!
//! for dataset in graph.datasets() {
//!     let package_id = uploader.upload(&graph, &dataset)?;
//!     println!("{}", package_id);
//! }
//! ```

pub mod ckan;
pub mod config;
pub mod error;
pub mod extras;
pub mod graph;
pub mod loader;
pub mod mapper;
pub mod payload;
pub mod rest;
pub mod vocab;

// Re-export main types for convenience
pub use crate::ckan::{collection_of, organization_of, CkanApi, CkanResource};
pub use crate::config::Config;
pub use crate::error::UploadError;
pub use crate::extras::Extras;
pub use crate::graph::{GraphAccessor, RdfGraph, Term};
pub use crate::loader::{load_document, load_graph, parse_document, Document, DocumentSource};
pub use crate::mapper::{build_package, build_resource, CatalogClient, DcatUploader};
pub use crate::payload::{Named, Package, Resource};
pub use crate::rest::{HttpRestClient, RestClient};
