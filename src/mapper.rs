//! DCAT-AP.de to CKAN mapping
//!
//! Walks a dataset node and its distributions, builds the CKAN package and
//! resource payloads, and pushes them through a [`CatalogClient`] in order:
//! package first, then one resource per distribution, then collection links.

use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::error::UploadError;
use crate::graph::{GraphAccessor, Term};
use crate::payload::{Named, Package, Resource};
use crate::vocab::{
    dcat, dcatde, dct, locn, schema, spdx, DATA_THEME_PREFIX, GEOJSON_DATATYPE,
    ORGANIZATION_SEGMENT, PORTAL_BASE_URL,
};

/// Write side of the catalog used during an upload
pub trait CatalogClient {
    /// Create a package and return its id
    fn create_package(&self, package: &Package) -> Result<String, UploadError>;

    /// Create a resource and return its id
    fn create_resource(&self, resource: &Resource) -> Result<String, UploadError>;

    /// Make the package a member of the named collection
    ///
    /// Fails with [`UploadError::NotFound`] when either id does not resolve,
    /// and with [`UploadError::NotACollection`] when the target is not a
    /// collection.
    fn put_dataset_in_collection(
        &self,
        package_id: &str,
        collection: &str,
    ) -> Result<(), UploadError>;
}

impl<T: CatalogClient + ?Sized> CatalogClient for &T {
    fn create_package(&self, package: &Package) -> Result<String, UploadError> {
        (**self).create_package(package)
    }

    fn create_resource(&self, resource: &Resource) -> Result<String, UploadError> {
        (**self).create_resource(resource)
    }

    fn put_dataset_in_collection(
        &self,
        package_id: &str,
        collection: &str,
    ) -> Result<(), UploadError> {
        (**self).put_dataset_in_collection(package_id, collection)
    }
}

/// Uploads DCAT datasets into a catalog
pub struct DcatUploader<C> {
    catalog: C,
}

impl<C: CatalogClient> DcatUploader<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Publish one dataset node and return the new package id
    ///
    /// No rollback: if a resource or link call fails, whatever was created
    /// before it stays in the catalog.
    pub fn upload(&self, graph: &dyn GraphAccessor, dataset: &str) -> Result<String, UploadError> {
        let package = build_package(graph, dataset)?;
        let package_id = self.catalog.create_package(&package)?;
        info!(dataset, package_id = %package_id, name = %package.name, "Created package");

        for distribution in distributions(graph, dataset) {
            let resource = build_resource(graph, &distribution, &package_id);
            let resource_id = self.catalog.create_resource(&resource)?;
            info!(distribution = %distribution, resource_id = %resource_id, "Created resource");
        }

        for collection in collection_names(graph, dataset) {
            self.catalog
                .put_dataset_in_collection(&package_id, &collection)?;
            info!(package_id = %package_id, collection = %collection, "Added package to collection");
        }

        Ok(package_id)
    }
}

/// Build the package payload for a dataset node
pub fn build_package(graph: &dyn GraphAccessor, dataset: &str) -> Result<Package, UploadError> {
    let mut package = Package {
        name: package_name(dataset),
        title: text(graph, dataset, dct::TITLE),
        notes: text(graph, dataset, dct::DESCRIPTION),
        license_id: text(graph, dataset, dct::LICENSE),
        owner_org: owner_org(graph, dataset)?,
        ..Default::default()
    };

    for theme in graph.values(dataset, dcat::THEME) {
        match theme_group(theme.as_text()) {
            Some(group) => package.groups.push(Named::new(group)),
            None => warn!(dataset, theme = theme.as_text(), "Ignoring theme outside the data theme vocabulary"),
        }
    }

    for keyword in graph.values(dataset, dcat::KEYWORD) {
        package.tags.push(Named::new(keyword.as_text()));
    }

    let extras = &mut package.extras;

    if let Some(temporal) = graph.related(dataset, dct::TEMPORAL) {
        let start = text(graph, &temporal, schema::START_DATE)
            .or_else(|| text(graph, &temporal, dcat::START_DATE));
        let end = text(graph, &temporal, schema::END_DATE)
            .or_else(|| text(graph, &temporal, dcat::END_DATE));
        if let Some(start) = start {
            extras.upsert("temporal_start", start);
        }
        if let Some(end) = end {
            extras.upsert("temporal_end", end);
        }
    }

    let scalar_extras = [
        ("modified", dct::MODIFIED),
        ("issued", dct::ISSUED),
        ("licenseAttributionByText", dcatde::LICENSE_ATTRIBUTION_BY_TEXT),
        ("frequency", dct::ACCRUAL_PERIODICITY),
        ("spatial_uri", dcatde::POLITICAL_GEOCODING_URI),
        ("politicalGeocodingLevelURI", dcatde::POLITICAL_GEOCODING_LEVEL_URI),
    ];
    for (key, property) in scalar_extras {
        if let Some(value) = text(graph, dataset, property) {
            extras.upsert(key, value);
        }
    }

    if let Some(location) = graph.related(dataset, dct::SPATIAL) {
        for geometry in graph.values(&location, locn::GEOMETRY) {
            if is_geojson(&geometry) {
                extras.upsert("spatial", geometry.as_text());
            } else {
                debug!(dataset, datatype = ?geometry.datatype(), "Skipping non-GeoJSON geometry");
            }
        }
    }

    debug!(dataset, name = %package.name, extras = package.extras.len(), "Built package payload");
    Ok(package)
}

/// Build the resource payload for one distribution node
pub fn build_resource(graph: &dyn GraphAccessor, distribution: &str, package_id: &str) -> Resource {
    let mut resource = Resource {
        package_id: package_id.to_string(),
        url: text(graph, distribution, dcat::DOWNLOAD_URL),
        access_url: text(graph, distribution, dcat::ACCESS_URL),
        name: text(graph, distribution, dct::TITLE),
        description: text(graph, distribution, dct::DESCRIPTION),
        mimetype: text(graph, distribution, dcat::MEDIA_TYPE),
        format: text(graph, distribution, dct::FORMAT).map(|f| format_token(&f).to_string()),
        license: text(graph, distribution, dct::LICENSE),
        license_attribution_by_text: text(graph, distribution, dcatde::LICENSE_ATTRIBUTION_BY_TEXT),
        size: text(graph, distribution, dcat::BYTE_SIZE).and_then(|s| parse_byte_size(&s)),
        ..Default::default()
    };

    if let Some(checksum) = graph.related(distribution, spdx::CHECKSUM) {
        resource.hash = text(graph, &checksum, spdx::CHECKSUM_VALUE);
        resource.hash_algorithm = text(graph, &checksum, spdx::ALGORITHM);
    }

    resource
}

/// Distribution node ids of a dataset, in encounter order
pub fn distributions(graph: &dyn GraphAccessor, dataset: &str) -> Vec<String> {
    graph
        .values(dataset, dcat::DISTRIBUTION_PROP)
        .iter()
        .filter_map(|t| t.node_id().map(String::from))
        .collect()
}

/// Names of the portal collections the dataset is a version of
///
/// Targets outside the portal are skipped. The name is the last path
/// segment, so `<portal>/dataset/mycollection/` names `mycollection`.
pub fn collection_names(graph: &dyn GraphAccessor, dataset: &str) -> Vec<String> {
    graph
        .values(dataset, dct::IS_VERSION_OF)
        .iter()
        .filter_map(|t| match t {
            Term::Iri(iri) => {
                let name = last_segment(portal_path(iri)?);
                if name.is_none() {
                    warn!(dataset, target = %iri, "Ignoring collection reference without a name");
                }
                name
            }
            _ => None,
        })
        .collect()
}

/// Package name for a dataset identifier
///
/// Identifiers already hosted under `<portal>/dataset/` keep their slug;
/// everything else gets a fresh lower-case ULID.
pub fn package_name(dataset: &str) -> String {
    let hosted_prefix = format!("{}/dataset/", PORTAL_BASE_URL);
    match dataset.strip_prefix(&hosted_prefix) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => Ulid::new().to_string().to_lowercase(),
    }
}

/// Organization id embedded in the dataset's publisher URI
pub fn owner_org(graph: &dyn GraphAccessor, dataset: &str) -> Result<String, UploadError> {
    let publisher = text(graph, dataset, dct::PUBLISHER).ok_or_else(|| {
        UploadError::MissingProperty {
            subject: dataset.to_string(),
            property: dct::PUBLISHER.to_string(),
        }
    })?;

    match publisher.rfind(ORGANIZATION_SEGMENT) {
        Some(pos) if pos + ORGANIZATION_SEGMENT.len() < publisher.len() => {
            Ok(publisher[pos + ORGANIZATION_SEGMENT.len()..].to_string())
        }
        _ => Err(UploadError::InvalidValue {
            subject: dataset.to_string(),
            property: dct::PUBLISHER.to_string(),
            value: publisher,
            reason: format!("expected an organization URI containing '{}'", ORGANIZATION_SEGMENT),
        }),
    }
}

/// Group name for a data theme URI: `.../data-theme/TRAN` -> `tran`
pub fn theme_group(theme: &str) -> Option<String> {
    theme
        .strip_prefix(DATA_THEME_PREFIX)
        .filter(|code| !code.is_empty())
        .map(str::to_lowercase)
}

/// Bare format token: `.../file-type/CSV` -> `CSV`
pub fn format_token(format: &str) -> &str {
    match format.rfind('/') {
        Some(pos) => &format[pos + 1..],
        None => format,
    }
}

fn is_geojson(term: &Term) -> bool {
    term.is_literal() && term.datatype() == Some(GEOJSON_DATATYPE)
}

fn text(graph: &dyn GraphAccessor, subject: &str, property: &str) -> Option<String> {
    graph
        .scalar(subject, property)
        .map(|t| t.as_text().to_string())
}

/// Path part of an IRI on the portal host
fn portal_path(iri: &str) -> Option<&str> {
    iri.strip_prefix(PORTAL_BASE_URL)
        .filter(|path| path.is_empty() || path.starts_with('/'))
}

fn last_segment(path: &str) -> Option<String> {
    let path = path.strip_suffix('/').unwrap_or(path);
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse `dcat:byteSize`, which is often typed `xsd:decimal` (`500.0`)
fn parse_byte_size(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(size) = value.parse::<u64>() {
        return Some(size);
    }
    match value.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole.parse().ok(),
        _ => None,
    }
}
