//! Vocabulary definitions for DCAT-AP.de metadata
//!
//! Property and class IRIs read while mapping datasets, plus the fixed
//! controlled-vocabulary and portal URIs the mapping depends on.

/// Base URL of the open data portal that hosts the catalog
pub const PORTAL_BASE_URL: &str = "https://opendata.schleswig-holstein.de";

/// Path segment preceding an organization id in a publisher URI
pub const ORGANIZATION_SEGMENT: &str = "/organization/";

/// EU data theme authority table
pub const DATA_THEME_PREFIX: &str = "http://publications.europa.eu/resource/authority/data-theme/";

/// Literal datatype marking a GeoJSON geometry
pub const GEOJSON_DATATYPE: &str =
    "https://www.iana.org/assignments/media-types/application/vnd.geo+json";

/// Literal datatype marking a well-known-text geometry
pub const WKT_DATATYPE: &str = "http://www.opengis.net/ont/geosparql#wktLiteral";

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
}

pub mod dcat {
    pub const NS: &str = "http://www.w3.org/ns/dcat#";
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const THEME: &str = "http://www.w3.org/ns/dcat#theme";
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
    pub const DISTRIBUTION_PROP: &str = "http://www.w3.org/ns/dcat#distribution";
    pub const DOWNLOAD_URL: &str = "http://www.w3.org/ns/dcat#downloadURL";
    pub const ACCESS_URL: &str = "http://www.w3.org/ns/dcat#accessURL";
    pub const MEDIA_TYPE: &str = "http://www.w3.org/ns/dcat#mediaType";
    pub const BYTE_SIZE: &str = "http://www.w3.org/ns/dcat#byteSize";
    pub const START_DATE: &str = "http://www.w3.org/ns/dcat#startDate";
    pub const END_DATE: &str = "http://www.w3.org/ns/dcat#endDate";
}

pub mod dct {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
    pub const PUBLISHER: &str = "http://purl.org/dc/terms/publisher";
    pub const TEMPORAL: &str = "http://purl.org/dc/terms/temporal";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const ISSUED: &str = "http://purl.org/dc/terms/issued";
    pub const ACCRUAL_PERIODICITY: &str = "http://purl.org/dc/terms/accrualPeriodicity";
    pub const SPATIAL: &str = "http://purl.org/dc/terms/spatial";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
    pub const IS_VERSION_OF: &str = "http://purl.org/dc/terms/isVersionOf";
}

/// DCAT-AP.de extension vocabulary
pub mod dcatde {
    pub const NS: &str = "http://dcat-ap.de/def/dcatde/";
    pub const LICENSE_ATTRIBUTION_BY_TEXT: &str =
        "http://dcat-ap.de/def/dcatde/licenseAttributionByText";
    pub const POLITICAL_GEOCODING_URI: &str = "http://dcat-ap.de/def/dcatde/politicalGeocodingURI";
    pub const POLITICAL_GEOCODING_LEVEL_URI: &str =
        "http://dcat-ap.de/def/dcatde/politicalGeocodingLevelURI";
}

/// ISA core location vocabulary
pub mod locn {
    pub const NS: &str = "http://www.w3.org/ns/locn#";
    pub const GEOMETRY: &str = "http://www.w3.org/ns/locn#geometry";
}

pub mod spdx {
    pub const NS: &str = "http://spdx.org/rdf/terms#";
    pub const CHECKSUM: &str = "http://spdx.org/rdf/terms#checksum";
    pub const CHECKSUM_VALUE: &str = "http://spdx.org/rdf/terms#checksumValue";
    pub const ALGORITHM: &str = "http://spdx.org/rdf/terms#algorithm";
}

pub mod schema {
    pub const NS: &str = "http://schema.org/";
    pub const START_DATE: &str = "http://schema.org/startDate";
    pub const END_DATE: &str = "http://schema.org/endDate";
}
