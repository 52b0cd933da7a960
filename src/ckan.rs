//! CKAN action API client
//!
//! Implements [`CatalogClient`] on top of a [`RestClient`] and adds the
//! read-side lookups used around uploads: package details, collection
//! membership, owning organization and the newest resource of a package.

use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::UploadError;
use crate::mapper::CatalogClient;
use crate::payload::{Package, Resource};
use crate::rest::{HttpRestClient, RestClient};

/// Package `type` of collections
pub const COLLECTION_TYPE: &str = "collection";

/// Relationship from a member dataset to its collection
pub const MEMBER_RELATIONSHIP: &str = "child_of";

/// A resource as reported by `package_show`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CkanResource {
    pub id: String,
    /// The resource `url`
    pub access_url: Option<String>,
    pub name: Option<String>,
    /// The resource `hash`, empty hashes count as missing
    pub checksum: Option<String>,
    pub byte_size: u64,
    pub format: Option<String>,
    pub mime_type: Option<String>,
}

impl CkanResource {
    fn from_json(value: &Value) -> Option<Self> {
        let id = str_field(value, "id")?;
        Some(Self {
            id,
            access_url: str_field(value, "url"),
            name: str_field(value, "name"),
            checksum: str_field(value, "hash").filter(|h| !h.is_empty()),
            byte_size: value.get("size").and_then(as_u64).unwrap_or(0),
            format: str_field(value, "format"),
            mime_type: str_field(value, "mimetype"),
        })
    }
}

/// Client for one CKAN instance
pub struct CkanApi<R = HttpRestClient> {
    base_url: Url,
    rest: R,
}

impl CkanApi<HttpRestClient> {
    /// Client talking HTTP to `config.ckan_url`
    pub fn from_config(config: &Config) -> Result<Self, UploadError> {
        CkanApi::new(&config.ckan_url, HttpRestClient::new(config)?)
    }
}

impl<R: RestClient> CkanApi<R> {
    pub fn new(base_url: &str, rest: R) -> Result<Self, UploadError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, rest })
    }

    /// Full `package_show` result, or `None` if CKAN does not know the id
    pub fn read_dataset(&self, id: &str) -> Result<Option<Value>, UploadError> {
        let mut url = self.action_url("package_show")?;
        url.query_pairs_mut().append_pair("id", id);

        let response = self.rest.get_json(&url)?;
        if is_success(&response) {
            Ok(response.get("result").cloned())
        } else {
            debug!(id, error = %error_message(&response), "package_show found nothing");
            Ok(None)
        }
    }

    /// Id of the collection the dataset is a member of
    pub fn get_collection(&self, id: &str) -> Result<Option<String>, UploadError> {
        Ok(self.read_dataset(id)?.and_then(|dataset| collection_of(&dataset)))
    }

    /// Id of the organization owning the dataset
    pub fn get_organization(&self, id: &str) -> Result<Option<String>, UploadError> {
        Ok(self
            .read_dataset(id)?
            .and_then(|dataset| organization_of(&dataset)))
    }

    /// Access URL of the dataset's newest resource
    pub fn get_access_url(&self, id: &str) -> Result<Option<String>, UploadError> {
        Ok(self
            .read_dataset(id)?
            .and_then(|dataset| self.get_resource(&dataset, true))
            .and_then(|resource| resource.access_url))
    }

    /// Pick a resource from a `package_show` response or result
    ///
    /// With `latest` the resource with the greatest `created` timestamp is
    /// returned, otherwise the first one.
    pub fn get_resource(&self, dataset: &Value, latest: bool) -> Option<CkanResource> {
        let package = dataset.get("result").unwrap_or(dataset);
        let resources = package.get("resources")?.as_array()?;

        let chosen = if latest {
            resources.iter().enumerate().max_by(|(ia, a), (ib, b)| {
                let created_a = a.get("created").and_then(Value::as_str).unwrap_or("");
                let created_b = b.get("created").and_then(Value::as_str).unwrap_or("");
                // Prefer the earlier entry on equal timestamps
                created_a.cmp(created_b).then(ib.cmp(ia))
            })?.1
        } else {
            resources.first()?
        };

        CkanResource::from_json(chosen)
    }

    /// Name of the dataset the collection's "current" link redirects to
    pub fn find_newest_dataset(&self, collection: &str) -> Result<Option<String>, UploadError> {
        let url = self
            .base_url
            .join(&format!("collection/{}/aktuell", collection))?;
        let location = self.rest.redirect_location(&url)?;

        Ok(location.and_then(|loc| {
            loc.trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .map(String::from)
        }))
    }

    fn action_url(&self, action: &str) -> Result<Url, UploadError> {
        Ok(self.base_url.join(&format!("api/3/action/{}", action))?)
    }

    fn call_action(&self, action: &str, body: &Value) -> Result<Value, UploadError> {
        let response = self.rest.post_json(&self.action_url(action)?, body)?;
        if !is_success(&response) {
            return Err(UploadError::Api {
                action: action.to_string(),
                message: error_message(&response),
            });
        }
        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }

    fn created_id(&self, action: &str, body: &Value) -> Result<String, UploadError> {
        let result = self.call_action(action, body)?;
        str_field(&result, "id").ok_or_else(|| UploadError::Api {
            action: action.to_string(),
            message: "response carries no id".to_string(),
        })
    }
}

impl<R: RestClient> CatalogClient for CkanApi<R> {
    fn create_package(&self, package: &Package) -> Result<String, UploadError> {
        let body = serde_json::to_value(package)?;
        let id = self.created_id("package_create", &body)?;
        info!(name = %package.name, id = %id, "package_create");
        Ok(id)
    }

    fn create_resource(&self, resource: &Resource) -> Result<String, UploadError> {
        let body = serde_json::to_value(resource)?;
        let id = self.created_id("resource_create", &body)?;
        info!(package_id = %resource.package_id, id = %id, "resource_create");
        Ok(id)
    }

    fn put_dataset_in_collection(
        &self,
        package_id: &str,
        collection: &str,
    ) -> Result<(), UploadError> {
        let dataset = self
            .read_dataset(package_id)?
            .ok_or_else(|| UploadError::NotFound(package_id.to_string()))?;
        let target = self
            .read_dataset(collection)?
            .ok_or_else(|| UploadError::NotFound(collection.to_string()))?;

        if target.get("type").and_then(Value::as_str) != Some(COLLECTION_TYPE) {
            return Err(UploadError::NotACollection(collection.to_string()));
        }

        let body = json!({
            "subject": str_field(&dataset, "id").unwrap_or_else(|| package_id.to_string()),
            "object": str_field(&target, "id").unwrap_or_else(|| collection.to_string()),
            "type": MEMBER_RELATIONSHIP,
        });
        self.call_action("package_relationship_create", &body)?;
        Ok(())
    }
}

/// Collection id from the relationships of a `package_show` response or result
pub fn collection_of(dataset: &Value) -> Option<String> {
    let package = dataset.get("result").unwrap_or(dataset);
    let relationships = package.get("relationships_as_subject")?.as_array()?;

    relationships.iter().find_map(|rel| {
        str_field(rel, "object_package_id").or_else(|| {
            rel.get("__extras")
                .and_then(|extras| str_field(extras, "object_package_id"))
        })
    })
}

/// Owning organization id of a `package_show` response or result
pub fn organization_of(dataset: &Value) -> Option<String> {
    let package = dataset.get("result").unwrap_or(dataset);
    str_field(package, "owner_org").or_else(|| {
        package
            .get("organization")
            .and_then(|org| str_field(org, "id"))
    })
}

fn is_success(response: &Value) -> bool {
    response.get("success").and_then(Value::as_bool) == Some(true)
}

fn error_message(response: &Value) -> String {
    match response.get("error") {
        Some(err) => err
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| err.to_string()),
        None => "unknown error".to_string(),
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

/// CKAN reports sizes as numbers or numeric strings
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Transport fake replaying canned responses and recording requests
    #[derive(Default)]
    struct ScriptedRest {
        responses: RefCell<VecDeque<Value>>,
        location: Option<String>,
        requests: RefCell<Vec<(String, Option<Value>)>>,
    }

    impl ScriptedRest {
        fn replying(responses: Vec<Value>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                ..Default::default()
            }
        }

        fn next(&self) -> Value {
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no scripted response left")
        }

        fn urls(&self) -> Vec<String> {
            self.requests.borrow().iter().map(|(u, _)| u.clone()).collect()
        }
    }

    impl RestClient for &ScriptedRest {
        fn get_json(&self, url: &Url) -> Result<Value, UploadError> {
            self.requests.borrow_mut().push((url.to_string(), None));
            Ok(self.next())
        }

        fn post_json(&self, url: &Url, body: &Value) -> Result<Value, UploadError> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), Some(body.clone())));
            Ok(self.next())
        }

        fn redirect_location(&self, url: &Url) -> Result<Option<String>, UploadError> {
            self.requests.borrow_mut().push((url.to_string(), None));
            Ok(self.location.clone())
        }
    }

    fn api(rest: &ScriptedRest) -> CkanApi<&ScriptedRest> {
        CkanApi::new("http://localhost", rest).unwrap()
    }

    fn not_found() -> Value {
        json!({
            "success": false,
            "error": {"message": "Nicht gefunden", "__type": "Not Found Error"}
        })
    }

    fn kita_dataset() -> Value {
        json!({
            "success": true,
            "result": {
                "id": "1c8d2a4e-5f0b-4d5e-9c1a-kita",
                "name": "kindertagesstatten1",
                "type": "dataset",
                "owner_org": "f2d024c8-dbcc-4786-837e-d4eca1a23a57",
                "organization": {"id": "f2d024c8-dbcc-4786-837e-d4eca1a23a57", "name": "sozmin"},
                "relationships_as_subject": [
                    {
                        "__extras": {
                            "object_package_id": "ed667223-6205-43f6-a2da-0acba4d53ddd",
                            "subject_package_id": "1c8d2a4e-5f0b-4d5e-9c1a-kita"
                        },
                        "type": "child_of"
                    }
                ],
                "resources": [
                    {
                        "id": "96948a3b-b1ca-407c-a33a-60a9ebc49c78",
                        "name": "kita.csv",
                        "url": "http://185.223.104.6/data/sozmin/kita_2019-09-18.csv",
                        "format": "CSV",
                        "mimetype": "text/csv",
                        "size": 300618,
                        "hash": "",
                        "created": "2019-09-18T10:00:00"
                    }
                ]
            }
        })
    }

    fn collection_dataset() -> Value {
        json!({
            "success": true,
            "result": {
                "id": "ed667223-6205-43f6-a2da-0acba4d53ddd",
                "name": "mycollection",
                "type": "collection",
                "resources": []
            }
        })
    }

    #[test]
    fn test_read_dataset_requests_package_show() {
        let rest = ScriptedRest::replying(vec![kita_dataset()]);
        let dataset = api(&rest).read_dataset("kindertagesstatten1").unwrap();

        assert!(dataset.is_some());
        assert_eq!(
            rest.urls(),
            vec!["http://localhost/api/3/action/package_show?id=kindertagesstatten1"]
        );
    }

    #[test]
    fn test_read_dataset_not_found() {
        let rest = ScriptedRest::replying(vec![not_found()]);
        assert_eq!(api(&rest).read_dataset("missing").unwrap(), None);
    }

    #[test]
    fn test_base_url_with_path() {
        let rest = ScriptedRest::replying(vec![not_found()]);
        let api = CkanApi::new("http://localhost/ckan", &rest).unwrap();
        api.read_dataset("x").unwrap();
        assert_eq!(
            rest.urls(),
            vec!["http://localhost/ckan/api/3/action/package_show?id=x"]
        );
    }

    #[test]
    fn test_get_collection() {
        let rest = ScriptedRest::replying(vec![kita_dataset()]);
        assert_eq!(
            api(&rest).get_collection("kindertagesstatten1").unwrap(),
            Some("ed667223-6205-43f6-a2da-0acba4d53ddd".to_string())
        );
    }

    #[test]
    fn test_get_collection_top_level_id() {
        let rest = ScriptedRest::replying(vec![json!({
            "success": true,
            "result": {
                "relationships_as_subject": [
                    {"object_package_id": "6f30a595-9210-4f24-8873-b52c72401468", "type": "child_of"}
                ]
            }
        })]);
        assert_eq!(
            api(&rest).get_collection("badegewasser-infrastruktur1").unwrap(),
            Some("6f30a595-9210-4f24-8873-b52c72401468".to_string())
        );
    }

    #[test]
    fn test_get_collection_null_object_id() {
        let rest = ScriptedRest::replying(vec![json!({
            "success": true,
            "result": {
                "relationships_as_subject": [
                    {"__extras": {"object_package_id": null}, "type": "child_of"}
                ]
            }
        })]);
        assert_eq!(api(&rest).get_collection("plan").unwrap(), None);
    }

    #[test]
    fn test_lookups_from_fetched_dataset() {
        let envelope = kita_dataset();
        let result = envelope["result"].clone();

        for dataset in [&envelope, &result] {
            assert_eq!(
                organization_of(dataset).as_deref(),
                Some("f2d024c8-dbcc-4786-837e-d4eca1a23a57")
            );
            assert_eq!(
                collection_of(dataset).as_deref(),
                Some("ed667223-6205-43f6-a2da-0acba4d53ddd")
            );
        }
        assert_eq!(collection_of(&collection_dataset()), None);
        assert_eq!(
            organization_of(&json!({"organization": {"id": "org-from-object"}})).as_deref(),
            Some("org-from-object")
        );
    }

    #[test]
    fn test_get_organization() {
        let rest = ScriptedRest::replying(vec![kita_dataset()]);
        assert_eq!(
            api(&rest).get_organization("kindertagesstatten1").unwrap(),
            Some("f2d024c8-dbcc-4786-837e-d4eca1a23a57".to_string())
        );
    }

    #[test]
    fn test_get_access_url() {
        let rest = ScriptedRest::replying(vec![kita_dataset()]);
        assert_eq!(
            api(&rest).get_access_url("kindertagesstatten1").unwrap(),
            Some("http://185.223.104.6/data/sozmin/kita_2019-09-18.csv".to_string())
        );
    }

    #[test]
    fn test_get_resource() {
        let rest = ScriptedRest::default();
        let resource = api(&rest).get_resource(&kita_dataset(), true).unwrap();

        assert_eq!(resource.name.as_deref(), Some("kita.csv"));
        assert_eq!(resource.id, "96948a3b-b1ca-407c-a33a-60a9ebc49c78");
        assert_eq!(resource.format.as_deref(), Some("CSV"));
        assert_eq!(
            resource.access_url.as_deref(),
            Some("http://185.223.104.6/data/sozmin/kita_2019-09-18.csv")
        );
        assert_eq!(resource.byte_size, 300618);
        assert_eq!(resource.mime_type.as_deref(), Some("text/csv"));
        assert_eq!(resource.checksum, None);
    }

    #[test]
    fn test_get_resource_latest_or_first() {
        let dataset = json!({
            "resources": [
                {"id": "old", "created": "2020-01-01T00:00:00", "size": "12"},
                {"id": "new", "created": "2021-06-01T00:00:00"},
                {"id": "mid", "created": "2020-06-01T00:00:00"}
            ]
        });
        let rest = ScriptedRest::default();
        let api = api(&rest);

        assert_eq!(api.get_resource(&dataset, true).unwrap().id, "new");
        let first = api.get_resource(&dataset, false).unwrap();
        assert_eq!(first.id, "old");
        assert_eq!(first.byte_size, 12);
    }

    #[test]
    fn test_get_resource_without_resources() {
        let rest = ScriptedRest::default();
        assert_eq!(api(&rest).get_resource(&collection_dataset(), true), None);
    }

    #[test]
    fn test_find_newest_dataset() {
        let rest = ScriptedRest {
            location: Some("http://opendata.sh/dataset/mydata".to_string()),
            ..Default::default()
        };
        let result = api(&rest).find_newest_dataset("mycollection").unwrap();

        assert_eq!(result, Some("mydata".to_string()));
        assert_eq!(
            rest.urls(),
            vec!["http://localhost/collection/mycollection/aktuell"]
        );
    }

    #[test]
    fn test_find_newest_dataset_without_redirect() {
        let rest = ScriptedRest::default();
        assert_eq!(api(&rest).find_newest_dataset("empty").unwrap(), None);
    }

    #[test]
    fn test_put_dataset_in_collection() {
        let rest = ScriptedRest::replying(vec![
            kita_dataset(),
            collection_dataset(),
            json!({"success": true, "result": {"type": "child_of"}}),
        ]);
        api(&rest)
            .put_dataset_in_collection("kindertagesstatten1", "mycollection")
            .unwrap();

        let requests = rest.requests.borrow();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[2].0,
            "http://localhost/api/3/action/package_relationship_create"
        );
        assert_eq!(
            requests[2].1,
            Some(json!({
                "subject": "1c8d2a4e-5f0b-4d5e-9c1a-kita",
                "object": "ed667223-6205-43f6-a2da-0acba4d53ddd",
                "type": "child_of"
            }))
        );
    }

    #[test]
    fn test_put_dataset_in_collection_missing_collection() {
        let rest = ScriptedRest::replying(vec![kita_dataset(), not_found()]);
        let err = api(&rest)
            .put_dataset_in_collection("mydataset", "mycollection")
            .unwrap_err();

        assert!(matches!(err, UploadError::NotFound(ref id) if id == "mycollection"));
        assert!(err.to_string().contains("mycollection"));
        assert!(err.is_invalid_argument());
        assert_eq!(
            rest.urls(),
            vec![
                "http://localhost/api/3/action/package_show?id=mydataset",
                "http://localhost/api/3/action/package_show?id=mycollection"
            ]
        );
    }

    #[test]
    fn test_put_dataset_in_collection_missing_dataset() {
        let rest = ScriptedRest::replying(vec![not_found()]);
        let err = api(&rest)
            .put_dataset_in_collection("mydataset", "mycollection")
            .unwrap_err();

        assert!(matches!(err, UploadError::NotFound(ref id) if id == "mydataset"));
        assert!(err.to_string().contains("mydataset"));
        assert_eq!(
            rest.urls(),
            vec!["http://localhost/api/3/action/package_show?id=mydataset"]
        );
    }

    #[test]
    fn test_put_dataset_in_collection_target_is_no_collection() {
        let rest = ScriptedRest::replying(vec![kita_dataset(), kita_dataset()]);
        let err = api(&rest)
            .put_dataset_in_collection("mydataset", "mycollection")
            .unwrap_err();

        assert!(matches!(err, UploadError::NotACollection(_)));
        let message = err.to_string();
        assert!(message.contains("mycollection"));
        assert!(message.contains("is no collection"));
        assert_eq!(rest.urls().len(), 2);
    }

    #[test]
    fn test_create_package_returns_id() {
        let rest = ScriptedRest::replying(vec![json!({
            "success": true,
            "result": {"id": "b1f5c0de-0000-4000-8000-000000000001", "name": "demo"}
        })]);
        let package = Package {
            name: "demo".to_string(),
            owner_org: "org".to_string(),
            ..Default::default()
        };

        let id = api(&rest).create_package(&package).unwrap();

        assert_eq!(id, "b1f5c0de-0000-4000-8000-000000000001");
        let requests = rest.requests.borrow();
        assert_eq!(requests[0].0, "http://localhost/api/3/action/package_create");
        assert_eq!(requests[0].1.as_ref().unwrap()["name"], "demo");
    }

    #[test]
    fn test_create_resource_failure() {
        let rest = ScriptedRest::replying(vec![json!({
            "success": false,
            "error": {"message": "Access denied", "__type": "Authorization Error"}
        })]);
        let resource = Resource {
            package_id: "demo".to_string(),
            ..Default::default()
        };

        let err = api(&rest).create_resource(&resource).unwrap_err();
        match err {
            UploadError::Api { action, message } => {
                assert_eq!(action, "resource_create");
                assert_eq!(message, "Access denied");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
