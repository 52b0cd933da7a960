//! JSON transport for the CKAN action API

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::UploadError;

/// Executes HTTP requests and hands back parsed JSON bodies
///
/// CKAN reports failures such as "not found" inside the JSON body
/// (`"success": false`), so implementations return the body for any status
/// as long as it parses.
pub trait RestClient {
    fn get_json(&self, url: &Url) -> Result<Value, UploadError>;

    fn post_json(&self, url: &Url, body: &Value) -> Result<Value, UploadError>;

    /// `Location` header of the response, without following the redirect
    fn redirect_location(&self, url: &Url) -> Result<Option<String>, UploadError>;
}

/// Blocking reqwest implementation of [`RestClient`]
pub struct HttpRestClient {
    client: Client,
    api_key: Option<String>,
}

impl HttpRestClient {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, key),
            None => request,
        }
    }
}

impl RestClient for HttpRestClient {
    fn get_json(&self, url: &Url) -> Result<Value, UploadError> {
        debug!(url = %url, "GET");
        let response = self
            .authorize(self.client.get(url.clone()))
            .header(ACCEPT, "application/json")
            .send()?;
        read_json(url, response)
    }

    fn post_json(&self, url: &Url, body: &Value) -> Result<Value, UploadError> {
        debug!(url = %url, "POST");
        let response = self
            .authorize(self.client.post(url.clone()))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()?;
        read_json(url, response)
    }

    fn redirect_location(&self, url: &Url) -> Result<Option<String>, UploadError> {
        debug!(url = %url, "GET (no redirect)");
        let response = self.authorize(self.client.get(url.clone())).send()?;
        if !response.status().is_redirection() {
            return Ok(None);
        }
        Ok(response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from))
    }
}

fn read_json(url: &Url, response: Response) -> Result<Value, UploadError> {
    let status = response.status();
    let content = response.text()?;
    serde_json::from_str(&content).map_err(|e| UploadError::LoadError {
        path: url.to_string(),
        reason: format!("HTTP {} with a body that is not JSON: {}", status, e),
    })
}
