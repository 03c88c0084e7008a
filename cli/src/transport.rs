//! `reqwest` implementation of the session transport.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use session::ApiError;
use session::transport::{ApiRequest, ApiResponse, FormField, Method, RequestBody, Transport};

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot initialise.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("screening-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let ApiRequest { method, url, bearer, body } = request;
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        tracing::debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, &url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
        };

        let response = builder.send().await.map_err(network)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network)?;
        Ok(ApiResponse::new(status, body))
    }
}

fn network(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn multipart_form(fields: Vec<FormField>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File { name, filename, content_type, bytes } => {
                let part = Part::bytes(bytes).file_name(filename).mime_str(&content_type).map_err(network)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}
