//! `gloo-net` implementation of the session transport.
//!
//! Client-side (csr): real `fetch` calls. Native builds get a stub that
//! reports the network as unavailable, so the rest of the crate compiles
//! and tests on the host.

#![allow(clippy::unused_async)]

use session::ApiError;
use session::transport::{ApiRequest, ApiResponse, Transport};
#[cfg(feature = "csr")]
use session::transport::{FormField, Method, RequestBody};

/// Browser `fetch` transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        #[cfg(feature = "csr")]
        {
            use gloo_net::http::Request;

            let ApiRequest { method, url, bearer, body } = request;
            let mut builder = match method {
                Method::Get => Request::get(&url),
                Method::Post => Request::post(&url),
                Method::Put => Request::put(&url),
                Method::Delete => Request::delete(&url),
            };
            if let Some(token) = bearer {
                builder = builder.header("Authorization", &format!("Bearer {token}"));
            }
            let prepared = match body {
                RequestBody::Empty => builder.build(),
                RequestBody::Json(value) => builder.json(&value),
                RequestBody::Multipart(fields) => builder.body(form_data(fields)?),
            };
            let response = prepared.map_err(network)?.send().await.map_err(network)?;
            let status = response.status();
            let body = response.text().await.map_err(network)?;
            Ok(ApiResponse::new(status, body))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = request;
            Err(ApiError::Network("not available outside the browser".to_owned()))
        }
    }
}

#[cfg(feature = "csr")]
fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

#[cfg(feature = "csr")]
fn js_error(err: &wasm_bindgen::JsValue) -> ApiError {
    ApiError::Network(format!("{err:?}"))
}

/// Build a browser `FormData`; the browser writes the multipart boundary.
#[cfg(feature = "csr")]
fn form_data(fields: Vec<FormField>) -> Result<web_sys::FormData, ApiError> {
    let form = web_sys::FormData::new().map_err(|e| js_error(&e))?;
    for field in fields {
        match field {
            FormField::Text { name, value } => {
                form.append_with_str(&name, &value).map_err(|e| js_error(&e))?;
            }
            FormField::File { name, filename, content_type, bytes } => {
                let parts = js_sys::Array::new();
                parts.push(&js_sys::Uint8Array::from(bytes.as_slice()));
                let options = web_sys::BlobPropertyBag::new();
                options.set_type(&content_type);
                let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                    .map_err(|e| js_error(&e))?;
                form.append_with_blob_and_filename(&name, &blob, &filename).map_err(|e| js_error(&e))?;
            }
        }
    }
    Ok(form)
}
