//! Turning validated parameters into a concrete response.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::shaping::body;
use crate::shaping::headers::{Padding, SampleHeaderPool, CONTENT_TYPE_COST};
use crate::shaping::params::RequestParameters;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A fabricated response, owned by the request that asked for it.
#[derive(Debug, Clone)]
pub struct ShapedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// How the header budget was spent.
    pub padding: Padding,
}

/// Shape a response for already-validated parameters. Never fails.
pub fn shape(pool: &SampleHeaderPool, params: &RequestParameters) -> ShapedResponse {
    let mut headers = HeaderMap::new();
    let mut budget = params.header_bytes as i64;

    let status = if params.body_bytes == 0 {
        StatusCode::NO_CONTENT
    } else {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        budget -= CONTENT_TYPE_COST;
        StatusCode::OK
    };

    let padding = pool.pad(budget, &mut headers);

    ShapedResponse {
        status,
        headers,
        body: body::generate(params.body_bytes),
        padding,
    }
}

impl IntoResponse for ShapedResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        };
        (self.status, self.headers, body).into_response()
    }
}
