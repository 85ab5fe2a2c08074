//! Request signing
//!
//! A `Signer` turns an unsigned `ApiRequest` into the `SignedRequest` the
//! transport executes verbatim. Signers never perform I/O.

use std::fmt;

use crate::client::{Credentials, NonceGenerator};
use crate::errors::CcxtResult;
use crate::types::{HttpMethod, Params, SignedRequest};

/// API section a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Api {
    Public,
    Private,
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Api::Public => f.write_str("public"),
            Api::Private => f.write_str("private"),
        }
    }
}

/// Unsigned request as built by a connector operation
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub api: Api,
    pub method: HttpMethod,
    /// Venue path, possibly templated (`orders/{cointype}`)
    pub path: String,
    pub params: Params,
}

impl ApiRequest {
    pub fn new(api: Api, method: HttpMethod, path: impl Into<String>, params: Params) -> Self {
        Self {
            api,
            method,
            path: path.into(),
            params,
        }
    }

    pub fn public_get(path: impl Into<String>, params: Params) -> Self {
        Self::new(Api::Public, HttpMethod::Get, path, params)
    }

    pub fn private_get(path: impl Into<String>, params: Params) -> Self {
        Self::new(Api::Private, HttpMethod::Get, path, params)
    }

    pub fn private_post(path: impl Into<String>, params: Params) -> Self {
        Self::new(Api::Private, HttpMethod::Post, path, params)
    }

    pub fn is_private(&self) -> bool {
        self.api == Api::Private
    }
}

/// Venue-specific signing strategy
pub trait Signer: Send + Sync {
    /// Produce the signed descriptor for `request`
    ///
    /// Private requests fail with `AuthenticationError` when credentials are
    /// missing. A nonce is drawn only for requests that need one.
    fn sign(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
        nonce: &NonceGenerator,
    ) -> CcxtResult<SignedRequest>;
}

/// `base` + `/` + `path`, with `?query` appended when non-empty
pub fn join_url(base: &str, path: &str, params: &Params) -> String {
    let mut url = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    if !params.is_empty() {
        let query = params.to_query_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
    }
    url
}
