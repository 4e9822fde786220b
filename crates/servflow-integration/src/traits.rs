//! The `Integration` base trait and its capability-cast extensions (§4.C,
//! §3's "Integration (produced by C)").
//!
//! Only `integration_type` is required at the base. Richer behavior is
//! reached by casting through one of the `as_*` methods, each defaulting
//! to `None`; a concrete integration overrides the ones it implements.
//! This is the idiomatic alternative to `std::any::Any` downcasting here:
//! `Any` would hand back a concrete type, not a `dyn Trait`, so it can't
//! express "this integration is *a* `Fetcher`, among other things, without
//! revealing which concrete type implements it."  A capability cast
//! failing is a configuration error, not a runtime one — it is checked
//! once, at the point an action is constructed against a named
//! integration, never on the hot path.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use servflow_core::HttpMethod;
use servflow_error::ExecutionError;

pub trait Integration: Send + Sync {
    fn integration_type(&self) -> &str;

    fn as_fetcher(&self) -> Option<&dyn Fetcher> {
        None
    }
    fn as_storer(&self) -> Option<&dyn Storer> {
        None
    }
    fn as_updater(&self) -> Option<&dyn Updater> {
        None
    }
    fn as_deleter(&self) -> Option<&dyn Deleter> {
        None
    }
    fn as_vector_fetcher(&self) -> Option<&dyn VectorFetcher> {
        None
    }
    fn as_vector_storer(&self) -> Option<&dyn VectorStorer> {
        None
    }
    fn as_mongo_querier(&self) -> Option<&dyn MongoQuerier> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl FetchRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Value,
}

#[async_trait]
pub trait Fetcher: Integration {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, ExecutionError>;
}

#[async_trait]
pub trait Storer: Integration {
    async fn store(&self, key: &str, value: Value) -> Result<(), ExecutionError>;
}

#[async_trait]
pub trait Updater: Integration {
    async fn update(&self, key: &str, value: Value) -> Result<(), ExecutionError>;
}

#[async_trait]
pub trait Deleter: Integration {
    async fn delete(&self, key: &str) -> Result<(), ExecutionError>;
}

#[async_trait]
pub trait VectorFetcher: Integration {
    async fn fetch_vector(
        &self,
        query: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, ExecutionError>;
}

#[async_trait]
pub trait VectorStorer: Integration {
    async fn store_vector(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: Value,
    ) -> Result<(), ExecutionError>;
}

#[async_trait]
pub trait MongoQuerier: Integration {
    async fn query(&self, filter: Value) -> Result<Vec<Value>, ExecutionError>;
}
