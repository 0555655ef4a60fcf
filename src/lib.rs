//! forge-provider — declarative client for an MCP gateway/registry service.
//!
//! Registers gateways, virtual servers, tools, resources, prompts and roots
//! against the service's REST API and keeps them converged with declared
//! models: a typed HTTP client, per-kind wire types, a generic reconciler
//! and read-only lookups.

pub mod client;
pub mod config;
pub mod datasource;
pub mod error;
pub mod json;
pub mod reconcile;
pub mod schema;

pub use client::{Client, Collection, Entity, RawResponse, ReadPath};
pub use config::{
    BEARER_TOKEN_ENV, DEFAULT_ENDPOINT, ENDPOINT_ENV, ProviderConfig, ResolvedConfig,
    parse_env_ref,
};
pub use datasource::DataSource;
pub use error::{ProviderError, Result};
pub use reconcile::{
    GatewayModel, Managed, Plan, PromptModel, Reconciler, ResourceModel, RootModel, ServerModel,
    ToolModel,
};
pub use schema::{GatewayTransport, Schema, Visibility};
