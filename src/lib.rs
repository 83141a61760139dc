//! Trade opportunities service: sector market reports built from web search
//! snippets and a generative model, served over HTTP.

pub mod clients;
pub mod collector;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod generator;
pub mod http;
pub mod pipeline;
pub mod prompts;
pub mod rate_limit;
pub mod schemas;
pub mod usage;
