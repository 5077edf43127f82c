//! bandvault: a local music-collection indexing service. Scans band/album
//! folders, classifies their structure and compliance, reconciles against
//! stored metadata, and serves queries and analytics over a line-delimited
//! JSON protocol on stdio.

pub mod cli;
pub mod core;
pub mod mcp;
