//! Cloud deployment platform collaborator for ferry.
//!
//! Drives the `gcloud` CLI through the [`GcloudExecutor`] seam:
//! service-account session activation/revocation and Cloud Run deploy
//! dispatch with per-environment traffic tags.

pub mod client;
pub mod executor;
pub mod gcloud;

pub use client::CloudRunClient;
pub use executor::{GcloudExecutor, RealExecutor};
pub use gcloud::GcloudError;
