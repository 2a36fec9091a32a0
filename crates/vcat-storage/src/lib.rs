//! S3-compatible object storage for published artifacts.
//!
//! This crate provides:
//! - The [`ObjectStore`] trait the publisher depends on
//! - [`S3Client`], an `aws-sdk-s3` implementation for R2, Supabase Storage,
//!   MinIO and other S3-compatible endpoints
//! - Public URL resolution for uploaded objects

pub mod client;
pub mod error;
pub mod store;

pub use client::{bucket_from_env, public_object_url, S3Client, S3Config, DEFAULT_BUCKET};
pub use error::{StorageError, StorageResult};
pub use store::ObjectStore;
