//! Backend API client and models
//!
//! This module handles communication with the SafeLink backend
//! and defines the data models for its requests/responses.

pub mod client;
pub mod error;
pub mod models;

pub use client::{
    ApiClient, HealthApi, CHAT_TIMEOUT, DEFAULT_HOSPITAL_RADIUS_METERS, EMPTY_REPLY_PLACEHOLDER,
};
pub use error::{ApiError, ApiResult, Operation};
pub use models::*;
