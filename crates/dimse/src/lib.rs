//! DIMSE (DICOM Message Service Element) implementation
//!
//! This crate provides the Service Class User (SCU) side of DICOM verification
//! (C-ECHO) on top of the `dicom-ul` upper layer.
//!
//! # Features
//! - Outbound C-ECHO over a single, short-lived association
//! - DIMSE status classification
//! - AE title and remote node validation

pub mod config;
pub mod error;
pub mod scu;
pub mod types;

// Re-export commonly used types
pub use config::{validate_ae_title, DimseConfig, RemoteNode};
pub use error::{DimseError, Result};
pub use scu::DimseScu;
pub use types::{DimseStatus, EchoOutcome};

