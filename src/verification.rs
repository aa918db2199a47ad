//! C-ECHO verification against a remote node.
//!
//! [`DimseVerifier::verify`] never fails: association problems, missing
//! responses, non-zero statuses and unexpected faults all come back as a
//! [`VerificationResult`] with `success == false`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::DimseSettings;
use dimse::{DimseError, DimseScu, DimseStatus, EchoOutcome, RemoteNode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,
    pub message: String,
}

impl VerificationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Parameters of a single verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub remote_ae_title: String,
    pub host: String,
    pub port: u16,
    pub local_ae_title: String,
}

#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, request: EchoRequest) -> VerificationResult;
}

/// Verifier backed by a real DICOM association
#[derive(Debug, Clone, Default)]
pub struct DimseVerifier {
    settings: DimseSettings,
}

impl DimseVerifier {
    pub fn new(settings: DimseSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Verifier for DimseVerifier {
    async fn verify(&self, request: EchoRequest) -> VerificationResult {
        info!(
            "Attempting C-ECHO to {}@{}:{} from {}",
            request.remote_ae_title, request.host, request.port, request.local_ae_title
        );

        let scu = DimseScu::new(self.settings.to_dimse_config(request.local_ae_title.as_str()));
        let node = RemoteNode::new(
            request.remote_ae_title.as_str(),
            request.host.as_str(),
            request.port,
        );

        match scu.echo(&node).await {
            Ok(outcome) => interpret_outcome(&request.remote_ae_title, outcome),
            Err(e) => interpret_error(&request.remote_ae_title, e),
        }
    }
}

/// Map the response of an established association to a result
pub fn interpret_outcome(remote_ae_title: &str, outcome: EchoOutcome) -> VerificationResult {
    match outcome {
        EchoOutcome::Status(code) if DimseStatus::from_code(code).is_success() => {
            VerificationResult::success(format!("C-ECHO successful with {}", remote_ae_title))
        }
        EchoOutcome::Status(code) => {
            VerificationResult::failure(format!("C-ECHO failed with status: 0x{:04x}", code))
        }
        EchoOutcome::NoResponse => {
            VerificationResult::failure("Connection timed out or received invalid response")
        }
    }
}

fn interpret_error(remote_ae_title: &str, error: DimseError) -> VerificationResult {
    if error.is_association_failure() {
        warn!("{}", error);
        return VerificationResult::failure(format!(
            "Association rejected or failed with {}",
            remote_ae_title
        ));
    }

    error!("Error during C-ECHO: {}", error);
    VerificationResult::failure(format!("Error during C-ECHO: {}", error))
}
