//! Service Class User (SCU) implementation for outbound DIMSE operations

use dicom_core::{dicom_value, DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::entries::IMPLICIT_VR_LITTLE_ENDIAN;
use dicom_ul::association::client::ClientAssociationOptions;
use dicom_ul::pdu::{PDataValue, PDataValueType, Pdu};
use tracing::{debug, info, warn};

use crate::config::{DimseConfig, RemoteNode};
use crate::types::{DimseStatus, EchoOutcome, C_ECHO_RQ, C_ECHO_RSP, NO_DATA_SET};
use crate::{DimseError, Result};

/// Message ID used for the single request sent on each association
const ECHO_MESSAGE_ID: u16 = 1;

/// DIMSE Service Class User
#[derive(Debug, Clone)]
pub struct DimseScu {
    config: DimseConfig,
}

impl DimseScu {
    /// Create a new SCU with the given configuration
    pub fn new(config: DimseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DimseConfig {
        &self.config
    }

    /// Send a C-ECHO request to a remote node.
    ///
    /// Opens one association proposing only the Verification SOP Class, sends a
    /// single C-ECHO-RQ, waits for the C-ECHO-RSP and releases the association.
    ///
    /// Returns `Err(DimseError::AssociationRejected)` when the association could not
    /// be established. Once established, every outcome of the exchange is reported as
    /// an [`EchoOutcome`]; the association is released before returning.
    pub async fn echo(&self, node: &RemoteNode) -> Result<EchoOutcome> {
        info!(
            "Sending C-ECHO to {}@{}:{} from {}",
            node.ae_title, node.host, node.port, self.config.local_aet
        );

        let scu = self.clone();
        let node = node.clone();
        tokio::task::spawn_blocking(move || scu.echo_blocking(&node))
            .await
            .map_err(|e| DimseError::internal(format!("C-ECHO worker terminated: {}", e)))?
    }

    /// Blocking form of [`DimseScu::echo`]
    pub fn echo_blocking(&self, node: &RemoteNode) -> Result<EchoOutcome> {
        self.config.validate()?;
        node.validate()?;

        // Encode before connecting so an encoding fault never leaves an open association
        let request = encode_echo_request(ECHO_MESSAGE_ID)?;

        let address = node.address();
        let mut association = ClientAssociationOptions::new()
            .with_abstract_syntax(uids::VERIFICATION)
            .calling_ae_title(self.config.local_aet.as_str())
            .called_ae_title(node.ae_title.as_str())
            .max_pdu_length(self.config.max_pdu)
            .connection_timeout(self.config.connect_timeout())
            .read_timeout(self.config.read_timeout())
            .establish(address.as_str())
            .map_err(|e| {
                DimseError::AssociationRejected(format!(
                    "{}@{}: {}",
                    node.ae_title, address, e
                ))
            })?;

        let pc_id = match association.presentation_contexts().first().map(|pc| pc.id) {
            Some(id) => id,
            None => {
                let _ = association.abort();
                return Err(DimseError::AssociationRejected(format!(
                    "{}@{}: no presentation context accepted for Verification",
                    node.ae_title, address
                )));
            }
        };
        debug!("Association established with {} (presentation context {})", address, pc_id);

        let pdu = Pdu::PData {
            data: vec![PDataValue {
                presentation_context_id: pc_id,
                value_type: PDataValueType::Command,
                is_last: true,
                data: request,
            }],
        };

        let outcome = match association.send(&pdu) {
            Ok(()) => {
                let mut command = Vec::new();
                loop {
                    match association.receive() {
                        Ok(Pdu::PData { data }) => {
                            let mut complete = false;
                            for value in data {
                                if matches!(value.value_type, PDataValueType::Command) {
                                    command.extend_from_slice(&value.data);
                                    complete |= value.is_last;
                                }
                            }
                            if complete {
                                break match decode_echo_status(&command) {
                                    Ok(code) => EchoOutcome::Status(code),
                                    Err(e) => {
                                        warn!("Invalid C-ECHO response from {}: {}", address, e);
                                        EchoOutcome::NoResponse
                                    }
                                };
                            }
                        }
                        Ok(other) => {
                            warn!("Unexpected PDU from {} while awaiting C-ECHO-RSP: {:?}", address, other);
                            break EchoOutcome::NoResponse;
                        }
                        Err(e) => {
                            warn!("No C-ECHO response from {}: {}", address, e);
                            break EchoOutcome::NoResponse;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Failed to send C-ECHO-RQ to {}: {}", address, e);
                EchoOutcome::NoResponse
            }
        };

        if let EchoOutcome::Status(code) = outcome {
            info!("C-ECHO response from {}: {}", address, DimseStatus::from_code(code));
        }

        if let Err(e) = association.release() {
            warn!("Association release with {} did not complete cleanly: {}", address, e);
        } else {
            debug!("Association with {} released", address);
        }

        Ok(outcome)
    }
}

/// Build a C-ECHO-RQ command set
pub fn echo_request_command(message_id: u16) -> InMemDicomObject {
    InMemDicomObject::command_from_element_iter([
        DataElement::new(
            tags::AFFECTED_SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::VERIFICATION),
        ),
        DataElement::new(tags::COMMAND_FIELD, VR::US, dicom_value!(U16, [C_ECHO_RQ])),
        DataElement::new(tags::MESSAGE_ID, VR::US, dicom_value!(U16, [message_id])),
        DataElement::new(
            tags::COMMAND_DATA_SET_TYPE,
            VR::US,
            dicom_value!(U16, [NO_DATA_SET]),
        ),
    ])
}

/// Encode a C-ECHO-RQ; command sets are always Implicit VR Little Endian
fn encode_echo_request(message_id: u16) -> Result<Vec<u8>> {
    let ts = IMPLICIT_VR_LITTLE_ENDIAN.erased();
    let mut data = Vec::new();
    echo_request_command(message_id)
        .write_dataset_with_ts(&mut data, &ts)
        .map_err(|e| DimseError::DicomObject(format!("Failed to encode C-ECHO-RQ: {}", e)))?;
    Ok(data)
}

/// Extract the Status of a C-ECHO-RSP command set
pub fn decode_echo_status(command: &[u8]) -> Result<u16> {
    let ts = IMPLICIT_VR_LITTLE_ENDIAN.erased();
    let obj = InMemDicomObject::read_dataset_with_ts(command, &ts)
        .map_err(|e| DimseError::DicomParsing(format!("unreadable command set: {}", e)))?;

    let field = obj
        .element(tags::COMMAND_FIELD)
        .ok()
        .and_then(|e| e.to_int::<u16>().ok())
        .ok_or_else(|| DimseError::DicomParsing("missing Command Field".to_string()))?;
    if field != C_ECHO_RSP {
        return Err(DimseError::DicomParsing(format!(
            "expected C-ECHO-RSP, got command field 0x{:04x}",
            field
        )));
    }

    obj.element(tags::STATUS)
        .ok()
        .and_then(|e| e.to_int::<u16>().ok())
        .ok_or_else(|| DimseError::DicomParsing("missing Status".to_string()))
}
