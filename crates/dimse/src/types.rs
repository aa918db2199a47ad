//! Common types for DIMSE operations

/// Command Field value of a C-ECHO-RQ
pub const C_ECHO_RQ: u16 = 0x0030;

/// Command Field value of a C-ECHO-RSP
pub const C_ECHO_RSP: u16 = 0x8030;

/// Command Data Set Type value signalling that no data set follows
pub const NO_DATA_SET: u16 = 0x0101;

/// DIMSE operation status, classified per PS3.7 Annex C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimseStatus {
    /// Operation completed successfully
    Success,
    /// Operation is pending (more responses to follow)
    Pending(u16),
    /// Operation cancelled by user
    Cancel,
    /// Operation failed with error
    Failure(u16),
    /// Warning occurred during operation
    Warning(u16),
}

impl DimseStatus {
    /// Classify a raw Status (0000,0900) value
    pub fn from_code(code: u16) -> Self {
        match code {
            0x0000 => DimseStatus::Success,
            0xFF00 | 0xFF01 => DimseStatus::Pending(code),
            0xFE00 => DimseStatus::Cancel,
            0x0001 | 0x0107 | 0x0116 | 0xB000..=0xBFFF => DimseStatus::Warning(code),
            _ => DimseStatus::Failure(code),
        }
    }

    /// Raw status code
    pub fn code(&self) -> u16 {
        match self {
            DimseStatus::Success => 0x0000,
            DimseStatus::Cancel => 0xFE00,
            DimseStatus::Pending(c) | DimseStatus::Failure(c) | DimseStatus::Warning(c) => *c,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DimseStatus::Success)
    }
}

impl std::fmt::Display for DimseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            DimseStatus::Success => "Success",
            DimseStatus::Pending(_) => "Pending",
            DimseStatus::Cancel => "Cancel",
            DimseStatus::Failure(_) => "Failure",
            DimseStatus::Warning(_) => "Warning",
        };
        write!(f, "{} (0x{:04x})", kind, self.code())
    }
}

/// What came back from a single C-ECHO exchange on an established association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoOutcome {
    /// A C-ECHO-RSP arrived carrying this Status value
    Status(u16),
    /// No usable response: read timeout, abort, or an undecodable command set
    NoResponse,
}
