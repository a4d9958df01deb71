//! Errors of the connection flow.
//!
//! Every variant is fixed-size and `Copy`, so errors travel through
//! `Progress` and the selector without allocation.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Scan, join or status request refused by the radio.
    Radio(RadioError),

    /// A scan finished with nothing on the air.
    NoNetworksFound,

    /// Saved credentials could not be read or written.
    Storage(StorageError),

    /// The panel did not initialise or a flush failed.
    Display,
}

/// Where the radio gave up. Driver detail is logged at the call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// The driver could not be started or configured.
    NotStarted,
    /// Scan could not start or was aborted.
    ScanFailed,
    /// The driver rejected the connection request.
    ConnectFailed,
}

/// Failures of the key-value credential store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The namespace could not be opened.
    OpenFailed,
    /// Write attempted through a read-only handle.
    ReadOnly,
    /// Flash read/write/erase failed.
    Flash,
    /// Stored bytes did not decode, or a value does not fit its buffer.
    Corrupted,
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Error::Radio(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
