//! Crate-wide error type. Mirrors the shape of `ixa::error::IxaError`: one
//! enum, `From` impls for the I/O-adjacent error types we actually produce,
//! plus a couple of string-carrying variants for our own fatal conditions.

use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub enum SimError {
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    /// Parameter validation failure (§7: out-of-range probabilities, negative delays).
    Config(String),
    /// Fatal data condition (§7: empty contact log, empty id set).
    Data(String),
}

impl From<io::Error> for SimError {
    fn from(e: io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<csv::Error> for SimError {
    fn from(e: csv::Error) -> Self {
        SimError::Csv(e)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Json(e)
    }
}

impl Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::Io(e) => write!(f, "I/O error: {e}"),
            SimError::Csv(e) => write!(f, "CSV error: {e}"),
            SimError::Json(e) => write!(f, "JSON error: {e}"),
            SimError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            SimError::Data(msg) => write!(f, "invalid input data: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}
