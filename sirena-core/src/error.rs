use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown node {0}")]
    InvalidNode(NodeId),
    #[error("No active route for vehicle {0}")]
    UnknownVehicle(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Search expanded more than {0} nodes without reaching the target")]
    SearchBudgetExceeded(usize),
    #[error("Solver failure: {0}")]
    SolverFailure(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Unrecoverable error: {0}")]
    UnrecoverableError(&'static str),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
