//! DTOs for the operational HTTP API.

pub mod requests;
pub mod responses;

pub use requests::InvalidateRequest;
pub use responses::{
    DeleteResponse, ErrorResponse, FlushResponse, HealthResponse, InvalidateResponse,
    ResetStatsResponse,
};
