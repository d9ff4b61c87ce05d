// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ConversionAck, SoulMateProfile, SoulMateResult, SoulMateResultWithDate};
pub use requests::SoulMateSubmission;
pub use responses::{BackendProbeResponse, ErrorResponse, HealthResponse, UpstreamErrorResponse};
