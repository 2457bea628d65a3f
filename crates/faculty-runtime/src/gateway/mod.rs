mod extract;
mod faculty;
mod response;
mod server;
mod tracing;

pub use extract::{JsonBody, SubmissionForm, PHOTOGRAPH_FIELD};
pub use response::{ApiError, ApiResponse, ApiResult};
pub use server::{AppState, GatewayServer, HealthResponse};
pub use tracing::{TracingState, REQUEST_ID_HEADER, TRACE_ID_HEADER};
