pub mod body;
pub mod error;
pub mod headers;
pub mod relay;

pub use body::{InboundBody, RelayBody};
pub use error::{ErrorPayload, RELAY_FAILURE, RelayError};
pub use relay::{InboundRequest, RelayResponse, RelayService};
