//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the authentication core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer
//! or by the identity layer itself.

mod authorizer;
mod sender;

pub use authorizer::{AuthFuture, Authorizer, TokenSource};
pub use sender::{HttpMethod, HttpRequest, HttpResponse, SendFuture, Sender, SenderError};
