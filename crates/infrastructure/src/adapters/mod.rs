//! Adapter implementations of application ports.

mod reqwest_sender;

pub use reqwest_sender::{DEFAULT_USER_AGENT, ReqwestSender, build_sender};
