//! Transport abstraction
//!
//! A transport owns one network connection and its background receive
//! task. Sessions only start and stop it; the transport reports failures
//! and termination back through [`SessionHooks`].

pub mod hooks;
pub mod mock;
pub mod tcp;
pub mod traits;

pub use hooks::{SessionHooks, TerminationCause, TerminationEvent, TerminationSender};
pub use mock::{MockTransport, MockTransportFactory};
pub use tcp::{TcpTransport, TcpTransportFactory};
pub use traits::{ConnectParams, Transport, TransportFactory};
