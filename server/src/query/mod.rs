pub mod client;
pub mod codec;
pub mod connection;
pub mod supervisor;
#[cfg(test)]
pub(crate) mod testing;

pub use client::QueryClient;
pub use supervisor::{Intervals, run_supervisor};

/// Failure talking to the ServerQuery interface.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out waiting for the server")]
    Timeout,
    #[error("connection closed")]
    Closed,
    #[error("not connected")]
    NotConnected,
    #[error("unexpected greeting: {0}")]
    Handshake(String),
    #[error("server error {id}: {msg}")]
    Server { id: u32, msg: String },
    #[error("reply contained no records")]
    EmptyReply,
}
