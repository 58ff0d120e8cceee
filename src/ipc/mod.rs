//! IPC module exposing the session to displays and control panels

mod protocol;
mod server;

pub use server::Server;
