pub mod setup;
pub mod transports;
