pub mod tx;
pub mod types;

#[cfg(feature = "service")]
pub mod service;
