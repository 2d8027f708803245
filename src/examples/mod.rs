//! Prebuilt optical systems used by the integration tests and benches.
pub mod cassegrain;
pub mod echelle;
