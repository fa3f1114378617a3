//! Persistence layer
//!
//! File-based storage for API credentials.

pub mod credentials;

pub use credentials::{
    CredentialSource, CredentialStore, EnvCredentials, LayeredCredentials, SecretStore,
};
