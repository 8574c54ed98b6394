mod config;
mod errors;
mod manager;
mod platform;
mod types;

pub use config::BiometricConfig;
pub use errors::BiometricError;
pub use manager::BiometricManager;
pub use platform::{PlatformAuthenticator, UnavailablePlatform};
pub use types::{
    AllowCredential, AuthenticatorSelection, CredentialCreationOptions, CredentialRequestOptions,
    HostPlatform, PlatformAssertion, PlatformCredential, PubKeyCredParam, PublicKeyCredentialUserEntity,
    RelyingParty,
};
