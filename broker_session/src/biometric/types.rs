use serde::Serialize;

/// Platform reported by the host bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPlatform {
    Ios,
    Android,
    /// A known platform without a usable platform authenticator, e.g. desktop or web
    Other(String),
    /// The host did not say. Biometrics stay allowed so the app can be tried in a browser.
    Unknown,
}

impl HostPlatform {
    pub fn from_host(platform: Option<&str>) -> Self {
        match platform.map(str::trim) {
            None | Some("") => Self::Unknown,
            Some(p) if p.eq_ignore_ascii_case("ios") => Self::Ios,
            Some(p) if p.eq_ignore_ascii_case("android") => Self::Android,
            Some(p) => Self::Other(p.to_string()),
        }
    }

    pub(crate) fn allows_biometrics(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
    pub name: String,
    pub id: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialUserEntity {
    /// base64url
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub type_: String,
    pub alg: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    pub authenticator_attachment: String,
    pub user_verification: String,
    pub resident_key: String,
}

/// Options handed to the platform to create a new credential.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreationOptions {
    /// base64url, 32 random bytes
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: PublicKeyCredentialUserEntity,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub authenticator_selection: AuthenticatorSelection,
    /// milliseconds
    pub timeout: u32,
    pub attestation: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AllowCredential {
    #[serde(rename = "type")]
    pub type_: String,
    /// base64url credential id
    pub id: String,
    pub transports: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequestOptions {
    pub challenge: String,
    pub rp_id: String,
    pub allow_credentials: Vec<AllowCredential>,
    pub user_verification: String,
    pub timeout: u32,
}

/// Credential returned by a successful creation ceremony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCredential {
    pub raw_id: Vec<u8>,
}

/// Assertion returned by a successful get ceremony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformAssertion {
    pub raw_id: Vec<u8>,
}
