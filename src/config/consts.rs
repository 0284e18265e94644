/// Default API endpoint passed to the engine
pub const DEFAULT_API_URL: &str = "https://api.bitwarden.com";
/// Default identity endpoint passed to the engine
pub const DEFAULT_IDENTITY_URL: &str = "https://identity.bitwarden.com";
/// User agent reported by the engine when none is configured
pub const DEFAULT_USER_AGENT: &str = "Bitwarden Rust-SDK";
/// Device type reported by the engine when none is configured
pub const DEFAULT_DEVICE_TYPE: &str = "SDK";
/// How long the CLI waits on an async command before cancelling it
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
