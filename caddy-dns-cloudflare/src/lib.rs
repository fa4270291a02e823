//! # caddy-dns-cloudflare
//!
//! Cloudflare DNS provider module for a Caddy-style host: reads the
//! `cloudflare` Caddyfile directive, expands placeholders in the configured
//! tokens and validates them before the wrapped Cloudflare client is used.
//!
//! ## Supported Syntax
//!
//! | Form | Tokens |
//! |------|--------|
//! | `cloudflare <api_token>` | one token, zone read + DNS write |
//! | `cloudflare { api_token <t> }` | same, block form |
//! | `cloudflare { zone_token <z> dns_token <d> }` | split tokens ([`SchemaMode::Split`]) |
//! | `cloudflare { zone_token <z> api_token <d> }` | split tokens ([`SchemaMode::Legacy`] / [`SchemaMode::Strict`]) |
//!
//! Block subdirectives go on their own lines. Modules built by the registry
//! use the schema selected with [`Context::with_schema`].
//!
//! ## Usage
//!
//! ```rust
//! use caddy_dns_cloudflare::{Context, Dispenser, ModuleRegistry, Replacer};
//!
//! # fn main() -> caddy_dns_cloudflare::Result<()> {
//! // 1. Register the module once at startup
//! let mut registry = ModuleRegistry::new();
//! caddy_dns_cloudflare::register(&mut registry)?;
//!
//! // 2. Parse and provision a directive
//! let ctx = Context::new(
//!     Replacer::new().with("cf.token", "Sqqty8-Vn0iOP29rvqYgwKz_xqGQ4y5JhuVL1-qU"),
//! );
//! let mut d = Dispenser::parse("Caddyfile", "cloudflare {cf.token}")?;
//! let module = registry.load_caddyfile(&mut d, &ctx)?;
//! assert_eq!(module.id().as_str(), "dns.providers.cloudflare");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every step returns [`Result<T, ConfigError>`](ConfigError). Errors are
//! configuration errors and are meant to stop the host from starting:
//!
//! - [`ConfigError::Parse`]: grammar violations, with file and line
//! - [`ConfigError::Credentials`]: incomplete token combinations or a
//!   malformed API token

mod caddyfile;
mod error;
mod module;
mod provider;
mod replacer;
mod types;
mod utils;
mod validation;

pub use caddyfile::{Dispenser, Token, TokenKind, quote, tokenize};
pub use error::{ConfigError, CredentialError, ParseError, Result};
pub use module::{
    CaddyfileUnmarshaler, Context, DNS_PROVIDERS_NAMESPACE, Module, ModuleId, ModuleInfo,
    ModuleRegistry, Provisioner,
};
pub use provider::{CloudflareProvider, DIRECTIVE, MODULE_ID};
pub use replacer::{Expand, Replacer};
pub use types::{CredentialSet, Field, SchemaMode, TokenScheme};
pub use utils::log_sanitizer::mask_token;
pub use validation::{is_valid_token, validate_api_token};

/// Register every module in this crate with the host's registry.
pub fn register(registry: &mut ModuleRegistry) -> Result<()> {
    registry.register(<CloudflareProvider as Module>::module_info())
}

/// Parse one `cloudflare` directive from text without provisioning it.
pub fn parse_directive(input: &str, mode: SchemaMode) -> Result<CloudflareProvider> {
    let mut d = Dispenser::parse("Caddyfile", input)?;
    let mut provider = CloudflareProvider::new(mode);
    provider.unmarshal_caddyfile(&mut d)?;
    Ok(provider)
}
