use std::fmt;

use serde::{Deserialize, Serialize};

use crate::caddyfile::quote;
use crate::error::CredentialError;
use crate::replacer::Expand;
use crate::utils::log_sanitizer::mask_token;

// ============ Schema ============

/// A credential field, named by its Caddyfile subdirective key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Single token with zone read and DNS write access.
    ApiToken,
    /// Zone read access, all zones.
    ZoneToken,
    /// DNS write access, scoped to applicable zones.
    DnsToken,
}

impl Field {
    /// All fields, in the order they are rendered back to directive text.
    pub const ALL: [Self; 3] = [Self::ApiToken, Self::ZoneToken, Self::DnsToken];

    /// Subdirective key used in the Caddyfile.
    pub const fn key(self) -> &'static str {
        match self {
            Self::ApiToken => "api_token",
            Self::ZoneToken => "zone_token",
            Self::DnsToken => "dns_token",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Selects which subdirective keys are accepted and which invariant applies.
///
/// | Mode | Keys | Valid combinations | Format check |
/// |------|------|--------------------|--------------|
/// | `Legacy` | `api_token`, `zone_token` | `api_token` with optional `zone_token` | no |
/// | `Split` | `api_token`, `zone_token`, `dns_token` | `api_token` alone, or `zone_token` + `dns_token` | no |
/// | `Strict` | `api_token`, `zone_token` | as `Legacy` | `api_token` |
///
/// In `Legacy` and `Strict`, a block that sets both keys uses `api_token` as the
/// DNS write token and `zone_token` for zone reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    Legacy,
    Split,
    #[default]
    Strict,
}

impl SchemaMode {
    /// Whether `field` may be set in this mode.
    pub fn accepts(self, field: Field) -> bool {
        match self {
            Self::Split => true,
            Self::Legacy | Self::Strict => field != Field::DnsToken,
        }
    }

    /// Resolve a subdirective key to a field accepted by this mode.
    pub fn field_for_key(self, key: &str) -> Option<Field> {
        Field::from_key(key).filter(|f| self.accepts(*f))
    }

    /// Whether the expanded `api_token` must pass the token format check.
    pub const fn checks_token_format(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// How the configured tokens divide zone-read and DNS-write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScheme {
    /// One token for everything.
    Single,
    /// Separate zone-read and DNS-write tokens.
    Split,
}

// ============ Credential Types ============

/// Tokens extracted from one `cloudflare` configuration block.
///
/// Created fresh per block, filled in by the parser, expanded in place during
/// provisioning, then owned by the provider.
///
/// # Serialization
///
/// Serialized in the provider's JSON config shape; empty fields are omitted:
///
/// ```json
/// { "zone_token": "...", "dns_token": "..." }
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zone_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns_token: String,
}

impl CredentialSet {
    /// Credentials holding a single API token.
    pub fn single(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            ..Self::default()
        }
    }

    /// Credentials holding a zone-read / DNS-write token pair.
    pub fn split(zone_token: impl Into<String>, dns_token: impl Into<String>) -> Self {
        Self {
            zone_token: zone_token.into(),
            dns_token: dns_token.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ApiToken => &self.api_token,
            Field::ZoneToken => &self.zone_token,
            Field::DnsToken => &self.dns_token,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::ApiToken => &mut self.api_token,
            Field::ZoneToken => &mut self.zone_token,
            Field::DnsToken => &mut self.dns_token,
        }
    }

    fn has(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|f| !self.has(f))
    }

    /// Whether `api_token` is set alongside a complete split pair.
    ///
    /// The split pair wins in that case and `api_token` is ignored.
    pub fn has_shadowed_api_token(&self) -> bool {
        self.has(Field::ApiToken) && self.has(Field::ZoneToken) && self.has(Field::DnsToken)
    }

    /// Expand placeholders in every non-empty field.
    ///
    /// Unknown placeholders are replaced with the empty string. Fields are
    /// expanded independently.
    pub fn expand(&mut self, replacer: &dyn Expand) {
        for field in Field::ALL {
            let slot = self.slot_mut(field);
            if !slot.is_empty() {
                *slot = replacer.replace_all(slot, "");
            }
        }
    }

    /// First non-empty field that `mode` does not accept.
    pub fn unsupported_field(&self, mode: SchemaMode) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| self.has(*f) && !mode.accepts(*f))
    }

    /// Check that the configured tokens form a complete combination for `mode`.
    pub fn check(&self, mode: SchemaMode) -> Result<TokenScheme, CredentialError> {
        if let Some(field) = self.unsupported_field(mode) {
            return Err(CredentialError::UnsupportedField { field });
        }
        match mode {
            SchemaMode::Split => match (self.has(Field::ZoneToken), self.has(Field::DnsToken)) {
                (true, true) => Ok(TokenScheme::Split),
                (true, false) => Err(CredentialError::MissingCompanion {
                    provided: Field::ZoneToken,
                    missing: Field::DnsToken,
                }),
                (false, true) => Err(CredentialError::MissingCompanion {
                    provided: Field::DnsToken,
                    missing: Field::ZoneToken,
                }),
                (false, false) if self.has(Field::ApiToken) => Ok(TokenScheme::Single),
                (false, false) => Err(CredentialError::MissingTokens),
            },
            SchemaMode::Legacy | SchemaMode::Strict => {
                match (self.has(Field::ApiToken), self.has(Field::ZoneToken)) {
                    (true, true) => Ok(TokenScheme::Split),
                    (true, false) => Ok(TokenScheme::Single),
                    (false, true) => Err(CredentialError::MissingCompanion {
                        provided: Field::ZoneToken,
                        missing: Field::ApiToken,
                    }),
                    (false, false) => Err(CredentialError::MissingTokens),
                }
            }
        }
    }

    /// Token used for zone lookups under `mode`.
    pub fn zone_read_token(&self, mode: SchemaMode) -> &str {
        self.role_token(mode, Field::ZoneToken)
    }

    /// Token used for record changes under `mode`.
    ///
    /// `dns_token` only counts where `mode` accepts it; otherwise the write
    /// token is `api_token`.
    pub fn dns_write_token(&self, mode: SchemaMode) -> &str {
        self.role_token(mode, Field::DnsToken)
    }

    fn role_token(&self, mode: SchemaMode, field: Field) -> &str {
        if mode.accepts(field) && self.has(field) {
            self.get(field)
        } else {
            &self.api_token
        }
    }

    /// Render as Caddyfile directive text that parses back to an equal set.
    ///
    /// A set holding only `api_token` uses the inline form; anything else is
    /// written as a block.
    pub fn to_directive(&self, name: &str) -> String {
        if self.is_empty() {
            return name.to_string();
        }
        if !self.has(Field::ZoneToken) && !self.has(Field::DnsToken) {
            return format!("{name} {}", quote(&self.api_token));
        }

        let mut out = format!("{name} {{\n");
        for field in Field::ALL.into_iter().filter(|f| self.has(*f)) {
            out.push('\t');
            out.push_str(field.key());
            out.push(' ');
            out.push_str(&quote(self.get(field)));
            out.push('\n');
        }
        out.push('}');
        out
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("api_token", &mask_token(&self.api_token))
            .field("zone_token", &mask_token(&self.zone_token))
            .field("dns_token", &mask_token(&self.dns_token))
            .finish()
    }
}
