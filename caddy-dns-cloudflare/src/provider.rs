//! Cloudflare DNS provider module

use std::any::Any;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::caddyfile::Dispenser;
use crate::error::{ConfigError, Result};
use crate::module::{CaddyfileUnmarshaler, Context, Module, ModuleId, ModuleInfo, Provisioner};
use crate::types::{CredentialSet, Field, SchemaMode, TokenScheme};
use crate::utils::log_sanitizer::mask_token;
use crate::validation::validate_api_token;

/// Directive name, and the last label of the module ID.
pub const DIRECTIVE: &str = "cloudflare";

/// Module ID looked up by the host.
pub const MODULE_ID: ModuleId = ModuleId::new("dns.providers.cloudflare");

/// Cloudflare DNS provider
///
/// Holds the credentials for the wrapped Cloudflare client. Three Caddyfile
/// syntaxes are accepted:
///
/// ```text
/// cloudflare <api_token>
///
/// cloudflare {
///     api_token <api_token>
/// }
///
/// cloudflare {
///     zone_token <zone_token>    # zone read, all zones
///     dns_token  <dns_token>     # DNS write, applicable zones (Split schema)
/// }
/// ```
///
/// In the `Legacy` and `Strict` schemas the DNS write token of a split setup
/// is written as `api_token`. Placeholders are expanded in
/// [`provision`](Provisioner::provision), not while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudflareProvider {
    #[serde(flatten)]
    credentials: CredentialSet,
    #[serde(skip)]
    mode: SchemaMode,
    #[serde(skip)]
    scheme: Option<TokenScheme>,
}

impl CloudflareProvider {
    pub fn new(mode: SchemaMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_credentials(credentials: CredentialSet, mode: SchemaMode) -> Self {
        Self {
            credentials,
            mode,
            scheme: None,
        }
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn mode(&self) -> SchemaMode {
        self.mode
    }

    /// Token layout, known once provisioning succeeded.
    pub fn scheme(&self) -> Option<TokenScheme> {
        self.scheme
    }

    pub fn zone_read_token(&self) -> &str {
        self.credentials.zone_read_token(self.mode)
    }

    pub fn dns_write_token(&self) -> &str {
        self.credentials.dns_write_token(self.mode)
    }

    /// Caddyfile text that parses back to the same credentials.
    pub fn to_caddyfile(&self) -> String {
        self.credentials.to_directive(DIRECTIVE)
    }

    fn assign(&mut self, d: &Dispenser, field: Field, assigned: &mut Vec<Field>) -> Result<()> {
        if assigned.contains(&field) {
            return Err(d.err(format!("{field} already specified")).into());
        }
        assigned.push(field);
        self.credentials.set(field, d.val());
        Ok(())
    }
}

impl CaddyfileUnmarshaler for CloudflareProvider {
    fn unmarshal_caddyfile(&mut self, d: &mut Dispenser) -> Result<()> {
        self.credentials = CredentialSet::default();
        self.scheme = None;
        let mut assigned = Vec::with_capacity(Field::ALL.len());

        d.next_token(); // consume directive name

        if d.next_arg() {
            self.assign(d, Field::ApiToken, &mut assigned)?;
        }

        let nesting = d.nesting();
        while d.next_block(nesting) {
            let key = d.val().to_string();
            let Some(field) = self.mode.field_for_key(&key) else {
                return Err(d.err(format!("unrecognized subdirective '{key}'")).into());
            };
            if !d.next_arg() {
                return Err(d.arg_err().into());
            }
            self.assign(d, field, &mut assigned)?;
            if d.next_arg() {
                return Err(d.err(format!("unexpected argument '{}'", d.val())).into());
            }
        }
        if d.nesting() > nesting {
            return Err(d.err("unexpected end of input, expecting '}'").into());
        }

        if d.next_arg() {
            return Err(d.err(format!("unexpected argument '{}'", d.val())).into());
        }

        let scheme = self
            .credentials
            .check(self.mode)
            .map_err(|e| d.err(e.to_string()))?;
        debug!(
            "Parsed {DIRECTIVE} block at {}:{} ({:?} schema, {scheme:?} tokens)",
            d.file(),
            d.line(),
            self.mode
        );
        Ok(())
    }
}

impl Provisioner for CloudflareProvider {
    /// Expand placeholders in the token(s), then validate the result.
    fn provision(&mut self, ctx: &Context) -> Result<()> {
        self.scheme = None;
        self.credentials.expand(ctx.replacer());

        let scheme = self.credentials.check(self.mode)?;
        if self.mode == SchemaMode::Split && self.credentials.has_shadowed_api_token() {
            warn!("{MODULE_ID}: zone_token and dns_token are both set; api_token is ignored");
        }
        if self.mode.checks_token_format() {
            validate_api_token(&self.credentials.api_token)?;
        }

        self.scheme = Some(scheme);
        debug!(
            "Provisioned {MODULE_ID}: zone read token {}, DNS write token {}",
            mask_token(self.zone_read_token()),
            mask_token(self.dns_write_token())
        );
        Ok(())
    }
}

fn new_module(ctx: &Context) -> Box<dyn Module> {
    Box::new(CloudflareProvider::new(ctx.schema()))
}

impl Module for CloudflareProvider {
    fn module_info() -> ModuleInfo {
        ModuleInfo {
            id: MODULE_ID,
            new: new_module,
        }
    }

    fn id(&self) -> ModuleId {
        MODULE_ID
    }

    /// Keys the schema does not accept are rejected here, as the Caddyfile
    /// parser rejects unknown subdirectives.
    fn load_json(&mut self, raw: &serde_json::Value) -> Result<()> {
        let invalid = |detail: String| ConfigError::InvalidJson {
            module: MODULE_ID.to_string(),
            detail,
        };
        let credentials = CredentialSet::deserialize(raw).map_err(|e| invalid(e.to_string()))?;
        if let Some(field) = credentials.unsupported_field(self.mode) {
            return Err(invalid(format!(
                "'{field}' is not accepted by the {:?} schema",
                self.mode
            )));
        }
        self.credentials = credentials;
        self.scheme = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
