//! Module contract expected by the host, and the registry that maps module
//! IDs to constructors.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::caddyfile::Dispenser;
use crate::error::{ConfigError, Result};
use crate::replacer::{Expand, Replacer};
use crate::types::SchemaMode;

/// Namespace shared by all DNS provider modules.
pub const DNS_PROVIDERS_NAMESPACE: &str = "dns.providers";

/// Fully qualified module ID such as `dns.providers.cloudflare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(&'static str);

impl ModuleId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Everything before the last dot (`dns.providers`).
    pub fn namespace(&self) -> &'static str {
        self.0.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    /// Last label (`cloudflare`).
    pub fn name(&self) -> &'static str {
        self.0.rsplit_once('.').map_or(self.0, |(_, name)| name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Registration record: a stable ID and a constructor for an unconfigured
/// instance.
#[derive(Debug, Clone, Copy)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub new: fn(&Context) -> Box<dyn Module>,
}

/// Host state handed to modules when they are built and provisioned.
pub struct Context {
    replacer: Box<dyn Expand>,
    schema: SchemaMode,
}

impl Context {
    /// Context with the default ([`SchemaMode::Strict`]) schema.
    pub fn new(replacer: impl Expand + 'static) -> Self {
        Self {
            replacer: Box::new(replacer),
            schema: SchemaMode::default(),
        }
    }

    /// Select the credential schema for modules built from this context.
    #[must_use]
    pub fn with_schema(mut self, schema: SchemaMode) -> Self {
        self.schema = schema;
        self
    }

    /// Substitution function used to expand placeholders.
    pub fn replacer(&self) -> &dyn Expand {
        self.replacer.as_ref()
    }

    pub fn schema(&self) -> SchemaMode {
        self.schema
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Replacer::new())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Modules that configure themselves from Caddyfile tokens.
pub trait CaddyfileUnmarshaler {
    /// Read one directive segment. The dispenser is positioned before the
    /// directive name.
    fn unmarshal_caddyfile(&mut self, d: &mut Dispenser) -> Result<()>;
}

/// Modules that finish setting up after configuration is loaded.
pub trait Provisioner {
    fn provision(&mut self, ctx: &Context) -> Result<()>;
}

/// A pluggable host module.
pub trait Module: CaddyfileUnmarshaler + Provisioner + fmt::Debug + Send + Sync {
    /// Registration record for this module type.
    fn module_info() -> ModuleInfo
    where
        Self: Sized;

    fn id(&self) -> ModuleId;

    /// Configure from the module's JSON form.
    fn load_json(&mut self, raw: &serde_json::Value) -> Result<()>;

    /// Access the concrete type, e.g. to hand it to the DNS client.
    fn as_any(&self) -> &dyn Any;
}

/// Table of known modules, owned by the host.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<&'static str, ModuleInfo>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module. Registering the same ID twice is an error.
    pub fn register(&mut self, info: ModuleInfo) -> Result<()> {
        let id = info.id.as_str();
        if self.modules.contains_key(id) {
            return Err(ConfigError::DuplicateModule(id.to_string()));
        }
        log::debug!("Registered module {id}");
        self.modules.insert(id, info);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ModuleInfo> {
        self.modules.get(id)
    }

    /// Registered IDs in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.keys().copied()
    }

    /// Look up a DNS provider by its directive name (`cloudflare`).
    pub fn dns_provider(&self, name: &str) -> Option<&ModuleInfo> {
        self.get(&format!("{DNS_PROVIDERS_NAMESPACE}.{name}"))
    }

    /// Fresh, unconfigured instance of the module `id`, built for `ctx`.
    pub fn instantiate(&self, id: &str, ctx: &Context) -> Result<Box<dyn Module>> {
        self.get(id)
            .map(|info| (info.new)(ctx))
            .ok_or_else(|| ConfigError::UnknownModule(id.to_string()))
    }

    /// Build, configure from JSON and provision the module `id`.
    pub fn load_json(
        &self,
        id: &str,
        raw: &serde_json::Value,
        ctx: &Context,
    ) -> Result<Box<dyn Module>> {
        let mut module = self.instantiate(id, ctx)?;
        module.load_json(raw)?;
        module.provision(ctx)?;
        Ok(module)
    }

    /// Build a DNS provider from a directive segment such as
    /// `cloudflare {env.CF_API_TOKEN}` and provision it.
    ///
    /// The directive name selects the module; the whole segment, name
    /// included, is then handed to the module.
    pub fn load_caddyfile(&self, d: &mut Dispenser, ctx: &Context) -> Result<Box<dyn Module>> {
        if !d.next_token() {
            return Err(d.err("expected a DNS provider name").into());
        }
        let name = d.val().to_string();
        let id = format!("{DNS_PROVIDERS_NAMESPACE}.{name}");
        let mut module = self.instantiate(&id, ctx)?;

        d.reset();
        module.unmarshal_caddyfile(d)?;
        module.provision(ctx)?;
        Ok(module)
    }
}
