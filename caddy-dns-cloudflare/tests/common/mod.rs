//! Shared test helpers

#![allow(dead_code)]

use caddy_dns_cloudflare::{
    CaddyfileUnmarshaler, CloudflareProvider, ConfigError, Dispenser, SchemaMode,
};

/// A token with the expected Cloudflare shape (40 characters).
pub const GOOD_TOKEN: &str = "Sqqty8-Vn0iOP29rvqYgwKz_xqGQ4y5JhuVL1-qU";

/// Assert a `Result` is `Ok` and unwrap it (returning from the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Assert a `Result` is `Err` and unwrap the error.
#[macro_export]
macro_rules! require_err {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_err(), "expected Err(..), got {res:?}");
        let Err(err) = res else {
            return;
        };
        err
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_err(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Err(err) = res else {
            return;
        };
        err
    }};
}

/// Parse `input` as a test Caddyfile with the given schema.
pub fn parse(input: &str, mode: SchemaMode) -> Result<CloudflareProvider, ConfigError> {
    let mut d = Dispenser::for_test(input)?;
    let mut provider = CloudflareProvider::new(mode);
    provider.unmarshal_caddyfile(&mut d)?;
    Ok(provider)
}
