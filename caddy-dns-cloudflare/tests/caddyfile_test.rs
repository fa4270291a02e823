//! Caddyfile parsing tests for the `cloudflare` directive
//!
//! ```bash
//! cargo test -p caddy-dns-cloudflare --test caddyfile_test
//! ```

mod common;

use caddy_dns_cloudflare::{
    CloudflareProvider, ConfigError, CredentialSet, SchemaMode, parse_directive,
};
use common::{GOOD_TOKEN, parse};

const ALL_MODES: [SchemaMode; 3] = [SchemaMode::Legacy, SchemaMode::Split, SchemaMode::Strict];

fn message(err: &ConfigError) -> String {
    err.to_string()
}

// ============ Accepted forms ============

#[test]
fn test_single_arg() {
    for mode in ALL_MODES {
        let p = require_ok!(parse("cloudflare abc123", mode), "mode {mode:?}");
        assert_eq!(p.credentials(), &CredentialSet::single("abc123"));
    }
}

#[test]
fn test_api_token_in_block() {
    for mode in ALL_MODES {
        let p = require_ok!(
            parse("cloudflare {\n\tapi_token abc123\n}", mode),
            "mode {mode:?}"
        );
        assert_eq!(p.credentials(), &CredentialSet::single("abc123"));
    }
}

#[test]
fn test_zone_and_dns_tokens() {
    let input = "
    cloudflare {
        zone_token foo
        dns_token bar
    }";
    let p = require_ok!(parse(input, SchemaMode::Split));
    assert_eq!(p.credentials().zone_token, "foo");
    assert_eq!(p.credentials().dns_token, "bar");
    assert!(p.credentials().api_token.is_empty());
}

#[test]
fn test_zone_and_api_tokens_legacy_slot() {
    let input = "
    cloudflare {
        zone_token foo
        api_token bar
    }";
    for mode in [SchemaMode::Legacy, SchemaMode::Strict] {
        let p = require_ok!(parse(input, mode), "mode {mode:?}");
        assert_eq!(p.credentials().zone_token, "foo");
        assert_eq!(p.credentials().api_token, "bar");
        assert!(p.credentials().dns_token.is_empty());
        assert_eq!(p.dns_write_token(), "bar");
        assert_eq!(p.zone_read_token(), "foo");
    }
}

#[test]
fn test_quoted_and_placeholder_values_kept_verbatim() {
    let p = require_ok!(parse(
        "cloudflare {\n\tapi_token \"{env.CF_API_TOKEN}\"\n}",
        SchemaMode::Strict
    ));
    assert_eq!(p.credentials().api_token, "{env.CF_API_TOKEN}");

    let p = require_ok!(parse("cloudflare {env.CF_API_TOKEN}", SchemaMode::Strict));
    assert_eq!(p.credentials().api_token, "{env.CF_API_TOKEN}");
}

#[test]
fn test_comments_ignored() {
    let input = "cloudflare { # provider\n\tapi_token abc # the token\n}";
    let p = require_ok!(parse(input, SchemaMode::Strict));
    assert_eq!(p.credentials(), &CredentialSet::single("abc"));
}

#[test]
fn test_all_three_tokens_split_pair_wins() {
    let input = "cloudflare {\n\tapi_token a\n\tzone_token z\n\tdns_token d\n}";
    let p = require_ok!(parse(input, SchemaMode::Split));
    assert_eq!(p.zone_read_token(), "z");
    assert_eq!(p.dns_write_token(), "d");
    assert_eq!(p.credentials().api_token, "a");
}

// ============ Rejected forms ============

#[test]
fn test_empty_config() {
    for mode in ALL_MODES {
        let err = require_err!(parse("cloudflare", mode), "mode {mode:?}");
        assert!(message(&err).contains("missing API token(s)"), "{err}");
    }
}

#[test]
fn test_empty_block() {
    let err = require_err!(parse("cloudflare {\n}", SchemaMode::Split));
    assert!(message(&err).contains("missing API token(s)"));
}

#[test]
fn test_partial_config_legacy() {
    let input = "
    cloudflare {
        zone_token bar
    }";
    for mode in [SchemaMode::Legacy, SchemaMode::Strict] {
        let err = require_err!(parse(input, mode), "mode {mode:?}");
        assert!(
            message(&err).contains("zone_token provided but no api_token found"),
            "{err}"
        );
    }
}

#[test]
fn test_partial_config_split() {
    let err = require_err!(parse(
        "cloudflare {\n\tzone_token bar\n}",
        SchemaMode::Split
    ));
    assert!(message(&err).contains("zone_token provided but no dns_token found"));

    let err = require_err!(parse(
        "cloudflare {\n\tdns_token bar\n}",
        SchemaMode::Split
    ));
    assert!(message(&err).contains("dns_token provided but no zone_token found"));
}

#[test]
fn test_too_many_args() {
    for mode in ALL_MODES {
        let err = require_err!(parse("cloudflare foo with more", mode), "mode {mode:?}");
        assert_eq!(
            message(&err),
            "Testfile:1 - Error during parsing: unexpected argument 'with'"
        );
    }
}

#[test]
fn test_missing_subdirective_value() {
    let err = require_err!(parse(
        "cloudflare {\n\tapi_token\n}",
        SchemaMode::Strict
    ));
    assert_eq!(
        message(&err),
        "Testfile:2 - Error during parsing: wrong argument count or unexpected line ending after 'api_token'"
    );
}

#[test]
fn test_extra_subdirective_value() {
    let err = require_err!(parse(
        "cloudflare {\n\tapi_token abc def\n}",
        SchemaMode::Strict
    ));
    assert!(message(&err).ends_with("unexpected argument 'def'"));
}

#[test]
fn test_unknown_subdirective() {
    let err = require_err!(parse(
        "cloudflare {\n\tapi_key abc\n}",
        SchemaMode::Split
    ));
    assert_eq!(
        message(&err),
        "Testfile:2 - Error during parsing: unrecognized subdirective 'api_key'"
    );
}

#[test]
fn test_dns_token_only_in_split_schema() {
    let input = "cloudflare {\n\tzone_token z\n\tdns_token d\n}";
    for mode in [SchemaMode::Legacy, SchemaMode::Strict] {
        let err = require_err!(parse(input, mode), "mode {mode:?}");
        assert!(message(&err).contains("unrecognized subdirective 'dns_token'"));
    }
}

#[test]
fn test_duplicate_inline_and_block() {
    let err = require_err!(parse(
        "cloudflare abc {\n\tapi_token def\n}",
        SchemaMode::Strict
    ));
    assert_eq!(
        message(&err),
        "Testfile:2 - Error during parsing: api_token already specified"
    );
}

#[test]
fn test_duplicate_in_block() {
    let err = require_err!(parse(
        "cloudflare {\n\tzone_token a\n\tzone_token b\n\tdns_token c\n}",
        SchemaMode::Split
    ));
    assert_eq!(
        message(&err),
        "Testfile:3 - Error during parsing: zone_token already specified"
    );
}

#[test]
fn test_unclosed_block() {
    let err = require_err!(parse("cloudflare {\n\tapi_token abc", SchemaMode::Strict));
    assert!(message(&err).contains("expecting '}'"));
}

#[test]
fn test_one_line_block_rejected() {
    let err = require_err!(parse("cloudflare { api_token abc }", SchemaMode::Strict));
    assert!(message(&err).ends_with("unexpected argument '}'"));
}

#[test]
fn test_trailing_token_after_block() {
    let err = require_err!(parse(
        "cloudflare {\n\tapi_token abc\n} extra",
        SchemaMode::Strict
    ));
    assert!(message(&err).ends_with("unexpected argument 'extra'"));
}

#[test]
fn test_unterminated_quote() {
    let err = require_err!(parse("cloudflare \"abc", SchemaMode::Strict));
    assert!(matches!(err, ConfigError::Parse(_)));
}

// ============ Round trip ============

#[test]
fn test_round_trip_through_directive_text() {
    let cases = [
        (SchemaMode::Strict, CredentialSet::single(GOOD_TOKEN)),
        (SchemaMode::Split, CredentialSet::split("zone tok", "dns\"tok")),
        (SchemaMode::Split, CredentialSet::single("{env.CF_API_TOKEN}")),
        (SchemaMode::Legacy, {
            let mut creds = CredentialSet::single("#dns");
            creds.zone_token = "{".to_string();
            creds
        }),
    ];

    for (mode, creds) in cases {
        let text = CloudflareProvider::with_credentials(creds.clone(), mode).to_caddyfile();
        let reparsed = require_ok!(parse_directive(&text, mode), "re-parsing {text}");
        assert_eq!(reparsed.credentials(), &creds, "text: {text}");
    }
}

#[test]
fn test_round_trip_from_parsed_input() {
    let input = "cloudflare {\n  zone_token   \"a b\"\n  dns_token `c`\n}";
    let first = require_ok!(parse(input, SchemaMode::Split));
    let second = require_ok!(parse(&first.to_caddyfile(), SchemaMode::Split));
    assert_eq!(first, second);
}

#[test]
fn test_backslashes_in_quoted_values_kept() {
    let p = require_ok!(parse(
        "cloudflare {\n\tzone_token \"a\\\\b\"\n\tdns_token \"c\\\"d\"\n}",
        SchemaMode::Split
    ));
    assert_eq!(p.credentials().zone_token, r"a\\b");
    assert_eq!(p.credentials().dns_token, "c\"d");

    let reparsed = require_ok!(parse(&p.to_caddyfile(), SchemaMode::Split));
    assert_eq!(reparsed.credentials(), p.credentials());
}
