//! Ordered, content-type–dispatched text substitution rules.
//!
//! # Responsibilities
//! - Bucket responses by content type (HTML / script-or-style / JSON-manifest)
//! - Rewrite absolute, scheme-relative and root-relative URL references so
//!   mirrored content resolves against the proxy origin plus prefix
//!
//! # Design Decisions
//! - Plain substring scanning, no regex: every pattern here is a fixed shape
//!   emitted by the upstream's bundler, and O(n) scans keep the rules total
//! - Rules run in a fixed order; later rules skip values that already carry
//!   the prefix, so a single pass never double-prefixes

use crate::rewrite::context::RewriteContext;

/// A single pure rewriting rule.
pub type RewriteRule = fn(&str, &RewriteContext) -> String;

/// Well-known asset directories referenced at runtime by upstream bundles.
const ASSET_DIRS: &[&str] = &["/assets/", "/images/"];

/// Content-type buckets with distinct rule chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Html,
    ScriptOrStyle,
    JsonManifest,
    /// Binary or unknown: body is streamed through untouched.
    Other,
}

impl ContentClass {
    /// Classify a `content-type` header value.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let ct = content_type.unwrap_or("").to_ascii_lowercase();
        if ct.contains("text/html") {
            ContentClass::Html
        } else if ct.contains("javascript") || ct.contains("ecmascript") || ct.contains("text/css")
        {
            ContentClass::ScriptOrStyle
        } else if ct.contains("json") || ct.contains("manifest") {
            ContentClass::JsonManifest
        } else {
            ContentClass::Other
        }
    }

    /// Whether bodies of this class are buffered and rewritten.
    pub fn is_rewritable(self) -> bool {
        !matches!(self, ContentClass::Other)
    }
}

/// The ordered rule chains, built once at startup and shared read-only.
pub struct RewriteRuleSet {
    html: Vec<RewriteRule>,
    script_or_style: Vec<RewriteRule>,
    json_manifest: Vec<RewriteRule>,
}

impl RewriteRuleSet {
    pub fn new() -> Self {
        Self {
            html: vec![
                rewrite_absolute_origin,
                rewrite_scheme_relative,
                rewrite_html_attributes,
                rewrite_script_literals,
                rewrite_service_worker_registration,
            ],
            script_or_style: vec![
                rewrite_absolute_origin,
                rewrite_scheme_relative,
                rewrite_asset_directories,
                rewrite_bundler_root_helper,
                rewrite_router_base,
            ],
            json_manifest: vec![
                rewrite_absolute_origin,
                rewrite_scheme_relative,
                rewrite_manifest_entry_points,
            ],
        }
    }

    /// Apply the rule chain for `class` to a whole buffered body.
    pub fn apply(&self, class: ContentClass, text: &str, ctx: &RewriteContext) -> String {
        let rules = match class {
            ContentClass::Html => &self.html,
            ContentClass::ScriptOrStyle => &self.script_or_style,
            ContentClass::JsonManifest => &self.json_manifest,
            ContentClass::Other => return text.to_string(),
        };
        let mut out = text.to_string();
        for rule in rules {
            out = rule(&out, ctx);
        }
        out
    }
}

impl Default for RewriteRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Rule 1: every literal `scheme://upstreamHost` becomes `proxyOrigin + prefix`.
fn rewrite_absolute_origin(text: &str, ctx: &RewriteContext) -> String {
    let target = format!("{}{}", ctx.proxy_origin, ctx.path_prefix);
    text.replace(&format!("https://{}", ctx.upstream_host), &target)
        .replace(&format!("http://{}", ctx.upstream_host), &target)
}

/// Rule 2: scheme-relative `//upstreamHost` becomes `//proxyHost + prefix`.
fn rewrite_scheme_relative(text: &str, ctx: &RewriteContext) -> String {
    text.replace(
        &format!("//{}", ctx.upstream_host),
        &format!("//{}{}", ctx.proxy_host, ctx.path_prefix),
    )
}

/// Rule 3 (HTML): root-relative `src`/`href`/`action` attribute values.
fn rewrite_html_attributes(text: &str, ctx: &RewriteContext) -> String {
    let mut out = text.to_string();
    for lead in [
        "src=\"", "href=\"", "action=\"", "src='", "href='", "action='",
    ] {
        out = prefix_root_paths(&out, lead, ctx);
    }
    out
}

/// Rule 4 (HTML): root-relative string literals inside inline scripts.
///
/// The mirrored page's bundle constructs URLs dynamically, so assignments and
/// fetch() calls need the prefix as much as static attributes do.
fn rewrite_script_literals(text: &str, ctx: &RewriteContext) -> String {
    let mut out = text.to_string();
    for lead in [
        "= \"", "= '", "= `", "fetch(\"", "fetch('", "fetch(`",
    ] {
        out = prefix_root_paths(&out, lead, ctx);
    }
    out
}

/// Rule 5 (HTML): keep the mirrored page's service worker installing, under
/// the prefixed path.
fn rewrite_service_worker_registration(text: &str, ctx: &RewriteContext) -> String {
    let mut out = text.to_string();
    for lead in [
        "serviceWorker.register(\"",
        "serviceWorker.register('",
        "serviceWorker.register(`",
    ] {
        out = prefix_root_paths(&out, lead, ctx);
    }
    out
}

/// Rule 6 (script/style): well-known asset directories in quoted strings and
/// CSS url() references.
fn rewrite_asset_directories(text: &str, ctx: &RewriteContext) -> String {
    let prefix = &ctx.path_prefix;
    let mut out = text.to_string();
    for dir in ASSET_DIRS {
        out = out.replace(
            &format!("\"{}", dir),
            &format!("\"{}{}", prefix, dir),
        );
        out = out.replace(&format!("'{}", dir), &format!("'{}{}", prefix, dir));
        out = out.replace(
            &format!("url({}", dir),
            &format!("url({}{}", prefix, dir),
        );
    }
    out
}

/// Rule 6 (script/style): bundler root-path helper, `return"/"+chunk`.
fn rewrite_bundler_root_helper(text: &str, ctx: &RewriteContext) -> String {
    text.replace(
        "return\"/\"+",
        &format!("return\"{}/\"+", ctx.path_prefix),
    )
}

/// Rule 6 (script/style): router base configuration, `base:"/"`.
fn rewrite_router_base(text: &str, ctx: &RewriteContext) -> String {
    text.replace("base:\"/\"", &format!("base:\"{}/\"", ctx.path_prefix))
}

/// Rule 7 (JSON/manifest): installability metadata must match the mirrored
/// path, so `scope` and `start_url` carry the prefix.
fn rewrite_manifest_entry_points(text: &str, ctx: &RewriteContext) -> String {
    let mut out = text.to_string();
    for field in ["\"scope\"", "\"start_url\""] {
        out = prefix_json_field(&out, field, &ctx.path_prefix);
    }
    out
}

/// Insert the prefix after `lead` wherever a root-relative path follows.
///
/// Skips scheme-relative values (`//…`) and values already starting with the
/// prefix, which keeps one pass idempotent.
fn prefix_root_paths(text: &str, lead: &str, ctx: &RewriteContext) -> String {
    let prefix = &ctx.path_prefix;
    let mut out = String::with_capacity(text.len() + 64);
    let mut rest = text;
    while let Some(pos) = rest.find(lead) {
        let split = pos + lead.len();
        out.push_str(&rest[..split]);
        rest = &rest[split..];
        if rest.starts_with('/') && !rest.starts_with("//") && !rest.starts_with(prefix.as_str()) {
            out.push_str(prefix);
        }
    }
    out.push_str(rest);
    out
}

/// Rewrite a root-relative JSON string field value in place.
///
/// Scans for `"field" : "<value>"` tolerating whitespace; anything else is
/// left untouched (rules are total, malformed JSON passes through).
fn prefix_json_field(text: &str, field: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    while let Some(pos) = rest.find(field) {
        let split = pos + field.len();
        out.push_str(&rest[..split]);
        rest = &rest[split..];

        let mut opening = None;
        let mut seen_colon = false;
        for (i, c) in rest.char_indices() {
            if c.is_whitespace() {
                continue;
            }
            if c == ':' && !seen_colon {
                seen_colon = true;
                continue;
            }
            if c == '"' && seen_colon {
                opening = Some(i);
            }
            break;
        }

        if let Some(quote) = opening {
            let value = &rest[quote + 1..];
            if value.starts_with('/') && !value.starts_with("//") && !value.starts_with(prefix) {
                out.push_str(&rest[..quote + 1]);
                out.push_str(prefix);
                rest = value;
            }
        }
    }
    out.push_str(rest);
    out
}
