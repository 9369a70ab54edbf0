//! Release title and body rendering.

use crate::manifest::PackageWorkItem;
use crate::source::RepoRef;
use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::Handlebars;
use serde::Serialize;

const BODY_TEMPLATE: &str = "\
Cached {{display_name}} artifacts for CI.

- Package: `{{name}}`
- Version: `{{version}}`
- Source: {{source_repo}}
- Cached at: {{timestamp}}

This release is managed automatically. Do not edit or delete its assets.
";

#[derive(Serialize)]
struct BodyContext<'a> {
    display_name: &'a str,
    name: &'a str,
    version: &'a str,
    source_repo: String,
    timestamp: String,
}

/// Release title, e.g. `Cypress 13.6.0 Cache`
pub fn release_title(item: &PackageWorkItem) -> String {
    format!("{} {} Cache", item.descriptor.display_name(), item.version)
}

/// Release body for a cache release
pub fn release_body(item: &PackageWorkItem, source_repo: &RepoRef, at: DateTime<Utc>) -> String {
    let context = BodyContext {
        display_name: item.descriptor.display_name(),
        name: &item.name,
        version: &item.version,
        source_repo: source_repo.to_string(),
        timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    match handlebars.render_template(BODY_TEMPLATE, &context) {
        Ok(body) => body,
        Err(e) => {
            log::warn!("Release body template failed to render: {e}");
            format!(
                "Cached {} {} from {} at {}",
                context.name, context.version, context.source_repo, context.timestamp
            )
        }
    }
}
