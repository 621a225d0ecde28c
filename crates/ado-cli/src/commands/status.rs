use serde::Serialize;

use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct StatusResponse {
    mode: &'static str,
    selector: String,
    tenant: Option<String>,
    organization: Option<String>,
    cache_path: Option<String>,
    authority_host: String,
    note: Option<String>,
}

/// Local settings only; no credential or network call is made.
pub fn handle(ctx: &AppContext) -> anyhow::Result<()> {
    let mode = ctx.mode();
    let selector = ctx.selector().to_string();
    let note = (selector != mode.as_str())
        .then(|| format!("unrecognized selector '{selector}', using interactive"));

    let status = StatusResponse {
        mode: mode.as_str(),
        selector,
        tenant: ctx.explicit_tenant().map(str::to_string),
        organization: ctx.organization().map(str::to_string),
        cache_path: ctx
            .cache_path()
            .ok()
            .map(|p| p.display().to_string()),
        authority_host: ctx.auth_options().authority_host,
        note,
    };

    output(&status, ctx.flags.format)
}
