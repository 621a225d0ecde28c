use serde::Serialize;

use crate::cli::TenantArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct TenantResponse {
    organization: String,
    tenant_id: Option<String>,
}

pub async fn handle(args: &TenantArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let organization = args
        .organization
        .as_deref()
        .or_else(|| ctx.organization())
        .ok_or_else(|| {
            anyhow::anyhow!("tenant: no organization given; pass one or set ADO_ORGANIZATION")
        })?
        .to_string();

    let tenant_id = ctx.tenant_resolver()?.get_org_tenant(&organization).await;

    output(
        &TenantResponse {
            organization,
            tenant_id,
        },
        ctx.flags.format,
    )
}
