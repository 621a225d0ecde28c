use ado_auth::AuthKind;
use serde::Serialize;

use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct HeaderResponse {
    kind: AuthKind,
    header: String,
}

pub async fn handle(ctx: &AppContext) -> anyhow::Result<()> {
    let authenticator = ctx.authenticator().await?;
    let header = authenticator.authorization_header().await?;

    output(
        &HeaderResponse {
            kind: authenticator.kind(),
            header,
        },
        ctx.flags.format,
    )
}
