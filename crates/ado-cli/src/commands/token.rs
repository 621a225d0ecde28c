use ado_auth::AuthKind;
use serde::Serialize;

use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct TokenResponse {
    kind: AuthKind,
    token: String,
}

pub async fn handle(ctx: &AppContext) -> anyhow::Result<()> {
    let authenticator = ctx.authenticator().await?;
    let token = authenticator.get_token().await?;

    output(
        &TokenResponse {
            kind: authenticator.kind(),
            token,
        },
        ctx.flags.format,
    )
}
