use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id claim")]
    pub user_id: Option<i64>,
    #[arg(long, help = "Organisation id claim")]
    pub org_id: Option<i64>,
    #[arg(long, default_value = "admin", help = "User type: admin, app_admin or any member role")]
    pub user_type: String,
    #[arg(long, help = "Role id claim")]
    pub role_id: Option<i64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let claims = Claims::new(args.user_id, args.org_id, args.user_type, args.role_id);
    let token = generate_jwt(&claims)?;

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "token": token, "claims": claims, "expires_at": claims.exp }))?
            );
        }
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
