use clap::Args;
use serde_json::json;

use crate::auth::{issue_token, Claims, Role};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id) of the token")]
    pub uid: String,

    #[arg(long, help = "Email claim")]
    pub email: Option<String>,

    #[arg(long, help = "Display name claim")]
    pub name: Option<String>,

    #[arg(long, help = "Explicit role claim (student or instructor)")]
    pub role: Option<Role>,

    #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,

    #[arg(long, help = "Signing secret (defaults to JWT_SECRET)")]
    pub secret: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let secret = args.secret.clone().unwrap_or_else(|| security.jwt_secret.clone());
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);

    let claims = claims_for(&args, hours);
    let token = issue_token(&secret, &claims)?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            &output_format,
            "Token issued",
            Some(json!({ "token": token, "claims": claims })),
        )?,
    }
    Ok(())
}

fn claims_for(args: &TokenArgs, hours: u64) -> Claims {
    let mut claims = Claims::new(&args.uid, hours);
    if let Some(email) = &args.email {
        claims = claims.email(email);
    }
    if let Some(name) = &args.name {
        claims = claims.name(name);
    }
    if let Some(role) = args.role {
        claims = claims.role(role);
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdentityVerifier, JwtVerifier};

    #[tokio::test]
    async fn minted_tokens_verify() {
        let args = TokenArgs {
            uid: "inst-1".to_string(),
            email: Some("ada@example.com".to_string()),
            name: Some("Ada".to_string()),
            role: Some(Role::Instructor),
            hours: None,
            secret: None,
        };
        let claims = claims_for(&args, 1);
        let token = issue_token("cli-secret", &claims).unwrap();

        let verified = JwtVerifier::new("cli-secret").verify(&token).await.unwrap();
        assert_eq!(verified.uid, "inst-1");
        assert_eq!(verified.role, Some(Role::Instructor));
        assert_eq!(verified.display_name.as_deref(), Some("Ada"));
    }
}
