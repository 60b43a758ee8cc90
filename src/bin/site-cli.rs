use clap::{Parser, Subcommand};
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Management CLI for the portfolio site", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Admin password used to open a session.
    #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, site state, sessions and rate limiter load
    Status,
    /// Show the current site mode
    SiteMode,
    /// Put the site under construction
    Enable {
        /// Page public visitors are redirected to
        #[arg(long)]
        redirect_path: Option<String>,
    },
    /// Take the site out of construction mode
    Disable,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let cookie = login(&client, &cli.url, &cli.password).await?;

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/api/admin/status", cli.url))
                .header(COOKIE, cookie)
                .send()
                .await?
        }
        Commands::SiteMode => {
            client
                .get(format!("{}/api/admin/site-mode", cli.url))
                .header(COOKIE, cookie)
                .send()
                .await?
        }
        Commands::Enable { redirect_path } => {
            let mut body = json!({ "enabled": true });
            if let Some(path) = redirect_path {
                body["redirect_path"] = Value::String(path);
            }
            client
                .patch(format!("{}/api/admin/site-mode", cli.url))
                .header(COOKIE, cookie)
                .json(&body)
                .send()
                .await?
        }
        Commands::Disable => {
            client
                .patch(format!("{}/api/admin/site-mode", cli.url))
                .header(COOKIE, cookie)
                .json(&json!({ "enabled": false }))
                .send()
                .await?
        }
    };
    print_response(res).await
}

/// Log in and return the `name=value` pair to send back as `Cookie`.
async fn login(
    client: &reqwest::Client,
    url: &str,
    password: &str,
) -> Result<HeaderValue, Box<dyn std::error::Error>> {
    let res = client
        .post(format!("{url}/api/auth/login"))
        .json(&json!({ "password": password }))
        .send()
        .await?;

    if !res.status().is_success() {
        let status = res.status();
        let body: Value = res.json().await.unwrap_or(Value::Null);
        return Err(format!("login failed ({status}): {}", body["message"]).into());
    }

    let set_cookie = res
        .headers()
        .get(SET_COOKIE)
        .ok_or("login response carried no session cookie")?
        .to_str()?;
    let pair = set_cookie.split(';').next().unwrap_or_default().trim();
    Ok(HeaderValue::from_str(pair)?)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
