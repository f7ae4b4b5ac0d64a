use std::path::PathBuf;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Client for a running http-relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:80")]
    relay: String,

    /// Credential pair as `username:password`.
    #[arg(short, long, default_value = "user:password_notdefault")]
    auth: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the relay is up (no credentials needed)
    Ping,
    /// Fetch a URL through the relay and print the envelope
    Get {
        url: String,
        /// JSON object of extra upstream headers
        #[arg(long)]
        headers: Option<String>,
    },
    /// Fetch a URL verbatim and write the body to stdout
    Raw { url: String },
    /// Stream a byte range of a URL to stdout or a file
    Part {
        url: String,
        start: i64,
        end: i64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the upstream Content-Length of a URL
    Size { url: String },
    /// POST through the relay; args is a JSON object with `data` and `headers`
    Post {
        url: String,
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let (user, pass) = cli
        .auth
        .split_once(':')
        .ok_or("--auth must have the form username:password")?;
    let base = cli.relay.trim_end_matches('/');

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{base}/")).send().await?;
            print_json(res).await?;
        }
        Commands::Get { url, headers } => {
            let res = match headers {
                Some(headers) => client
                    .get(format!("{base}/get_response_with_headers"))
                    .query(&[("url", url.as_str()), ("headers", headers.as_str())]),
                None => client
                    .get(format!("{base}/get_response"))
                    .query(&[("url", url.as_str())]),
            }
            .basic_auth(user, Some(pass))
            .send()
            .await?;
            print_json(res).await?;
        }
        Commands::Raw { url } => {
            let res = client
                .get(format!("{base}/get_response_raw"))
                .query(&[("url", url.as_str())])
                .basic_auth(user, Some(pass))
                .send()
                .await?;
            if check_status(&res) {
                tokio::io::stdout().write_all(&res.bytes().await?).await?;
            }
        }
        Commands::Part {
            url,
            start,
            end,
            output,
        } => {
            let res = client
                .get(format!("{base}/filepart"))
                .query(&[("url", url)])
                .query(&[("start", start), ("end", end)])
                .basic_auth(user, Some(pass))
                .send()
                .await?;
            if check_status(&res) {
                let mut sink: Box<dyn tokio::io::AsyncWrite + Unpin> = match output {
                    Some(path) => Box::new(tokio::fs::File::create(path).await?),
                    None => Box::new(tokio::io::stdout()),
                };
                let mut body = res.bytes_stream();
                while let Some(chunk) = body.next().await {
                    sink.write_all(&chunk?).await?;
                }
                sink.flush().await?;
            }
        }
        Commands::Size { url } => {
            let res = client
                .get(format!("{base}/file_size"))
                .query(&[("url", url.as_str())])
                .basic_auth(user, Some(pass))
                .send()
                .await?;
            if check_status(&res) {
                println!("{}", res.text().await?);
            }
        }
        Commands::Post { url, args } => {
            let res = client
                .post(format!("{base}/post_response"))
                .form(&[("url", url.as_str()), ("args_json", args.as_str())])
                .basic_auth(user, Some(pass))
                .send()
                .await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

fn check_status(res: &reqwest::Response) -> bool {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
    }
    status.is_success()
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
    }
    Ok(())
}
