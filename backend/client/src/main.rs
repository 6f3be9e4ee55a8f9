use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client::{Api, DEFAULT_BASE_URL, GENERIC_FAILURE, save_token};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe symptoms and get an explanation plus a doctor
    Chat { symptom: String },

    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Where the session token is kept
        #[arg(long, default_value = "token.txt")]
        token_file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let api = Api::new(&args.base_url);

    let outcome = match args.command {
        Command::Chat { symptom } => api.chat(&symptom).await.map(|response| println!("{response}")),
        Command::Signup {
            name,
            email,
            password,
        } => api
            .signup(&name, &email, &password)
            .await
            .map(|message| println!("{message}")),
        Command::Login {
            email,
            password,
            token_file,
        } => match api.login(&email, &password).await {
            Ok(reply) => save_token(&token_file, &reply.token).map(|_| {
                println!("Login Successful! Welcome, {}.", reply.user.name);
                println!("Token saved to {}", token_file.display());
            }),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = outcome {
        tracing::error!("{e:?}");

        // transport failures read the same as server errors
        if e.is::<reqwest::Error>() {
            eprintln!("{GENERIC_FAILURE}");
        } else {
            eprintln!("{e}");
        }
        std::process::exit(1);
    }
}
