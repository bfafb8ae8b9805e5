//! Provision an admin account directly in the database. Registration
//! through the API always yields the `user` role, so the first admin has
//! to be created out-of-band with this tool.

use std::io::{self, Write};

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use identity_api::auth::passwords::PasswordService;
use identity_api::models::{NewUser, Role};
use identity_api::store::{PgUserStore, StoreError, UserStore};

#[derive(Parser, Debug)]
#[command(name = "create_admin", about = "Create an admin account")]
struct Args {
    /// Email address for the account (case insensitive).
    #[arg(long)]
    email: String,

    /// Plaintext password to hash and store for this account.
    #[arg(long)]
    password: String,

    /// Unique username for the account.
    #[arg(long)]
    username: String,

    /// Display name; defaults to the username.
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let email = args.email.trim().to_lowercase();
    let username = args.username.trim().to_string();

    if !email.contains('@') {
        writeln!(io::stderr(), "error: email must contain '@'")?;
        std::process::exit(1);
    }
    if username.is_empty() {
        writeln!(io::stderr(), "error: username must not be empty")?;
        std::process::exit(1);
    }

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    let store = PgUserStore::new(pool);

    let password_service = PasswordService::new()
        .map_err(|err| io::Error::other(format!("argon2 init failed: {err}")))?;
    let password_hash = password_service
        .hash_password(&args.password)
        .map_err(|err| io::Error::other(format!("password hash failed: {err}")))?;

    let user = match store
        .create(NewUser {
            name: args.name.unwrap_or_else(|| username.clone()),
            username,
            email: email.clone(),
            role: Role::Admin,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Duplicate) => {
            writeln!(
                io::stderr(),
                "error: an account with email '{email}' or that username already exists."
            )?;
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    println!("Created admin '{}' with id {}", user.email, user.id);
    Ok(())
}
