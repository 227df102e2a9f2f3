use clap::Parser;
use debtdesk::db::{self, UserStore};

/// Provision a dashboard login account directly in the database, bypassing
/// the API. Useful for the very first account on a fresh install.
#[derive(Debug, Parser)]
#[command(name = "add_user")]
#[command(about = "Create a debtdesk login account")]
struct Args {
    /// Login name
    #[arg(long)]
    name: String,

    /// Phone number (acts as the password)
    #[arg(long)]
    phone_number: String,

    /// Path to the SQLite database
    #[arg(long, default_value = "./debtdesk.sqlite")]
    database: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let pool = db::connect(&args.database).await?;
    let users = UserStore::new(pool);

    let hash = debtdesk::auth::hash_phone(&args.phone_number)?;
    let created = users.create(&args.name, &hash).await?;

    println!("Created user '{}' (id {})", created.name, created.id);
    Ok(())
}
