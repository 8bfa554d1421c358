use anyhow::Result;
use clap::{Parser, Subcommand};
use storage::Storage;
use tracing::info;

const SAMPLE_CONTACTS: [(&str, &str); 4] = [
    ("Arto Hellas", "040-123456"),
    ("Ada Lovelace", "39-44-5323523"),
    ("Dan Abramov", "12-43-234345"),
    ("Mary Poppendieck", "39-23-6423122"),
];

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/phonebook.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the sample contacts, skipping names already stored.
    Seed,
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            let inserted = seed(&storage).await?;
            println!("seeded {inserted} contacts");
        }
        Command::List => {
            for contact in storage.list_contacts().await? {
                println!(
                    "{}\t{}\t{}",
                    contact.contact_id, contact.name, contact.number
                );
            }
        }
    }

    Ok(())
}

async fn seed(storage: &Storage) -> Result<usize> {
    let mut inserted = 0;
    for (name, number) in SAMPLE_CONTACTS {
        if storage.find_contact_by_name(name).await?.is_some() {
            info!(name, "seed: contact already present");
            continue;
        }
        if storage.insert_contact(name, number).await?.is_some() {
            inserted += 1;
        }
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        assert_eq!(seed(&storage).await.expect("seed"), 4);
        assert_eq!(seed(&storage).await.expect("reseed"), 0);
        assert_eq!(storage.count_contacts().await.expect("count"), 4);
    }
}
