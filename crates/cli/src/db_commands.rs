use std::path::Path;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum DbAction {
    /// Delete the database file (and its WAL/SHM companions).
    Reset,
    /// Run all pending database migrations.
    Migrate,
}

pub async fn handle_db(action: DbAction, db_path: &Path) -> anyhow::Result<()> {
    match action {
        DbAction::Reset => reset_database(db_path),
        DbAction::Migrate => run_migrations(db_path).await,
    }
}

fn reset_database(db_path: &Path) -> anyhow::Result<()> {
    let mut deleted = false;
    for suffix in ["", "-wal", "-shm"] {
        let mut path = db_path.as_os_str().to_owned();
        path.push(suffix);
        let path = Path::new(&path);
        if path.exists() {
            std::fs::remove_file(path)?;
            println!("Deleted: {}", path.display());
            deleted = true;
        }
    }

    if deleted {
        println!("Database deleted. Run `vermieter db migrate` to recreate it.");
    } else {
        println!("No database file found.");
    }
    Ok(())
}

async fn run_migrations(db_path: &Path) -> anyhow::Result<()> {
    println!("Running migrations on {}...", db_path.display());
    let pool = vermieter_gateway::open_database(db_path).await?;
    pool.close().await;
    println!("Migrations complete.");
    Ok(())
}
