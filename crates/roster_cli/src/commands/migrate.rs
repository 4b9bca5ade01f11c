use console::style;
use roster::db;
use roster::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

fn done(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                done("Schema is up to date.");
                return Ok(());
            }
            println!("Applying {pending} migration(s)...");
            Migrator::up(&db, None).await?;
            done("Migrations applied.");
        }
        MigrateAction::Down => {
            println!("Rolling back last migration...");
            Migrator::down(&db, Some(1)).await?;
            done("Rollback complete.");
        }
        MigrateAction::Status => {
            println!("Migration status:");
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            println!(
                "{} Dropping all tables and reapplying migrations...",
                style("!").yellow().bold()
            );
            Migrator::fresh(&db).await?;
            done("Fresh migration complete.");
        }
    }

    Ok(())
}
