use console::style;
use roster::connect_and_migrate;
use roster::profile::{ProfileStore, SeaOrmProfileStore};
use uuid::Uuid;

use crate::ProfileAction;

pub(crate) async fn handle_profile(
    action: ProfileAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SeaOrmProfileStore::new(connect_and_migrate(database_url).await?);

    match action {
        ProfileAction::Create { id } => {
            let id = id.unwrap_or_else(Uuid::new_v4);
            let profile = store.create(id).await?;
            println!(
                "{} Created profile {}",
                style("✓").green().bold(),
                style(profile.id).cyan()
            );
        }
    }

    Ok(())
}
