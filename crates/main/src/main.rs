use anyhow::Context;
use chrono::Utc;
use db::{aspects::AspectKind, Database};
use jamvote::{config::Config, devdata, events, results, telemetry};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config =
        Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Opening database at {}", config.database_url);

    let db = Database::connect(&config.pool_settings())
        .context("Failed to open database")?;
    db.run_migrations().context("Failed to run migrations")?;

    if config.seed_devdata {
        devdata::seed(&db, Utc::now().naive_utc())
            .context("Failed to seed development data")?;
    }

    // print the standings of every event whose results are public
    for event in events::events(&db)? {
        if !event.revealed {
            continue;
        }

        let standings = results::revealed_results(&db, &event.id, None)
            .with_context(|| format!("Failed to tally event {}", event.id))?
            .into_iter()
            .map(|result| {
                json!({
                    "team": result.team.name,
                    "entry": result.team.entry.name,
                    "competing": result.team.is_competing(),
                    "reviews": result.complete,
                    "overall": result.average.score(AspectKind::Overall),
                })
            })
            .collect::<Vec<_>>();

        let summary = json!({
            "event": event.id,
            "name": event.name,
            "results": standings,
        });
        println!("{summary}");
    }

    Ok(())
}
