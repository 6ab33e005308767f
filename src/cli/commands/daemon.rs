//! Daemon status and single-track search commands.

use tokio::runtime::Runtime;

use super::daemon_client;
use crate::config::Config;
use crate::model::TrackDescriptor;
use crate::resolve::{Connector, QualityBucket, Resolver, RetryPolicy, query};

/// Connect and print what the daemon reports
pub fn cmd_status(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    let client = daemon_client(config)?;

    rt.block_on(async {
        let mut connector = Connector::new(RetryPolicy::from_config(&config.daemon));
        let session = connector.session(&client).await?;
        let daemon = session.daemon();

        println!("Daemon:  {}", client.base_url());
        match daemon.application_state().await {
            Ok(state) => println!("State:   {}", state),
            Err(e) => println!("State:   unavailable ({})", e),
        }
        println!("Link:    {}", daemon.link_state().await?);
        println!("Session: {:?}", session.state());
        Ok(())
    })
}

/// Search one track and print the pick
pub fn cmd_search(rt: &Runtime, config: &Config, artist: &str, title: &str) -> anyhow::Result<()> {
    config.validate()?;
    let client = daemon_client(config)?;
    let track = TrackDescriptor::new(artist, title);

    rt.block_on(async {
        println!("Query: {:?}", query::format(&track));

        let mut resolver = Resolver::from_config(client, config);
        match resolver.resolve_one(&track).await? {
            Ok(selection) => {
                let bucket = match selection.bucket {
                    QualityBucket::Preferred => "mp3 320",
                    QualityBucket::Fallback => "flac",
                };
                println!("Pick ({}) from {}:", bucket, selection.candidate.owner);
                for file in &selection.candidate.files {
                    println!(
                        "  {} ({:.1} MB)",
                        file.filename,
                        file.size_bytes as f64 / (1024.0 * 1024.0)
                    );
                }
            }
            Err(e) => println!("Nothing selected [{}]: {}", e.reason(), e),
        }
        Ok(())
    })
}
