use anyhow::Context;
use std::io::Write;
use std::time::UNIX_EPOCH;
use uexky::{
    SledWorkerIdStore, TokioSleep, Uid, UidGenerator, WORKER_ID_BOUND, random_token,
};

use crate::cli::config::{AppConfig, Command};

/// Runs the configured subcommand, writing its output to `out`.
pub async fn run(config: &AppConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Inspect { ids } => inspect(ids, out),
        Command::Generate { count } => generate(config, *count, out).await,
        Command::Token { len } => {
            writeln!(out, "{}", random_token(*len))?;
            Ok(())
        }
    }
}

pub fn inspect(ids: &[String], out: &mut impl Write) -> anyhow::Result<()> {
    for input in ids {
        let uid = Uid::parse(input).with_context(|| format!("cannot inspect {input:?}"))?;
        let created = uid
            .created_at()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs())
            .unwrap_or_default();

        writeln!(out, "{input}")?;
        writeln!(out, "  display:    {uid}")?;
        writeln!(out, "  storage:    {}", uid.to_raw())?;
        writeln!(out, "  timestamp:  {} (unix {created})", uid.timestamp())?;
        writeln!(out, "  worker_id:  {}", uid.worker_id())?;
        writeln!(out, "  sequence:   {}", uid.sequence())?;
        writeln!(out, "  random:     {}", uid.random())?;
    }
    Ok(())
}

pub async fn generate(config: &AppConfig, count: usize, out: &mut impl Write) -> anyhow::Result<()> {
    let db = sled::open(&config.db_path)
        .with_context(|| format!("cannot open lease store at {}", config.db_path.display()))?;
    let store = SledWorkerIdStore::open(&db, &config.cohort)?;
    let generator = UidGenerator::with_config(store, config.generator.clone());

    let lease = generator.acquire_lease::<TokioSleep>().await?;
    tracing::info!(
        worker_id = lease.worker_id(),
        cohort = %config.cohort,
        expires_at = lease.expires_at(),
        "leased worker id (of {WORKER_ID_BOUND})"
    );

    for _ in 0..count {
        let id = generator.next().await?;
        writeln!(out, "{id}\t{}", id.to_raw())?;
    }
    db.flush_async().await?;
    Ok(())
}
