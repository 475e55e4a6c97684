//! `outpostctl show` - read one outpost and print its remote record

use super::Session;
use crate::Context;
use crate::cli::ShowArgs;
use crate::progress;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::Diagnostics;
use gqlkit::Transport;
use outpost::attributes::PROVIDER;
use outpost::{Fetched, ProviderKind, RemoteRecord};

pub fn run(ctx: &Context, args: ShowArgs) -> Result<()> {
    let session = Session::open(ctx, false)?;

    let spinner = (!ctx.quiet && !args.json).then(|| progress::spinner(&format!("Reading {}...", args.name)));
    let result = fetch(&session, &args.name);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let (record, diagnostics) = result?;

    if args.json {
        let json = serde_json::to_string_pretty(&record.redacted()).context("Failed to serialize record")?;
        println!("{json}");
    } else {
        ui::record(&record);
    }

    ui::diagnostics(&format!("outpost.{}", args.name), &diagnostics);
    if diagnostics.has_errors() {
        bail!("Remote service reported errors for '{}'", args.name);
    }
    Ok(())
}

/// Read the recorded outpost `name` without touching state
pub fn fetch<T: Transport + 'static>(session: &Session<T>, name: &str) -> Result<(RemoteRecord, Diagnostics)> {
    let Some(recorded) = session.state.get(name) else {
        bail!("Outpost '{name}' is not in state; run apply or import it first");
    };

    // Disambiguates provider configs that come back without a type name
    let hint = recorded
        .attributes
        .get(PROVIDER)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<ProviderKind>().ok())
        .or_else(|| session.manifest.get(name).and_then(|spec| spec.kind().ok()));

    match session.resource.fetch(&session.apply_context(), &recorded.id, hint)? {
        Fetched::Found { record, diagnostics } => Ok((record, diagnostics)),
        Fetched::Gone => bail!("Outpost '{name}' ({}) no longer exists remotely", recorded.id),
    }
}
