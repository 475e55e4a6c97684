//! `outpostctl import` - adopt an existing remote outpost into state

use super::Session;
use crate::Context;
use crate::cli::ImportArgs;
use crate::progress;
use crate::ui;
use anyhow::{Result, bail};
use declarative::{Diagnostics, Resource, StateStore};
use gqlkit::Transport;

pub fn run(ctx: &Context, args: ImportArgs) -> Result<()> {
    let mut session = Session::open(ctx, false)?;

    let spinner = (!ctx.quiet).then(|| progress::spinner(&format!("Importing {}...", args.id)));
    let result = import(&mut session, &args.name, &args.id);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let diagnostics = result?;

    ui::diagnostics(&format!("outpost.{}", args.name), &diagnostics);
    ui::success(&format!("Imported {} as outpost.{}", args.id, args.name));
    if session.manifest.get(&args.name).is_none() {
        ui::warn(&format!(
            "'{}' is not declared in the manifest; the next apply will delete it",
            args.name
        ));
    }
    Ok(())
}

/// Read `id` into state under `name`
///
/// Nothing is recorded when the read fails or the outpost does not exist.
pub fn import<T: Transport + 'static>(session: &mut Session<T>, name: &str, id: &str) -> Result<Diagnostics> {
    if let Some(existing) = session.state.get(name) {
        bail!("Outpost '{name}' is already managed (id {})", existing.id);
    }
    if let Some((other, _)) = session.state.outposts.iter().find(|(_, s)| s.id == id) {
        bail!("Outpost {id} is already managed as '{other}'");
    }

    let mut data = session.instance_data(name)?;
    let diagnostics = session.resource.import(&session.apply_context(), &mut data, id);
    if diagnostics.has_errors() {
        for d in &diagnostics {
            log::debug!("Import of {id}: {d}");
        }
        bail!("Import of {id} failed: {}", diagnostics.error_summary());
    }
    if data.identifier().is_none() {
        bail!("Outpost {id} does not exist remotely");
    }

    session.state.record(name, &data);
    session.save()?;
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::state::StateFile;
    use gqlkit::{MockTransport, OperationKind};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_import_records_outpost() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, outpost("o-7", "prod"));
        let mut session = session(&dir, MANIFEST, transport);

        import(&mut session, "prod", "o-7").unwrap();
        let saved = StateFile::load(&session.state_path).unwrap();
        let prod = saved.get("prod").unwrap();
        assert_eq!(prod.id, "o-7");
        assert_eq!(prod.attributes["aws"]["roleARN"], json!("arn:aws:iam::123456789012:role/outpost"));

        // Declared values match what was imported
        let data = session.instance_data("prod").unwrap();
        assert!(data.changed_attributes().is_empty(), "{:?}", data.changed_attributes());
    }

    #[test]
    fn test_import_missing_outpost() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, missing());
        let mut session = session(&dir, MANIFEST, transport);

        let err = import(&mut session, "prod", "o-404").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!session.state_path.exists());
    }

    #[test]
    fn test_import_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, outpost("o-7", "prod"));
        let mut session = session(&dir, MANIFEST, transport.clone());
        import(&mut session, "prod", "o-7").unwrap();

        assert!(import(&mut session, "prod", "o-8").is_err());
        assert!(import(&mut session, "other", "o-7").is_err());
        assert_eq!(transport.requests().len(), 1);
    }
}
