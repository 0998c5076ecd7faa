//! `rfp doc` command - view or save an RFP's document

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::commands::utils::{find_rfp, open_session, visible_rfps};
use crate::cli::helpers::format_size;
use crate::cli::GlobalOpts;
use crate::core::attachment::{self, BlobHandles, DirBlobHandles, Resolved};
use crate::entities::rfp::Attachment;

#[derive(clap::Args, Debug)]
pub struct DocArgs {
    /// RFP id or unambiguous id prefix
    #[arg(required_unless_present = "clean")]
    pub id: Option<String>,

    /// Save the document to this path ("-" for stdout) instead of viewing it
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Save under the document's own file name in the current directory
    #[arg(long, conflicts_with = "output")]
    pub download: bool,

    /// Release documents spooled by earlier views
    #[arg(long, conflicts_with_all = ["output", "download"])]
    pub clean: bool,
}

pub fn run(args: DocArgs, global: &GlobalOpts) -> Result<()> {
    let (config, session) = open_session(global)?;
    let mut handles = DirBlobHandles::new(config.spool_dir());

    if args.clean {
        let released = handles
            .spooled()
            .iter()
            .filter(|h| handles.release(h))
            .count();
        if !global.quiet {
            println!("{} Released {} spooled document(s)", style("✓").green(), released);
        }
        return Ok(());
    }

    let id = args
        .id
        .as_deref()
        .ok_or_else(|| miette::miette!("An RFP id is required"))?;
    let rfp = find_rfp(&visible_rfps(&session), id)?;
    let document = rfp
        .attachment
        .as_ref()
        .ok_or_else(|| miette::miette!("RFP {} has no document attached", rfp.id()))?;

    let target = match (&args.output, args.download) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(document.download_name())),
        (None, false) => None,
    };

    if let Some(target) = target {
        return save(document, &target, global.quiet);
    }

    // View: hand out a location a viewer can open, replacing the last one
    let released = handles.release_owned_by(rfp.id().as_str());
    if released > 0 {
        tracing::debug!(id = %rfp.id(), released, "released earlier spooled copies");
    }
    let Some(resolved) = attachment::locate(&rfp, &mut handles) else {
        return Err(miette::miette!("RFP {} has no document attached", rfp.id()));
    };
    match resolved {
        Resolved::External(url) => println!("{}", url),
        Resolved::Handle(handle) => {
            println!("{}", handle.url);
            if !global.quiet {
                eprintln!(
                    "{} {} ({}), release with {}",
                    style("Spooled").dim(),
                    document.label(),
                    format_size(handle.len as u64),
                    style("rfp doc --clean").cyan()
                );
            }
        }
        Resolved::Fallback { raw, reason } => {
            eprintln!(
                "{} document could not be decoded ({}); showing the stored data",
                style("!").yellow(),
                reason
            );
            println!("{}", raw);
        }
    }

    Ok(())
}

fn save(document: &Attachment, target: &Path, quiet: bool) -> Result<()> {
    let data = match document {
        Attachment::Embedded { data, .. } => data,
        Attachment::External { url, .. } => {
            return Err(miette::miette!(
                "The document is an external reference and is not stored locally: {}",
                url
            ));
        }
    };

    let bytes = attachment::decode_bytes(data)
        .into_diagnostic()
        .wrap_err("The stored document could not be decoded")?;

    if target.as_os_str() == "-" {
        use std::io::Write;
        std::io::stdout().write_all(&bytes).into_diagnostic()?;
        return Ok(());
    }

    fs::write(target, &bytes)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {}", target.display()))?;

    if !quiet {
        println!(
            "{} Saved {} ({})",
            style("✓").green(),
            style(target.display()).cyan(),
            format_size(bytes.len() as u64)
        );
    }
    Ok(())
}
