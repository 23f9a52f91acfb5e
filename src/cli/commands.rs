//! One-shot subcommands. They drive the same core state as the TUI and
//! write plain text to the given output.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::api::viewer_url;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::core::browser::{PendingDelete, ReloadOutcome, ReportBrowser};
use crate::core::models::Report;
use crate::core::upload::{UPLOAD_FAILED_MESSAGE, UploadForm, UploadOutcome};
use crate::core::view::{HEADERS, ReportRow};

fn browser(ctx: &AppContext) -> Result<ReportBrowser> {
    Ok(ReportBrowser::new(
        ctx.config.projects.clone(),
        ctx.config.project.clone(),
    )?)
}

async fn load(ctx: &AppContext) -> Result<ReportBrowser> {
    let mut browser = browser(ctx)?;
    if browser.reload(ctx.api.as_ref()).await == ReloadOutcome::Failed {
        bail!(
            "{}",
            browser.last_error().unwrap_or("Failed to load reports")
        );
    }
    Ok(browser)
}

/// Print the reports of the active project.
pub async fn list(ctx: &AppContext, out: &mut impl Write) -> Result<()> {
    let browser = load(ctx).await?;
    write_table(out, browser.reports())?;
    Ok(())
}

pub fn write_table(out: &mut impl Write, reports: &[Report]) -> std::io::Result<()> {
    if reports.is_empty() {
        return writeln!(out, "No reports");
    }
    let [id, date, status, total, passed, failed] = HEADERS;
    writeln!(
        out,
        "{id:<10} {date:<19} {status:<10} {total:>6} {passed:>6} {failed:>6}"
    )?;
    for report in reports {
        let [id, date, status, total, passed, failed] = ReportRow::from(report).into_cells();
        writeln!(
            out,
            "{id:<10} {date:<19} {status:<10} {total:>6} {passed:>6} {failed:>6}"
        )?;
    }
    Ok(())
}

/// Upload an archive to the active project. With `wait`, sleep for the
/// refresh delay and print the refreshed list.
pub async fn upload(
    ctx: &AppContext,
    file: &Path,
    wait: bool,
    out: &mut impl Write,
) -> Result<()> {
    if !file.is_file() {
        bail!("No such file: {}", file.display());
    }

    let mut form = UploadForm::new();
    form.select_file(file);
    let Some(intent) = form.submit(&ctx.config.project) else {
        bail!("Nothing to upload");
    };
    writeln!(out, "{}", form.message().unwrap_or_default())?;

    let result = ctx.api.upload(&intent).await;
    let error = result.as_ref().err().map(ToString::to_string);
    match form.finish(result) {
        UploadOutcome::Accepted(receipt) => {
            writeln!(out, "{}", form.message().unwrap_or_default())?;
            if let Some(id) = receipt.id {
                writeln!(out, "Report id: {id}")?;
            }
        }
        _ => bail!(
            "{UPLOAD_FAILED_MESSAGE}: {}",
            error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }

    if wait {
        tokio::time::sleep(ctx.config.refresh_delay()).await;
        list(ctx, out).await?;
    }
    Ok(())
}

/// Delete a report after confirmation, then print the remaining list.
pub async fn delete(
    ctx: &AppContext,
    id: &str,
    assume_yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let pending = PendingDelete::new(id);
    if !assume_yes && !prompt_confirm(&pending, input, out)? {
        writeln!(out, "Aborted")?;
        return Ok(());
    }

    let mut browser = browser(ctx)?;
    let outcome = browser
        .delete_report(ctx.api.as_ref(), pending.confirm())
        .await
        .context("Delete failed")?;
    writeln!(out, "Deleted {id}")?;
    match outcome {
        ReloadOutcome::Applied => write_table(out, browser.reports())?,
        _ => writeln!(out, "{}", browser.last_error().unwrap_or_default())?,
    }
    Ok(())
}

fn prompt_confirm(
    pending: &PendingDelete,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool> {
    write!(out, "{} {} [y/N] ", pending.prompt(), pending.id())?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Print the viewer URL of a report in the active project.
pub fn open(config: &AppConfig, id: &str, out: &mut impl Write) -> Result<()> {
    let url = viewer_url(config.viewer_base(), &config.project, id)?;
    writeln!(out, "{url}")?;
    Ok(())
}

pub async fn health(ctx: &AppContext, out: &mut impl Write) -> Result<()> {
    ctx.api
        .health()
        .await
        .with_context(|| format!("{} is not healthy", ctx.config.server))?;
    writeln!(out, "ok")?;
    Ok(())
}

/// Print the effective configuration without the token.
pub fn show_config(config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let content =
        toml::to_string_pretty(&config.redacted()).context("Failed to serialize config")?;
    write!(out, "{content}")?;
    Ok(())
}
