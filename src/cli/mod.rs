//! Terminal front ends: the interactive TUI and one-shot commands.

pub mod commands;
pub mod tui;

use std::io;
use std::process::{ExitStatus, Stdio};

use reqwest::Url;
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Hand a URL to the desktop's default browser.
pub fn open_in_browser(url: &Url) -> io::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    launch(opener, url).map(|_| ())
}

/// Start `program url` and reap it on a background task, so repeated opens
/// leave no zombies behind. Must be called from within the tokio runtime.
fn launch(program: &'static str, url: &Url) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = Command::new(program)
        .arg(url.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let url = url.clone();
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                if !status.success() {
                    tracing::warn!(%url, %status, "{program} exited with an error");
                }
                Some(status)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Failed to wait for {program}");
                None
            }
        }
    }))
}
