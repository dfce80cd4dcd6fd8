//! # Command Dispatcher
//!
//! Maps a completed line to its registered handler, loading the backing
//! package first when one is declared. Every branch releases the prompt
//! through `enable()` exactly once; the dispatcher owns that discipline
//! so handlers cannot leave the read cycle stuck.

use crate::shell::commands::{CommandRequest, PackageLoaderFn};
use crate::shell::controller::Shell;
use crate::shell::events::ShellEvent;
use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Token that re-invokes the most recent history entry
pub const REPEAT_LAST: &str = "!!";

/// Memoizing loader for lazily initialized command packages.
///
/// Each package gets one shared cell, so concurrent first-use requests
/// await the same in-flight initialization instead of doubling it. A
/// failed load leaves the cell empty and is retried on the next use.
pub(crate) struct Packages {
    loader: Option<PackageLoaderFn>,
    cells: HashMap<String, Arc<OnceCell<()>>>,
}

impl Packages {
    pub(crate) fn new(loader: Option<PackageLoaderFn>) -> Self {
        Self {
            loader,
            cells: HashMap::new(),
        }
    }

    pub(crate) fn loader(&self) -> Option<PackageLoaderFn> {
        self.loader.clone()
    }

    pub(crate) fn cell(&mut self, package: &str) -> Arc<OnceCell<()>> {
        self.cells.entry(package.to_string()).or_default().clone()
    }
}

/// Execute one submitted line.
///
/// Returns a boxed future so the repeat-last branch can recurse.
pub(crate) fn dispatch(shell: Shell, line: String) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        let trimmed = line.trim().to_string();
        let mut tokens = trimmed.split_whitespace().map(str::to_string);
        let Some(name) = tokens.next() else {
            shell.enable();
            return;
        };
        let args: Vec<String> = tokens.collect();

        if name == REPEAT_LAST {
            let last = { shell.core.lock().await.history.last().map(str::to_string) };
            match last {
                Some(previous) => dispatch(shell, previous).await,
                None => {
                    let _ = shell.println("No previous command.").await;
                    shell.enable();
                }
            }
            return;
        }

        let descriptor = { shell.core.lock().await.registry.find(&name) };
        let Some(descriptor) = descriptor else {
            let _ = shell.println(&format!("Command '{name}' not found.")).await;
            shell.enable();
            return;
        };

        let precondition_met = {
            let core = shell.core.lock().await;
            descriptor.precondition().is_met(&core.session)
        };
        if !precondition_met {
            tracing::debug!(command = %name, "precondition unmet; skipping");
            shell.enable();
            return;
        }

        shell.disable().await;

        if let Some(package) = descriptor.package() {
            if let Err(err) = load_package(&shell, package).await {
                let _ = shell
                    .println(&format!("Failed to load '{package}': {err:#}"))
                    .await;
                shell.enable();
                return;
            }
        }

        tracing::debug!(command = %name, "dispatching");
        let request = CommandRequest {
            shell: shell.clone(),
            line: trimmed,
            args,
        };
        if let Err(err) = descriptor.run(request).await {
            let _ = shell.println(&format!("{err:#}")).await;
        }
        shell.enable();
    })
}

/// Initialize a package at most once, logging the banner on first use only
async fn load_package(shell: &Shell, package: &str) -> Result<()> {
    let (first_use, cell, loader) = {
        let mut core = shell.core.lock().await;
        (
            core.session.mark_package_loaded(package),
            core.packages.cell(package),
            core.packages.loader(),
        )
    };
    if first_use {
        shell.println(&format!("Loading {package}...")).await?;
    }
    let Some(loader) = loader else {
        return Ok(());
    };
    cell.get_or_try_init(|| loader(package.to_string())).await?;
    if first_use {
        let core = shell.core.lock().await;
        core.events.publish(&ShellEvent::PackageLoaded {
            package: package.to_string(),
        });
    }
    Ok(())
}
