//! Cache command execution.
//!
//! Configuration and manifest problems are returned as errors (the caller
//! exits non-zero); everything after that is reported per package and turned
//! into an exit code.

use crate::batch::{self, BatchSummary};
use crate::cli::{Args, RuntimeConfig};
use crate::download::{Downloader, ReqwestTransport, ScratchDir};
use crate::error::{ConfigError, Result};
use crate::github::GitHubClient;
use crate::manifest;
use crate::publish::{ItemOutcome, ReleasePublisher, ReleaseRef, TransferAction};

/// Execute a cache run from parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Credential first: nothing else is attempted without it
    let token = args.token()?;
    let config = args.to_config()?;
    let output = RuntimeConfig::new(args.quiet);

    output.section(if config.deploy {
        "Artifact cache (deploy)"
    } else {
        "Artifact cache (dry run)"
    });
    output.indent(&format!("Source:   {}:{}", config.source_repo, config.manifest_path));
    output.indent(&format!("Releases: {}", config.release_repo));

    let client =
        GitHubClient::new(&token, config.http_timeout)?.with_api_base(&config.api_base);

    output.println("📦 Reading manifest...");
    let items = manifest::resolve(
        &client,
        &config.source_repo,
        &config.manifest_path,
        config.git_ref.as_deref(),
        &config.registry_url,
    )
    .await?;
    output.success_println(&format!("Found {} dependencies", items.len()));

    let transport = ReqwestTransport::new(config.http_timeout).map_err(|e| ConfigError::HttpClient {
        reason: e.to_string(),
    })?;
    let downloader = Downloader::new(transport, ScratchDir::new(&config.scratch_dir));
    let publisher = ReleasePublisher::new(&client, &downloader, &config);

    let summary = batch::run(items, config.package_filter.as_deref(), &publisher).await;
    print_summary(&output, &summary);

    Ok(summary.exit_code(config.strict))
}

fn print_summary(output: &RuntimeConfig, summary: &BatchSummary) {
    output.section("Results");

    for report in &summary.reports {
        let label = format!("{}@{}", report.name, report.version);
        match &report.outcome {
            Ok(ItemOutcome::AlreadyCached { html_url, .. }) => {
                output.success_println(&format!("{label}: already cached ({html_url})"));
            }
            Ok(ItemOutcome::Published {
                release: ReleaseRef::Remote(handle),
                transfers,
                ..
            }) => {
                output.success_println(&format!(
                    "{label}: cached {} asset(s) ({})",
                    transfers.len(),
                    handle.html_url
                ));
                for transfer in transfers {
                    if let TransferAction::Uploaded { size, .. } = &transfer.action {
                        output.indent(&format!("{} ({size} bytes)", transfer.filename));
                    }
                }
            }
            Ok(ItemOutcome::Published { tag, transfers, .. }) => {
                output.info_println(&format!(
                    "{label}: would create {tag} with {} asset(s)",
                    transfers.len()
                ));
                for transfer in transfers {
                    output.indent(&format!("{} ({})", transfer.filename, transfer.target.os));
                }
            }
            Err(e) => output.error_println(&format!("{label}: {e}")),
        }
    }

    let message = summary.message();
    if summary.is_empty() {
        output.warning_println(&message);
    } else if summary.all_failed() {
        output.error_println(&message);
    } else if summary.failed() > 0 {
        output.warning_println(&message);
    } else {
        output.success_println(&message);
    }
}
