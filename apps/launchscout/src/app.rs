//! Scan, filter and fix, driven by the merged CLI/config settings.

use std::path::PathBuf;

use anyhow::Context;
use launchscout_configure::{
    Arch, ConfigureParams, FixOutcome, FixParams, Os, Signatures, TracingConsumer, Verdict,
    configure, fix_permissions,
};
use serde::Serialize;

use crate::args::Cli;
use crate::config::Config;

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dir: PathBuf,
    /// `None` means "report every candidate, unfiltered".
    pub platform: Option<(Os, Arch)>,
    pub fix_permissions: bool,
    pub dry_run: bool,
    pub signatures: Option<PathBuf>,
}

impl Settings {
    pub fn merge(cli: Cli, config: Config) -> anyhow::Result<Self> {
        let os = cli.os.or(config.os);
        let arch = cli.arch.or(config.arch);
        let platform = if os.is_none() && arch.is_none() {
            None
        } else {
            let os: Os = os.as_deref().unwrap_or(std::env::consts::OS).parse()?;
            let arch: Arch = arch.as_deref().unwrap_or(std::env::consts::ARCH).parse()?;
            Some((os, arch))
        };

        Ok(Self {
            dir: cli.dir,
            platform,
            fix_permissions: cli.fix_permissions,
            dry_run: cli.dry_run || config.dry_run,
            signatures: cli.signatures.or(config.signatures),
        })
    }
}

/// What gets printed on stdout.
#[derive(Debug, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ambiguous: bool,
    /// Present when permission fixing ran, failures included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<FixOutcome>,
}

impl Report {
    /// Fails if any execute bit could not be fixed. Call after printing.
    pub fn check(self) -> anyhow::Result<()> {
        if let Some(outcome) = self.permissions {
            outcome.into_result()?;
        }
        Ok(())
    }
}

pub fn run(settings: &Settings) -> anyhow::Result<Report> {
    let custom = settings
        .signatures
        .as_deref()
        .map(Signatures::from_file)
        .transpose()
        .context("loading signature table")?;
    let params = ConfigureParams {
        consumer: &TracingConsumer,
        signatures: custom.as_ref().unwrap_or_else(|| Signatures::builtin()),
    };

    let mut verdict = configure(&settings.dir, &params)
        .with_context(|| format!("scanning {}", settings.dir.display()))?;

    if let Some((os, arch)) = settings.platform {
        verdict.filter_platform(os, arch);
        match verdict.best() {
            Some(best) => tracing::info!(%os, %arch, path = %best.path, "best candidate"),
            None => tracing::warn!(%os, %arch, "nothing to launch on this platform"),
        }
    }
    let ambiguous = verdict.is_ambiguous();
    if ambiguous {
        tracing::warn!("top candidates are indistinguishable, ask the user");
    }

    let permissions = settings.fix_permissions.then(|| {
        let params = FixParams {
            consumer: &TracingConsumer,
            dry_run: settings.dry_run,
        };
        fix_permissions(&verdict, &params)
    });

    Ok(Report {
        verdict,
        ambiguous,
        permissions,
    })
}
