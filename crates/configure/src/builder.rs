//! Candidate builder: one walk over the tree, producing a [`Verdict`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use launchscout_sniff::{Flavor, Os, SNIFF_LEN, sniff};
use walkdir::{DirEntry, WalkDir};

use crate::bundle::{self, AppBundle, BundleOutcome};
use crate::consumer::{Consumer, TracingConsumer};
use crate::error::ConfigureError;
use crate::fsutil::{file_mode, read_prefix, relative_slash_path};
use crate::signatures::{CompiledSignatures, Signatures};
use crate::types::{AppBundleInfo, Candidate, Verdict, path_depth};

/// Inputs for [`configure`].
#[derive(Clone, Copy)]
pub struct ConfigureParams<'a> {
    pub consumer: &'a dyn Consumer,
    pub signatures: &'a Signatures,
}

impl Default for ConfigureParams<'static> {
    fn default() -> Self {
        Self {
            consumer: &TracingConsumer,
            signatures: Signatures::builtin(),
        }
    }
}

/// Scans `root` and returns every launch candidate found.
///
/// Unreadable entries are reported through the consumer and skipped; only
/// a missing or unreadable root is an error.
pub fn configure(root: &Path, params: &ConfigureParams<'_>) -> Result<Verdict, ConfigureError> {
    let root_error = |source| ConfigureError::Root {
        path: root.to_path_buf(),
        source,
    };
    if !fs::metadata(root).map_err(root_error)?.is_dir() {
        return Err(ConfigureError::NotADirectory(root.to_path_buf()));
    }
    let canonical_root = fs::canonicalize(root).map_err(root_error)?;

    let mut scan = Scan {
        root,
        canonical_root,
        signatures: params.signatures.compile()?,
        consumer: params.consumer,
        candidates: Vec::new(),
        seen: HashSet::new(),
        total_size: 0,
    };

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(ConfigureError::Walk(err)),
            Err(err) => {
                scan.consumer.warn(&format!("skipping unreadable entry: {err}"));
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            scan.visit_symlink(&entry);
        } else if file_type.is_dir() {
            if scan.visit_dir(&entry) == Descend::No {
                walker.skip_current_dir();
            }
        } else if file_type.is_file() {
            scan.visit_file(&entry);
        }
    }

    scan.consumer.info(&format!(
        "found {} candidate(s) in {} ({} bytes)",
        scan.candidates.len(),
        root.display(),
        scan.total_size
    ));

    Ok(Verdict {
        base_path: root.to_path_buf(),
        candidates: scan.candidates,
        total_size: scan.total_size,
        platform: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descend {
    Yes,
    No,
}

struct Scan<'a> {
    root: &'a Path,
    canonical_root: PathBuf,
    signatures: CompiledSignatures,
    consumer: &'a dyn Consumer,
    candidates: Vec<Candidate>,
    seen: HashSet<String>,
    total_size: u64,
}

impl Scan<'_> {
    fn visit_dir(&mut self, entry: &DirEntry) -> Descend {
        let name = entry.file_name().to_string_lossy();
        if !bundle::is_bundle_name(&name) {
            return Descend::Yes;
        }

        let rel = relative_slash_path(self.root, entry.path());
        match bundle::resolve(entry.path()) {
            BundleOutcome::Valid(app) => {
                self.total_size += app.size;
                self.push_bundle(rel, app, entry.path());
                Descend::No
            }
            BundleOutcome::Ghost(reason) => {
                self.consumer
                    .info(&format!("{rel}: not an app bundle ({reason}), scanning contents"));
                Descend::Yes
            }
        }
    }

    fn visit_file(&mut self, entry: &DirEntry) {
        let rel = relative_slash_path(self.root, entry.path());
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                self.consumer.warn(&format!("{rel}: cannot stat, skipping ({err})"));
                return;
            }
        };
        let size = metadata.len();
        self.total_size += size;

        let prefix = match read_prefix(entry.path(), SNIFF_LEN) {
            Ok(prefix) => prefix,
            Err(err) => {
                self.consumer.warn(&format!("{rel}: unreadable, skipping ({err})"));
                return;
            }
        };

        let name = entry.file_name().to_string_lossy();
        let Some(sniffed) = sniff(&name, &prefix) else {
            return;
        };

        let mut candidate = Candidate::from_sniffed(rel, sniffed, size, file_mode(&metadata));
        if candidate.windows.is_some_and(|w| !w.gui) {
            candidate.annotate("console subsystem");
        }
        if candidate.flavor.is_executed_directly() {
            let window = if size as usize <= prefix.len() {
                Ok(prefix)
            } else {
                read_prefix(entry.path(), self.signatures.scan_window())
            };
            match window {
                Ok(data) => self.cast_spells(&mut candidate, &data),
                Err(err) => self
                    .consumer
                    .warn(&format!("{}: spell scan failed ({err})", candidate.path)),
            }
        }
        self.check_names(&mut candidate, &name);
        self.push(candidate);
    }

    fn visit_symlink(&mut self, entry: &DirEntry) {
        let rel = relative_slash_path(self.root, entry.path());
        let target = match fs::canonicalize(entry.path()) {
            Ok(target) => target,
            Err(err) => {
                self.consumer
                    .debug(&format!("{rel}: dangling symlink, skipping ({err})"));
                return;
            }
        };
        if !target.starts_with(&self.canonical_root) {
            self.consumer
                .debug(&format!("{rel}: symlink points outside the tree, skipping"));
            return;
        }

        match bundle::enclosing_bundle(&self.canonical_root, &target) {
            Some((bundle_dir, app)) => {
                let bundle_rel = relative_slash_path(&self.canonical_root, &bundle_dir);
                self.consumer
                    .debug(&format!("{rel}: symlink resolves to app bundle {bundle_rel}"));
                self.push_bundle(bundle_rel, app, &bundle_dir);
            }
            None => self
                .consumer
                .debug(&format!("{rel}: symlink target is scanned directly")),
        }
    }

    fn push_bundle(&mut self, rel: String, app: AppBundle, dir: &Path) {
        if self.seen.contains(&rel) {
            return;
        }

        let exec = dir.join(&app.executable);
        let mode = fs::metadata(&exec).map(|m| file_mode(&m)).unwrap_or(0);
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut candidate = Candidate {
            depth: path_depth(&rel),
            path: rel,
            flavor: Flavor::AppBundle,
            os: [Os::Darwin].into(),
            arch: app.arch,
            size: app.size,
            mode,
            spell: Vec::new(),
            denylisted: false,
            helper: false,
            annotations: Vec::new(),
            app_bundle: Some(AppBundleInfo {
                executable: app.executable,
                identifier: app.identifier,
            }),
            windows: None,
        };

        match read_prefix(&exec, self.signatures.scan_window()) {
            Ok(data) => self.cast_spells(&mut candidate, &data),
            Err(err) => self
                .consumer
                .warn(&format!("{}: spell scan failed ({err})", candidate.path)),
        }
        self.check_names(&mut candidate, &name);
        self.push(candidate);
    }

    fn cast_spells(&self, candidate: &mut Candidate, data: &[u8]) {
        candidate.spell = self.signatures.spells_in(data);
        for spell in &candidate.spell {
            let note = format!("spell {} ({:?})", spell.tag, spell.role);
            candidate.annotations.push(note);
        }
    }

    fn check_names(&self, candidate: &mut Candidate, file_name: &str) {
        if let Some(pattern) = self.signatures.denylisted(file_name) {
            candidate.denylisted = true;
            candidate.annotate(format!("denylisted by {pattern}"));
        }
        if let Some(pattern) = self.signatures.helper(file_name) {
            candidate.helper = true;
            candidate.annotate(format!("helper process ({pattern})"));
        }
    }

    fn push(&mut self, candidate: Candidate) {
        if !self.seen.insert(candidate.path.clone()) {
            return;
        }
        self.consumer.debug(&format!(
            "{}: {:?} candidate {:?}",
            candidate.path, candidate.flavor, candidate.arch
        ));
        self.candidates.push(candidate);
    }
}
