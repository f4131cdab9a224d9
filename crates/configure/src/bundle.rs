//! macOS `.app` bundle resolution.
//!
//! A directory named `*.app` is only a bundle if it carries
//! `Contents/Info.plist` and a designated executable under
//! `Contents/MacOS`. Anything else is a "ghost" and gets walked like a
//! plain directory.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use launchscout_sniff::{Arch, Flavor, Os, SNIFF_LEN, Sniffed, sniff};

use crate::fsutil::{dir_size, read_prefix};

pub const BUNDLE_SUFFIX: &str = ".app";

const CONTENTS_DIR: &str = "Contents";
const INFO_PLIST: &str = "Info.plist";
const MACOS_DIR: &str = "MacOS";
const PLIST_READ_LIMIT: usize = 256 * 1024;

/// A structurally sound bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppBundle {
    /// Designated executable, relative to the bundle directory.
    pub executable: String,
    pub identifier: Option<String>,
    /// Architectures of the designated executable.
    pub arch: BTreeSet<Arch>,
    /// Aggregate size of the bundle contents.
    pub size: u64,
}

/// Why a `*.app` directory is not treated as a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GhostReason {
    MissingInfoPlist,
    /// `CFBundleExecutable` names a file that is absent or not executable.
    MissingExecutable(String),
    /// No plist key and nothing executable in `Contents/MacOS`.
    NoExecutable,
}

impl fmt::Display for GhostReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GhostReason::MissingInfoPlist => write!(f, "missing Contents/Info.plist"),
            GhostReason::MissingExecutable(name) => {
                write!(f, "designated executable {name:?} missing or not executable")
            }
            GhostReason::NoExecutable => write!(f, "no executable in Contents/MacOS"),
        }
    }
}

/// Decision for one `*.app` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    /// Emit one candidate and do not descend.
    Valid(AppBundle),
    /// Dissolve: walk the directory as ordinary files.
    Ghost(GhostReason),
}

pub fn is_bundle_name(name: &str) -> bool {
    name.len() > BUNDLE_SUFFIX.len() && name.to_ascii_lowercase().ends_with(BUNDLE_SUFFIX)
}

/// Inspects `dir` for the bundle layout.
pub fn resolve(dir: &Path) -> BundleOutcome {
    let contents = dir.join(CONTENTS_DIR);
    let plist_path = contents.join(INFO_PLIST);
    if !plist_path.is_file() {
        return BundleOutcome::Ghost(GhostReason::MissingInfoPlist);
    }

    // An unreadable or binary plist still leaves the MacOS directory scan.
    let plist = read_prefix(&plist_path, PLIST_READ_LIMIT).unwrap_or_default();
    let plist = String::from_utf8_lossy(&plist);
    let identifier = plist_string(&plist, "CFBundleIdentifier");

    let macos = contents.join(MACOS_DIR);
    let (name, sniffed) = match plist_string(&plist, "CFBundleExecutable") {
        Some(name) => match sniff_bundle_executable(&macos.join(&name)) {
            Some(sniffed) => (name, sniffed),
            None => return BundleOutcome::Ghost(GhostReason::MissingExecutable(name)),
        },
        None => match first_executable(&macos) {
            Some(found) => found,
            None => return BundleOutcome::Ghost(GhostReason::NoExecutable),
        },
    };

    BundleOutcome::Valid(AppBundle {
        executable: format!("{CONTENTS_DIR}/{MACOS_DIR}/{name}"),
        identifier,
        arch: sniffed.arch,
        size: dir_size(dir),
    })
}

/// Finds the outermost valid bundle that is, or contains, `target`.
///
/// Both paths must be canonical; returns the bundle's absolute path.
pub fn enclosing_bundle(root: &Path, target: &Path) -> Option<(PathBuf, AppBundle)> {
    let rel = target.strip_prefix(root).ok()?;
    let mut current = root.to_path_buf();

    for component in rel.components() {
        current.push(component);
        let named_like_bundle = component.as_os_str().to_str().is_some_and(is_bundle_name);
        if named_like_bundle && current.is_dir() {
            if let BundleOutcome::Valid(bundle) = resolve(&current) {
                return Some((current, bundle));
            }
        }
    }
    None
}

/// Sniffs a bundle executable, following symlinks.
fn sniff_bundle_executable(path: &Path) -> Option<Sniffed> {
    if !fs::metadata(path).ok()?.is_file() {
        return None;
    }
    let name = path.file_name()?.to_string_lossy();
    let prefix = read_prefix(path, SNIFF_LEN).ok()?;
    sniff(&name, &prefix).filter(|s| s.is_native_for(Os::Darwin) || s.flavor == Flavor::Script)
}

/// First darwin executable in `Contents/MacOS`, by name.
fn first_executable(macos: &Path) -> Option<(String, Sniffed)> {
    let mut names: Vec<String> = fs::read_dir(macos)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    names.into_iter().find_map(|name| {
        let sniffed = sniff_bundle_executable(&macos.join(&name))?;
        sniffed.is_native_for(Os::Darwin).then_some((name, sniffed))
    })
}

/// Extracts `<key>{key}</key><string>…</string>` from the top-level
/// `<dict>` of an XML plist. Keys of nested dicts are skipped.
fn plist_string(plist: &str, key: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut pos = 0;
    while let Some(start) = plist[pos..].find('<').map(|i| pos + i) {
        let rest = &plist[start..];
        if rest.starts_with("<!--") {
            pos = start + rest.find("-->")? + 3;
            continue;
        }
        let end = start + rest.find('>')? + 1;
        match &plist[start..end] {
            "<dict>" => depth += 1,
            "</dict>" => depth = depth.saturating_sub(1),
            "<key>" if depth == 1 => {
                let close = end + plist[end..].find("</key>")?;
                let after = close + "</key>".len();
                if plist[end..close].trim() == key {
                    return plist_value(&plist[after..]);
                }
                pos = after;
                continue;
            }
            _ => {}
        }
        pos = end;
    }
    None
}

fn plist_value(rest: &str) -> Option<String> {
    let rest = rest.trim_start().strip_prefix("<string>")?;
    let value = rest[..rest.find("</string>")?].trim();
    if value.is_empty() {
        return None;
    }
    Some(
        value
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
