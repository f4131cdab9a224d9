//! Whole-tree scenarios: scan a synthetic build, then filter it the way a
//! launcher would.

use std::fs;
use std::path::Path;

use launchscout_sniff::fixtures::{self, ElfKind, PeKind};
use launchscout_sniff::{Arch, Flavor, Os};

use crate::builder::{ConfigureParams, configure};
use crate::permissions::{FixParams, fix_permissions};
use crate::types::Verdict;

/// Writes `data` to `path`, creating parents, with `mode` on Unix.
pub(crate) fn write_file(path: &Path, data: &[u8], mode: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }
    #[cfg(not(unix))]
    let _ = mode;
}

/// XML `Info.plist` naming `executable` (inserted verbatim).
pub(crate) fn info_plist(executable: &str, identifier: Option<&str>) -> String {
    let identifier = identifier
        .map(|id| format!("\t<key>CFBundleIdentifier</key>\n\t<string>{id}</string>\n"))
        .unwrap_or_default();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n<dict>\n\
         \t<key>CFBundleExecutable</key>\n\t<string>{executable}</string>\n\
         {identifier}\
         </dict>\n</plist>\n"
    )
}

pub(crate) fn params() -> ConfigureParams<'static> {
    ConfigureParams::default()
}

fn padded(mut data: Vec<u8>, len: usize) -> Vec<u8> {
    data.resize(len, 0);
    data
}

fn scan(root: &Path) -> Verdict {
    configure(root, &params()).unwrap()
}

fn filtered(verdict: &Verdict, os: Os, arch: Arch) -> Vec<String> {
    let mut v = verdict.clone();
    v.filter_platform(os, arch);
    v.candidates.into_iter().map(|c| c.path).collect()
}

fn write_bundle(app: &Path, name: &str, arch: Arch, mode: u32) {
    write_file(&app.join("Contents/Info.plist"), info_plist(name, None).as_bytes(), 0o644);
    write_file(&app.join("Contents/MacOS").join(name), &fixtures::macho(arch), mode);
}

#[test]
fn windows_batch_launcher_wins() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("launcher.bat"), b"@echo off\r\nstart game.exe\r\n", 0o644);
    write_file(&root.join("game.exe"), &padded(fixtures::pe(Arch::X86, PeKind::Gui), 4096), 0o644);
    write_file(&root.join("data/assets.pak"), &[0u8; 512], 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 2);
    for arch in [Arch::X86, Arch::Amd64] {
        assert_eq!(filtered(&v, Os::Windows, arch), vec!["launcher.bat"]);
    }
    assert!(filtered(&v, Os::Linux, Arch::Amd64).is_empty());
}

#[test]
fn windows_il2cpp_game_is_the_only_survivor() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let mut game = padded(fixtures::pe(Arch::X86, PeKind::Gui), 2048);
    game.extend_from_slice(b"UnityPlayer.dll\0");
    write_file(&root.join("game.exe"), &game, 0o644);
    write_file(
        &root.join("UnityCrashHandler64.exe"),
        &padded(fixtures::pe(Arch::Amd64, PeKind::Gui), 8192),
        0o644,
    );
    write_file(
        &root.join("UnityCrashHandler32.exe"),
        &padded(fixtures::pe(Arch::X86, PeKind::Gui), 8192),
        0o644,
    );
    write_file(&root.join("UnityPlayer.dll"), &fixtures::pe(Arch::X86, PeKind::Dll), 0o644);
    write_file(&root.join("GameAssembly.dll"), &fixtures::pe(Arch::X86, PeKind::Dll), 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 3);
    for arch in [Arch::X86, Arch::Amd64] {
        assert_eq!(filtered(&v, Os::Windows, arch), vec!["game.exe"]);
    }
}

#[test]
fn windows_exe_beats_html() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("game.exe"), &fixtures::pe(Arch::X86, PeKind::Gui), 0o644);
    write_file(&root.join("index.html"), b"<!DOCTYPE html><html><body></body></html>", 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 2);
    assert_eq!(filtered(&v, Os::Windows, Arch::Amd64), vec!["game.exe"]);
    assert_eq!(filtered(&v, Os::Linux, Arch::Amd64), vec!["index.html"]);
}

#[test]
fn darwin_bundle_wins_over_loose_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_bundle(&root.join("Some Grand Game.app"), "grand", Arch::Amd64, 0o644);
    write_file(&root.join("launch.sh"), b"#!/bin/sh\nopen 'Some Grand Game.app'\n", 0o644);
    write_file(&root.join("server"), &fixtures::elf(Arch::Amd64, ElfKind::Exec), 0o755);
    write_file(&root.join("game.jar"), &fixtures::jar(), 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 4);

    let fix = fix_permissions(&v, &FixParams { dry_run: true, ..FixParams::default() });
    let mut changed = fix.changed;
    changed.sort();
    if cfg!(unix) {
        assert_eq!(changed, vec!["Some Grand Game.app/Contents/MacOS/grand", "launch.sh"]);
    }

    assert_eq!(filtered(&v, Os::Darwin, Arch::Amd64), vec!["Some Grand Game.app"]);
    assert_eq!(filtered(&v, Os::Linux, Arch::Amd64), vec!["launch.sh"]);
}

#[test]
fn darwin_nested_bundle_keeps_its_path() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(&dir.path().join("osx64/dragonjousting.app"), "dragonjousting", Arch::Amd64, 0o755);

    let v = scan(dir.path());
    assert_eq!(v.candidates.len(), 1);
    let c = &v.candidates[0];
    assert_eq!(c.path, "osx64/dragonjousting.app");
    assert_eq!(c.depth, 1);
    assert_eq!(c.flavor, Flavor::AppBundle);
    assert_eq!(filtered(&v, Os::Darwin, Arch::Amd64), vec!["osx64/dragonjousting.app"]);
}

#[test]
fn darwin_ghost_bundle_dissolves() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("Ghost.app/Contents/MacOS/ghost"), &fixtures::macho(Arch::Amd64), 0o755);
    write_bundle(&root.join("Real.app"), "real", Arch::Amd64, 0o755);
    write_file(&root.join("run.sh"), b"#!/bin/sh\nopen Real.app\n", 0o755);

    let v = scan(root);
    let mut paths: Vec<&str> = v.candidates.iter().map(|c| c.path.as_str()).collect();
    paths.sort();
    assert_eq!(paths, vec!["Ghost.app/Contents/MacOS/ghost", "Real.app", "run.sh"]);
    assert_eq!(filtered(&v, Os::Darwin, Arch::Amd64), vec!["Real.app"]);
}

#[cfg(unix)]
#[test]
fn darwin_symlinked_bundle_is_reported_once() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_bundle(&root.join("hello.app"), "hello", Arch::Amd64, 0o755);
    symlink(root.join("hello.app"), root.join("Hello Alias.app")).unwrap();
    symlink(root.join("hello.app/Contents/MacOS/hello"), root.join("run")).unwrap();

    let v = scan(root);
    let paths: Vec<&str> = v.candidates.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["hello.app"]);
    assert_eq!(v.total_size, v.candidates[0].size);
}

#[test]
fn linux_launcher_script_wins() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("OpenHexagon"), b"#!/bin/sh\ncd \"$(dirname \"$0\")\"\nexec ./OpenHexagon-x86_64 \"$@\"\n", 0o755);
    write_file(&root.join("OpenHexagon-x86"), &fixtures::elf(Arch::X86, ElfKind::Exec), 0o755);
    write_file(&root.join("OpenHexagon-x86_64"), &fixtures::elf(Arch::Amd64, ElfKind::Exec), 0o755);
    write_file(&root.join("tools/pack"), &fixtures::elf(Arch::Amd64, ElfKind::Pie), 0o755);
    write_file(&root.join("tools/pack32"), &fixtures::elf(Arch::X86, ElfKind::Exec), 0o755);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 5);
    assert_eq!(filtered(&v, Os::Linux, Arch::Amd64), vec!["OpenHexagon"]);
    assert_eq!(filtered(&v, Os::Linux, Arch::X86), vec!["OpenHexagon"]);
}

#[test]
fn linux_shared_libraries_are_not_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("game"), &fixtures::elf(Arch::Amd64, ElfKind::Pie), 0o755);
    write_file(&root.join("lib/libfoo.so"), &fixtures::elf(Arch::Amd64, ElfKind::SharedObject), 0o755);
    write_file(&root.join("lib/libbar.so.1"), &fixtures::elf(Arch::Amd64, ElfKind::SharedObject), 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 1);
    assert_eq!(v.candidates[0].path, "game");
}

#[test]
fn linux_dual_arch_picks_matching_binary() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("Game.x86"), &fixtures::elf(Arch::X86, ElfKind::Exec), 0o755);
    write_file(&root.join("Game.x86_64"), &fixtures::elf(Arch::Amd64, ElfKind::Exec), 0o755);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 2);
    assert_eq!(filtered(&v, Os::Linux, Arch::X86), vec!["Game.x86"]);
    assert_eq!(filtered(&v, Os::Linux, Arch::Amd64), vec!["Game.x86_64"]);
    assert!(filtered(&v, Os::Linux, Arch::Arm64).is_empty());
}

#[test]
fn linux_jar_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("binary"), &fixtures::elf(Arch::X86, ElfKind::Exec), 0o644);
    write_file(&root.join("hiddenjar.dat"), &fixtures::jar(), 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 2);
    assert_eq!(filtered(&v, Os::Linux, Arch::X86), vec!["binary"]);
    assert_eq!(filtered(&v, Os::Linux, Arch::Amd64), vec!["hiddenjar.dat"]);

    if cfg!(unix) {
        let fix = fix_permissions(&v, &FixParams { dry_run: true, ..FixParams::default() });
        assert_eq!(fix.changed, vec!["binary"]);
    }
}

#[test]
fn shallowest_index_html_wins() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let page = b"<!DOCTYPE html>\n<html><head><script src=\"game.js\"></script></head></html>";
    write_file(&root.join("game/index.html"), page, 0o644);
    write_file(&root.join("game/lib/index.html"), page, 0o644);
    write_file(&root.join("docs/api/v1/index.html"), page, 0o644);
    write_file(&root.join("game/manual.html"), page, 0o644);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 3);
    for os in [Os::Linux, Os::Darwin, Os::Windows] {
        assert_eq!(filtered(&v, os, Arch::Amd64), vec!["game/index.html"]);
    }
}

#[test]
fn bigger_is_better() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for (name, len) in [("editor.exe", 3000), ("tiled.exe", 9000), ("tmxrasterizer.exe", 1000)] {
        write_file(&root.join(name), &padded(fixtures::pe(Arch::Amd64, PeKind::Gui), len), 0o644);
    }

    let mut v = scan(root);
    v.filter_platform(Os::Windows, Arch::Amd64);
    let paths: Vec<&str> = v.candidates.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["tiled.exe", "editor.exe", "tmxrasterizer.exe"]);
    assert_eq!(v.best().map(|c| c.path.as_str()), Some("tiled.exe"));
    assert!(!v.is_ambiguous());
}

#[test]
fn nodewebkit_helpers_rank_last() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let elf = fixtures::elf(Arch::Amd64, ElfKind::Exec);
    write_file(&root.join("nacl_helper"), &padded(elf.clone(), 50_000), 0o755);
    write_file(&root.join("nacl_helper_bootstrap"), &elf, 0o755);
    write_file(&root.join("nw"), &padded(elf, 20_000), 0o755);

    let v = scan(root);
    assert_eq!(v.candidates.len(), 3);
    let kept = filtered(&v, Os::Linux, Arch::Amd64);
    assert_eq!(kept.len(), 3);
    assert_eq!(kept[0], "nw");
}

#[test]
fn filtering_a_clone_keeps_the_full_set() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("game.exe"), &fixtures::pe(Arch::Amd64, PeKind::Gui), 0o644);
    write_file(&root.join("game.x86_64"), &fixtures::elf(Arch::Amd64, ElfKind::Exec), 0o755);

    let full = scan(root);
    let mut windows = full.clone();
    windows.filter_platform(Os::Windows, Arch::Amd64);
    let mut linux = full.clone();
    linux.filter_platform(Os::Linux, Arch::Amd64);

    assert_eq!(full.candidates.len(), 2);
    assert!(full.platform.is_none());
    assert_eq!(windows.candidates[0].path, "game.exe");
    assert_eq!(linux.candidates[0].path, "game.x86_64");
}

#[test]
fn verdict_serializes_for_consumers() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(&dir.path().join("Hello.app"), "hello", Arch::Arm64, 0o755);

    let v = scan(dir.path());
    let json = serde_json::to_value(&v).unwrap();
    let c = &json["candidates"][0];
    assert_eq!(c["flavor"], "app-bundle");
    assert_eq!(c["os"][0], "darwin");
    assert_eq!(c["arch"][0], "arm64");
    assert_eq!(c["app_bundle"]["executable"], "Contents/MacOS/hello");
    assert!(c.get("windows").is_none());

    let back: Verdict = serde_json::from_value(json).unwrap();
    assert_eq!(back, v);
}
