//! Platform filtering and ranking.
//!
//! Filtering drops whatever cannot run on the target, keeps only the
//! best flavor tier, drops helper processes when anything else is left,
//! then orders the rest: denylisted last, spell bias, exact architecture,
//! shallower first, bigger first.

use std::cmp::Reverse;

use launchscout_sniff::{Arch, Flavor, Os};

use crate::error::ConfigureError;
use crate::types::{ArchFit, Candidate, Platform, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    AppBundle,
    Primary,
    Secondary,
    Archive,
    Markup,
}

fn tier(candidate: &Candidate, scripts_first: bool) -> Tier {
    match (candidate.flavor, scripts_first) {
        (Flavor::AppBundle, _) => Tier::AppBundle,
        (Flavor::Script, true) | (Flavor::Native, false) => Tier::Primary,
        (Flavor::Script, false) | (Flavor::Native, true) => Tier::Secondary,
        (Flavor::Archive, _) => Tier::Archive,
        (Flavor::Markup, _) => Tier::Markup,
    }
}

/// Launcher scripts win over natives unless they sit deeper in the tree.
fn scripts_first(pool: &[&Candidate]) -> bool {
    let shallowest = |flavor| {
        pool.iter()
            .filter(|c| c.flavor == flavor)
            .map(|c| c.depth)
            .min()
    };
    match (shallowest(Flavor::Script), shallowest(Flavor::Native)) {
        (Some(script), Some(native)) => script <= native,
        (Some(_), None) => true,
        _ => false,
    }
}

fn tier_pool(survivors: &[Candidate]) -> Vec<&Candidate> {
    let preferred: Vec<&Candidate> = survivors
        .iter()
        .filter(|c| !c.denylisted && !c.is_helper())
        .collect();
    if !preferred.is_empty() {
        return preferred;
    }
    let undenied: Vec<&Candidate> = survivors.iter().filter(|c| !c.denylisted).collect();
    if !undenied.is_empty() {
        return undenied;
    }
    survivors.iter().collect()
}

type RankKey<'a> = (bool, u8, ArchFit, usize, Reverse<u64>, &'a str);

fn rank_key(candidate: &Candidate, platform: Platform) -> RankKey<'_> {
    (
        candidate.denylisted,
        candidate.spell_bias(),
        candidate.arch_fit(platform).unwrap_or(ArchFit::Compatible),
        candidate.depth,
        Reverse(candidate.size),
        candidate.path.as_str(),
    )
}

impl Verdict {
    /// Narrows `candidates` to what runs on `os`/`arch`, best first.
    ///
    /// Works in place: clone the verdict first to keep the full set or to
    /// filter for several platforms. Filtering twice for the same platform
    /// is a no-op.
    pub fn filter_platform(&mut self, os: Os, arch: Arch) {
        let platform = Platform::new(os, arch);
        let mut survivors: Vec<Candidate> = std::mem::take(&mut self.candidates)
            .into_iter()
            .filter(|c| c.runs_on(os) && c.arch_fit(platform).is_some())
            .collect();

        // Denylisted entries and helpers never decide the tier unless
        // nothing else is left.
        let pool = tier_pool(&survivors);
        let scripts_first = scripts_first(&pool);
        let best = pool.iter().map(|c| tier(c, scripts_first)).min();

        survivors.retain(|c| Some(tier(c, scripts_first)) == best);
        if best == Some(Tier::Markup) {
            let shallowest = survivors.iter().map(|c| c.depth).min();
            survivors.retain(|c| Some(c.depth) == shallowest);
        }
        if survivors.iter().any(|c| !c.is_helper()) {
            survivors.retain(|c| !c.is_helper());
        }

        survivors.sort_by(|a, b| rank_key(a, platform).cmp(&rank_key(b, platform)));

        self.candidates = survivors;
        self.platform = Some(platform);
    }

    /// String form of [`Verdict::filter_platform`], e.g. `("windows", "386")`.
    pub fn filter_platform_str(&mut self, os: &str, arch: &str) -> Result<(), ConfigureError> {
        let os: Os = os.parse()?;
        let arch: Arch = arch.parse()?;
        self.filter_platform(os, arch);
        Ok(())
    }

    /// True when the top two candidates tie on every ranking criterion.
    ///
    /// Only meaningful after filtering; callers should ask the user rather
    /// than pick one.
    pub fn is_ambiguous(&self) -> bool {
        let (Some(platform), [first, second, ..]) = (self.platform, self.candidates.as_slice())
        else {
            return false;
        };
        let (a, b) = (rank_key(first, platform), rank_key(second, platform));
        (a.0, a.1, a.2, a.3, a.4) == (b.0, b.1, b.2, b.3, b.4)
    }
}
