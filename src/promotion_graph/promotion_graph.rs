use crate::profile::{Profile, ProfileError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Profiles indexed by application name, linked through `upstream`.
///
/// Each profile has at most one upstream, so every connected part of the
/// graph is a tree rooted at a profile without an upstream, unless a cycle
/// is present. Downstream links are never stored; they are derived by
/// scanning for profiles whose upstream names the profile in question.
#[derive(Debug, Default)]
pub struct PromotionGraph {
    profiles: BTreeMap<String, Profile>,
}

impl PromotionGraph {
    pub fn new(profiles: Vec<Profile>) -> Result<Self, ProfileError> {
        let mut indexed = BTreeMap::new();
        for profile in profiles {
            let name = profile.name().to_string();
            if indexed.insert(name.clone(), profile).is_some() {
                return Err(ProfileError::DuplicateProfile { name });
            }
        }
        Ok(Self { profiles: indexed })
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profiles in name order.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    /// The resolved upstream profile, if it exists in the graph.
    pub fn upstream_of(&self, name: &str) -> Option<&Profile> {
        self.get(name)
            .and_then(Profile::upstream)
            .and_then(|upstream| self.get(upstream))
    }

    /// Profiles promoted from `name`, in name order.
    pub fn downstream_of(&self, name: &str) -> Vec<&Profile> {
        self.profiles
            .values()
            .filter(|profile| profile.upstream() == Some(name))
            .collect()
    }

    /// Profiles that start a promotion chain: no upstream, or an upstream
    /// that is not part of the graph.
    pub fn roots(&self) -> Vec<&Profile> {
        self.profiles
            .values()
            .filter(|profile| match profile.upstream() {
                Some(upstream) => !self.contains(upstream),
                None => true,
            })
            .collect()
    }

    /// Every graph-level issue: unresolved upstreams, then cycles.
    pub fn validate(&self) -> Vec<ProfileError> {
        let mut issues: Vec<ProfileError> = self
            .profiles
            .values()
            .filter_map(|profile| {
                let upstream = profile.upstream()?;
                (!self.contains(upstream)).then(|| ProfileError::UnknownUpstream {
                    name: profile.name().to_string(),
                    upstream: upstream.to_string(),
                })
            })
            .collect();

        issues.extend(self.cycles().into_iter().map(ProfileError::Cycle));
        issues
    }

    /// Each cycle once, starting from its smallest name and closed by
    /// repeating that name.
    fn cycles(&self) -> Vec<Vec<String>> {
        let mut found = BTreeSet::new();
        let mut done: HashSet<&str> = HashSet::new();

        for start in self.profiles.keys() {
            let mut path: Vec<&str> = Vec::new();
            let mut on_path: HashMap<&str, usize> = HashMap::new();
            let mut current = start.as_str();

            loop {
                if done.contains(current) {
                    break;
                }
                if let Some(&index) = on_path.get(current) {
                    found.insert(normalize_cycle(&path[index..]));
                    break;
                }
                on_path.insert(current, path.len());
                path.push(current);
                match self.get(current).and_then(Profile::upstream) {
                    Some(upstream) if self.contains(upstream) => current = upstream,
                    _ => break,
                }
            }

            done.extend(path);
        }

        found.into_iter().collect()
    }

    /// Depth-first from each root in name order, downstream profiles in
    /// name order, so every profile follows its upstream.
    pub fn promotion_order(&self) -> Result<Vec<&Profile>, ProfileError> {
        if let Some(cycle) = self.cycles().into_iter().next() {
            return Err(ProfileError::Cycle(cycle));
        }

        let mut order = Vec::with_capacity(self.profiles.len());
        let mut stack: Vec<&Profile> = self.roots().into_iter().rev().collect();
        while let Some(profile) = stack.pop() {
            order.push(profile);
            stack.extend(self.downstream_of(profile.name()).into_iter().rev());
        }
        Ok(order)
    }
}

fn normalize_cycle(members: &[&str]) -> Vec<String> {
    let start = members
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| **name)
        .map(|(index, _)| index)
        .unwrap_or(0);

    let mut cycle: Vec<String> = members[start..]
        .iter()
        .chain(&members[..start])
        .map(|name| name.to_string())
        .collect();
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}
