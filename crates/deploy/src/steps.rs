//! Explicit step graph for the deployment pipeline.
//!
//! Ordering invariants (mocks before their oracle consumers, every deploy
//! before minting) are edges in a static dependency graph rather than a tag
//! naming convention. A plan is the selected steps plus their transitive
//! dependencies, in topological order.

use anyhow::Result;

/// One step of the deployment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StepId {
    /// Provision mock oracle infrastructure (no-op off local networks).
    Mocks,
    /// Deploy the plain ERC-721.
    BasicNft,
    /// Publish media, deploy the randomness-backed NFT, register it against a
    /// subscription.
    RandomNft,
    /// Deploy the price-threshold SVG NFT.
    DynamicNft,
    /// Drive all three mint flows end to end.
    Mint,
}

struct StepSpec {
    id: StepId,
    tags: &'static [&'static str],
    deps: &'static [StepId],
}

/// The full pipeline, listed in a dependency-consistent order.
const STEPS: &[StepSpec] = &[
    StepSpec {
        id: StepId::Mocks,
        tags: &["all", "mocks"],
        deps: &[],
    },
    StepSpec {
        id: StepId::BasicNft,
        tags: &["all", "basic", "main"],
        deps: &[],
    },
    StepSpec {
        id: StepId::RandomNft,
        tags: &["all", "random", "main"],
        deps: &[StepId::Mocks],
    },
    StepSpec {
        id: StepId::DynamicNft,
        tags: &["all", "dynamic", "main"],
        deps: &[StepId::Mocks],
    },
    StepSpec {
        id: StepId::Mint,
        tags: &["all", "mint"],
        deps: &[StepId::BasicNft, StepId::RandomNft, StepId::DynamicNft],
    },
];

/// Resolve a tag selection into an executable plan.
///
/// Every selected step is included along with its transitive dependencies;
/// the result is topologically ordered. Unknown tags are an error.
pub fn plan(tags: &[String]) -> Result<Vec<StepId>> {
    anyhow::ensure!(
        !tags.is_empty(),
        "No tags selected; known tags are all, mocks, basic, random, dynamic, main, mint"
    );
    for tag in tags {
        if !STEPS.iter().any(|step| step.tags.contains(&tag.as_str())) {
            anyhow::bail!(
                "Unknown tag '{}'; known tags are all, mocks, basic, random, dynamic, main, mint",
                tag
            );
        }
    }

    let mut selected: Vec<StepId> = STEPS
        .iter()
        .filter(|step| tags.iter().any(|tag| step.tags.contains(&tag.as_str())))
        .map(|step| step.id)
        .collect();

    // Pull in transitive dependencies.
    let mut i = 0;
    while i < selected.len() {
        for dep in deps_of(selected[i]) {
            if !selected.contains(dep) {
                selected.push(*dep);
            }
        }
        i += 1;
    }

    // Emit in topological order. STEPS is dependency-consistent, so walking it
    // in declaration order is a valid linearization of any subset.
    Ok(STEPS
        .iter()
        .filter(|step| selected.contains(&step.id))
        .map(|step| step.id)
        .collect())
}

fn deps_of(id: StepId) -> &'static [StepId] {
    STEPS
        .iter()
        .find(|step| step.id == id)
        .map(|step| step.deps)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_for(tags: &[&str]) -> Vec<StepId> {
        plan(&tags.iter().map(|t| t.to_string()).collect::<Vec<_>>()).unwrap()
    }

    fn position(plan: &[StepId], id: StepId) -> usize {
        plan.iter().position(|s| *s == id).unwrap()
    }

    #[test]
    fn test_all_runs_everything_in_order() {
        let plan = plan_for(&["all"]);
        assert_eq!(plan.len(), 5);
        assert!(position(&plan, StepId::Mocks) < position(&plan, StepId::RandomNft));
        assert!(position(&plan, StepId::Mocks) < position(&plan, StepId::DynamicNft));
        assert_eq!(*plan.last().unwrap(), StepId::Mint);
    }

    #[test]
    fn test_mint_pulls_all_deploy_dependencies() {
        let plan = plan_for(&["mint"]);
        assert_eq!(plan.len(), 5);
        assert!(plan.contains(&StepId::Mocks));
        assert!(plan.contains(&StepId::BasicNft));
        assert!(position(&plan, StepId::RandomNft) < position(&plan, StepId::Mint));
    }

    #[test]
    fn test_random_pulls_mocks_only() {
        let plan = plan_for(&["random"]);
        assert_eq!(plan, [StepId::Mocks, StepId::RandomNft]);
    }

    #[test]
    fn test_basic_is_standalone() {
        assert_eq!(plan_for(&["basic"]), [StepId::BasicNft]);
    }

    #[test]
    fn test_overlapping_tags_do_not_duplicate_steps() {
        let plan = plan_for(&["mocks", "random", "main"]);
        let mocks_count = plan.iter().filter(|s| **s == StepId::Mocks).count();
        assert_eq!(mocks_count, 1);
        assert_eq!(
            plan,
            [
                StepId::Mocks,
                StepId::BasicNft,
                StepId::RandomNft,
                StepId::DynamicNft
            ]
        );
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert!(plan(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(plan(&[]).is_err());
    }

    #[test]
    fn test_step_display_is_kebab_case() {
        assert_eq!(StepId::RandomNft.to_string(), "random-nft");
    }
}
