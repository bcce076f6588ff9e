//! Product-version gating of the metric-name listings.
//!
//! Releases before 3.0.0 export one flat listing per component. From 3.0.0
//! on, graphd splits its metrics into a space-less listing and a
//! space-scoped one, fetched with two separate selectors.

use crate::datamodel::ServiceKind;
use crate::promql::{self, SpaceFilter};
use regex::Regex;
use std::sync::OnceLock;

/// Version that introduced space-scoped graphd metrics.
const SPACE_METRICS_VERSION: ProductVersion = ProductVersion {
    major: 3,
    minor: 0,
    patch: 0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProductVersion {
    /// Parse a reported version string. Vendor decorations like a leading
    /// `v` or an `-ent` suffix are ignored. Unparsable strings yield
    /// `None`; callers treat that as the newest scheme, since a wrong
    /// guess only changes which listing is issued.
    pub fn parse(version: &str) -> Option<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let re = VERSION_RE
            .get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("static regex must parse"));
        let captures = re.captures(version)?;
        Some(Self {
            major: captures[1].parse().ok()?,
            minor: captures[2].parse().ok()?,
            patch: captures[3].parse().ok()?,
        })
    }

    pub fn has_space_metrics(&self) -> bool {
        *self >= SPACE_METRICS_VERSION
    }
}

/// The `match[]` selectors to issue for one component's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPlan {
    pub primary: String,
    /// Only present for graphd on releases with space-scoped metrics.
    pub space_scoped: Option<String>,
}

pub fn listing_plan(kind: ServiceKind, version: &str, cluster_id: Option<&str>) -> ListingPlan {
    let modern = ProductVersion::parse(version)
        .map(|v| v.has_space_metrics())
        .unwrap_or(true);

    if !modern {
        return ListingPlan {
            primary: promql::listing_selector(kind, SpaceFilter::Ignore, cluster_id),
            space_scoped: None,
        };
    }

    match kind {
        ServiceKind::Graphd => ListingPlan {
            primary: promql::listing_selector(kind, SpaceFilter::Empty, cluster_id),
            space_scoped: Some(promql::listing_selector(kind, SpaceFilter::NonEmpty, cluster_id)),
        },
        _ => ListingPlan {
            primary: promql::listing_selector(kind, SpaceFilter::Ignore, cluster_id),
            space_scoped: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            ProductVersion::parse("3.4.1"),
            Some(ProductVersion { major: 3, minor: 4, patch: 1 })
        );
        assert_eq!(
            ProductVersion::parse("v2.6.1-ent"),
            Some(ProductVersion { major: 2, minor: 6, patch: 1 })
        );
        assert_eq!(ProductVersion::parse("nightly"), None);
    }

    #[test]
    fn test_space_metrics_threshold() {
        assert!(!ProductVersion::parse("2.6.1").unwrap().has_space_metrics());
        assert!(ProductVersion::parse("3.0.0").unwrap().has_space_metrics());
        assert!(ProductVersion::parse("3.8.0").unwrap().has_space_metrics());
    }

    #[test]
    fn test_listing_plan_legacy() {
        let plan = listing_plan(ServiceKind::Graphd, "2.5.1", None);
        assert_eq!(
            plan.primary,
            r#"{componentType="graphd",__name__!~"ALERTS.*",__name__!~".*count"}"#
        );
        assert!(plan.space_scoped.is_none());
    }

    #[test]
    fn test_listing_plan_modern_graphd() {
        let plan = listing_plan(ServiceKind::Graphd, "3.4.0", Some("7"));
        assert_eq!(
            plan.primary,
            r#"{componentType="graphd",space="",__name__!~"ALERTS.*",__name__!~".*count",nebula_cluster="7"}"#
        );
        assert_eq!(
            plan.space_scoped.unwrap(),
            r#"{componentType="graphd",space!="",__name__!~"ALERTS.*",__name__!~".*count",nebula_cluster="7"}"#
        );
    }

    #[test]
    fn test_listing_plan_modern_storaged() {
        let plan = listing_plan(ServiceKind::Storaged, "3.4.0", None);
        assert_eq!(
            plan.primary,
            r#"{componentType="storaged",__name__!~"ALERTS.*",__name__!~".*count"}"#
        );
        assert!(plan.space_scoped.is_none());
    }

    #[test]
    fn test_unparsable_version_uses_newest_scheme() {
        let plan = listing_plan(ServiceKind::Graphd, "unknown", None);
        assert!(plan.space_scoped.is_some());
    }
}
