use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// The cluster components that export metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ServiceKind {
    #[serde(rename = "graphd")]
    Graphd,
    #[serde(rename = "storaged")]
    Storaged,
    #[serde(rename = "metad")]
    Metad,
    #[serde(rename = "metad-listener")]
    MetadListener,
    #[serde(rename = "storaged-listener")]
    StoragedListener,
    #[serde(rename = "drainer")]
    Drainer,
}

impl ServiceKind {
    /// The three core services that always run in a cluster.
    pub const CORE: [ServiceKind; 3] =
        [ServiceKind::Graphd, ServiceKind::Storaged, ServiceKind::Metad];

    /// The value of the `componentType` label on exported series.
    pub fn component_type(&self) -> &'static str {
        match self {
            ServiceKind::Graphd => "graphd",
            ServiceKind::Storaged => "storaged",
            ServiceKind::Metad => "metad",
            ServiceKind::MetadListener => "metad-listener",
            ServiceKind::StoragedListener => "storaged-listener",
            ServiceKind::Drainer => "drainer",
        }
    }

    /// The component name as it appears inside exported metric names,
    /// where dashes become underscores.
    pub fn name_infix(&self) -> String {
        self.component_type().replace('-', "_")
    }

    pub fn from_component_type(s: &str) -> Option<Self> {
        match s {
            "graphd" => Some(ServiceKind::Graphd),
            "storaged" => Some(ServiceKind::Storaged),
            "metad" => Some(ServiceKind::Metad),
            "metad-listener" => Some(ServiceKind::MetadListener),
            "storaged-listener" => Some(ServiceKind::StoragedListener),
            "drainer" => Some(ServiceKind::Drainer),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_infix() {
        assert_eq!(ServiceKind::Graphd.name_infix(), "graphd");
        assert_eq!(ServiceKind::MetadListener.name_infix(), "metad_listener");
    }

    #[test]
    fn test_component_type_round_trip() {
        for kind in [
            ServiceKind::Graphd,
            ServiceKind::Storaged,
            ServiceKind::Metad,
            ServiceKind::MetadListener,
            ServiceKind::StoragedListener,
            ServiceKind::Drainer,
        ] {
            assert_eq!(ServiceKind::from_component_type(kind.component_type()), Some(kind));
        }
        assert_eq!(ServiceKind::from_component_type("graph"), None);
    }
}
