use serde::{Deserialize, Serialize};

/// Role a node currently plays in the cluster.
///
/// The only transition is `Worker` → `Master`, on promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRole {
    Master,
    Worker { master_id: String },
}

impl NodeRole {
    /// An empty master id means the node starts as master.
    pub fn from_master_id(master_id: &str) -> Self {
        if master_id.is_empty() {
            NodeRole::Master
        } else {
            NodeRole::Worker {
                master_id: master_id.to_string(),
            }
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, NodeRole::Master)
    }

    pub fn master_id(&self) -> Option<&str> {
        match self {
            NodeRole::Master => None,
            NodeRole::Worker { master_id } => Some(master_id),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeRole::Master => "master",
            NodeRole::Worker { .. } => "worker",
        }
    }
}

/// Identity payload for registration and master-id announcements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_id: Option<String>,
    pub workers: Vec<String>,
}
