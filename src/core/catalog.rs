use crate::domain::model::DestinationNode;
use crate::utils::error::{ConfigError, Result};
use std::collections::HashMap;

/// 已驗證的目的地節點快照（唯讀）
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    nodes: Vec<DestinationNode>,
    index: HashMap<String, usize>,
}

impl NodeCatalog {
    /// 載入並檢查節點 id 唯一性；重複或空白 id 為致命錯誤
    pub fn load(nodes: Vec<DestinationNode>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            if node.node_id.trim().is_empty() {
                return Err(ConfigError::EmptyNodeId { index: i }.into());
            }
            if index.insert(node.node_id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateNode {
                    node_id: node.node_id.clone(),
                }
                .into());
            }
        }

        tracing::debug!("Loaded {} destination nodes", nodes.len());
        Ok(Self { nodes, index })
    }

    pub fn get(&self, node_id: &str) -> Option<&DestinationNode> {
        self.index.get(node_id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    pub fn nodes(&self) -> &[DestinationNode] {
        &self.nodes
    }

    pub fn active(&self) -> impl Iterator<Item = &DestinationNode> {
        self.nodes.iter().filter(|n| n.is_active())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NodeStatus;
    use crate::utils::error::EtlError;

    fn node(id: &str, status: NodeStatus) -> DestinationNode {
        DestinationNode {
            node_id: id.to_string(),
            name: format!("{} Guide", id),
            region: "test".to_string(),
            status,
            lat: None,
            lng: None,
            timezone: None,
            hub: None,
        }
    }

    #[test]
    fn test_load_indexes_nodes() {
        let catalog = NodeCatalog::load(vec![
            node("vegas-guide", NodeStatus::Active),
            node("denver-guide", NodeStatus::Planned),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("denver-guide"));
        assert_eq!(catalog.active().count(), 1);
        assert_eq!(catalog.get("vegas-guide").unwrap().status, NodeStatus::Active);
    }

    #[test]
    fn test_duplicate_node_is_fatal() {
        let err = NodeCatalog::load(vec![
            node("vegas-guide", NodeStatus::Active),
            node("vegas-guide", NodeStatus::Inactive),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            EtlError::ConfigError(ConfigError::DuplicateNode { ref node_id }) if node_id == "vegas-guide"
        ));
    }

    #[test]
    fn test_empty_node_id_is_fatal() {
        let err = NodeCatalog::load(vec![node("  ", NodeStatus::Active)]).unwrap_err();
        assert!(matches!(err, EtlError::ConfigError(ConfigError::EmptyNodeId { index: 0 })));
    }
}
