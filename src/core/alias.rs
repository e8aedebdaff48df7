use crate::core::catalog::NodeCatalog;
use crate::domain::model::NodeStatus;
use crate::utils::error::{ConfigError, Result};
use std::collections::{BTreeMap, HashMap};

/// 別名查詢結果；找不到是正常情況，不是錯誤
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
}

impl Resolution {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Resolution::Found(id) => Some(id),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

fn alias_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    table: HashMap<String, String>,
    by_node: BTreeMap<String, Vec<String>>,
}

impl AliasResolver {
    /// 載入別名表並檢查參照完整性
    pub fn load<I, K, V>(entries: I, catalog: &NodeCatalog) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table: HashMap<String, String> = HashMap::new();

        for (raw_key, raw_target) in entries {
            let key = alias_key(raw_key.as_ref());
            let target = raw_target.as_ref().trim().to_string();

            if key.is_empty() {
                return Err(ConfigError::EmptyAliasKey { node_id: target }.into());
            }

            match catalog.get(&target) {
                None => {
                    return Err(ConfigError::DanglingAlias {
                        key: raw_key.as_ref().to_string(),
                        node_id: target,
                    }
                    .into())
                }
                Some(node) if node.status == NodeStatus::Inactive => {
                    return Err(ConfigError::InactiveAliasTarget {
                        key: raw_key.as_ref().to_string(),
                        node_id: target,
                    }
                    .into())
                }
                Some(_) => {}
            }

            if let Some(existing) = table.get(&key) {
                if *existing != target {
                    return Err(ConfigError::ConflictingAlias {
                        key,
                        first: existing.clone(),
                        second: target,
                    }
                    .into());
                }
                continue;
            }
            table.insert(key, target);
        }

        let mut by_node: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, node_id) in &table {
            by_node.entry(node_id.clone()).or_default().push(key.clone());
        }
        for keys in by_node.values_mut() {
            keys.sort();
        }

        tracing::debug!("Loaded {} aliases for {} nodes", table.len(), by_node.len());
        Ok(Self { table, by_node })
    }

    pub fn resolve(&self, raw_city: &str) -> Resolution {
        match self.table.get(&alias_key(raw_city)) {
            Some(node_id) => Resolution::Found(node_id.clone()),
            None => Resolution::NotFound,
        }
    }

    /// 指向某節點的所有別名（已排序）
    pub fn aliases_for(&self, node_id: &str) -> &[String] {
        self.by_node.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DestinationNode;
    use crate::utils::error::EtlError;

    fn catalog() -> NodeCatalog {
        let node = |id: &str, name: &str, status| DestinationNode {
            node_id: id.to_string(),
            name: name.to_string(),
            region: "us".to_string(),
            status,
            lat: None,
            lng: None,
            timezone: None,
            hub: None,
        };
        NodeCatalog::load(vec![
            node("vegas-guide", "Las Vegas Guide", NodeStatus::Active),
            node("new-orleans-guide", "New Orleans Guide", NodeStatus::Planned),
            node("reno-guide", "Reno Guide", NodeStatus::Inactive),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_trimmed() {
        let resolver = AliasResolver::load(
            [("las-vegas", "vegas-guide"), ("vegas", "vegas-guide")],
            &catalog(),
        )
        .unwrap();

        assert_eq!(resolver.resolve("Vegas"), Resolution::Found("vegas-guide".to_string()));
        assert_eq!(resolver.resolve("  LAS-VEGAS "), Resolution::Found("vegas-guide".to_string()));
        assert_eq!(resolver.resolve("tokyo"), Resolution::NotFound);
    }

    #[test]
    fn test_multi_word_keys_are_not_slugified() {
        let resolver = AliasResolver::load([("new orleans", "new-orleans-guide")], &catalog()).unwrap();

        assert!(resolver.resolve("New Orleans").is_found());
        assert_eq!(resolver.resolve("new-orleans"), Resolution::NotFound);
    }

    #[test]
    fn test_dangling_alias_is_fatal() {
        let err = AliasResolver::load([("tokyo", "tokyo-guide")], &catalog()).unwrap_err();
        assert!(matches!(
            err,
            EtlError::ConfigError(ConfigError::DanglingAlias { ref key, .. }) if key == "tokyo"
        ));
    }

    #[test]
    fn test_inactive_target_is_fatal() {
        let err = AliasResolver::load([("reno", "reno-guide")], &catalog()).unwrap_err();
        assert!(matches!(err, EtlError::ConfigError(ConfigError::InactiveAliasTarget { .. })));
    }

    #[test]
    fn test_conflicting_keys_are_fatal() {
        let err = AliasResolver::load(
            [("NOLA", "new-orleans-guide"), ("nola", "vegas-guide")],
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, EtlError::ConfigError(ConfigError::ConflictingAlias { .. })));
    }

    #[test]
    fn test_aliases_for_node() {
        let resolver = AliasResolver::load(
            [("vegas", "vegas-guide"), ("LV", "vegas-guide"), ("las-vegas", "vegas-guide")],
            &catalog(),
        )
        .unwrap();

        assert_eq!(resolver.aliases_for("vegas-guide"), ["las-vegas", "lv", "vegas"]);
        assert!(resolver.aliases_for("new-orleans-guide").is_empty());
        assert_eq!(resolver.len(), 3);
    }
}
