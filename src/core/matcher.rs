use crate::core::alias::AliasResolver;
use crate::core::catalog::NodeCatalog;
use crate::core::slug::slugify;
use crate::domain::model::{MatchEntry, MatchResult, MatchStrategy, TourRecord};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// 是否保留低信心（substring）的比對結果
    pub include_low_confidence: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            include_low_confidence: true,
        }
    }
}

/// 某個節點可接受的比對鍵
struct NodeKeys {
    slugs: HashSet<String>,
    name_lower: String,
    node_phrase: String,
}

impl NodeKeys {
    fn build(
        node_id: &str,
        destination_name: &str,
        aliases: &AliasResolver,
        catalog: Option<&NodeCatalog>,
    ) -> Self {
        let node_slug = slugify(node_id);
        let mut slugs: HashSet<String> = aliases
            .aliases_for(node_id)
            .iter()
            .map(|a| slugify(a))
            .collect();
        if let Some(hub) = catalog
            .and_then(|c| c.get(node_id))
            .and_then(|n| n.hub.as_deref())
        {
            slugs.insert(slugify(hub));
        }
        slugs.insert(node_slug.clone());
        slugs.remove("");

        Self {
            slugs,
            name_lower: collapse_whitespace(destination_name).to_lowercase(),
            node_phrase: node_slug.replace('-', " "),
        }
    }

    fn strategy_for(&self, tour: &TourRecord) -> Option<MatchStrategy> {
        if let Some(key) = tour.destination_key.as_deref() {
            let key_slug = slugify(key);
            if !key_slug.is_empty() && self.slugs.contains(&key_slug) {
                return Some(MatchStrategy::ExactKey);
            }
            if !self.name_lower.is_empty() && collapse_whitespace(key).to_lowercase() == self.name_lower {
                return Some(MatchStrategy::ExactName);
            }
        }

        let haystack = format!(
            "{} {}",
            tour.name,
            tour.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        let name_hit = !self.name_lower.is_empty() && haystack.contains(&self.name_lower);
        let node_hit = !self.node_phrase.is_empty() && haystack.contains(&self.node_phrase);
        (name_hit || node_hit).then_some(MatchStrategy::Substring)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// rating 由高到低（缺值排最後），再依評論數，最後保持匯入順序
fn rank(a: &TourRecord, b: &TourRecord) -> Ordering {
    fn desc<T: PartialOrd>(x: Option<T>, y: Option<T>) -> Ordering {
        match (x, y) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
    desc(a.rating, b.rating).then_with(|| desc(a.review_count, b.review_count))
}

pub struct EntityMatcher<'a> {
    aliases: &'a AliasResolver,
    catalog: Option<&'a NodeCatalog>,
    options: MatchOptions,
}

impl<'a> EntityMatcher<'a> {
    pub fn new(aliases: &'a AliasResolver) -> Self {
        Self {
            aliases,
            catalog: None,
            options: MatchOptions::default(),
        }
    }

    /// 提供節點目錄以便使用節點的 hub 鍵
    pub fn with_catalog(mut self, catalog: &'a NodeCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Decide which records belong to `node_id`.
    ///
    /// Strategies run per record in fixed order (exact key, exact name, substring) and
    /// the first hit wins. Output order is rating desc, review count desc, then the
    /// order records were ingested in. A record id is reported at most once.
    pub fn match_node(
        &self,
        node_id: &str,
        destination_name: &str,
        records: &[TourRecord],
    ) -> MatchResult {
        let keys = NodeKeys::build(node_id, destination_name, self.aliases, self.catalog);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut hits: Vec<(&TourRecord, MatchStrategy)> = Vec::new();

        for tour in records {
            if seen.contains(tour.id.as_str()) {
                continue;
            }
            let Some(strategy) = keys.strategy_for(tour) else {
                continue;
            };
            if strategy == MatchStrategy::Substring && !self.options.include_low_confidence {
                continue;
            }
            seen.insert(tour.id.as_str());
            hits.push((tour, strategy));
        }

        // sort_by 是穩定排序，相同分數保留匯入順序
        hits.sort_by(|a, b| rank(a.0, b.0));

        tracing::debug!("Node {} matched {} records", node_id, hits.len());

        MatchResult {
            node_id: node_id.to_string(),
            entries: hits
                .into_iter()
                .map(|(tour, strategy)| MatchEntry {
                    record_id: tour.id.clone(),
                    strategy,
                    confidence: strategy.confidence(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Confidence, DestinationNode, NodeStatus};

    fn catalog() -> NodeCatalog {
        NodeCatalog::load(vec![DestinationNode {
            node_id: "vegas-guide".to_string(),
            name: "Las Vegas Guide".to_string(),
            region: "nevada".to_string(),
            status: NodeStatus::Active,
            lat: Some(36.1699),
            lng: Some(-115.1398),
            timezone: Some("America/Los_Angeles".to_string()),
            hub: Some("vegas".to_string()),
        }])
        .unwrap()
    }

    fn aliases(catalog: &NodeCatalog) -> AliasResolver {
        AliasResolver::load([("las-vegas", "vegas-guide"), ("vegas", "vegas-guide")], catalog).unwrap()
    }

    fn tour(id: &str, name: &str, city: Option<&str>) -> TourRecord {
        TourRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price: None,
            rating: None,
            review_count: None,
            duration: None,
            tags: Vec::new(),
            booking_url: None,
            destination_key: city.map(str::to_string),
        }
    }

    fn rated(mut t: TourRecord, rating: Option<f64>, reviews: Option<u64>) -> TourRecord {
        t.rating = rating;
        t.review_count = reviews;
        t
    }

    #[test]
    fn test_exact_key_then_substring() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases);

        let records = vec![
            tour("hoover", "Hoover Dam Tour", Some("las-vegas")),
            tour("visit", "Visit the Hoover Dam near Las Vegas", None),
        ];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        assert_eq!(result.entries[0].record_id, "hoover");
        assert_eq!(result.entries[0].strategy, MatchStrategy::ExactKey);
        assert_eq!(result.entries[0].confidence, Confidence::High);
        assert_eq!(result.entries[1].record_id, "visit");
        assert_eq!(result.entries[1].strategy, MatchStrategy::Substring);
        assert_eq!(result.entries[1].confidence, Confidence::Low);
    }

    #[test]
    fn test_exact_key_variants() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases).with_catalog(&catalog);

        let records = vec![
            tour("by-node", "A", Some("Vegas Guide")),
            tour("by-alias", "B", Some(" VEGAS ")),
            tour("by-hub", "C", Some("vegas")),
        ];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        assert!(result
            .entries
            .iter()
            .all(|e| e.strategy == MatchStrategy::ExactKey));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_exact_name_match() {
        let catalog = catalog();
        let aliases = AliasResolver::load(Vec::<(String, String)>::new(), &catalog).unwrap();
        let matcher = EntityMatcher::new(&aliases);

        let records = vec![tour("a", "Fremont Street", Some("las   VEGAS"))];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        assert_eq!(result.entries[0].strategy, MatchStrategy::ExactName);
    }

    #[test]
    fn test_node_id_phrase_in_description() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases);

        let mut t = tour("guide", "Neon Museum", Some("henderson"));
        t.description = Some("Our Vegas Guide picks the best neon".to_string());
        let result = matcher.match_node("vegas-guide", "Las Vegas", &[t]);

        assert_eq!(result.entries[0].strategy, MatchStrategy::Substring);
    }

    #[test]
    fn test_no_match_is_empty_result() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases);

        let records = vec![tour("nola", "French Quarter Walk", Some("new-orleans"))];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        assert!(result.is_empty());
        assert_eq!(result.node_id, "vegas-guide");
    }

    #[test]
    fn test_strict_mode_drops_substring_matches() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases).with_options(MatchOptions {
            include_low_confidence: false,
        });

        let records = vec![
            tour("hoover", "Hoover Dam Tour", Some("las-vegas")),
            tour("visit", "Visit the Hoover Dam near Las Vegas", None),
        ];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        assert_eq!(result.record_ids().collect::<Vec<_>>(), vec!["hoover"]);
    }

    #[test]
    fn test_no_duplicate_ids() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases);

        let records = vec![
            tour("dup", "Las Vegas Strip at Night", None),
            tour("dup", "Hoover Dam Tour", Some("las-vegas")),
            tour("other", "Las Vegas Helicopter", Some("vegas")),
        ];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        let ids: Vec<_> = result.record_ids().collect();
        assert_eq!(ids.len(), 2);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        let dup = result.entries.iter().find(|e| e.record_id == "dup").unwrap();
        assert_eq!(dup.strategy, MatchStrategy::Substring);
    }

    #[test]
    fn test_ordering_rating_reviews_then_ingestion() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases);

        let records = vec![
            rated(tour("unrated", "A", Some("vegas")), None, Some(5000)),
            rated(tour("mid-few", "B", Some("vegas")), Some(4.5), Some(10)),
            rated(tour("top", "C", Some("vegas")), Some(4.9), None),
            rated(tour("mid-many", "D", Some("vegas")), Some(4.5), Some(900)),
            rated(tour("mid-few-2", "E", Some("vegas")), Some(4.5), Some(10)),
            rated(tour("mid-none", "F", Some("vegas")), Some(4.5), None),
        ];
        let result = matcher.match_node("vegas-guide", "Las Vegas", &records);

        assert_eq!(
            result.record_ids().collect::<Vec<_>>(),
            vec!["top", "mid-many", "mid-few", "mid-few-2", "mid-none", "unrated"]
        );
    }

    #[test]
    fn test_deterministic_output() {
        let catalog = catalog();
        let aliases = aliases(&catalog);
        let matcher = EntityMatcher::new(&aliases).with_catalog(&catalog);

        let records: Vec<TourRecord> = (0..50)
            .map(|i| {
                let city = if i % 3 == 0 { Some("vegas") } else { None };
                rated(
                    tour(&format!("t{}", i), &format!("Las Vegas tour {}", i), city),
                    Some((i % 5) as f64),
                    Some((i % 7) as u64),
                )
            })
            .collect();

        let first = serde_json::to_string(&matcher.match_node("vegas-guide", "Las Vegas", &records)).unwrap();
        let second = serde_json::to_string(&matcher.match_node("vegas-guide", "Las Vegas", &records)).unwrap();
        assert_eq!(first, second);
    }
}
