use crate::core::geo::haversine_km;
use crate::core::slug::slugify;
use crate::domain::model::{Neighbor, PortRecord};
use crate::utils::error::{ConfigError, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 門檻邊界的浮點容差 (km)
pub const BOUNDARY_TOLERANCE_KM: f64 = 1e-6;

pub fn validate_threshold(threshold_km: f64) -> Result<()> {
    if threshold_km.is_finite() && threshold_km > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold {
            value: threshold_km,
        }
        .into())
    }
}

fn by_distance_then_id(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance_km
        .partial_cmp(&b.distance_km)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id))
}

/// Link every pair of ports at most `threshold_km` apart.
///
/// Returns new records with `neighbors` filled in; the input is left untouched.
/// Each pair's distance is computed once and written to both sides.
pub fn build_neighbors(ports: &[PortRecord], threshold_km: f64) -> Result<Vec<PortRecord>> {
    validate_threshold(threshold_km)?;

    let mut lists: Vec<Vec<Neighbor>> = vec![Vec::new(); ports.len()];
    let mut links = 0usize;

    for i in 0..ports.len() {
        for j in (i + 1)..ports.len() {
            let (a, b) = (&ports[i], &ports[j]);
            if a.id == b.id {
                continue;
            }
            let distance_km = haversine_km(a.lat, a.lng, b.lat, b.lng);
            if distance_km <= threshold_km + BOUNDARY_TOLERANCE_KM {
                lists[i].push(Neighbor {
                    id: b.id.clone(),
                    distance_km,
                });
                lists[j].push(Neighbor {
                    id: a.id.clone(),
                    distance_km,
                });
                links += 1;
            }
        }
    }

    tracing::debug!(
        "Neighbor graph: {} ports, {} links within {} km",
        ports.len(),
        links,
        threshold_km
    );

    Ok(ports
        .iter()
        .zip(lists)
        .map(|(port, mut neighbors)| {
            neighbors.sort_by(by_distance_then_id);
            PortRecord {
                neighbors,
                ..port.clone()
            }
        })
        .collect())
}

/// 依 region（slug）分組港口 id，供區域列表使用
pub fn group_by_region(ports: &[PortRecord]) -> BTreeMap<String, Vec<String>> {
    let mut regions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for port in ports {
        let region = slugify(&port.region);
        if region.is_empty() {
            continue;
        }
        regions.entry(region).or_default().push(port.id.clone());
    }
    for ids in regions.values_mut() {
        ids.sort();
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    fn port(id: &str, lat: f64, lng: f64) -> PortRecord {
        PortRecord {
            id: id.to_string(),
            name: id.to_string(),
            city: id.to_string(),
            region: "Caribbean".to_string(),
            country: "X".to_string(),
            lat,
            lng,
            passenger_volume: None,
            notes: None,
            tags: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    fn neighbor_ids(p: &PortRecord) -> Vec<&str> {
        p.neighbors.iter().map(|n| n.id.as_str()).collect()
    }

    fn assert_symmetric(ports: &[PortRecord]) {
        for a in ports {
            for n in &a.neighbors {
                let b = ports.iter().find(|p| p.id == n.id).unwrap();
                let back = b.neighbors.iter().find(|m| m.id == a.id);
                assert!(back.is_some(), "{} -> {} has no reverse link", a.id, b.id);
                assert_eq!(back.unwrap().distance_km, n.distance_km);
            }
        }
    }

    #[test]
    fn test_miami_nassau_thresholds() {
        let ports = vec![port("miami", 25.7617, -80.1918), port("nassau", 25.0343, -77.3963)];

        let near = build_neighbors(&ports, 200.0).unwrap();
        assert!(near.iter().all(|p| p.neighbors.is_empty()));

        let far = build_neighbors(&ports, 300.0).unwrap();
        assert_eq!(neighbor_ids(&far[0]), vec!["nassau"]);
        assert_eq!(neighbor_ids(&far[1]), vec!["miami"]);
        assert!((far[0].neighbors[0].distance_km - 292.2).abs() < 1.0);
        assert_symmetric(&far);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let ports = vec![port("a", 0.0, 0.0), port("b", 0.0, 1.0)];
        let exact = haversine_km(0.0, 0.0, 0.0, 1.0);

        let linked = build_neighbors(&ports, exact).unwrap();
        assert_eq!(neighbor_ids(&linked[0]), vec!["b"]);
        assert_eq!(neighbor_ids(&linked[1]), vec!["a"]);
        assert_symmetric(&linked);

        let just_inside_tolerance = build_neighbors(&ports, exact - 5e-7).unwrap();
        assert_eq!(neighbor_ids(&just_inside_tolerance[0]), vec!["b"]);

        let below = build_neighbors(&ports, exact - 1e-3).unwrap();
        assert!(below[0].neighbors.is_empty());
        assert!(below[1].neighbors.is_empty());
    }

    #[test]
    fn test_sorted_by_distance_then_id() {
        let ports = vec![
            port("hub", 0.0, 0.0),
            port("far", 0.0, 1.5),
            port("zeta", 0.0, 0.5),
            port("alpha", 0.0, -0.5),
        ];
        let linked = build_neighbors(&ports, 500.0).unwrap();

        assert_eq!(neighbor_ids(&linked[0]), vec!["alpha", "zeta", "far"]);
        assert_symmetric(&linked);
        assert!(linked.iter().all(|p| !neighbor_ids(p).contains(&p.id.as_str())));
    }

    #[test]
    fn test_input_not_mutated_and_order_preserved() {
        let ports = vec![port("b", 10.0, 10.0), port("a", 10.0, 10.1)];
        let linked = build_neighbors(&ports, 50.0).unwrap();

        assert!(ports.iter().all(|p| p.neighbors.is_empty()));
        assert_eq!(linked[0].id, "b");
        assert_eq!(linked[1].id, "a");
    }

    #[test]
    fn test_symmetry_on_a_grid() {
        let ports: Vec<PortRecord> = (0..30)
            .map(|i| port(&format!("p{:02}", i), (i % 6) as f64 * 0.7, (i / 6) as f64 * 0.9))
            .collect();
        for threshold in [50.0, 100.0, 150.0, 400.0] {
            assert_symmetric(&build_neighbors(&ports, threshold).unwrap());
        }
    }

    #[test]
    fn test_invalid_threshold_is_config_error() {
        let ports = vec![port("a", 0.0, 0.0)];
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = build_neighbors(&ports, bad).unwrap_err();
            assert!(matches!(err, EtlError::ConfigError(ConfigError::InvalidThreshold { .. })));
        }
    }

    #[test]
    fn test_group_by_region() {
        let mut ports = vec![port("nassau", 0.0, 0.0), port("cozumel", 0.0, 0.0), port("juneau", 0.0, 0.0)];
        ports[2].region = "Alaska".to_string();
        ports[0].region = "  caribbean ".to_string();

        let regions = group_by_region(&ports);
        assert_eq!(regions["caribbean"], vec!["cozumel", "nassau"]);
        assert_eq!(regions["alaska"], vec!["juneau"]);
    }
}
