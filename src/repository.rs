use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use crate::zones::Zone;

/// Raw driver document as written by the mobile clients.
#[derive(Debug, Clone, Serialize)]
pub struct DriverRecord {
    pub id: String,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

/// Storage seam for zones and drivers. The geometry modules never see this;
/// handlers fetch plain records through it and pass them in.
pub trait FleetRepository: Send + Sync {
    fn zones_for_branch(&self, branch_id: &str) -> Vec<Zone>;
    fn put_zones(&self, branch_id: &str, zones: Vec<Zone>);
    fn driver_by_id(&self, id: &str) -> Option<DriverRecord>;
    fn put_driver(&self, id: &str, data: Value) -> DriverRecord;
    fn driver_count(&self) -> usize;
    fn zone_count(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryRepository {
    zones: DashMap<String, Vec<Zone>>,
    drivers: DashMap<String, DriverRecord>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FleetRepository for InMemoryRepository {
    fn zones_for_branch(&self, branch_id: &str) -> Vec<Zone> {
        self.zones
            .get(branch_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn put_zones(&self, branch_id: &str, zones: Vec<Zone>) {
        self.zones.insert(branch_id.to_string(), zones);
    }

    fn driver_by_id(&self, id: &str) -> Option<DriverRecord> {
        self.drivers.get(id).map(|entry| entry.value().clone())
    }

    fn put_driver(&self, id: &str, data: Value) -> DriverRecord {
        let record = DriverRecord {
            id: id.to_string(),
            data,
            updated_at: Utc::now(),
        };
        self.drivers.insert(record.id.clone(), record.clone());
        record
    }

    fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    fn zone_count(&self) -> usize {
        self.zones.iter().map(|entry| entry.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::zones::ZoneCategory;

    #[test]
    fn unknown_branch_has_no_zones() {
        let repo = InMemoryRepository::new();
        assert!(repo.zones_for_branch("missing").is_empty());
    }

    #[test]
    fn put_zones_replaces_branch_list() {
        let repo = InMemoryRepository::new();
        let zone = Zone {
            category: ZoneCategory::School,
            location: None,
            radius_meters: Some(30.0),
            speed_limit_kmh: Some(20.0),
        };

        repo.put_zones("b1", vec![zone.clone(), zone.clone()]);
        repo.put_zones("b1", vec![zone.clone()]);
        repo.put_zones("b2", vec![zone]);

        assert_eq!(repo.zones_for_branch("b1").len(), 1);
        assert_eq!(repo.zone_count(), 2);
    }

    #[test]
    fn drivers_round_trip_by_id() {
        let repo = InMemoryRepository::new();
        repo.put_driver("d1", json!({ "speed": 12 }));

        let record = repo.driver_by_id("d1").unwrap();
        assert_eq!(record.data["speed"], 12);
        assert!(repo.driver_by_id("d2").is_none());
        assert_eq!(repo.driver_count(), 1);
    }
}
