//! Heterogeneous raw tour/port records → canonical records.
//!
//! Every canonical field has a fixed candidate list. The first candidate that is
//! present (not null, not an empty string) wins and is then coerced; a failed
//! coercion yields `None` plus a data-quality issue instead of falling through.

use crate::core::slug::slugify;
use crate::domain::model::{
    DataQualityIssue, IssueKind, NormalizeOutcome, PassengerVolume, PortRecord, Price, Record,
    RecordKind, RejectReason, Rejection, TourRecord,
};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

const TOUR_ID: &[&str] = &["id", "productCode", "product_code", "code"];
const TOUR_NAME: &[&str] = &["name", "title", "productTitle"];
const TOUR_DESCRIPTION: &[&str] = &["description", "shortDescription", "short_description", "summary"];
const PRICE_FLAT: &[&str] = &["price_from", "priceFrom", "fromPrice", "price"];
const PRICE_NESTED: &[&str] = &["pricing.summary.fromPrice", "pricing.fromPrice", "price.from"];
const CURRENCY: &[&str] = &["currency", "pricing.currency", "price.currency"];
const RATING: &[&str] = &[
    "rating",
    "reviewRating",
    "reviews.combinedAverageRating",
    "reviewSummary.rating",
];
const REVIEW_COUNT: &[&str] = &[
    "review_count",
    "reviewCount",
    "reviews",
    "reviews.totalReviews",
    "reviewSummary.reviewCount",
];
const DURATION: &[&str] = &["duration", "itinerary.duration", "productDuration", "durationFrom"];
const TOUR_TAGS: &[&str] = &["tags", "productTags", "categories"];
const BOOKING_URL: &[&str] = &[
    "booking_url",
    "bookingUrl",
    "viatorUrl",
    "webURL",
    "productUrl",
    "affiliateUrl",
    "url",
];
const DESTINATION_KEY: &[&str] = &[
    "dcc.node",
    "dcc.hub",
    "dcc.destinationSlug",
    "dcc.citySlug",
    "hub",
    "citySlug",
    "destinationSlug",
    "destination",
    "city",
];

const PORT_ID: &[&str] = &["id", "slug", "port_id"];
const PORT_NAME: &[&str] = &["name", "port_name", "portName"];
const LATITUDE: &[&str] = &["lat", "latitude", "coordinates.lat"];
const LONGITUDE: &[&str] = &["lng", "lon", "longitude", "coordinates.lng"];
const PASSENGER_VOLUME: &[&str] = &["passenger_volume", "passengerVolume"];
const VOLUME_YEAR: &[&str] = &["volume_year", "volumeYear"];
const NOTES: &[&str] = &["notes", "operational_notes"];

pub const DEFAULT_CURRENCY: &str = "USD";
pub const MAX_TAGS: usize = 10;

/// 外層包裝的陣列欄位（依序嘗試）
const ENVELOPE_KEYS: &[&str] = &["tours", "items", "results", "products", "data", "data.products", "default"];

/// 拆開各種來源的集合包裝，回傳記錄陣列
pub fn unwrap_collection(value: Value) -> Vec<Value> {
    let obj = match value {
        Value::Array(items) => return items,
        Value::Object(obj) => obj,
        _ => return Vec::new(),
    };

    let wrapper = Record {
        data: obj.into_iter().collect(),
    };
    for key in ENVELOPE_KEYS {
        if let Some(Value::Array(items)) = wrapper.get_path(key) {
            return items.clone();
        }
    }

    if !wrapper.data.is_empty() && wrapper.data.values().all(Value::is_object) {
        let mut keyed: Vec<(String, Value)> = wrapper.data.into_iter().collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        return keyed.into_iter().map(|(_, v)| v).collect();
    }

    tracing::warn!("⚠️ Unrecognized collection shape, no records extracted");
    Vec::new()
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// 數值轉換：非數字一律回傳 None，絕不回傳 0
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_whole(value: &Value) -> Option<f64> {
    coerce_number(value).filter(|n| n.fract() == 0.0)
}

struct FieldResolver<'a> {
    record: &'a Record,
    pending: Vec<(&'static str, IssueKind)>,
}

impl<'a> FieldResolver<'a> {
    fn new(record: &'a Record) -> Self {
        Self {
            record,
            pending: Vec::new(),
        }
    }

    fn flag(&mut self, field: &'static str, issue: IssueKind) {
        self.pending.push((field, issue));
    }

    /// 第一個存在的純量候選值
    fn pick(&self, paths: &[&str]) -> Option<&'a Value> {
        paths
            .iter()
            .filter_map(|p| self.record.get_path(p))
            .find(|v| is_scalar(v) && is_present(v))
    }

    fn pick_any(&self, paths: &[&str]) -> Option<&'a Value> {
        paths
            .iter()
            .filter_map(|p| self.record.get_path(p))
            .find(|v| is_present(v))
    }

    fn text(&mut self, field: &'static str, paths: &[&str]) -> Option<String> {
        let value = self.pick(paths)?;
        let text = coerce_text(value);
        if text.is_none() {
            self.flag(field, IssueKind::Unparseable);
        }
        text
    }

    fn required_text(&mut self, field: &'static str, paths: &[&str]) -> String {
        match self.text(field, paths) {
            Some(text) => text,
            None => {
                if self.pick(paths).is_none() {
                    self.flag(field, IssueKind::Missing);
                }
                String::new()
            }
        }
    }

    fn number_from(&mut self, field: &'static str, value: Option<&Value>) -> Option<f64> {
        let value = value?;
        let n = coerce_number(value);
        if n.is_none() {
            self.flag(field, IssueKind::Unparseable);
        }
        n
    }

    fn number(&mut self, field: &'static str, paths: &[&str]) -> Option<f64> {
        let value = self.pick(paths);
        self.number_from(field, value)
    }

    fn count(&mut self, field: &'static str, paths: &[&str]) -> Option<u64> {
        let value = self.pick(paths)?;
        match coerce_whole(value) {
            Some(n) if n >= 0.0 && n <= u64::MAX as f64 => Some(n as u64),
            Some(_) => {
                self.flag(field, IssueKind::OutOfRange);
                None
            }
            None => {
                self.flag(field, IssueKind::Unparseable);
                None
            }
        }
    }

    fn tags(&mut self, paths: &[&str]) -> Vec<String> {
        let Some(value) = self.pick_any(paths) else {
            return Vec::new();
        };

        let raw: Vec<String> = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => obj.get("name").and_then(coerce_text),
                    other => coerce_text(other),
                })
                .collect(),
            Value::String(s) => s.split('|').map(str::to_string).collect(),
            _ => {
                self.flag("tags", IssueKind::Unparseable);
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        raw.iter()
            .map(|t| slugify(t))
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .take(MAX_TAGS)
            .collect()
    }

    fn finish(self, kind: RecordKind, record_id: &str, out: &mut Vec<DataQualityIssue>) {
        out.extend(self.pending.into_iter().map(|(field, issue)| DataQualityIssue {
            record_kind: kind,
            record_id: record_id.to_string(),
            field: field.to_string(),
            issue,
        }));
    }
}

/// id 與名稱：兩者皆缺才拒收
///
/// 名稱無法產生 slug 時（例如只有符號），以 `<kind>-<index>` 作為 id。
fn resolve_identity(
    fields: &mut FieldResolver<'_>,
    id_paths: &[&str],
    name_paths: &[&str],
    kind: RecordKind,
    index: usize,
) -> Option<(String, String)> {
    let name = fields.text("name", name_paths);
    let id = fields
        .text("id", id_paths)
        .or_else(|| name.as_deref().map(slugify).filter(|s| !s.is_empty()));

    match (id, name) {
        (Some(id), Some(name)) => Some((id, name)),
        (Some(id), None) => {
            fields.flag("name", IssueKind::Missing);
            Some((id.clone(), id))
        }
        (None, Some(name)) => {
            fields.flag("id", IssueKind::Missing);
            Some((format!("{}-{}", kind, index), name))
        }
        (None, None) => None,
    }
}

fn booking_url(fields: &mut FieldResolver<'_>) -> Option<String> {
    let raw = fields.text("booking_url", BOOKING_URL)?;
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        _ => {
            fields.flag("booking_url", IssueKind::Unparseable);
            None
        }
    }
}

/// 將單筆原始記錄轉成 TourRecord
pub fn normalize_tour(
    record: &Record,
    index: usize,
    issues: &mut Vec<DataQualityIssue>,
) -> std::result::Result<TourRecord, RejectReason> {
    let mut fields = FieldResolver::new(record);
    let (id, name) = resolve_identity(&mut fields, TOUR_ID, TOUR_NAME, RecordKind::Tour, index)
        .ok_or(RejectReason::MissingIdentity)?;

    let description = fields.text("description", TOUR_DESCRIPTION);

    let price_value = fields.pick(PRICE_FLAT).or_else(|| fields.pick(PRICE_NESTED));
    let price = fields.number_from("price", price_value).map(|amount| Price {
        amount,
        currency: fields
            .pick(CURRENCY)
            .and_then(coerce_text)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    });

    let rating = match fields.number("rating", RATING) {
        Some(r) if (0.0..=5.0).contains(&r) => Some(r),
        Some(_) => {
            fields.flag("rating", IssueKind::OutOfRange);
            None
        }
        None => None,
    };

    let review_count = fields.count("review_count", REVIEW_COUNT);
    let duration = fields.text("duration", DURATION);
    let tags = fields.tags(TOUR_TAGS);
    let booking_url = booking_url(&mut fields);

    let destination_key = fields.text("destination_key", DESTINATION_KEY);
    if destination_key.is_none() {
        fields.flag("destination_key", IssueKind::Missing);
    }

    fields.finish(RecordKind::Tour, &id, issues);

    Ok(TourRecord {
        id,
        name,
        description,
        price,
        rating,
        review_count,
        duration,
        tags,
        booking_url,
        destination_key,
    })
}

/// 將單筆原始記錄轉成 PortRecord（座標為必填）
pub fn normalize_port(
    record: &Record,
    index: usize,
    issues: &mut Vec<DataQualityIssue>,
) -> std::result::Result<PortRecord, RejectReason> {
    let mut fields = FieldResolver::new(record);
    let (id, name) = resolve_identity(&mut fields, PORT_ID, PORT_NAME, RecordKind::Port, index)
        .ok_or(RejectReason::MissingIdentity)?;

    let lat = fields.pick(LATITUDE).and_then(coerce_number);
    let lng = fields.pick(LONGITUDE).and_then(coerce_number);
    let (lat, lng) = match (lat, lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(RejectReason::MissingCoordinates),
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(RejectReason::InvalidCoordinates { lat, lng });
    }

    let city = fields.required_text("city", &["city"]);
    let region = fields.required_text("region", &["region"]);
    let country = fields.required_text("country", &["country", "country_name", "iso_country"]);

    let passenger_volume = fields
        .count("passenger_volume", PASSENGER_VOLUME)
        .map(|count| PassengerVolume {
            count,
            year: fields
                .pick(VOLUME_YEAR)
                .and_then(coerce_whole)
                .filter(|y| *y >= i32::MIN as f64 && *y <= i32::MAX as f64)
                .map(|y| y as i32),
        });

    let notes = fields.text("notes", NOTES).or_else(|| {
        let parts: Vec<String> = ["dock_notes", "seasonal_notes"]
            .iter()
            .filter_map(|p| fields.pick(&[*p]).and_then(coerce_text))
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    });

    let tags = fields.tags(&["tags"]);

    fields.finish(RecordKind::Port, &id, issues);

    Ok(PortRecord {
        id,
        name,
        city,
        region,
        country,
        lat,
        lng,
        passenger_volume,
        notes,
        tags,
        neighbors: Vec::new(),
    })
}

pub fn normalize_tours(raw: &[Value]) -> NormalizeOutcome<TourRecord> {
    let mut outcome = NormalizeOutcome {
        records: Vec::with_capacity(raw.len()),
        rejections: Vec::new(),
        issues: Vec::new(),
    };
    let mut seen = HashSet::new();

    for (index, value) in raw.iter().enumerate() {
        let Some(record) = Record::from_value(value.clone()) else {
            outcome.rejections.push(Rejection {
                kind: RecordKind::Tour,
                index,
                reason: RejectReason::NotAnObject,
            });
            continue;
        };

        match normalize_tour(&record, index, &mut outcome.issues) {
            Ok(tour) => {
                if !seen.insert(tour.id.clone()) {
                    outcome.issues.push(DataQualityIssue {
                        record_kind: RecordKind::Tour,
                        record_id: tour.id.clone(),
                        field: "id".to_string(),
                        issue: IssueKind::DuplicateId,
                    });
                }
                outcome.records.push(tour);
            }
            Err(reason) => {
                tracing::debug!("Rejected tour at index {}: {:?}", index, reason);
                outcome.rejections.push(Rejection {
                    kind: RecordKind::Tour,
                    index,
                    reason,
                });
            }
        }
    }

    outcome
}

pub fn normalize_ports(raw: &[Value]) -> NormalizeOutcome<PortRecord> {
    let mut outcome = NormalizeOutcome {
        records: Vec::with_capacity(raw.len()),
        rejections: Vec::new(),
        issues: Vec::new(),
    };
    let mut seen = HashSet::new();

    for (index, value) in raw.iter().enumerate() {
        let result = match Record::from_value(value.clone()) {
            Some(record) => normalize_port(&record, index, &mut outcome.issues),
            None => Err(RejectReason::NotAnObject),
        };

        let result = result.and_then(|port| {
            if seen.insert(port.id.clone()) {
                Ok(port)
            } else {
                Err(RejectReason::DuplicateIdentifier { id: port.id })
            }
        });

        match result {
            Ok(port) => outcome.records.push(port),
            Err(reason) => {
                tracing::debug!("Rejected port at index {}: {:?}", index, reason);
                outcome.rejections.push(Rejection {
                    kind: RecordKind::Port,
                    index,
                    reason,
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tour(value: Value) -> (std::result::Result<TourRecord, RejectReason>, Vec<DataQualityIssue>) {
        let mut issues = Vec::new();
        let record = Record::from_value(value).unwrap();
        (normalize_tour(&record, 0, &mut issues), issues)
    }

    #[test]
    fn test_simple_shape() {
        let (result, _) = tour(json!({
            "id": "hoover-dam",
            "name": "Hoover Dam Tour",
            "city": "las-vegas",
            "price_from": 129,
            "rating": 4.7,
            "review_count": 2210,
            "duration": "5 hours",
            "tags": ["Hoover Dam", "Day Trips"]
        }));
        let t = result.unwrap();

        assert_eq!(t.id, "hoover-dam");
        assert_eq!(t.price, Some(Price { amount: 129.0, currency: "USD".to_string() }));
        assert_eq!(t.rating, Some(4.7));
        assert_eq!(t.review_count, Some(2210));
        assert_eq!(t.tags, vec!["hoover-dam", "day-trips"]);
        assert_eq!(t.destination_key.as_deref(), Some("las-vegas"));
    }

    #[test]
    fn test_viator_shape_with_nested_fields() {
        let (result, _) = tour(json!({
            "productCode": 12345,
            "title": "Grand Canyon West Rim",
            "shortDescription": "Skywalk optional",
            "pricing": { "summary": { "fromPrice": "89.50" }, "currency": "eur" },
            "reviews": { "combinedAverageRating": 4.5, "totalReviews": 87 },
            "webURL": "https://www.viator.com/tours/12345",
            "categories": [{ "name": "Bus Tours" }, "Day Trips"],
            "dcc": { "node": "vegas-guide" }
        }));
        let t = result.unwrap();

        assert_eq!(t.id, "12345");
        assert_eq!(t.name, "Grand Canyon West Rim");
        assert_eq!(t.description.as_deref(), Some("Skywalk optional"));
        assert_eq!(t.price, Some(Price { amount: 89.5, currency: "EUR".to_string() }));
        assert_eq!(t.rating, Some(4.5));
        assert_eq!(t.review_count, Some(87));
        assert_eq!(t.tags, vec!["bus-tours", "day-trips"]);
        assert_eq!(t.booking_url.as_deref(), Some("https://www.viator.com/tours/12345"));
        assert_eq!(t.destination_key.as_deref(), Some("vegas-guide"));
    }

    #[test]
    fn test_flat_price_beats_nested_price() {
        let (result, _) = tour(json!({
            "id": "a",
            "name": "A",
            "fromPrice": 10,
            "pricing": { "summary": { "fromPrice": 99 } }
        }));
        assert_eq!(result.unwrap().price.unwrap().amount, 10.0);
    }

    #[test]
    fn test_unknown_price_is_none_never_zero() {
        for bad in [json!("N/A"), json!("NaN"), json!("abc"), json!(true)] {
            let (result, issues) = tour(json!({ "id": "a", "name": "A", "price_from": bad }));
            assert_eq!(result.unwrap().price, None);
            assert!(issues.iter().any(|i| i.field == "price" && i.issue == IssueKind::Unparseable));
        }

        let (result, _) = tour(json!({ "id": "a", "name": "A" }));
        assert_eq!(result.unwrap().price, None);

        let (result, _) = tour(json!({ "id": "a", "name": "A", "price_from": null }));
        assert_eq!(result.unwrap().price, None);
    }

    #[test]
    fn test_zero_price_is_kept() {
        let (result, _) = tour(json!({ "id": "free-walk", "name": "Free Walk", "price_from": 0 }));
        assert_eq!(result.unwrap().price.unwrap().amount, 0.0);
    }

    #[test]
    fn test_out_of_range_rating_and_negative_reviews() {
        let (result, issues) = tour(json!({
            "id": "a", "name": "A", "rating": 7.2, "reviewCount": -4
        }));
        let t = result.unwrap();
        assert_eq!(t.rating, None);
        assert_eq!(t.review_count, None);
        assert_eq!(issues.iter().filter(|i| i.issue == IssueKind::OutOfRange).count(), 2);
    }

    #[test]
    fn test_identity_fallbacks() {
        let (result, _) = tour(json!({ "title": "Visit the Hoover Dam near Las Vegas" }));
        assert_eq!(result.unwrap().id, "visit-the-hoover-dam-near-las-vegas");

        let (result, issues) = tour(json!({ "id": 42 }));
        let t = result.unwrap();
        assert_eq!(t.name, "42");
        assert!(issues.iter().any(|i| i.field == "name" && i.issue == IssueKind::Missing));

        let (result, _) = tour(json!({ "city": "las-vegas", "price_from": 20 }));
        assert_eq!(result.unwrap_err(), RejectReason::MissingIdentity);
    }

    #[test]
    fn test_symbol_only_name_gets_positional_id() {
        let outcome = normalize_tours(&[json!({ "id": "a", "name": "A" }), json!({ "name": "★★★" })]);

        assert!(outcome.rejections.is_empty());
        assert_eq!(outcome.records[1].id, "tour-1");
        assert_eq!(outcome.records[1].name, "★★★");
        assert!(outcome
            .issues
            .iter()
            .any(|i| i.record_id == "tour-1" && i.field == "id" && i.issue == IssueKind::Missing));

        let ports = normalize_ports(&[json!({ "name": "⚓", "lat": 1.0, "lng": 2.0 })]);
        assert_eq!(ports.records[0].id, "port-0");
    }

    #[test]
    fn test_invalid_booking_url_is_dropped() {
        let (result, issues) = tour(json!({ "id": "a", "name": "A", "url": "javascript:alert(1)" }));
        assert_eq!(result.unwrap().booking_url, None);
        assert!(issues.iter().any(|i| i.field == "booking_url"));
    }

    #[test]
    fn test_normalize_tours_records_rejections() {
        let raw = vec![
            json!({ "id": "a", "name": "A" }),
            json!("not a record"),
            json!({ "rating": 5 }),
            json!({ "id": "a", "name": "A again" }),
        ];
        let outcome = normalize_tours(&raw);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.rejections.len(), 2);
        assert_eq!(outcome.rejections[0].reason, RejectReason::NotAnObject);
        assert_eq!(outcome.rejections[1].index, 2);
        assert!(outcome.issues.iter().any(|i| i.issue == IssueKind::DuplicateId));
        assert!(!outcome.is_empty_batch());
    }

    #[test]
    fn test_all_rejected_is_empty_batch() {
        let outcome = normalize_tours(&[json!({ "price": 3 }), json!({})]);
        assert!(outcome.is_empty_batch());
        assert_eq!(outcome.total_input(), 2);

        let empty = normalize_tours(&[]);
        assert!(!empty.is_empty_batch());
    }

    #[test]
    fn test_unwrap_collection_envelopes() {
        assert_eq!(unwrap_collection(json!([{ "id": 1 }])).len(), 1);
        assert_eq!(unwrap_collection(json!({ "tours": [{ "id": 1 }, { "id": 2 }] })).len(), 2);
        assert_eq!(unwrap_collection(json!({ "data": { "products": [{ "id": 1 }] } })).len(), 1);
        assert_eq!(
            unwrap_collection(json!({ "b": { "id": "b" }, "a": { "id": "a" } })),
            vec![json!({ "id": "a" }), json!({ "id": "b" })]
        );
        assert!(unwrap_collection(json!({ "count": 3 })).is_empty());
        assert!(unwrap_collection(json!(12)).is_empty());
    }

    #[test]
    fn test_port_from_csv_strings() {
        let mut issues = Vec::new();
        let record = Record::from_value(json!({
            "slug": "port-of-miami",
            "name": "Port of Miami",
            "city": "Miami",
            "region": "Florida",
            "country": "USA",
            "lat": "25.7617",
            "lng": "-80.1918",
            "passenger_volume": "7300000",
            "volume_year": "2023",
            "dock_notes": "Terminal F for most lines",
            "tags": "caribbean|Home Port"
        }))
        .unwrap();
        let port = normalize_port(&record, 0, &mut issues).unwrap();

        assert_eq!(port.id, "port-of-miami");
        assert_eq!(port.lat, 25.7617);
        assert_eq!(
            port.passenger_volume,
            Some(PassengerVolume { count: 7_300_000, year: Some(2023) })
        );
        assert_eq!(port.notes.as_deref(), Some("Terminal F for most lines"));
        assert_eq!(port.tags, vec!["caribbean", "home-port"]);
        assert!(port.neighbors.is_empty());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_port_rejections() {
        let raw = vec![
            json!({ "id": "a", "name": "A", "lat": 1.0 }),
            json!({ "id": "b", "name": "B", "lat": 95.0, "lng": 0.0 }),
            json!({ "id": "c", "name": "C", "lat": "N/A", "lng": 0.0 }),
            json!({ "id": "d", "name": "D", "lat": 1.0, "lng": 2.0, "city": "D", "region": "R", "country": "X" }),
            json!({ "id": "d", "name": "D2", "lat": 1.0, "lng": 2.0 }),
        ];
        let outcome = normalize_ports(&raw);

        assert_eq!(outcome.records.len(), 1);
        let reasons: Vec<_> = outcome.rejections.iter().map(|r| r.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::MissingCoordinates,
                RejectReason::InvalidCoordinates { lat: 95.0, lng: 0.0 },
                RejectReason::MissingCoordinates,
                RejectReason::DuplicateIdentifier { id: "d".to_string() },
            ]
        );
    }

    #[test]
    fn test_port_missing_location_fields_are_issues() {
        let outcome = normalize_ports(&[json!({ "id": "x", "name": "X", "lat": 0, "lng": 0 })]);
        assert_eq!(outcome.records[0].city, "");
        let fields: Vec<_> = outcome.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["city", "region", "country"]);
    }
}
