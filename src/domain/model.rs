use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 某地點可租用的一種 skip 尺寸
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipOption {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,

    /// 立方碼；上游可能回傳數字或數字字串，無法解析時為 NaN
    #[serde(deserialize_with = "lenient_number")]
    pub size: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub hire_period_days: u32,
    pub transport_cost: Option<f64>,
    pub per_tonne_cost: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub price_before_vat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub vat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub postcode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub area: String,
    #[serde(deserialize_with = "null_as_default")]
    pub forbidden: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub allowed_on_road: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub allows_heavy_waste: bool,
}

impl Default for SkipOption {
    fn default() -> Self {
        Self {
            id: 0,
            size: f64::NAN,
            hire_period_days: 0,
            transport_cost: None,
            per_tonne_cost: None,
            price_before_vat: 0.0,
            vat: 0.0,
            postcode: String::new(),
            area: String::new(),
            forbidden: false,
            created_at: None,
            updated_at: None,
            allowed_on_road: false,
            allows_heavy_waste: false,
        }
    }
}

impl SkipOption {
    /// 含 VAT 的價格
    pub fn price_with_vat(&self) -> f64 {
        self.price_before_vat * (1.0 + self.vat / 100.0)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

// null 與缺少欄位一樣視為預設值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 將 JSON 值轉成數字，`"4"` 與 `4` 視為相同
pub fn coerce_number(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// 上游回應：直接是陣列，或包在 `data` 欄位中
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkipListResponse {
    Bare(Vec<SkipOption>),
    Wrapped { data: Vec<SkipOption> },
}

impl SkipListResponse {
    pub fn into_options(self) -> Vec<SkipOption> {
        match self {
            SkipListResponse::Bare(options) => options,
            SkipListResponse::Wrapped { data } => data,
        }
    }
}

/// 查詢鍵 `(postcode, area)`，兩者皆非空才成立
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    postcode: String,
    area: String,
}

impl QueryKey {
    pub fn new(postcode: &str, area: &str) -> Option<Self> {
        if postcode.is_empty() || area.is_empty() {
            return None;
        }
        Some(Self {
            postcode: postcode.to_string(),
            area: area.to_string(),
        })
    }

    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    pub fn area(&self) -> &str {
        &self.area
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skips:by-location/{}/{}", self.postcode, self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_record() {
        let raw = json!({
            "id": 17933,
            "size": 4,
            "hire_period_days": 14,
            "transport_cost": null,
            "per_tonne_cost": null,
            "price_before_vat": 278,
            "vat": 20,
            "postcode": "NR32",
            "area": "Lowestoft",
            "forbidden": false,
            "created_at": "2025-04-03T13:51:46.897146",
            "updated_at": "2025-04-07T13:16:52.813",
            "allowed_on_road": true,
            "allows_heavy_waste": true
        });

        let option: SkipOption = serde_json::from_value(raw).unwrap();
        assert_eq!(option.id, 17933);
        assert_eq!(option.size, 4.0);
        assert_eq!(option.hire_period_days, 14);
        assert_eq!(option.transport_cost, None);
        assert!(option.allowed_on_road);
        assert_eq!(option.created_at.as_deref(), Some("2025-04-03T13:51:46.897146"));
        assert!((option.price_with_vat() - 333.6).abs() < 1e-9);
    }

    #[test]
    fn test_size_string_coerces_to_number() {
        let option: SkipOption = serde_json::from_value(json!({"id": 1, "size": "6"})).unwrap();
        assert_eq!(option.size, 6.0);
    }

    #[test]
    fn test_bad_size_ingests_as_nan() {
        let option: SkipOption =
            serde_json::from_value(json!({"id": 1, "size": "large"})).unwrap();
        assert!(option.size.is_nan());

        let missing: SkipOption = serde_json::from_value(json!({"id": 2})).unwrap();
        assert!(missing.size.is_nan());
        assert_eq!(missing.price_before_vat, 0.0);
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let option: SkipOption = serde_json::from_value(json!({
            "id": 3,
            "size": 8,
            "price_before_vat": null,
            "vat": null,
            "allowed_on_road": null,
            "allows_heavy_waste": null,
            "postcode": null
        }))
        .unwrap();
        assert_eq!(option.size, 8.0);
        assert_eq!(option.price_before_vat, 0.0);
        assert!(!option.allowed_on_road);
        assert!(!option.allows_heavy_waste);
        assert_eq!(option.postcode, "");
    }

    #[test]
    fn test_null_price_does_not_drop_other_records() {
        let response: SkipListResponse = serde_json::from_str(
            r#"{"data":[{"id":1,"size":4,"price_before_vat":null},{"id":2,"size":6,"price_before_vat":305}]}"#,
        )
        .unwrap();
        let options = response.into_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].price_before_vat, 0.0);
        assert_eq!(options[1].price_before_vat, 305.0);
    }

    #[test]
    fn test_response_bare_and_wrapped() {
        let bare: SkipListResponse =
            serde_json::from_value(json!([{"id": 1, "size": 4}])).unwrap();
        assert_eq!(bare.into_options().len(), 1);

        let wrapped: SkipListResponse =
            serde_json::from_value(json!({"data": [{"id": 1, "size": 4}, {"id": 2, "size": 6}]}))
                .unwrap();
        assert_eq!(wrapped.into_options().len(), 2);
    }

    #[test]
    fn test_query_key_requires_both_parts() {
        assert!(QueryKey::new("", "Lowestoft").is_none());
        assert!(QueryKey::new("NR32", "").is_none());

        let key = QueryKey::new("NR32", "Lowestoft").unwrap();
        assert_eq!(key.postcode(), "NR32");
        assert_eq!(key.to_string(), "skips:by-location/NR32/Lowestoft");
    }
}
