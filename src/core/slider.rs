use crate::core::selection::SizeSelection;
use serde::Serialize;

pub const SLIDER_STEP: f64 = 1.0;

/// 畫面上互斥的三種狀態（內容中包含「沒有資料」）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderState {
    Loading,
    Error { message: String },
    NoData,
    Content(SliderView),
}

/// 目前選擇的 skip 卡片
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipCard {
    pub size: f64,
    pub image_url: String,
    pub not_allowed_on_road: bool,
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderView {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub stops: Vec<f64>,
    pub selected: f64,
    pub fill_percent: f64,
    pub card: SkipCard,
}

impl SliderView {
    pub fn from_selection(selection: &SizeSelection, image_base_url: &str) -> Self {
        let (min, max) = selection.bounds();
        let selected = selection.current_selection();
        Self {
            min,
            max,
            step: SLIDER_STEP,
            stops: selection.valid_sizes().to_vec(),
            selected,
            fill_percent: fill_percent(selected, min, max),
            card: SkipCard::from_selection(selection, image_base_url),
        }
    }
}

impl SkipCard {
    pub fn from_selection(selection: &SizeSelection, image_base_url: &str) -> Self {
        let size = selection.current_selection();
        let resolved = selection.resolve();
        Self {
            size,
            image_url: skip_image_url(image_base_url, size),
            not_allowed_on_road: !resolved.is_some_and(|option| option.allowed_on_road),
            price: resolved
                .map(|option| option.price_before_vat)
                .filter(|price| *price != 0.0)
                .map(format_currency),
        }
    }
}

/// 依目前選擇組出畫面狀態
pub fn render_selection(selection: &SizeSelection, image_base_url: &str) -> RenderState {
    if selection.is_empty() {
        RenderState::NoData
    } else {
        RenderState::Content(SliderView::from_selection(selection, image_base_url))
    }
}

pub fn fill_percent(selected: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    (selected - min) / (max - min) * 100.0
}

pub fn skip_image_url(image_base_url: &str, size: f64) -> String {
    format!("{}/{}-yarder-skip.jpg", image_base_url.trim_end_matches('/'), size)
}

/// 滑桿輸入字串轉數字；空字串為 0，無法解析為 NaN
pub fn parse_slider_input(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// 處理滑桿變動：吸附到最近的有效尺寸，回傳選擇是否改變
pub fn handle_input(selection: &mut SizeSelection, raw: &str) -> bool {
    selection.select(parse_slider_input(raw))
}

/// 英鎊格式，最多兩位小數且省略尾端的 0
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("£{}", value);
    }

    let pence = (value.abs() * 100.0).round() as u64;
    let pounds = pence / 100;
    let remainder = pence % 100;

    let mut out = String::new();
    if value < 0.0 && pence > 0 {
        out.push('-');
    }
    out.push('£');
    out.push_str(&group_thousands(pounds));
    if remainder != 0 {
        let fraction = format!("{:02}", remainder);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IMAGE_BASE_URL;
    use crate::domain::model::SkipOption;

    fn option(id: i64, size: f64, price: f64, on_road: bool) -> SkipOption {
        SkipOption {
            id,
            size,
            price_before_vat: price,
            allowed_on_road: on_road,
            ..SkipOption::default()
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(250.0), "£250");
        assert_eq!(format_currency(1234.5), "£1,234.5");
        assert_eq!(format_currency(1234.05), "£1,234.05");
        assert_eq!(format_currency(1_000_000.0), "£1,000,000");
        assert_eq!(format_currency(0.499), "£0.5");
        assert_eq!(format_currency(-12.0), "-£12");
    }

    #[test]
    fn test_fill_percent() {
        assert_eq!(fill_percent(4.0, 4.0, 4.0), 0.0);
        assert_eq!(fill_percent(4.0, 4.0, 8.0), 0.0);
        assert_eq!(fill_percent(6.0, 4.0, 8.0), 50.0);
        assert_eq!(fill_percent(8.0, 4.0, 8.0), 100.0);
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            skip_image_url(DEFAULT_IMAGE_BASE_URL, 6.0),
            "https://yozbrydxdlcxghkphhtq.supabase.co/storage/v1/object/public/skips/skip-sizes/6-yarder-skip.jpg"
        );
        assert_eq!(
            skip_image_url("http://img.local/", 2.5),
            "http://img.local/2.5-yarder-skip.jpg"
        );
    }

    #[test]
    fn test_view_for_selection() {
        let mut selection = SizeSelection::new(vec![
            option(1, 4.0, 278.0, true),
            option(2, 6.0, 305.0, false),
            option(3, 8.0, 375.0, true),
        ]);
        assert!(handle_input(&mut selection, "7"));

        let RenderState::Content(view) = render_selection(&selection, "http://img.local") else {
            panic!("expected content");
        };
        assert_eq!(view.min, 4.0);
        assert_eq!(view.max, 8.0);
        assert_eq!(view.stops, vec![4.0, 6.0, 8.0]);
        assert_eq!(view.selected, 6.0);
        assert_eq!(view.fill_percent, 50.0);
        assert_eq!(view.card.price.as_deref(), Some("£305"));
        assert!(view.card.not_allowed_on_road);
        assert_eq!(view.card.image_url, "http://img.local/6-yarder-skip.jpg");
    }

    #[test]
    fn test_zero_price_hidden() {
        let selection = SizeSelection::new(vec![option(1, 4.0, 0.0, true)]);
        let card = SkipCard::from_selection(&selection, "http://img.local");
        assert!(card.price.is_none());
        assert!(!card.not_allowed_on_road);
    }

    #[test]
    fn test_empty_selection_renders_no_data() {
        let selection = SizeSelection::new(vec![]);
        assert_eq!(render_selection(&selection, "http://img.local"), RenderState::NoData);
    }

    #[test]
    fn test_render_state_json_tag() {
        let json = serde_json::to_value(RenderState::NoData).unwrap();
        assert_eq!(json, serde_json::json!({"state": "no_data"}));

        let json = serde_json::to_value(RenderState::Loading).unwrap();
        assert_eq!(json["state"], "loading");
    }

    #[test]
    fn test_slider_input_parsing() {
        assert_eq!(parse_slider_input(" 12 "), 12.0);
        assert_eq!(parse_slider_input(""), 0.0);
        assert!(parse_slider_input("big").is_nan());
    }
}
