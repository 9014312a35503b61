use crate::core::query::LocationQueryService;
use crate::core::selection::SizeSelection;
use crate::core::slider::{handle_input, render_selection, RenderState};
use crate::domain::model::{QueryKey, SkipOption};
use crate::domain::ports::SkipSource;
use crate::utils::error::{Result, SkipError};
use std::sync::Arc;

/// 目前查詢鍵的載入狀態
#[derive(Debug, Clone)]
pub enum QueryStatus {
    /// postcode 或 area 缺少，沒有查詢
    Idle,
    Loading,
    Failed(SkipError),
    Ready,
}

/// 一次 `begin` 產生的查詢憑證；完成時用來判斷是否已被新的地點取代
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    key: QueryKey,
    ticket: u64,
}

impl PendingQuery {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// 觀察單一地點的查詢，並把結果交給尺寸選擇模型
pub struct LocationSession<S: SkipSource + 'static> {
    service: Arc<LocationQueryService<S>>,
    image_base_url: String,
    active: Option<PendingQuery>,
    next_ticket: u64,
    status: QueryStatus,
    selection: SizeSelection,
}

impl<S: SkipSource + 'static> LocationSession<S> {
    pub fn new(service: Arc<LocationQueryService<S>>, image_base_url: impl Into<String>) -> Self {
        Self {
            service,
            image_base_url: image_base_url.into(),
            active: None,
            next_ticket: 0,
            status: QueryStatus::Idle,
            selection: SizeSelection::default(),
        }
    }

    pub fn status(&self) -> &QueryStatus {
        &self.status
    }

    pub fn selection(&self) -> &SizeSelection {
        &self.selection
    }

    pub fn active_key(&self) -> Option<&QueryKey> {
        self.active.as_ref().map(PendingQuery::key)
    }

    /// 切換到新的地點；缺少參數時回傳 `None` 並清空清單
    pub fn begin(&mut self, postcode: &str, area: &str) -> Option<PendingQuery> {
        let Some(key) = QueryKey::new(postcode, area) else {
            self.active = None;
            self.status = QueryStatus::Idle;
            self.selection.replace_options(Vec::new());
            return None;
        };

        let pending = PendingQuery {
            key,
            ticket: self.next_ticket,
        };
        self.next_ticket += 1;
        self.active = Some(pending.clone());
        self.status = QueryStatus::Loading;
        Some(pending)
    }

    /// 套用查詢結果；若查詢已被取代則忽略，回傳是否有套用
    pub fn complete(&mut self, pending: &PendingQuery, result: Result<Arc<[SkipOption]>>) -> bool {
        if self.active.as_ref() != Some(pending) {
            tracing::debug!("Dropping late response for superseded query {}", pending.key);
            return false;
        }

        match result {
            Ok(options) => {
                self.selection.replace_options(options.to_vec());
                self.status = QueryStatus::Ready;
            }
            Err(e) => {
                tracing::warn!("Could not load skips for {}: {}", pending.key, e);
                self.status = QueryStatus::Failed(e);
            }
        }
        true
    }

    /// 切換地點並等待結果
    pub async fn set_location(&mut self, postcode: &str, area: &str) -> &QueryStatus {
        if let Some(pending) = self.begin(postcode, area) {
            let result = self.service.fetch_key(pending.key()).await;
            self.complete(&pending, result);
        }
        &self.status
    }

    pub fn select(&mut self, value: f64) -> bool {
        self.selection.select(value)
    }

    pub fn handle_input(&mut self, raw: &str) -> bool {
        handle_input(&mut self.selection, raw)
    }

    pub fn render(&self) -> RenderState {
        match &self.status {
            QueryStatus::Loading => RenderState::Loading,
            QueryStatus::Failed(e) => RenderState::Error {
                message: e.user_friendly_message(),
            },
            QueryStatus::Idle | QueryStatus::Ready => {
                render_selection(&self.selection, &self.image_base_url)
            }
        }
    }
}
