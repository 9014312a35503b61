use crate::domain::model::SkipOption;

/// 沒有任何可選尺寸時的選擇值
pub const NO_SELECTION: f64 = 0.0;

/// 從清單中取出不重複的有限尺寸，保留第一次出現的順序
pub fn ingest_sizes(options: &[SkipOption]) -> Vec<f64> {
    let mut sizes: Vec<f64> = Vec::with_capacity(options.len());
    for option in options {
        if !option.size.is_finite() {
            tracing::debug!("Dropping skip option {} with invalid size", option.id);
            continue;
        }
        if !sizes.contains(&option.size) {
            sizes.push(option.size);
        }
    }
    sizes
}

/// 尺寸選擇模型：持有目前清單與唯一的選擇值
#[derive(Debug, Clone, Default)]
pub struct SizeSelection {
    options: Vec<SkipOption>,
    valid_sizes: Vec<f64>,
    selected: f64,
}

impl SizeSelection {
    pub fn new(options: Vec<SkipOption>) -> Self {
        let valid_sizes = ingest_sizes(&options);
        let mut selection = Self {
            options,
            valid_sizes,
            selected: NO_SELECTION,
        };
        selection.selected = selection.initial_selection();
        selection
    }

    pub fn options(&self) -> &[SkipOption] {
        &self.options
    }

    pub fn valid_sizes(&self) -> &[f64] {
        &self.valid_sizes
    }

    pub fn is_empty(&self) -> bool {
        self.valid_sizes.is_empty()
    }

    /// `(min, max)`；清單為空時為 `(0, 0)`
    pub fn bounds(&self) -> (f64, f64) {
        if self.valid_sizes.is_empty() {
            return (NO_SELECTION, NO_SELECTION);
        }
        self.valid_sizes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &size| {
                (min.min(size), max.max(size))
            })
    }

    /// 距離 `value` 最近的有效尺寸；距離相同時取先出現者
    pub fn nearest(&self, value: f64) -> f64 {
        let Some((&first, rest)) = self.valid_sizes.split_first() else {
            return NO_SELECTION;
        };
        if !value.is_finite() {
            return first;
        }
        rest.iter().fold(first, |best, &size| {
            if (size - value).abs() < (best - value).abs() {
                size
            } else {
                best
            }
        })
    }

    /// 選擇最接近 `value` 的尺寸，回傳選擇是否改變
    pub fn select(&mut self, value: f64) -> bool {
        let next = self.nearest(value);
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    pub fn current_selection(&self) -> f64 {
        self.selected
    }

    /// 尺寸等於目前選擇的第一筆紀錄
    pub fn resolve(&self) -> Option<&SkipOption> {
        if self.valid_sizes.is_empty() {
            return None;
        }
        self.options.iter().find(|option| option.size == self.selected)
    }

    /// 換上新的清單；原本的選擇不在新清單中時，重設為新清單第一個尺寸的最近值
    pub fn replace_options(&mut self, options: Vec<SkipOption>) {
        self.valid_sizes = ingest_sizes(&options);
        self.options = options;

        if self.valid_sizes.is_empty() {
            self.selected = NO_SELECTION;
        } else if !self.valid_sizes.contains(&self.selected) {
            let reset = self.initial_selection();
            tracing::debug!("Selection {} no longer available, reset to {}", self.selected, reset);
            self.selected = reset;
        }
    }

    fn initial_selection(&self) -> f64 {
        match self.valid_sizes.first() {
            Some(&first) => self.nearest(first),
            None => NO_SELECTION,
        }
    }
}
