//! 時間序列數值工具

/// 線性趨勢（以索引 0..n-1 為自變數的最小平方法結果）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// 在索引 t 的趨勢值
    pub fn at(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

/// 算術平均
///
/// 空序列回傳 0（空歷史的預測一律為 0）。
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// 最小平方法線性擬合
///
/// n < 2 時斜率為 0，截距為第一個值（空序列為 0）。
pub fn linear_fit(xs: &[f64]) -> LinearTrend {
    let n = xs.len();
    if n < 2 {
        return LinearTrend {
            slope: 0.0,
            intercept: xs.first().copied().unwrap_or(0.0),
        };
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(xs);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in xs.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    LinearTrend {
        slope,
        intercept: y_mean - slope * x_mean,
    }
}

/// 以位置（p mod period）計算季節指數
///
/// 回傳長度為 `period` 的指數陣列；觀測數不足一個完整週期時全部為 0。
pub fn seasonal_index(xs: &[f64], period: usize) -> Vec<f64> {
    let phases: Vec<usize> = (0..xs.len()).map(|i| i % period.max(1)).collect();
    seasonal_index_by_phase(xs, &phases, period)
}

/// 以指定相位計算季節指數（加法型）
///
/// 只使用尾端完整週期的觀測值；每個相位的指數為該相位觀測值
/// 相對於這段期間平均值的平均偏差。沒有觀測值的相位指數為 0。
pub fn seasonal_index_by_phase(xs: &[f64], phases: &[usize], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }

    let mut index = vec![0.0; period];
    let n = xs.len().min(phases.len());
    let cycles = n / period;
    if cycles == 0 {
        return index;
    }

    let start = n - cycles * period;
    let window = &xs[start..n];
    let window_phases = &phases[start..n];
    let overall = mean(window);

    let mut counts = vec![0usize; period];
    for (value, phase) in window.iter().zip(window_phases) {
        let p = phase % period;
        index[p] += value - overall;
        counts[p] += 1;
    }

    for (slot, count) in index.iter_mut().zip(counts) {
        if count > 0 {
            *slot /= count as f64;
        }
    }

    index
}

/// 單一指數平滑
///
/// `s[0] = xs[0]`，`s[t] = alpha * xs[t] + (1 - alpha) * s[t-1]`
pub fn exponential_smooth(xs: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(xs.len());
    let mut iter = xs.iter();

    if let Some(&first) = iter.next() {
        smoothed.push(first);
        let mut level = first;
        for &x in iter {
            level = alpha * x + (1.0 - alpha) * level;
            smoothed.push(level);
        }
    }

    smoothed
}

/// 將預測值限制為非負；NaN 或無限值視為 0
pub fn clamp_quantity(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
