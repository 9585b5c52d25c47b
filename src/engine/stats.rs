// ==========================================
// 钢轨打磨排程系统 - 描述统计工具
// ==========================================
// 偏度/峰度采用有偏矩估计（Fisher-Pearson 偏度、Fisher 超额峰度）
// 输入切片不含 NaN（缺测值由调用方剔除）
// ==========================================

/// 算术平均，空切片为 NaN
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 中位数（偶数个取中间两值平均），空切片为 NaN
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// 样本方差（ddof = 1），少于 2 个样本为 NaN
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// 二阶/三阶/四阶中心矩（有偏）
fn central_moments(values: &[f64]) -> (f64, f64, f64, f64) {
    let m = mean(values);
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m, m2 / n, m3 / n, m4 / n)
}

/// 方差在浮点精度内为零
fn is_numerically_zero(m2: f64, mean: f64) -> bool {
    m2 <= (f64::EPSILON * mean).powi(2)
}

/// Fisher-Pearson 偏度 g1 = m3 / m2^1.5
///
/// 方差为零时为 NaN
pub fn skewness(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let (m, m2, m3, _) = central_moments(values);
    if is_numerically_zero(m2, m) {
        return f64::NAN;
    }
    m3 / m2.powf(1.5)
}

/// 退化组安全偏度
///
/// 样本数 < 2 或全部取值相同（样本方差为 0）时返回 0，
/// 否则返回 Fisher-Pearson 偏度
pub fn safe_skew(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let first = values[0];
    if values.iter().all(|v| *v == first) {
        return 0.0;
    }
    let variance = sample_variance(values);
    if variance.is_nan() || variance <= 0.0 {
        return 0.0;
    }
    let skew = skewness(values);
    if skew.is_nan() {
        0.0
    } else {
        skew
    }
}

/// Fisher 超额峰度 m4 / m2² - 3
///
/// 单样本或零方差组无定义，返回 None
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    if values.iter().all(|v| *v == first) {
        return None;
    }
    let (m, m2, _, m4) = central_moments(values);
    if is_numerically_zero(m2, m) {
        return None;
    }
    Some(m4 / (m2 * m2) - 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_safe_skew_degenerate_groups() {
        assert_eq!(safe_skew(&[]), 0.0);
        assert_eq!(safe_skew(&[0.05]), 0.0);
        assert_eq!(safe_skew(&[0.1, 0.1, 0.1, 0.1]), 0.0);
    }

    #[test]
    fn test_safe_skew_matches_fisher_pearson() {
        // 非对称样本 [1, 1, 4]
        // mean = 2, d = [-1,-1,2], m2 = 6/3 = 2, m3 = (-1-1+8)/3 = 2
        // g1 = 2 / 2^1.5 = 0.7071067811865475
        let values = [1.0, 1.0, 4.0];
        assert!(approx(safe_skew(&values), 2.0 / 2.0_f64.powf(1.5)));
        assert!(approx(safe_skew(&values), skewness(&values)));
    }

    #[test]
    fn test_symmetric_sample_has_zero_skew() {
        assert!(approx(safe_skew(&[1.0, 2.0, 3.0]), 0.0));
    }

    #[test]
    fn test_kurtosis_excess() {
        // [1,2,3,4]: mean 2.5, m2 = 1.25, m4 = (5.0625*2 + 0.0625*2)/4 = 2.5625
        // 2.5625 / 1.5625 - 3 = -1.36
        assert!(approx(kurtosis(&[1.0, 2.0, 3.0, 4.0]).unwrap(), -1.36));
    }

    #[test]
    fn test_kurtosis_degenerate_is_none() {
        assert_eq!(kurtosis(&[0.2]), None);
        assert_eq!(kurtosis(&[0.2, 0.2]), None);
        assert_eq!(kurtosis(&[0.03; 30]), None);
        assert_eq!(kurtosis(&[]), None);
    }
}
