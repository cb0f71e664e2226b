use super::{DrawError, Prize};

/// 单个奖品在 `[0, total)` 中所占半开区间的上界
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeBound {
    pub prize_id: String,
    pub upper: f64,
}

/// 奖品表对应的累计区间, 顺序与输入一致
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeTable {
    bounds: Vec<CumulativeBound>,
    total: f64,
}

impl CumulativeTable {
    pub fn bounds(&self) -> &[CumulativeBound] {
        &self.bounds
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// 各奖品中奖概率 (百分比), 按表顺序
    pub fn probabilities(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.bounds
            .iter()
            .map(|b| {
                let share = (b.upper - previous) / self.total * 100.0;
                previous = b.upper;
                share
            })
            .collect()
    }
}

/// 有效权重: 有限且大于 0 时取原值, 否则为 0
pub fn effective_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => 0.0,
    }
}

/// 将奖品快照归一化为累计区间表
///
/// 没有任何正权重时整表退化为均匀权重 1; 只要有一个正权重,
/// 未设置或非正权重的奖品区间为空。
/// 权重总和溢出时先按最大权重缩放, 比例不变。
pub fn normalize(prizes: &[Prize]) -> Result<CumulativeTable, DrawError> {
    if prizes.is_empty() {
        return Err(DrawError::InvalidPrizeTable);
    }

    let largest = prizes
        .iter()
        .map(|p| effective_weight(p.weight))
        .fold(0.0, f64::max);
    let uniform = largest <= 0.0;
    let declared: f64 = prizes.iter().map(|p| effective_weight(p.weight)).sum();
    let scale = if declared.is_finite() { 1.0 } else { largest };

    let mut acc = 0.0;
    let bounds = prizes
        .iter()
        .map(|p| {
            acc += if uniform {
                1.0
            } else {
                effective_weight(p.weight) / scale
            };
            CumulativeBound {
                prize_id: p.id.clone(),
                upper: acc,
            }
        })
        .collect();

    Ok(CumulativeTable { bounds, total: acc })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(weights: &[Option<f64>]) -> Vec<Prize> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| Prize::new(format!("p{i}"), format!("Prize {i}"), *w))
            .collect()
    }

    fn uppers(t: &CumulativeTable) -> Vec<f64> {
        t.bounds().iter().map(|b| b.upper).collect()
    }

    #[test]
    fn test_cumulative_bounds() {
        let t = normalize(&table(&[Some(10.0), Some(20.0), Some(70.0)])).unwrap();
        assert_eq!(uppers(&t), vec![10.0, 30.0, 100.0]);
        assert_eq!(t.total(), 100.0);
        assert_eq!(t.bounds()[1].prize_id, "p1");
    }

    #[test]
    fn test_missing_and_zero_weights_get_empty_range() {
        let t = normalize(&table(&[None, Some(5.0), Some(0.0), Some(-3.0), Some(5.0)])).unwrap();
        assert_eq!(uppers(&t), vec![0.0, 5.0, 5.0, 5.0, 10.0]);
    }

    #[test]
    fn test_uniform_fallback_when_no_positive_weight() {
        let t = normalize(&table(&[None, Some(0.0), Some(-1.0)])).unwrap();
        assert_eq!(uppers(&t), vec![1.0, 2.0, 3.0]);
        assert_eq!(t.total(), 3.0);
    }

    #[test]
    fn test_non_finite_weight_is_ignored() {
        let t = normalize(&table(&[Some(f64::NAN), Some(f64::INFINITY), Some(2.0)])).unwrap();
        assert_eq!(uppers(&t), vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_overflowing_sum_keeps_proportions() {
        // 1e308 + 1e308 溢出为无穷大
        let t = normalize(&table(&[Some(1e308), Some(1e308), Some(5e307), None])).unwrap();
        assert!(t.total().is_finite());
        assert!((t.total() - 2.5).abs() < 1e-9);

        let shares = t.probabilities();
        assert!((shares[0] - 40.0).abs() < 1e-9);
        assert!((shares[1] - 40.0).abs() < 1e-9);
        assert!((shares[2] - 20.0).abs() < 1e-9);
        assert_eq!(shares[3], 0.0);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(normalize(&[]), Err(DrawError::InvalidPrizeTable));
    }

    #[test]
    fn test_probabilities_in_percent() {
        let t = normalize(&table(&[Some(1.0), Some(3.0)])).unwrap();
        assert_eq!(t.probabilities(), vec![25.0, 75.0]);
    }
}
