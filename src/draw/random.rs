use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 抽奖使用的均匀随机数来源
///
/// 实现返回 `[0, total)` 内的值; 超出范围的值由选取逻辑兜底
/// (过小按 0 处理, 过大取最后一项)。
pub trait RandomSource {
    fn next_below(&mut self, total: f64) -> f64;
}

fn sample<R: Rng + ?Sized>(rng: &mut R, total: f64) -> f64 {
    if !(total > 0.0 && total.is_finite()) {
        return 0.0;
    }
    rng.random_range(0.0..total)
}

/// 线程本地随机数, 线上抽奖使用
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&mut self, total: f64) -> f64 {
        sample(&mut rand::rng(), total)
    }
}

/// 固定种子, 结果可复现
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, total: f64) -> f64 {
        sample(&mut self.0, total)
    }
}

/// 循环返回固定的数值序列, 忽略 `total` (测试用)
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_below(&mut self, _total: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_stays_in_range() {
        let mut rng = ThreadRandom;
        for _ in 0..1000 {
            let r = rng.next_below(7.5);
            assert!((0.0..7.5).contains(&r));
        }
        assert_eq!(rng.next_below(0.0), 0.0);
        assert_eq!(rng.next_below(f64::NAN), 0.0);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        let xs: Vec<f64> = (0..16).map(|_| a.next_below(100.0)).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.next_below(100.0)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_fixed_sequence_cycles() {
        let mut seq = FixedSequence::new(vec![1.0, 2.0]);
        assert_eq!(seq.next_below(10.0), 1.0);
        assert_eq!(seq.next_below(10.0), 2.0);
        assert_eq!(seq.next_below(10.0), 1.0);
        assert_eq!(FixedSequence::new(Vec::new()).next_below(10.0), 0.0);
    }
}
