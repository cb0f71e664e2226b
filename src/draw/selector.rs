use super::{CumulativeTable, DrawError, RandomSource};

/// 用 `rng` 抽取的随机值在累计表中选取奖品
///
/// 返回选中奖品在原奖品表中的下标。
pub fn select<R>(table: &CumulativeTable, rng: &mut R) -> Result<usize, DrawError>
where
    R: RandomSource + ?Sized,
{
    if table.is_empty() {
        return Err(DrawError::InvalidPrizeTable);
    }
    let r = rng.next_below(table.total());
    Ok(locate(table, r))
}

/// 第一个上界严格大于 `r` 的奖品下标
///
/// 区间为半开区间: 上界为 `[10, 30, 100]` 时 `r = 10` 属于第二项。
/// 负数或 NaN 按 0 处理; 因舍入导致 `r` 不小于任何上界时取最后一项。
/// `table` 不能为空。
pub fn locate(table: &CumulativeTable, r: f64) -> usize {
    let r = r.max(0.0);
    let bounds = table.bounds();
    if let Some(index) = bounds.iter().position(|b| r < b.upper) {
        return index;
    }
    log::warn!(
        "Draw value {r} not covered by cumulative total {}, falling back to last prize",
        table.total()
    );
    bounds.len().saturating_sub(1)
}
