use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DrawError;

/// 访客输入的预订号, 已去除首尾空白且非空
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn parse(raw: &str) -> Result<Self, DrawError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DrawError::EmptyBookingId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 奖品表快照中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub id: String,
    pub label: String,
    pub weight: Option<f64>,
}

impl Prize {
    pub fn new(id: impl Into<String>, label: impl Into<String>, weight: Option<f64>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            weight,
        }
    }
}

/// 一次成功抽奖的结果, 写入后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: String,
    pub booking_id: String,
    pub prize_id: String,
    pub prize_label: String,
    pub timestamp: DateTime<Utc>,
}

impl DrawRecord {
    pub fn new(booking_id: &BookingId, prize: &Prize, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking_id.as_str().to_string(),
            prize_id: prize.id.clone(),
            prize_label: prize.label.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_is_trimmed() {
        let id = BookingId::parse("  ABC123  ").unwrap();
        assert_eq!(id.as_str(), "ABC123");
        assert_eq!(BookingId::parse("\tABC123\n").unwrap(), id);
    }

    #[test]
    fn test_blank_booking_id_rejected() {
        assert_eq!(BookingId::parse(""), Err(DrawError::EmptyBookingId));
        assert_eq!(BookingId::parse("   \t "), Err(DrawError::EmptyBookingId));
    }

    #[test]
    fn test_record_snapshots_prize() {
        let booking = BookingId::parse("B-1").unwrap();
        let prize = Prize::new("p1", "Room Upgrade", Some(3.0));
        let now = Utc::now();
        let record = DrawRecord::new(&booking, &prize, now);
        assert_eq!(record.booking_id, "B-1");
        assert_eq!(record.prize_id, "p1");
        assert_eq!(record.prize_label, "Room Upgrade");
        assert_eq!(record.timestamp, now);
        assert!(!record.id.is_empty());
    }
}
