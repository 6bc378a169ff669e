use serde::{Deserialize, Serialize};

pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
pub const MAX_ACTIVITY_LIMIT: i64 = 500;

#[derive(Debug, Deserialize, Default)]
pub struct ActivityQueryDto {
    pub limit: Option<i64>,
}

impl ActivityQueryDto {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WilayaMetric {
    #[default]
    Count,
    Rent,
}

#[derive(Debug, Deserialize, Default)]
pub struct WilayaQueryDto {
    #[serde(default)]
    pub metric: WilayaMetric,
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MonthlyPaymentsQueryDto {
    pub last: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PullRequestDto {
    /// Without confirmation the remote collection is only counted.
    #[serde(default)]
    pub confirm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_limit_defaults_and_clamps() {
        assert_eq!(ActivityQueryDto { limit: None }.effective_limit(), 50);
        assert_eq!(ActivityQueryDto { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(ActivityQueryDto { limit: Some(10_000) }.effective_limit(), 500);
        assert_eq!(ActivityQueryDto { limit: Some(20) }.effective_limit(), 20);
    }
}
