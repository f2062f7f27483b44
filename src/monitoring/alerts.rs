//! Alert rules over aggregate monitoring statistics

pub const MAX_REFUSAL_RATE: f64 = 0.30;
pub const MAX_MEAN_DISTANCE: f64 = 0.55;

/// Human-readable alerts; empty when every rule holds
pub fn check_alerts(refusal_rate: f64, mean_distance: Option<f64>) -> Vec<String> {
    let mut alerts = Vec::new();

    if refusal_rate > MAX_REFUSAL_RATE {
        alerts.push(format!("High refusal rate: {:.2} (>0.30)", refusal_rate));
    }

    // Lower distance is a closer match
    if let Some(distance) = mean_distance {
        if distance > MAX_MEAN_DISTANCE {
            alerts.push(format!(
                "High mean retrieval distance: {:.3} (>0.55)",
                distance
            ));
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_alerts() {
        assert!(check_alerts(0.30, Some(0.55)).is_empty());
        assert!(check_alerts(0.0, None).is_empty());
    }

    #[test]
    fn test_both_alerts() {
        let alerts = check_alerts(0.5, Some(0.7));
        assert_eq!(
            alerts,
            vec![
                "High refusal rate: 0.50 (>0.30)".to_string(),
                "High mean retrieval distance: 0.700 (>0.55)".to_string(),
            ]
        );
    }
}
