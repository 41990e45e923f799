use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the unix epoch as a float; 0.0 for pre-epoch times
pub fn epoch_secs(t: SystemTime) -> f64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_epoch_secs() {
        let t = UNIX_EPOCH + Duration::from_millis(1_500);
        assert!((epoch_secs(t) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_epoch_secs_pre_epoch_is_zero() {
        let t = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(epoch_secs(t), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[0.2, 0.4, 0.6]), Some(0.4));
        assert_eq!(mean(&[0.25]), Some(0.25));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[0.3, 0.3, 0.3]), Some(0.0));
        let sd = std_dev(&[100., 120., 90., 102., 94.]).unwrap();
        assert!((sd - 10.322790320451151).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_empty_slice() {
        assert_eq!(std_dev(&[]), None);
    }
}
