use tracing::warn;

use crate::error::AppError;
use crate::models::fee::{DeliveryFeeConfig, FeeQuote, FeeSlab};

/// Rounds to 2 decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Checks slab well-formedness: non-empty, starting at 0, contiguous
/// (`next.min == prev.max + 1`), non-overlapping, with only the final slab
/// open-ended. Runs on config create/update, never at calculation time.
pub fn validate_slabs(slabs: &[FeeSlab]) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if slabs.is_empty() {
        return Err(AppError::SlabValidation(vec![
            "At least one slab is required".to_string(),
        ]));
    }

    let mut sorted: Vec<&FeeSlab> = slabs.iter().collect();
    sorted.sort_by(|a, b| a.min_order_value.total_cmp(&b.min_order_value));

    if sorted[0].min_order_value != 0.0 {
        errors.push("First slab must start at 0".to_string());
    }
    if sorted[sorted.len() - 1].max_order_value.is_some() {
        errors.push("Last slab must have maxOrderValue = null".to_string());
    }

    for pair in sorted.windows(2) {
        let (cur, next) = (pair[0], pair[1]);
        let Some(cur_max) = cur.max_order_value else {
            errors.push("Only the last slab can have maxOrderValue = null".to_string());
            continue;
        };
        if cur_max >= next.min_order_value {
            errors.push("Slab ranges must not overlap".to_string());
        } else if next.min_order_value != cur_max + 1.0 {
            errors.push("Slab ranges must be continuous without gaps".to_string());
        }
    }

    for slab in slabs {
        if slab.base_fee < 0.0 {
            errors.push("baseFee must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&slab.percentage_fee) {
            errors.push("percentageFee must be between 0 and 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::SlabValidation(errors))
    }
}

/// Full config validation for create/update paths.
pub fn validate_config(config: &DeliveryFeeConfig) -> Result<(), AppError> {
    validate_slabs(&config.slabs)?;

    if !(0.0..=1.0).contains(&config.partner_earnings_percentage) {
        return Err(AppError::SlabValidation(vec![
            "partnerEarningsPercentage must be between 0 and 1".to_string(),
        ]));
    }

    if config.partner_earnings_percentage < 0.5 || config.partner_earnings_percentage > 0.95 {
        warn!(
            partner_earnings_percentage = config.partner_earnings_percentage,
            "partner earnings percentage is outside the recommended range"
        );
    }

    Ok(())
}

/// Pure fee computation over a validated config.
pub fn calculate(order_value: f64, config: &DeliveryFeeConfig) -> Result<FeeQuote, AppError> {
    if !order_value.is_finite() || order_value < 0.0 {
        return Err(AppError::Validation("invalid orderValue".to_string()));
    }

    // The contiguity invariant makes a miss impossible for well-formed
    // configs; hitting this branch means the stored config is corrupt.
    let slab = config
        .slabs
        .iter()
        .find(|slab| slab.applies_to(order_value))
        .ok_or_else(|| AppError::Validation("no applicable slab found".to_string()))?;

    let delivery_fee = round2(slab.base_fee + order_value * slab.percentage_fee);
    let partner_earnings = round2(delivery_fee * config.partner_earnings_percentage);
    let platform_commission = round2(delivery_fee - partner_earnings);

    Ok(FeeQuote {
        order_value,
        delivery_fee,
        partner_earnings,
        platform_commission,
        applied_slab: slab.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{calculate, validate_slabs};
    use crate::error::AppError;
    use crate::models::fee::{DeliveryFeeConfig, FeeSlab};

    fn slab(min: f64, max: Option<f64>, base: f64, pct: f64) -> FeeSlab {
        FeeSlab {
            min_order_value: min,
            max_order_value: max,
            base_fee: base,
            percentage_fee: pct,
            description: format!("{min}+"),
        }
    }

    fn config(slabs: Vec<FeeSlab>, partner_pct: f64) -> DeliveryFeeConfig {
        DeliveryFeeConfig {
            id: Uuid::new_v4(),
            slabs,
            partner_earnings_percentage: partner_pct,
            is_active: true,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn two_tier_slab_list_passes_validation() {
        let slabs = vec![
            slab(0.0, Some(499.0), 20.0, 0.05),
            slab(500.0, None, 30.0, 0.03),
        ];
        assert!(validate_slabs(&slabs).is_ok());
    }

    #[test]
    fn gap_between_slabs_is_rejected() {
        let slabs = vec![
            slab(0.0, Some(499.0), 20.0, 0.05),
            slab(600.0, None, 30.0, 0.03),
        ];
        let Err(AppError::SlabValidation(errors)) = validate_slabs(&slabs) else {
            panic!("expected slab validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("continuous")));
    }

    #[test]
    fn overlapping_slabs_are_rejected() {
        let slabs = vec![
            slab(0.0, Some(499.0), 20.0, 0.05),
            slab(400.0, None, 30.0, 0.03),
        ];
        let Err(AppError::SlabValidation(errors)) = validate_slabs(&slabs) else {
            panic!("expected slab validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("overlap")));
    }

    #[test]
    fn empty_slab_list_is_rejected() {
        assert!(matches!(
            validate_slabs(&[]),
            Err(AppError::SlabValidation(_))
        ));
    }

    #[test]
    fn first_slab_must_start_at_zero() {
        let slabs = vec![slab(10.0, None, 20.0, 0.05)];
        let Err(AppError::SlabValidation(errors)) = validate_slabs(&slabs) else {
            panic!("expected slab validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("start at 0")));
    }

    #[test]
    fn non_last_slab_with_open_end_is_rejected() {
        let slabs = vec![
            slab(0.0, None, 20.0, 0.05),
            slab(500.0, None, 30.0, 0.03),
        ];
        assert!(matches!(
            validate_slabs(&slabs),
            Err(AppError::SlabValidation(_))
        ));
    }

    #[test]
    fn order_value_300_yields_documented_split() {
        let cfg = config(
            vec![
                slab(0.0, Some(499.0), 20.0, 0.05),
                slab(500.0, None, 30.0, 0.03),
            ],
            0.8,
        );
        let quote = calculate(300.0, &cfg).unwrap();
        assert_eq!(quote.delivery_fee, 35.0);
        assert_eq!(quote.partner_earnings, 28.0);
        assert_eq!(quote.platform_commission, 7.0);
        assert_eq!(quote.applied_slab.max_order_value, Some(499.0));
    }

    #[test]
    fn open_ended_slab_catches_large_values() {
        let cfg = config(
            vec![
                slab(0.0, Some(499.0), 20.0, 0.05),
                slab(500.0, None, 30.0, 0.03),
            ],
            0.8,
        );
        let quote = calculate(10_000.0, &cfg).unwrap();
        assert_eq!(quote.delivery_fee, 330.0);
    }

    #[test]
    fn negative_order_value_is_rejected() {
        let cfg = config(vec![slab(0.0, None, 20.0, 0.05)], 0.8);
        assert!(matches!(
            calculate(-1.0, &cfg),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn calculate_is_a_pure_function() {
        let cfg = config(vec![slab(0.0, None, 20.0, 0.05)], 0.8);
        assert_eq!(calculate(123.45, &cfg).unwrap(), calculate(123.45, &cfg).unwrap());
    }
}
