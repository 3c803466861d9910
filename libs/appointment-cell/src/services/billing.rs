use patient_cell::models::PatientType;

use crate::models::AppointmentError;

/// How a session's price divides between the patient and the insurer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSplit {
    pub total: i64,
    pub copay: i64,
    pub insurer: i64,
}

/// Split a session price according to the patient's affiliation type.
///
/// PRIVATE sessions are paid out of pocket in full, so both portions are
/// zero and only `total` is billed. Copay plans subtract the declared copay
/// from the total and bill the remainder to the insurer; a copay above the
/// total would leave a negative insurer portion and is rejected. Package
/// plans use the same subtraction but skip the negative check, matching the
/// billing rules as practised.
pub fn compute_price_split(
    patient_type: PatientType,
    price_total: i64,
    declared_copay: Option<i64>,
) -> Result<PriceSplit, AppointmentError> {
    match patient_type {
        PatientType::Private => Ok(PriceSplit {
            total: price_total,
            copay: 0,
            insurer: 0,
        }),
        PatientType::InsuranceCopay => {
            let copay = declared_copay.unwrap_or(0);
            let insurer = price_total - copay;
            if insurer < 0 {
                return Err(AppointmentError::CopayExceedsTotal);
            }
            Ok(PriceSplit {
                total: price_total,
                copay,
                insurer,
            })
        }
        PatientType::InsurancePackage => {
            let copay = declared_copay.unwrap_or(0);
            Ok(PriceSplit {
                total: price_total,
                copay,
                insurer: price_total - copay,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_patient_pays_everything_out_of_pocket() {
        let split = compute_price_split(PatientType::Private, 120_000, Some(50_000)).unwrap();
        assert_eq!(split.total, 120_000);
        assert_eq!(split.copay, 0);
        assert_eq!(split.insurer, 0);
    }

    #[test]
    fn copay_plan_bills_remainder_to_insurer() {
        let split =
            compute_price_split(PatientType::InsuranceCopay, 100_000, Some(30_000)).unwrap();
        assert_eq!(split.copay, 30_000);
        assert_eq!(split.insurer, 70_000);
    }

    #[test]
    fn copay_defaults_to_zero_when_not_declared() {
        let split = compute_price_split(PatientType::InsuranceCopay, 100_000, None).unwrap();
        assert_eq!(split.copay, 0);
        assert_eq!(split.insurer, 100_000);
    }

    #[test]
    fn copay_above_total_is_rejected() {
        let err =
            compute_price_split(PatientType::InsuranceCopay, 100_000, Some(150_000)).unwrap_err();
        assert!(matches!(err, AppointmentError::CopayExceedsTotal));
    }

    #[test]
    fn package_plan_skips_the_negative_check() {
        // Deliberate asymmetry with the copay plan.
        let split =
            compute_price_split(PatientType::InsurancePackage, 100_000, Some(150_000)).unwrap();
        assert_eq!(split.copay, 150_000);
        assert_eq!(split.insurer, -50_000);
    }
}
