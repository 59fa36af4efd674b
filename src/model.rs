// Data returned by the receipt analysis service. Field names mirror the
// JSON the service sends, so no serde renames are needed.

use serde::Deserialize;

use crate::error::AnalysisError;

/// Success envelope: the service wraps the result in a `data` field.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AnalyzeResponse {
    pub data: AnalysisResult,
}

/// Emissions breakdown for one receipt.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub total_co2_kg: f64,
    pub range: EmissionRange,
    /// Natural-language comparison, e.g. "setara dengan menyalakan lampu
    /// 10 jam". Older service builds may omit it.
    #[serde(default)]
    pub comparison: String,
    pub items: Vec<ReceiptItem>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EmissionRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReceiptItem {
    pub name: String,
    pub qty: f64,
    pub total_price: f64,
    pub co2_kg: f64,
}

impl AnalysisResult {
    /// Reject payloads that parse but cannot be rendered sensibly.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_amount("total_co2_kg", self.total_co2_kg)?;
        check_amount("range.min", self.range.min)?;
        check_amount("range.max", self.range.max)?;
        if self.range.min > self.range.max {
            return Err(AnalysisError::Malformed(format!(
                "range.min ({}) is greater than range.max ({})",
                self.range.min, self.range.max
            )));
        }
        for (index, item) in self.items.iter().enumerate() {
            check_amount(&format!("items[{index}].qty"), item.qty)?;
            check_amount(&format!("items[{index}].total_price"), item.total_price)?;
            check_amount(&format!("items[{index}].co2_kg"), item.co2_kg)?;
        }
        Ok(())
    }
}

fn check_amount(field: &str, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::Malformed(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk_result() -> AnalysisResult {
        AnalysisResult {
            total_co2_kg: 2.4,
            range: EmissionRange { min: 2.0, max: 2.8 },
            comparison: "Setara dengan berkendara 10 km".into(),
            items: vec![ReceiptItem {
                name: "Milk".into(),
                qty: 1.0,
                total_price: 18000.0,
                co2_kg: 1.1,
            }],
        }
    }

    #[test]
    fn parses_the_service_envelope() {
        let body = r#"{
            "data": {
                "total_co2_kg": 2.4,
                "range": { "min": 2.0, "max": 2.8 },
                "comparison": "Setara dengan berkendara 10 km",
                "items": [{ "name": "Milk", "qty": 1, "total_price": 18000, "co2_kg": 1.1 }]
            }
        }"#;
        let parsed: AnalyzeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data, milk_result());
    }

    #[test]
    fn missing_comparison_defaults_to_empty() {
        let body = r#"{ "total_co2_kg": 0, "range": { "min": 0, "max": 0 }, "items": [] }"#;
        let parsed: AnalysisResult = serde_json::from_str(body).unwrap();
        assert!(parsed.comparison.is_empty());
    }

    #[test]
    fn missing_items_is_a_parse_error() {
        let body = r#"{ "total_co2_kg": 1, "range": { "min": 0, "max": 2 }, "comparison": "" }"#;
        assert!(serde_json::from_str::<AnalysisResult>(body).is_err());
    }

    #[test]
    fn validate_accepts_well_formed_results() {
        assert!(milk_result().validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut result = milk_result();
        result.range = EmissionRange { min: 3.0, max: 1.0 };
        assert!(matches!(result.validate(), Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn validate_rejects_negative_item_values() {
        let mut result = milk_result();
        result.items[0].total_price = -1.0;
        let err = result.validate().unwrap_err();
        assert!(err.to_string().contains("items[0].total_price"));
    }
}
