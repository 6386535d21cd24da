// crosscheck-core/src/domain/quality/evaluator.rs

use crate::domain::catalog::{Rule, RuleKind};
use crate::domain::error::DomainError;
use crate::domain::quality::value::{FetchOutcome, ScalarValue};
use crate::domain::quality::verdict::Verdict;

/// Pure rule evaluation: no I/O, no shared state.
///
/// A missing row (`NotFound`) and a NULL column are the same "missing value"
/// for every kind, so all three built-in kinds report them as violations.
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Fails fast on rules the evaluator cannot honour, before any fetch happens.
    pub fn ensure_supported(rule: &Rule) -> Result<(), DomainError> {
        match &rule.kind {
            RuleKind::Other(raw) => Err(DomainError::UnsupportedRuleKind(raw.clone())),
            RuleKind::EnumValue if rule.allowed_values.is_empty() => Err(DomainError::InvalidRule {
                rule_id: rule.id.clone(),
                reason: "ENUM_VALUE rule declares no allowed values".to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn evaluate(outcome: &FetchOutcome, rule: &Rule) -> Result<Verdict, DomainError> {
        Self::evaluate_kind(outcome.present(), &rule.kind, &rule.allowed_values)
    }

    pub fn evaluate_kind(
        value: Option<&ScalarValue>,
        kind: &RuleKind,
        allowed_values: &[String],
    ) -> Result<Verdict, DomainError> {
        let violated = match kind {
            RuleKind::NotNull => match value {
                None => true,
                Some(ScalarValue::Text(s)) => s.trim().is_empty(),
                Some(_) => false,
            },
            RuleKind::PositiveValue => match value.and_then(ScalarValue::as_number) {
                Some(n) => n <= 0.0,
                None => true,
            },
            RuleKind::EnumValue => match value.and_then(ScalarValue::as_text) {
                Some(text) => {
                    let text = text.trim();
                    !allowed_values
                        .iter()
                        .any(|allowed| allowed.trim().eq_ignore_ascii_case(text))
                }
                None => true,
            },
            RuleKind::Other(raw) => return Err(DomainError::UnsupportedRuleKind(raw.clone())),
        };

        Ok(if violated { Verdict::Violation } else { Verdict::Ok })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn text(s: &str) -> ScalarValue {
        ScalarValue::Text(s.into())
    }

    fn eval(value: Option<ScalarValue>, kind: RuleKind) -> Verdict {
        let allowed = vec!["BUY".to_string(), "SELL".to_string()];
        RuleEvaluator::evaluate_kind(value.as_ref(), &kind, &allowed).unwrap()
    }

    #[test]
    fn test_not_null() {
        assert_eq!(eval(None, RuleKind::NotNull), Verdict::Violation);
        assert_eq!(eval(Some(text("   ")), RuleKind::NotNull), Verdict::Violation);
        assert_eq!(eval(Some(text("AAPL")), RuleKind::NotNull), Verdict::Ok);
        assert_eq!(eval(Some(ScalarValue::Int(0)), RuleKind::NotNull), Verdict::Ok);
    }

    #[test]
    fn test_positive_value() {
        assert_eq!(eval(None, RuleKind::PositiveValue), Verdict::Violation);
        assert_eq!(
            eval(Some(ScalarValue::Int(-15)), RuleKind::PositiveValue),
            Verdict::Violation
        );
        assert_eq!(
            eval(Some(ScalarValue::Int(0)), RuleKind::PositiveValue),
            Verdict::Violation
        );
        assert_eq!(
            eval(Some(ScalarValue::Float(0.01)), RuleKind::PositiveValue),
            Verdict::Ok
        );
        assert_eq!(eval(Some(text("150.5")), RuleKind::PositiveValue), Verdict::Ok);
        assert_eq!(
            eval(Some(text("lots")), RuleKind::PositiveValue),
            Verdict::Violation
        );
    }

    #[test]
    fn test_enum_value_is_case_insensitive() {
        assert_eq!(eval(Some(text("buy")), RuleKind::EnumValue), Verdict::Ok);
        assert_eq!(eval(Some(text(" SELL ")), RuleKind::EnumValue), Verdict::Ok);
        assert_eq!(eval(Some(text("HOLD")), RuleKind::EnumValue), Verdict::Violation);
        assert_eq!(eval(None, RuleKind::EnumValue), Verdict::Violation);
    }

    #[test]
    fn test_missing_row_and_null_are_both_violations() {
        let rule = Rule {
            id: "qty".into(),
            description: "Quantity must be positive".into(),
            kind: RuleKind::PositiveValue,
            allowed_values: vec![],
        };
        assert_eq!(
            RuleEvaluator::evaluate(&FetchOutcome::NotFound, &rule).unwrap(),
            Verdict::Violation
        );
        assert_eq!(
            RuleEvaluator::evaluate(&FetchOutcome::Found(ScalarValue::Null), &rule).unwrap(),
            Verdict::Violation
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let kind = RuleKind::from("RANGE_CHECK");
        let res = RuleEvaluator::evaluate_kind(Some(&ScalarValue::Int(5)), &kind, &[]);
        assert_eq!(
            res.unwrap_err(),
            DomainError::UnsupportedRuleKind("RANGE_CHECK".into())
        );
    }

    #[test]
    fn test_ensure_supported() {
        let mut rule = Rule {
            id: "side".into(),
            description: "Side".into(),
            kind: RuleKind::EnumValue,
            allowed_values: vec![],
        };
        assert!(matches!(
            RuleEvaluator::ensure_supported(&rule),
            Err(DomainError::InvalidRule { .. })
        ));
        rule.allowed_values = vec!["BUY".into()];
        assert!(RuleEvaluator::ensure_supported(&rule).is_ok());
    }
}
