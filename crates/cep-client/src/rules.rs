use cep_core::{EngineType, EventType, Packet, ParseError, RuleSubmission};

/// Rule text that has passed the parser seam, bound to the event-type
/// id its derived events will carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRule {
    pub text: String,
    pub assigned_id: EventType,
}

/// Translation seam from rule source text to a submittable rule. The
/// grammar and semantics of the rule language live behind this trait;
/// when an implementation rejects a rule, nothing is sent.
pub trait RuleParser: Send + Sync {
    fn parse(&self, text: &str, assigned_id: EventType) -> Result<ParsedRule, ParseError>;
}

/// Pass-through parser: defers grammar checking to the engine and only
/// rejects rule text that cannot mean anything (blank input).
#[derive(Clone, Copy, Debug, Default)]
pub struct RawRuleParser;

impl RuleParser for RawRuleParser {
    fn parse(&self, text: &str, assigned_id: EventType) -> Result<ParsedRule, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(ParsedRule {
            text: text.to_string(),
            assigned_id,
        })
    }
}

/// Package a parsed rule with the execution-engine selector.
pub fn build_submission(rule: ParsedRule, engine: EngineType) -> Packet {
    Packet::RuleSubmission(RuleSubmission {
        rule_text: rule.text,
        assigned_id: rule.assigned_id,
        engine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_parser_rejects_blank_text() {
        assert_eq!(
            RawRuleParser.parse("", EventType::new(2000)).unwrap_err(),
            ParseError::Empty
        );
        assert_eq!(
            RawRuleParser
                .parse("  \n\t", EventType::new(2000))
                .unwrap_err(),
            ParseError::Empty
        );
    }

    #[test]
    fn raw_parser_passes_text_through() {
        let rule = RawRuleParser
            .parse("define Fire from Smoke", EventType::new(2100))
            .unwrap();
        assert_eq!(rule.text, "define Fire from Smoke");
        assert_eq!(rule.assigned_id, EventType::new(2100));
    }

    #[test]
    fn submission_carries_rule_and_engine() {
        let rule = ParsedRule {
            text: "define Fire from Smoke".into(),
            assigned_id: EventType::new(2100),
        };
        let packet = build_submission(rule, EngineType::Gpu);
        match packet {
            Packet::RuleSubmission(sub) => {
                assert_eq!(sub.rule_text, "define Fire from Smoke");
                assert_eq!(sub.assigned_id, EventType::new(2100));
                assert_eq!(sub.engine, EngineType::Gpu);
            }
            other => panic!("expected rule submission, got {}", other.packet_type()),
        }
    }
}
