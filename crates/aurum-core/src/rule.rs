//! Rule templates and the concrete rules rendered onto host items
//!
//! A [`RuleTemplate`] is what the effect table stores. Compiling it (see
//! [`crate::compile`]) yields a [`ConcreteRule`], which carries the owning
//! module id and cannot hold an unresolved parameter marker. The host only
//! ever sees the [`ValueMap`] produced by [`ConcreteRule::to_host`].

use crate::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// Degree of success a note or adjustment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CriticalFailure => "criticalFailure",
            Outcome::Failure => "failure",
            Outcome::Success => "success",
            Outcome::CriticalSuccess => "criticalSuccess",
        }
    }
}

/// How far an outcome is moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegreeShift {
    OneDegreeBetter,
    OneDegreeWorse,
    TwoDegreesBetter,
    TwoDegreesWorse,
}

impl DegreeShift {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeShift::OneDegreeBetter => "one-degree-better",
            DegreeShift::OneDegreeWorse => "one-degree-worse",
            DegreeShift::TwoDegreesBetter => "two-degrees-better",
            DegreeShift::TwoDegreesWorse => "two-degrees-worse",
        }
    }
}

/// A single outcome adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub outcome: Outcome,
    pub shift: DegreeShift,
}

/// Bonus type of a flat modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierType {
    Circumstance,
    Item,
    Status,
}

impl ModifierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModifierType::Circumstance => "circumstance",
            ModifierType::Item => "item",
            ModifierType::Status => "status",
        }
    }
}

/// Which of two rolls is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keep {
    Higher,
    Lower,
}

impl Keep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keep::Higher => "higher",
            Keep::Lower => "lower",
        }
    }
}

/// Applicability condition of a rule
///
/// An atom is a host predicate string such as `item:trait:fire`. A rule
/// applies when every top-level predicate holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    Atom(String),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Create an atom predicate
    pub fn atom(s: impl Into<String>) -> Self {
        Predicate::Atom(s.into())
    }

    /// The trait predicate for a chosen value, e.g. `item:trait:cold`
    pub fn item_trait(value: &str) -> Self {
        Predicate::Atom(format!("item:trait:{}", value))
    }

    fn to_value(&self) -> Value {
        match self {
            Predicate::Atom(s) => Value::String(s.clone()),
            Predicate::Or(alternatives) => {
                let mut map = ValueMap::new();
                map.insert(
                    "or".to_string(),
                    Value::List(alternatives.iter().map(Predicate::to_value).collect()),
                );
                Value::Map(map)
            }
        }
    }
}

/// The kind of a rule, with its kind-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleKind {
    Resistance {
        damage_type: String,
        value: i64,
    },
    Weakness {
        damage_type: String,
        value: i64,
    },
    FlatModifier {
        selector: String,
        value: i64,
        modifier_type: ModifierType,
    },
    /// Pure annotation shown on rolls
    Note {
        selector: String,
        text: String,
        #[serde(default)]
        outcome: Vec<Outcome>,
    },
    RollTwice {
        selector: String,
        keep: Keep,
    },
    AdjustDegreeOfSuccess {
        selector: String,
        adjustment: Vec<Adjustment>,
    },
}

impl RuleKind {
    /// Host key of the rule kind
    pub fn key(&self) -> &'static str {
        match self {
            RuleKind::Resistance { .. } => "Resistance",
            RuleKind::Weakness { .. } => "Weakness",
            RuleKind::FlatModifier { .. } => "FlatModifier",
            RuleKind::Note { .. } => "Note",
            RuleKind::RollTwice { .. } => "RollTwice",
            RuleKind::AdjustDegreeOfSuccess { .. } => "AdjustDegreeOfSuccess",
        }
    }

    /// Notes carry text only and never get a synthesized label
    pub fn is_annotation(&self) -> bool {
        matches!(self, RuleKind::Note { .. })
    }
}

/// Fields shared by templates and concrete rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBody {
    pub kind: RuleKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub predicate: Vec<Predicate>,
}

impl RuleBody {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            label: None,
            predicate: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_predicate(mut self, predicate: Vec<Predicate>) -> Self {
        self.predicate = predicate;
        self
    }
}

/// A marker naming a field that depends on the material's parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DynamicParam {
    /// Restrict the rule to the chosen value's trait
    TraitPredicate,
    /// Substitute the chosen value as the damage type
    DamageType,
    /// Unrecognized marker; left unresolved
    Other(String),
}

impl From<String> for DynamicParam {
    fn from(s: String) -> Self {
        match s.as_str() {
            "trait-predicate" => DynamicParam::TraitPredicate,
            "damage-type" => DynamicParam::DamageType,
            _ => DynamicParam::Other(s),
        }
    }
}

impl From<DynamicParam> for String {
    fn from(p: DynamicParam) -> Self {
        match p {
            DynamicParam::TraitPredicate => "trait-predicate".to_string(),
            DynamicParam::DamageType => "damage-type".to_string(),
            DynamicParam::Other(s) => s,
        }
    }
}

/// A rule as stored in the effect table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleTemplate {
    /// Copied as-is
    Fixed(RuleBody),
    /// Has fields filled in from the material's parameter
    Parameterized {
        body: RuleBody,
        params: Vec<DynamicParam>,
    },
}

impl RuleTemplate {
    /// The template body, before any parameter resolution
    pub fn body(&self) -> &RuleBody {
        match self {
            RuleTemplate::Fixed(body) => body,
            RuleTemplate::Parameterized { body, .. } => body,
        }
    }

    /// Dynamic markers of this template (empty for fixed rules)
    pub fn params(&self) -> &[DynamicParam] {
        match self {
            RuleTemplate::Fixed(_) => &[],
            RuleTemplate::Parameterized { params, .. } => params,
        }
    }
}

/// A compiled rule owned by a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteRule {
    /// Module id written into the rule's flags
    pub owner: String,
    pub body: RuleBody,
}

impl ConcreteRule {
    /// Render the rule in the host's map shape
    pub fn to_host(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("key".to_string(), self.body.kind.key().into());

        match &self.body.kind {
            RuleKind::Resistance { damage_type, value } | RuleKind::Weakness { damage_type, value } => {
                map.insert("type".to_string(), damage_type.as_str().into());
                map.insert("value".to_string(), (*value).into());
            }
            RuleKind::FlatModifier {
                selector,
                value,
                modifier_type,
            } => {
                map.insert("selector".to_string(), selector.as_str().into());
                map.insert("value".to_string(), (*value).into());
                map.insert("type".to_string(), modifier_type.as_str().into());
            }
            RuleKind::Note {
                selector,
                text,
                outcome,
            } => {
                map.insert("selector".to_string(), selector.as_str().into());
                map.insert("text".to_string(), text.as_str().into());
                if !outcome.is_empty() {
                    let outcomes: Vec<Value> = outcome.iter().map(|o| o.as_str().into()).collect();
                    map.insert("outcome".to_string(), Value::List(outcomes));
                }
            }
            RuleKind::RollTwice { selector, keep } => {
                map.insert("selector".to_string(), selector.as_str().into());
                map.insert("keep".to_string(), keep.as_str().into());
            }
            RuleKind::AdjustDegreeOfSuccess {
                selector,
                adjustment,
            } => {
                map.insert("selector".to_string(), selector.as_str().into());
                let mut shifts = ValueMap::new();
                for adj in adjustment {
                    shifts.insert(adj.outcome.as_str().to_string(), adj.shift.as_str().into());
                }
                map.insert("adjustment".to_string(), Value::Map(shifts));
            }
        }

        if let Some(label) = &self.body.label {
            map.insert("label".to_string(), label.as_str().into());
        }
        if !self.body.predicate.is_empty() {
            map.insert(
                "predicate".to_string(),
                Value::List(self.body.predicate.iter().map(Predicate::to_value).collect()),
            );
        }

        let mut flags = ValueMap::new();
        flags.insert(self.owner.clone(), Value::Bool(true));
        map.insert("flags".to_string(), Value::Map(flags));
        map
    }
}

/// Check whether a host rule carries the ownership flag of `module_id`
pub fn is_owned(rule: &ValueMap, module_id: &str) -> bool {
    crate::value::lookup(rule, &["flags", module_id]).and_then(Value::as_bool) == Some(true)
}

/// Remove every rule owned by `module_id`, preserving the order of the rest
pub fn strip_owned(rules: &[ValueMap], module_id: &str) -> Vec<ValueMap> {
    rules
        .iter()
        .filter(|rule| !is_owned(rule, module_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = "test-module";

    fn user_rule(label: &str) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("key".to_string(), "FlatModifier".into());
        map.insert("label".to_string(), label.into());
        map
    }

    fn owned(body: RuleBody) -> ConcreteRule {
        ConcreteRule {
            owner: MODULE.to_string(),
            body,
        }
    }

    #[test]
    fn test_note_to_host() {
        let rule = owned(RuleBody::new(RuleKind::Note {
            selector: "strike-damage".to_string(),
            text: "Burning Agony".to_string(),
            outcome: vec![Outcome::CriticalSuccess],
        }));
        let host = rule.to_host();

        assert_eq!(host.get("key"), Some(&Value::from("Note")));
        assert_eq!(
            host.get("outcome"),
            Some(&Value::from(vec!["criticalSuccess"]))
        );
        assert!(host.get("label").is_none());
        assert!(host.get("predicate").is_none());
        assert!(is_owned(&host, MODULE));
    }

    #[test]
    fn test_adjustment_and_or_predicate_to_host() {
        let rule = owned(
            RuleBody::new(RuleKind::AdjustDegreeOfSuccess {
                selector: "saving-throw".to_string(),
                adjustment: vec![Adjustment {
                    outcome: Outcome::Success,
                    shift: DegreeShift::OneDegreeBetter,
                }],
            })
            .with_predicate(vec![Predicate::Or(vec![
                Predicate::atom("item:trait:evil"),
                Predicate::atom("item:trait:curse"),
            ])]),
        );
        let host = rule.to_host();

        assert_eq!(
            crate::value::lookup(&host, &["adjustment", "success"]),
            Some(&Value::from("one-degree-better"))
        );
        let predicate = host.get("predicate").and_then(Value::as_list).unwrap();
        assert_eq!(
            predicate[0].lookup(&["or"]).and_then(Value::as_list).map(|l| l.len()),
            Some(2)
        );
    }

    #[test]
    fn test_strip_owned_is_idempotent() {
        let rule = owned(
            RuleBody::new(RuleKind::Resistance {
                damage_type: "physical".to_string(),
                value: 2,
            })
            .with_label("Adamantine"),
        );
        let rules = vec![user_rule("a"), rule.to_host(), user_rule("b")];

        let once = strip_owned(&rules, MODULE);
        let twice = strip_owned(&once, MODULE);
        assert_eq!(once, vec![user_rule("a"), user_rule("b")]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_other_module_flags_are_kept() {
        let rule = ConcreteRule {
            owner: "another-module".to_string(),
            body: RuleBody::new(RuleKind::RollTwice {
                selector: "initiative".to_string(),
                keep: Keep::Higher,
            }),
        };
        let rules = vec![rule.to_host()];
        assert_eq!(strip_owned(&rules, MODULE).len(), 1);
    }

    #[test]
    fn test_dynamic_param_names() {
        assert_eq!(
            DynamicParam::from("damage-type".to_string()),
            DynamicParam::DamageType
        );
        assert_eq!(
            DynamicParam::from("aura".to_string()),
            DynamicParam::Other("aura".to_string())
        );
        let parsed: Vec<DynamicParam> = ron::from_str(r#"["trait-predicate"]"#).unwrap();
        assert_eq!(parsed, vec![DynamicParam::TraitPredicate]);
    }

    #[test]
    fn test_template_from_ron() {
        let template: RuleTemplate = ron::from_str(
            r#"Parameterized(
                body: (
                    kind: Resistance(damage_type: "fire", value: 5),
                    label: Some("Element Resist"),
                ),
                params: ["damage-type"],
            )"#,
        )
        .unwrap();
        assert_eq!(template.params(), &[DynamicParam::DamageType]);
        assert_eq!(template.body().kind.key(), "Resistance");
    }
}
