//! Rule compiler: turns table templates into tagged concrete rules
//!
//! Compilation is total. Missing or invalid parameter values fall back to the
//! material's default choice, and markers that cannot be resolved are logged
//! and dropped, so a [`ConcreteRule`] never carries one.

use crate::material::{Category, Grade, MaterialDef};
use crate::rule::{ConcreteRule, DynamicParam, Predicate, RuleBody, RuleKind, RuleTemplate};
use crate::table::EffectSpec;

/// Everything the compiler needs besides the template itself
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    pub material: &'a MaterialDef,
    pub grade: Grade,
    pub category: Category,
    /// Stored or pending parameter value, if any
    pub parameter: Option<&'a str>,
    /// Written into every rule's flags
    pub module_id: &'a str,
    /// Prefix of generated labels (e.g. `PMR`)
    pub label_prefix: &'a str,
}

impl<'a> CompileContext<'a> {
    /// The parameter value the rules will be built with
    pub fn resolved_parameter(&self) -> Option<&'a str> {
        let spec = self.material.parameter.as_ref()?;
        if let Some(value) = self.parameter {
            if !spec.accepts(value) {
                tracing::warn!(
                    material = %self.material.key,
                    value,
                    "parameter value is not a declared choice, using default"
                );
            }
        }
        spec.resolve(self.parameter)
    }

    fn default_label(&self) -> String {
        format!(
            "{}: {} {} {}",
            self.label_prefix, self.material.key, self.grade, self.category
        )
    }
}

/// Compile a single template
pub fn compile(template: &RuleTemplate, ctx: &CompileContext<'_>) -> ConcreteRule {
    let mut body = template.body().clone();

    if body.label.is_none() && !body.kind.is_annotation() {
        body.label = Some(ctx.default_label());
    }

    let params = template.params();
    if !params.is_empty() {
        match ctx.resolved_parameter() {
            Some(value) => {
                for param in params {
                    apply_param(&mut body, param, value, ctx);
                }
            }
            None => tracing::warn!(
                material = %ctx.material.key,
                "material declares no parameter, dynamic fields left as written"
            ),
        }
    }

    ConcreteRule {
        owner: ctx.module_id.to_string(),
        body,
    }
}

/// Compile every template of an entry, in order; absent entries yield nothing
pub fn compile_all(spec: Option<&EffectSpec>, ctx: &CompileContext<'_>) -> Vec<ConcreteRule> {
    spec.map(|spec| spec.rules.iter().map(|t| compile(t, ctx)).collect())
        .unwrap_or_default()
}

fn apply_param(body: &mut RuleBody, param: &DynamicParam, value: &str, ctx: &CompileContext<'_>) {
    match param {
        DynamicParam::TraitPredicate => {
            body.predicate = vec![Predicate::item_trait(value)];
        }
        DynamicParam::DamageType => match &mut body.kind {
            RuleKind::Resistance {
                damage_type,
                value: amount,
            } => {
                *damage_type = value.to_string();
                body.label = Some(damage_label(ctx, value, "Resist", *amount));
            }
            RuleKind::Weakness {
                damage_type,
                value: amount,
            } => {
                *damage_type = value.to_string();
                body.label = Some(damage_label(ctx, value, "Weakness", *amount));
            }
            other => tracing::warn!(
                material = %ctx.material.key,
                kind = other.key(),
                "damage-type marker on a rule without a damage type"
            ),
        },
        DynamicParam::Other(name) => tracing::warn!(
            material = %ctx.material.key,
            marker = %name,
            "unknown dynamic marker, rule copied unresolved"
        ),
    }
}

fn damage_label(ctx: &CompileContext<'_>, value: &str, what: &str, amount: i64) -> String {
    format!(
        "{}: {} {} ({} {} {})",
        ctx.label_prefix,
        ctx.material.name,
        ctx.category.title(),
        capitalize(value),
        what,
        amount
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
