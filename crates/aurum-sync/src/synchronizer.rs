//! Lifecycle synchronizer
//!
//! Keeps two things in step with an item's material, grade and parameter:
//! the rules this module owns on the item, and the actions it granted to the
//! item's actor. Rules are rewritten inside the pending change
//! ([`Synchronizer::prepare_update`]); actions are torn down and rebuilt after
//! the change is committed, by the originating session only
//! ([`Synchronizer::after_update`]).

use crate::commit::{self, ApplyResult};
use crate::config::SyncConfig;
use crate::host::{
    HostItem, HostStore, ItemChange, LinkMeta, MaterialRegistry, NewSubEntity,
    SubEntityRecord,
};
use crate::plan::{StoreOp, SyncPlan};
use crate::{Error, Result};
use aurum_core::rule::strip_owned;
use aurum_core::{
    check_compatibility, compile_all, Category, Cmd, CompileContext, DocId, Grade, MaterialDef,
    MaterialKey, ValueMap,
};
use aurum_script::Definitions;

/// Derives rules and granted actions from material state
#[derive(Debug)]
pub struct Synchronizer {
    defs: Definitions,
    config: SyncConfig,
}

impl Synchronizer {
    /// Create a synchronizer over loaded definitions
    pub fn new(defs: Definitions, config: SyncConfig) -> Self {
        Self { defs, config }
    }

    /// Create a synchronizer over the built-in definitions
    pub fn with_builtin(config: SyncConfig) -> Result<Self> {
        Ok(Self::new(aurum_script::builtin()?, config))
    }

    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Startup notice; returns the number of materials loaded
    pub fn ready(&self) -> usize {
        let materials = self.defs.table.len();
        tracing::info!(
            module = self.config.module_id(),
            materials,
            actions = self.defs.catalog.len(),
            "material synchronizer ready"
        );
        materials
    }

    /// Register materials the host does not know natively
    ///
    /// Already registered materials are left alone. Returns how many were added.
    pub fn register_custom_materials<R: MaterialRegistry + ?Sized>(&self, registry: &mut R) -> usize {
        let mut added = 0;
        for def in self.defs.table.custom_materials() {
            if registry.has_material(&def.key) {
                continue;
            }
            registry.register_material(&def.key, &def.name);
            tracing::info!(material = %def.key, "registered custom material");
            added += 1;
        }
        added
    }

    /// Rules this module should own on an item in its current state
    pub fn expected_rules(&self, item: &HostItem) -> Vec<ValueMap> {
        match item.category() {
            Some(category) => self.compiled_rules(
                item,
                category,
                item.material_key(),
                item.grade,
                None,
            ),
            None => Vec::new(),
        }
    }

    /// Pre-create hook: compile rules for an item created with a material set
    pub fn prepare_create(&self, item: &mut HostItem) -> Cmd {
        let Some(category) = item.category() else {
            return Cmd::none();
        };
        let material = item.material_key().cloned();
        let grade = item.grade;

        let mut rules = strip_owned(&item.rules, self.config.module_id());
        let warnings = self.compatibility(item, category, material.as_ref(), grade);
        rules.extend(self.compiled_rules(item, category, material.as_ref(), grade, None));
        item.rules = rules;
        warnings
    }

    /// Pre-commit hook: rewrite the pending rule list
    ///
    /// Runs once per transaction, in the session that issued the change.
    pub fn prepare_update(&self, item: &HostItem, change: &mut ItemChange) -> Cmd {
        let Some(category) = item.category() else {
            return Cmd::none();
        };

        let material = change
            .material
            .resolve(item.material.as_ref())
            .filter(|k| !k.is_empty());
        let grade = change.grade.resolve(item.grade.as_ref());
        let pending = self.pending_parameter(material.as_ref(), change);

        if !change.touches_material() && pending.is_none() {
            return Cmd::none();
        }

        tracing::debug!(
            item = %item.id,
            material = ?material.as_ref().map(|k| k.as_str()),
            grade = ?grade,
            parameter = ?pending,
            "material change"
        );

        let base = change.rules.as_ref().unwrap_or(&item.rules);
        let mut rules = strip_owned(base, self.config.module_id());
        let warnings = self.compatibility(item, category, material.as_ref(), grade);
        let compiled = self.compiled_rules(item, category, material.as_ref(), grade, pending.as_deref());

        tracing::debug!(item = %item.id, rules = compiled.len(), "injected material rules");
        rules.extend(compiled);
        change.rules = Some(rules);
        warnings
    }

    /// Post-commit hook: prompt for a missing parameter and rebuild actions
    ///
    /// `item` is the committed state. Only the originating session acts;
    /// every other session must pass `is_originator = false`. A prompt
    /// produced before a store failure travels with the error
    /// (see [`Error::into_parts`]).
    pub fn after_update<S: HostStore + ?Sized>(
        &self,
        store: &mut S,
        item: &HostItem,
        change: &ItemChange,
        is_originator: bool,
    ) -> Result<Cmd> {
        if !is_originator {
            return Ok(Cmd::none());
        }
        let Some(category) = item.category() else {
            return Ok(Cmd::none());
        };

        let def = item.material_key().and_then(|k| self.defs.material(k));
        let parameter_touched = def
            .and_then(|d| d.parameter.as_ref())
            .map(|p| change.flags.contains_key(&p.flag))
            .unwrap_or(false);
        if !change.touches_material() && !parameter_touched {
            return Ok(Cmd::none());
        }

        let prompt = match def {
            Some(def) if change.touches_material() => self.parameter_prompt(item, def),
            _ => Cmd::none(),
        };

        let Some(actor) = &item.actor else {
            return Ok(prompt);
        };

        match self.resync_actions(store, item, actor, category) {
            Ok(()) => Ok(prompt),
            Err(e) => Err(e.with_cmd(prompt)),
        }
    }

    /// Created hook: prompt and grant actions for an item created with a
    /// material set; the post-commit path without a teardown
    pub fn on_created<S: HostStore + ?Sized>(
        &self,
        store: &mut S,
        item: &HostItem,
        is_originator: bool,
    ) -> Result<Cmd> {
        if !is_originator {
            return Ok(Cmd::none());
        }
        let Some(category) = item.category() else {
            return Ok(Cmd::none());
        };

        let prompt = item
            .material_key()
            .and_then(|k| self.defs.material(k))
            .map(|def| self.parameter_prompt(item, def))
            .unwrap_or_else(Cmd::none);

        let Some(actor) = &item.actor else {
            return Ok(prompt);
        };

        match commit::apply(self.rebuild_plan(item, actor, category), store) {
            Ok(applied) => {
                self.log_applied(item, &applied);
                Ok(prompt)
            }
            Err(e) => Err(e.with_cmd(prompt)),
        }
    }

    /// Deleted/removed hook: drop every action the item granted
    pub fn on_removed<S: HostStore + ?Sized>(
        &self,
        store: &mut S,
        item: &HostItem,
        is_originator: bool,
    ) -> Result<usize> {
        if !is_originator {
            return Ok(0);
        }
        let Some(actor) = &item.actor else {
            return Ok(0);
        };
        if item.category().is_none() {
            return Ok(0);
        }

        let existing = store.sub_entities(actor)?;
        let applied = commit::apply(self.teardown_plan(item, actor, &existing), store)?;
        self.log_applied(item, &applied);
        Ok(applied.deleted)
    }

    /// Remove every action this module granted on an actor
    pub fn remove_all_actions<S: HostStore + ?Sized>(&self, store: &mut S, actor: &DocId) -> Result<usize> {
        let ids: Vec<DocId> = store
            .sub_entities(actor)?
            .into_iter()
            .filter(|r| r.is_owned_by(self.config.module_id()))
            .map(|r| r.id)
            .collect();

        let mut plan = SyncPlan::new();
        plan.push(StoreOp::DeleteSubEntities {
            actor: actor.clone(),
            ids,
        });
        let applied = commit::apply(plan, store)?;
        tracing::info!(%actor, removed = applied.deleted, "removed all material actions");
        Ok(applied.deleted)
    }

    /// Turn a prompt answer into the change that stores it
    pub fn choose_parameter(&self, item: &HostItem, value: &str) -> Result<ItemChange> {
        let (def, spec) = self.parameter_spec(item)?;
        if !spec.accepts(value) {
            return Err(Error::InvalidParameter {
                material: def.key.clone(),
                value: value.to_string(),
            });
        }
        tracing::info!(item = %item.id, value, "parameter selected");
        Ok(ItemChange::new().with_flag(spec.flag.as_str(), value))
    }

    /// Turn a dismissed prompt into the change that stores the default
    pub fn decline_parameter(&self, item: &HostItem) -> Result<ItemChange> {
        let (def, spec) = self.parameter_spec(item)?;
        let value = spec
            .default_choice()
            .ok_or_else(|| Error::NoParameter(def.key.clone()))?;
        tracing::info!(item = %item.id, value, "parameter prompt dismissed, storing default");
        Ok(ItemChange::new().with_flag(spec.flag.as_str(), value))
    }

    fn parameter_spec<'a>(
        &'a self,
        item: &HostItem,
    ) -> Result<(&'a MaterialDef, &'a aurum_core::ParameterSpec)> {
        let key = item
            .material_key()
            .ok_or_else(|| Error::NoMaterial(item.id.clone()))?;
        let def = self
            .defs
            .material(key)
            .ok_or_else(|| Error::NoParameter(key.clone()))?;
        let spec = def
            .parameter
            .as_ref()
            .ok_or_else(|| Error::NoParameter(key.clone()))?;
        Ok((def, spec))
    }

    /// The parameter value carried by a pending change, if the prospective
    /// material has a parameter and the change sets its flag
    fn pending_parameter(&self, material: Option<&MaterialKey>, change: &ItemChange) -> Option<String> {
        let spec = self.defs.material(material?)?.parameter.as_ref()?;
        change.flag(&spec.flag).map(str::to_string)
    }

    fn parameter_prompt(&self, item: &HostItem, def: &MaterialDef) -> Cmd {
        let Some(spec) = &def.parameter else {
            return Cmd::none();
        };
        if !self.config.prompt_for_parameters() || item.flag(&spec.flag).is_some() {
            return Cmd::none();
        }
        let Some(default) = spec.default_choice() else {
            return Cmd::none();
        };

        tracing::debug!(item = %item.id, material = %def.key, "requesting parameter");
        Cmd::RequestParameter {
            item: item.id.clone(),
            material: def.key.clone(),
            parameter: spec.flag.clone(),
            choices: spec.choices.clone(),
            default: default.to_string(),
        }
    }

    fn compatibility(
        &self,
        item: &HostItem,
        category: Category,
        material: Option<&MaterialKey>,
        grade: Option<Grade>,
    ) -> Cmd {
        let Some(def) = material.and_then(|k| self.defs.material(k)) else {
            return Cmd::none();
        };
        if grade.and_then(|g| def.effects(g, category)).is_none() {
            return Cmd::none();
        }

        let warnings = check_compatibility(def, category, &item.shape_hints());
        Cmd::batch(
            warnings
                .into_iter()
                .map(|w| {
                    tracing::warn!(item = %item.id, material = %w.material, warning = %w.message, "incompatible material");
                    Cmd::warn(item.id.clone(), w.message)
                })
                .collect(),
        )
    }

    fn compiled_rules(
        &self,
        item: &HostItem,
        category: Category,
        material: Option<&MaterialKey>,
        grade: Option<Grade>,
        pending: Option<&str>,
    ) -> Vec<ValueMap> {
        let (Some(key), Some(grade)) = (material, grade) else {
            return Vec::new();
        };
        let Some(def) = self.defs.material(key) else {
            tracing::debug!(item = %item.id, material = %key, "unknown material");
            return Vec::new();
        };
        let spec = def.effects(grade, category);
        if spec.is_none() {
            tracing::debug!(item = %item.id, material = %key, %grade, %category, "no effects");
        }

        // A value set in the same change wins over the stored one
        let parameter = pending.or_else(|| {
            def.parameter
                .as_ref()
                .and_then(|p| item.flag(&p.flag))
        });
        let ctx = CompileContext {
            material: def,
            grade,
            category,
            parameter,
            module_id: self.config.module_id(),
            label_prefix: self.config.label_prefix(),
        };
        compile_all(spec, &ctx).iter().map(|r| r.to_host()).collect()
    }

    fn resync_actions<S: HostStore + ?Sized>(
        &self,
        store: &mut S,
        item: &HostItem,
        actor: &DocId,
        category: Category,
    ) -> Result<()> {
        let existing = store.sub_entities(actor)?;
        let mut plan = self.teardown_plan(item, actor, &existing);
        plan.extend(self.rebuild_plan(item, actor, category));
        let applied = commit::apply(plan, store)?;
        self.log_applied(item, &applied);
        Ok(())
    }

    fn teardown_plan(&self, item: &HostItem, actor: &DocId, existing: &[SubEntityRecord]) -> SyncPlan {
        let ids = existing
            .iter()
            .filter(|r| r.is_linked_to(&item.id, self.config.module_id()))
            .map(|r| r.id.clone())
            .collect();

        let mut plan = SyncPlan::new();
        plan.push(StoreOp::DeleteSubEntities {
            actor: actor.clone(),
            ids,
        });
        plan
    }

    fn rebuild_plan(&self, item: &HostItem, actor: &DocId, category: Category) -> SyncPlan {
        let mut plan = SyncPlan::new();
        let (Some(key), Some(grade)) = (item.material_key(), item.grade) else {
            return plan;
        };
        let Some(spec) = self.defs.table.lookup(key, grade, category) else {
            return plan;
        };

        let entries = spec
            .actions
            .iter()
            .filter_map(|action| match self.defs.action(action) {
                Some(def) => Some(NewSubEntity {
                    definition: def.clone(),
                    link: LinkMeta {
                        module: self.config.module_id().to_string(),
                        source_item_id: item.id.clone(),
                        action_key: action.clone(),
                        material_slug: key.clone(),
                        grade,
                        category,
                    },
                }),
                None => {
                    tracing::warn!(%action, material = %key, "unknown action definition, skipped");
                    None
                }
            })
            .collect();

        plan.push(StoreOp::CreateSubEntities {
            actor: actor.clone(),
            entries,
        });
        plan
    }

    fn log_applied(&self, item: &HostItem, applied: &ApplyResult) {
        if applied.deleted > 0 || !applied.created.is_empty() {
            tracing::info!(
                item = %item.id,
                name = %item.name,
                created = applied.created.len(),
                deleted = applied.deleted,
                "synchronized material actions"
            );
        }
    }
}
