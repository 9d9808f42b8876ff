//! In-memory reference host
//!
//! [`MemoryStore`] implements the store and registry seams over plain maps.
//! [`MemoryHost`] plays the host's part: it runs the pre-commit hook once per
//! transaction and replays every post-commit notification to all connected
//! sessions, marking only the issuing one as the originator.

use crate::host::{
    HostItem, HostStore, ItemChange, MaterialRegistry, NewSubEntity, SubEntityRecord,
};
use crate::synchronizer::Synchronizer;
use crate::{Error, Result};
use aurum_core::{Cmd, DocId, MaterialKey};
use indexmap::IndexMap;

/// Store of sub-entities and registered materials
#[derive(Debug, Default)]
pub struct MemoryStore {
    sub_entities: IndexMap<DocId, SubEntityRecord>,
    materials: IndexMap<MaterialKey, String>,
    next_id: u64,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following create/delete fail until switched off
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Add a sub-entity not created by any synchronizer
    pub fn insert_unlinked(&mut self, actor: &DocId, name: impl Into<String>) -> DocId {
        let id = self.allocate_id();
        self.sub_entities.insert(
            id.clone(),
            SubEntityRecord {
                id: id.clone(),
                actor: actor.clone(),
                name: name.into(),
                link: None,
            },
        );
        id
    }

    /// Every sub-entity, in creation order
    pub fn records(&self) -> impl Iterator<Item = &SubEntityRecord> {
        self.sub_entities.values()
    }

    /// Display label of a registered material
    pub fn material_label(&self, key: &MaterialKey) -> Option<&str> {
        self.materials.get(key).map(String::as_str)
    }

    fn allocate_id(&mut self) -> DocId {
        self.next_id += 1;
        DocId::new(format!("sub-{}", self.next_id))
    }
}

impl HostStore for MemoryStore {
    fn sub_entities(&self, actor: &DocId) -> Result<Vec<SubEntityRecord>> {
        Ok(self
            .sub_entities
            .values()
            .filter(|r| &r.actor == actor)
            .cloned()
            .collect())
    }

    fn create_sub_entities(&mut self, actor: &DocId, entries: Vec<NewSubEntity>) -> Result<Vec<DocId>> {
        if self.fail_writes {
            return Err(Error::store("create", "store is read-only"));
        }
        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = self.allocate_id();
            self.sub_entities.insert(
                id.clone(),
                SubEntityRecord {
                    id: id.clone(),
                    actor: actor.clone(),
                    name: entry.definition.name,
                    link: Some(entry.link),
                },
            );
            created.push(id);
        }
        Ok(created)
    }

    fn delete_sub_entities(&mut self, actor: &DocId, ids: &[DocId]) -> Result<usize> {
        if self.fail_writes {
            return Err(Error::store("delete", "store is read-only"));
        }
        let before = self.sub_entities.len();
        self.sub_entities
            .retain(|id, record| !(ids.contains(id) && &record.actor == actor));
        Ok(before - self.sub_entities.len())
    }
}

impl MaterialRegistry for MemoryStore {
    fn has_material(&self, key: &MaterialKey) -> bool {
        self.materials.contains_key(key)
    }

    fn register_material(&mut self, key: &MaterialKey, label: &str) {
        self.materials.insert(key.clone(), label.to_string());
    }
}

/// A connected client of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub usize);

/// A host with items, one shared store and several connected sessions
#[derive(Debug)]
pub struct MemoryHost {
    sync: Synchronizer,
    store: MemoryStore,
    items: IndexMap<DocId, HostItem>,
    /// Commands delivered to each session
    outboxes: Vec<Vec<Cmd>>,
    next_item: u64,
}

impl MemoryHost {
    /// Create a host with `sessions` connected sessions
    pub fn new(sync: Synchronizer, sessions: usize) -> Self {
        let mut host = Self {
            sync,
            store: MemoryStore::new(),
            items: IndexMap::new(),
            outboxes: vec![Vec::new(); sessions.max(1)],
            next_item: 0,
        };
        host.sync.register_custom_materials(&mut host.store);
        host.sync.ready();
        host
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    pub fn item(&self, id: &DocId) -> Option<&HostItem> {
        self.items.get(id)
    }

    /// Sub-entity records linked to an item under this module
    pub fn linked_actions(&self, item: &DocId) -> Vec<&SubEntityRecord> {
        let module = self.sync.config().module_id();
        self.store
            .records()
            .filter(|r| r.is_linked_to(item, module))
            .collect()
    }

    /// Commands delivered to a session so far
    pub fn outbox(&self, session: SessionId) -> &[Cmd] {
        self.outboxes.get(session.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Take the commands delivered to a session
    pub fn take_outbox(&mut self, session: SessionId) -> Vec<Cmd> {
        self.outboxes
            .get_mut(session.0)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Create an item; an empty id is assigned by the host
    pub fn create_item(&mut self, session: SessionId, mut item: HostItem) -> Result<DocId> {
        if item.id.as_str().is_empty() {
            self.next_item += 1;
            item.id = DocId::new(format!("item-{}", self.next_item));
        }
        let cmd = self.sync.prepare_create(&mut item);
        self.deliver(session, cmd);

        let id = item.id.clone();
        self.items.insert(id.clone(), item.clone());
        for other in self.sessions() {
            let result = self.sync.on_created(&mut self.store, &item, other == session);
            self.settle(other, result)?;
        }
        Ok(id)
    }

    /// Update an item in one transaction
    pub fn update_item(&mut self, session: SessionId, id: &DocId, mut change: ItemChange) -> Result<()> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| Error::ItemNotFound(id.clone()))?;

        let cmd = self.sync.prepare_update(item, &mut change);
        change.apply_to(item);
        let committed = item.clone();
        self.deliver(session, cmd);

        for other in self.sessions() {
            let result = self
                .sync
                .after_update(&mut self.store, &committed, &change, other == session);
            self.settle(other, result)?;
        }
        Ok(())
    }

    /// Delete an item (or remove it from its actor)
    pub fn delete_item(&mut self, session: SessionId, id: &DocId) -> Result<()> {
        let item = self
            .items
            .shift_remove(id)
            .ok_or_else(|| Error::ItemNotFound(id.clone()))?;
        for other in self.sessions() {
            self.sync.on_removed(&mut self.store, &item, other == session)?;
        }
        Ok(())
    }

    /// Answer a parameter prompt; `None` means the prompt was dismissed
    pub fn answer_prompt(&mut self, session: SessionId, id: &DocId, value: Option<&str>) -> Result<()> {
        let item = self
            .items
            .get(id)
            .ok_or_else(|| Error::ItemNotFound(id.clone()))?;
        let change = match value {
            Some(value) => self.sync.choose_parameter(item, value)?,
            None => self.sync.decline_parameter(item)?,
        };
        self.update_item(session, id, change)
    }

    fn sessions(&self) -> Vec<SessionId> {
        (0..self.outboxes.len()).map(SessionId).collect()
    }

    /// Deliver a hook's commands, including those carried by a failure
    fn settle(&mut self, session: SessionId, result: Result<Cmd>) -> Result<()> {
        match result {
            Ok(cmd) => {
                self.deliver(session, cmd);
                Ok(())
            }
            Err(e) => {
                let (cmd, e) = e.into_parts();
                self.deliver(session, cmd);
                Err(e)
            }
        }
    }

    fn deliver(&mut self, session: SessionId, cmd: Cmd) {
        if let Some(outbox) = self.outboxes.get_mut(session.0) {
            outbox.extend(cmd.into_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncConfig;
    use aurum_core::rule::is_owned;
    use aurum_core::{ActionKey, Grade, Value};

    const GM: SessionId = SessionId(0);
    const PLAYER: SessionId = SessionId(1);
    const MODULE: &str = "precious-materials-rework";

    fn host() -> MemoryHost {
        let sync = Synchronizer::with_builtin(SyncConfig::default()).unwrap();
        MemoryHost::new(sync, 3)
    }

    fn action_keys(host: &MemoryHost, item: &DocId) -> Vec<ActionKey> {
        host.linked_actions(item)
            .iter()
            .filter_map(|r| r.link.as_ref().map(|l| l.action_key.clone()))
            .collect()
    }

    fn owned_rule_count(host: &MemoryHost, item: &DocId) -> usize {
        host.item(item)
            .map(|i| i.rules.iter().filter(|r| is_owned(r, MODULE)).count())
            .unwrap_or(0)
    }

    #[test]
    fn test_custom_materials_registered_once() {
        let mut host = host();
        assert_eq!(
            host.store().material_label(&MaterialKey::new("singing-steel")),
            Some("Singing Steel")
        );
        let again = host.sync.register_custom_materials(&mut host.store);
        assert_eq!(again, 0);
    }

    #[test]
    fn test_sovereign_steel_high_shield_grants_one_action() {
        let mut host = host();
        let shield = host
            .create_item(PLAYER, HostItem::new("", "Steel Shield", "shield").with_actor("hero"))
            .unwrap();

        host.update_item(PLAYER, &shield, ItemChange::set_material("sovereign-steel", Grade::High))
            .unwrap();

        // three sessions saw the notification, exactly one action exists
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("improved-soul-counter")]);
        assert_eq!(owned_rule_count(&host, &shield), 0);

        let link = host.linked_actions(&shield)[0].link.clone().unwrap();
        assert_eq!(link.source_item_id, shield);
        assert_eq!(link.grade, Grade::High);
        assert_eq!(link.material_slug, MaterialKey::new("sovereign-steel"));
    }

    #[test]
    fn test_grade_change_replaces_actions() {
        let mut host = host();
        let shield = host
            .create_item(GM, HostItem::new("", "Steel Shield", "shield").with_actor("hero"))
            .unwrap();
        host.update_item(GM, &shield, ItemChange::set_material("sovereign-steel", Grade::Standard))
            .unwrap();
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("soul-counter")]);

        host.update_item(GM, &shield, ItemChange::new().with_grade(Grade::High))
            .unwrap();
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("improved-soul-counter")]);
        assert_eq!(host.store().records().count(), 1);
    }

    #[test]
    fn test_material_cleared_removes_everything() {
        let mut host = host();
        let armor = host
            .create_item(
                GM,
                HostItem::new("", "Fullplate", "armor")
                    .with_actor("hero")
                    .with_material("orichalcum", Grade::High),
            )
            .unwrap();
        assert_eq!(owned_rule_count(&host, &armor), 2);
        assert_eq!(action_keys(&host, &armor), vec![ActionKey::new("armament-across-time")]);

        host.update_item(GM, &armor, ItemChange::clear_material()).unwrap();
        assert_eq!(owned_rule_count(&host, &armor), 0);
        assert!(action_keys(&host, &armor).is_empty());
    }

    #[test]
    fn test_delete_removes_only_linked_actions() {
        let mut host = host();
        let hero = DocId::new("hero");
        let manual = host.store_mut().insert_unlinked(&hero, "Raise a Shield");

        let weapon = host
            .create_item(
                GM,
                HostItem::new("", "Greatsword", "weapon")
                    .with_actor("hero")
                    .with_material("orichalcum", Grade::High),
            )
            .unwrap();
        let shield = host
            .create_item(
                GM,
                HostItem::new("", "Buckler", "shield")
                    .with_actor("hero")
                    .with_material("orichalcum", Grade::High),
            )
            .unwrap();
        assert_eq!(host.store().records().count(), 3);

        host.delete_item(PLAYER, &weapon).unwrap();
        assert!(action_keys(&host, &weapon).is_empty());
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("aegis-across-time")]);
        assert!(host.store().records().any(|r| r.id == manual));
    }

    #[test]
    fn test_remove_all_actions() {
        let mut host = host();
        let hero = DocId::new("hero");
        host.store_mut().insert_unlinked(&hero, "Raise a Shield");
        for name in ["Greatsword", "Shortsword"] {
            host.create_item(
                GM,
                HostItem::new("", name, "weapon")
                    .with_actor("hero")
                    .with_material("sovereign-steel", Grade::Standard),
            )
            .unwrap();
        }

        let removed = host.sync.remove_all_actions(&mut host.store, &hero).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(host.store().records().count(), 1);
    }

    #[test]
    fn test_item_without_actor_gets_rules_only() {
        let mut host = host();
        let sword = host
            .create_item(GM, HostItem::new("", "Longsword", "weapon"))
            .unwrap();
        host.update_item(GM, &sword, ItemChange::set_material("orichalcum", Grade::High))
            .unwrap();

        assert_eq!(owned_rule_count(&host, &sword), 1);
        assert_eq!(host.store().records().count(), 0);
    }

    #[test]
    fn test_dragonhide_prompt_goes_to_originator_only() {
        let mut host = host();
        let hide = host
            .create_item(PLAYER, HostItem::new("", "Hide Armor", "armor").with_actor("hero"))
            .unwrap();
        host.update_item(PLAYER, &hide, ItemChange::set_material("dragonhide", Grade::Standard))
            .unwrap();

        let prompts = host.take_outbox(PLAYER);
        assert_eq!(prompts.len(), 1);
        match &prompts[0] {
            Cmd::RequestParameter {
                parameter,
                choices,
                default,
                ..
            } => {
                assert_eq!(parameter, "dragonElement");
                assert_eq!(choices.len(), 5);
                assert_eq!(default, "fire");
            }
            other => panic!("expected a parameter request, got {:?}", other),
        }
        assert!(host.outbox(GM).is_empty());

        // before the answer, rules already use the default
        let item = host.item(&hide).unwrap();
        assert_eq!(item.rules[0].get("type"), Some(&Value::from("fire")));

        host.answer_prompt(PLAYER, &hide, Some("cold")).unwrap();
        let item = host.item(&hide).unwrap();
        assert_eq!(item.flag("dragonElement"), Some("cold"));
        assert_eq!(item.rules.len(), 2);
        assert_eq!(item.rules[0].get("type"), Some(&Value::from("cold")));
        assert_eq!(
            item.rules[1].get("predicate"),
            Some(&Value::from(vec!["item:trait:cold"]))
        );
        // storing the answer does not prompt again
        assert!(host.outbox(PLAYER).is_empty());
    }

    #[test]
    fn test_dismissed_prompt_stores_default() {
        let mut host = host();
        let hide = host
            .create_item(GM, HostItem::new("", "Hide Armor", "armor"))
            .unwrap();
        host.update_item(GM, &hide, ItemChange::set_material("dragonhide", Grade::High))
            .unwrap();
        host.answer_prompt(GM, &hide, None).unwrap();

        let item = host.item(&hide).unwrap();
        assert_eq!(item.flag("dragonElement"), Some("fire"));
        assert_eq!(owned_rule_count(&host, &hide), 3);
    }

    #[test]
    fn test_no_prompt_when_parameter_stored() {
        let mut host = host();
        let hide = host
            .create_item(
                GM,
                HostItem::new("", "Hide Armor", "armor").with_flag("dragonElement", "acid"),
            )
            .unwrap();
        host.update_item(GM, &hide, ItemChange::set_material("dragonhide", Grade::Standard))
            .unwrap();

        assert!(host.outbox(GM).is_empty());
        let item = host.item(&hide).unwrap();
        assert_eq!(item.rules[0].get("type"), Some(&Value::from("acid")));
    }

    #[test]
    fn test_material_and_parameter_in_one_change() {
        let mut host = host();
        let hide = host
            .create_item(
                GM,
                HostItem::new("", "Hide Armor", "armor").with_flag("dragonElement", "acid"),
            )
            .unwrap();
        let change = ItemChange::set_material("dragonhide", Grade::Standard)
            .with_flag("dragonElement", "electricity");
        host.update_item(GM, &hide, change).unwrap();

        let item = host.item(&hide).unwrap();
        assert_eq!(item.flag("dragonElement"), Some("electricity"));
        assert_eq!(item.rules[0].get("type"), Some(&Value::from("electricity")));
        assert!(host.outbox(GM).is_empty());
    }

    #[test]
    fn test_store_failure_heals_on_next_change() {
        let mut host = host();
        let shield = host
            .create_item(GM, HostItem::new("", "Buckler", "shield").with_actor("hero"))
            .unwrap();
        host.update_item(GM, &shield, ItemChange::set_material("silver", Grade::Standard))
            .unwrap();
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("silver-reflection")]);

        host.store_mut().set_fail_writes(true);
        let err = host
            .update_item(GM, &shield, ItemChange::new().with_grade(Grade::High))
            .unwrap_err();
        assert!(matches!(err, Error::Store { op: "delete", .. }));
        // rules were committed with the item even though actions were not
        assert_eq!(host.item(&shield).unwrap().grade, Some(Grade::High));
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("silver-reflection")]);

        host.store_mut().set_fail_writes(false);
        host.update_item(GM, &shield, ItemChange::new().with_grade(Grade::High))
            .unwrap();
        assert_eq!(action_keys(&host, &shield), vec![ActionKey::new("true-silver-reflection")]);
    }

    #[test]
    fn test_action_keys_match_table_for_every_entry() {
        let sync = Synchronizer::with_builtin(SyncConfig::default()).unwrap();
        let entries: Vec<_> = sync
            .definitions()
            .table
            .entries()
            .map(|(def, grade, category, spec)| (def.key.clone(), grade, category, spec.actions.clone()))
            .collect();
        let mut host = MemoryHost::new(sync, 2);

        for (key, grade, category, actions) in entries {
            let item = match category {
                aurum_core::Category::Weapon => HostItem::new("", "Weapon", "weapon"),
                aurum_core::Category::Armor => HostItem::new("", "Armor", "armor"),
                aurum_core::Category::Shield => HostItem::new("", "Shield", "armor").with_subtype("shield"),
            };
            let id = host.create_item(GM, item.with_actor("tester")).unwrap();
            host.update_item(GM, &id, ItemChange::set_material(key.clone(), grade))
                .unwrap();
            assert_eq!(action_keys(&host, &id), actions, "{} {} {}", key, grade, category);

            host.delete_item(GM, &id).unwrap();
            assert!(action_keys(&host, &id).is_empty());
        }
        assert_eq!(host.store().records().count(), 0);
    }

    #[test]
    fn test_created_with_parameterized_material_prompts() {
        let mut host = host();
        let hide = host
            .create_item(
                PLAYER,
                HostItem::new("", "Hide", "armor")
                    .with_actor("hero")
                    .with_material("dragonhide", Grade::Standard),
            )
            .unwrap();

        assert_eq!(owned_rule_count(&host, &hide), 2);
        let prompts = host.take_outbox(PLAYER);
        assert_eq!(prompts.len(), 1);
        assert!(matches!(
            &prompts[0],
            Cmd::RequestParameter { parameter, .. } if parameter == "dragonElement"
        ));
        assert!(host.outbox(GM).is_empty());

        host.answer_prompt(PLAYER, &hide, Some("acid")).unwrap();
        let item = host.item(&hide).unwrap();
        assert_eq!(item.rules[0].get("type"), Some(&Value::from("acid")));
    }

    #[test]
    fn test_prompt_delivered_despite_store_failure() {
        let mut host = host();
        let armor = host
            .create_item(
                GM,
                HostItem::new("", "Fullplate", "armor")
                    .with_actor("hero")
                    .with_material("orichalcum", Grade::High),
            )
            .unwrap();
        assert_eq!(action_keys(&host, &armor), vec![ActionKey::new("armament-across-time")]);

        host.store_mut().set_fail_writes(true);
        let err = host
            .update_item(GM, &armor, ItemChange::set_material("dragonhide", Grade::Standard))
            .unwrap_err();
        assert!(matches!(err, Error::Store { op: "delete", .. }));
        let prompts = host.take_outbox(GM);
        assert_eq!(prompts.len(), 1);
        assert!(matches!(prompts[0], Cmd::RequestParameter { .. }));

        // the prompt is asked again on the next change while no value is stored
        host.store_mut().set_fail_writes(false);
        host.update_item(GM, &armor, ItemChange::new().with_grade(Grade::High))
            .unwrap();
        assert_eq!(host.item(&armor).unwrap().flag("dragonElement"), None);
        assert!(matches!(host.outbox(GM), [Cmd::RequestParameter { .. }]));
        assert!(action_keys(&host, &armor).is_empty());
    }

    #[test]
    fn test_grade_change_prompts_until_answered() {
        let mut host = host();
        let hide = host
            .create_item(GM, HostItem::new("", "Hide", "armor"))
            .unwrap();
        host.update_item(GM, &hide, ItemChange::set_material("dragonhide", Grade::Standard))
            .unwrap();
        assert_eq!(host.take_outbox(GM).len(), 1);

        host.update_item(GM, &hide, ItemChange::new().with_grade(Grade::High))
            .unwrap();
        assert_eq!(host.take_outbox(GM).len(), 1);

        host.answer_prompt(GM, &hide, Some("poison")).unwrap();
        host.update_item(GM, &hide, ItemChange::new().with_grade(Grade::Standard))
            .unwrap();
        assert!(host.outbox(GM).is_empty());
        let item = host.item(&hide).unwrap();
        assert_eq!(item.rules[0].get("type"), Some(&Value::from("poison")));
    }

    #[test]
    fn test_unknown_item() {
        let mut host = host();
        let missing = DocId::new("nope");
        assert!(matches!(
            host.update_item(GM, &missing, ItemChange::clear_material()),
            Err(Error::ItemNotFound(_))
        ));
        assert!(matches!(
            host.delete_item(GM, &missing),
            Err(Error::ItemNotFound(_))
        ));
    }
}
