//! Timed effect instances and their lifecycle.
//!
//! `Created → Active → {Updating}* → Removed`
//!
//! Every hook runs inside the error boundary. Removal always clears the
//! modifiers registered under the instance id, whether or not the behavior's
//! own `on_remove` succeeded.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::behavior::{BuffBehavior, BuffHook};
use super::boundary;
use super::config::{BuffConfig, ControlType, StackRule};
use super::context::{BuffContext, BuffEvent, BuffEventKind, BuffState};
use super::registry::BuffRegistry;
use crate::error::{BattleError, ErrorSeverity};
use crate::participant::{Participant, ParticipantId, Roster};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuffError {
    #[error("buff script `{0}` not found")]
    ScriptNotFound(String),

    #[error("buff owner `{0}` not found")]
    OwnerNotFound(String),
}

impl BattleError for BuffError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ScriptNotFound(_) => ErrorSeverity::Validation,
            Self::OwnerNotFound(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ScriptNotFound(_) => "BUFF_SCRIPT_NOT_FOUND",
            Self::OwnerNotFound(_) => "BUFF_OWNER_NOT_FOUND",
        }
    }
}

/// One applied status effect.
pub struct BuffInstance {
    behavior: Box<dyn BuffBehavior>,
    state: BuffState,
    active: bool,
}

impl BuffInstance {
    pub fn id(&self) -> &str {
        &self.state.instance_id
    }

    pub fn buff_id(&self) -> &str {
        &self.state.buff_id
    }

    pub fn owner(&self) -> &ParticipantId {
        &self.state.owner
    }

    pub fn config(&self) -> &BuffConfig {
        &self.state.config
    }

    pub fn state(&self) -> &BuffState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl std::fmt::Debug for BuffInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuffInstance")
            .field("state", &self.state)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Buff instances of one battle, grouped by owner.
pub struct BuffEngine {
    registry: Arc<BuffRegistry>,
    instances: BTreeMap<ParticipantId, Vec<BuffInstance>>,
    clock_ms: u64,
    sequence: u64,
    events: Vec<BuffEvent>,
}

impl BuffEngine {
    pub fn new(registry: Arc<BuffRegistry>) -> Self {
        Self {
            registry,
            instances: BTreeMap::new(),
            clock_ms: 0,
            sequence: 0,
            events: Vec::new(),
        }
    }

    pub fn registry(&self) -> &BuffRegistry {
        &self.registry
    }

    /// Total simulated time passed to [`update`](Self::update).
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Applies `buff_id` to `owner_id` and returns the instance id.
    ///
    /// Stacking follows `config.stack_rule`; when an existing instance absorbs
    /// the application its id is returned instead of a new one.
    pub fn add_buff(
        &mut self,
        roster: &mut Roster,
        owner_id: &str,
        buff_id: &str,
        config: BuffConfig,
    ) -> Result<String, BuffError> {
        let behavior = self
            .registry
            .get(buff_id)
            .ok_or_else(|| BuffError::ScriptNotFound(buff_id.to_string()))?;
        if !roster.contains(owner_id) {
            return Err(BuffError::OwnerNotFound(owner_id.to_string()));
        }

        let existing: Vec<String> = self
            .instances(owner_id)
            .filter(|inst| inst.buff_id() == buff_id)
            .map(|inst| inst.id().to_string())
            .collect();

        match config.stack_rule {
            StackRule::Refresh => {
                if let Some(id) = existing.first() {
                    self.refresh_buff(roster, id);
                    return Ok(id.clone());
                }
            }
            StackRule::Limited => {
                if existing.len() >= config.max_stacks.max(1) as usize
                    && let Some(id) = existing.first()
                {
                    debug!(
                        target: "battle::buff",
                        buff = buff_id,
                        owner = owner_id,
                        stacks = existing.len(),
                        "stack limit reached"
                    );
                    return Ok(id.clone());
                }
            }
            StackRule::Independent => {}
        }

        self.sequence += 1;
        let instance_id = format!("{owner_id}_{buff_id}_{}_{}", self.clock_ms, self.sequence);
        let owner_key = ParticipantId::new(owner_id);
        let state = BuffState::new(
            owner_key.clone(),
            instance_id.clone(),
            buff_id.to_string(),
            config,
            self.clock_ms,
        );

        let Some(owner) = roster.get_mut(owner_id) else {
            return Err(BuffError::OwnerNotFound(owner_id.to_string()));
        };
        owner.attach_buff(&instance_id);

        let list = self.instances.entry(owner_key).or_default();
        list.push(BuffInstance {
            behavior,
            state,
            active: true,
        });
        if let Some(instance) = list.last_mut() {
            run_hook(BuffHook::OnApply, instance, owner, &mut self.events, 0);
            emit(&mut self.events, &instance.state, BuffEventKind::Applied);
        }

        info!(
            target: "battle::buff",
            buff = buff_id,
            owner = owner_id,
            instance = %instance_id,
            "buff applied"
        );
        Ok(instance_id)
    }

    /// Removes an active instance. Returns false if it is missing or inactive.
    pub fn remove_buff(&mut self, roster: &mut Roster, instance_id: &str) -> bool {
        let Some((owner_id, index)) = self.locate(instance_id) else {
            return false;
        };
        let Some(list) = self.instances.get_mut(&owner_id) else {
            return false;
        };
        let instance = list.remove(index);
        if list.is_empty() {
            self.instances.remove(&owner_id);
        }
        finish(instance, roster.get_mut(owner_id.as_str()), &mut self.events, false);
        true
    }

    /// Runs `on_refresh` and restarts the instance timer.
    pub fn refresh_buff(&mut self, roster: &mut Roster, instance_id: &str) -> bool {
        let Some((owner_id, index)) = self.locate(instance_id) else {
            return false;
        };
        let Some(owner) = roster.get_mut(owner_id.as_str()) else {
            return false;
        };
        let Some(instance) = self
            .instances
            .get_mut(&owner_id)
            .and_then(|list| list.get_mut(index))
        else {
            return false;
        };

        run_hook(BuffHook::OnRefresh, instance, owner, &mut self.events, 0);
        instance.state.start_ms = self.clock_ms;
        instance.state.elapsed_ms = 0;
        emit(&mut self.events, &instance.state, BuffEventKind::Refreshed);
        debug!(target: "battle::buff", instance = instance_id, "buff refreshed");
        true
    }

    /// Advances every active instance by `delta_ms`.
    ///
    /// Instances whose finite duration has been reached are removed after the
    /// full pass. Returns the ids of the expired instances.
    pub fn update(&mut self, roster: &mut Roster, delta_ms: u64) -> Vec<String> {
        self.clock_ms = self.clock_ms.saturating_add(delta_ms);
        self.tick(roster, None, delta_ms, u64::MAX)
    }

    /// Opens a turn by advancing the engine clock. Instances applied or
    /// refreshed from here until [`end_turn`](Self::end_turn) belong to the
    /// opening turn.
    pub fn begin_turn(&mut self, delta_ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(delta_ms);
    }

    /// Closes `owner_id`'s turn: advances that owner's instances by
    /// `delta_ms`.
    ///
    /// Instances applied or refreshed since the turn opened are left
    /// untouched, so a duration of `n` turns spans the owner's next `n`
    /// turns. Returns the ids of the expired instances.
    pub fn end_turn(&mut self, roster: &mut Roster, owner_id: &str, delta_ms: u64) -> Vec<String> {
        self.tick(roster, Some(owner_id), delta_ms, self.clock_ms)
    }

    /// Runs `on_update` on instances (optionally of one owner) that started
    /// before `started_before`, then removes the expired ones.
    fn tick(
        &mut self,
        roster: &mut Roster,
        only_owner: Option<&str>,
        delta_ms: u64,
        started_before: u64,
    ) -> Vec<String> {
        let mut expired = Vec::new();
        for (owner_id, list) in self.instances.iter_mut() {
            if only_owner.is_some_and(|only| only != owner_id.as_str()) {
                continue;
            }
            let Some(owner) = roster.get_mut(owner_id.as_str()) else {
                for instance in list.iter().filter(|i| i.active) {
                    expired.push(instance.id().to_string());
                }
                continue;
            };
            for instance in list
                .iter_mut()
                .filter(|i| i.active && i.state.start_ms < started_before)
            {
                instance.state.elapsed_ms = instance.state.elapsed_ms.saturating_add(delta_ms);
                run_hook(BuffHook::OnUpdate, instance, owner, &mut self.events, delta_ms);
                if instance.state.is_expired() {
                    expired.push(instance.id().to_string());
                }
            }
        }

        for instance_id in &expired {
            if let Some((owner_id, index)) = self.locate(instance_id)
                && let Some(list) = self.instances.get_mut(&owner_id)
            {
                let instance = list.remove(index);
                if list.is_empty() {
                    self.instances.remove(&owner_id);
                }
                finish(instance, roster.get_mut(owner_id.as_str()), &mut self.events, true);
            }
        }
        expired
    }

    /// Removes every instance on `owner_id`, running remove hooks.
    pub fn clear_owner(&mut self, roster: &mut Roster, owner_id: &str) -> usize {
        let Some(list) = self.instances.remove(owner_id) else {
            return 0;
        };
        let count = list.len();
        for instance in list {
            finish(instance, roster.get_mut(owner_id), &mut self.events, false);
        }
        count
    }

    /// Removes every instance in the engine.
    pub fn clear_all(&mut self, roster: &mut Roster) -> usize {
        let owners: Vec<ParticipantId> = self.instances.keys().cloned().collect();
        owners
            .iter()
            .map(|owner| self.clear_owner(roster, owner.as_str()))
            .sum()
    }

    pub fn instance(&self, instance_id: &str) -> Option<&BuffInstance> {
        self.instances
            .values()
            .flatten()
            .find(|inst| inst.id() == instance_id)
    }

    /// Active instances on `owner_id`, oldest first.
    pub fn instances<'a>(&'a self, owner_id: &str) -> impl Iterator<Item = &'a BuffInstance> + 'a {
        self.instances
            .get(owner_id)
            .into_iter()
            .flatten()
            .filter(|inst| inst.active)
    }

    pub fn active_count(&self, owner_id: &str) -> usize {
        self.instances(owner_id).count()
    }

    pub fn has_buff(&self, owner_id: &str, buff_id: &str) -> bool {
        self.instances(owner_id).any(|inst| inst.buff_id() == buff_id)
    }

    /// Number of ids in `buff_ids` with at least one active instance on
    /// `owner_id`. Stacks of one id count once.
    pub fn count_buffs<S: AsRef<str>>(&self, owner_id: &str, buff_ids: &[S]) -> usize {
        buff_ids
            .iter()
            .filter(|id| self.has_buff(owner_id, id.as_ref()))
            .count()
    }

    /// Highest-priority control effect on `owner_id`.
    pub fn highest_control(&self, owner_id: &str) -> ControlType {
        let mut best: Option<(u32, ControlType)> = None;
        for inst in self.instances(owner_id) {
            let config = inst.config();
            if config.control == ControlType::None {
                continue;
            }
            if best.is_none_or(|(priority, _)| config.control_priority > priority) {
                best = Some((config.control_priority, config.control));
            }
        }
        best.map(|(_, control)| control).unwrap_or_default()
    }

    pub fn is_controlled(&self, owner_id: &str) -> bool {
        self.highest_control(owner_id) != ControlType::None
    }

    pub fn can_act(&self, owner_id: &str) -> bool {
        !self
            .instances(owner_id)
            .any(|inst| inst.config().control.blocks_actions())
    }

    pub fn can_use_skill(&self, owner_id: &str) -> bool {
        !self
            .instances(owner_id)
            .any(|inst| inst.config().control.blocks_skills())
    }

    /// Takes the queued buff events.
    pub fn drain_events(&mut self) -> Vec<BuffEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn locate(&self, instance_id: &str) -> Option<(ParticipantId, usize)> {
        self.instances.iter().find_map(|(owner, list)| {
            list.iter()
                .position(|inst| inst.active && inst.id() == instance_id)
                .map(|index| (owner.clone(), index))
        })
    }
}

impl std::fmt::Debug for BuffEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuffEngine")
            .field("clock_ms", &self.clock_ms)
            .field("instances", &self.instances)
            .finish_non_exhaustive()
    }
}

fn run_hook(
    hook: BuffHook,
    instance: &mut BuffInstance,
    owner: &mut Participant,
    events: &mut Vec<BuffEvent>,
    delta_ms: u64,
) -> bool {
    let BuffInstance {
        behavior, state, ..
    } = instance;
    let instance_id = state.instance_id.clone();
    let mut ctx = BuffContext::new(state, owner, events);
    boundary::guard(hook, &instance_id, || match hook {
        BuffHook::OnApply => behavior.on_apply(&mut ctx),
        BuffHook::OnRemove => behavior.on_remove(&mut ctx),
        BuffHook::OnUpdate => behavior.on_update(&mut ctx, delta_ms),
        BuffHook::OnRefresh => behavior.on_refresh(&mut ctx),
    })
}

fn finish(
    mut instance: BuffInstance,
    owner: Option<&mut Participant>,
    events: &mut Vec<BuffEvent>,
    expired: bool,
) {
    instance.active = false;
    if let Some(owner) = owner {
        run_hook(BuffHook::OnRemove, &mut instance, owner, events, 0);
        owner
            .modifiers_mut()
            .remove_owner(&instance.state.instance_id);
        owner.detach_buff(&instance.state.instance_id);
    }
    emit(events, &instance.state, BuffEventKind::Removed { expired });
    info!(
        target: "battle::buff",
        buff = %instance.state.buff_id,
        owner = %instance.state.owner,
        instance = %instance.state.instance_id,
        expired,
        "buff removed"
    );
}

fn emit(events: &mut Vec<BuffEvent>, state: &BuffState, kind: BuffEventKind) {
    events.push(BuffEvent {
        owner: state.owner.clone(),
        instance_id: state.instance_id.clone(),
        buff_id: state.buff_id.clone(),
        kind,
    });
}
