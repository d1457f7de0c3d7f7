//! Battle manager: creates battles and drives the turn pipeline.
//!
//! One manager is constructed explicitly per host and owns every battle it
//! created, the shared skill book and buff registry, the battle rules, the
//! action hooks and the event bus.
//!
//! # Turn flow
//!
//! 1. The buff clock advances by `turn_duration_ms` and every living
//!    participant gains `energy.per_turn`.
//! 2. The turn pointer resolves to the next living actor; its cooldowns tick.
//! 3. An actor that cannot act forfeits the turn (logged as a skipped status
//!    action). Otherwise its strategy decides; a decision aimed at a dead or
//!    missing target is replaced by an attack on a random living opponent.
//! 4. The action is executed, recorded, run through the hooks and published.
//! 5. The pointer advances and the actor's buffs tick by `turn_duration_ms`,
//!    so buff durations count the owner's own turns. Buffs applied during
//!    the turn itself start counting on the owner's next turn.
//! 6. The win condition, then the round limit, are checked.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use battle_content::{BattleContent, default_registry};
use battle_core::{
    Action, ActionFlags, BattleConfig, BuffConfig, BuffRegistry, ParticipantId, ParticipantInfo,
    Roster, Side, SkillBook, SkillManager,
};
use tracing::{debug, info, warn};

use crate::ai::{AiFactory, BattleAi};
use crate::api::{Result, RuntimeError};
use crate::battle::{Battle, BattleSnapshot};
use crate::events::{ActionEvent, BattleEvent, BuffNotice, Event, EventBus, TurnEvent};
use crate::executor::ActionExecutor;
use crate::hooks::{HookContext, HookRegistry};

/// Owns and advances battles.
pub struct BattleManager {
    battles: HashMap<String, Battle>,
    executor: ActionExecutor,
    registry: Arc<BuffRegistry>,
    config: Arc<BattleConfig>,
    hooks: HookRegistry,
    events: EventBus,
    ai: AiFactory,
    next_id: u64,
}

impl BattleManager {
    pub fn builder() -> BattleManagerBuilder {
        BattleManagerBuilder::new()
    }

    /// Manager preloaded with loaded content: skills, buff templates and rules.
    pub fn from_content(content: &BattleContent) -> BattleManagerBuilder {
        BattleManagerBuilder::new()
            .config(content.config.clone())
            .skills(content.skills.clone())
            .buff_templates(content.buffs.values().cloned())
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn skills(&self) -> &SkillBook {
        self.executor.skills().book()
    }

    pub fn battle_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.battles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }

    /// Starts a battle from roster descriptors and returns its first snapshot.
    ///
    /// Rejects an empty roster, duplicate ids and a side without living
    /// members. The seed comes from `turns.seed` or is drawn at random.
    pub fn create_battle(&mut self, infos: &[ParticipantInfo]) -> Result<BattleSnapshot> {
        if infos.is_empty() {
            return Err(RuntimeError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = infos.iter().find(|info| !seen.insert(info.id.as_str())) {
            return Err(RuntimeError::DuplicateParticipant(dup.id.clone()));
        }
        let roster = Roster::from_infos(infos);
        for side in [Side::Ally, Side::Enemy] {
            if roster.is_defeated(side) {
                return Err(RuntimeError::MissingSide(side));
            }
        }

        self.next_id += 1;
        let id = format!("battle-{:04}", self.next_id);
        let seed = self.config.turns.seed.unwrap_or_else(rand::random);
        let mut battle = Battle::new(
            id.clone(),
            roster,
            Arc::clone(&self.registry),
            &self.config,
            seed,
            &self.ai,
        );

        let summary = format!(
            "battle started: {} allies vs {} enemies",
            battle.roster().count_on(Side::Ally),
            battle.roster().count_on(Side::Enemy)
        );
        battle.record(Action::status("", ParticipantId::system(), summary));
        info!(
            target: "runtime::battle",
            battle = %id,
            participants = infos.len(),
            seed,
            order = ?battle.turn_order(),
            "battle created"
        );
        self.events.publish(Event::Battle(BattleEvent::Created {
            battle_id: id.clone(),
            participants: infos.len(),
            seed,
        }));

        let snapshot = battle.snapshot();
        self.battles.insert(id, battle);
        Ok(snapshot)
    }

    /// Overrides the strategy of one participant.
    pub fn set_strategy(
        &mut self,
        battle_id: &str,
        participant: impl Into<ParticipantId>,
        strategy: Box<dyn BattleAi>,
    ) -> Result<()> {
        let battle = self.battle_mut(battle_id)?;
        battle.set_strategy(participant.into(), strategy);
        Ok(())
    }

    /// Plays one turn and returns the logged action.
    pub async fn process_turn(&mut self, battle_id: &str) -> Result<Action> {
        let config = Arc::clone(&self.config);
        let battle = self
            .battles
            .get_mut(battle_id)
            .ok_or_else(|| RuntimeError::BattleNotFound(battle_id.to_string()))?;
        if !battle.is_active() {
            return Err(RuntimeError::BattleInactive(battle_id.to_string()));
        }

        let turn = battle.begin_turn();
        battle.state.buffs.begin_turn(config.turns.turn_duration_ms);
        for participant in battle.state.roster.iter_mut().filter(|p| p.is_alive()) {
            participant.gain_energy(config.energy.per_turn);
        }

        let Some(actor) = battle.next_actor() else {
            warn!(target: "runtime::battle", battle = battle_id, "no living participants");
            Self::conclude(&self.events, battle, None);
            return Err(RuntimeError::BattleInactive(battle_id.to_string()));
        };
        if let Some(participant) = battle.state.roster.get_mut(actor.as_str()) {
            participant.tick_cooldowns();
        }
        self.events.publish(Event::Turn(TurnEvent::Started {
            battle_id: battle_id.to_string(),
            actor: actor.clone(),
            turn,
            round: battle.round(),
        }));

        let resolved = if battle.state.buffs.can_act(actor.as_str()) {
            let mut action = battle.decide(&actor, self.executor.skills().book(), &config, &self.ai);
            let target_alive = battle
                .state
                .roster
                .get(action.target.as_str())
                .is_some_and(|t| t.is_alive());
            if !target_alive && let Some(target) = battle.random_opponent(&actor) {
                debug!(
                    target: "runtime::battle",
                    battle = battle_id,
                    actor = %actor,
                    planned = %action.target,
                    replacement = %target,
                    "planned target unavailable"
                );
                action = Action::attack("", actor.clone(), target);
            }
            self.executor.execute(&mut battle.state, action)?
        } else {
            info!(target: "runtime::battle", battle = battle_id, actor = %actor, "turn skipped by control effect");
            self.events.publish(Event::Turn(TurnEvent::Skipped {
                battle_id: battle_id.to_string(),
                actor: actor.clone(),
                turn,
            }));
            let mut skipped = Action::status("", actor.clone(), "turn skipped: controlled");
            skipped.flags |= ActionFlags::SKIPPED;
            skipped
        };

        let recorded = battle.record(resolved);
        self.hooks
            .execute_hooks(&HookContext {
                battle_id,
                action: &recorded,
                roster: &battle.state.roster,
                buffs: &battle.state.buffs,
            })
            .await?;
        self.events.publish(Event::Action(Box::new(ActionEvent {
            battle_id: battle_id.to_string(),
            action: recorded.clone(),
        })));

        battle.advance();
        battle
            .state
            .buffs
            .end_turn(&mut battle.state.roster, actor.as_str(), config.turns.turn_duration_ms);
        for event in battle.state.buffs.drain_events() {
            self.events.publish(Event::Buff(BuffNotice {
                battle_id: battle_id.to_string(),
                event,
            }));
        }

        if let Some(winner) = battle.check_winner() {
            Self::conclude(&self.events, battle, winner);
        } else if battle.rounds_exhausted(config.turns.max_rounds) {
            info!(
                target: "runtime::battle",
                battle = battle_id,
                rounds = config.turns.max_rounds,
                "round limit reached"
            );
            Self::conclude(&self.events, battle, None);
        }
        Ok(recorded)
    }

    /// Executes an externally supplied action without advancing the turn
    /// pointer, then checks the win condition.
    pub async fn execute_action(&mut self, battle_id: &str, action: Action) -> Result<Action> {
        let battle = self
            .battles
            .get_mut(battle_id)
            .ok_or_else(|| RuntimeError::BattleNotFound(battle_id.to_string()))?;
        if !battle.is_active() {
            return Err(RuntimeError::BattleInactive(battle_id.to_string()));
        }

        let resolved = self.executor.execute(&mut battle.state, action)?;
        let recorded = battle.record(resolved);
        self.hooks
            .execute_hooks(&HookContext {
                battle_id,
                action: &recorded,
                roster: &battle.state.roster,
                buffs: &battle.state.buffs,
            })
            .await?;
        self.events.publish(Event::Action(Box::new(ActionEvent {
            battle_id: battle_id.to_string(),
            action: recorded.clone(),
        })));
        for event in battle.state.buffs.drain_events() {
            self.events.publish(Event::Buff(BuffNotice {
                battle_id: battle_id.to_string(),
                event,
            }));
        }
        if let Some(winner) = battle.check_winner() {
            Self::conclude(&self.events, battle, winner);
        }
        Ok(recorded)
    }

    /// Processes turns until the battle ends or `max_turns` turns were played
    /// by this call, in which case the battle is stopped without a winner.
    pub async fn run_to_completion(&mut self, battle_id: &str, max_turns: Option<u32>) -> Result<BattleSnapshot> {
        let mut played = 0u32;
        while self.battle(battle_id)?.is_active() {
            if max_turns.is_some_and(|limit| played >= limit) {
                info!(target: "runtime::battle", battle = battle_id, played, "turn limit reached");
                return self.stop_battle(battle_id);
            }
            self.process_turn(battle_id).await?;
            played += 1;
        }
        self.battle_state(battle_id)
    }

    pub fn battle_state(&self, battle_id: &str) -> Result<BattleSnapshot> {
        Ok(self.battle(battle_id)?.snapshot())
    }

    /// Ends the battle without a winner.
    pub fn stop_battle(&mut self, battle_id: &str) -> Result<BattleSnapshot> {
        self.end_battle(battle_id, None)
    }

    /// Ends the battle with `winner`. Ending an inactive battle is a no-op.
    pub fn end_battle(&mut self, battle_id: &str, winner: Option<Side>) -> Result<BattleSnapshot> {
        let battle = self
            .battles
            .get_mut(battle_id)
            .ok_or_else(|| RuntimeError::BattleNotFound(battle_id.to_string()))?;
        Self::conclude(&self.events, battle, winner);
        Ok(battle.snapshot())
    }

    /// Discards the battle and clears its buffs. Returns its final snapshot.
    pub fn remove_battle(&mut self, battle_id: &str) -> Result<BattleSnapshot> {
        let mut battle = self
            .battles
            .remove(battle_id)
            .ok_or_else(|| RuntimeError::BattleNotFound(battle_id.to_string()))?;
        Self::conclude(&self.events, &mut battle, None);
        let cleared = battle.state.buffs.clear_all(&mut battle.state.roster);
        battle.state.buffs.drain_events();
        debug!(target: "runtime::battle", battle = battle_id, cleared, "battle removed");
        Ok(battle.snapshot())
    }

    fn battle(&self, battle_id: &str) -> Result<&Battle> {
        self.battles
            .get(battle_id)
            .ok_or_else(|| RuntimeError::BattleNotFound(battle_id.to_string()))
    }

    fn battle_mut(&mut self, battle_id: &str) -> Result<&mut Battle> {
        self.battles
            .get_mut(battle_id)
            .ok_or_else(|| RuntimeError::BattleNotFound(battle_id.to_string()))
    }

    fn conclude(events: &EventBus, battle: &mut Battle, winner: Option<Side>) {
        if !battle.finish(winner) {
            return;
        }
        info!(
            target: "runtime::battle",
            battle = battle.id(),
            winner = ?winner,
            turns = battle.turn(),
            rounds = battle.round(),
            digest = %battle.log_digest(),
            "battle ended"
        );
        events.publish(Event::Battle(BattleEvent::Ended {
            battle_id: battle.id().to_string(),
            winner,
            turns: battle.turn(),
        }));
    }
}

impl std::fmt::Debug for BattleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleManager")
            .field("battles", &self.battles.len())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BattleManager`].
///
/// Unset parts default to an empty skill book, the built-in buff registry,
/// default rules, the default hooks and a fresh event bus.
pub struct BattleManagerBuilder {
    skills: SkillBook,
    templates: BTreeMap<String, BuffConfig>,
    registry: Option<Arc<BuffRegistry>>,
    config: BattleConfig,
    hooks: HookRegistry,
    events: Option<EventBus>,
    ai: AiFactory,
}

impl BattleManagerBuilder {
    fn new() -> Self {
        Self {
            skills: SkillBook::new(),
            templates: BTreeMap::new(),
            registry: None,
            config: BattleConfig::default(),
            hooks: HookRegistry::default(),
            events: None,
            ai: AiFactory::default(),
        }
    }

    pub fn skills(mut self, skills: SkillBook) -> Self {
        self.skills = skills;
        self
    }

    /// Buff configs used as defaults for buffs applied by skill steps.
    pub fn buff_templates<I>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = BuffConfig>,
    {
        self.templates
            .extend(templates.into_iter().map(|c| (c.id.clone(), c)));
        self
    }

    pub fn registry(mut self, registry: Arc<BuffRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.turns.seed = Some(seed);
        self
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn ai(mut self, ai: AiFactory) -> Self {
        self.ai = ai;
        self
    }

    pub fn build(self) -> BattleManager {
        let skills = SkillManager::new(Arc::new(self.skills))
            .with_buff_templates(self.templates.into_values())
            .with_turn_duration(self.config.turns.turn_duration_ms);
        BattleManager {
            battles: HashMap::new(),
            executor: ActionExecutor::new(skills, self.config.energy.clone()),
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(default_registry())),
            config: Arc::new(self.config),
            hooks: self.hooks,
            events: self.events.unwrap_or_default(),
            ai: self.ai,
            next_id: 0,
        }
    }
}
