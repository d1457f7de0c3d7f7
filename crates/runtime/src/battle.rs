//! Battle aggregate: roster, turn order, action log and outcome.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use battle_core::{
    Action, Attribute, BattleConfig, BattleRng, BuffRegistry, CombatState, Participant,
    ParticipantId, Roster, Side, SkillBook, compute_log_root,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ai::{AiFactory, BattleAi, BattleView, CharacterAi};

/// One simulation run.
///
/// Owns its participants and every piece of mutable state; battles never
/// share anything with each other.
pub struct Battle {
    id: String,
    pub(crate) state: CombatState,
    turn_order: Vec<ParticipantId>,
    current: usize,
    round: u32,
    turn: u32,
    log: VecDeque<Action>,
    log_capacity: usize,
    sequence: u64,
    active: bool,
    winner: Option<Side>,
    seed: u64,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    strategies: BTreeMap<ParticipantId, Box<dyn BattleAi>>,
    schedule: BattleRng,
}

impl Battle {
    /// Builds the battle and its turn order.
    ///
    /// With `speed_first` the order is a shuffle stably sorted by effective
    /// SPD, so equal speeds keep their shuffled order. Otherwise it is a
    /// plain shuffle.
    pub(crate) fn new(
        id: String,
        roster: Roster,
        registry: Arc<BuffRegistry>,
        config: &BattleConfig,
        seed: u64,
        ai: &AiFactory,
    ) -> Self {
        let mut schedule = BattleRng::with_stream(seed, BattleRng::SCHEDULE_STREAM);
        let mut turn_order: Vec<ParticipantId> = roster.ids().cloned().collect();
        schedule.shuffle(&mut turn_order);
        if config.turns.speed_first {
            let speed = |id: &ParticipantId| {
                roster
                    .get(id.as_str())
                    .map(|p| p.attribute(Attribute::Spd))
                    .unwrap_or_default()
            };
            turn_order.sort_by(|a, b| speed(b).total_cmp(&speed(a)));
        }
        let strategies = roster
            .iter()
            .map(|p| (p.id.clone(), ai.create(p.side)))
            .collect();

        Self {
            id,
            state: CombatState::new(roster, registry, config, seed),
            turn_order,
            current: 0,
            round: 1,
            turn: 0,
            log: VecDeque::new(),
            log_capacity: config.turns.action_log_capacity.max(1),
            sequence: 0,
            active: true,
            winner: None,
            seed,
            started_at: Utc::now(),
            ended_at: None,
            strategies,
            schedule,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn roster(&self) -> &Roster {
        &self.state.roster
    }

    pub fn turn_order(&self) -> &[ParticipantId] {
        &self.turn_order
    }

    /// Retained log entries, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &Action> + '_ {
        self.log.iter()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Total number of entries ever recorded, evicted ones included.
    pub fn recorded(&self) -> u64 {
        self.sequence
    }

    /// Hex SHA-256 over the retained action log.
    pub fn log_digest(&self) -> String {
        hex::encode(compute_log_root(self.log.iter()))
    }

    pub(crate) fn begin_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }

    /// Resolves the turn pointer to the next living participant.
    ///
    /// Dead participants are skipped. Wrapping past the end of the order
    /// starts a new round. `None` means nobody is left alive.
    pub(crate) fn next_actor(&mut self) -> Option<ParticipantId> {
        for _ in 0..=self.turn_order.len() {
            if self.current >= self.turn_order.len() {
                self.current = 0;
                self.round += 1;
            }
            let id = self.turn_order.get(self.current)?;
            if self.state.roster.get(id.as_str()).is_some_and(Participant::is_alive) {
                return Some(id.clone());
            }
            self.current += 1;
        }
        None
    }

    pub(crate) fn advance(&mut self) {
        self.current += 1;
    }

    /// True once round `max_rounds` has no living participant left to act.
    pub(crate) fn rounds_exhausted(&self, max_rounds: u32) -> bool {
        self.round >= max_rounds
            && !self
                .turn_order
                .iter()
                .skip(self.current)
                .any(|id| self.state.roster.get(id.as_str()).is_some_and(Participant::is_alive))
    }

    /// Random living member of the side opposing `actor`.
    pub(crate) fn random_opponent(&mut self, actor: &ParticipantId) -> Option<ParticipantId> {
        let side = self.state.roster.get(actor.as_str())?.side.opposite();
        let candidates: Vec<ParticipantId> = self
            .state
            .roster
            .living_on(side)
            .map(|p| p.id.clone())
            .collect();
        self.schedule.pick(&candidates).cloned()
    }

    /// Asks `actor`'s strategy for this turn's action.
    ///
    /// The strategy is created from the actor's side tag on first use.
    pub(crate) fn decide(
        &mut self,
        actor: &ParticipantId,
        skills: &SkillBook,
        config: &BattleConfig,
        ai: &AiFactory,
    ) -> Action {
        if !self.strategies.contains_key(actor)
            && let Some(side) = self.state.roster.get(actor.as_str()).map(|p| p.side)
        {
            self.strategies.insert(actor.clone(), ai.create(side));
        }
        let view = BattleView {
            battle_id: &self.id,
            turn: self.turn,
            roster: &self.state.roster,
            buffs: &self.state.buffs,
            skills,
            config,
        };
        match self.strategies.get(actor) {
            Some(strategy) => strategy.make_decision(&view, actor.as_str()),
            None => CharacterAi::default().make_decision(&view, actor.as_str()),
        }
    }

    pub(crate) fn set_strategy(&mut self, id: ParticipantId, strategy: Box<dyn BattleAi>) {
        self.strategies.insert(id, strategy);
    }

    /// Appends a resolved action, stamping id, turn and battle clock.
    ///
    /// The oldest entry is evicted once the log is at capacity.
    pub(crate) fn record(&mut self, mut action: Action) -> Action {
        self.sequence += 1;
        action.id = format!("{}-{:06}", self.id, self.sequence);
        action.turn = self.turn;
        action.timestamp_ms = self.state.buffs.clock_ms();
        while self.log.len() >= self.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(action.clone());
        action
    }

    /// Side that has won, if any. Mutual wipe-out is a draw.
    pub(crate) fn check_winner(&self) -> Option<Option<Side>> {
        let allies_down = self.state.roster.is_defeated(Side::Ally);
        let enemies_down = self.state.roster.is_defeated(Side::Enemy);
        match (allies_down, enemies_down) {
            (false, false) => None,
            (true, true) => Some(None),
            (false, true) => Some(Some(Side::Ally)),
            (true, false) => Some(Some(Side::Enemy)),
        }
    }

    /// Marks the battle inactive. Returns false if it already was.
    pub(crate) fn finish(&mut self, winner: Option<Side>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.winner = winner;
        self.ended_at = Some(Utc::now());
        true
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            id: self.id.clone(),
            active: self.active,
            winner: self.winner,
            round: self.round,
            turn: self.turn,
            seed: self.seed,
            turn_order: self.turn_order.clone(),
            participants: self.state.roster.iter().cloned().collect(),
            log: self.log.iter().cloned().collect(),
            digest: self.log_digest(),
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("round", &self.round)
            .field("turn", &self.turn)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

/// Immutable copy of a battle's observable state.
#[derive(Clone, Debug, Serialize)]
pub struct BattleSnapshot {
    pub id: String,
    pub active: bool,
    pub winner: Option<Side>,
    pub round: u32,
    pub turn: u32,
    pub seed: u64,
    pub turn_order: Vec<ParticipantId>,
    pub participants: Vec<Participant>,
    pub log: Vec<Action>,
    /// Hex digest of `log`.
    pub digest: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl BattleSnapshot {
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::ParticipantInfo;

    use super::*;

    fn battle(capacity: usize) -> Battle {
        let mut config = BattleConfig::default();
        config.turns.action_log_capacity = capacity;
        let roster = Roster::from_infos(&[
            ParticipantInfo::new("fast", "Fast", Side::Ally, 100).with_stat(Attribute::Spd, 200.0),
            ParticipantInfo::new("slow", "Slow", Side::Enemy, 100).with_stat(Attribute::Spd, 50.0),
            ParticipantInfo::new("mid", "Mid", Side::Enemy, 100).with_stat(Attribute::Spd, 120.0),
        ]);
        Battle::new(
            "b1".into(),
            roster,
            Arc::new(BuffRegistry::new()),
            &config,
            42,
            &AiFactory::new(),
        )
    }

    #[test]
    fn speed_orders_turns() {
        let battle = battle(10);
        let order: Vec<&str> = battle.turn_order().iter().map(|id| id.as_str()).collect();
        assert_eq!(order, ["fast", "mid", "slow"]);
    }

    #[test]
    fn dead_participants_are_skipped_and_rounds_wrap() {
        let mut battle = battle(10);
        if let Some(mid) = battle.state.roster.get_mut("mid") {
            mid.set_health(0);
        }
        assert_eq!(battle.next_actor().map(|id| id.0), Some("fast".to_string()));
        battle.advance();
        assert_eq!(battle.next_actor().map(|id| id.0), Some("slow".to_string()));
        battle.advance();
        assert_eq!(battle.round(), 1);
        assert_eq!(battle.next_actor().map(|id| id.0), Some("fast".to_string()));
        assert_eq!(battle.round(), 2);
    }

    #[test]
    fn last_round_ends_when_trailing_slots_are_dead() {
        let mut battle = battle(10);
        if let Some(slow) = battle.state.roster.get_mut("slow") {
            slow.set_health(0);
        }
        assert_eq!(battle.next_actor().map(|id| id.0), Some("fast".to_string()));
        battle.advance();
        assert!(!battle.rounds_exhausted(1));
        assert_eq!(battle.next_actor().map(|id| id.0), Some("mid".to_string()));
        battle.advance();
        assert!(battle.rounds_exhausted(1));
        assert_eq!(battle.round(), 1);
        assert!(!battle.rounds_exhausted(2));
    }

    #[test]
    fn log_evicts_oldest() {
        let mut battle = battle(2);
        for _ in 0..3 {
            battle.record(Action::status("", ParticipantId::system(), "tick"));
        }
        let ids: Vec<String> = battle.log().map(|a| a.id.clone()).collect();
        assert_eq!(ids, ["b1-000002", "b1-000003"]);
        assert_eq!(battle.recorded(), 3);
        assert_eq!(battle.log_digest().len(), 64);
    }

    #[test]
    fn finish_happens_once() {
        let mut battle = battle(10);
        assert!(battle.finish(Some(Side::Ally)));
        assert!(!battle.finish(None));
        assert_eq!(battle.winner(), Some(Side::Ally));
        assert!(!battle.is_active());
    }
}
