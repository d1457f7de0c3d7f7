use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use battle_content::{BattleContent, ContentFactory};
use battle_core::{
    Action, ActionFlags, ActionKind, Attribute, BattleConfig, Calculation, Participant, ParticipantId,
    ParticipantInfo, Side, SkillBook, SkillConfig, SkillStep, SkillType, StepKind,
};
use runtime::{
    ActionHook, ActionHookError, BattleAi, BattleAnalysis, BattleEvent, BattleManager, BattleView,
    Event, HookContext, HookCriticality, HookRegistry, RuntimeError, Topic,
};

fn shipped_content() -> BattleContent {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../battle/content/data");
    ContentFactory::new(dir).load_all().expect("shipped content loads")
}

fn duel(hero_energy: u32) -> Vec<ParticipantInfo> {
    vec![
        ParticipantInfo::new("hero", "Hero", Side::Ally, 10_000)
            .with_energy(hero_energy, 150)
            .with_stat(Attribute::Spd, 200.0)
            .with_stat(Attribute::Atk, 20.0)
            .with_skills(["bash"]),
        ParticipantInfo::new("orc", "Orc", Side::Enemy, 10_000)
            .with_stat(Attribute::Spd, 50.0)
            .with_stat(Attribute::Atk, 20.0),
    ]
}

fn duel_manager(config: BattleConfig) -> BattleManager {
    let bash = SkillConfig::new("bash", "Bash", SkillType::Small)
        .with_step(SkillStep::damage(Calculation::base(10.0)))
        .with_step(SkillStep::buff(StepKind::Control, "buff_stun", 1));
    BattleManager::builder()
        .config(config)
        .skills(SkillBook::load([bash]).expect("valid skill"))
        .build()
}

fn participant<'a>(participants: &'a [Participant], id: &str) -> &'a Participant {
    participants
        .iter()
        .find(|p| p.id.as_str() == id)
        .expect("participant present")
}

#[test]
fn create_battle_rejects_bad_rosters() {
    let mut manager = duel_manager(BattleConfig::default());

    assert!(matches!(manager.create_battle(&[]), Err(RuntimeError::EmptyRoster)));

    let mut twins = duel(0);
    twins.push(ParticipantInfo::new("orc", "Orc Twin", Side::Enemy, 50));
    assert!(matches!(
        manager.create_battle(&twins),
        Err(RuntimeError::DuplicateParticipant(id)) if id == "orc"
    ));

    let lonely = vec![ParticipantInfo::new("hero", "Hero", Side::Ally, 100)];
    assert!(matches!(
        manager.create_battle(&lonely),
        Err(RuntimeError::MissingSide(Side::Enemy))
    ));
    assert!(manager.is_empty());
}

#[test]
fn battle_starts_with_system_entry() {
    let mut manager = duel_manager(BattleConfig::default().with_seed(1));
    let snapshot = manager.create_battle(&duel(0)).expect("battle created");

    assert!(snapshot.active);
    assert_eq!(snapshot.turn_order, vec![ParticipantId::from("hero"), ParticipantId::from("orc")]);
    assert_eq!(snapshot.log.len(), 1);
    let start = &snapshot.log[0];
    assert_eq!(start.kind, ActionKind::Status);
    assert!(start.source.is_system());
    assert_eq!(start.effects[0].description, "battle started: 1 allies vs 1 enemies");
}

#[tokio::test]
async fn turn_grants_energy_and_logs_action() {
    let mut manager = duel_manager(BattleConfig::default().with_seed(3));
    let id = manager.create_battle(&duel(0)).expect("battle created").id;

    let action = manager.process_turn(&id).await.expect("turn processed");
    assert_eq!(action.source.as_str(), "hero");
    assert_eq!(action.target.as_str(), "orc");
    assert_eq!(action.kind, ActionKind::Attack);
    assert_eq!(action.turn, 1);

    let state = manager.battle_state(&id).expect("battle exists");
    // per-turn 25 plus 10 after acting
    assert_eq!(participant(&state.participants, "hero").energy(), 35);
    // per-turn 25 plus 15 for being hit
    assert_eq!(participant(&state.participants, "orc").energy(), 40);
    assert_eq!(state.log.len(), 2);
}

#[tokio::test]
async fn one_turn_stun_skips_the_targets_next_turn() {
    let mut manager = duel_manager(BattleConfig::default().with_seed(5));
    let id = manager.create_battle(&duel(50)).expect("battle created").id;

    let bash = Action::skill("", "hero".into(), "orc".into(), "bash");
    let resolved = manager.execute_action(&id, bash).await.expect("skill resolves");
    assert_eq!(resolved.kind, ActionKind::Skill);
    assert!(resolved.effects.iter().any(|e| e.buff_id.as_deref() == Some("buff_stun")));

    let hero_turn = manager.process_turn(&id).await.expect("hero acts");
    assert_eq!(hero_turn.source.as_str(), "hero");
    assert_eq!(hero_turn.kind, ActionKind::Attack);

    let orc_turn = manager.process_turn(&id).await.expect("orc turn processed");
    assert_eq!(orc_turn.source.as_str(), "orc");
    assert_eq!(orc_turn.kind, ActionKind::Status);
    assert!(orc_turn.flags.contains(ActionFlags::SKIPPED));

    manager.process_turn(&id).await.expect("hero acts again");
    let recovered = manager.process_turn(&id).await.expect("orc acts");
    assert_eq!(recovered.kind, ActionKind::Attack);
    assert!(!recovered.flags.contains(ActionFlags::SKIPPED));
}

fn shipped_duel(content: &BattleContent, caster: ParticipantInfo) -> (BattleManager, String) {
    let mut manager = BattleManager::from_content(content).seed(23).build();
    let roster = [
        caster.with_stat(Attribute::Spd, 100.0),
        ParticipantInfo::new("ogre", "Ogre", Side::Enemy, 10_000)
            .with_stat(Attribute::Spd, 10.0)
            .with_stat(Attribute::Atk, 5.0),
    ];
    let id = manager.create_battle(&roster).expect("battle created").id;
    (manager, id)
}

#[tokio::test]
async fn shipped_earthquake_stuns_for_one_enemy_turn() {
    let content = shipped_content();
    let druid = ParticipantInfo::new("druid", "Druid", Side::Ally, 10_000)
        .with_energy(100, 150)
        .with_stat(Attribute::MagicPower, 36.0)
        .with_skills(["earthquake"]);
    let (mut manager, id) = shipped_duel(&content, druid);

    let quake = Action::skill("", "druid".into(), "ogre".into(), "earthquake");
    let resolved = manager.execute_action(&id, quake).await.expect("skill resolves");
    assert_eq!(resolved.kind, ActionKind::Skill);
    assert!(resolved.damage > 0);

    let druid_turn = manager.process_turn(&id).await.expect("druid acts");
    assert_eq!(druid_turn.source.as_str(), "druid");

    let ogre_turn = manager.process_turn(&id).await.expect("ogre turn processed");
    assert_eq!(ogre_turn.source.as_str(), "ogre");
    assert!(ogre_turn.flags.contains(ActionFlags::SKIPPED));

    manager.process_turn(&id).await.expect("druid acts again");
    let ogre_turn = manager.process_turn(&id).await.expect("ogre acts");
    assert_eq!(ogre_turn.kind, ActionKind::Attack);
}

#[tokio::test]
async fn shipped_self_buff_lasts_its_owners_turns() {
    let content = shipped_content();
    let warrior = ParticipantInfo::new("warrior", "Warrior", Side::Ally, 10_000)
        .with_energy(50, 1000)
        .with_stat(Attribute::Atk, 48.0)
        .with_skills(["war_cry"]);
    let (mut manager, id) = shipped_duel(&content, warrior);

    let cry = Action::skill("", "warrior".into(), "warrior".into(), "war_cry");
    let resolved = manager.execute_action(&id, cry).await.expect("skill resolves");
    assert!(resolved.effects.iter().any(|e| e.buff_id.as_deref() == Some("buff_atk_up")));

    let buffs = |manager: &BattleManager| {
        let state = manager.battle_state(&id).expect("battle exists");
        participant(&state.participants, "warrior").buff_ids().len()
    };
    // war_cry lasts three of the warrior's turns; ogre turns do not count
    for _ in 0..2 {
        let turn = manager.process_turn(&id).await.expect("warrior acts");
        assert_eq!(turn.source.as_str(), "warrior");
        manager.process_turn(&id).await.expect("ogre acts");
        assert_eq!(buffs(&manager), 1);
    }
    manager.process_turn(&id).await.expect("warrior acts");
    assert_eq!(buffs(&manager), 0);
}

#[tokio::test]
async fn round_limit_ends_without_winner() {
    let mut config = BattleConfig::default().with_seed(9);
    config.turns.max_rounds = 1;
    let mut manager = duel_manager(config);
    let id = manager.create_battle(&duel(0)).expect("battle created").id;

    manager.process_turn(&id).await.expect("first turn");
    assert!(manager.battle_state(&id).expect("exists").active);
    manager.process_turn(&id).await.expect("second turn");

    let state = manager.battle_state(&id).expect("exists");
    assert!(!state.active);
    assert_eq!(state.winner, None);
    assert!(matches!(
        manager.process_turn(&id).await,
        Err(RuntimeError::BattleInactive(_))
    ));
}

#[tokio::test]
async fn round_limit_ignores_dead_trailing_slots() {
    let mut config = BattleConfig::default().with_seed(9);
    config.turns.max_rounds = 1;
    let mut manager = duel_manager(config);
    let mut roster = duel(0);
    roster.push(
        ParticipantInfo::new("ghost", "Ghost", Side::Enemy, 100)
            .with_health(0)
            .with_stat(Attribute::Spd, 1.0),
    );
    let id = manager.create_battle(&roster).expect("battle created").id;

    let state = manager.run_to_completion(&id, None).await.expect("runs");
    assert!(!state.active);
    assert_eq!(state.winner, None);
    assert_eq!(state.round, 1);
    assert_eq!(state.turn, 2);
}

#[tokio::test]
async fn turn_limit_stops_battle() {
    let mut manager = duel_manager(BattleConfig::default().with_seed(11));
    let id = manager.create_battle(&duel(0)).expect("battle created").id;

    let state = manager.run_to_completion(&id, Some(3)).await.expect("runs");
    assert!(!state.active);
    assert_eq!(state.winner, None);
    assert_eq!(state.turn, 3);
    assert!(state.ended_at.is_some());
}

#[tokio::test]
async fn shipped_battle_runs_to_completion() {
    let content = shipped_content();
    let mut manager = BattleManager::from_content(&content).seed(2024).build();
    let mut battles = manager.events().subscribe(Topic::Battle);

    let id = manager.create_battle(&content.roster).expect("battle created").id;
    let state = manager.run_to_completion(&id, None).await.expect("battle finishes");

    assert!(!state.active);
    for p in &state.participants {
        assert!(p.health() <= p.max_health());
        assert!(p.energy() <= p.max_energy());
    }
    if let Some(winner) = state.winner {
        assert!(state.participants.iter().any(|p| p.side == winner && p.is_alive()));
        assert!(!state.participants.iter().any(|p| p.side != winner && p.is_alive()));
    }

    assert!(matches!(battles.recv().await, Ok(Event::Battle(BattleEvent::Created { .. }))));
    assert!(matches!(battles.recv().await, Ok(Event::Battle(BattleEvent::Ended { .. }))));
}

#[tokio::test]
async fn equal_seeds_replay_identically() {
    let content = shipped_content();
    let mut digests = Vec::new();
    for _ in 0..2 {
        let mut manager = BattleManager::from_content(&content).seed(77).build();
        let id = manager.create_battle(&content.roster).expect("battle created").id;
        let state = manager.run_to_completion(&id, Some(200)).await.expect("runs");
        digests.push((state.digest, state.turn, state.winner));
    }
    assert_eq!(digests[0], digests[1]);
}

#[tokio::test]
async fn remove_battle_discards_state() {
    let mut manager = duel_manager(BattleConfig::default().with_seed(13));
    let id = manager.create_battle(&duel(100)).expect("battle created").id;
    manager
        .execute_action(&id, Action::skill("", "hero".into(), "orc".into(), "bash"))
        .await
        .expect("skill resolves");

    let last = manager.remove_battle(&id).expect("removed");
    assert!(!last.active);
    assert!(participant(&last.participants, "orc").buff_ids().is_empty());
    assert!(matches!(
        manager.battle_state(&id),
        Err(RuntimeError::BattleNotFound(_))
    ));
}

struct Panicky;

impl BattleAi for Panicky {
    fn name(&self) -> &'static str {
        "panicky"
    }

    fn should_use_skill(&self, _: &BattleView<'_>, _: &Participant, _: &BattleAnalysis) -> bool {
        panic!("decision exploded")
    }

    fn select_skill<'a>(&self, _: &BattleView<'a>, _: &Participant, _: &BattleAnalysis) -> Option<&'a SkillConfig> {
        None
    }

    fn select_target(&self, _: &BattleView<'_>, _: &Participant, _: &BattleAnalysis) -> Option<ParticipantId> {
        panic!("targeting exploded")
    }
}

#[tokio::test]
async fn broken_strategy_falls_back_to_fixed_attack() {
    let mut manager = duel_manager(BattleConfig::default().with_seed(17));
    let id = manager.create_battle(&duel(0)).expect("battle created").id;
    manager
        .set_strategy(&id, "hero", Box::new(Panicky))
        .expect("battle exists");

    let action = manager.process_turn(&id).await.expect("turn processed");
    assert!(action.is_fallback());
    assert_eq!(action.damage, BattleConfig::default().ai.fallback_damage);
    assert_eq!(action.target.as_str(), "orc");
}

struct Failing(HookCriticality);

#[async_trait]
impl ActionHook for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn criticality(&self) -> HookCriticality {
        self.0
    }

    async fn after_action(&self, _ctx: &HookContext<'_>) -> Result<(), ActionHookError> {
        Err(ActionHookError::Failed("boom".into()))
    }
}

#[tokio::test]
async fn hook_criticality_decides_failure_handling() {
    for (criticality, aborts) in [
        (HookCriticality::Critical, true),
        (HookCriticality::Important, false),
        (HookCriticality::Optional, false),
    ] {
        let bash = SkillConfig::new("bash", "Bash", SkillType::Small);
        let mut manager = BattleManager::builder()
            .seed(19)
            .skills(SkillBook::load([bash.with_step(SkillStep::damage(Calculation::base(1.0)))]).expect("valid"))
            .with_hooks(HookRegistry::default_hooks().with_hook(Arc::new(Failing(criticality))))
            .build();
        let id = manager.create_battle(&duel(0)).expect("battle created").id;

        let result = manager.process_turn(&id).await;
        assert_eq!(matches!(result, Err(RuntimeError::Hook { hook: "failing", .. })), aborts);
    }
}
