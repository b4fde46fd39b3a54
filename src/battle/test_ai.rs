#[cfg(test)]
mod tests {
    use crate::battle::ai::{AiBrain, Mood, CRITICAL_HP_PERCENT};
    use crate::battle::state::{BattleState, BattleVariant, EventBus, TurnRng, TURN_CEILING};
    use crate::moves::Move;
    use crate::participant::{Participant, SideId};
    use crate::pet::PetInst;

    fn pet(name: &str, attack: u16, defense: u16, magic: u16) -> PetInst {
        PetInst::new(
            name.to_string(),
            String::new(),
            "TEST".to_string(),
            5,
            attack,
            defense,
            magic,
            (0, 0, 0),
        )
    }

    /// In-progress mirror duel; the AI decides for side 1 against side 2.
    fn mirror_duel() -> BattleState {
        let mut state = BattleState::new(
            "ai-duel".to_string(),
            Participant::ai("Drifter".to_string(), vec![pet("Aleph", 50, 20, 10)]),
            Participant::ai("Wanderer".to_string(), vec![pet("Bet", 50, 20, 10)]),
            BattleVariant::Duel,
        );
        let mut bus = EventBus::new();
        state.begin(&mut TurnRng::new_for_test(vec![1]), &mut bus);
        state
    }

    fn choose(state: &BattleState, brain: &mut AiBrain, rolls: Vec<u8>) -> Move {
        let mut rng = TurnRng::new_for_test(rolls);
        brain.choose_move(state, SideId::One, 0, SideId::Two, 0, &mut rng)
    }

    #[test]
    fn critical_hp_forces_the_heal_priority() {
        let mut state = mirror_duel();
        state.pet_mut(SideId::One, 0).unwrap().set_hp(20);
        assert!(state.pet(SideId::One, 0).unwrap().percent_hp() < CRITICAL_HP_PERCENT);

        let mut brain = AiBrain::new();
        // Mood is forced defensive (no roll); 99 skips the explore branch.
        let move_ = choose(&state, &mut brain, vec![99]);
        assert_eq!(move_, Move::Mend);
        assert_eq!(brain.mood(), Mood::Defensive);
    }

    #[test]
    fn large_hp_deficit_prioritizes_equalize() {
        let mut state = mirror_duel();
        state.pet_mut(SideId::One, 0).unwrap().set_hp(50);

        let mut brain = AiBrain::new();
        // 99 keeps the mood, 99 skips the explore branch.
        let move_ = choose(&state, &mut brain, vec![99, 99]);
        assert_eq!(move_, Move::Equalize);
    }

    #[test]
    fn endgame_lethal_range_prioritizes_burst() {
        let mut state = mirror_duel();
        state.turn_number = TURN_CEILING - 4;
        state.pet_mut(SideId::Two, 0).unwrap().set_hp(5);

        let mut brain = AiBrain::new();
        // Near-defeated target late-game forces the aggressive mood (no roll).
        let move_ = choose(&state, &mut brain, vec![99]);
        assert_eq!(move_, Move::Burst);
        assert_eq!(brain.mood(), Mood::Aggressive);
    }

    #[test]
    fn stacked_opponent_offense_is_answered_with_harden() {
        let mut state = mirror_duel();
        state.stats.entry(SideId::Two, 0).attack_boosts = 2;

        let mut brain = AiBrain::new();
        let move_ = choose(&state, &mut brain, vec![99, 99]);
        assert_eq!(move_, Move::Harden);
    }

    #[test]
    fn explore_branch_picks_uniformly_among_scored_moves() {
        let state = mirror_duel();
        let mut brain = AiBrain::new();
        // 99 keeps the mood; 1 enters the explore branch (20% in the early
        // game); pick roll 7 indexes the positive list. At full HP, Mend and
        // Equalize score zero, leaving six candidates in catalog order.
        let move_ = choose(&state, &mut brain, vec![99, 1, 7]);
        assert_eq!(move_, Move::Hex);
    }

    #[test]
    fn mood_shift_resamples_from_the_roll() {
        let state = mirror_duel();
        let mut brain = AiBrain::new();
        assert_eq!(brain.mood(), Mood::Balanced);

        // 35 triggers the shift, pick 3 lands on aggressive, 99 skips
        // exploring, 50 drives the weighted pick.
        let move_ = choose(&state, &mut brain, vec![35, 3, 99, 50]);
        assert_eq!(brain.mood(), Mood::Aggressive);
        assert!(Move::CANDIDATES.contains(&move_));
    }

    #[test]
    fn the_ai_never_reaches_for_cheat() {
        let state = mirror_duel();
        for seed in 0..25 {
            let mut brain = AiBrain::new();
            let mut rng = TurnRng::new_seeded(seed);
            let move_ = brain.choose_move(&state, SideId::One, 0, SideId::Two, 0, &mut rng);
            assert_ne!(move_, Move::Cheat);
            assert!(Move::CANDIDATES.contains(&move_));
        }
    }

    #[test]
    fn missing_combatants_fall_back_to_strike() {
        let state = mirror_duel();
        let mut brain = AiBrain::new();
        let mut rng = TurnRng::new_for_test(vec![]);
        let move_ = brain.choose_move(&state, SideId::One, 5, SideId::Two, 0, &mut rng);
        assert_eq!(move_, Move::Strike);
    }
}
