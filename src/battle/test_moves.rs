#[cfg(test)]
mod tests {
    use crate::battle::engine::{resolve_move, select_target};
    use crate::battle::state::{BattleEvent, BattleState, BattleVariant, EventBus, TurnRng};
    use crate::battle::stats::{
        damage_value, effective_attack, effective_defense, effective_magic, heal_value,
    };
    use crate::errors::{EngineError, MoveError};
    use crate::moves::{get_move_data, Move};
    use crate::participant::{CallerRole, Participant, SideId};
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

    /// Mirror-match duel: equalization is a no-op and the starting-side coin
    /// flip is forced to side 1, so tests control every subsequent roll.
    fn mirror_duel(attack: u16, defense: u16, magic: u16) -> (BattleState, EventBus) {
        let mut state = BattleState::new(
            "test-duel".to_string(),
            Participant::human(
                "u1".to_string(),
                "Alice".to_string(),
                vec![pet("Aleph", attack, defense, magic)],
            ),
            Participant::human(
                "u2".to_string(),
                "Bob".to_string(),
                vec![pet("Bet", attack, defense, magic)],
            ),
            BattleVariant::Duel,
        );
        let mut bus = EventBus::new();
        state.begin(&mut TurnRng::new_for_test(vec![1]), &mut bus);
        (state, bus)
    }

    fn resolve(
        state: &mut BattleState,
        move_: Move,
        role: CallerRole,
        rolls: Vec<u8>,
        bus: &mut EventBus,
    ) -> Result<crate::battle::engine::MoveOutcome, EngineError> {
        let mut rng = TurnRng::new_for_test(rolls);
        resolve_move(state, SideId::One, 0, move_, None, role, &mut rng, bus)
    }

    #[test]
    fn strike_damage_follows_the_formula_and_updates_stats() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);
        let outcome = resolve(&mut state, Move::Strike, CallerRole::Player, vec![95], &mut bus)
            .expect("strike resolves");

        let actor = state.pet(SideId::One, 0).unwrap();
        let target = state.pet(SideId::Two, 0).unwrap();
        let expected = damage_value(
            effective_attack(actor),
            effective_defense(target),
            get_move_data(Move::Strike).power,
        );
        assert!(!outcome.dodged);
        assert_eq!(outcome.damage, Some(expected));
        assert_eq!(outcome.target, Some((SideId::Two, 0)));
        assert_eq!(target.current_hp(), target.total_max_hp() - expected);

        assert_eq!(state.stats.get(SideId::One, 0).damage_dealt, expected as u64);
        assert_eq!(state.stats.get(SideId::Two, 0).damage_taken, expected as u64);
        assert_eq!(state.stats.get(SideId::One, 0).last_move, Some(Move::Strike));
    }

    #[test]
    fn repeating_a_move_telegraphs_it() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);

        // 50 clears the 10% base dodge window on first use.
        let first = resolve(&mut state, Move::Strike, CallerRole::Player, vec![50], &mut bus)
            .expect("first strike resolves");
        assert!(!first.dodged);

        // The same roll lands inside the 70% repeat window.
        let second = resolve(&mut state, Move::Strike, CallerRole::Player, vec![50], &mut bus)
            .expect("second strike resolves");
        assert!(second.dodged);
        assert_eq!(second.damage, None);
        assert!(bus
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::MoveDodged { .. })));
    }

    #[test]
    fn hex_resolves_magic_against_magic() {
        let (mut state, mut bus) = mirror_duel(20, 20, 40);
        let outcome = resolve(&mut state, Move::Hex, CallerRole::Player, vec![95], &mut bus)
            .expect("hex resolves");

        let actor = state.pet(SideId::One, 0).unwrap();
        let target = state.pet(SideId::Two, 0).unwrap();
        let expected = damage_value(
            effective_magic(actor),
            effective_magic(target),
            get_move_data(Move::Hex).power,
        );
        assert_eq!(outcome.damage, Some(expected));
    }

    #[test]
    fn wild_swing_variance_scales_with_the_roll() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);
        let base = {
            let actor = state.pet(SideId::One, 0).unwrap();
            let target = state.pet(SideId::Two, 0).unwrap();
            damage_value(
                effective_attack(actor),
                effective_defense(target),
                get_move_data(Move::WildSwing).power,
            )
        };
        let cap = {
            let target = state.pet(SideId::Two, 0).unwrap();
            (target.total_max_hp() * 30 / 100).max(1)
        };

        // Roll 100: factor 1.5.
        let high = resolve(
            &mut state,
            Move::WildSwing,
            CallerRole::Player,
            vec![95, 100],
            &mut bus,
        )
        .expect("wild swing resolves");
        let expected_high = ((base as f64 * 1.5).round() as u32).clamp(1, cap);
        assert_eq!(high.damage, Some(expected_high));

        // Roll 10: factor 0.6. Repeat dodge is 70, so 95 still lands.
        let low = resolve(
            &mut state,
            Move::WildSwing,
            CallerRole::Player,
            vec![95, 10],
            &mut bus,
        )
        .expect("wild swing resolves");
        let expected_low = ((base as f64 * 0.6).round() as u32).clamp(1, cap);
        assert_eq!(low.damage, Some(expected_low));
        assert!(low.damage < high.damage);
    }

    #[test]
    fn burst_crit_multiplies_damage_and_announces() {
        // Tanky mirror so neither branch saturates the 50% cap.
        let (mut state, mut bus) = mirror_duel(30, 40, 5);
        let base = {
            let actor = state.pet(SideId::One, 0).unwrap();
            let target = state.pet(SideId::Two, 0).unwrap();
            damage_value(
                effective_attack(actor),
                effective_defense(target),
                get_move_data(Move::Burst).power,
            )
        };

        // Dodge roll 95 clears the 50% window; crit roll 10 is within 25%.
        let crit = resolve(
            &mut state,
            Move::Burst,
            CallerRole::Player,
            vec![95, 10],
            &mut bus,
        )
        .expect("burst resolves");
        assert_eq!(crit.damage, Some((base as f64 * 1.5).round() as u32));
        assert!(bus
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::CriticalHit { .. })));

        // Crit roll 80 misses the window; plain base damage.
        let plain = resolve(
            &mut state,
            Move::Burst,
            CallerRole::Player,
            vec![95, 80],
            &mut bus,
        )
        .expect("burst resolves");
        assert_eq!(plain.damage, Some(base));
    }

    #[test]
    fn mend_decays_per_use() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);
        state.pet_mut(SideId::One, 0).unwrap().set_hp(20);

        let expected_first = heal_value(state.pet(SideId::One, 0).unwrap(), 0);
        let first = resolve(&mut state, Move::Mend, CallerRole::Player, vec![95], &mut bus)
            .expect("mend resolves");
        assert_eq!(first.heal, Some(expected_first));

        let expected_second = heal_value(state.pet(SideId::One, 0).unwrap(), 1);
        let second = resolve(&mut state, Move::Mend, CallerRole::Player, vec![95], &mut bus)
            .expect("mend resolves");
        assert_eq!(second.heal, Some(expected_second));
        assert!(expected_second < expected_first);
        assert_eq!(state.stats.get(SideId::One, 0).heals_performed, 2);
    }

    #[test]
    fn buffs_decay_and_fizzle_at_the_cap() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);

        let mut amounts = Vec::new();
        for _ in 0..3 {
            let outcome = resolve(&mut state, Move::Sharpen, CallerRole::Player, vec![95], &mut bus)
                .expect("sharpen resolves");
            let (_, amount) = outcome.boost.expect("boost applied");
            amounts.push(amount);
        }
        assert!(amounts[0] > amounts[1] && amounts[1] > amounts[2]);
        assert_eq!(
            state.pet(SideId::One, 0).unwrap().mods.attack,
            amounts.iter().sum::<u32>() as i32
        );

        // Fourth application fizzles without touching the modifier.
        let fizzled = resolve(&mut state, Move::Sharpen, CallerRole::Player, vec![95], &mut bus)
            .expect("sharpen resolves");
        assert_eq!(fizzled.boost, None);
        assert_eq!(state.stats.get(SideId::One, 0).attack_boosts, 3);
        assert!(bus
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::BoostFizzled { .. })));
    }

    #[test]
    fn equalize_fizzles_unless_behind_on_hp() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);

        // Both at full HP: nothing to siphon.
        let fizzled = resolve(&mut state, Move::Equalize, CallerRole::Player, vec![95], &mut bus)
            .expect("equalize resolves");
        assert_eq!(fizzled.damage, None);
        assert_eq!(fizzled.heal, None);
        assert!(bus
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::EqualizeFizzled { .. })));
    }

    #[test]
    fn equalize_drains_proportionally_to_the_gap() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);
        let max = state.pet(SideId::One, 0).unwrap().total_max_hp();
        state.pet_mut(SideId::One, 0).unwrap().set_hp(max / 5);

        let actor_hp_before = state.pet(SideId::One, 0).unwrap().current_hp();
        let target_hp_before = state.pet(SideId::Two, 0).unwrap().current_hp();

        let outcome = resolve(&mut state, Move::Equalize, CallerRole::Player, vec![95], &mut bus)
            .expect("equalize resolves");
        let damage = outcome.damage.expect("damage dealt");
        let healed = outcome.heal.expect("hp siphoned");
        assert!(damage >= 1);
        assert!(damage <= (max * 30 / 100).max(1));
        assert!(healed > 0);
        assert_eq!(
            state.pet(SideId::Two, 0).unwrap().current_hp(),
            target_hp_before - damage
        );
        assert_eq!(
            state.pet(SideId::One, 0).unwrap().current_hp(),
            actor_hp_before + healed
        );
    }

    #[test]
    fn cheat_is_admin_only_and_leaves_one_hp() {
        let (mut state, mut bus) = mirror_duel(50, 20, 10);

        let rejected = resolve(&mut state, Move::Cheat, CallerRole::Player, vec![], &mut bus);
        assert!(matches!(
            rejected,
            Err(EngineError::Move(MoveError::CheatForbidden))
        ));
        assert_eq!(
            state.pet(SideId::Two, 0).unwrap().current_hp(),
            state.pet(SideId::Two, 0).unwrap().total_max_hp()
        );

        // Cheat never rolls: no dodge, no variance.
        let outcome = resolve(&mut state, Move::Cheat, CallerRole::Admin, vec![], &mut bus)
            .expect("admin cheat resolves");
        assert!(outcome.damage.is_some());
        let target = state.pet(SideId::Two, 0).unwrap();
        assert_eq!(target.current_hp(), 1);
        assert!(!target.is_down());
    }

    #[test]
    fn damage_floors_at_one_against_a_wall() {
        let mut state = BattleState::new(
            "wall".to_string(),
            Participant::human(
                "u1".to_string(),
                "Alice".to_string(),
                vec![pet("Featherweight", 1, 99, 1)],
            ),
            Participant::human(
                "u2".to_string(),
                "Bob".to_string(),
                vec![pet("Rampart", 10, 200, 10)],
            ),
            BattleVariant::Duel,
        );
        let mut bus = EventBus::new();
        // Side 1 is weaker, so it starts without a coin flip.
        state.begin(&mut TurnRng::new_for_test(vec![]), &mut bus);
        assert_eq!(state.active_side, SideId::One);

        let outcome = resolve(&mut state, Move::Strike, CallerRole::Player, vec![95], &mut bus)
            .expect("strike resolves");
        assert_eq!(outcome.damage, Some(1));
    }

    #[test]
    fn two_forced_strikes_accumulate_reproducible_damage() {
        let mut state = BattleState::new(
            "exchange".to_string(),
            Participant::human(
                "u1".to_string(),
                "Alice".to_string(),
                vec![pet("Brambles", 50, 20, 10)],
            ),
            Participant::human(
                "u2".to_string(),
                "Bob".to_string(),
                vec![pet("Gustav", 30, 40, 5)],
            ),
            BattleVariant::Duel,
        );
        let mut bus = EventBus::new();
        state.begin(&mut TurnRng::new_for_test(vec![]), &mut bus);
        // Hold the turn with side 1 for a back-to-back pair of strikes.
        state.active_side = SideId::One;

        let per_hit = {
            let actor = state.pet(SideId::One, 0).unwrap();
            let target = state.pet(SideId::Two, 0).unwrap();
            damage_value(
                effective_attack(actor),
                effective_defense(target),
                get_move_data(Move::Strike).power,
            )
        };
        let target_max = state.pet(SideId::Two, 0).unwrap().total_max_hp();

        // 95 clears both the 10% base and the 70% repeat dodge window.
        for _ in 0..2 {
            let outcome =
                resolve(&mut state, Move::Strike, CallerRole::Player, vec![95], &mut bus)
                    .expect("strike resolves");
            assert_eq!(outcome.damage, Some(per_hit));
        }

        assert_eq!(
            state.pet(SideId::Two, 0).unwrap().current_hp(),
            target_max - 2 * per_hit
        );
        assert_eq!(
            state.stats.get(SideId::One, 0).damage_dealt,
            2 * per_hit as u64
        );
    }

    #[test]
    fn targeting_prefers_the_weakest_standing_pet() {
        let mut state = BattleState::new(
            "targets".to_string(),
            Participant::human(
                "u1".to_string(),
                "Alice".to_string(),
                vec![pet("Aleph", 50, 20, 10)],
            ),
            Participant::human(
                "u2".to_string(),
                "Bob".to_string(),
                vec![
                    pet("Bet", 50, 20, 10),
                    pet("Gimel", 50, 20, 10),
                    pet("Dalet", 50, 20, 10),
                ],
            ),
            BattleVariant::Clash,
        );
        let mut bus = EventBus::new();
        state.begin(&mut TurnRng::new_for_test(vec![]), &mut bus);

        state.pet_mut(SideId::Two, 1).unwrap().set_hp(15);
        let mut rng = TurnRng::new_for_test(vec![]);
        assert_eq!(select_target(&state, SideId::Two, None, &mut rng), Some(1));

        // An explicit standing slot is honored as-is.
        assert_eq!(select_target(&state, SideId::Two, Some(2), &mut rng), Some(2));

        // An explicit down slot falls back to the heuristic.
        state.pet_mut(SideId::Two, 1).unwrap().set_hp(0);
        state.side_mut(SideId::Two).down.insert(1);
        state.pet_mut(SideId::Two, 0).unwrap().set_hp(10);
        assert_eq!(select_target(&state, SideId::Two, Some(1), &mut rng), Some(0));

        // An HP tie between slots 0 and 2 goes to the tie-break roll.
        state.pet_mut(SideId::Two, 2).unwrap().set_hp(10);
        let mut heads = TurnRng::new_for_test(vec![2]);
        assert_eq!(select_target(&state, SideId::Two, None, &mut heads), Some(0));
        let mut tails = TurnRng::new_for_test(vec![3]);
        assert_eq!(select_target(&state, SideId::Two, None, &mut tails), Some(2));
    }
}
