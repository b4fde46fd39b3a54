//! Demo driver: runs an AI-vs-AI duel and a clash to completion, printing the
//! formatted battle narration.

use pet_arena::battle::runner::{ClashRunner, DuelRunner};
use pet_arena::battle::state::TurnRng;
use pet_arena::participant::Participant;
use pet_arena::prefab_rosters;

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok());

    println!("=== Duel: Brambles vs Gustav ===");
    run_duel(seed);

    println!();
    println!("=== Clash: 4 vs 4 ===");
    run_clash(seed.map(|s| s.wrapping_add(1)));
}

fn fresh_rng(seed: Option<u64>, offset: u64) -> TurnRng {
    match seed {
        Some(seed) => TurnRng::new_seeded(seed.wrapping_add(offset)),
        None => TurnRng::new_random(),
    }
}

fn run_duel(seed: Option<u64>) {
    let side1 = Participant::ai("Brambles' handler".to_string(), vec![prefab_rosters::brambles()]);
    let side2 = Participant::ai("Gustav's handler".to_string(), vec![prefab_rosters::gustav()]);

    let mut runner = match DuelRunner::new("demo-duel".to_string(), side1, side2) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("Failed to set up duel: {}", err);
            return;
        }
    };

    let mut turn: u64 = 0;
    let mut result = runner.start(&mut fresh_rng(seed, turn));
    print_events(&result.events, runner.state());
    while !result.battle_ended {
        turn += 1;
        // Both sides are AI; each step keeps feeding fresh entropy.
        result = runner.step(&mut fresh_rng(seed, turn));
        print_events(&result.events, runner.state());
    }

    if let Some(rewards) = result.rewards {
        println!(
            "Payouts: winner {} / loser {}",
            rewards.winner_payout, rewards.loser_payout
        );
    }
}

fn run_clash(seed: Option<u64>) {
    let roster1 = match prefab_rosters::clash_roster(4) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("Failed to build roster: {}", err);
            return;
        }
    };
    let mut roster2 = roster1.clone();
    roster2.reverse();

    let side1 = Participant::ai("Team Dawn".to_string(), roster1);
    let side2 = Participant::ai("Team Dusk".to_string(), roster2);

    let mut runner = match ClashRunner::new("demo-clash".to_string(), side1, side2) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("Failed to set up clash: {}", err);
            return;
        }
    };

    let mut turn: u64 = 1000;
    let mut result = runner.start(&mut fresh_rng(seed, turn));
    print_events(&result.events, runner.state());
    while !result.battle_ended {
        turn += 1;
        result = runner.step(&mut fresh_rng(seed, turn));
        print_events(&result.events, runner.state());
    }
}

fn print_events(
    events: &[pet_arena::battle::state::BattleEvent],
    state: &pet_arena::battle::state::BattleState,
) {
    for event in events {
        if let Some(text) = event.format(state) {
            println!("  {}", text);
        }
    }
}
