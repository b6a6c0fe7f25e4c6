//! End-to-end solver tests on the three-pair toy spot: queens, kings,
//! and aces against the same range on a blank runout, half-pot bet,
//! half-pot stack. The first bet is already all-in, giving the classic
//! bet/check-call/check-fold geometry with known best-response values.

use approx::assert_abs_diff_eq;

use river_gto::cards::{hand_combos, parse_board, Card, HoleCards};
use river_gto::optimizer::MinimizeOptions;
use river_gto::range::Range;
use river_gto::solver::Solver;
use river_gto::tree::Player;

fn hole(s: &str) -> HoleCards {
    hand_combos(s).unwrap()[0]
}

fn board() -> Vec<Card> {
    parse_board("2h 3h 4d 6d 7s").unwrap()
}

fn queens_kings_aces() -> Range {
    Range::from_weights([(hole("QcQd"), 1.0), (hole("KcKd"), 1.0), (hole("AsAc"), 1.0)])
}

fn solver(hero: Player) -> Solver {
    let range = queens_kings_aces();
    Solver::new(board(), &range, &range, hero, 0.5, 0.5, 1.0)
}

fn opts() -> MinimizeOptions {
    MinimizeOptions { max_iterations: 3000, ..Default::default() }
}

// ---------------------------------------------------------------------------
// Objective plumbing
// ---------------------------------------------------------------------------

#[test]
fn ip_uniform_strategy_value() {
    // Uniform half-half splits hand-checked through the tree walk:
    // OOP best-responds for 4.5 against the unoptimized IP strategy.
    let mut solver = solver(Player::IP);
    let x0 = solver.initial_guess();
    assert_abs_diff_eq!(solver.evaluate_strategy(&x0), 4.5, epsilon = 1e-9);
}

#[test]
fn oop_uniform_strategy_value() {
    // One-third spreads over bet / check-fold / check-call give IP 13/3.
    let mut solver = solver(Player::OOP);
    let x0 = solver.initial_guess();
    assert_abs_diff_eq!(solver.evaluate_strategy(&x0), 13.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn objective_is_deterministic() {
    let mut solver = solver(Player::IP);
    let x0 = solver.initial_guess();
    let first = solver.evaluate_strategy(&x0);
    let second = solver.evaluate_strategy(&x0);
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Full solves
// ---------------------------------------------------------------------------

#[test]
fn ip_hero_converges_to_game_value() {
    let mut solver = solver(Player::IP);
    let solution = solver.solve(&opts());

    assert_eq!(solution.plans, ["rf", "rc", "cr", "cc"]);
    assert_eq!(solution.hands.len(), 3);
    assert_eq!(solution.variables.len(), 12);
    assert_abs_diff_eq!(solution.objective, 2.833, epsilon = 0.05);

    // The optimizer must actually beat the uniform starting point.
    let x0 = solver.initial_guess();
    assert!(solution.objective < solver.evaluate_strategy(&x0) - 1.0);
}

#[test]
fn oop_hero_converges_to_game_value() {
    let mut solver = solver(Player::OOP);
    let solution = solver.solve(&opts());

    assert_eq!(solution.plans, ["r", "crf", "crc"]);
    assert_abs_diff_eq!(solution.objective, 3.167, epsilon = 0.05);
}

#[test]
fn position_is_worth_a_third_of_the_pot() {
    // The same symmetric range concedes less as IP than as OOP.
    let ip_value = solver(Player::IP).solve(&opts()).objective;
    let oop_value = solver(Player::OOP).solve(&opts()).objective;
    assert!(
        ip_value + 0.1 < oop_value,
        "IP should concede less: ip {} oop {}",
        ip_value,
        oop_value,
    );
}

#[test]
fn solved_strategy_respects_constraints() {
    let mut solver = solver(Player::IP);
    let solution = solver.solve(&opts());

    for record in solver.constraints() {
        let total: f64 = (record.plan_start..record.plan_stop)
            .map(|p| solution.weight(p, record.hand_index))
            .sum();
        assert_abs_diff_eq!(total, record.desired_total, epsilon = 1e-6);
    }
    assert!(solution.variables.iter().all(|&v| v >= -1e-12));
}

#[test]
fn solution_roundtrips_through_serde() {
    let mut solver = solver(Player::IP);
    let solution = solver.solve(&MinimizeOptions { max_iterations: 50, ..Default::default() });

    let json = serde_json::to_string(&solution).unwrap();
    let back: river_gto::solver::Solution = serde_json::from_str(&json).unwrap();
    assert_eq!(back.plans, solution.plans);
    assert_eq!(back.variables, solution.variables);
    assert_eq!(back.objective, solution.objective);
}
