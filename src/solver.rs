//! Solver driver.
//!
//! Maps one side's (plan, hand) weights onto a flat optimizer vector,
//! assembles the per-hand weight-conservation constraints, and minimizes
//! the opposing side's best-response value. The optimizer itself is
//! opaque to this module.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::best_response::counter_strategy_value;
use crate::cards::{Card, HoleCards};
use crate::optimizer::{minimize, MinimizeOptions, MinimizeResult, SimplexConstraint};
use crate::range::Range;
use crate::tree::{Action, Plan, Player, StrategyTree};

/// Per-hand equality constraint over a contiguous plan block: the
/// variables for `hand_index` across plans `[plan_start, plan_stop)`
/// must sum to `desired_total`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSumConstraint {
    pub hand_index: usize,
    pub plan_start: usize,
    pub plan_stop: usize,
    pub desired_total: f64,
}

/// One side's strategy optimization for a fixed spot.
pub struct Solver {
    hero: Player,
    villain: Player,
    tree: StrategyTree,
    hero_hands: Vec<(HoleCards, f64)>,
    villain_hands: Vec<(HoleCards, f64)>,
    hero_plans: Vec<Plan>,
    /// Hero plans answering the bet-first root line; they occupy the
    /// leading block of `hero_plans`.
    num_bet_plans: usize,
}

impl Solver {
    /// Set up a solve. Hand enumerations are snapshotted here so the
    /// variable layout stays fixed for the whole run.
    pub fn new(
        board: Vec<Card>,
        hero_range: &Range,
        villain_range: &Range,
        hero: Player,
        bet_size: f64,
        stack_size: f64,
        starting_pot_size: f64,
    ) -> Solver {
        let tree = StrategyTree::new(board, starting_pot_size, stack_size, bet_size);
        let mut hero_plans = tree.plans_for(hero);
        // Bet-first plans lead so every constraint block is contiguous.
        hero_plans.sort_by_key(|plan| plan.first() != Some(Action::Raise));
        let num_bet_plans =
            hero_plans.iter().filter(|plan| plan.first() == Some(Action::Raise)).count();

        Solver {
            hero,
            villain: hero.opponent(),
            hero_hands: hero_range.entries(),
            villain_hands: villain_range.entries(),
            hero_plans,
            num_bet_plans,
            tree,
        }
    }

    pub fn hero_plans(&self) -> &[Plan] {
        &self.hero_plans
    }

    pub fn hero_hands(&self) -> &[(HoleCards, f64)] {
        &self.hero_hands
    }

    pub fn num_variables(&self) -> usize {
        self.hero_plans.len() * self.hero_hands.len()
    }

    fn variable_index(&self, plan_index: usize, hand_index: usize) -> usize {
        plan_index * self.hero_hands.len() + hand_index
    }

    /// Starting point: each hand's weight spread uniformly across its
    /// admissible plans, per root-line partition for the in-position hero.
    pub fn initial_guess(&self) -> Vec<f64> {
        let num_plans = self.hero_plans.len();
        let mut x = vec![0.0; self.num_variables()];
        for (h, &(_, weight)) in self.hero_hands.iter().enumerate() {
            match self.hero {
                Player::OOP => {
                    for p in 0..num_plans {
                        x[self.variable_index(p, h)] = weight / num_plans as f64;
                    }
                }
                Player::IP => {
                    let num_check_plans = num_plans - self.num_bet_plans;
                    for p in 0..self.num_bet_plans {
                        x[self.variable_index(p, h)] = weight / self.num_bet_plans as f64;
                    }
                    for p in self.num_bet_plans..num_plans {
                        x[self.variable_index(p, h)] = weight / num_check_plans as f64;
                    }
                }
            }
        }
        x
    }

    /// Weight-conservation records: one block per hand for the
    /// out-of-position hero, one per root line for the in-position hero
    /// (the total committed against a bet and against a check must each
    /// equal the hand's input weight).
    pub fn constraints(&self) -> Vec<PlanSumConstraint> {
        let num_plans = self.hero_plans.len();
        let mut records = Vec::new();
        for (h, &(_, weight)) in self.hero_hands.iter().enumerate() {
            match self.hero {
                Player::OOP => records.push(PlanSumConstraint {
                    hand_index: h,
                    plan_start: 0,
                    plan_stop: num_plans,
                    desired_total: weight,
                }),
                Player::IP => {
                    records.push(PlanSumConstraint {
                        hand_index: h,
                        plan_start: 0,
                        plan_stop: self.num_bet_plans,
                        desired_total: weight,
                    });
                    records.push(PlanSumConstraint {
                        hand_index: h,
                        plan_start: self.num_bet_plans,
                        plan_stop: num_plans,
                        desired_total: weight,
                    });
                }
            }
        }
        records
    }

    fn lower_constraints(&self, records: &[PlanSumConstraint]) -> Vec<SimplexConstraint> {
        records
            .iter()
            .map(|record| SimplexConstraint {
                indices: (record.plan_start..record.plan_stop)
                    .map(|p| self.variable_index(p, record.hand_index))
                    .collect(),
                total: record.desired_total,
            })
            .collect()
    }

    /// Write the candidate strategy into the tree and score the villain's
    /// best response against it.
    pub fn evaluate_strategy(&mut self, x: &[f64]) -> f64 {
        self.tree.clear_ranges();
        let num_hands = self.hero_hands.len();
        for (p, plan) in self.hero_plans.iter().enumerate() {
            let mut plan_range = Range::new();
            for (h, &(hand, _)) in self.hero_hands.iter().enumerate() {
                plan_range.set(hand, x[p * num_hands + h]);
            }
            self.tree.modify_nodes_by_plan(plan, &plan_range);
        }
        counter_strategy_value(&self.tree, self.villain, &self.villain_hands)
    }

    /// Run the optimization and package the converged strategy.
    pub fn solve(&mut self, opts: &MinimizeOptions) -> Solution {
        let constraints = self.lower_constraints(&self.constraints());
        let x0 = self.initial_guess();
        let result = minimize(|x| self.evaluate_strategy(x), &x0, &constraints, opts);
        self.build_solution(result)
    }

    fn build_solution(&self, result: MinimizeResult) -> Solution {
        Solution {
            board: self.tree.board().iter().map(Card::to_string).collect(),
            hero: self.hero.as_str().to_string(),
            plans: self.hero_plans.iter().map(Plan::to_string).collect(),
            hands: self.hero_hands.iter().map(|(hand, _)| hand.to_string()).collect(),
            variables: result.x,
            objective: result.objective,
            iterations: result.iterations,
            converged: result.converged,
        }
    }
}

/// Converged strategy for one side of a solved spot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub board: String,
    pub hero: String,
    pub plans: Vec<String>,
    pub hands: Vec<String>,
    /// Plan-major variable vector: `plan_index * hands.len() + hand_index`.
    pub variables: Vec<f64>,
    /// The villain's best-response value against the returned strategy.
    pub objective: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl Solution {
    /// Weight of `hand_index`'s hand committed to `plan_index`.
    pub fn weight(&self, plan_index: usize, hand_index: usize) -> f64 {
        self.variables[plan_index * self.hands.len() + hand_index]
    }

    /// Render the (hand, plan) weight matrix.
    pub fn display(&self) {
        use colored::Colorize;
        use comfy_table::presets::UTF8_FULL;
        use comfy_table::Table;

        println!();
        println!(
            "  {} {} strategy  |  Board: {}  |  BR value: {:.4}  |  {} iterations{}",
            "GTO".bold(),
            self.hero.to_uppercase(),
            self.board,
            self.objective,
            self.iterations,
            if self.converged { "" } else { "  (not converged)" },
        );

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        let mut header = vec!["Hand".to_string()];
        header.extend(self.plans.iter().cloned());
        table.set_header(header);
        for (h, hand) in self.hands.iter().enumerate() {
            let mut row = vec![hand.clone()];
            for p in 0..self.plans.len() {
                row.push(format!("{:.3}", self.weight(p, h)));
            }
            table.add_row(row);
        }
        println!("{table}");
        println!();
    }

    fn cache_dir() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Path::new(&home).join(".river-gto").join("solver")
    }

    pub fn cache_path(board: &str, hero: &str) -> PathBuf {
        Solution::cache_dir().join(format!("river_{}_{}.bin", board, hero))
    }

    /// Best-effort write of the binary cache entry.
    pub fn save_cache(&self) {
        if let Ok(data) = bincode::serialize(self) {
            std::fs::create_dir_all(Solution::cache_dir()).ok();
            std::fs::write(Solution::cache_path(&self.board, &self.hero), data).ok();
        }
    }

    pub fn load_cache(board: &str, hero: &str) -> Option<Solution> {
        let data = std::fs::read(Solution::cache_path(board, hero)).ok()?;
        bincode::deserialize(&data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{hand_combos, parse_board};

    fn hole(s: &str) -> HoleCards {
        hand_combos(s).unwrap()[0]
    }

    fn queens_kings_aces() -> Range {
        Range::from_weights([(hole("QcQd"), 1.0), (hole("KcKd"), 1.0), (hole("AsAc"), 1.0)])
    }

    fn solver(hero: Player) -> Solver {
        let board = parse_board("2h 3h 4d 6d 7s").unwrap();
        let range = queens_kings_aces();
        Solver::new(board, &range, &range, hero, 0.5, 0.5, 1.0)
    }

    #[test]
    fn ip_plans_partition_bet_first() {
        let solver = solver(Player::IP);
        let plans: Vec<String> = solver.hero_plans().iter().map(Plan::to_string).collect();
        assert_eq!(plans, ["rf", "rc", "cr", "cc"]);
        assert_eq!(solver.num_variables(), 12);
    }

    #[test]
    fn oop_constraints_cover_all_plans() {
        let solver = solver(Player::OOP);
        let records = solver.constraints();
        assert_eq!(records.len(), 3);
        for (h, record) in records.iter().enumerate() {
            assert_eq!(record.hand_index, h);
            assert_eq!(record.plan_start, 0);
            assert_eq!(record.plan_stop, solver.hero_plans().len());
            assert_eq!(record.desired_total, 1.0);
        }
    }

    #[test]
    fn ip_constraints_split_by_root_line() {
        let solver = solver(Player::IP);
        let records = solver.constraints();
        assert_eq!(records.len(), 6);
        for pair in records.chunks(2) {
            assert_eq!(pair[0].plan_start, 0);
            assert_eq!(pair[0].plan_stop, 2);
            assert_eq!(pair[1].plan_start, 2);
            assert_eq!(pair[1].plan_stop, 4);
        }
    }

    #[test]
    fn initial_guess_satisfies_constraints() {
        for hero in [Player::OOP, Player::IP] {
            let solver = solver(hero);
            let x = solver.initial_guess();
            for record in solver.constraints() {
                let total: f64 = (record.plan_start..record.plan_stop)
                    .map(|p| x[p * solver.hero_hands().len() + record.hand_index])
                    .sum();
                assert!(
                    (total - record.desired_total).abs() < 1e-12,
                    "hand {} block [{}, {}) sums to {}",
                    record.hand_index,
                    record.plan_start,
                    record.plan_stop,
                    total,
                );
            }
        }
    }
}
