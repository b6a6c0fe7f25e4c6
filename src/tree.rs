//! Fixed-shape betting tree over the check/raise/fold alphabet.
//!
//! The shape is determined once by (board, starting pot, stack, bet size)
//! and never rewritten; node ranges are cleared and refilled on every
//! objective evaluation. A bet grows the pot by `1 + 2 * bet_size`, both
//! players contributing, and the raise chain stops as soon as calling
//! would put a full stack in.

use std::fmt;
use std::str::FromStr;

use crate::cards::Card;
use crate::error::{SolverError, SolverResult};
use crate::range::Range;

/// Which player is acting. OOP acts first on the street.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    OOP,
    IP,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::OOP => Player::IP,
            Player::IP => Player::OOP,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::OOP => "oop",
            Player::IP => "ip",
        }
    }
}

impl FromStr for Player {
    type Err = SolverError;

    fn from_str(s: &str) -> SolverResult<Player> {
        match s.to_ascii_lowercase().as_str() {
            "ip" => Ok(Player::IP),
            "oop" => Ok(Player::OOP),
            _ => Err(SolverError::InvalidPlayer(s.to_string())),
        }
    }
}

/// One action symbol. `Check` doubles as the call, `Raise` as the bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Check,
    Raise,
    Fold,
}

impl Action {
    pub fn symbol(self) -> char {
        match self {
            Action::Check => 'c',
            Action::Raise => 'r',
            Action::Fold => 'f',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Action> {
        match symbol {
            'c' => Some(Action::Check),
            'r' => Some(Action::Raise),
            'f' => Some(Action::Fold),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            Action::Check => 0,
            Action::Raise => 1,
            Action::Fold => 2,
        }
    }
}

/// A complete action sequence one player commits to, from the root down
/// one branch. The first symbol is OOP's action, the second IP's,
/// alternating; odd-length plans therefore belong to OOP, even to IP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Plan(Vec<Action>);

impl Plan {
    pub fn new() -> Plan {
        Plan::default()
    }

    /// Parse a plan string like "crc". None on symbols outside c/r/f.
    pub fn parse(s: &str) -> Option<Plan> {
        s.chars().map(Action::from_symbol).collect::<Option<Vec<Action>>>().map(Plan)
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Action> {
        self.0.first().copied()
    }

    pub fn owner(&self) -> Player {
        if self.0.len() % 2 == 0 {
            Player::IP
        } else {
            Player::OOP
        }
    }

    /// This plan extended by one action.
    pub fn child(&self, action: Action) -> Plan {
        let mut actions = self.0.clone();
        actions.push(action);
        Plan(actions)
    }

    /// The plan that stops one action earlier, if any.
    pub fn parent(&self) -> Option<Plan> {
        if self.0.is_empty() {
            None
        } else {
            Some(Plan(self.0[..self.0.len() - 1].to_vec()))
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.0 {
            write!(f, "{}", action.symbol())?;
        }
        Ok(())
    }
}

/// One node of the betting tree. Children sit in three optional slots
/// keyed by action symbol; the attached range is the player-to-act's
/// arriving weight under the strategy currently written into the tree.
#[derive(Debug)]
pub struct StrategyTreeNode {
    pub pot_size: f64,
    pub range: Range,
    children: [Option<Box<StrategyTreeNode>>; 3],
}

impl StrategyTreeNode {
    fn new(pot_size: f64) -> StrategyTreeNode {
        StrategyTreeNode { pot_size, range: Range::new(), children: [None, None, None] }
    }

    pub fn child(&self, action: Action) -> Option<&StrategyTreeNode> {
        self.children[action.slot()].as_deref()
    }

    pub fn child_mut(&mut self, action: Action) -> Option<&mut StrategyTreeNode> {
        self.children[action.slot()].as_deref_mut()
    }

    /// A child the tree shape guarantees: every raise node carries a call
    /// child and both root lines exist.
    pub(crate) fn child_expected(&self, action: Action) -> &StrategyTreeNode {
        self.child(action).expect("tree shape guarantees this child")
    }

    fn set_child(&mut self, action: Action, node: StrategyTreeNode) -> &mut StrategyTreeNode {
        let slot = &mut self.children[action.slot()];
        *slot = Some(Box::new(node));
        slot.as_deref_mut().expect("just inserted")
    }
}

/// The betting tree for one solve.
#[derive(Debug)]
pub struct StrategyTree {
    board: Vec<Card>,
    root: StrategyTreeNode,
    plans: Vec<Plan>,
    starting_pot_size: f64,
}

impl StrategyTree {
    /// Build the canonical check/raise/fold tree.
    ///
    /// Panics on a board that is not five cards or non-positive pot,
    /// stack, or bet size (a zero bet size would never cap the stacks).
    pub fn new(
        board: Vec<Card>,
        starting_pot_size: f64,
        stack_size: f64,
        bet_size: f64,
    ) -> StrategyTree {
        assert_eq!(board.len(), 5, "strategy tree requires a completed five-card board");
        assert!(starting_pot_size > 0.0, "starting pot size must be positive");
        assert!(stack_size > 0.0, "stack size must be positive");
        assert!(bet_size > 0.0, "bet size must be positive");

        let mut tree = StrategyTree {
            board,
            root: StrategyTreeNode::new(starting_pot_size),
            plans: Vec::new(),
            starting_pot_size,
        };
        tree.generate(stack_size, bet_size);
        tree
    }

    fn generate(&mut self, stack_size: f64, bet_size: f64) {
        let p0 = self.starting_pot_size;
        let StrategyTree { root, plans, .. } = self;

        // Root geometry: OOP bets or checks, and IP bets or checks back
        // after the check. Pots only grow once a raise node expands.
        let bet_plan = Plan(vec![Action::Raise]);
        let check_plan = Plan(vec![Action::Check]);
        record_plan(plans, bet_plan.clone());
        root.set_child(Action::Raise, StrategyTreeNode::new(p0));
        record_plan(plans, check_plan.clone());
        let check = root.set_child(Action::Check, StrategyTreeNode::new(p0));
        let check_raise_plan = check_plan.child(Action::Raise);
        record_plan(plans, check_raise_plan.clone());
        record_plan(plans, check_plan.child(Action::Check));
        check.set_child(Action::Check, StrategyTreeNode::new(p0));
        let check_raise = check.set_child(Action::Raise, StrategyTreeNode::new(p0));

        // Expansion order matches construction: check-raise line first.
        expand(check_raise, &check_raise_plan, p0, stack_size, bet_size, plans);
        let bet = root.child_mut(Action::Raise).expect("created above");
        expand(bet, &bet_plan, p0, stack_size, bet_size, plans);
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn root(&self) -> &StrategyTreeNode {
        &self.root
    }

    pub fn starting_pot_size(&self) -> f64 {
        self.starting_pot_size
    }

    /// Winner's profit after a fold or completed action at pot `pot_size`.
    pub fn amount_gained(&self, pot_size: f64) -> f64 {
        (pot_size + self.starting_pot_size) / 2.0
    }

    /// Loser's loss at pot `pot_size`.
    pub fn amount_lost(&self, pot_size: f64) -> f64 {
        (pot_size - self.starting_pot_size) / 2.0
    }

    /// Every complete plan, in construction order.
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// The plans one player can commit to (IP even length, OOP odd).
    pub fn plans_for(&self, player: Player) -> Vec<Plan> {
        self.plans.iter().filter(|plan| plan.owner() == player).cloned().collect()
    }

    /// Add `delta` into the range of every node visited along `plan`.
    ///
    /// Panics if the plan walks off the tree; plans obtained from
    /// [`StrategyTree::plans`] always fit.
    pub fn modify_nodes_by_plan(&mut self, plan: &Plan, delta: &Range) {
        let mut current = &mut self.root;
        for &action in plan.actions() {
            current = current.child_mut(action).expect("plan follows the tree shape");
            current.range += delta;
        }
    }

    /// Reset every node's range to empty.
    pub fn clear_ranges(&mut self) {
        clear(&mut self.root);
    }
}

fn clear(node: &mut StrategyTreeNode) {
    node.range = Range::new();
    for child in node.children.iter_mut().flatten() {
        clear(child);
    }
}

/// Record a freshly created node's plan. A new raise plan supersedes the
/// stopped-at-the-parent plan.
fn record_plan(plans: &mut Vec<Plan>, plan: Plan) {
    if plan.actions().last() == Some(&Action::Raise) {
        if let Some(parent) = plan.parent() {
            plans.retain(|existing| *existing != parent);
        }
    }
    plans.push(plan);
}

/// Grow the raise chain below a freshly created raise node.
fn expand(
    node: &mut StrategyTreeNode,
    path: &Plan,
    p0: f64,
    stack_size: f64,
    bet_size: f64,
    plans: &mut Vec<Plan>,
) {
    let pot = node.pot_size;
    let new_pot = pot * (1.0 + 2.0 * bet_size);

    record_plan(plans, path.child(Action::Fold));
    node.set_child(Action::Fold, StrategyTreeNode::new(pot));

    if (new_pot - p0) / 2.0 >= stack_size {
        // The next call puts a full stack in: all-in terminal, no reraise.
        record_plan(plans, path.child(Action::Check));
        node.set_child(Action::Check, StrategyTreeNode::new(2.0 * stack_size + p0));
    } else {
        record_plan(plans, path.child(Action::Check));
        node.set_child(Action::Check, StrategyTreeNode::new(new_pot));
        let raise_plan = path.child(Action::Raise);
        record_plan(plans, raise_plan.clone());
        let raise = node.set_child(Action::Raise, StrategyTreeNode::new(new_pot));
        expand(raise, &raise_plan, p0, stack_size, bet_size, plans);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_board;

    fn tree(stack_size: f64, bet_size: f64) -> StrategyTree {
        let board = parse_board("2h 3h 4d 6d 7s").unwrap();
        StrategyTree::new(board, 1.0, stack_size, bet_size)
    }

    fn plan_strings(plans: &[Plan]) -> Vec<String> {
        plans.iter().map(Plan::to_string).collect()
    }

    #[test]
    fn shallow_stack_plans() {
        // Stack 0.5 at bet size 0.5: the first bet is already all-in.
        let tree = tree(0.5, 0.5);
        assert_eq!(plan_strings(tree.plans()), ["r", "cr", "cc", "crf", "crc", "rf", "rc"]);
    }

    #[test]
    fn deeper_stack_extends_raise_chain() {
        // Stack 2 at bet size 1: one raise fits before the cap. The
        // check-only and bet-and-stop plans are superseded by their raise
        // continuations.
        let tree = tree(2.0, 1.0);
        assert_eq!(
            plan_strings(tree.plans()),
            ["cc", "crf", "crc", "crr", "crrf", "crrc", "rf", "rc", "rr", "rrf", "rrc"],
        );
    }

    #[test]
    fn plan_ownership_by_parity() {
        let tree = tree(2.0, 1.0);
        for plan in tree.plans_for(Player::IP) {
            assert_eq!(plan.len() % 2, 0, "IP plan {} should have even length", plan);
        }
        for plan in tree.plans_for(Player::OOP) {
            assert_eq!(plan.len() % 2, 1, "OOP plan {} should have odd length", plan);
        }
    }

    #[test]
    fn pot_sizes_follow_bet_geometry() {
        let tree = tree(2.0, 1.0);
        let root = tree.root();
        assert_eq!(root.pot_size, 1.0);

        let bet = root.child(Action::Raise).unwrap();
        assert_eq!(bet.pot_size, 1.0);
        // Bet then call: both players add a full pot.
        assert_eq!(bet.child(Action::Check).unwrap().pot_size, 3.0);
        // Fold leaves the pot where the raiser found it.
        assert_eq!(bet.child(Action::Fold).unwrap().pot_size, 1.0);

        // Raise then call caps at two stacks plus the starting pot.
        let reraise = bet.child(Action::Raise).unwrap();
        assert_eq!(reraise.child(Action::Check).unwrap().pot_size, 5.0);
        assert!(reraise.child(Action::Raise).is_none());
    }

    #[test]
    fn gain_loss_split_the_starting_pot() {
        let tree = tree(2.0, 1.0);
        assert_eq!(tree.amount_gained(1.0), 1.0);
        assert_eq!(tree.amount_lost(1.0), 0.0);
        assert_eq!(tree.amount_gained(3.0), 2.0);
        assert_eq!(tree.amount_lost(3.0), 1.0);
    }

    #[test]
    fn fill_and_clear_ranges() {
        use crate::cards::hand_combos;
        use crate::range::Range;

        let mut tree = tree(0.5, 0.5);
        let hand = hand_combos("AsAc").unwrap()[0];
        let delta = Range::from_weights([(hand, 1.0)]);
        let plan = Plan::parse("crc").unwrap();
        tree.modify_nodes_by_plan(&plan, &delta);

        {
            let check = tree.root().child(Action::Check).unwrap();
            let check_raise = check.child(Action::Raise).unwrap();
            let call = check_raise.child(Action::Check).unwrap();
            assert_eq!(check.range.size(), 1.0);
            assert_eq!(check_raise.range.size(), 1.0);
            assert_eq!(call.range.size(), 1.0);
            // The root itself is not part of any plan.
            assert_eq!(tree.root().range.size(), 0.0);
            // Sibling lines stay empty.
            assert_eq!(tree.root().child(Action::Raise).unwrap().range.size(), 0.0);
        }

        tree.clear_ranges();
        assert_eq!(tree.root().child(Action::Check).unwrap().range.size(), 0.0);
    }

    #[test]
    fn plan_parse_display_roundtrip() {
        for s in ["r", "cc", "crc", "rrf"] {
            assert_eq!(Plan::parse(s).unwrap().to_string(), s);
        }
        assert!(Plan::parse("crx").is_none());
    }

    #[test]
    fn player_parsing() {
        assert_eq!("ip".parse::<Player>().unwrap(), Player::IP);
        assert_eq!("OOP".parse::<Player>().unwrap(), Player::OOP);
        assert!(matches!(
            "button".parse::<Player>(),
            Err(SolverError::InvalidPlayer(_)),
        ));
    }
}
