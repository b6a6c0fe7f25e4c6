//! Best-response (counter-strategy) evaluation.
//!
//! With one side's strategy written into the tree's node ranges, each
//! opposing hand walks the two root lines to find its highest-EV plan.
//! The counter-strategy value is the weight-summed result; it is the
//! scalar objective the solver minimizes.

use rayon::prelude::*;

use crate::cards::HoleCards;
use crate::equity::equity_hand_vs_range;
use crate::tree::{Action, Plan, Player, StrategyTree};

/// Expected value the `player` side extracts by best-responding to the
/// strategy currently filled into `tree`, summed over `hands`.
///
/// OOP chooses between opening lines, so its per-hand value is
/// `max(ev_bet, ev_check)`; IP's root line is forced by OOP, so both
/// lines realize and the values add.
///
/// Per-hand walks are independent and run in parallel; the final sum
/// runs in input order so repeated calls see identical float rounding.
pub fn counter_strategy_value(
    tree: &StrategyTree,
    player: Player,
    hands: &[(HoleCards, f64)],
) -> f64 {
    let per_hand: Vec<f64> = hands
        .par_iter()
        .map(|&(hand, weight)| {
            let (ev_bet, _) = highest_ev_plan(tree, player, hand, Action::Raise);
            let (ev_check, _) = highest_ev_plan(tree, player, hand, Action::Check);
            match player {
                Player::IP => weight * (ev_bet + ev_check),
                Player::OOP => weight * ev_bet.max(ev_check),
            }
        })
        .collect();
    per_hand.iter().sum()
}

/// Walk one root line's raise spine and return the best plan and EV for
/// `hand`.
///
/// Depth parity tells whose turn it is: the best responder acts at odd
/// depths when OOP and even depths when IP. Where the strategy side acts,
/// its fold and call ranges pay off into a running EV carried down the
/// spine; where the best responder acts, committing to a call or a fold
/// ends the plan. If the spine ends without a further raise, the
/// accumulated EV stands for the plan that keeps raising to the cap.
pub fn highest_ev_plan(
    tree: &StrategyTree,
    player: Player,
    hand: HoleCards,
    root_action: Action,
) -> (f64, Plan) {
    let modval = match player {
        Player::IP => 0,
        Player::OOP => 1,
    };
    let board = tree.board();
    let dead = hand.cards();

    let mut ev = 0.0;
    let mut max_ev = -1.0;
    let mut max_plan = Plan::new();

    let mut path = Plan::new().child(root_action);
    let mut node = tree.root().child_expected(root_action);
    loop {
        let call = node.child_expected(Action::Check);
        if path.len() % 2 == modval {
            // The strategy side responds here: its folds concede the pot
            // now, its calls realize showdown equity in the bigger pot.
            if let Some(fold) = node.child(Action::Fold) {
                ev += fold.range.size_without(&dead) * tree.amount_gained(node.pot_size);
            }
            let equity = equity_hand_vs_range(hand, &call.range, board);
            ev += call.range.size_without(&dead)
                * (equity * call.pot_size - tree.amount_lost(call.pot_size));
        } else {
            // The best responder is to act against the arriving range.
            let equity = equity_hand_vs_range(hand, &node.range, board);
            let arriving = node.range.size_without(&dead);
            let call_ev =
                ev + arriving * (equity * call.pot_size - tree.amount_lost(call.pot_size));
            if call_ev > max_ev {
                max_ev = call_ev;
                max_plan = path.child(Action::Check);
            }
            let fold_ev = ev - arriving * tree.amount_lost(node.pot_size);
            if fold_ev > max_ev {
                max_ev = fold_ev;
                max_plan = path.child(Action::Fold);
            }
        }

        match node.child(Action::Raise) {
            Some(raise) => {
                node = raise;
                path = path.child(Action::Raise);
            }
            None => {
                if ev > max_ev {
                    max_ev = ev;
                    max_plan = path;
                }
                return (max_ev, max_plan);
            }
        }
    }
}
