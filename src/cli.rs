//! Command-line interface.

use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::seq::SliceRandom;

use crate::cards::{parse_board, parse_hand, Card, HoleCards, DECK};
use crate::equity::{equity_hand_vs_range, equity_range_vs_range};
use crate::error::SolverResult;
use crate::hand_eval::evaluate;
use crate::optimizer::MinimizeOptions;
use crate::range::Range;
use crate::solver::{Solution, Solver};
use crate::tree::Player;

#[derive(Parser)]
#[command(name = "river-gto", about = "Heads-up river strategy solver", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a 5-7 card hand, e.g. "Ah Kh Qh Jh Th 2c 3d".
    Eval {
        cards: String,
    },
    /// Hand-vs-range or range-vs-range equity on a river board.
    Equity {
        /// Five board cards, compact ("2h3h4d6d7s") or spaced.
        #[arg(long)]
        board: String,
        /// Hero as two cards ("Kc Kd") or range notation ("AA,KQs").
        #[arg(long)]
        hero: String,
        /// Villain range notation, optionally weighted ("AA:1,56s:2").
        #[arg(long)]
        villain: String,
    },
    /// Solve one side's optimal strategy for a river spot.
    Solve {
        #[arg(long)]
        board: String,
        #[arg(long)]
        hero_range: String,
        #[arg(long)]
        villain_range: String,
        /// Side to optimize: "ip" or "oop".
        #[arg(long, default_value = "ip")]
        hero: String,
        /// Bet size as a fraction of the pot.
        #[arg(long, default_value_t = 1.0)]
        bet_size: f64,
        /// Effective stack behind, in starting-pot units.
        #[arg(long, default_value_t = 1.0)]
        stack_size: f64,
        #[arg(long, default_value_t = 1.0)]
        pot: f64,
        #[arg(long, default_value_t = 4000)]
        iterations: usize,
        /// Emit the solution as JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Reuse and write the binary solution cache.
        #[arg(long)]
        cached: bool,
    },
    /// Time the evaluator over random 7-card hands.
    Bench {
        #[arg(long, default_value_t = 100_000)]
        hands: usize,
    },
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> SolverResult<()> {
    match command {
        Command::Eval { cards } => eval_command(&cards),
        Command::Equity { board, hero, villain } => equity_command(&board, &hero, &villain),
        Command::Solve {
            board,
            hero_range,
            villain_range,
            hero,
            bet_size,
            stack_size,
            pot,
            iterations,
            json,
            cached,
        } => solve_command(
            &board,
            &hero_range,
            &villain_range,
            &hero,
            bet_size,
            stack_size,
            pot,
            iterations,
            json,
            cached,
        ),
        Command::Bench { hands } => {
            bench_command(hands);
            Ok(())
        }
    }
}

fn eval_command(cards: &str) -> SolverResult<()> {
    let cards = parse_hand(cards)?;
    let value = evaluate(&cards)?;
    let ranks: Vec<String> = value
        .ranks()
        .iter()
        .map(|&r| (crate::cards::RANKS.as_bytes()[r as usize] as char).to_string())
        .collect();
    println!(
        "{}  (kickers: {})",
        value.category().to_string().bold(),
        ranks.join(" "),
    );
    Ok(())
}

fn equity_command(board: &str, hero: &str, villain: &str) -> SolverResult<()> {
    let board = parse_board(board)?;
    let villain = Range::parse(villain)?;

    let equity = match parse_hand(hero) {
        Ok(cards) if cards.len() == 2 && cards[0] != cards[1] => {
            equity_hand_vs_range(HoleCards::new(cards[0], cards[1]), &villain, &board)
        }
        _ => equity_range_vs_range(&Range::parse(hero)?, &villain, &board),
    };
    println!("Equity: {}", format!("{:.1}%", equity * 100.0).green().bold());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn solve_command(
    board: &str,
    hero_range: &str,
    villain_range: &str,
    hero: &str,
    bet_size: f64,
    stack_size: f64,
    pot: f64,
    iterations: usize,
    json: bool,
    cached: bool,
) -> SolverResult<()> {
    let board_cards = parse_board(board)?;
    let hero: Player = hero.parse()?;
    let hero_range = Range::parse(hero_range)?;
    let villain_range = Range::parse(villain_range)?;

    let board_key: String = board_cards.iter().map(Card::to_string).collect();
    let from_cache =
        if cached { Solution::load_cache(&board_key, hero.as_str()) } else { None };
    let solution = match from_cache {
        Some(solution) => solution,
        None => {
            let mut solver = Solver::new(
                board_cards,
                &hero_range,
                &villain_range,
                hero,
                bet_size,
                stack_size,
                pot,
            );
            let opts = MinimizeOptions { max_iterations: iterations, ..Default::default() };
            let solution = solver.solve(&opts);
            if cached {
                solution.save_cache();
            }
            solution
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&solution).expect("solution serializes"));
    } else {
        solution.display();
    }
    Ok(())
}

fn bench_command(num_hands: usize) {
    let mut rng = rand::thread_rng();
    let hands: Vec<Vec<Card>> = (0..num_hands)
        .map(|_| DECK.choose_multiple(&mut rng, 7).copied().collect())
        .collect();

    let start = Instant::now();
    for hand in &hands {
        std::hint::black_box(evaluate(hand).expect("seven sampled cards"));
    }
    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "Evaluated {} hands in {:.3}s ({} evals/sec)",
        num_hands,
        elapsed,
        format!("{:.0}", num_hands as f64 / elapsed).bold(),
    );
}
