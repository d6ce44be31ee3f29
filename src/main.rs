/* ------------------------------------------------------------------ */
/* namelang: which language does a surname come from?                 */
/* ------------------------------------------------------------------ */
//
// Trains a hand-rolled Elman RNN and/or a gated LSTM on per-language
// name lists (data/names/<Language>.txt, one name per line), then
// reports a loss curve, a confusion matrix, and top-k guesses for
// probe names. Optionally serves predictions over HTTP.

mod alphabet;
mod backward;
mod config;
mod corpus;
mod eval;
mod forward;
mod model;
mod ops;
mod optimizer;
mod report;
mod rng;
mod serve;
mod train;

use std::path::Path;
use std::process;

use crate::config::*;
use crate::corpus::Corpus;
use crate::eval::{confusion_matrix, predict_topk, Scorer};
use crate::model::{LstmClassifier, RnnClassifier};
use crate::report::{render_confusion, render_loss_history};
use crate::rng::Rng;
use crate::train::{train_lstm, train_rnn};

const DEMO_PROBES: [&str; 3] = ["Yuan", "Jackson", "Satoshi"];

#[derive(Clone, Copy, PartialEq)]
enum ModelChoice {
    Rnn,
    Lstm,
    Both,
}

struct Args {
    data_dir: String,
    model: ModelChoice,
    iters: usize,
    seed: u64,
    confusion: usize,
    top_k: usize,
    probes: Vec<String>,
    serve_addr: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            model: ModelChoice::Both,
            iters: N_ITERS,
            seed: DEFAULT_SEED,
            confusion: N_CONFUSION,
            top_k: TOP_K,
            probes: Vec::new(),
            serve_addr: None,
        }
    }
}

fn usage() -> &'static str {
    "Usage: namelang [OPTIONS]\n\
     \n\
     Options:\n\
     \x20 --data DIR        corpus directory of <Language>.txt files (default: data/names)\n\
     \x20 --model MODEL     rnn, lstm, or both (default: both)\n\
     \x20 --iters N         training iterations per model (default: 100000)\n\
     \x20 --seed N          RNG seed (default: 1337)\n\
     \x20 --confusion N     confusion-matrix trials, 0 to skip (default: 10000)\n\
     \x20 --top K           predictions per probe name (default: 3)\n\
     \x20 --predict NAME    probe name, repeatable (default: Yuan, Jackson, Satoshi)\n\
     \x20 --serve ADDR      after training, serve predictions on ADDR (e.g. 127.0.0.1:8080)\n\
     \x20 -h, --help        show this help"
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);

    while let Some(arg) = it.next() {
        let mut value = |flag: &str| {
            it.next().ok_or_else(|| format!("{} requires a value", flag))
        };
        match arg.as_str() {
            "--data" => args.data_dir = value("--data")?,
            "--model" => {
                args.model = match value("--model")?.as_str() {
                    "rnn" => ModelChoice::Rnn,
                    "lstm" => ModelChoice::Lstm,
                    "both" => ModelChoice::Both,
                    other => return Err(format!("unknown model {:?}", other)),
                }
            }
            "--iters" => {
                args.iters = value("--iters")?
                    .parse()
                    .map_err(|_| "--iters expects an integer".to_string())?
            }
            "--seed" => {
                args.seed = value("--seed")?
                    .parse()
                    .map_err(|_| "--seed expects an integer".to_string())?
            }
            "--confusion" => {
                args.confusion = value("--confusion")?
                    .parse()
                    .map_err(|_| "--confusion expects an integer".to_string())?
            }
            "--top" => {
                args.top_k = value("--top")?
                    .parse()
                    .map_err(|_| "--top expects an integer".to_string())?
            }
            "--predict" => args.probes.push(value("--predict")?),
            "--serve" => args.serve_addr = Some(value("--serve")?),
            "-h" | "--help" => {
                println!("{}", usage());
                process::exit(0);
            }
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(args)
}

fn evaluate_and_report<S: Scorer + Sync>(model: &S, corpus: &Corpus, args: &Args) {
    if args.confusion > 0 {
        println!();
        println!("Building confusion matrix ({} trials)...", args.confusion);
        let matrix = confusion_matrix(model, corpus, args.confusion, args.seed);
        println!("{}", render_confusion(&matrix, corpus.categories()));
    }

    let probes: Vec<&str> = if args.probes.is_empty() {
        DEMO_PROBES.to_vec()
    } else {
        args.probes.iter().map(String::as_str).collect()
    };
    for probe in probes {
        println!();
        println!("> {}", probe);
        match predict_topk(model, corpus, probe, args.top_k) {
            Ok(predictions) => {
                for (score, category) in predictions {
                    println!("({:.2}) {}", score, category);
                }
            }
            Err(e) => eprintln!("cannot score {:?}: {}", probe, e),
        }
    }
}

fn main() {
    let args = parse_args().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        eprintln!();
        eprintln!("{}", usage());
        process::exit(2);
    });

    println!("=== namelang: surname language classifier ===");
    println!(
        "Hidden units: {} | Learning rate: {} | Iterations: {}",
        N_HIDDEN, LEARNING_RATE, args.iters
    );

    let corpus = Corpus::load(Path::new(&args.data_dir)).unwrap_or_else(|e| {
        eprintln!("error: failed to load corpus from {}: {}", args.data_dir, e);
        process::exit(1);
    });
    println!(
        "Corpus: {} categories, {} names ({})",
        corpus.n_categories(),
        corpus.total_names(),
        args.data_dir
    );

    let mut rng = Rng::new(args.seed);
    let n_letters = alphabet::N_LETTERS;

    let mut rnn_model = None;
    let mut lstm_model = None;

    if args.model == ModelChoice::Rnn || args.model == ModelChoice::Both {
        println!();
        println!("=== Training RNN ===");
        let mut model = RnnClassifier::new(n_letters, N_HIDDEN, corpus.n_categories(), &mut rng);
        println!("Parameters: {}", model.n_params());
        let stats = train_rnn(&mut model, &corpus, args.iters, LEARNING_RATE, &mut rng);
        println!();
        println!("{}", render_loss_history(&stats.history));
        evaluate_and_report(&model, &corpus, &args);
        rnn_model = Some(model);
    }

    if args.model == ModelChoice::Lstm || args.model == ModelChoice::Both {
        println!();
        println!("=== Training LSTM ===");
        let mut model = LstmClassifier::new(n_letters, N_HIDDEN, corpus.n_categories(), &mut rng);
        println!("Parameters: {}", model.n_params());
        let stats = train_lstm(&mut model, &corpus, args.iters, LEARNING_RATE, &mut rng);
        println!();
        println!("{}", render_loss_history(&stats.history));
        evaluate_and_report(&model, &corpus, &args);
        lstm_model = Some(model);
    }

    if let Some(addr) = &args.serve_addr {
        println!();
        // With --model both the LSTM is the one served.
        if let Some(model) = &lstm_model {
            serve::run_server(addr, model, &corpus, "lstm");
        } else if let Some(model) = &rnn_model {
            serve::run_server(addr, model, &corpus, "rnn");
        }
    }
}
