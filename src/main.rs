use clap::Parser;
use rl_activity::activity::{tag_counts, to_json};
use rl_activity::algos::Algorithm;
use rl_activity::config::Config;
use rl_activity::envs::student::Student;
use rl_activity::mdps::mdp::{GraphMdp, Mdp};
use rl_activity::playback::{Playback, RenderContext};
use rl_activity::Error;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Run a control algorithm and print its activity log as JSON")]
struct Args {
    /// Control algorithm to run
    #[arg(long, short = 'a', value_enum, default_value_t = Algorithm::PolicyIteration)]
    algorithm: Algorithm,

    /// MDP description (JSON). Defaults to the student MDP
    #[arg(long)]
    mdp: Option<PathBuf>,

    /// Agent and control configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the log
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mdp: Rc<dyn Mdp> = match &args.mdp {
        Some(path) => Rc::new(GraphMdp::from_json_file(path)?),
        None => Rc::new(Student::mdp()?),
    };

    let log = args.algorithm.run(mdp, &config)?;

    let playback = Playback::new(&RenderContext::default(), &log);
    info!(
        entries = log.len(),
        frames = playback.total_frame_count(),
        "activity log ready"
    );
    for (tag, count) in tag_counts(&log) {
        debug!(tag, count, "activity");
    }

    println!("{}", to_json(&log, args.pretty)?);
    Ok(())
}
