use dotenv::dotenv;
use phasegrid::config::{PolicyKind, RunConfig};
use phasegrid::infra::DefaultObserver;
use phasegrid::policy::{GreedyPolicy, Policy, RandomPolicy};
use phasegrid::registry::ScenarioRegistry;
use phasegrid::runner::EpisodeRunner;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("phasegrid=info,warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging()?;

    let config = RunConfig::from_env()?;
    tracing::info!("Running {:?}", config);

    let registry = ScenarioRegistry::with_defaults();
    let mut env = registry.make(&config.scenario, config.seed)?;

    let mut policy: Box<dyn Policy> = match config.policy {
        PolicyKind::Random => Box::new(RandomPolicy::new(config.seed)),
        PolicyKind::Greedy => Box::new(GreedyPolicy::new()),
    };
    let mut observer = DefaultObserver::new(config.render);
    let mut runner = EpisodeRunner::new(config.max_steps);

    for episode in 0..config.episodes {
        runner.run_episode(
            env.as_mut(),
            policy.as_mut(),
            &mut observer,
            episode,
            &config.scenario,
        )?;
    }

    env.close();
    runner.metrics().log_summary();
    Ok(())
}
