use site_address_plan::build_report;
use site_address_plan::config::{load_design, OutputFormat, Settings};
use site_address_plan::output::{plan_csv, print_report};
use site_address_plan::session::PlanSlot;
use site_address_plan::solver::{HttpVlsmSolver, OfflineSolver, VlsmSolver};
use std::error::Error;

fn init_logging() {
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        use log4rs::append::console::{ConsoleAppender, Target};
        use log4rs::config::{Appender, Config, Root};

        let stderr = ConsoleAppender::builder().target(Target::Stderr).build();
        let config = Config::builder()
            .appender(Appender::builder().build("stderr", Box::new(stderr)))
            .build(Root::builder().appender("stderr").build(log::LevelFilter::Info));
        match config.map(log4rs::init_config) {
            Ok(Ok(_)) => log::warn!("log4rs.yml not loaded ({e}), logging to stderr"),
            Ok(Err(e2)) => eprintln!("log4rs.yml not loaded ({e}), fallback logger failed: {e2}"),
            Err(e2) => eprintln!("log4rs.yml not loaded ({e}), fallback config invalid: {e2}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    init_logging();
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = Settings::from_env(&args)?;
    let design = load_design(&settings.design_file)?;

    let solver: Box<dyn VlsmSolver> = match &settings.solver_url {
        Some(url) => {
            log::info!("Using VLSM solver at {url}");
            Box::new(HttpVlsmSolver::new(url, settings.solver_timeout)?)
        }
        None => Box::new(OfflineSolver),
    };

    let slot = PlanSlot::new();
    let ticket = slot.begin();
    let report = build_report(&design, solver.as_ref(), None).await?;
    slot.commit(ticket, report.plan.clone());

    match settings.output {
        OutputFormat::Terminal => print_report(&report),
        OutputFormat::Csv => print!("{}", plan_csv(&report.plan, &report.tunnels.entries)),
    }

    log::info!("#End main()");
    Ok(())
}
