use std::time::Instant;

use log::info;

use cluster_routes_core::{
    PlannerInput, PlannerOptions, Result, logging, open_output, plan_routes, write_routes,
    write_visits,
};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = PlannerOptions::from_args()?;
    logging::init_logger(&options)?;
    let input = PlannerInput::read(options.input_path())?;

    info!("input: {input}");
    info!("options: {options}");

    let plan = plan_routes(input.points(), &options)?;

    let mut visits_out = open_output(options.output_path())?;
    write_visits(&mut visits_out, &plan)?;

    if let Some(routes_path) = options.routes_output_path() {
        let mut routes_out = open_output(Some(routes_path))?;
        write_routes(&mut routes_out, &plan)?;
    }

    info!(
        "output: n={} groups={} routes generated={} time={:.2}s",
        input.n(),
        plan.group_count(),
        plan.routes_generated(),
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
