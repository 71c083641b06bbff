/// Strategy comparison tool
///
/// Runs every search strategy over seeded random street grids and writes an
/// org-mode report, `logs/compare.org` by default.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anstream::println;
use clap::Parser;
use hrsw::Stopwatch;
use human_duration::human_duration;
use indoc::indoc;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use thousands::Separable;
use tracing_subscriber::EnvFilter;

use route_search::algorithms::BreadthFirstSearch;
use route_search::algorithms::GreedySearch;
use route_search::algorithms::SearchConfig;
use route_search::algorithms::SearchRun;
use route_search::algorithms::UniformCostSearch;
use route_search::cost::TravelCost;
use route_search::map::StreetMap;
use route_search::maps::grid::GridMap;
use route_search::maps::grid::GridSpec;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Runs slower than this get a warning.
const SLOW_RUN: Duration = Duration::from_secs(1);

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = route_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        env = "ROUTE_SEARCH_REPORT",
        default_value = "logs/compare.org"
    )]
    pub output: PathBuf,

    #[arg(long, default_value_t = 10u64)]
    pub num_instances: u64,
    #[arg(long, default_value_t = 20usize)]
    pub rows: usize,
    #[arg(long, default_value_t = 20usize)]
    pub cols: usize,
    #[arg(long, default_value_t = 0.1f64)]
    pub one_way_probability: f64,

    #[arg(long, default_value_t = 1000u32)]
    pub depth_limit: u32,

    /// Also search without duplicate checking.
    #[arg(long)]
    pub also_unchecked: bool,
    /// Depth limit for searches without duplicate checking, which grow
    /// exponentially with depth.
    #[arg(long, default_value_t = 8u32)]
    pub unchecked_depth_limit: u32,

    /// Log filter directives, like `warn` or `route_search=trace`.
    #[arg(long, env = "ROUTE_SEARCH_LOG", default_value = "warn")]
    pub log: String,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

/// Sends the crate's `log` records to stderr, filtered by `directives`.
fn init_logging(directives: &str) -> std::io::Result<()> {
    let filter = EnvFilter::try_new(directives).map_err(std::io::Error::other)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(anstream::stderr)
        .try_init()
        .map_err(std::io::Error::other)
}

/// Aggregates over every run of one strategy and policy.
#[derive(Debug, Default)]
struct Tally {
    runs: u64,
    solved: u64,
    expansions: usize,
    cost: TravelCost,
    elapsed: Duration,
}

fn write_header<W: Write>(out: &mut W, args: &Args) -> std::io::Result<()> {
    writeln!(out, ":PROPERTIES:")?;
    writeln!(out, ":VERSION: {:?}", route_search::build::PKG_VERSION)?;
    writeln!(out, ":GIT_BRANCH: {:?}", shadow_rs::branch())?;
    writeln!(out, ":BUILD_IS_DEBUG: {}", shadow_rs::is_debug())?;
    if route_search::build::GIT_CLEAN {
        writeln!(out, ":GIT_STATUS: CLEAN")?;
    } else {
        writeln!(out, ":GIT_STATUS: DIRTY")?;
    }
    writeln!(out, ":DATE: {}", chrono::Local::now().to_rfc3339())?;
    writeln!(out, ":END:")?;
    write!(
        out,
        indoc! {"
            #+title: Route search comparison

            Each instance is a random street grid and a random pair of
            intersections on it. Every strategy searches the same instance.

        "}
    )?;
    writeln!(out, "- Grid: {}x{}", args.rows, args.cols)?;
    writeln!(out, "- One-way probability: {}", args.one_way_probability)?;
    writeln!(out, "- Depth limit: {}", args.depth_limit)?;
    if args.also_unchecked {
        writeln!(
            out,
            "- Depth limit without duplicate checking: {}",
            args.unchecked_depth_limit
        )?;
    }
    writeln!(out)
}

/// Times a search and writes its section of the report.
fn report_run<W: Write>(
    out: &mut W,
    map: &StreetMap,
    tallies: &mut BTreeMap<String, Tally>,
    search: impl FnOnce() -> SearchRun,
) -> std::io::Result<()> {
    let mut stopwatch = Stopwatch::new_started();
    let run = search();
    stopwatch.stop();
    let elapsed = stopwatch.elapsed();

    let label = format!("{} ({})", run.strategy(), run.policy());
    if elapsed > SLOW_RUN {
        log::warn!("{label} took {}", human_duration(&elapsed));
    }

    writeln!(out, "** {label}")?;
    match run.route() {
        Some(route) => writeln!(out, "- {}", route.display(map))?,
        None => writeln!(out, "- No route, {}", run.outcome())?,
    }
    writeln!(out, "- Time: {}", human_duration(&elapsed))?;
    writeln!(out, "#+begin_src text")?;
    run.write_stats(&mut *out)?;
    writeln!(out, "#+end_src")?;

    let tally = tallies.entry(label).or_default();
    tally.runs += 1;
    tally.expansions += run.expansion_count();
    tally.elapsed += elapsed;
    if let Some(goal) = run.goal() {
        tally.solved += 1;
        tally.cost += goal.path_cost();
    }
    Ok(())
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    args.color.write_global();
    init_logging(&args.log)?;
    println!("Logging to {:?}", args.output.yellow());

    if let Some(dir) = args.output.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let file = File::create(&args.output)?;
    let mut out = BufWriter::new(file);
    write_header(&mut out, &args)?;

    let spec = GridSpec::new(args.rows, args.cols)
        .with_one_way_probability(args.one_way_probability);
    let checked = SearchConfig::default().with_depth_limit(args.depth_limit);
    let unchecked = SearchConfig::default().with_depth_limit(args.unchecked_depth_limit);

    let mut tallies = BTreeMap::<String, Tally>::new();
    for instance in 0..args.num_instances {
        let mut rng = ChaCha8Rng::seed_from_u64(instance);
        let map = match GridMap::generate(&spec, &mut rng) {
            Ok(map) => map,
            Err(e) => {
                writeln!(out, "FIXME Failed to generate a map with seed {instance}: {e}")?;
                continue;
            }
        };
        let Some((initial, destination)) = GridMap::random_endpoints(&spec, &mut rng) else {
            writeln!(out, "FIXME {map} is too small to pick two intersections")?;
            continue;
        };
        writeln!(out, "* Instance {instance}: ~{initial}~ to ~{destination}~")?;
        writeln!(out, "- {map}")?;

        let mut runs = vec![(true, checked)];
        if args.also_unchecked {
            runs.push((false, unchecked));
        }
        for (duplicate_checking, config) in runs {
            let bfs = BreadthFirstSearch::new(&map, &initial, &destination, config)
                .map_err(std::io::Error::other)?;
            report_run(&mut out, &map, &mut tallies, || bfs.search(duplicate_checking))?;

            match GreedySearch::new(&map, &initial, &destination, config) {
                Ok(greedy) => {
                    report_run(&mut out, &map, &mut tallies, || {
                        greedy.search(duplicate_checking)
                    })?;
                }
                Err(e) => {
                    log::warn!("Skipping greedy search on instance {instance}: {e}");
                    writeln!(out, "** greedy\n- Skipped, {e}")?;
                }
            }

            let ucs = UniformCostSearch::new(&map, &initial, &destination, config)
                .map_err(std::io::Error::other)?;
            report_run(&mut out, &map, &mut tallies, || ucs.search(duplicate_checking))?;
        }
    }
    out.flush()?;

    println!("{}", "Summary".bold());
    for (label, tally) in &tallies {
        let mean_cost = if tally.solved > 0 {
            format!("${:.3}", tally.cost.as_f64() / tally.solved as f64)
        } else {
            "-".to_string()
        };
        println!(
            "  {:36} solved {}/{}, {} expansions, mean cost {}, {}",
            label.cyan(),
            tally.solved.green(),
            tally.runs,
            tally.expansions.separate_with_commas().yellow(),
            mean_cost,
            human_duration(&tally.elapsed).dimmed(),
        );
    }

    Ok(())
}
