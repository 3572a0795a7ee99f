use std::{env, fmt, path::Path};

use log::LevelFilter;

use crate::{
    Error, Result,
    algo::{
        assign::AssignOptions,
        common::{DEFAULT_MAX_ITER, DEFAULT_N_INIT, DEFAULT_SEED, DEFAULT_TOLERANCE},
    },
};

/// Runtime options for grouping and routing.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerOptions {
    /// Maximum points per group; determines the number of groups.
    pub max_per_group: usize,
    /// Base seed for k-means initialization.
    pub seed: u64,
    /// Number of k-means initializations; the lowest-inertia one is kept.
    pub n_init: usize,
    /// Iteration cap for a single k-means run.
    pub max_iter: usize,
    /// Relative centroid-shift tolerance for k-means convergence.
    pub tolerance: f64,
    /// Edge length multiple of the average edge counted as a spike in route metrics.
    pub spike_factor: f64,
    /// Run k-means trials and group ordering on the rayon pool.
    pub parallel: bool,
    /// Structured logging level.
    pub log_level: LogLevel,
    /// Logging output format.
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    pub log_output: String,
    /// Optional input file path for points. Empty means stdin.
    pub input: String,
    /// Optional output file path for per-point visits. Empty means stdout.
    pub output: String,
    /// Optional output file path for route lines. Empty means no route file.
    pub routes_output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "off" => Ok(Self::Off),
            _ => Err(Error::invalid_input(format!(
                "Invalid value for --log-level: {raw} (expected error|warn|info|debug|trace|off)"
            ))),
        }
    }

    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Off => "off",
        };
        write!(f, "{value}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::invalid_input(format!(
                "Invalid value for --log-format: {raw} (expected compact|pretty)"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compact => write!(f, "compact"),
            Self::Pretty => write!(f, "pretty"),
        }
    }
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            max_per_group: 400,
            seed: DEFAULT_SEED,
            n_init: DEFAULT_N_INIT,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            spike_factor: 10.0,
            parallel: true,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
            routes_output: String::new(),
        }
    }
}

impl fmt::Display for PlannerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n\tmax_per_group = {}\n\tseed          = {}\n\tn_init        = {}\n\tmax_iter      = {}\n\ttolerance     = {}\n\tspike_factor  = {}\n\tparallel      = {}\n\tlog_level     = {}\n\tlog_format    = {}\n\tinput         = {}\n\toutput        = {}\n\troutes_output = {}",
            self.max_per_group,
            self.seed,
            self.n_init,
            self.max_iter,
            self.tolerance,
            self.spike_factor,
            self.parallel,
            self.log_level,
            self.log_format,
            display_or_dash(&self.input),
            display_or_dash(&self.output),
            display_or_dash(&self.routes_output),
        )
    }
}

impl PlannerOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn assign_options(&self) -> AssignOptions {
        AssignOptions {
            seed: self.seed,
            n_init: self.n_init,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            parallel: self.parallel,
        }
    }

    pub(crate) fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = split_arg(raw_name, &mut args);

            if options.apply_cli_option(&name, value.clone())? {
                continue;
            }

            match name.as_str() {
                "parallel" => options.parallel = parse_flag(&name, value)?,
                "no-parallel" => options.parallel = parse_negated_flag(&name, value)?,
                "log-timestamp" => options.log_timestamp = parse_flag(&name, value)?,
                "no-log-timestamp" => options.log_timestamp = parse_negated_flag(&name, value)?,
                _ => {
                    return Err(Error::invalid_input(format!(
                        "Unknown option: --{name}\n\n{}",
                        Self::usage()
                    )));
                }
            }
        }

        Ok(options)
    }

    /// Applies a `--name value` option. Returns `false` for names it does not own.
    fn apply_cli_option(&mut self, name: &str, value: Option<String>) -> Result<bool> {
        let known = matches!(
            name,
            "max-per-group"
                | "seed"
                | "n-init"
                | "max-iter"
                | "tolerance"
                | "spike-factor"
                | "log-level"
                | "log-format"
                | "log-output"
                | "input"
                | "output"
                | "routes-output"
        );
        if !known {
            return Ok(false);
        }

        let raw =
            value.ok_or_else(|| Error::invalid_input(format!("Missing value for --{name}")))?;

        match name {
            "max-per-group" => self.max_per_group = parse_value(name, &raw)?,
            "seed" => self.seed = parse_value(name, &raw)?,
            "n-init" => self.n_init = parse_value(name, &raw)?,
            "max-iter" => self.max_iter = parse_value(name, &raw)?,
            "tolerance" => self.tolerance = parse_value(name, &raw)?,
            "spike-factor" => self.spike_factor = parse_value(name, &raw)?,
            "log-level" => self.log_level = LogLevel::parse(&raw)?,
            "log-format" => self.log_format = LogFormat::parse(&raw)?,
            "log-output" => self.log_output = raw,
            "input" => self.input = raw,
            "output" => self.output = raw,
            "routes-output" => self.routes_output = raw,
            _ => unreachable!("guarded by the known-option check"),
        }
        Ok(true)
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  cluster-routes [options] [--input points.txt]\n",
            "  cluster-routes [options] < points.txt\n\n",
            "Input is whitespace separated `id,x,y` or `x,y` tokens in a planar projection.\n\n",
            "Options:\n",
            "  --max-per-group <usize>\n",
            "  --seed <u64>\n",
            "  --n-init <usize>\n",
            "  --max-iter <usize>\n",
            "  --tolerance <f64>\n",
            "  --spike-factor <f64>\n",
            "  --parallel[=<bool>]\n",
            "  --no-parallel\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --input <path>\n",
            "  --output <path>\n",
            "  --routes-output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  cluster-routes --max-per-group 400 --output visits.csv < points.txt\n",
            "  cluster-routes --input points.txt --routes-output routes.wkt\n",
            "  cluster-routes --seed=7 --n-init=20 --log-level=info < points.txt\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        optional_path(&self.log_output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        optional_path(&self.input)
    }

    pub fn output_path(&self) -> Option<&Path> {
        optional_path(&self.output)
    }

    pub fn routes_output_path(&self) -> Option<&Path> {
        optional_path(&self.routes_output)
    }
}

fn split_arg(
    raw_name: &str,
    args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
) -> (String, Option<String>) {
    if let Some((k, v)) = raw_name.split_once('=') {
        return (k.to_string(), Some(v.to_string()));
    }

    let value = match args.peek() {
        Some(next) if !next.starts_with("--") => args.next(),
        _ => None,
    };

    (raw_name.to_string(), value)
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| Error::invalid_input(format!("Invalid value for --{name}: {raw} ({e})")))
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool> {
    match value {
        Some(v) => parse_bool(name, &v),
        None => Ok(true),
    }
}

fn parse_negated_flag(name: &str, value: Option<String>) -> Result<bool> {
    if value.is_some() {
        return Err(Error::invalid_input(format!(
            "Flag --{name} does not take a value"
        )));
    }
    Ok(false)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "off" | "OFF" => Ok(false),
        _ => Err(Error::invalid_input(format!(
            "Invalid boolean for --{name}: {value} (expected true/false)"
        ))),
    }
}

fn optional_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}

fn display_or_dash(raw: &str) -> &str {
    if raw.trim().is_empty() { "-" } else { raw }
}
