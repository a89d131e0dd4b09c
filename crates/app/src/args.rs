use std::fmt;
use std::path::PathBuf;

use drill_core::catalog::{self, CatalogError, NumberRange, PokerLevel, PotOddsDomain, PotOddsSelection, Street};
use drill_core::eval::Operator;
use drill_core::model::{FuguesSpeed, Mode, ModeError, ModeSet};

pub const DEFAULT_DB_URL: &str = "sqlite://numa.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSpeed { raw: String },
    InvalidOuts { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    Mode(ModeError),
    Catalog(CatalogError),
    ConflictingModes,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSpeed { raw } => write!(f, "invalid --speed value: {raw} (expected 1H..6H)"),
            ArgsError::InvalidOuts { raw } => write!(f, "invalid --outs value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::Mode(err) => write!(f, "{err}"),
            ArgsError::Catalog(err) => write!(f, "{err}"),
            ArgsError::ConflictingModes => write!(f, "Random and Surges cannot be combined"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ModeError> for ArgsError {
    fn from(err: ModeError) -> Self {
        ArgsError::Mode(err)
    }
}

impl From<CatalogError> for ArgsError {
    fn from(err: CatalogError) -> Self {
        ArgsError::Catalog(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidNumber {
        flag,
        raw: raw.to_string(),
    })
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Parsed command line.
#[derive(Debug)]
pub struct Args {
    pub db_url: String,
    pub modes: ModeSet,
    /// Set only when the user asked for a tier; it is then remembered.
    pub speed: Option<FuguesSpeed>,
    pub numbers: Vec<u32>,
    pub range: NumberRange,
    pub levels: Vec<PokerLevel>,
    pub ops: Vec<Operator>,
    pub items_file: Option<PathBuf>,
    pub pot_odds_file: Option<PathBuf>,
    pub pot_odds: PotOddsSelection,
    pub help: bool,
}

impl Args {
    /// Parse flags, falling back to `env` for the database, modes and speed.
    pub fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("NUMA_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut modes = match env("NUMA_MODES") {
            Some(raw) => ModeSet::parse_list(&raw)?,
            None => ModeSet::empty(),
        };
        let mut speed = env("NUMA_SPEED").map(|raw| parse_speed(&raw)).transpose()?;
        let mut numbers = Vec::new();
        let defaults = NumberRange::default();
        let (mut start, mut end, mut chain) = (defaults.start(), defaults.end(), defaults.chain());
        let mut levels = Vec::new();
        let mut ops = Vec::new();
        let mut items_file = None;
        let mut pot_odds_file = None;
        let mut pot_odds = PotOddsSelection::new();
        let mut help = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--modes" => modes = ModeSet::parse_list(&require_value(args, "--modes")?)?,
                "--speed" => speed = Some(parse_speed(&require_value(args, "--speed")?)?),
                "--numbers" => {
                    let value = require_value(args, "--numbers")?;
                    numbers = split_list(&value)
                        .map(|part| parse_number::<u32>(part, "--numbers"))
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "--ini" => start = parse_number(&require_value(args, "--ini")?, "--ini")?,
                "--end" => end = parse_number(&require_value(args, "--end")?, "--end")?,
                "--chain" => chain = parse_number(&require_value(args, "--chain")?, "--chain")?,
                "--levels" => {
                    let value = require_value(args, "--levels")?;
                    levels = split_list(&value)
                        .map(str::parse::<PokerLevel>)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "--ops" => {
                    let value = require_value(args, "--ops")?;
                    ops = split_list(&value)
                        .map(catalog::parse_operator)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "--items" => items_file = Some(PathBuf::from(require_value(args, "--items")?)),
                "--pot-odds" => {
                    pot_odds_file = Some(PathBuf::from(require_value(args, "--pot-odds")?));
                }
                "--outs" => {
                    let value = require_value(args, "--outs")?;
                    for part in split_list(&value) {
                        let outs: u8 = part
                            .parse()
                            .map_err(|_| ArgsError::InvalidOuts { raw: part.to_string() })?;
                        pot_odds.add_outs_bucket(outs)?;
                    }
                }
                "--streets" => {
                    let value = require_value(args, "--streets")?;
                    for part in split_list(&value) {
                        pot_odds.streets.insert(part.parse::<Street>()?);
                    }
                }
                "--domains" => {
                    let value = require_value(args, "--domains")?;
                    for part in split_list(&value) {
                        pot_odds.domains.insert(part.parse::<PotOddsDomain>()?);
                    }
                }
                "--conversions" => pot_odds.conversions = true,
                "--help" | "-h" => help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        catalog::check_numbers(&numbers)?;
        let range = NumberRange::new(start, end, chain);
        modes = range.constrain_modes(modes);
        if modes.contains(Mode::Random) && modes.contains(Mode::Surges) {
            return Err(ArgsError::ConflictingModes);
        }
        if ops.is_empty() {
            ops = Operator::ALL.to_vec();
        }

        Ok(Self {
            db_url,
            modes,
            speed,
            numbers,
            range,
            levels,
            ops,
            items_file,
            pot_odds_file,
            pot_odds,
            help,
        })
    }
}

fn parse_speed(raw: &str) -> Result<FuguesSpeed, ArgsError> {
    let raw = raw.trim();
    FuguesSpeed::ALL
        .into_iter()
        .find(|speed| speed.id().eq_ignore_ascii_case(raw))
        .ok_or_else(|| ArgsError::InvalidSpeed { raw: raw.to_string() })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  numa [--db <sqlite_url>] [--modes <list>] [--speed <1H..6H>]");
    eprintln!("       [--numbers <list>] [--ini <n>] [--end <n>] [--chain <n>]");
    eprintln!("       [--levels <list>] [--ops <list>] [--items <file.json>]");
    eprintln!("       [--pot-odds <file.json>] [--outs <list>] [--streets <list>]");
    eprintln!("       [--domains <list>] [--conversions]");
    eprintln!();
    eprintln!("Modes:   Random, Mirror, Surges, Fugues (or RND, MRR, SRG, FGS)");
    eprintln!("Numbers: picks from 1..100, each paired with INI..END partners");
    eprintln!("Chain:   operands per expression; 3 or more forces Random and drops Surges");
    eprintln!("Levels:  Basic, Med, High, Advance (or 1..4)");
    eprintln!("Ops:     + - × ÷ (also * and /)");
    eprintln!("Outs:    1, 6, 11, 16 select the 1–5, 6–10, 11–15, 16–20 buckets");
    eprintln!("Streets: flop_turn, turn_river, flop_river");
    eprintln!("Domains: raw_percent, raw_odds");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --ops all four operators");
    eprintln!("  --ini 1 --end 10 --chain 2");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  NUMA_DB_URL, NUMA_MODES, NUMA_SPEED, RUST_LOG");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = argv.iter().map(ToString::to_string);
        Args::parse(&mut iter, |_| None)
    }

    #[test]
    fn defaults_select_every_operator() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert!(args.modes.is_empty());
        assert_eq!(args.ops, Operator::ALL.to_vec());
        assert_eq!(args.speed, None);
    }

    #[test]
    fn parses_modes_levels_and_pot_odds_filters() {
        let args = parse(&[
            "--modes", "MRR,Fugues", "--speed", "4h", "--levels", "1,High", "--ops", "*,÷",
            "--outs", "7", "--streets", "flop_river", "--domains", "raw_odds", "--conversions",
        ])
        .unwrap();
        assert!(args.modes.contains(Mode::Mirror));
        assert!(args.modes.contains(Mode::Fugues));
        assert_eq!(args.speed, Some(FuguesSpeed::H4));
        assert_eq!(args.levels, vec![PokerLevel::Basic, PokerLevel::High]);
        assert_eq!(args.ops, vec![Operator::Mul, Operator::Div]);
        assert_eq!(args.pot_odds.outs, (6..=10).collect());
        assert!(args.pot_odds.streets.contains(&Street::FlopRiver));
        assert!(args.pot_odds.conversions);
    }

    #[test]
    fn rejects_random_with_surges() {
        assert!(matches!(
            parse(&["--modes", "Random,Surges"]),
            Err(ArgsError::ConflictingModes)
        ));
    }

    #[test]
    fn long_chain_forces_random_over_surges() {
        let args = parse(&["--modes", "Surges,Mirror", "--numbers", "7,12", "--chain", "3"]).unwrap();
        assert!(args.modes.contains(Mode::Random));
        assert!(args.modes.contains(Mode::Mirror));
        assert!(!args.modes.contains(Mode::Surges));
        assert_eq!(args.numbers, vec![7, 12]);
        assert_eq!(args.range, NumberRange::new(1, 10, 3));

        let args = parse(&["--modes", "Surges", "--chain", "2"]).unwrap();
        assert!(args.modes.contains(Mode::Surges));
        assert!(!args.modes.contains(Mode::Random));
    }

    #[test]
    fn number_range_flags_are_clamped() {
        let args = parse(&["--ini", "8", "--end", "5", "--chain", "1"]).unwrap();
        assert_eq!(args.range, NumberRange::new(5, 5, 2));
        assert!(matches!(
            parse(&["--numbers", "3,abc"]),
            Err(ArgsError::InvalidNumber { flag: "--numbers", .. })
        ));
        assert!(matches!(parse(&["--numbers", "101"]), Err(ArgsError::Catalog(_))));
    }

    #[test]
    fn env_supplies_fallbacks() {
        let mut iter = std::iter::empty();
        let args = Args::parse(&mut iter, |key| match key {
            "NUMA_MODES" => Some("Mirrow".into()),
            "NUMA_SPEED" => Some("2H".into()),
            "NUMA_DB_URL" => Some("sqlite::memory:".into()),
            _ => None,
        })
        .unwrap();
        assert!(args.modes.contains(Mode::Mirror));
        assert_eq!(args.speed, Some(FuguesSpeed::H2));
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn missing_value_is_reported() {
        assert!(matches!(
            parse(&["--speed"]),
            Err(ArgsError::MissingValue { flag: "--speed" })
        ));
        assert!(matches!(parse(&["--speed", "7H"]), Err(ArgsError::InvalidSpeed { .. })));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/numa.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/numa.db"));
    }
}
