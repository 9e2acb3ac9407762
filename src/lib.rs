use anyhow::Result;
use clap::error::{ContextKind, ErrorKind};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};

mod error;

pub use error::PwError;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;
pub const DEFAULT_LENGTH: usize = 12;

const EXAMPLES: &str = "\
Examples:
  pwgen                 Generate 12-character password (default)
  pwgen -l 16           Generate 16-character password
  pwgen -s              Generate password with symbols
  pwgen -l 20 -s        Generate 20-character password with symbols";

#[derive(Parser, Debug)]
#[command(
    name = "pwgen",
    about = "Password Generator",
    args_override_self = true,
    after_help = EXAMPLES
)]
pub struct Args {
    /// set password length (default: 12, range: 4-128)
    #[arg(
        short,
        long,
        value_name = "num",
        default_value_t = DEFAULT_LENGTH,
        value_parser = parse_length,
        allow_negative_numbers = true
    )]
    length: usize,

    /// include special symbols in password
    #[arg(short, long)]
    symbols: bool,

    /// exclude lowercase letters
    #[arg(long = "no-lowercase")]
    no_lowercase: bool,

    /// exclude uppercase letters
    #[arg(long = "no-uppercase")]
    no_uppercase: bool,

    /// exclude digits
    #[arg(long = "no-digits")]
    no_digits: bool,

    /// print debug diagnostics to stderr
    #[arg(long)]
    debug: bool,
}

fn parse_length(s: &str) -> Result<usize, String> {
    let length: i64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if length < MIN_LENGTH as i64 || length > MAX_LENGTH as i64 {
        return Err(format!(
            "password length must be between {MIN_LENGTH} and {MAX_LENGTH}"
        ));
    }
    Ok(length as usize)
}

/// Usage line printed after argument errors.
pub fn usage() -> String {
    format!(
        "{}\n\nFor more information, try '--help'.\n",
        Args::command().render_usage()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lowercase,
    Uppercase,
    Digits,
    Symbols,
}

impl Category {
    /// Assembly order of the effective character set.
    pub const ALL: [Category; 4] = [
        Category::Lowercase,
        Category::Uppercase,
        Category::Digits,
        Category::Symbols,
    ];

    pub fn alphabet(self) -> &'static str {
        match self {
            Category::Lowercase => LOWERCASE,
            Category::Uppercase => UPPERCASE,
            Category::Digits => DIGITS,
            Category::Symbols => SYMBOLS,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Lowercase => "lowercase",
                Category::Uppercase => "uppercase",
                Category::Digits => "digits",
                Category::Symbols => "symbols",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub length: usize,
    pub include_lowercase: bool,
    pub include_uppercase: bool,
    pub include_digits: bool,
    pub include_symbols: bool,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            length: DEFAULT_LENGTH,
            include_lowercase: true,
            include_uppercase: true,
            include_digits: true,
            include_symbols: false,
            debug: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            length: args.length,
            include_lowercase: !args.no_lowercase,
            include_uppercase: !args.no_uppercase,
            include_digits: !args.no_digits,
            include_symbols: args.symbols,
            debug: args.debug,
        }
    }
}

impl Config {
    pub fn includes(&self, category: Category) -> bool {
        match category {
            Category::Lowercase => self.include_lowercase,
            Category::Uppercase => self.include_uppercase,
            Category::Digits => self.include_digits,
            Category::Symbols => self.include_symbols,
        }
    }
}

/// Outcome of reading the command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    /// `-h`/`--help` was seen; holds the rendered help text
    Help(String),
    Generate(Config),
}

impl Invocation {
    /// Parses a full argument list, program name first.
    ///
    /// Arguments are scanned left to right and the first problem wins, so
    /// `--help --bogus` shows help while `--bogus --help` is an error.
    /// A bare `--` is an unknown option too, not an end-of-options marker.
    pub fn parse_from<I, T>(args: I) -> Result<Self, PwError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        // clap would swallow `--`, so only hand it what comes before one
        let terminator = args.iter().skip(1).position(|a| a == "--").map(|i| i + 1);
        let end = terminator.unwrap_or(args.len());
        match Args::try_parse_from(args[..end].iter()) {
            Ok(_) if terminator.is_some() => Err(PwError::UnknownOption("--".to_string())),
            Ok(args) => Ok(Invocation::Generate(Config::from(args))),
            Err(e) if e.kind() == ErrorKind::DisplayHelp => Ok(Invocation::Help(
                Args::command().render_help().to_string(),
            )),
            Err(e) => Err(classify(&e)),
        }
    }
}

fn classify(e: &clap::Error) -> PwError {
    let context = |kind| {
        e.get(kind)
            .map(ToString::to_string)
            .unwrap_or_default()
    };
    match e.kind() {
        ErrorKind::InvalidValue if context(ContextKind::InvalidValue).is_empty() => {
            PwError::MissingOptionValue(context(ContextKind::InvalidArg))
        }
        ErrorKind::TooFewValues => PwError::MissingOptionValue(context(ContextKind::InvalidArg)),
        ErrorKind::InvalidValue | ErrorKind::ValueValidation => {
            PwError::InvalidLength(context(ContextKind::InvalidValue))
        }
        _ => {
            let arg = context(ContextKind::InvalidArg);
            if arg.is_empty() {
                // no argument recorded, fall back to clap's own first line
                let rendered = e.render().to_string();
                let line = rendered.lines().next().unwrap_or_default();
                PwError::UnknownOption(line.trim_start_matches("error: ").to_string())
            } else {
                PwError::UnknownOption(arg)
            }
        }
    }
}

/// The effective alphabet: enabled category alphabets concatenated in
/// [`Category::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    chars: String,
    categories: Vec<Category>,
}

impl Charset {
    pub fn assemble(config: &Config) -> Result<Self, PwError> {
        let mut chars = String::new();
        let mut categories = Vec::new();
        for category in Category::ALL {
            if config.includes(category) {
                chars.push_str(category.alphabet());
                categories.push(category);
            }
        }
        if chars.is_empty() {
            return Err(PwError::EmptyCharset);
        }
        Ok(Charset { chars, categories })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(c)
    }
}

/// Draws `length` characters uniformly, with replacement, from `charset`.
///
/// A [`Charset`] only comes out of [`Charset::assemble`], so it is never empty.
pub fn generate_password<R: Rng + ?Sized>(
    charset: &Charset,
    length: usize,
    rng: &mut R,
) -> Result<String, PwError> {
    // every alphabet is ascii, so bytes and chars line up
    let alphabet = charset.as_str().as_bytes();
    let mut password = String::new();
    password
        .try_reserve_exact(length)
        .map_err(|_| PwError::AllocationFailure(length))?;
    for _ in 0..length {
        let index = rng.gen_range(0..alphabet.len());
        password.push(alphabet[index] as char);
    }
    Ok(password)
}

#[derive(Debug)]
pub struct Report {
    pub password: String,
    pub charset: Charset,
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self
            .charset
            .categories()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "Generated password: {}", self.password)?;
        writeln!(f, "Password length: {}", self.password.len())?;
        writeln!(f, "Character set size: {}", self.charset.len())?;
        writeln!(f, "Character sets used: {used}")
    }
}

/// Assembles the charset for `config` and generates one password with `rng`.
pub fn generate<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<Report, PwError> {
    let charset = Charset::assemble(config)?;
    debug!(
        "charset assembled: {} characters from {:?}",
        charset.len(),
        charset.categories()
    );
    let password = generate_password(&charset, config.length, rng)?;
    info!("generated a {} character password", password.len());
    Ok(Report { password, charset })
}

pub fn run(config: &Config) -> Result<()> {
    debug!("running with {:?}", config);
    let mut rng = StdRng::from_entropy();
    let report = generate(config, &mut rng)?;
    let mut out = io::stdout().lock();
    write!(out, "{report}")?;
    out.flush()?;
    Ok(())
}
