//! These structs provide the CLI interface for the billed CLI.

use crate::config::DEFAULT_API_URL;
use crate::model::BillForm;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// billed: list your expense reports and submit new ones.
///
/// Bills are sent to the Billed API configured with `billed init`. Each bill needs a justification
/// in jpg, jpeg or png format.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the session of the employee.
    Init(InitArgs),
    /// List your bills, most recent first.
    Bills,
    /// Upload a justification and submit a new bill.
    NewBill(NewBillArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where billed configuration and session are held. Defaults to ~/billed
    #[arg(long, env = "BILLED_HOME", default_value_t = default_billed_home())]
    billed_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, billed_home: PathBuf) -> Self {
        Self {
            log_level,
            billed_home: billed_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn billed_home(&self) -> &DisplayPath {
        &self.billed_home
    }
}

/// Args for the `billed init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the Billed API.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// The email of the employee the bills belong to.
    #[arg(long)]
    email: String,

    /// The kind of user.
    #[arg(long, default_value = "Employee")]
    user_type: String,

    /// A bearer token for the API, if it requires one.
    #[arg(long)]
    jwt: Option<String>,
}

impl InitArgs {
    pub fn new(
        api_url: impl Into<String>,
        email: impl Into<String>,
        user_type: impl Into<String>,
        jwt: Option<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            email: email.into(),
            user_type: user_type.into(),
            jwt,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }
}

/// Args for the `billed new-bill` command.
#[derive(Debug, Parser, Clone)]
pub struct NewBillArgs {
    /// The justification: a jpg, jpeg or png file.
    #[arg(long)]
    file: PathBuf,

    /// The kind of expense, e.g. "Transports" or "Hôtel et logement".
    #[arg(long = "type")]
    expense_type: String,

    /// A short description.
    #[arg(long)]
    name: String,

    /// The date of the expense, YYYY-MM-DD.
    #[arg(long)]
    date: String,

    /// The amount, including VAT.
    #[arg(long)]
    amount: i64,

    /// The VAT amount.
    #[arg(long)]
    vat: Option<i64>,

    /// The VAT percentage. Defaults to 20.
    #[arg(long)]
    pct: Option<i64>,

    /// A free-text note.
    #[arg(long)]
    commentary: Option<String>,
}

impl NewBillArgs {
    pub fn new(file: impl Into<PathBuf>, form: BillForm) -> Self {
        Self {
            file: file.into(),
            expense_type: form.expense_type,
            name: form.name,
            date: form.date,
            amount: form.amount,
            vat: form.vat,
            pct: form.pct,
            commentary: form.commentary,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The form fields given on the command line.
    pub fn form(&self) -> BillForm {
        BillForm {
            expense_type: self.expense_type.clone(),
            name: self.name.clone(),
            date: self.date.clone(),
            amount: self.amount,
            vat: self.vat,
            pct: self.pct,
            commentary: self.commentary.clone(),
        }
    }
}

fn default_billed_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("billed"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --billed-home or BILLED_HOME instead of relying on the default \
                billed home directory.",
            );
            PathBuf::from("billed")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
