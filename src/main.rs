use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use deliverzone::api::{AddressQuery, Geocoder, NominatimGeocoder};
use deliverzone::config::FileConfig;
use deliverzone::domain::GeoPoint;
use deliverzone::link;
use deliverzone::ui::{RoleMap, RoleMapError, UiRole};
use deliverzone::wizard::{GeocodeResolution, GeocodeRole, VertexPick, WizardSession};

const SUCCESS_TEXT: &str = "You are inside the delivery range!";
const FAIL_TEXT: &str = "You are outside the delivery range!";

/// Define a delivery-range polygon and check whether addresses fall inside it
///
/// Examples:
///   # Define a zone around a store and print the share link
///   deliverzone define --country Argentina --city "Buenos Aires" \
///       --street "Av. Corrientes" --number 1234 --postal-code C1043 \
///       --vertex="-34.595,-58.390" --vertex="-34.595,-58.370" \
///       --vertex="-34.615,-58.370" --vertex="-34.615,-58.390"
///
///   # Check a customer address against a shared zone
///   deliverzone verify --link "http://localhost:3000/index.html?storelat=..." \
///       --country Argentina --city "Buenos Aires" --street Lavalle \
///       --number 500 --postal-code C1047
#[derive(Parser, Debug)]
#[command(name = "deliverzone")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches deliverzone.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the wizard: place the store, pick 4 vertices, print the share link
    Define {
        #[command(flatten)]
        address: AddressArgs,

        /// Vertex pick as "<lat>,<lon>", repeated in pick order
        #[arg(long = "vertex", value_name = "LAT,LON", value_parser = parse_vertex, allow_hyphen_values = true)]
        vertices: Vec<GeoPoint>,

        /// Origin for the generated share link (overrides config)
        #[arg(long)]
        origin: Option<String>,
    },
    /// Resume a shared zone and check one address against it
    Verify {
        /// Share link (or its query string) produced by `define`
        #[arg(long)]
        link: String,

        #[command(flatten)]
        address: AddressArgs,
    },
}

/// Address fields of the original wizard forms, forwarded to the geocoder
#[derive(clap::Args, Debug)]
struct AddressArgs {
    /// Country name
    #[arg(long)]
    country: String,

    /// City name
    #[arg(long)]
    city: String,

    /// Street name
    #[arg(long)]
    street: String,

    /// House number
    #[arg(long)]
    number: String,

    /// Postal code
    #[arg(long)]
    postal_code: String,
}

impl AddressArgs {
    fn to_query(&self) -> AddressQuery {
        AddressQuery {
            country: self.country.clone(),
            city: self.city.clone(),
            street: self.street.clone(),
            house_number: self.number.clone(),
            postal_code: self.postal_code.clone(),
        }
    }
}

fn parse_vertex(raw: &str) -> Result<GeoPoint, String> {
    GeoPoint::parse_pair(raw).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            Some(FileConfig::from_path(config_path)?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };
    let config = file_config.unwrap_or_default();

    let nominatim_config = config.nominatim.clone().unwrap_or_default();
    let geocoder = NominatimGeocoder::new(&nominatim_config)?;
    let labels = role_labels().context("UI role bindings incomplete")?;

    println!("deliverzone - Delivery Range Wizard");
    println!("===================================");
    println!();

    match args.command {
        Command::Define {
            address,
            vertices,
            origin,
        } => {
            let origin = origin.unwrap_or_else(|| config.origin());
            run_define(&geocoder, &labels, &origin, &address, &vertices)
        }
        Command::Verify { link, address } => run_verify(&geocoder, &labels, &link, &address),
    }
}

fn run_define(
    geocoder: &impl Geocoder,
    labels: &RoleMap<&'static str>,
    origin: &str,
    address: &AddressArgs,
    picks: &[GeoPoint],
) -> Result<()> {
    let mut session = WizardSession::new();

    let spinner = create_spinner("Geocoding store address...");
    let start = Instant::now();
    let ticket = session.begin_geocode(GeocodeRole::Store);
    let candidate = geocoder
        .geocode(&address.to_query())
        .context("Failed to geocode store address")?;
    let store = match session.resolve_geocode(ticket, candidate)? {
        GeocodeResolution::StorePlaced(store) => store,
        other => bail!("Store geocode result was not applied: {:?}", other),
    };
    spinner.finish_with_message(format!(
        "{}: ({:.6}, {:.6}) [{:.1}s]",
        labels.get(UiRole::StoreForm),
        store.lat(),
        store.lon(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!("{}:", labels.get(UiRole::VerticesForm));
    for pick in picks {
        match session.pick_vertex(*pick)? {
            VertexPick::Added { slot } => println!("  v{}: {}", slot, pick),
            VertexPick::Ignored => println!("  Ignored extra pick: {}", pick),
        }
    }
    session.finalize()?;

    let polygon = session
        .polygon()
        .context("Wizard finalized without a polygon")?;
    let share_link = link::encode(origin, store, polygon);

    println!();
    println!("{}:", labels.get(UiRole::LinkPanel));
    println!("  {}", share_link);

    Ok(())
}

fn run_verify(
    geocoder: &impl Geocoder,
    labels: &RoleMap<&'static str>,
    raw_link: &str,
    address: &AddressArgs,
) -> Result<()> {
    // A broken share link is fatal: verifying against a guessed default
    // location would silently answer for the wrong zone.
    let params = link::parse_query(raw_link);
    let seed = link::decode(&params).context("Share link is not resumable")?;
    let mut session = WizardSession::resume(seed.store, seed.polygon);

    let spinner = create_spinner("Geocoding address...");
    let start = Instant::now();
    let ticket = session.begin_geocode(GeocodeRole::Verify);
    let candidate = geocoder
        .geocode(&address.to_query())
        .context("Failed to geocode address")?;
    let check = match session.resolve_geocode(ticket, candidate)? {
        GeocodeResolution::Checked(check) => check,
        other => bail!("Verify geocode result was not applied: {:?}", other),
    };
    spinner.finish_with_message(format!(
        "{}: ({:.6}, {:.6}) [{:.1}s]",
        labels.get(UiRole::AddressForm),
        check.address.lat(),
        check.address.lon(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    let verdict = if check.inside { SUCCESS_TEXT } else { FAIL_TEXT };
    println!("{}: {}", labels.get(UiRole::VerifyBanner), verdict);

    Ok(())
}

fn role_labels() -> Result<RoleMap<&'static str>, RoleMapError> {
    RoleMap::new([
        (UiRole::StoreForm, "Store placed"),
        (UiRole::VerticesForm, "Delivery range vertices"),
        (UiRole::AddressForm, "Address located"),
        (UiRole::VerifyBanner, "Range check"),
        (UiRole::LinkPanel, "Share link"),
    ])
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
